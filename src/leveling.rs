use crate::config::Config;

/// The XP curve and level cap for a guild. Pure arithmetic, no I/O.
#[derive(Debug, Clone, Copy)]
pub struct LevelCurve {
    pub base_xp: i64,
    pub xp_step: i64,
    pub max_level: i64,
}

impl LevelCurve {
    pub fn from_config(config: &Config) -> Self {
        Self {
            base_xp: config.base_level_xp,
            xp_step: config.level_xp_step,
            max_level: config.max_level,
        }
    }

    /// XP needed to advance past `level`.
    pub fn required_xp(&self, level: i64) -> i64 {
        self.base_xp + level * self.xp_step
    }
}

/// Result of crediting one message's worth of XP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accrual {
    pub xp: i64,
    pub level: i64,
    pub leveled_up: bool,
}

/// Credits `gain` XP on top of `(xp, level)`, rolling any overflow into
/// level-ups. The requirement is recomputed against the post-increment level
/// on every iteration, so after this returns `xp < required_xp(level)` holds
/// unless the level cap was reached.
pub fn apply_message_xp(curve: &LevelCurve, xp: i64, level: i64, gain: i64) -> Accrual {
    let mut xp = xp + gain;
    let mut level = level;
    let mut leveled_up = false;

    while xp >= curve.required_xp(level) && level < curve.max_level {
        xp -= curve.required_xp(level);
        level += 1;
        leveled_up = true;
    }

    Accrual {
        xp,
        level,
        leveled_up,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve() -> LevelCurve {
        LevelCurve {
            base_xp: 100,
            xp_step: 5,
            max_level: 100,
        }
    }

    #[test]
    fn test_required_xp_is_strictly_increasing() {
        let curve = curve();
        for level in 1..curve.max_level {
            assert!(curve.required_xp(level + 1) > curve.required_xp(level));
        }
    }

    #[test]
    fn test_level_up_at_exact_threshold() {
        // required_xp(1) = 105: 5 messages of 20 XP stay just under it.
        let curve = curve();
        let mut state = Accrual {
            xp: 0,
            level: 1,
            leveled_up: false,
        };
        for _ in 0..5 {
            state = apply_message_xp(&curve, state.xp, state.level, 20);
            assert!(!state.leveled_up);
        }
        assert_eq!(state.xp, 100);
        assert_eq!(state.level, 1);

        // The 6th message crosses the threshold: 120 - 105 = 15 into level 2.
        let state = apply_message_xp(&curve, state.xp, state.level, 20);
        assert_eq!(
            state,
            Accrual {
                xp: 15,
                level: 2,
                leveled_up: true
            }
        );
    }

    #[test]
    fn test_overflow_rolls_through_multiple_levels() {
        let curve = curve();
        // 105 (level 1) + 110 (level 2) + 7 leftover
        let state = apply_message_xp(&curve, 0, 1, 222);
        assert_eq!(
            state,
            Accrual {
                xp: 7,
                level: 3,
                leveled_up: true
            }
        );
    }

    #[test]
    fn test_post_accrual_invariant() {
        let curve = curve();
        let mut xp = 0;
        let mut level = 1;
        for gain in [20, 20, 500, 3, 999, 20, 0, 250] {
            let state = apply_message_xp(&curve, xp, level, gain);
            xp = state.xp;
            level = state.level;
            assert!(xp >= 0);
            if level < curve.max_level {
                assert!(xp < curve.required_xp(level));
            }
        }
    }

    #[test]
    fn test_capped_at_max_level() {
        let curve = LevelCurve {
            base_xp: 100,
            xp_step: 5,
            max_level: 3,
        };
        let state = apply_message_xp(&curve, 0, 1, 100_000);
        assert_eq!(state.level, 3);
        assert!(state.leveled_up);

        // Further XP accumulates but never levels past the cap.
        let state = apply_message_xp(&curve, state.xp, state.level, 100_000);
        assert_eq!(state.level, 3);
        assert!(!state.leveled_up);
    }
}
