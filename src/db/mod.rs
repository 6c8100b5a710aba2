use crate::config::Config;
use rusqlite::{Connection, OptionalExtension, Result};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// A user's stored leveling state within one guild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserProgress {
    pub xp: i64,
    pub level: i64,
}

impl Default for UserProgress {
    fn default() -> Self {
        Self { xp: 0, level: 1 }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GuildSettings {
    pub level_channel_id: Option<u64>,
}

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn new(config: &Config) -> Result<Self> {
        let conn = Connection::open(&config.database_url)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn execute_init(&self) -> anyhow::Result<()> {
        info!("Database: Initializing schema...");
        let sql = "
            CREATE TABLE IF NOT EXISTS levels (
                guild_id TEXT NOT NULL,
                user_id TEXT NOT NULL,
                xp INTEGER NOT NULL DEFAULT 0,
                level INTEGER NOT NULL DEFAULT 1,
                PRIMARY KEY (guild_id, user_id)
            );

            CREATE TABLE IF NOT EXISTS guild_settings (
                guild_id TEXT PRIMARY KEY,
                level_channel_id TEXT
            );
        ";
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(sql)?;
        debug!("Database: Schema initialized successfully");
        Ok(())
    }

    /// Point read; `None` when the user has never earned XP in this guild.
    pub fn get_progress(&self, guild_id: u64, user_id: u64) -> anyhow::Result<Option<UserProgress>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare("SELECT xp, level FROM levels WHERE guild_id = ?1 AND user_id = ?2")?;
        let progress = stmt
            .query_row([guild_id.to_string(), user_id.to_string()], |row| {
                Ok(UserProgress {
                    xp: row.get(0)?,
                    level: row.get(1)?,
                })
            })
            .optional()?;
        Ok(progress)
    }

    /// Read the user's progress, inserting the starting record (xp 0, level 1)
    /// on first contact.
    pub fn get_or_create_progress(
        &self,
        guild_id: u64,
        user_id: u64,
    ) -> anyhow::Result<UserProgress> {
        if let Some(progress) = self.get_progress(guild_id, user_id)? {
            return Ok(progress);
        }

        debug!(
            "Database: Creating progress record for user {} in guild {}",
            user_id, guild_id
        );
        let progress = UserProgress::default();
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR IGNORE INTO levels (guild_id, user_id, xp, level) VALUES (?1, ?2, ?3, ?4)",
            (
                guild_id.to_string(),
                user_id.to_string(),
                progress.xp,
                progress.level,
            ),
        )?;
        Ok(progress)
    }

    pub fn save_progress(
        &self,
        guild_id: u64,
        user_id: u64,
        progress: UserProgress,
    ) -> anyhow::Result<()> {
        debug!(
            "Database: Saving progress for user {} in guild {}: xp={} level={}",
            user_id, guild_id, progress.xp, progress.level
        );
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO levels (guild_id, user_id, xp, level) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(guild_id, user_id) DO UPDATE SET xp = ?3, level = ?4",
            (
                guild_id.to_string(),
                user_id.to_string(),
                progress.xp,
                progress.level,
            ),
        )?;
        Ok(())
    }

    /// Read the guild's settings, inserting a default record (no announcement
    /// channel) when none is stored yet.
    pub fn get_or_create_guild_settings(&self, guild_id: u64) -> anyhow::Result<GuildSettings> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare("SELECT level_channel_id FROM guild_settings WHERE guild_id = ?1")?;
        let row: Option<Option<String>> = stmt
            .query_row([guild_id.to_string()], |row| row.get(0))
            .optional()?;

        if let Some(channel) = row {
            return Ok(GuildSettings {
                level_channel_id: channel.and_then(|id| id.parse().ok()),
            });
        }

        conn.execute(
            "INSERT OR IGNORE INTO guild_settings (guild_id, level_channel_id) VALUES (?1, NULL)",
            [guild_id.to_string()],
        )?;
        Ok(GuildSettings::default())
    }

    pub fn set_level_channel(&self, guild_id: u64, channel_id: u64) -> anyhow::Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO guild_settings (guild_id, level_channel_id) VALUES (?1, ?2)
             ON CONFLICT(guild_id) DO UPDATE SET level_channel_id = ?2",
            (guild_id.to_string(), channel_id.to_string()),
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn test_config() -> Config {
        Config {
            discord_token: "test".to_string(),
            database_url: ":memory:".to_string(),
            xp_per_message: 20,
            max_level: 100,
            base_level_xp: 100,
            level_xp_step: 5,
            status_message: "test".to_string(),
            assets_dir: "assets".to_string(),
        }
    }

    fn test_db() -> Database {
        let db = Database::new(&test_config()).unwrap();
        db.execute_init().unwrap();
        db
    }

    #[test]
    fn test_progress_lifecycle() {
        let db = test_db();

        // Unknown user: no record
        assert_eq!(db.get_progress(1, 2).unwrap(), None);

        // First contact creates the starting record
        let progress = db.get_or_create_progress(1, 2).unwrap();
        assert_eq!(progress, UserProgress { xp: 0, level: 1 });
        assert_eq!(db.get_progress(1, 2).unwrap(), Some(progress));

        // Save and read back
        let updated = UserProgress { xp: 15, level: 2 };
        db.save_progress(1, 2, updated).unwrap();
        assert_eq!(db.get_progress(1, 2).unwrap(), Some(updated));
        assert_eq!(db.get_or_create_progress(1, 2).unwrap(), updated);

        // Records are keyed per guild
        assert_eq!(db.get_progress(9, 2).unwrap(), None);
    }

    #[test]
    fn test_save_progress_is_last_write_wins() {
        let db = test_db();
        db.save_progress(1, 2, UserProgress { xp: 40, level: 3 }).unwrap();
        db.save_progress(1, 2, UserProgress { xp: 5, level: 4 }).unwrap();
        assert_eq!(
            db.get_progress(1, 2).unwrap(),
            Some(UserProgress { xp: 5, level: 4 })
        );
    }

    #[test]
    fn test_guild_settings_created_on_first_access() {
        let db = test_db();

        let settings = db.get_or_create_guild_settings(123).unwrap();
        assert_eq!(settings.level_channel_id, None);

        // The default record was persisted, not just returned
        let conn = db.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT 1 FROM guild_settings WHERE guild_id = '123'")
            .unwrap();
        assert!(stmt.exists([]).unwrap());
    }

    #[test]
    fn test_set_level_channel() {
        let db = test_db();

        // Upsert with no prior record
        db.set_level_channel(123, 456).unwrap();
        let settings = db.get_or_create_guild_settings(123).unwrap();
        assert_eq!(settings.level_channel_id, Some(456));

        // Overwrite
        db.set_level_channel(123, 789).unwrap();
        let settings = db.get_or_create_guild_settings(123).unwrap();
        assert_eq!(settings.level_channel_id, Some(789));
    }
}
