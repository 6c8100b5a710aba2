use dotenvy::dotenv;
use serde::Deserialize;
use std::env;

#[derive(Clone, Deserialize)]
pub struct Config {
    pub discord_token: String,
    pub database_url: String,
    pub xp_per_message: i64,
    pub max_level: i64,
    pub base_level_xp: i64,
    pub level_xp_step: i64,
    pub status_message: String,
    pub assets_dir: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok();
        Self::build()
    }

    fn build() -> anyhow::Result<Self> {
        let config = Config {
            discord_token: env::var("DISCORD_TOKEN")
                .map_err(|_| anyhow::anyhow!("DISCORD_TOKEN must be set"))?,
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "data/rankcord.db".to_string()),
            xp_per_message: env::var("XP_PER_MESSAGE")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .unwrap_or(20),
            max_level: env::var("MAX_LEVEL")
                .unwrap_or_else(|_| "100".to_string())
                .parse()
                .unwrap_or(100),
            base_level_xp: env::var("BASE_LEVEL_XP")
                .unwrap_or_else(|_| "100".to_string())
                .parse()
                .unwrap_or(100),
            level_xp_step: env::var("LEVEL_XP_STEP")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .unwrap_or(5),
            status_message: env::var("STATUS_MESSAGE")
                .unwrap_or_else(|_| "the leaderboard".to_string()),
            assets_dir: env::var("ASSETS_DIR").unwrap_or_else(|_| "assets".to_string()),
        };

        // Negative or zero values would let stored xp drift below 0 or make
        // the level curve non-increasing.
        anyhow::ensure!(config.xp_per_message > 0, "XP_PER_MESSAGE must be positive");
        anyhow::ensure!(config.max_level >= 1, "MAX_LEVEL must be at least 1");
        anyhow::ensure!(config.base_level_xp > 0, "BASE_LEVEL_XP must be positive");
        anyhow::ensure!(config.level_xp_step > 0, "LEVEL_XP_STEP must be positive");

        Ok(config)
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("discord_token", &"[REDACTED]")
            .field("database_url", &self.database_url)
            .field("xp_per_message", &self.xp_per_message)
            .field("max_level", &self.max_level)
            .field("base_level_xp", &self.base_level_xp)
            .field("level_xp_step", &self.level_xp_step)
            .field("status_message", &self.status_message)
            .field("assets_dir", &self.assets_dir)
            .finish()
    }
}
