pub mod card;
pub mod commands;
pub mod config;
pub mod db;
pub mod leveling;
pub mod levelup;

/// Custom data passed to all commands
pub struct Data {
    pub config: config::Config,
    pub http_client: reqwest::Client,
    pub db: db::Database,
    pub assets: std::sync::Arc<card::CardAssets>,
}

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;
