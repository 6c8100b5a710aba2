use poise::serenity_prelude as serenity;
use rankcord::commands::{admin, rank};
use rankcord::{config::Config, levelup, Data};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Config::from_env()?;
    let discord_token = config.discord_token.clone();

    let db = rankcord::db::Database::new(&config)
        .map_err(|e| anyhow::anyhow!("Failed to open database: {}", e))?;
    db.execute_init()?;

    let assets = Arc::new(rankcord::card::CardAssets::load(Path::new(&config.assets_dir))?);

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![rank::rank(), admin::setlevelchannel()],
            event_handler: |ctx, event, _framework, data| {
                Box::pin(async move {
                    match event {
                        serenity::FullEvent::Message { new_message } => {
                            if !new_message.author.bot {
                                if let Err(e) = levelup::handle_message(ctx, new_message, data).await
                                {
                                    error!("Error handling message XP: {}", e);
                                }
                            }
                        }
                        _ => {}
                    }
                    Ok(())
                })
            },
            ..Default::default()
        })
        .setup(|ctx, _ready, framework| {
            Box::pin(async move {
                info!("Bot is ready!");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;

                // Set bot presence
                ctx.set_presence(
                    Some(serenity::ActivityData::watching(&config.status_message)),
                    serenity::OnlineStatus::DoNotDisturb,
                );

                Ok(Data {
                    config,
                    http_client: reqwest::Client::new(),
                    db,
                    assets,
                })
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::MESSAGE_CONTENT
        | serenity::GatewayIntents::GUILD_MESSAGES;

    let mut client = serenity::ClientBuilder::new(&discord_token, intents)
        .framework(framework)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create client: {}", e))?;

    info!("Starting bot...");
    if let Err(why) = client.start().await {
        error!("Client error: {:?}", why);
    }

    Ok(())
}
