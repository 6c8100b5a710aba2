use crate::{levelup, Context, Error};
use poise::serenity_prelude as serenity;
use tracing::error;

/// Show your current rank
#[poise::command(slash_command, guild_only)]
pub async fn rank(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be run in a guild")?;

    let Some(progress) = ctx.data().db.get_progress(guild_id.get(), ctx.author().id.get())? else {
        ctx.say("You don't have any XP yet!").await?;
        return Ok(());
    };

    ctx.defer().await?;

    match levelup::build_rank_card(ctx.data(), ctx.author(), progress).await {
        Ok(png) => {
            ctx.send(
                poise::CreateReply::default()
                    .attachment(serenity::CreateAttachment::bytes(png, "rank.png")),
            )
            .await?;
        }
        Err(e) => {
            error!("Failed to render rank card for {}: {}", ctx.author().id, e);
            ctx.say("❌ An error occurred while generating your rank card.")
                .await?;
        }
    }

    Ok(())
}
