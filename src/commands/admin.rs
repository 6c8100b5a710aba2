use crate::{Context, Error};
use poise::serenity_prelude as serenity;
use serenity::Mentionable;
use tracing::info;

/// Set the channel for level up announcements
#[poise::command(slash_command, required_permissions = "ADMINISTRATOR", guild_only)]
pub async fn setlevelchannel(
    ctx: Context<'_>,
    #[description = "Channel to post level up announcements in"] channel: serenity::GuildChannel,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be run in a guild")?;

    ctx.data()
        .db
        .set_level_channel(guild_id.get(), channel.id.get())?;

    info!(
        "Level channel for guild {} set to {} by {}",
        guild_id,
        channel.id,
        ctx.author().name
    );
    ctx.say(format!("✅ Level channel set to {}", channel.mention()))
        .await?;

    Ok(())
}
