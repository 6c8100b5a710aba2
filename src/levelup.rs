use crate::db::UserProgress;
use crate::leveling::{self, LevelCurve};
use crate::{card, Data, Error};
use poise::serenity_prelude as serenity;
use serenity::Mentionable;
use tracing::{debug, info};

/// Credit XP for an inbound guild message and announce any resulting
/// level-up.
pub async fn handle_message(
    ctx: &serenity::Context,
    new_message: &serenity::Message,
    data: &Data,
) -> Result<(), Error> {
    let Some(guild_id) = new_message.guild_id else {
        return Ok(());
    };

    let guild_id = guild_id.get();
    let user_id = new_message.author.id.get();

    let progress = data.db.get_or_create_progress(guild_id, user_id)?;
    let curve = LevelCurve::from_config(&data.config);
    let accrual =
        leveling::apply_message_xp(&curve, progress.xp, progress.level, data.config.xp_per_message);

    let updated = UserProgress {
        xp: accrual.xp,
        level: accrual.level,
    };
    data.db.save_progress(guild_id, user_id, updated)?;

    if accrual.leveled_up {
        info!(
            "User {} leveled up to {} in guild {}",
            user_id, accrual.level, guild_id
        );
        announce_level_up(ctx, new_message, data, guild_id, updated).await?;
    }

    Ok(())
}

async fn announce_level_up(
    ctx: &serenity::Context,
    new_message: &serenity::Message,
    data: &Data,
    guild_id: u64,
    progress: UserProgress,
) -> Result<(), Error> {
    let settings = data.db.get_or_create_guild_settings(guild_id)?;
    let Some(channel_id) = settings.level_channel_id else {
        debug!("Guild {} has no level channel set, skipping announcement", guild_id);
        return Ok(());
    };

    let png = build_rank_card(data, &new_message.author, progress).await?;

    serenity::ChannelId::new(channel_id)
        .send_message(
            &ctx.http,
            serenity::CreateMessage::new()
                .content(format!(
                    "{} leveled up to **Level {}**!",
                    new_message.author.mention(),
                    progress.level
                ))
                .add_file(serenity::CreateAttachment::bytes(png, "rank.png")),
        )
        .await?;

    Ok(())
}

/// Fetches the user's avatar and renders their rank card. Shared between the
/// level-up announcement and the /rank command.
pub async fn build_rank_card(
    data: &Data,
    user: &serenity::User,
    progress: UserProgress,
) -> anyhow::Result<Vec<u8>> {
    let avatar_bytes = data
        .http_client
        .get(user.face())
        .send()
        .await?
        .error_for_status()?
        .bytes()
        .await?;
    let avatar = image::load_from_memory(&avatar_bytes)?;

    let curve = LevelCurve::from_config(&data.config);
    let png = card::render_rank_card(
        &data.assets,
        user.display_name(),
        progress.level,
        curve.max_level,
        progress.xp,
        curve.required_xp(progress.level),
        &avatar,
    )?;
    Ok(png)
}
