// Member join/leave notices and the welcome DM.

use super::formatter::format_member_log;
use super::{channel_exists, post_embed};
use crate::core::best_effort::best_effort;
use crate::core::moderation::{MemberLogEntry, UserRef};
use crate::core::settings::LogChannelKind;
use crate::discord::Data;
use poise::serenity_prelude as serenity;

pub async fn log_member(
    ctx: &serenity::Context,
    data: &Data,
    guild_id: serenity::GuildId,
    user: &serenity::User,
    joined: bool,
) {
    let channel_id = match data
        .settings
        .log_channel(guild_id.get(), LogChannelKind::Member)
        .await
    {
        Ok(Some(id)) if channel_exists(ctx, guild_id, id) => id,
        Ok(_) => return,
        Err(e) => {
            tracing::error!(guild_id = guild_id.get(), "Failed to read member log channel: {}", e);
            return;
        }
    };

    let member_count = ctx
        .cache
        .guild(guild_id)
        .map(|guild| guild.member_count)
        .unwrap_or_default();

    let entry = MemberLogEntry {
        joined,
        member: UserRef::new(user.id.get(), user.tag()),
        member_count,
    };
    let _ = post_embed(ctx, channel_id, format_member_log(&entry)).await;
}

/// DM the guild's welcome message to a new member, if one is set.
pub async fn welcome_member(ctx: &serenity::Context, data: &Data, member: &serenity::Member) {
    let message = match data.settings.welcome_message(member.guild_id.get()).await {
        Ok(Some(message)) => message,
        Ok(None) => return,
        Err(e) => {
            tracing::error!("Failed to read welcome message: {}", e);
            return;
        }
    };

    best_effort(
        member
            .user
            .direct_message(&ctx.http, serenity::CreateMessage::new().content(message))
            .await,
        "welcome DM",
    );
}
