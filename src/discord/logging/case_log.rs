// Moderation-log output for commands.

use super::formatter::{format_case, format_role_log};
use super::{channel_exists, post_embed};
use crate::core::moderation::CaseDraft;
use crate::core::roles::RoleLogEntry;
use crate::discord::Data;
use poise::serenity_prelude as serenity;

/// Number `draft` and post it to the moderation log. A guild without a
/// usable log channel is skipped silently, and a case that fails to post
/// leaves the counter where it was.
pub async fn log_case(
    ctx: &serenity::Context,
    data: &Data,
    guild_id: serenity::GuildId,
    draft: CaseDraft,
) {
    let result = data
        .moderation
        .log_case(
            guild_id.get(),
            draft,
            |id| channel_exists(ctx, guild_id, id),
            |case| async move {
                post_embed(ctx, case.log_channel_id, format_case(&case))
                    .await
                    .is_ok()
            },
        )
        .await;

    if let Err(e) = result {
        tracing::error!(guild_id = guild_id.get(), "Failed to log moderation case: {}", e);
    }
}

/// Post a role change to the moderation log. Role logs are not numbered.
pub async fn log_role(
    ctx: &serenity::Context,
    data: &Data,
    guild_id: serenity::GuildId,
    entry: RoleLogEntry,
) {
    match data
        .moderation
        .log_channel(guild_id.get(), |id| channel_exists(ctx, guild_id, id))
        .await
    {
        Ok(Some(channel_id)) => {
            let _ = post_embed(ctx, channel_id, format_role_log(&entry)).await;
        }
        Ok(None) => {}
        Err(e) => tracing::error!(guild_id = guild_id.get(), "Failed to read log channel: {}", e),
    }
}
