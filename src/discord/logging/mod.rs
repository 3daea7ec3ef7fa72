// Log channel output: numbered moderation cases, role changes and member
// join/leave notices.

pub mod case_log;
pub mod formatter;
pub mod member_log;

use poise::serenity_prelude as serenity;

/// Whether a channel still exists in the cached guild.
pub fn channel_exists(ctx: &serenity::Context, guild_id: serenity::GuildId, channel_id: u64) -> bool {
    if channel_id == 0 {
        return false;
    }
    ctx.cache
        .guild(guild_id)
        .is_some_and(|guild| guild.channels.contains_key(&serenity::ChannelId::new(channel_id)))
}

/// Post an embed to a log channel. Failures are logged here; callers that
/// only care about delivery can drop the result.
pub async fn post_embed(
    ctx: &serenity::Context,
    channel_id: u64,
    embed: serenity::CreateEmbed,
) -> serenity::Result<()> {
    let channel = serenity::ChannelId::new(channel_id);
    channel
        .send_message(&ctx.http, serenity::CreateMessage::new().embed(embed))
        .await
        .map(|_| ())
        .inspect_err(|e| tracing::warn!("Failed to send log to channel {}: {}", channel_id, e))
}
