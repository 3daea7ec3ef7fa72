use crate::core::best_effort::best_effort;
use crate::discord::Data;
use poise::serenity_prelude as serenity;

/// Make sure the guild has a settings row, and walk out of blacklisted guilds.
pub async fn on_guild_available(ctx: &serenity::Context, data: &Data, guild: &serenity::Guild) {
    let guild_id = guild.id.get();

    match data.settings.is_blacklisted_guild(guild_id).await {
        Ok(true) => {
            tracing::info!(guild_id, "Leaving blacklisted guild {}", guild.name);
            best_effort(guild.id.leave(&ctx.http).await, "leave blacklisted guild");
            return;
        }
        Ok(false) => {}
        Err(e) => tracing::error!(guild_id, "Failed to check guild blacklist: {}", e),
    }

    if let Err(e) = data.settings.register_guild(guild_id).await {
        tracing::error!(guild_id, "Failed to register guild: {}", e);
    }
}
