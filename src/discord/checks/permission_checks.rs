// Poise check functions. Each one pulls caller and bot permissions out of the
// interaction and runs the matching predicate from the permission gate.

use crate::core::permissions::{self, Capabilities, CheckResult};
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

type Predicate = fn(&Capabilities, &Capabilities) -> CheckResult;

pub fn to_capabilities(p: serenity::Permissions) -> Capabilities {
    Capabilities {
        administrator: p.administrator(),
        kick_members: p.kick_members(),
        ban_members: p.ban_members(),
        moderate_members: p.moderate_members(),
        manage_messages: p.manage_messages(),
        manage_roles: p.manage_roles(),
        manage_guild: p.manage_guild(),
        manage_nicknames: p.manage_nicknames(),
    }
}

/// (caller, bot) capabilities as Discord resolved them for this interaction.
fn interaction_capabilities(ctx: Context<'_>) -> Result<(Capabilities, Capabilities), Error> {
    match ctx {
        poise::Context::Application(app) => {
            let caller = app
                .interaction
                .member
                .as_ref()
                .and_then(|m| m.permissions)
                .unwrap_or_else(serenity::Permissions::empty);
            let bot = app
                .interaction
                .app_permissions
                .unwrap_or_else(serenity::Permissions::empty);
            Ok((to_capabilities(caller), to_capabilities(bot)))
        }
        poise::Context::Prefix(_) => Err("This command is only available as a slash command.".into()),
    }
}

async fn gate(ctx: Context<'_>, predicate: Predicate) -> Result<bool, Error> {
    let (caller, bot) = interaction_capabilities(ctx)?;
    predicate(&caller, &bot)?;
    Ok(true)
}

pub async fn kick(ctx: Context<'_>) -> Result<bool, Error> {
    gate(ctx, permissions::kick_check).await
}

pub async fn ban(ctx: Context<'_>) -> Result<bool, Error> {
    gate(ctx, permissions::ban_check).await
}

pub async fn mute(ctx: Context<'_>) -> Result<bool, Error> {
    gate(ctx, permissions::mute_check).await
}

pub async fn channel_mute(ctx: Context<'_>) -> Result<bool, Error> {
    gate(ctx, permissions::channel_mute_check).await
}

pub async fn warn(ctx: Context<'_>) -> Result<bool, Error> {
    gate(ctx, permissions::warn_check).await
}

pub async fn clear(ctx: Context<'_>) -> Result<bool, Error> {
    gate(ctx, permissions::clear_check).await
}

pub async fn announce(ctx: Context<'_>) -> Result<bool, Error> {
    gate(ctx, permissions::announce_check).await
}

pub async fn roles(ctx: Context<'_>) -> Result<bool, Error> {
    gate(ctx, permissions::roles_check).await
}

pub async fn settings(ctx: Context<'_>) -> Result<bool, Error> {
    gate(ctx, permissions::settings_check).await
}

pub async fn automod(ctx: Context<'_>) -> Result<bool, Error> {
    gate(ctx, permissions::automod_check).await
}

pub async fn afk(ctx: Context<'_>) -> Result<bool, Error> {
    gate(ctx, permissions::afk_check).await
}

/// Framework-wide check: blacklisted users get nothing.
pub async fn not_blacklisted(ctx: Context<'_>) -> Result<bool, Error> {
    let blacklisted = ctx
        .data()
        .settings
        .is_blacklisted_user(ctx.author().id.get())
        .await
        .map_err(|e| Error::from(e.to_string()))?;

    if blacklisted {
        tracing::debug!(user_id = ctx.author().id.get(), "Ignoring blacklisted user");
        return Err("You are blacklisted from using FumeGuard.".into());
    }
    Ok(true)
}

/// Highest role position of a member (0 when they only have @everyone).
pub fn top_role_position(guild: &serenity::Guild, member: &serenity::Member) -> u16 {
    member
        .roles
        .iter()
        .filter_map(|role_id| guild.roles.get(role_id))
        .map(|role| role.position)
        .max()
        .unwrap_or(0)
}

/// Whether the invoking member may act on `target` under the role hierarchy.
pub async fn caller_can_moderate(ctx: Context<'_>, target: &serenity::Member) -> Result<bool, Error> {
    let caller = ctx
        .author_member()
        .await
        .ok_or("Could not resolve your server membership.")?
        .into_owned();

    // The cache ref must not live across an await
    let (is_owner, caller_top, target_top) = {
        let guild = ctx.guild().ok_or("Server is not cached yet.")?;
        (
            guild.owner_id == caller.user.id,
            top_role_position(&guild, &caller),
            top_role_position(&guild, target),
        )
    };
    Ok(permissions::can_moderate(is_owner, caller_top, target_top))
}

/// Whether the bot may post in `channel_id`, according to the cache.
pub fn bot_can_send(
    ctx: &serenity::Context,
    guild_id: serenity::GuildId,
    channel_id: serenity::ChannelId,
) -> bool {
    let bot_id = ctx.cache.current_user().id;
    let Some(guild) = ctx.cache.guild(guild_id) else {
        return false;
    };
    let (Some(channel), Some(member)) = (guild.channels.get(&channel_id), guild.members.get(&bot_id))
    else {
        return false;
    };
    let perms = guild.user_permissions_in(channel, member);
    perms.view_channel() && perms.send_messages()
}

/// Whether `member` can currently send messages in `channel_id`.
pub fn member_can_send(
    ctx: &serenity::Context,
    guild_id: serenity::GuildId,
    channel_id: serenity::ChannelId,
    member: &serenity::Member,
) -> bool {
    let Some(guild) = ctx.cache.guild(guild_id) else {
        return true;
    };
    match guild.channels.get(&channel_id) {
        Some(channel) => guild.user_permissions_in(channel, member).send_messages(),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_flags_map_across() {
        let caps = to_capabilities(
            serenity::Permissions::KICK_MEMBERS | serenity::Permissions::MANAGE_NICKNAMES,
        );
        assert!(caps.kick_members);
        assert!(caps.manage_nicknames);
        assert!(!caps.ban_members);
        assert!(!caps.administrator);
    }

    #[test]
    fn test_administrator_maps_to_everything() {
        let caps = to_capabilities(serenity::Permissions::ADMINISTRATOR);
        assert!(permissions::roles_check(&caps, &caps).is_ok());
    }
}
