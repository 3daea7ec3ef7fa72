// `/automod` command group: the on/off switch and the two role allowlists.

use super::{require_guild, say_quietly};
use crate::core::settings::{AllowlistKind, RoleAllowlist};
use crate::discord::checks;
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

fn allowlist_message(kind: AllowlistKind, list: &RoleAllowlist) -> String {
    if list.is_empty() {
        return format!("No roles are allowed to {} in the server.", kind.activity());
    }
    let roles: Vec<String> = list.role_ids().iter().map(|id| format!("<@&{}>", id)).collect();
    format!(
        "Roles allowed to {} in the server are: {}.",
        kind.activity(),
        roles.join(", ")
    )
}

fn allow_message(kind: AllowlistKind, role_id: u64, changed: bool) -> String {
    let state = if changed { "now" } else { "already" };
    format!("Role <@&{}> is {} allowed to {} in the server.", role_id, state, kind.activity())
}

fn disallow_message(kind: AllowlistKind, role_id: u64, changed: bool) -> String {
    let state = if changed { "now" } else { "already" };
    format!("Role <@&{}> is {} disallowed to {} in the server.", role_id, state, kind.activity())
}

async fn show(ctx: Context<'_>, kind: AllowlistKind) -> Result<(), Error> {
    let guild_id = require_guild(ctx)?;
    ctx.defer().await?;
    let list = ctx.data().automod.allowlist(guild_id.get(), kind).await?;
    say_quietly(ctx, allowlist_message(kind, &list)).await
}

async fn allow(ctx: Context<'_>, kind: AllowlistKind, role: serenity::Role) -> Result<(), Error> {
    let guild_id = require_guild(ctx)?;
    ctx.defer().await?;
    let changed = ctx
        .data()
        .automod
        .allow_role(guild_id.get(), kind, role.id.get())
        .await?;
    say_quietly(ctx, allow_message(kind, role.id.get(), changed)).await
}

async fn disallow(ctx: Context<'_>, kind: AllowlistKind, role: serenity::Role) -> Result<(), Error> {
    let guild_id = require_guild(ctx)?;
    ctx.defer().await?;
    let changed = ctx
        .data()
        .automod
        .disallow_role(guild_id.get(), kind, role.id.get())
        .await?;
    say_quietly(ctx, disallow_message(kind, role.id.get(), changed)).await
}

/// Various commands to manage the automatic moderation system.
#[poise::command(
    slash_command,
    guild_only,
    category = "Automod",
    subcommands(
        "enable",
        "disable",
        "show_link_send",
        "allow_link_send",
        "disallow_link_send",
        "show_link_embed",
        "allow_link_embed",
        "disallow_link_embed"
    )
)]
pub async fn automod(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Enable the automatic moderation system.
#[poise::command(slash_command, guild_only, user_cooldown = 3, check = "checks::automod")]
pub async fn enable(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = require_guild(ctx)?;
    ctx.defer().await?;
    let message = if ctx.data().automod.enable(guild_id.get()).await? {
        "Automatic moderation system has been enabled."
    } else {
        "Automatic moderation system is already enabled."
    };
    ctx.say(message).await?;
    Ok(())
}

/// Disable the automatic moderation system.
#[poise::command(slash_command, guild_only, user_cooldown = 3, check = "checks::automod")]
pub async fn disable(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = require_guild(ctx)?;
    ctx.defer().await?;
    let message = if ctx.data().automod.disable(guild_id.get()).await? {
        "Automatic moderation system has been disabled."
    } else {
        "Automatic moderation system is already disabled."
    };
    ctx.say(message).await?;
    Ok(())
}

/// Show the roles allowed to send links.
#[poise::command(slash_command, guild_only, user_cooldown = 3, check = "checks::automod")]
pub async fn show_link_send(ctx: Context<'_>) -> Result<(), Error> {
    show(ctx, AllowlistKind::LinkSend).await
}

/// Allow a role to send links.
#[poise::command(slash_command, guild_only, user_cooldown = 3, check = "checks::automod")]
pub async fn allow_link_send(
    ctx: Context<'_>,
    #[description = "The role to allow"] role: serenity::Role,
) -> Result<(), Error> {
    allow(ctx, AllowlistKind::LinkSend, role).await
}

/// Disallow a role from sending links.
#[poise::command(slash_command, guild_only, user_cooldown = 3, check = "checks::automod")]
pub async fn disallow_link_send(
    ctx: Context<'_>,
    #[description = "The role to disallow"] role: serenity::Role,
) -> Result<(), Error> {
    disallow(ctx, AllowlistKind::LinkSend, role).await
}

/// Show the roles whose links keep their embeds.
#[poise::command(slash_command, guild_only, user_cooldown = 3, check = "checks::automod")]
pub async fn show_link_embed(ctx: Context<'_>) -> Result<(), Error> {
    show(ctx, AllowlistKind::LinkEmbed).await
}

/// Allow a role's links to keep their embeds.
#[poise::command(slash_command, guild_only, user_cooldown = 3, check = "checks::automod")]
pub async fn allow_link_embed(
    ctx: Context<'_>,
    #[description = "The role to allow"] role: serenity::Role,
) -> Result<(), Error> {
    allow(ctx, AllowlistKind::LinkEmbed, role).await
}

/// Stop a role's links from keeping their embeds.
#[poise::command(slash_command, guild_only, user_cooldown = 3, check = "checks::automod")]
pub async fn disallow_link_embed(
    ctx: Context<'_>,
    #[description = "The role to disallow"] role: serenity::Role,
) -> Result<(), Error> {
    disallow(ctx, AllowlistKind::LinkEmbed, role).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowlist_message() {
        let empty = RoleAllowlist::default();
        assert_eq!(
            allowlist_message(AllowlistKind::LinkSend, &empty),
            "No roles are allowed to send links in the server."
        );

        let list = RoleAllowlist::parse(Some("1|2"));
        assert_eq!(
            allowlist_message(AllowlistKind::LinkEmbed, &list),
            "Roles allowed to send embeds in the server are: <@&1>, <@&2>."
        );
    }

    #[test]
    fn test_toggle_messages() {
        assert_eq!(
            allow_message(AllowlistKind::LinkSend, 7, false),
            "Role <@&7> is already allowed to send links in the server."
        );
        assert_eq!(
            disallow_message(AllowlistKind::LinkSend, 7, true),
            "Role <@&7> is now disallowed to send links in the server."
        );
    }
}
