// `/role` command group: create, add, remove and delete roles.

use super::{application, or_refused, require_guild, say_quietly, MODAL_TIMEOUT, MODAL_TIMEOUT_MESSAGE};
use crate::core::moderation::validate_reason;
use crate::core::roles::{parse_hex_colour, RoleAction, RoleColour, RoleLogEntry};
use crate::discord::checks;
use crate::discord::errors::is_forbidden;
use crate::discord::logging::case_log::log_role;
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

/// Colour choices offered to Discord. Mirrors `RoleColour`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, poise::ChoiceParameter)]
pub enum ColourChoice {
    #[name = "Default"]
    Default,
    #[name = "Random"]
    Random,
    #[name = "Custom"]
    Custom,
    #[name = "Red"]
    Red,
    #[name = "Dark Red"]
    DarkRed,
    #[name = "Blue"]
    Blue,
    #[name = "Dark Blue"]
    DarkBlue,
    #[name = "Green"]
    Green,
    #[name = "Dark Green"]
    DarkGreen,
    #[name = "Yellow"]
    Yellow,
    #[name = "Orange"]
    Orange,
    #[name = "Pink"]
    Pink,
    #[name = "Purple"]
    Purple,
    #[name = "Light Grey"]
    LightGrey,
    #[name = "Dark Grey"]
    DarkGrey,
    #[name = "Magenta"]
    Magenta,
    #[name = "Gold"]
    Gold,
    #[name = "Teal"]
    Teal,
    #[name = "Fuchsia"]
    Fuchsia,
    #[name = "OG Blurple"]
    OgBlurple,
    #[name = "Blurple"]
    Blurple,
    #[name = "Greyple"]
    Greyple,
}

impl From<ColourChoice> for RoleColour {
    fn from(choice: ColourChoice) -> Self {
        match choice {
            ColourChoice::Default => RoleColour::Default,
            ColourChoice::Random => RoleColour::Random,
            ColourChoice::Custom => RoleColour::Custom,
            ColourChoice::Red => RoleColour::Red,
            ColourChoice::DarkRed => RoleColour::DarkRed,
            ColourChoice::Blue => RoleColour::Blue,
            ColourChoice::DarkBlue => RoleColour::DarkBlue,
            ColourChoice::Green => RoleColour::Green,
            ColourChoice::DarkGreen => RoleColour::DarkGreen,
            ColourChoice::Yellow => RoleColour::Yellow,
            ColourChoice::Orange => RoleColour::Orange,
            ColourChoice::Pink => RoleColour::Pink,
            ColourChoice::Purple => RoleColour::Purple,
            ColourChoice::LightGrey => RoleColour::LightGrey,
            ColourChoice::DarkGrey => RoleColour::DarkGrey,
            ColourChoice::Magenta => RoleColour::Magenta,
            ColourChoice::Gold => RoleColour::Gold,
            ColourChoice::Teal => RoleColour::Teal,
            ColourChoice::Fuchsia => RoleColour::Fuchsia,
            ColourChoice::OgBlurple => RoleColour::OgBlurple,
            ColourChoice::Blurple => RoleColour::Blurple,
            ColourChoice::Greyple => RoleColour::Greyple,
        }
    }
}

#[derive(Debug, poise::Modal)]
#[name = "Role Color"]
struct RoleColourModal {
    #[name = "Color"]
    #[placeholder = "Enter the color to set (hex code)"]
    colour: String,
}

fn log_entry(
    ctx: Context<'_>,
    action: RoleAction,
    role: &serenity::Role,
    member: Option<&serenity::Member>,
    reason: Option<String>,
) -> RoleLogEntry {
    RoleLogEntry {
        action,
        role_name: role.name.clone(),
        role_id: role.id.get(),
        colour: role.colour.0,
        member: member.map(|m| (m.user.tag(), m.user.id.get())),
        moderator: (ctx.author().tag(), ctx.author().id.get()),
        reason,
    }
}

/// Various commands to manage roles in the server.
#[poise::command(
    slash_command,
    guild_only,
    category = "Roles",
    subcommands("create", "add", "remove", "delete")
)]
pub async fn role(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Create a new role in the server.
#[poise::command(slash_command, guild_only, user_cooldown = 3, check = "checks::roles")]
pub async fn create(
    ctx: Context<'_>,
    #[description = "The name of the role"] name: String,
    #[description = "The color of the role"] color: ColourChoice,
    #[description = "Whether to display the role separately from other members"] hoist: Option<bool>,
    #[description = "Whether the role should be mentionable"] mentionable: Option<bool>,
    #[description = "The reason for creating the role"] reason: Option<String>,
) -> Result<(), Error> {
    let reason = validate_reason(reason.as_deref())?;
    let guild_id = require_guild(ctx)?;
    let colour = RoleColour::from(color);

    let rgb = if colour.needs_custom_input() {
        let app_ctx = application(ctx)?;
        let Some(modal) = poise::execute_modal(app_ctx, None::<RoleColourModal>, Some(MODAL_TIMEOUT)).await? else {
            ctx.say(MODAL_TIMEOUT_MESSAGE).await?;
            return Ok(());
        };
        match parse_hex_colour(&modal.colour) {
            Some(rgb) => rgb,
            None => {
                ctx.say("Invalid hexadecimal color code.").await?;
                return Ok(());
            }
        }
    } else {
        ctx.defer().await?;
        colour.resolve().unwrap_or_default()
    };

    let mut builder = serenity::EditRole::new()
        .name(&name)
        .colour(rgb)
        .hoist(hoist.unwrap_or(false))
        .mentionable(mentionable.unwrap_or(false));
    if let Some(r) = reason.as_deref() {
        builder = builder.audit_log_reason(r);
    }

    let Some(role) = or_refused(
        ctx,
        guild_id.create_role(ctx.http(), builder).await,
        "I do not have permission to create roles in this server.",
    )
    .await?
    else {
        return Ok(());
    };

    ctx.say("The role has been created.").await?;
    let entry = log_entry(ctx, RoleAction::Created, &role, None, reason);
    log_role(ctx.serenity_context(), ctx.data(), guild_id, entry).await;
    Ok(())
}

/// Add a role to a member.
#[poise::command(slash_command, guild_only, user_cooldown = 3, check = "checks::roles")]
pub async fn add(
    ctx: Context<'_>,
    #[description = "The member to add the role to"] member: serenity::Member,
    #[description = "The role to add to the member"] role: serenity::Role,
    #[description = "The reason for adding the role"] reason: Option<String>,
) -> Result<(), Error> {
    let reason = validate_reason(reason.as_deref())?;
    let guild_id = require_guild(ctx)?;
    ctx.defer().await?;

    if member.roles.contains(&role.id) {
        return say_quietly(
            ctx,
            format!("<@{}> already has the role <@&{}>.", member.user.id, role.id),
        )
        .await;
    }

    let result = ctx
        .http()
        .add_member_role(guild_id, member.user.id, role.id, reason.as_deref())
        .await;
    let refusal = format!("I do not have permission to add <@&{}> to <@{}>.", role.id, member.user.id);
    if or_refused(ctx, result, refusal).await?.is_none() {
        return Ok(());
    }

    say_quietly(
        ctx,
        format!("<@&{}> has been added to <@{}>.", role.id, member.user.id),
    )
    .await?;
    let entry = log_entry(ctx, RoleAction::Added, &role, Some(&member), reason);
    log_role(ctx.serenity_context(), ctx.data(), guild_id, entry).await;
    Ok(())
}

/// Remove a role from a member.
#[poise::command(slash_command, guild_only, user_cooldown = 3, check = "checks::roles")]
pub async fn remove(
    ctx: Context<'_>,
    #[description = "The member to remove the role from"] member: serenity::Member,
    #[description = "The role to remove from the member"] role: serenity::Role,
    #[description = "The reason for removing the role"] reason: Option<String>,
) -> Result<(), Error> {
    let reason = validate_reason(reason.as_deref())?;
    let guild_id = require_guild(ctx)?;
    ctx.defer().await?;

    if !member.roles.contains(&role.id) {
        return say_quietly(
            ctx,
            format!("<@{}> does not have the role <@&{}>.", member.user.id, role.id),
        )
        .await;
    }

    let result = ctx
        .http()
        .remove_member_role(guild_id, member.user.id, role.id, reason.as_deref())
        .await;
    let refusal = format!(
        "I do not have permission to remove <@&{}> from <@{}>.",
        role.id, member.user.id
    );
    if or_refused(ctx, result, refusal).await?.is_none() {
        return Ok(());
    }

    say_quietly(
        ctx,
        format!("<@&{}> has been removed from <@{}>.", role.id, member.user.id),
    )
    .await?;
    let entry = log_entry(ctx, RoleAction::Removed, &role, Some(&member), reason);
    log_role(ctx.serenity_context(), ctx.data(), guild_id, entry).await;
    Ok(())
}

/// Delete an existing role from the server.
#[poise::command(slash_command, guild_only, user_cooldown = 3, check = "checks::roles")]
pub async fn delete(
    ctx: Context<'_>,
    #[description = "The role to delete"] role: serenity::Role,
    #[description = "The reason for deleting the role"] reason: Option<String>,
) -> Result<(), Error> {
    let reason = validate_reason(reason.as_deref())?;
    let guild_id = require_guild(ctx)?;
    ctx.defer().await?;

    // @everyone shares the guild's id; integration roles belong to their bot
    if role.id.get() == guild_id.get() || role.managed {
        ctx.say("I cannot delete that role.").await?;
        return Ok(());
    }

    match ctx
        .http()
        .delete_role(guild_id, role.id, reason.as_deref())
        .await
    {
        Ok(()) => {}
        Err(e) if is_forbidden(&e) => {
            ctx.say("I do not have permission to delete that role.").await?;
            return Ok(());
        }
        Err(serenity::Error::Http(e)) => {
            tracing::debug!("Role deletion rejected: {}", e);
            ctx.say("I cannot delete that role.").await?;
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    }

    ctx.say(format!("The role **{}** has been deleted.", role.name))
        .await?;
    let entry = log_entry(ctx, RoleAction::Deleted, &role, None, reason);
    log_role(ctx.serenity_context(), ctx.data(), guild_id, entry).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colour_choices_map_to_presets() {
        for choice in [ColourChoice::Red, ColourChoice::OgBlurple, ColourChoice::Greyple] {
            assert!(RoleColour::from(choice).preset().is_some());
        }
        assert!(RoleColour::from(ColourChoice::Custom).needs_custom_input());
        assert!(RoleColour::from(ColourChoice::Random).preset().is_none());
    }
}
