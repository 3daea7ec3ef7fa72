// `/set` command group and the `/settings` overview.

use super::{application, require_guild, user_ref, MODAL_TIMEOUT, MODAL_TIMEOUT_MESSAGE};
use crate::core::moderation::{CaseDraft, ModAction};
use crate::core::settings::{
    AllowlistKind, ChannelUpdate, LogChannelKind, SettingsError, SettingsSource, WelcomeUpdate,
};
use crate::discord::checks::{self, bot_can_send};
use crate::discord::logging::case_log::log_case;
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

fn missing_channel_message(kind: LogChannelKind) -> &'static str {
    match kind {
        LogChannelKind::Moderation => "No moderation log channel is set for this server.",
        LogChannelKind::Member => "No member log channel is set for this server.",
    }
}

/// "Moderation logging channel" / "Member logging channel", for case descriptions.
fn case_subject(kind: LogChannelKind) -> &'static str {
    match kind {
        LogChannelKind::Moderation => "Moderation logging channel",
        LogChannelKind::Member => "Member logging channel",
    }
}

async fn set_log_channel(
    ctx: Context<'_>,
    kind: LogChannelKind,
    channel: Option<serenity::GuildChannel>,
) -> Result<(), Error> {
    let guild_id = require_guild(ctx)?;
    ctx.defer().await?;

    let settings = &ctx.data().settings;
    let requested = channel.as_ref().map(|c| c.id.get());
    let disabled_case = CaseDraft::new(ModAction::LogChannelDisabled, user_ref(ctx.author()))
        .description(format!("{} has been disabled.", case_subject(kind)));

    match settings.plan_log_channel(guild_id.get(), kind, requested).await? {
        ChannelUpdate::NothingToDisable => {
            ctx.say(missing_channel_message(kind)).await?;
        }
        ChannelUpdate::AlreadySet => {
            ctx.say(format!(
                "The {} for this server is already set to <#{}>.",
                kind.display_name(),
                requested.unwrap_or_default()
            ))
            .await?;
        }
        ChannelUpdate::Disable { .. } => {
            // The moderation log announces its own shutdown while it still can
            if kind == LogChannelKind::Moderation {
                log_case(ctx.serenity_context(), ctx.data(), guild_id, disabled_case.clone()).await;
            }
            settings.set_log_channel(guild_id.get(), kind, None).await?;
            ctx.say(format!(
                "The {} for this server has been disabled.",
                kind.display_name()
            ))
            .await?;
            if kind == LogChannelKind::Member {
                log_case(ctx.serenity_context(), ctx.data(), guild_id, disabled_case).await;
            }
        }
        ChannelUpdate::Set { channel_id } => {
            let target = serenity::ChannelId::new(channel_id);
            if !bot_can_send(ctx.serenity_context(), guild_id, target) {
                ctx.say(format!(
                    "I do not have permissions to send messages in <#{}>.",
                    channel_id
                ))
                .await?;
                return Ok(());
            }

            settings
                .set_log_channel(guild_id.get(), kind, Some(channel_id))
                .await?;
            ctx.say(format!(
                "The {} for this server has been set to <#{}>.",
                kind.display_name(),
                channel_id
            ))
            .await?;
            log_case(
                ctx.serenity_context(),
                ctx.data(),
                guild_id,
                CaseDraft::new(ModAction::LogChannelUpdated, user_ref(ctx.author())).description(
                    format!("{} updated to <#{}>.", case_subject(kind), channel_id),
                ),
            )
            .await;
        }
    }
    Ok(())
}

/// Commands to manage server-specific settings for FumeGuard.
#[poise::command(
    slash_command,
    guild_only,
    category = "Settings",
    subcommands("mod_log", "member_log", "welcome_message")
)]
pub async fn set(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Set the moderation logging channel for the server.
#[poise::command(slash_command, guild_only, user_cooldown = 10, check = "checks::settings")]
pub async fn mod_log(
    ctx: Context<'_>,
    #[description = "The channel to log moderation actions in. Leave blank to disable."]
    #[channel_types("Text")]
    channel: Option<serenity::GuildChannel>,
) -> Result<(), Error> {
    set_log_channel(ctx, LogChannelKind::Moderation, channel).await
}

/// Set the member logging channel for the server.
#[poise::command(slash_command, guild_only, user_cooldown = 10, check = "checks::settings")]
pub async fn member_log(
    ctx: Context<'_>,
    #[description = "The channel to log member joins and leaves in. Leave blank to disable."]
    #[channel_types("Text")]
    channel: Option<serenity::GuildChannel>,
) -> Result<(), Error> {
    set_log_channel(ctx, LogChannelKind::Member, channel).await
}

#[derive(Debug, poise::Modal)]
#[name = "Welcome Message"]
struct WelcomeMessageModal {
    #[name = "Message"]
    #[placeholder = "Enter the welcome message to set (max. 1800 characters)"]
    #[paragraph]
    #[max_length = 1800]
    message: Option<String>,
}

/// Set the message new members receive when they join. Leave it empty to disable.
#[poise::command(slash_command, guild_only, user_cooldown = 10, check = "checks::settings")]
pub async fn welcome_message(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = require_guild(ctx)?;
    let settings = &ctx.data().settings;

    let current = settings.welcome_message(guild_id.get()).await?;
    let defaults = WelcomeMessageModal { message: current };

    let app_ctx = application(ctx)?;
    let Some(modal) = poise::execute_modal(app_ctx, Some(defaults), Some(MODAL_TIMEOUT)).await? else {
        ctx.say(MODAL_TIMEOUT_MESSAGE).await?;
        return Ok(());
    };

    let outcome = match settings
        .update_welcome_message(guild_id.get(), modal.message.as_deref(), SettingsSource::Command)
        .await
    {
        Ok(outcome) => outcome,
        Err(e @ SettingsError::WelcomeMessageTooLong { .. }) => {
            ctx.say(e.to_string()).await?;
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let moderator = user_ref(ctx.author());
    match outcome {
        WelcomeUpdate::NothingToDisable => {
            ctx.say("No welcome message is set for this server.").await?;
        }
        WelcomeUpdate::Unchanged => {
            ctx.say("The welcome message for the server is already set to the message you entered.")
                .await?;
        }
        WelcomeUpdate::Disabled => {
            ctx.say("The welcome message for this server has been disabled.")
                .await?;
            let draft = CaseDraft::new(ModAction::WelcomeMessageDisabled, moderator)
                .description("Welcome message has been disabled.");
            log_case(ctx.serenity_context(), ctx.data(), guild_id, draft).await;
        }
        WelcomeUpdate::Updated => {
            ctx.say("The welcome message for this server has been set.")
                .await?;
            let draft = CaseDraft::new(ModAction::WelcomeMessageUpdated, moderator)
                .description("Welcome message has been updated.");
            log_case(ctx.serenity_context(), ctx.data(), guild_id, draft).await;
        }
    }
    Ok(())
}

fn channel_field(channel: Option<u64>) -> String {
    channel
        .map(|id| format!("<#{}>", id))
        .unwrap_or_else(|| "Disabled".to_string())
}

fn roles_field(roles: &[u64]) -> String {
    if roles.is_empty() {
        return "None".to_string();
    }
    roles
        .iter()
        .map(|id| format!("<@&{}>", id))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Show the current settings of the server.
#[poise::command(
    slash_command,
    guild_only,
    user_cooldown = 10,
    category = "Settings",
    check = "checks::settings"
)]
pub async fn settings(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = require_guild(ctx)?;
    ctx.defer().await?;

    let current = ctx.data().settings.settings(guild_id.get()).await?;
    let welcome = if current.welcome_message.is_some() {
        "Enabled"
    } else {
        "Disabled"
    };
    let automod = if current.automod_enabled {
        "Enabled"
    } else {
        "Disabled"
    };

    let embed = serenity::CreateEmbed::new()
        .title("Server Settings")
        .color(ctx.data().embed_colour)
        .field(
            "Moderation Log",
            channel_field(current.log_channel(LogChannelKind::Moderation)),
            true,
        )
        .field(
            "Member Log",
            channel_field(current.log_channel(LogChannelKind::Member)),
            true,
        )
        .field("Welcome Message", welcome, true)
        .field("Automod", automod, true)
        .field(
            "Link Send Roles",
            roles_field(current.allowlist(AllowlistKind::LinkSend).role_ids()),
            false,
        )
        .field(
            "Link Embed Roles",
            roles_field(current.allowlist(AllowlistKind::LinkEmbed).role_ids()),
            false,
        )
        .field("Next Case", format!("#{}", current.case_number), true)
        .timestamp(serenity::Timestamp::now());

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}
