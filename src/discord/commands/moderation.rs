// Moderation commands: removals, timeouts, channel mutes, warnings, purges
// and announcements. Every successful action is logged as a numbered case.

use super::{application, or_refused, require_guild, user_ref, MODAL_TIMEOUT, MODAL_TIMEOUT_MESSAGE};
use crate::core::best_effort::best_effort;
use crate::core::moderation::{
    resolve_ban_target, timeout_duration, validate_clear_amount, validate_delete_days,
    validate_reason, BannedUser, CaseDraft, ModAction,
};
use crate::discord::checks::{self, bot_can_send, caller_can_moderate, member_can_send};
use crate::discord::logging::case_log::log_case;
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

/// Discord only bulk-deletes messages younger than two weeks.
const BULK_DELETE_MAX_AGE_SECS: i64 = 14 * 24 * 60 * 60;

/// Tell the caller they are outranked. Returns `false` when they are.
async fn ensure_outranks(ctx: Context<'_>, member: &serenity::Member, verb: &str) -> Result<bool, Error> {
    if caller_can_moderate(ctx, member).await? {
        return Ok(true);
    }
    ctx.say(format!(
        "You cannot {verb} **{}**. Make sure you have a role higher than the member you are trying to {verb}.",
        member.user.tag()
    ))
    .await?;
    Ok(false)
}

async fn log(ctx: Context<'_>, guild_id: serenity::GuildId, draft: CaseDraft) {
    log_case(ctx.serenity_context(), ctx.data(), guild_id, draft).await;
}

fn draft(ctx: Context<'_>, action: ModAction) -> CaseDraft {
    CaseDraft::new(action, user_ref(ctx.author()))
}

/// Kick a member from the server.
#[poise::command(
    slash_command,
    guild_only,
    user_cooldown = 3,
    category = "Moderation",
    check = "checks::kick"
)]
pub async fn kick(
    ctx: Context<'_>,
    #[description = "The member to kick from the server"] member: serenity::Member,
    #[description = "The reason for kicking the member"] reason: Option<String>,
) -> Result<(), Error> {
    let reason = validate_reason(reason.as_deref())?;
    let guild_id = require_guild(ctx)?;
    ctx.defer().await?;

    if !ensure_outranks(ctx, &member, "kick").await? {
        return Ok(());
    }

    let result = match reason.as_deref() {
        Some(r) => member.kick_with_reason(ctx.http(), r).await,
        None => member.kick(ctx.http()).await,
    };
    let refusal = "I do not have permission to kick that user. Please make sure I have a role higher than the member you are trying to kick.";
    if or_refused(ctx, result, refusal).await?.is_none() {
        return Ok(());
    }

    ctx.say(format!("**{}** has been kicked from the server!", member.user.tag()))
        .await?;
    log(
        ctx,
        guild_id,
        draft(ctx, ModAction::Kick).target(user_ref(&member.user)).reason(reason),
    )
    .await;
    Ok(())
}

/// Ban a member from the server.
#[poise::command(
    slash_command,
    guild_only,
    user_cooldown = 3,
    category = "Moderation",
    check = "checks::ban"
)]
pub async fn ban(
    ctx: Context<'_>,
    #[description = "The member to ban from the server"] member: serenity::Member,
    #[description = "Days of the member's messages to delete (0-7)"]
    #[min = 0]
    #[max = 7]
    delete_message_days: Option<i64>,
    #[description = "The reason for banning the member"] reason: Option<String>,
) -> Result<(), Error> {
    let reason = validate_reason(reason.as_deref())?;
    let days = validate_delete_days(delete_message_days)?;
    let guild_id = require_guild(ctx)?;
    ctx.defer().await?;

    if !ensure_outranks(ctx, &member, "ban").await? {
        return Ok(());
    }

    let result = match reason.as_deref() {
        Some(r) => member.ban_with_reason(ctx.http(), days, r).await,
        None => member.ban(ctx.http(), days).await,
    };
    let refusal = "I do not have permission to ban that user. Please make sure I have a role higher than the member you are trying to ban.";
    if or_refused(ctx, result, refusal).await?.is_none() {
        return Ok(());
    }

    ctx.say(format!("**{}** has been banned from the server!", member.user.tag()))
        .await?;
    log(
        ctx,
        guild_id,
        draft(ctx, ModAction::Ban).target(user_ref(&member.user)).reason(reason),
    )
    .await;
    Ok(())
}

/// Unban a previously banned member in the server.
#[poise::command(
    slash_command,
    guild_only,
    user_cooldown = 3,
    category = "Moderation",
    check = "checks::ban"
)]
pub async fn unban(
    ctx: Context<'_>,
    #[description = "The name or ID of the member to unban"] member: String,
    #[description = "The reason for unbanning the member"] reason: Option<String>,
) -> Result<(), Error> {
    let reason = validate_reason(reason.as_deref())?;
    let guild_id = require_guild(ctx)?;
    ctx.defer().await?;

    let Some(bans) = or_refused(
        ctx,
        guild_id.bans(ctx.http(), None, None).await,
        "I do not have permission to view the bans of this server.",
    )
    .await?
    else {
        return Ok(());
    };

    let entries: Vec<BannedUser> = bans
        .iter()
        .map(|ban| BannedUser {
            id: ban.user.id.get(),
            name: ban.user.name.clone(),
        })
        .collect();

    let Some(target) = resolve_ban_target(&member, &entries) else {
        ctx.say("No such banned user found.").await?;
        return Ok(());
    };
    let Some(user) = bans.iter().find(|ban| ban.user.id.get() == target.id).map(|ban| &ban.user) else {
        ctx.say("No such banned user found.").await?;
        return Ok(());
    };

    let result = ctx
        .http()
        .remove_ban(guild_id, user.id, reason.as_deref())
        .await;
    if or_refused(ctx, result, "I do not have permission to unban that user.")
        .await?
        .is_none()
    {
        return Ok(());
    }

    ctx.say(format!("**{}** has been unbanned!", user.tag())).await?;
    log(
        ctx,
        guild_id,
        draft(ctx, ModAction::Unban).target(user_ref(user)).reason(reason),
    )
    .await;
    Ok(())
}

/// Timeout a member in the server.
#[poise::command(
    slash_command,
    guild_only,
    user_cooldown = 3,
    category = "Moderation",
    check = "checks::mute"
)]
pub async fn mute(
    ctx: Context<'_>,
    #[description = "The member to timeout in the server"] member: serenity::Member,
    #[description = "Minutes of timeout"]
    #[min = 0]
    minutes: Option<i64>,
    #[description = "Hours of timeout"]
    #[min = 0]
    hours: Option<i64>,
    #[description = "Days of timeout"]
    #[min = 0]
    #[max = 28]
    days: Option<i64>,
    #[description = "The reason for timing out the member"] reason: Option<String>,
) -> Result<(), Error> {
    let reason = validate_reason(reason.as_deref())?;
    let duration = timeout_duration(minutes, hours, days)?;
    let guild_id = require_guild(ctx)?;
    ctx.defer().await?;

    if !ensure_outranks(ctx, &member, "mute").await? {
        return Ok(());
    }

    let until = serenity::Timestamp::from_unix_timestamp((chrono::Utc::now() + duration).timestamp())?;
    let mut edit = serenity::EditMember::new().disable_communication_until_datetime(until);
    if let Some(r) = reason.as_deref() {
        edit = edit.audit_log_reason(r);
    }
    let result = guild_id.edit_member(ctx.http(), member.user.id, edit).await;
    let refusal = "I do not have permission to timeout that user. Please make sure I have a role higher than the member you are trying to mute.";
    if or_refused(ctx, result, refusal).await?.is_none() {
        return Ok(());
    }

    ctx.say(format!("**{}** has been timed out in the server!", member.user.tag()))
        .await?;
    log(
        ctx,
        guild_id,
        draft(ctx, ModAction::Mute).target(user_ref(&member.user)).reason(reason),
    )
    .await;
    Ok(())
}

/// Remove the timeout for a member in the server.
#[poise::command(
    slash_command,
    guild_only,
    user_cooldown = 3,
    category = "Moderation",
    check = "checks::mute"
)]
pub async fn unmute(
    ctx: Context<'_>,
    #[description = "The member to remove the timeout for"] member: serenity::Member,
    #[description = "The reason for removing the timeout"] reason: Option<String>,
) -> Result<(), Error> {
    let reason = validate_reason(reason.as_deref())?;
    let guild_id = require_guild(ctx)?;
    ctx.defer().await?;

    let mut edit = serenity::EditMember::new().enable_communication();
    if let Some(r) = reason.as_deref() {
        edit = edit.audit_log_reason(r);
    }
    let result = guild_id.edit_member(ctx.http(), member.user.id, edit).await;
    let refusal = "I do not have permission to remove the timeout of that user.";
    if or_refused(ctx, result, refusal).await?.is_none() {
        return Ok(());
    }

    ctx.say(format!("**{}** has been unmuted in the server!", member.user.tag()))
        .await?;
    log(
        ctx,
        guild_id,
        draft(ctx, ModAction::Unmute).target(user_ref(&member.user)).reason(reason),
    )
    .await;
    Ok(())
}

/// Mute a member in a channel.
#[poise::command(
    slash_command,
    guild_only,
    user_cooldown = 3,
    category = "Moderation",
    check = "checks::channel_mute"
)]
pub async fn channelmute(
    ctx: Context<'_>,
    #[description = "The member to mute in the channel"] member: serenity::Member,
    #[description = "The channel to mute the member in (defaults to this one)"]
    #[channel_types("Text")]
    channel: Option<serenity::GuildChannel>,
    #[description = "The reason for muting the member"] reason: Option<String>,
) -> Result<(), Error> {
    let reason = validate_reason(reason.as_deref())?;
    let guild_id = require_guild(ctx)?;
    let channel_id = channel.map(|c| c.id).unwrap_or_else(|| ctx.channel_id());
    ctx.defer().await?;

    if !ensure_outranks(ctx, &member, "mute").await? {
        return Ok(());
    }

    if !member_can_send(ctx.serenity_context(), guild_id, channel_id, &member) {
        ctx.say(format!("**{}** is already muted in <#{}>.", member.user.tag(), channel_id))
            .await?;
        return Ok(());
    }

    let overwrite = serenity::PermissionOverwrite {
        allow: serenity::Permissions::VIEW_CHANNEL,
        deny: serenity::Permissions::SEND_MESSAGES,
        kind: serenity::PermissionOverwriteType::Member(member.user.id),
    };
    let result = channel_id.create_permission(ctx.http(), overwrite).await;
    let refusal = format!("I do not have the permission to manage permissions for <#{}>.", channel_id);
    if or_refused(ctx, result, refusal).await?.is_none() {
        return Ok(());
    }

    ctx.say(format!("**{}** has been muted in <#{}>!", member.user.tag(), channel_id))
        .await?;
    log(
        ctx,
        guild_id,
        draft(ctx, ModAction::ChannelMute)
            .target(user_ref(&member.user))
            .channel(channel_id.get())
            .reason(reason),
    )
    .await;
    Ok(())
}

/// Unmute a member in a channel.
#[poise::command(
    slash_command,
    guild_only,
    user_cooldown = 3,
    category = "Moderation",
    check = "checks::channel_mute"
)]
pub async fn channelunmute(
    ctx: Context<'_>,
    #[description = "The member to unmute in the channel"] member: serenity::Member,
    #[description = "The channel to unmute the member in (defaults to this one)"]
    #[channel_types("Text")]
    channel: Option<serenity::GuildChannel>,
    #[description = "The reason for unmuting the member"] reason: Option<String>,
) -> Result<(), Error> {
    let reason = validate_reason(reason.as_deref())?;
    let guild_id = require_guild(ctx)?;
    let channel_id = channel.map(|c| c.id).unwrap_or_else(|| ctx.channel_id());
    ctx.defer().await?;

    if member_can_send(ctx.serenity_context(), guild_id, channel_id, &member) {
        ctx.say(format!("**{}** is not muted in <#{}> yet.", member.user.tag(), channel_id))
            .await?;
        return Ok(());
    }

    let result = channel_id
        .delete_permission(
            ctx.http(),
            serenity::PermissionOverwriteType::Member(member.user.id),
        )
        .await;
    let refusal = format!("I do not have the permission to manage permissions for <#{}>.", channel_id);
    if or_refused(ctx, result, refusal).await?.is_none() {
        return Ok(());
    }

    ctx.say(format!("**{}** has been unmuted in <#{}>!", member.user.tag(), channel_id))
        .await?;
    log(
        ctx,
        guild_id,
        draft(ctx, ModAction::ChannelUnmute)
            .target(user_ref(&member.user))
            .channel(channel_id.get())
            .reason(reason),
    )
    .await;
    Ok(())
}

/// Issue a warning to a member.
#[poise::command(
    slash_command,
    guild_only,
    user_cooldown = 3,
    category = "Moderation",
    check = "checks::warn"
)]
pub async fn warn(
    ctx: Context<'_>,
    #[description = "The member to issue a warning to"] member: serenity::Member,
    #[description = "The reason for issuing the warning"] reason: Option<String>,
) -> Result<(), Error> {
    let reason = validate_reason(reason.as_deref())?;
    let guild_id = require_guild(ctx)?;
    ctx.defer().await?;

    if !ensure_outranks(ctx, &member, "warn").await? {
        return Ok(());
    }

    let notice = format!(
        "<@{}> - You have been warned by **{}** with reason *{}*!",
        member.user.id,
        ctx.author().tag(),
        reason.as_deref().unwrap_or("None")
    );
    best_effort(
        member
            .user
            .direct_message(ctx.http(), serenity::CreateMessage::new().content(notice))
            .await,
        "warning DM",
    );

    ctx.say(format!("**{}** has been warned!", member.user.tag()))
        .await?;
    log(
        ctx,
        guild_id,
        draft(ctx, ModAction::Warn).target(user_ref(&member.user)).reason(reason),
    )
    .await;
    Ok(())
}

/// Clear messages from the channel.
#[poise::command(
    slash_command,
    guild_only,
    user_cooldown = 3,
    category = "Moderation",
    check = "checks::clear"
)]
pub async fn clear(
    ctx: Context<'_>,
    #[description = "The number of messages to clear (between 1 and 100)"]
    #[min = 1]
    #[max = 100]
    amount: i64,
) -> Result<(), Error> {
    let amount = validate_clear_amount(amount)?;
    let guild_id = require_guild(ctx)?;
    let channel_id = ctx.channel_id();
    // Ephemeral so the deferred reply is not part of the channel history
    ctx.defer_ephemeral().await?;

    let refusal = "I do not have permission to delete messages in this channel.";
    let Some(messages) = or_refused(
        ctx,
        channel_id
            .messages(ctx.http(), serenity::GetMessages::new().limit(amount))
            .await,
        refusal,
    )
    .await?
    else {
        return Ok(());
    };

    let cutoff = serenity::Timestamp::now().unix_timestamp() - BULK_DELETE_MAX_AGE_SECS;
    let ids: Vec<serenity::MessageId> = messages
        .iter()
        .filter(|message| message.timestamp.unix_timestamp() > cutoff)
        .map(|message| message.id)
        .collect();

    let result = match ids.as_slice() {
        [] => Ok(()),
        [single] => channel_id.delete_message(ctx.http(), *single).await,
        many => channel_id.delete_messages(ctx.http(), many).await,
    };
    if or_refused(ctx, result, refusal).await?.is_none() {
        return Ok(());
    }

    tracing::info!(
        guild_id = guild_id.get(),
        channel_id = channel_id.get(),
        count = ids.len(),
        "Cleared messages"
    );
    ctx.say(format!("\u{2705} Cleared {} messages.", ids.len()))
        .await?;
    log(
        ctx,
        guild_id,
        draft(ctx, ModAction::Clear)
            .channel(channel_id.get())
            .message_count(ids.len() as u64),
    )
    .await;
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, poise::ChoiceParameter)]
pub enum AnnouncementMention {
    #[name = "everyone"]
    Everyone,
    #[name = "here"]
    Here,
    #[name = "none"]
    Nobody,
}

impl AnnouncementMention {
    fn prefix(self) -> &'static str {
        match self {
            AnnouncementMention::Everyone => "@everyone ",
            AnnouncementMention::Here => "@here ",
            AnnouncementMention::Nobody => "",
        }
    }
}

#[derive(Debug, poise::Modal)]
#[name = "Create an Announcement"]
struct AnnouncementModal {
    #[name = "Message"]
    #[placeholder = "Enter the message to announce (max. 1800 characters)"]
    #[paragraph]
    #[min_length = 1]
    #[max_length = 1800]
    message: String,
}

/// Make an announcement in a channel.
#[poise::command(
    slash_command,
    guild_only,
    user_cooldown = 3,
    category = "Moderation",
    check = "checks::announce"
)]
pub async fn announce(
    ctx: Context<'_>,
    #[description = "The channel to announce in"]
    #[channel_types("Text", "News")]
    channel: serenity::GuildChannel,
    #[description = "Who to ping with the announcement"] mention: AnnouncementMention,
) -> Result<(), Error> {
    let guild_id = require_guild(ctx)?;

    if !bot_can_send(ctx.serenity_context(), guild_id, channel.id) {
        ctx.say(format!("I do not have permission to send messages in <#{}>.", channel.id))
            .await?;
        return Ok(());
    }

    let app_ctx = application(ctx)?;
    let Some(modal) = poise::execute_modal(app_ctx, None::<AnnouncementModal>, Some(MODAL_TIMEOUT)).await? else {
        ctx.say(MODAL_TIMEOUT_MESSAGE).await?;
        return Ok(());
    };

    let announcement = serenity::CreateMessage::new()
        .content(format!("{}{}", mention.prefix(), modal.message))
        .allowed_mentions(
            serenity::CreateAllowedMentions::new()
                .everyone(mention != AnnouncementMention::Nobody)
                .all_users(true)
                .all_roles(true),
        );
    let result = channel.id.send_message(ctx.http(), announcement).await;
    let refusal = format!("I do not have permission to send messages in <#{}>.", channel.id);
    if or_refused(ctx, result, refusal).await?.is_none() {
        return Ok(());
    }

    ctx.say(format!("The announcement has been made in <#{}>.", channel.id))
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_announcement_prefixes() {
        assert_eq!(AnnouncementMention::Everyone.prefix(), "@everyone ");
        assert_eq!(AnnouncementMention::Here.prefix(), "@here ");
        assert_eq!(AnnouncementMention::Nobody.prefix(), "");
    }
}
