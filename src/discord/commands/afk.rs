// `/afk` command group.

use super::{require_guild, say_quietly};
use crate::core::afk::{afk_nickname, format_afk_list, strip_afk_prefix, AfkError};
use crate::core::best_effort::best_effort;
use crate::discord::checks;
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

/// Reply with the message of a user-facing AFK error, propagate the rest.
async fn reply_or_raise(ctx: Context<'_>, error: AfkError) -> Result<(), Error> {
    match error {
        AfkError::StorageError(_) => Err(error.into()),
        other => {
            ctx.say(other.to_string()).await?;
            Ok(())
        }
    }
}

/// Rename the caller, ignoring failures (owners and higher-ranked members
/// cannot be renamed by the bot).
async fn rename_author(ctx: Context<'_>, guild_id: serenity::GuildId, nickname: String, reason: &str) {
    best_effort(
        guild_id
            .edit_member(
                ctx.http(),
                ctx.author().id,
                serenity::EditMember::new()
                    .nickname(nickname)
                    .audit_log_reason(reason),
            )
            .await,
        "AFK nickname",
    );
}

async fn author_display_name(ctx: Context<'_>) -> String {
    match ctx.author_member().await {
        Some(member) => member.display_name().to_string(),
        None => ctx.author().display_name().to_string(),
    }
}

/// Various commands to manage your AFK status.
#[poise::command(
    slash_command,
    guild_only,
    category = "Afk",
    subcommands("set", "reset", "check", "list")
)]
pub async fn afk(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Sets your AFK status.
#[poise::command(slash_command, guild_only, user_cooldown = 3, check = "checks::afk")]
pub async fn set(
    ctx: Context<'_>,
    #[description = "The reason for being AFK"] reason: Option<String>,
) -> Result<(), Error> {
    let guild_id = require_guild(ctx)?;
    ctx.defer().await?;

    if let Err(e) = ctx
        .data()
        .afk
        .set(ctx.author().id.get(), guild_id.get(), reason.as_deref())
        .await
    {
        return reply_or_raise(ctx, e).await;
    }

    if let Some(nickname) = afk_nickname(&author_display_name(ctx).await) {
        rename_author(ctx, guild_id, nickname, "AFK status set.").await;
    }

    say_quietly(ctx, "**You are now AFK!**").await
}

/// Resets your AFK status.
#[poise::command(slash_command, guild_only, user_cooldown = 3, check = "checks::afk")]
pub async fn reset(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = require_guild(ctx)?;
    ctx.defer().await?;

    if let Err(e) = ctx
        .data()
        .afk
        .clear(ctx.author().id.get(), guild_id.get())
        .await
    {
        return reply_or_raise(ctx, e).await;
    }

    if let Some(nickname) = strip_afk_prefix(&author_display_name(ctx).await) {
        rename_author(ctx, guild_id, nickname, "AFK status removed.").await;
    }

    ctx.say("**Welcome back!** Your AFK status has been removed.")
        .await?;
    Ok(())
}

/// Checks if a member is afk.
#[poise::command(slash_command, guild_only, user_cooldown = 3)]
pub async fn check(
    ctx: Context<'_>,
    #[description = "The member to check"] member: serenity::Member,
) -> Result<(), Error> {
    let guild_id = require_guild(ctx)?;
    ctx.defer().await?;

    let record = ctx
        .data()
        .afk
        .status(member.user.id.get(), guild_id.get())
        .await?;

    let content = match record {
        Some(record) => record.status_line(),
        None => format!("<@{}> is not afk.", member.user.id),
    };
    say_quietly(ctx, content).await
}

/// Shows a list of members who are afk.
#[poise::command(slash_command, guild_only, user_cooldown = 3)]
pub async fn list(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = require_guild(ctx)?;
    ctx.defer().await?;

    let records = ctx.data().afk.list(guild_id.get()).await?;
    say_quietly(ctx, format_afk_list(&records)).await
}
