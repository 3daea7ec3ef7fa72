// Every slash command the bot registers, plus small helpers the command
// modules share.

pub mod afk;
pub mod automod;
pub mod help;
pub mod moderation;
pub mod roles;
pub mod settings;

use crate::core::moderation::UserRef;
use crate::discord::errors::is_forbidden;
use crate::discord::{ApplicationContext, Context, Data, Error};
use poise::serenity_prelude as serenity;
use std::time::Duration;

/// How long a modal stays open before the action is abandoned.
pub const MODAL_TIMEOUT: Duration = Duration::from_secs(5 * 60);

pub const MODAL_TIMEOUT_MESSAGE: &str = "Timeout! Please try again.";

pub fn all() -> Vec<poise::Command<Data, Error>> {
    vec![
        moderation::kick(),
        moderation::ban(),
        moderation::unban(),
        moderation::mute(),
        moderation::unmute(),
        moderation::channelmute(),
        moderation::channelunmute(),
        moderation::warn(),
        moderation::clear(),
        moderation::announce(),
        roles::role(),
        afk::afk(),
        automod::automod(),
        settings::set(),
        settings::settings(),
        help::help(),
    ]
}

pub fn user_ref(user: &serenity::User) -> UserRef {
    UserRef::new(user.id.get(), user.tag())
}

pub fn require_guild(ctx: Context<'_>) -> Result<serenity::GuildId, Error> {
    ctx.guild_id()
        .ok_or_else(|| "This command can only be used in a server.".into())
}

/// Modals only exist on slash commands.
pub fn application(ctx: Context<'_>) -> Result<ApplicationContext<'_>, Error> {
    match ctx {
        poise::Context::Application(app) => Ok(app),
        poise::Context::Prefix(_) => Err("This command is only available as a slash command.".into()),
    }
}

/// Unwrap the result of a Discord call. When Discord refused it with a 403
/// the caller is told `refusal` and `None` comes back.
pub async fn or_refused<T>(
    ctx: Context<'_>,
    result: serenity::Result<T>,
    refusal: impl Into<String>,
) -> Result<Option<T>, Error> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if is_forbidden(&e) => {
            tracing::debug!("Discord refused a call: {}", e);
            ctx.send(
                poise::CreateReply::default()
                    .content(refusal)
                    .allowed_mentions(serenity::CreateAllowedMentions::new()),
            )
            .await?;
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Reply without pinging anyone named in the text.
pub async fn say_quietly(ctx: Context<'_>, content: impl Into<String>) -> Result<(), Error> {
    ctx.send(
        poise::CreateReply::default()
            .content(content)
            .allowed_mentions(serenity::CreateAllowedMentions::new()),
    )
    .await?;
    Ok(())
}
