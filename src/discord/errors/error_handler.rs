// Central poise error hook and helpers for replying to failures.

use crate::core::best_effort::best_effort;
use crate::core::cooldowns::cooldown_message;
use crate::core::moderation::ValidationError;
use crate::discord::{Context, Data, Error};
use poise::serenity_prelude as serenity;

/// Discord answered a mutating call with 403.
pub fn is_forbidden(error: &serenity::Error) -> bool {
    match error {
        serenity::Error::Http(serenity::HttpError::UnsuccessfulRequest(response)) => {
            response.status_code.as_u16() == 403
        }
        serenity::Error::Model(serenity::ModelError::InvalidPermissions { .. }) => true,
        _ => false,
    }
}

pub async fn reply_ephemeral(ctx: Context<'_>, content: impl Into<String>) -> Result<(), Error> {
    ctx.send(
        poise::CreateReply::default()
            .content(content)
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

pub async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            tracing::error!("Failed to start bot: {}", error);
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            // Rejected input is the caller's to fix
            if let Some(invalid) = error.downcast_ref::<ValidationError>() {
                best_effort(
                    reply_ephemeral(ctx, invalid.to_string()).await,
                    "validation reply",
                );
                return;
            }

            let forbidden = error
                .downcast_ref::<serenity::Error>()
                .is_some_and(is_forbidden);

            let message = if forbidden {
                tracing::warn!(
                    command = %ctx.command().qualified_name,
                    "Discord refused the action: {}",
                    error
                );
                "I do not have permission to perform this action."
            } else {
                tracing::error!(
                    command = %ctx.command().qualified_name,
                    "Command failed: {}",
                    error
                );
                "Something went wrong while running this command."
            };
            best_effort(reply_ephemeral(ctx, message).await, "error reply");
        }
        poise::FrameworkError::CommandCheckFailed { error, ctx, .. } => {
            let message = error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "You cannot use this command.".to_string());
            best_effort(reply_ephemeral(ctx, message).await, "check failure reply");
        }
        poise::FrameworkError::CooldownHit {
            remaining_cooldown,
            ctx,
            ..
        } => {
            best_effort(
                reply_ephemeral(ctx, cooldown_message(remaining_cooldown)).await,
                "cooldown reply",
            );
        }
        poise::FrameworkError::GuildOnly { ctx, .. } => {
            best_effort(
                reply_ephemeral(ctx, "This command can only be used in a server.").await,
                "guild-only reply",
            );
        }
        other => {
            if let Err(e) = poise::builtins::on_error(other).await {
                tracing::error!("Error while handling error: {}", e);
            }
        }
    }
}
