use crate::core::best_effort::best_effort;
use crate::discord::Data;
use poise::serenity_prelude as serenity;

/// Apply the guild's link rules to a message. Returns `true` when the
/// message was deleted.
pub async fn filter_links(
    ctx: &serenity::Context,
    data: &Data,
    message: &serenity::Message,
) -> bool {
    let Some(guild_id) = message.guild_id else {
        return false;
    };

    let author_roles: Vec<u64> = message
        .member
        .as_ref()
        .map(|member| member.roles.iter().map(|role| role.get()).collect())
        .unwrap_or_default();

    let verdict = match data
        .automod
        .inspect_message(guild_id.get(), &message.content, &author_roles)
        .await
    {
        Ok(verdict) => verdict,
        Err(e) => {
            tracing::error!(guild_id = guild_id.get(), "Automod lookup failed: {}", e);
            return false;
        }
    };

    if verdict.is_clean() {
        return false;
    }

    if verdict.delete_message {
        match message.delete(ctx).await {
            Ok(()) => {
                tracing::debug!(
                    guild_id = guild_id.get(),
                    user_id = message.author.id.get(),
                    "Deleted message with link"
                );
                best_effort(
                    message
                        .channel_id
                        .say(
                            &ctx.http,
                            format!(
                                "<@{}>, you are not allowed to send links in this server.",
                                message.author.id
                            ),
                        )
                        .await,
                    "automod notice",
                );
                return true;
            }
            Err(e) => tracing::warn!("Failed to delete message {}: {}", message.id, e),
        }
    }

    if verdict.suppress_embeds {
        let mut message = message.clone();
        best_effort(
            message
                .edit(ctx, serenity::EditMessage::new().suppress_embeds(true))
                .await,
            "embed suppression",
        );
    }

    false
}
