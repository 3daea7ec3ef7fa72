use crate::core::best_effort::best_effort;
use crate::discord::Data;
use poise::serenity_prelude as serenity;

/// Ids of every non-bot user mentioned, the author included.
fn mentioned_humans(mentions: &[serenity::User]) -> Vec<u64> {
    mentions
        .iter()
        .filter(|user| !user.bot)
        .map(|user| user.id.get())
        .collect()
}

/// Tell the channel when someone it mentions is AFK. The reply never pings.
pub async fn reply_to_afk_mentions(
    ctx: &serenity::Context,
    data: &Data,
    message: &serenity::Message,
) {
    let Some(guild_id) = message.guild_id else {
        return;
    };

    let mentioned = mentioned_humans(&message.mentions);
    if mentioned.is_empty() {
        return;
    }

    let records = match data.afk.mentioned_afk(guild_id.get(), &mentioned).await {
        Ok(records) => records,
        Err(e) => {
            tracing::error!(guild_id = guild_id.get(), "Failed to look up AFK members: {}", e);
            return;
        }
    };

    for record in records {
        let reply = serenity::CreateMessage::new()
            .content(record.status_line())
            .reference_message(message)
            .allowed_mentions(serenity::CreateAllowedMentions::new());
        best_effort(
            message.channel_id.send_message(&ctx.http, reply).await,
            "AFK mention reply",
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: u64, bot: bool) -> serenity::User {
        let mut user = serenity::User::default();
        user.id = serenity::UserId::new(id);
        user.bot = bot;
        user
    }

    #[test]
    fn test_self_mentions_are_kept_and_bots_dropped() {
        // Author 1 mentions themselves, a bot and another user
        let mentions = vec![user(1, false), user(2, true), user(3, false)];

        assert_eq!(mentioned_humans(&mentions), vec![1, 3]);
    }
}
