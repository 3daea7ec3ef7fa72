// Gateway events the bot reacts to outside of commands.

pub mod afk_mentions;
pub mod automod_filter;
pub mod guilds;
pub mod members;

use crate::discord::{Data, Error};
use poise::serenity_prelude as serenity;

pub async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Message { new_message } => {
            // Only guild messages from humans are scanned
            if new_message.author.bot || new_message.guild_id.is_none() {
                return Ok(());
            }

            // Automod runs first so a deleted message does not get AFK replies
            if automod_filter::filter_links(ctx, data, new_message).await {
                return Ok(());
            }
            afk_mentions::reply_to_afk_mentions(ctx, data, new_message).await;
        }
        serenity::FullEvent::GuildMemberAddition { new_member } => {
            members::on_member_join(ctx, data, new_member).await;
        }
        serenity::FullEvent::GuildMemberRemoval { guild_id, user, .. } => {
            members::on_member_leave(ctx, data, *guild_id, user).await;
        }
        serenity::FullEvent::GuildCreate { guild, .. } => {
            guilds::on_guild_available(ctx, data, guild).await;
        }
        _ => {}
    }
    Ok(())
}
