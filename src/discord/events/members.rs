use crate::discord::logging::member_log::{log_member, welcome_member};
use crate::discord::Data;
use poise::serenity_prelude as serenity;

pub async fn on_member_join(ctx: &serenity::Context, data: &Data, member: &serenity::Member) {
    if member.user.bot {
        return;
    }
    log_member(ctx, data, member.guild_id, &member.user, true).await;
    welcome_member(ctx, data, member).await;
}

pub async fn on_member_leave(
    ctx: &serenity::Context,
    data: &Data,
    guild_id: serenity::GuildId,
    user: &serenity::User,
) {
    if user.bot {
        return;
    }
    log_member(ctx, data, guild_id, user, false).await;
}
