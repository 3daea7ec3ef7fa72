// The dashboard's view of Discord, served from the gateway cache.

use crate::core::ipc::{ChannelSummary, GuildDirectory, MutualGuild};
use crate::core::permissions::Permission;
use crate::discord::checks::to_capabilities;
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use std::sync::Arc;

pub struct SerenityDirectory {
    cache: Arc<serenity::Cache>,
    http: Arc<serenity::Http>,
    /// Where the commands were registered, when not globally.
    command_guild: Option<serenity::GuildId>,
}

impl SerenityDirectory {
    pub fn new(
        cache: Arc<serenity::Cache>,
        http: Arc<serenity::Http>,
        command_guild: Option<u64>,
    ) -> Self {
        Self {
            cache,
            http,
            command_guild: command_guild.and_then(guild_id),
        }
    }
}

fn guild_id(id: u64) -> Option<serenity::GuildId> {
    (id != 0).then(|| serenity::GuildId::new(id))
}

fn user_id(id: u64) -> Option<serenity::UserId> {
    (id != 0).then(|| serenity::UserId::new(id))
}

#[async_trait]
impl GuildDirectory for SerenityDirectory {
    async fn guild_count(&self) -> usize {
        self.cache.guild_count()
    }

    async fn user_count(&self) -> usize {
        self.cache.user_count()
    }

    async fn command_count(&self) -> Result<usize, String> {
        let commands = match self.command_guild {
            Some(guild) => self.http.get_guild_commands(guild).await,
            None => self.http.get_global_commands().await,
        };
        commands
            .map(|commands| commands.len())
            .map_err(|e| e.to_string())
    }

    async fn has_guild(&self, id: u64) -> bool {
        guild_id(id).is_some_and(|id| self.cache.guild(id).is_some())
    }

    async fn has_user(&self, id: u64) -> bool {
        user_id(id).is_some_and(|id| self.cache.user(id).is_some())
    }

    async fn sendable_text_channels(&self, id: u64) -> Option<Vec<ChannelSummary>> {
        let bot_id = self.cache.current_user().id;
        let guild = self.cache.guild(guild_id(id)?)?;
        let Some(bot) = guild.members.get(&bot_id) else {
            return Some(Vec::new());
        };

        let mut channels: Vec<&serenity::GuildChannel> = guild
            .channels
            .values()
            .filter(|channel| channel.kind == serenity::ChannelType::Text)
            .filter(|channel| {
                let perms = guild.user_permissions_in(channel, bot);
                perms.view_channel() && perms.send_messages()
            })
            .collect();
        channels.sort_by_key(|channel| channel.position);

        Some(
            channels
                .into_iter()
                .map(|channel| ChannelSummary {
                    id: channel.id.get(),
                    name: channel.name.clone(),
                })
                .collect(),
        )
    }

    async fn channel(&self, guild: u64, channel: u64) -> Option<ChannelSummary> {
        if channel == 0 {
            return None;
        }
        let guild = self.cache.guild(guild_id(guild)?)?;
        guild
            .channels
            .get(&serenity::ChannelId::new(channel))
            .map(|channel| ChannelSummary {
                id: channel.id.get(),
                name: channel.name.clone(),
            })
    }

    async fn mutual_guilds(&self, id: u64) -> Vec<MutualGuild> {
        let Some(user) = user_id(id) else {
            return Vec::new();
        };
        let bot_id = self.cache.current_user().id;

        self.cache
            .guilds()
            .into_iter()
            .filter_map(|guild_id| {
                let guild = self.cache.guild(guild_id)?;
                let member = guild.members.get(&user)?;
                let member_perms = to_capabilities(guild.member_permissions(member));
                let bot_perms = guild
                    .members
                    .get(&bot_id)
                    .map(|bot| to_capabilities(guild.member_permissions(bot)))
                    .unwrap_or_default();

                Some(MutualGuild {
                    id: guild_id.get(),
                    name: guild.name.clone(),
                    member_manage_guild: member_perms.has(Permission::ManageGuild),
                    bot_manage_nicknames: bot_perms.has(Permission::ManageNicknames),
                })
            })
            .collect()
    }

    async fn member_display_name(&self, guild: u64, user: u64) -> Option<String> {
        let guild = self.cache.guild(guild_id(guild)?)?;
        guild
            .members
            .get(&user_id(user)?)
            .map(|member| member.display_name().to_string())
    }

    async fn set_nickname(
        &self,
        guild: u64,
        user: u64,
        nickname: &str,
        reason: &str,
    ) -> Result<(), String> {
        let (Some(guild), Some(user)) = (guild_id(guild), user_id(user)) else {
            return Err("Invalid id.".to_string());
        };
        guild
            .edit_member(
                self.http.as_ref(),
                user,
                serenity::EditMember::new()
                    .nickname(nickname)
                    .audit_log_reason(reason),
            )
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory(command_guild: Option<u64>) -> SerenityDirectory {
        SerenityDirectory::new(
            Arc::new(serenity::Cache::new()),
            Arc::new(serenity::Http::new("")),
            command_guild,
        )
    }

    #[test]
    fn test_commands_are_counted_where_they_were_registered() {
        assert_eq!(directory(None).command_guild, None);
        assert_eq!(directory(Some(0)).command_guild, None);
        assert_eq!(
            directory(Some(42)).command_guild,
            Some(serenity::GuildId::new(42))
        );
    }
}
