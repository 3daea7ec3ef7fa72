// IPC service - dispatches dashboard requests to the settings and AFK services.

use super::ipc_models::{ChannelSummary, IpcError, IpcPayload, MutualGuild};
use crate::core::afk::{afk_nickname, strip_afk_prefix, AfkError, AfkService, AfkStore};
use crate::core::best_effort::best_effort;
use crate::core::settings::{
    LogChannelKind, SettingsError, SettingsService, SettingsSource, SettingsStore,
};
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// Read access to the bot's view of Discord, plus the one write the dashboard
/// needs (nicknames for AFK toggles).
#[async_trait]
pub trait GuildDirectory: Send + Sync {
    async fn guild_count(&self) -> usize;

    async fn user_count(&self) -> usize;

    /// Number of registered application commands.
    async fn command_count(&self) -> Result<usize, String>;

    async fn has_guild(&self, guild_id: u64) -> bool;

    async fn has_user(&self, user_id: u64) -> bool;

    /// Text channels the bot can send messages in, or `None` for an unknown guild.
    async fn sendable_text_channels(&self, guild_id: u64) -> Option<Vec<ChannelSummary>>;

    async fn channel(&self, guild_id: u64, channel_id: u64) -> Option<ChannelSummary>;

    async fn mutual_guilds(&self, user_id: u64) -> Vec<MutualGuild>;

    /// Display name of a guild member, or `None` if they are not a member.
    async fn member_display_name(&self, guild_id: u64, user_id: u64) -> Option<String>;

    async fn set_nickname(
        &self,
        guild_id: u64,
        user_id: u64,
        nickname: &str,
        reason: &str,
    ) -> Result<(), String>;
}

pub struct IpcService<D, S, A>
where
    D: GuildDirectory,
    S: SettingsStore,
    A: AfkStore,
{
    directory: D,
    settings: Arc<SettingsService<S>>,
    afk: Arc<AfkService<A>>,
}

impl From<SettingsError> for IpcError {
    fn from(e: SettingsError) -> Self {
        match e {
            SettingsError::WelcomeMessageTooLong { .. } => {
                IpcError::bad_request("Welcome message too long.")
            }
            SettingsError::StorageError(msg) => {
                tracing::error!("Storage error while serving IPC request: {}", msg);
                IpcError::internal()
            }
        }
    }
}

impl From<AfkError> for IpcError {
    fn from(e: AfkError) -> Self {
        match e {
            AfkError::ReasonTooLong { .. } => IpcError::bad_request("AFK reason too long."),
            AfkError::NotAfk => IpcError::bad_request("User is not AFK."),
            AfkError::AlreadyAfk => IpcError::bad_request("User is already AFK."),
            AfkError::StorageError(msg) => {
                tracing::error!("Storage error while serving IPC request: {}", msg);
                IpcError::internal()
            }
        }
    }
}

fn success() -> Value {
    json!({ "status": 200, "message": "Success." })
}

impl<D, S, A> IpcService<D, S, A>
where
    D: GuildDirectory,
    S: SettingsStore,
    A: AfkStore,
{
    pub fn new(directory: D, settings: Arc<SettingsService<S>>, afk: Arc<AfkService<A>>) -> Self {
        Self {
            directory,
            settings,
            afk,
        }
    }

    pub async fn handle(&self, endpoint: &str, payload: IpcPayload) -> Result<Value, IpcError> {
        tracing::debug!(endpoint, "IPC request");
        match endpoint {
            "get_guild_count" => Ok(json!({
                "status": 200,
                "count": self.directory.guild_count().await,
            })),
            "get_user_count" => Ok(json!({
                "status": 200,
                "count": self.directory.user_count().await,
            })),
            "get_command_count" => self.command_count().await,
            "get_channel_list" => self.channel_list(&payload).await,
            "get_mutual_guilds" => self.mutual_guilds(&payload).await,
            "get_mod_log_channel" => self.get_log_channel(&payload, LogChannelKind::Moderation).await,
            "get_member_log_channel" => self.get_log_channel(&payload, LogChannelKind::Member).await,
            "update_mod_log_channel" => {
                self.update_log_channel(&payload, LogChannelKind::Moderation).await
            }
            "update_member_log_channel" => {
                self.update_log_channel(&payload, LogChannelKind::Member).await
            }
            "get_welcome_message" => self.get_welcome_message(&payload).await,
            "update_welcome_message" => self.update_welcome_message(&payload).await,
            "is_afk" => self.is_afk(&payload).await,
            "get_afk_details" => self.afk_details(&payload).await,
            "toggle_afk" => self.toggle_afk(&payload).await,
            _ => Err(IpcError::not_found("Unknown endpoint.")),
        }
    }

    async fn command_count(&self) -> Result<Value, IpcError> {
        let count = self.directory.command_count().await.map_err(|e| {
            tracing::warn!("Failed to fetch application commands: {}", e);
            IpcError::internal()
        })?;
        Ok(json!({ "status": 200, "count": count }))
    }

    async fn require_guild(&self, payload: &IpcPayload) -> Result<u64, IpcError> {
        match payload.guild_id {
            Some(id) if self.directory.has_guild(id).await => Ok(id),
            _ => Err(IpcError::not_found("Guild not found.")),
        }
    }

    async fn require_user(&self, payload: &IpcPayload) -> Result<u64, IpcError> {
        match payload.user_id {
            Some(id) if self.directory.has_user(id).await => Ok(id),
            _ => Err(IpcError::not_found("User not found.")),
        }
    }

    /// Resolve (guild, user) and confirm membership. Returns the member's display name.
    async fn require_member(&self, payload: &IpcPayload) -> Result<(u64, u64, String), IpcError> {
        let user_id = self.require_user(payload).await?;
        let guild_id = self.require_guild(payload).await?;
        let display_name = self
            .directory
            .member_display_name(guild_id, user_id)
            .await
            .ok_or_else(|| IpcError::not_found("Member not found."))?;
        Ok((guild_id, user_id, display_name))
    }

    async fn channel_list(&self, payload: &IpcPayload) -> Result<Value, IpcError> {
        let channels = match payload.guild_id {
            Some(id) => self.directory.sendable_text_channels(id).await,
            None => None,
        }
        .ok_or_else(|| IpcError::not_found("Guild not found."))?;

        let mut map = Map::new();
        for channel in channels {
            map.insert(channel.id.to_string(), Value::String(channel.name));
        }
        Ok(json!({ "channels": map }))
    }

    async fn mutual_guilds(&self, payload: &IpcPayload) -> Result<Value, IpcError> {
        let user_id = self.require_user(payload).await?;

        let mut map = Map::new();
        for guild in self.directory.mutual_guilds(user_id).await {
            map.insert(guild.id.to_string(), json!(guild));
        }
        Ok(json!({ "guilds": map }))
    }

    async fn get_log_channel(
        &self,
        payload: &IpcPayload,
        kind: LogChannelKind,
    ) -> Result<Value, IpcError> {
        let guild_id = self.require_guild(payload).await?;

        match self.settings.log_channel(guild_id, kind).await? {
            None => Ok(json!({ "id": 0, "name": "Logging disabled." })),
            Some(channel_id) => {
                let channel = self
                    .directory
                    .channel(guild_id, channel_id)
                    .await
                    .ok_or_else(|| IpcError::not_found("Channel not found."))?;
                Ok(json!({ "id": channel.id, "name": channel.name }))
            }
        }
    }

    async fn update_log_channel(
        &self,
        payload: &IpcPayload,
        kind: LogChannelKind,
    ) -> Result<Value, IpcError> {
        let guild_id = self.require_guild(payload).await?;

        if let Some(channel_id) = payload.channel_id {
            if self.directory.channel(guild_id, channel_id).await.is_none() {
                return Err(IpcError::not_found("Channel not found."));
            }
        }

        self.settings
            .set_log_channel(guild_id, kind, payload.channel_id)
            .await?;
        Ok(success())
    }

    async fn get_welcome_message(&self, payload: &IpcPayload) -> Result<Value, IpcError> {
        let guild_id = self.require_guild(payload).await?;
        let message = self.settings.welcome_message(guild_id).await?;
        Ok(json!({ "message": message }))
    }

    async fn update_welcome_message(&self, payload: &IpcPayload) -> Result<Value, IpcError> {
        let guild_id = self.require_guild(payload).await?;
        self.settings
            .update_welcome_message(guild_id, payload.message.as_deref(), SettingsSource::Dashboard)
            .await?;
        Ok(success())
    }

    async fn is_afk(&self, payload: &IpcPayload) -> Result<Value, IpcError> {
        let (guild_id, user_id, _) = self.require_member(payload).await?;
        let afk = self.afk.is_afk(user_id, guild_id).await?;
        Ok(json!({ "afk": afk }))
    }

    async fn afk_details(&self, payload: &IpcPayload) -> Result<Value, IpcError> {
        let (guild_id, user_id, _) = self.require_member(payload).await?;
        let record = self
            .afk
            .status(user_id, guild_id)
            .await?
            .ok_or(AfkError::NotAfk)?;

        Ok(json!({
            "details": {
                "user_id": record.user_id,
                "guild_id": record.guild_id,
                "start": record.dashboard_start(),
                "reason": record.reason,
            }
        }))
    }

    async fn toggle_afk(&self, payload: &IpcPayload) -> Result<Value, IpcError> {
        let (guild_id, user_id, display_name) = self.require_member(payload).await?;

        if self.afk.is_afk(user_id, guild_id).await? {
            self.afk.clear(user_id, guild_id).await?;
            if let Some(nick) = strip_afk_prefix(&display_name) {
                best_effort(
                    self.directory
                        .set_nickname(guild_id, user_id, &nick, "AFK status removed.")
                        .await,
                    "AFK nickname reset",
                );
            }
        } else {
            self.afk
                .set(user_id, guild_id, payload.reason.as_deref())
                .await?;
            if let Some(nick) = afk_nickname(&display_name) {
                best_effort(
                    self.directory
                        .set_nickname(guild_id, user_id, &nick, "AFK status set.")
                        .await,
                    "AFK nickname set",
                );
            }
        }

        Ok(success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::storage::in_memory::InMemoryStore;
    use dashmap::DashMap;

    const GUILD: u64 = 100;
    const USER: u64 = 7;
    const CHANNEL: u64 = 500;

    /// A directory with one guild, one member and one channel.
    #[derive(Default)]
    struct FakeDirectory {
        nicknames: DashMap<(u64, u64), String>,
        refuse_renames: bool,
    }

    impl FakeDirectory {
        fn with_member(name: &str) -> Self {
            let directory = Self::default();
            directory.nicknames.insert((GUILD, USER), name.to_string());
            directory
        }
    }

    #[async_trait]
    impl GuildDirectory for FakeDirectory {
        async fn guild_count(&self) -> usize {
            1
        }

        async fn user_count(&self) -> usize {
            self.nicknames.len()
        }

        async fn command_count(&self) -> Result<usize, String> {
            Ok(33)
        }

        async fn has_guild(&self, guild_id: u64) -> bool {
            guild_id == GUILD
        }

        async fn has_user(&self, user_id: u64) -> bool {
            user_id == USER
        }

        async fn sendable_text_channels(&self, guild_id: u64) -> Option<Vec<ChannelSummary>> {
            (guild_id == GUILD).then(|| {
                vec![ChannelSummary {
                    id: CHANNEL,
                    name: "general".into(),
                }]
            })
        }

        async fn channel(&self, guild_id: u64, channel_id: u64) -> Option<ChannelSummary> {
            (guild_id == GUILD && channel_id == CHANNEL).then(|| ChannelSummary {
                id: CHANNEL,
                name: "general".into(),
            })
        }

        async fn mutual_guilds(&self, _user_id: u64) -> Vec<MutualGuild> {
            vec![MutualGuild {
                id: GUILD,
                name: "Test Guild".into(),
                member_manage_guild: true,
                bot_manage_nicknames: false,
            }]
        }

        async fn member_display_name(&self, guild_id: u64, user_id: u64) -> Option<String> {
            self.nicknames.get(&(guild_id, user_id)).map(|n| n.value().clone())
        }

        async fn set_nickname(
            &self,
            guild_id: u64,
            user_id: u64,
            nickname: &str,
            _reason: &str,
        ) -> Result<(), String> {
            if self.refuse_renames {
                return Err("Missing Permissions".into());
            }
            self.nicknames.insert((guild_id, user_id), nickname.to_string());
            Ok(())
        }
    }

    type TestService = IpcService<FakeDirectory, InMemoryStore, InMemoryStore>;

    fn service(directory: FakeDirectory) -> TestService {
        let store = InMemoryStore::new();
        IpcService::new(
            directory,
            Arc::new(SettingsService::new(store.clone())),
            Arc::new(AfkService::new(store)),
        )
    }

    fn payload(guild: Option<u64>, user: Option<u64>) -> IpcPayload {
        IpcPayload {
            guild_id: guild,
            user_id: user,
            ..IpcPayload::default()
        }
    }

    #[tokio::test]
    async fn test_counts() {
        let service = service(FakeDirectory::with_member("bob"));

        let guilds = service.handle("get_guild_count", IpcPayload::default()).await.unwrap();
        assert_eq!(guilds, json!({ "status": 200, "count": 1 }));

        let commands = service.handle("get_command_count", IpcPayload::default()).await.unwrap();
        assert_eq!(commands["count"], 33);
    }

    #[tokio::test]
    async fn test_unknown_endpoint() {
        let service = service(FakeDirectory::default());

        let err = service.handle("drop_tables", IpcPayload::default()).await.unwrap_err();

        assert_eq!(err, IpcError::not_found("Unknown endpoint."));
    }

    #[tokio::test]
    async fn test_channel_list_and_unknown_guild() {
        let service = service(FakeDirectory::default());

        let list = service
            .handle("get_channel_list", payload(Some(GUILD), None))
            .await
            .unwrap();
        assert_eq!(list, json!({ "channels": { "500": "general" } }));

        let err = service
            .handle("get_channel_list", payload(Some(1), None))
            .await
            .unwrap_err();
        assert_eq!(err.message, "Guild not found.");
    }

    #[tokio::test]
    async fn test_mutual_guilds_keyed_by_id() {
        let service = service(FakeDirectory::with_member("bob"));

        let guilds = service
            .handle("get_mutual_guilds", payload(None, Some(USER)))
            .await
            .unwrap();

        assert_eq!(guilds["guilds"]["100"]["name"], "Test Guild");
        assert_eq!(guilds["guilds"]["100"]["member_manage_guild"], true);

        let err = service
            .handle("get_mutual_guilds", payload(None, Some(8)))
            .await
            .unwrap_err();
        assert_eq!(err.message, "User not found.");
    }

    #[tokio::test]
    async fn test_log_channel_update_and_read_back() {
        let service = service(FakeDirectory::default());

        let disabled = service
            .handle("get_mod_log_channel", payload(Some(GUILD), None))
            .await
            .unwrap();
        assert_eq!(disabled, json!({ "id": 0, "name": "Logging disabled." }));

        let mut update = payload(Some(GUILD), None);
        update.channel_id = Some(CHANNEL);
        service.handle("update_mod_log_channel", update).await.unwrap();

        let set = service
            .handle("get_mod_log_channel", payload(Some(GUILD), None))
            .await
            .unwrap();
        assert_eq!(set, json!({ "id": CHANNEL, "name": "general" }));

        // The member log is independent
        let member = service
            .handle("get_member_log_channel", payload(Some(GUILD), None))
            .await
            .unwrap();
        assert_eq!(member["id"], 0);
    }

    #[tokio::test]
    async fn test_update_log_channel_rejects_unknown_channel() {
        let service = service(FakeDirectory::default());
        let mut update = payload(Some(GUILD), None);
        update.channel_id = Some(999);

        let err = service
            .handle("update_member_log_channel", update)
            .await
            .unwrap_err();

        assert_eq!(err, IpcError::not_found("Channel not found."));
    }

    #[tokio::test]
    async fn test_welcome_message_limit() {
        let service = service(FakeDirectory::default());
        let mut update = payload(Some(GUILD), None);
        update.message = Some("w".repeat(1501));

        let err = service
            .handle("update_welcome_message", update)
            .await
            .unwrap_err();
        assert_eq!(err, IpcError::bad_request("Welcome message too long."));

        let read = service
            .handle("get_welcome_message", payload(Some(GUILD), None))
            .await
            .unwrap();
        assert_eq!(read, json!({ "message": null }));
    }

    #[tokio::test]
    async fn test_toggle_afk_round_trip() {
        let service = service(FakeDirectory::with_member("bob"));
        let mut toggle = payload(Some(GUILD), Some(USER));
        toggle.reason = Some("lunch".into());

        service.handle("toggle_afk", toggle.clone()).await.unwrap();

        let status = service
            .handle("is_afk", payload(Some(GUILD), Some(USER)))
            .await
            .unwrap();
        assert_eq!(status, json!({ "afk": true }));
        assert_eq!(
            service
                .directory
                .member_display_name(GUILD, USER)
                .await
                .as_deref(),
            Some("[AFK] bob")
        );

        let details = service
            .handle("get_afk_details", payload(Some(GUILD), Some(USER)))
            .await
            .unwrap();
        assert_eq!(details["details"]["reason"], "lunch");
        assert_eq!(details["details"]["user_id"], USER);

        service.handle("toggle_afk", toggle).await.unwrap();
        assert_eq!(
            service
                .directory
                .member_display_name(GUILD, USER)
                .await
                .as_deref(),
            Some("bob")
        );

        let err = service
            .handle("get_afk_details", payload(Some(GUILD), Some(USER)))
            .await
            .unwrap_err();
        assert_eq!(err, IpcError::bad_request("User is not AFK."));
    }

    #[tokio::test]
    async fn test_toggle_afk_survives_rename_failure() {
        let mut directory = FakeDirectory::with_member("bob");
        directory.refuse_renames = true;
        let service = service(directory);

        service
            .handle("toggle_afk", payload(Some(GUILD), Some(USER)))
            .await
            .unwrap();

        let status = service
            .handle("is_afk", payload(Some(GUILD), Some(USER)))
            .await
            .unwrap();
        assert_eq!(status["afk"], true);
    }

    #[tokio::test]
    async fn test_toggle_afk_rejects_long_reason() {
        let service = service(FakeDirectory::with_member("bob"));
        let mut toggle = payload(Some(GUILD), Some(USER));
        toggle.reason = Some("r".repeat(101));

        let err = service.handle("toggle_afk", toggle).await.unwrap_err();

        assert_eq!(err, IpcError::bad_request("AFK reason too long."));
    }
}
