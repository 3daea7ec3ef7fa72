// Settings service - reads and writes per-guild configuration.
//
// The store trait is the single port to persistence for guild rows; the
// automod and moderation services reuse it for their own columns.

use super::settings_models::{
    plan_channel_update, AllowlistKind, ChannelUpdate, GuildSettings, LogChannelKind,
    RoleAllowlist, SettingsSource, WelcomeUpdate,
};
use async_trait::async_trait;
use std::future::Future;
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("The welcome message can be at most {max} characters long (got {length}).")]
    WelcomeMessageTooLong { length: usize, max: usize },
}

// ============================================================================
// STORAGE TRAIT (PORT)
// ============================================================================

#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Create the guild row if it does not exist yet.
    async fn ensure_guild(&self, guild_id: u64) -> Result<(), SettingsError>;

    /// Full settings for a guild. A guild without a row reads as the defaults.
    async fn get_settings(&self, guild_id: u64) -> Result<GuildSettings, SettingsError>;

    async fn set_log_channel(
        &self,
        guild_id: u64,
        kind: LogChannelKind,
        channel_id: Option<u64>,
    ) -> Result<(), SettingsError>;

    async fn set_welcome_message(
        &self,
        guild_id: u64,
        message: Option<&str>,
    ) -> Result<(), SettingsError>;

    async fn set_automod_enabled(&self, guild_id: u64, enabled: bool) -> Result<(), SettingsError>;

    async fn set_allowlist(
        &self,
        guild_id: u64,
        kind: AllowlistKind,
        roles: &RoleAllowlist,
    ) -> Result<(), SettingsError>;

    /// Hand the guild's current case number to `dispatch` and advance the
    /// counter only if it reports delivery. The number stays locked until
    /// `dispatch` finishes, so two callers never receive the same number.
    ///
    /// Returns the number used, or `None` when `dispatch` failed.
    async fn log_next_case<F, Fut>(
        &self,
        guild_id: u64,
        dispatch: F,
    ) -> Result<Option<u64>, SettingsError>
    where
        F: FnOnce(u64) -> Fut + Send,
        Fut: Future<Output = bool> + Send;

    async fn is_blacklisted_user(&self, user_id: u64) -> Result<bool, SettingsError>;

    async fn is_blacklisted_guild(&self, guild_id: u64) -> Result<bool, SettingsError>;
}

// ============================================================================
// CORE SERVICE
// ============================================================================

pub struct SettingsService<S: SettingsStore> {
    store: S,
}

impl<S: SettingsStore> SettingsService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn register_guild(&self, guild_id: u64) -> Result<(), SettingsError> {
        self.store.ensure_guild(guild_id).await
    }

    pub async fn settings(&self, guild_id: u64) -> Result<GuildSettings, SettingsError> {
        self.store.get_settings(guild_id).await
    }

    pub async fn log_channel(
        &self,
        guild_id: u64,
        kind: LogChannelKind,
    ) -> Result<Option<u64>, SettingsError> {
        Ok(self.store.get_settings(guild_id).await?.log_channel(kind))
    }

    /// Work out what setting `requested` as the log channel would do, without writing.
    pub async fn plan_log_channel(
        &self,
        guild_id: u64,
        kind: LogChannelKind,
        requested: Option<u64>,
    ) -> Result<ChannelUpdate, SettingsError> {
        let current = self.log_channel(guild_id, kind).await?;
        Ok(plan_channel_update(current, requested))
    }

    /// Write a log channel unconditionally (`None` disables logging).
    pub async fn set_log_channel(
        &self,
        guild_id: u64,
        kind: LogChannelKind,
        channel_id: Option<u64>,
    ) -> Result<(), SettingsError> {
        tracing::debug!(guild_id, ?kind, ?channel_id, "Updating log channel");
        self.store.set_log_channel(guild_id, kind, channel_id).await
    }

    pub async fn welcome_message(&self, guild_id: u64) -> Result<Option<String>, SettingsError> {
        Ok(self.store.get_settings(guild_id).await?.welcome_message)
    }

    /// Validate and persist a welcome message. Blank input disables it.
    ///
    /// Length is checked against the limit of the surface the change came
    /// from before anything is written.
    pub async fn update_welcome_message(
        &self,
        guild_id: u64,
        message: Option<&str>,
        source: SettingsSource,
    ) -> Result<WelcomeUpdate, SettingsError> {
        let message = message.map(str::trim).filter(|m| !m.is_empty());

        if let Some(text) = message {
            let length = text.chars().count();
            let max = source.welcome_message_limit();
            if length > max {
                return Err(SettingsError::WelcomeMessageTooLong { length, max });
            }
        }

        let current = self.welcome_message(guild_id).await?;

        let outcome = match (current.as_deref(), message) {
            (None, None) => WelcomeUpdate::NothingToDisable,
            (Some(current), Some(new)) if current == new => WelcomeUpdate::Unchanged,
            (Some(_), None) => WelcomeUpdate::Disabled,
            (_, Some(_)) => WelcomeUpdate::Updated,
        };

        if matches!(outcome, WelcomeUpdate::Disabled | WelcomeUpdate::Updated) {
            self.store.set_welcome_message(guild_id, message).await?;
        }

        Ok(outcome)
    }

    pub async fn is_blacklisted_user(&self, user_id: u64) -> Result<bool, SettingsError> {
        self.store.is_blacklisted_user(user_id).await
    }

    pub async fn is_blacklisted_guild(&self, guild_id: u64) -> Result<bool, SettingsError> {
        self.store.is_blacklisted_guild(guild_id).await
    }
}

// ============================================================================
// TESTS
// ============================================================================
