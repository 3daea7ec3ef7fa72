// In-memory implementation of the settings and AFK stores, used by the
// unit tests in place of MySQL.

use crate::core::afk::{AfkError, AfkRecord, AfkStore};
use crate::core::settings::{
    AllowlistKind, GuildSettings, LogChannelKind, RoleAllowlist, SettingsError, SettingsStore,
};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::{DashMap, DashSet};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Cloning shares the underlying maps, like a pool handle would.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    guilds: Arc<DashMap<u64, GuildSettings>>,
    /// (user_id, guild_id) -> record
    afk: Arc<DashMap<(u64, u64), AfkRecord>>,
    blacklisted_users: Arc<DashSet<u64>>,
    blacklisted_guilds: Arc<DashSet<u64>>,
    /// Held across a case dispatch, like the MySQL row lock.
    case_lock: Arc<Mutex<()>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blacklist_user(&self, user_id: u64) {
        self.blacklisted_users.insert(user_id);
    }

    pub fn blacklist_guild(&self, guild_id: u64) {
        self.blacklisted_guilds.insert(guild_id);
    }

    /// Run `f` against the guild's row, creating it first if needed.
    fn with_guild<T>(&self, guild_id: u64, f: impl FnOnce(&mut GuildSettings) -> T) -> T {
        let mut entry = self
            .guilds
            .entry(guild_id)
            .or_insert_with(|| GuildSettings::new(guild_id));
        f(entry.value_mut())
    }
}

#[async_trait]
impl SettingsStore for InMemoryStore {
    async fn ensure_guild(&self, guild_id: u64) -> Result<(), SettingsError> {
        self.with_guild(guild_id, |_| ());
        Ok(())
    }

    async fn get_settings(&self, guild_id: u64) -> Result<GuildSettings, SettingsError> {
        Ok(self
            .guilds
            .get(&guild_id)
            .map(|row| row.value().clone())
            .unwrap_or_else(|| GuildSettings::new(guild_id)))
    }

    async fn set_log_channel(
        &self,
        guild_id: u64,
        kind: LogChannelKind,
        channel_id: Option<u64>,
    ) -> Result<(), SettingsError> {
        self.with_guild(guild_id, |row| match kind {
            LogChannelKind::Moderation => row.mod_log_channel = channel_id,
            LogChannelKind::Member => row.member_log_channel = channel_id,
        });
        Ok(())
    }

    async fn set_welcome_message(
        &self,
        guild_id: u64,
        message: Option<&str>,
    ) -> Result<(), SettingsError> {
        self.with_guild(guild_id, |row| row.welcome_message = message.map(String::from));
        Ok(())
    }

    async fn set_automod_enabled(&self, guild_id: u64, enabled: bool) -> Result<(), SettingsError> {
        self.with_guild(guild_id, |row| row.automod_enabled = enabled);
        Ok(())
    }

    async fn set_allowlist(
        &self,
        guild_id: u64,
        kind: AllowlistKind,
        roles: &RoleAllowlist,
    ) -> Result<(), SettingsError> {
        self.with_guild(guild_id, |row| match kind {
            AllowlistKind::LinkSend => row.link_send_roles = roles.clone(),
            AllowlistKind::LinkEmbed => row.link_embed_roles = roles.clone(),
        });
        Ok(())
    }

    async fn log_next_case<F, Fut>(
        &self,
        guild_id: u64,
        dispatch: F,
    ) -> Result<Option<u64>, SettingsError>
    where
        F: FnOnce(u64) -> Fut + Send,
        Fut: Future<Output = bool> + Send,
    {
        let _guard = self.case_lock.lock().await;
        let current = self.with_guild(guild_id, |row| row.case_number);

        if !dispatch(current).await {
            return Ok(None);
        }
        self.with_guild(guild_id, |row| row.case_number += 1);
        Ok(Some(current))
    }

    async fn is_blacklisted_user(&self, user_id: u64) -> Result<bool, SettingsError> {
        Ok(self.blacklisted_users.contains(&user_id))
    }

    async fn is_blacklisted_guild(&self, guild_id: u64) -> Result<bool, SettingsError> {
        Ok(self.blacklisted_guilds.contains(&guild_id))
    }
}

#[async_trait]
impl AfkStore for InMemoryStore {
    async fn get_afk(&self, user_id: u64, guild_id: u64) -> Result<Option<AfkRecord>, AfkError> {
        Ok(self
            .afk
            .get(&(user_id, guild_id))
            .map(|record| record.value().clone()))
    }

    async fn insert_afk(&self, record: &AfkRecord) -> Result<bool, AfkError> {
        // Same as the primary key in MySQL: the first record wins.
        match self.afk.entry((record.user_id, record.guild_id)) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(true)
            }
        }
    }

    async fn remove_afk(&self, user_id: u64, guild_id: u64) -> Result<bool, AfkError> {
        Ok(self.afk.remove(&(user_id, guild_id)).is_some())
    }

    async fn list_afk(&self, guild_id: u64) -> Result<Vec<AfkRecord>, AfkError> {
        let mut records: Vec<AfkRecord> = self
            .afk
            .iter()
            .filter(|entry| entry.key().1 == guild_id)
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_by_key(|record| record.start);
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = InMemoryStore::new();
        let other = store.clone();

        store.set_automod_enabled(1, true).await.unwrap();

        assert!(other.get_settings(1).await.unwrap().automod_enabled);
    }

    #[tokio::test]
    async fn test_case_numbers_start_at_one() {
        let store = InMemoryStore::new();

        assert_eq!(store.log_next_case(1, |_| async { true }).await.unwrap(), Some(1));
        assert_eq!(store.log_next_case(1, |_| async { true }).await.unwrap(), Some(2));
        assert_eq!(store.log_next_case(2, |_| async { true }).await.unwrap(), Some(1));
    }

    #[tokio::test]
    async fn test_failed_dispatch_keeps_the_number() {
        let store = InMemoryStore::new();

        assert_eq!(store.log_next_case(1, |_| async { false }).await.unwrap(), None);
        assert_eq!(store.get_settings(1).await.unwrap().case_number, 1);
        assert_eq!(store.log_next_case(1, |_| async { true }).await.unwrap(), Some(1));
    }

    #[tokio::test]
    async fn test_second_insert_keeps_the_first_record() {
        let store = InMemoryStore::new();
        let first = AfkRecord::new(1, 2, Utc::now(), Some("a".to_string()));
        let second = AfkRecord::new(1, 2, Utc::now(), Some("b".to_string()));

        assert!(store.insert_afk(&first).await.unwrap());
        assert!(!store.insert_afk(&second).await.unwrap());

        let stored = store.get_afk(1, 2).await.unwrap().unwrap();
        assert_eq!(stored.reason.as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn test_remove_reports_presence() {
        let store = InMemoryStore::new();
        let record = AfkRecord::new(1, 2, Utc::now(), None);
        store.insert_afk(&record).await.unwrap();

        assert!(store.remove_afk(1, 2).await.unwrap());
        assert!(!store.remove_afk(1, 2).await.unwrap());
    }
}
