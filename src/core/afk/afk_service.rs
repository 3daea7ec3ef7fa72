// AFK service - the ACTIVE/AFK state machine per (user, guild).

use super::afk_models::{AfkRecord, MAX_AFK_REASON_LENGTH};
use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AfkError {
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("You are already afk.")]
    AlreadyAfk,

    #[error("You are not afk.")]
    NotAfk,

    #[error("The AFK reason can be at most {max} characters long.")]
    ReasonTooLong { max: usize },
}

#[async_trait]
pub trait AfkStore: Send + Sync {
    async fn get_afk(&self, user_id: u64, guild_id: u64) -> Result<Option<AfkRecord>, AfkError>;

    /// Returns `false` when the user already has a record in that guild, which
    /// is left untouched.
    async fn insert_afk(&self, record: &AfkRecord) -> Result<bool, AfkError>;

    /// Returns `false` when there was no record to remove.
    async fn remove_afk(&self, user_id: u64, guild_id: u64) -> Result<bool, AfkError>;

    /// All AFK records of a guild, oldest first.
    async fn list_afk(&self, guild_id: u64) -> Result<Vec<AfkRecord>, AfkError>;
}

pub struct AfkService<S: AfkStore> {
    store: S,
}

impl<S: AfkStore> AfkService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Validate a reason before anything is written. Blank reasons become `None`.
    pub fn validate_reason(reason: Option<&str>) -> Result<Option<String>, AfkError> {
        let reason = reason.map(str::trim).filter(|r| !r.is_empty());
        match reason {
            Some(r) if r.chars().count() > MAX_AFK_REASON_LENGTH => Err(AfkError::ReasonTooLong {
                max: MAX_AFK_REASON_LENGTH,
            }),
            other => Ok(other.map(String::from)),
        }
    }

    /// ACTIVE -> AFK.
    pub async fn set(
        &self,
        user_id: u64,
        guild_id: u64,
        reason: Option<&str>,
    ) -> Result<AfkRecord, AfkError> {
        let reason = Self::validate_reason(reason)?;

        if self.store.get_afk(user_id, guild_id).await?.is_some() {
            return Err(AfkError::AlreadyAfk);
        }

        // A concurrent set can win between the check and the insert.
        let record = AfkRecord::new(user_id, guild_id, Utc::now(), reason);
        if !self.store.insert_afk(&record).await? {
            return Err(AfkError::AlreadyAfk);
        }
        tracing::debug!(user_id, guild_id, "AFK status set");
        Ok(record)
    }

    /// AFK -> ACTIVE.
    pub async fn clear(&self, user_id: u64, guild_id: u64) -> Result<(), AfkError> {
        if !self.store.remove_afk(user_id, guild_id).await? {
            return Err(AfkError::NotAfk);
        }
        tracing::debug!(user_id, guild_id, "AFK status cleared");
        Ok(())
    }

    pub async fn status(&self, user_id: u64, guild_id: u64) -> Result<Option<AfkRecord>, AfkError> {
        self.store.get_afk(user_id, guild_id).await
    }

    pub async fn is_afk(&self, user_id: u64, guild_id: u64) -> Result<bool, AfkError> {
        Ok(self.status(user_id, guild_id).await?.is_some())
    }

    pub async fn list(&self, guild_id: u64) -> Result<Vec<AfkRecord>, AfkError> {
        self.store.list_afk(guild_id).await
    }

    /// AFK records for the mentioned users, one per user, in mention order.
    pub async fn mentioned_afk(
        &self,
        guild_id: u64,
        mentioned: &[u64],
    ) -> Result<Vec<AfkRecord>, AfkError> {
        let mut seen = Vec::with_capacity(mentioned.len());
        let mut records = Vec::new();
        for &user_id in mentioned {
            if seen.contains(&user_id) {
                continue;
            }
            seen.push(user_id);
            if let Some(record) = self.store.get_afk(user_id, guild_id).await? {
                records.push(record);
            }
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::storage::in_memory::InMemoryStore;

    #[tokio::test]
    async fn test_set_then_set_again_is_rejected() {
        let service = AfkService::new(InMemoryStore::new());

        let record = service.set(1, 100, Some("lunch")).await.unwrap();
        assert_eq!(record.reason.as_deref(), Some("lunch"));

        let again = service.set(1, 100, Some("dinner")).await;
        assert!(matches!(again, Err(AfkError::AlreadyAfk)));

        // The original record is untouched
        let stored = service.status(1, 100).await.unwrap().unwrap();
        assert_eq!(stored.reason.as_deref(), Some("lunch"));
    }

    #[tokio::test]
    async fn test_insert_race_reports_already_afk() {
        let store = InMemoryStore::new();
        let service = AfkService::new(store.clone());

        // Another caller inserts after `set` would have passed its check
        let first = AfkRecord::new(1, 100, Utc::now(), Some("first".to_string()));
        assert!(store.insert_afk(&first).await.unwrap());
        let second = AfkRecord::new(1, 100, Utc::now(), Some("second".to_string()));
        assert!(!store.insert_afk(&second).await.unwrap());

        assert!(matches!(service.set(1, 100, None).await, Err(AfkError::AlreadyAfk)));
        let stored = service.status(1, 100).await.unwrap().unwrap();
        assert_eq!(stored.reason.as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn test_clear_when_not_afk() {
        let service = AfkService::new(InMemoryStore::new());

        assert!(matches!(service.clear(1, 100).await, Err(AfkError::NotAfk)));

        service.set(1, 100, None).await.unwrap();
        service.clear(1, 100).await.unwrap();
        assert!(!service.is_afk(1, 100).await.unwrap());
    }

    #[tokio::test]
    async fn test_afk_is_per_guild() {
        let service = AfkService::new(InMemoryStore::new());

        service.set(1, 100, None).await.unwrap();

        assert!(service.is_afk(1, 100).await.unwrap());
        assert!(!service.is_afk(1, 200).await.unwrap());
    }

    #[tokio::test]
    async fn test_reason_too_long_is_rejected_before_write() {
        let service = AfkService::new(InMemoryStore::new());
        let reason = "x".repeat(MAX_AFK_REASON_LENGTH + 1);

        let result = service.set(1, 100, Some(&reason)).await;

        assert!(matches!(result, Err(AfkError::ReasonTooLong { max: 100 })));
        assert!(!service.is_afk(1, 100).await.unwrap());
    }

    #[tokio::test]
    async fn test_mentioned_afk_dedupes_and_filters() {
        let service = AfkService::new(InMemoryStore::new());
        service.set(1, 100, None).await.unwrap();
        service.set(3, 100, Some("away")).await.unwrap();

        let records = service.mentioned_afk(100, &[3, 2, 1, 3]).await.unwrap();

        let ids: Vec<u64> = records.iter().map(|r| r.user_id).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[tokio::test]
    async fn test_list_only_returns_guild_members() {
        let service = AfkService::new(InMemoryStore::new());
        service.set(1, 100, None).await.unwrap();
        service.set(2, 100, None).await.unwrap();
        service.set(3, 200, None).await.unwrap();

        assert_eq!(service.list(100).await.unwrap().len(), 2);
    }
}
