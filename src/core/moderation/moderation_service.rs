// Moderation service - numbers moderation actions and resolves where their
// log entries go.

use super::moderation_models::{CaseDraft, ModCase};
use crate::core::settings::{LogChannelKind, SettingsError, SettingsStore};
use std::future::Future;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModerationError {
    #[error("Storage error: {0}")]
    StorageError(String),
}

impl From<SettingsError> for ModerationError {
    fn from(e: SettingsError) -> Self {
        ModerationError::StorageError(e.to_string())
    }
}

pub struct ModerationService<S: SettingsStore> {
    store: S,
}

impl<S: SettingsStore> ModerationService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The moderation log channel, if one is configured and still exists.
    pub async fn log_channel(
        &self,
        guild_id: u64,
        channel_exists: impl Fn(u64) -> bool,
    ) -> Result<Option<u64>, ModerationError> {
        let settings = self.store.get_settings(guild_id).await?;
        Ok(settings
            .log_channel(LogChannelKind::Moderation)
            .filter(|id| channel_exists(*id)))
    }

    /// Number `draft` and hand the case to `dispatch` for delivery.
    ///
    /// The guild's counter advances only when `dispatch` reports success.
    /// Returns the case number used, or `None` when the guild has no usable
    /// moderation log channel or the case could not be delivered.
    pub async fn log_case<F, Fut>(
        &self,
        guild_id: u64,
        draft: CaseDraft,
        channel_exists: impl Fn(u64) -> bool,
        dispatch: F,
    ) -> Result<Option<u64>, ModerationError>
    where
        F: FnOnce(ModCase) -> Fut + Send,
        Fut: Future<Output = bool> + Send,
    {
        let Some(log_channel_id) = self.log_channel(guild_id, channel_exists).await? else {
            return Ok(None);
        };

        let action = draft.action.label();
        let logged = self
            .store
            .log_next_case(guild_id, move |case_number| {
                dispatch(ModCase {
                    case_number,
                    log_channel_id,
                    draft,
                })
            })
            .await?;

        match logged {
            Some(case_number) => {
                tracing::debug!(guild_id, case_number, action, "Logged moderation case")
            }
            None => tracing::debug!(guild_id, action, "Moderation case not delivered"),
        }
        Ok(logged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::moderation::{ModAction, UserRef};
    use crate::infra::storage::in_memory::InMemoryStore;
    use std::sync::Arc;

    fn draft() -> CaseDraft {
        CaseDraft::new(ModAction::Warn, UserRef::new(1, "mod")).target(UserRef::new(2, "user"))
    }

    async fn delivered(_case: ModCase) -> bool {
        true
    }

    #[tokio::test]
    async fn test_unconfigured_guild_is_a_no_op() {
        let store = InMemoryStore::new();
        let service = ModerationService::new(store.clone());

        let logged = service.log_case(1, draft(), |_| true, delivered).await.unwrap();

        assert!(logged.is_none());
        assert_eq!(store.get_settings(1).await.unwrap().case_number, 1);
    }

    #[tokio::test]
    async fn test_missing_channel_does_not_consume_a_number() {
        let store = InMemoryStore::new();
        store
            .set_log_channel(1, LogChannelKind::Moderation, Some(50))
            .await
            .unwrap();
        let service = ModerationService::new(store.clone());

        let logged = service.log_case(1, draft(), |_| false, delivered).await.unwrap();

        assert!(logged.is_none());
        assert_eq!(store.get_settings(1).await.unwrap().case_number, 1);
    }

    #[tokio::test]
    async fn test_undelivered_case_keeps_the_counter() {
        let store = InMemoryStore::new();
        store
            .set_log_channel(1, LogChannelKind::Moderation, Some(50))
            .await
            .unwrap();
        let service = ModerationService::new(store.clone());

        let logged = service
            .log_case(1, draft(), |_| true, |_| async { false })
            .await
            .unwrap();

        assert!(logged.is_none());
        assert_eq!(store.get_settings(1).await.unwrap().case_number, 1);

        // The next delivered case reuses the number
        let logged = service.log_case(1, draft(), |_| true, delivered).await.unwrap();
        assert_eq!(logged, Some(1));
    }

    #[tokio::test]
    async fn test_counter_after_n_cases() {
        let store = InMemoryStore::new();
        store
            .set_log_channel(1, LogChannelKind::Moderation, Some(50))
            .await
            .unwrap();
        let service = ModerationService::new(store.clone());

        for expected in 1..=5u64 {
            let logged = service
                .log_case(1, draft(), |_| true, move |case| async move {
                    assert_eq!(case.case_number, expected);
                    assert_eq!(case.log_channel_id, 50);
                    true
                })
                .await
                .unwrap();
            assert_eq!(logged, Some(expected));
        }

        assert_eq!(store.get_settings(1).await.unwrap().case_number, 6);
    }

    #[tokio::test]
    async fn test_concurrent_cases_never_share_a_number() {
        let store = InMemoryStore::new();
        store
            .set_log_channel(1, LogChannelKind::Moderation, Some(50))
            .await
            .unwrap();
        let service = Arc::new(ModerationService::new(store));

        let mut handles = Vec::new();
        for _ in 0..20 {
            let service = Arc::clone(&service);
            handles.push(tokio::spawn(async move {
                service
                    .log_case(1, draft(), |_| true, delivered)
                    .await
                    .unwrap()
                    .unwrap()
            }));
        }

        let mut numbers = Vec::new();
        for handle in handles {
            numbers.push(handle.await.unwrap());
        }
        numbers.sort_unstable();
        assert_eq!(numbers, (1..=20).collect::<Vec<u64>>());
    }
}
