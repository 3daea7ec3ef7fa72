// Automod - link deletion and embed suppression driven by role allowlists.
//
// Settings live on the guild row, so this service sits on top of the
// settings store instead of owning a store of its own.

use crate::core::settings::{AllowlistKind, RoleAllowlist, SettingsError, SettingsStore};
use once_cell::sync::Lazy;
use regex::Regex;

pub(crate) static URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b((?:https?|ftp)://|www\.|[a-zA-Z0-9.-]+\.[a-zA-Z]{2,})(?:[^\s]*)\b").unwrap()
});

/// What to do with a message after inspection. Both flags can be set; the
/// caller skips embed suppression when the message is deleted anyway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AutomodVerdict {
    pub delete_message: bool,
    pub suppress_embeds: bool,
}

impl AutomodVerdict {
    pub fn is_clean(&self) -> bool {
        !self.delete_message && !self.suppress_embeds
    }
}

pub fn contains_link(content: &str) -> bool {
    URL_PATTERN.is_match(content)
}

/// Decide the verdict for a message that is known to contain a link.
/// An empty allowlist means the check is not configured.
pub fn evaluate(
    link_send: &RoleAllowlist,
    link_embed: &RoleAllowlist,
    author_roles: &[u64],
) -> AutomodVerdict {
    AutomodVerdict {
        delete_message: !link_send.is_empty() && !link_send.permits(author_roles),
        suppress_embeds: !link_embed.is_empty() && !link_embed.permits(author_roles),
    }
}

pub struct AutomodService<S: SettingsStore> {
    store: S,
}

impl<S: SettingsStore> AutomodService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns `false` when automod was already enabled.
    pub async fn enable(&self, guild_id: u64) -> Result<bool, SettingsError> {
        self.set_enabled(guild_id, true).await
    }

    /// Returns `false` when automod was already disabled.
    pub async fn disable(&self, guild_id: u64) -> Result<bool, SettingsError> {
        self.set_enabled(guild_id, false).await
    }

    async fn set_enabled(&self, guild_id: u64, enabled: bool) -> Result<bool, SettingsError> {
        let settings = self.store.get_settings(guild_id).await?;
        if settings.automod_enabled == enabled {
            return Ok(false);
        }
        self.store.set_automod_enabled(guild_id, enabled).await?;
        tracing::info!(guild_id, enabled, "Automod toggled");
        Ok(true)
    }

    pub async fn allowlist(
        &self,
        guild_id: u64,
        kind: AllowlistKind,
    ) -> Result<RoleAllowlist, SettingsError> {
        let settings = self.store.get_settings(guild_id).await?;
        Ok(settings.allowlist(kind).clone())
    }

    /// Returns `false` when the role was already allowed.
    pub async fn allow_role(
        &self,
        guild_id: u64,
        kind: AllowlistKind,
        role_id: u64,
    ) -> Result<bool, SettingsError> {
        let mut list = self.allowlist(guild_id, kind).await?;
        if !list.insert(role_id) {
            return Ok(false);
        }
        self.store.set_allowlist(guild_id, kind, &list).await?;
        Ok(true)
    }

    /// Returns `false` when the role was not on the list.
    pub async fn disallow_role(
        &self,
        guild_id: u64,
        kind: AllowlistKind,
        role_id: u64,
    ) -> Result<bool, SettingsError> {
        let mut list = self.allowlist(guild_id, kind).await?;
        if !list.remove(role_id) {
            return Ok(false);
        }
        self.store.set_allowlist(guild_id, kind, &list).await?;
        Ok(true)
    }

    /// Inspect a guild message. Disabled automod and link-free content
    /// always come back clean.
    pub async fn inspect_message(
        &self,
        guild_id: u64,
        content: &str,
        author_roles: &[u64],
    ) -> Result<AutomodVerdict, SettingsError> {
        let settings = self.store.get_settings(guild_id).await?;
        if !settings.automod_enabled || !contains_link(content) {
            return Ok(AutomodVerdict::default());
        }
        Ok(evaluate(
            &settings.link_send_roles,
            &settings.link_embed_roles,
            author_roles,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::storage::in_memory::InMemoryStore;

    #[test]
    fn test_link_detection() {
        assert!(contains_link("see https://example.com/page"));
        assert!(contains_link("www.example.org"));
        assert!(contains_link("check example.io now"));
        assert!(contains_link("ftp://files.example.net"));
        assert!(!contains_link("no links here, just words."));
        assert!(!contains_link("version 1.2 released"));
    }

    #[test]
    fn test_allowed_role_is_never_deleted() {
        let send = RoleAllowlist::parse(Some("5"));
        let embed = RoleAllowlist::default();

        let verdict = evaluate(&send, &embed, &[1, 5]);

        assert!(!verdict.delete_message);
        assert!(!verdict.suppress_embeds);
    }

    #[test]
    fn test_checks_fire_independently() {
        let send = RoleAllowlist::parse(Some("5"));
        let embed = RoleAllowlist::parse(Some("6"));

        let verdict = evaluate(&send, &embed, &[5]);
        assert!(!verdict.delete_message);
        assert!(verdict.suppress_embeds);

        let verdict = evaluate(&send, &embed, &[]);
        assert!(verdict.delete_message);
        assert!(verdict.suppress_embeds);
    }

    #[test]
    fn test_empty_allowlists_never_act() {
        let verdict = evaluate(&RoleAllowlist::default(), &RoleAllowlist::default(), &[]);
        assert!(verdict.is_clean());
    }

    #[tokio::test]
    async fn test_enable_disable_report_changes() {
        let service = AutomodService::new(InMemoryStore::new());

        assert!(!service.disable(1).await.unwrap());
        assert!(service.enable(1).await.unwrap());
        assert!(!service.enable(1).await.unwrap());
        assert!(service.disable(1).await.unwrap());
    }

    #[tokio::test]
    async fn test_allow_and_disallow_are_idempotent() {
        let service = AutomodService::new(InMemoryStore::new());

        assert!(service.allow_role(1, AllowlistKind::LinkSend, 42).await.unwrap());
        assert!(!service.allow_role(1, AllowlistKind::LinkSend, 42).await.unwrap());
        assert!(service
            .allowlist(1, AllowlistKind::LinkEmbed)
            .await
            .unwrap()
            .is_empty());

        assert!(service.disallow_role(1, AllowlistKind::LinkSend, 42).await.unwrap());
        assert!(!service.disallow_role(1, AllowlistKind::LinkSend, 42).await.unwrap());
    }

    #[tokio::test]
    async fn test_inspect_respects_enabled_flag() {
        let service = AutomodService::new(InMemoryStore::new());
        service.allow_role(1, AllowlistKind::LinkSend, 42).await.unwrap();

        let verdict = service.inspect_message(1, "https://x.com", &[]).await.unwrap();
        assert!(verdict.is_clean());

        service.enable(1).await.unwrap();
        let verdict = service.inspect_message(1, "https://x.com", &[]).await.unwrap();
        assert!(verdict.delete_message);

        let verdict = service.inspect_message(1, "https://x.com", &[42]).await.unwrap();
        assert!(!verdict.delete_message);

        let verdict = service.inspect_message(1, "hello there", &[]).await.unwrap();
        assert!(verdict.is_clean());
    }
}
