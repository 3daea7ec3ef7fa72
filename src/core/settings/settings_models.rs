// Settings domain models - plain data, no Discord or database types.

use serde::{Deserialize, Serialize};

/// Longest welcome message accepted from the slash-command modal.
pub const COMMAND_WELCOME_MESSAGE_MAX: usize = 1800;
/// Longest welcome message accepted from the dashboard.
pub const DASHBOARD_WELCOME_MESSAGE_MAX: usize = 1500;

/// Where a settings change originated. The two surfaces enforce different limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsSource {
    Command,
    Dashboard,
}

impl SettingsSource {
    pub fn welcome_message_limit(self) -> usize {
        match self {
            SettingsSource::Command => COMMAND_WELCOME_MESSAGE_MAX,
            SettingsSource::Dashboard => DASHBOARD_WELCOME_MESSAGE_MAX,
        }
    }
}

/// The two per-guild log channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogChannelKind {
    /// Moderation actions (kicks, bans, settings changes...)
    Moderation,
    /// Member join/leave notices
    Member,
}

impl LogChannelKind {
    pub fn display_name(self) -> &'static str {
        match self {
            LogChannelKind::Moderation => "moderation log channel",
            LogChannelKind::Member => "member logging channel",
        }
    }
}

/// The two automod role allowlists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AllowlistKind {
    /// Roles allowed to post links at all
    LinkSend,
    /// Roles whose links keep their embeds
    LinkEmbed,
}

impl AllowlistKind {
    /// What holding a role on this list lets a member do.
    pub fn activity(self) -> &'static str {
        match self {
            AllowlistKind::LinkSend => "send links",
            AllowlistKind::LinkEmbed => "send embeds",
        }
    }
}

/// A set of role ids, persisted as a `|`-delimited string.
///
/// Order of insertion is preserved so the stored value stays stable.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoleAllowlist(Vec<u64>);

impl RoleAllowlist {
    /// Parse the stored representation. Empty or malformed entries are skipped.
    pub fn parse(raw: Option<&str>) -> Self {
        let mut list = Self::default();
        for part in raw.unwrap_or_default().split('|') {
            if let Ok(id) = part.trim().parse::<u64>() {
                list.insert(id);
            }
        }
        list
    }

    /// The stored representation, or `None` when the list is empty.
    pub fn to_stored(&self) -> Option<String> {
        if self.0.is_empty() {
            return None;
        }
        Some(
            self.0
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join("|"),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, role_id: u64) -> bool {
        self.0.contains(&role_id)
    }

    pub fn role_ids(&self) -> &[u64] {
        &self.0
    }

    /// Returns `false` if the role was already present.
    pub fn insert(&mut self, role_id: u64) -> bool {
        if self.contains(role_id) {
            return false;
        }
        self.0.push(role_id);
        true
    }

    /// Returns `false` if the role was not present.
    pub fn remove(&mut self, role_id: u64) -> bool {
        let before = self.0.len();
        self.0.retain(|id| *id != role_id);
        self.0.len() != before
    }

    /// Whether a member holding `held_roles` is covered by this list.
    pub fn permits(&self, held_roles: &[u64]) -> bool {
        held_roles.iter().any(|role| self.contains(*role))
    }
}

/// One row of per-guild configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildSettings {
    pub guild_id: u64,
    pub mod_log_channel: Option<u64>,
    pub member_log_channel: Option<u64>,
    pub welcome_message: Option<String>,
    pub automod_enabled: bool,
    pub link_send_roles: RoleAllowlist,
    pub link_embed_roles: RoleAllowlist,
    /// Number the next logged moderation action will carry.
    pub case_number: u64,
}

impl GuildSettings {
    /// Defaults for a guild that has no stored row yet.
    pub fn new(guild_id: u64) -> Self {
        Self {
            guild_id,
            mod_log_channel: None,
            member_log_channel: None,
            welcome_message: None,
            automod_enabled: false,
            link_send_roles: RoleAllowlist::default(),
            link_embed_roles: RoleAllowlist::default(),
            case_number: 1,
        }
    }

    pub fn log_channel(&self, kind: LogChannelKind) -> Option<u64> {
        match kind {
            LogChannelKind::Moderation => self.mod_log_channel,
            LogChannelKind::Member => self.member_log_channel,
        }
    }

    pub fn allowlist(&self, kind: AllowlistKind) -> &RoleAllowlist {
        match kind {
            AllowlistKind::LinkSend => &self.link_send_roles,
            AllowlistKind::LinkEmbed => &self.link_embed_roles,
        }
    }
}

/// What changing a log channel amounts to, given the current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelUpdate {
    /// Asked to disable, but nothing was configured
    NothingToDisable,
    /// Asked to set the channel that is already configured
    AlreadySet,
    /// The configured channel will be cleared
    Disable { previous: u64 },
    /// A new channel will be configured
    Set { channel_id: u64 },
}

/// Decide what a log channel change means. Pure so handlers can act on the
/// outcome (e.g. log before disabling) before anything is written.
pub fn plan_channel_update(current: Option<u64>, requested: Option<u64>) -> ChannelUpdate {
    match (current, requested) {
        (None, None) => ChannelUpdate::NothingToDisable,
        (Some(previous), None) => ChannelUpdate::Disable { previous },
        (Some(current), Some(requested)) if current == requested => ChannelUpdate::AlreadySet,
        (_, Some(channel_id)) => ChannelUpdate::Set { channel_id },
    }
}

/// Result of a welcome message change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WelcomeUpdate {
    NothingToDisable,
    Unchanged,
    Disabled,
    Updated,
}
