// Moderation domain models - data structures for the case logger.
//
// These are pure domain types with no Discord dependencies.
// The Discord layer turns a `ModCase` into an embed.

use chrono::Duration;
use std::fmt;

pub const MAX_REASON_LENGTH: usize = 512;
pub const MAX_CLEAR_AMOUNT: i64 = 100;
pub const MAX_DELETE_MESSAGE_DAYS: u8 = 7;
/// Discord refuses timeouts longer than 28 days.
pub const MAX_TIMEOUT_DAYS: i64 = 28;

/// Colour used for punitive actions.
pub const PUNITIVE_COLOUR: u32 = 0xE74C3C;
/// Colour used for reversals and enables.
pub const RESTORATIVE_COLOUR: u32 = 0x2ECC71;

/// Every action that lands in the moderation log with a case number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModAction {
    Kick,
    Ban,
    Unban,
    Mute,
    Unmute,
    ChannelMute,
    ChannelUnmute,
    Warn,
    Clear,
    LogChannelUpdated,
    LogChannelDisabled,
    WelcomeMessageUpdated,
    WelcomeMessageDisabled,
}

/// How an action reads. Decides the embed colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Punitive,
    Restorative,
}

impl ModAction {
    pub fn label(self) -> &'static str {
        match self {
            ModAction::Kick => "Member Kicked",
            ModAction::Ban => "Member Banned",
            ModAction::Unban => "Member Unbanned",
            ModAction::Mute => "Member Muted",
            ModAction::Unmute => "Member Unmuted",
            ModAction::ChannelMute => "Member Channel Muted",
            ModAction::ChannelUnmute => "Member Channel Unmuted",
            ModAction::Warn => "Member Warned",
            ModAction::Clear => "Messages Cleared",
            ModAction::LogChannelUpdated => "Logging Channel Updated",
            ModAction::LogChannelDisabled => "Logging Channel Disabled",
            ModAction::WelcomeMessageUpdated => "Welcome Message Updated",
            ModAction::WelcomeMessageDisabled => "Welcome Message Disabled",
        }
    }

    pub fn tone(self) -> Tone {
        match self {
            ModAction::Kick
            | ModAction::Ban
            | ModAction::Mute
            | ModAction::ChannelMute
            | ModAction::Warn
            | ModAction::Clear
            | ModAction::LogChannelDisabled
            | ModAction::WelcomeMessageDisabled => Tone::Punitive,
            ModAction::Unban
            | ModAction::Unmute
            | ModAction::ChannelUnmute
            | ModAction::LogChannelUpdated
            | ModAction::WelcomeMessageUpdated => Tone::Restorative,
        }
    }

    pub fn colour(self) -> u32 {
        match self.tone() {
            Tone::Punitive => PUNITIVE_COLOUR,
            Tone::Restorative => RESTORATIVE_COLOUR,
        }
    }
}

impl fmt::Display for ModAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A Discord user as the log shows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRef {
    pub id: u64,
    pub tag: String,
}

impl UserRef {
    pub fn new(id: u64, tag: impl Into<String>) -> Self {
        Self { id, tag: tag.into() }
    }

    /// "**tag** (<@id>)"
    pub fn display(&self) -> String {
        format!("**{}** (<@{}>)", self.tag, self.id)
    }
}

/// Everything known about an action before it is numbered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseDraft {
    pub action: ModAction,
    pub moderator: UserRef,
    pub target: Option<UserRef>,
    pub channel_id: Option<u64>,
    pub reason: Option<String>,
    pub description: Option<String>,
    pub message_count: Option<u64>,
}

impl CaseDraft {
    pub fn new(action: ModAction, moderator: UserRef) -> Self {
        Self {
            action,
            moderator,
            target: None,
            channel_id: None,
            reason: None,
            description: None,
            message_count: None,
        }
    }

    pub fn target(mut self, target: UserRef) -> Self {
        self.target = Some(target);
        self
    }

    pub fn channel(mut self, channel_id: u64) -> Self {
        self.channel_id = Some(channel_id);
        self
    }

    pub fn reason(mut self, reason: Option<String>) -> Self {
        self.reason = reason;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn message_count(mut self, count: u64) -> Self {
        self.message_count = Some(count);
        self
    }
}

/// A numbered case, ready to be posted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModCase {
    pub case_number: u64,
    pub log_channel_id: u64,
    pub draft: CaseDraft,
}

impl ModCase {
    pub fn title(&self) -> String {
        format!("{} | Case {}", self.draft.action.label(), self.case_number)
    }

    /// (name, value) pairs in display order.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        let draft = &self.draft;
        let mut fields = Vec::new();

        if let Some(target) = &draft.target {
            fields.push(("Name", target.display()));
            fields.push(("ID", target.id.to_string()));
        }
        fields.push(("Moderator", draft.moderator.display()));
        if let Some(channel_id) = draft.channel_id {
            fields.push(("Channel", format!("<#{}>", channel_id)));
        }
        if let Some(reason) = &draft.reason {
            fields.push(("Reason", reason.clone()));
        }
        if let Some(count) = draft.message_count {
            fields.push(("Message Count", count.to_string()));
        }
        fields
    }
}

/// A join or leave notice for the member log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberLogEntry {
    pub joined: bool,
    pub member: UserRef,
    pub member_count: u64,
}

impl MemberLogEntry {
    pub fn title(&self) -> &'static str {
        if self.joined {
            "Member Joined"
        } else {
            "Member Left"
        }
    }

    pub fn colour(&self) -> u32 {
        if self.joined {
            RESTORATIVE_COLOUR
        } else {
            PUNITIVE_COLOUR
        }
    }

    pub fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Name", self.member.display()),
            ("ID", self.member.id.to_string()),
            ("Member Count", self.member_count.to_string()),
        ]
    }
}

/// One entry of a guild's ban list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BannedUser {
    pub id: u64,
    pub name: String,
}

/// Find the ban entry an unban query refers to. A numeric query matches the
/// user id exactly; anything else matches the first entry with that username.
pub fn resolve_ban_target<'a>(query: &str, bans: &'a [BannedUser]) -> Option<&'a BannedUser> {
    let query = query.trim();
    match query.parse::<u64>() {
        Ok(id) => bans.iter().find(|ban| ban.id == id),
        Err(_) => bans.iter().find(|ban| ban.name == query),
    }
}

/// Why command input was rejected. Shown to the caller verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("The reason can be at most {max} characters long.")]
    ReasonTooLong { max: usize },

    #[error("The number of messages can be between 1 and 100 only.")]
    ClearAmountOutOfRange,

    #[error("The number of days of messages to delete can be between 0 and 7 only.")]
    DeleteDaysOutOfRange,

    #[error("Please specify a timeout duration.")]
    EmptyTimeout,

    #[error("A member can be timed out for at most 28 days.")]
    TimeoutTooLong,
}

pub fn validate_reason(reason: Option<&str>) -> Result<Option<String>, ValidationError> {
    let reason = reason.map(str::trim).filter(|r| !r.is_empty());
    match reason {
        Some(r) if r.chars().count() > MAX_REASON_LENGTH => Err(ValidationError::ReasonTooLong {
            max: MAX_REASON_LENGTH,
        }),
        other => Ok(other.map(String::from)),
    }
}

pub fn validate_clear_amount(amount: i64) -> Result<u8, ValidationError> {
    if (1..=MAX_CLEAR_AMOUNT).contains(&amount) {
        Ok(amount as u8)
    } else {
        Err(ValidationError::ClearAmountOutOfRange)
    }
}

pub fn validate_delete_days(days: Option<i64>) -> Result<u8, ValidationError> {
    match days.unwrap_or(0) {
        d if (0..=MAX_DELETE_MESSAGE_DAYS as i64).contains(&d) => Ok(d as u8),
        _ => Err(ValidationError::DeleteDaysOutOfRange),
    }
}

/// Combine the optional mute duration parts into one timeout.
pub fn timeout_duration(
    minutes: Option<i64>,
    hours: Option<i64>,
    days: Option<i64>,
) -> Result<Duration, ValidationError> {
    let parts = [minutes, hours, days];
    if parts.iter().flatten().any(|part| *part < 0) {
        return Err(ValidationError::EmptyTimeout);
    }
    // Clamp each part before adding so huge inputs cannot overflow.
    let cap = MAX_TIMEOUT_DAYS * 24 * 60 + 1;
    let total_minutes = minutes.unwrap_or(0).min(cap)
        + hours.unwrap_or(0).min(cap) * 60
        + days.unwrap_or(0).min(cap) * 24 * 60;

    if total_minutes == 0 {
        return Err(ValidationError::EmptyTimeout);
    }
    if total_minutes > MAX_TIMEOUT_DAYS * 24 * 60 {
        return Err(ValidationError::TimeoutTooLong);
    }
    Ok(Duration::minutes(total_minutes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bans() -> Vec<BannedUser> {
        vec![
            BannedUser { id: 11, name: "spammer".into() },
            BannedUser { id: 12, name: "troll".into() },
            BannedUser { id: 13, name: "troll".into() },
        ]
    }

    #[test]
    fn test_resolve_by_id_is_exact() {
        let bans = bans();
        assert_eq!(resolve_ban_target("12", &bans).map(|b| b.id), Some(12));
        assert!(resolve_ban_target("99", &bans).is_none());
    }

    #[test]
    fn test_resolve_by_name_takes_first_match() {
        let bans = bans();
        assert_eq!(resolve_ban_target("troll", &bans).map(|b| b.id), Some(12));
        assert!(resolve_ban_target("nobody", &bans).is_none());
    }

    #[test]
    fn test_case_fields_order() {
        let case = ModCase {
            case_number: 4,
            log_channel_id: 50,
            draft: CaseDraft::new(ModAction::Ban, UserRef::new(1, "mod"))
                .target(UserRef::new(2, "bad"))
                .reason(Some("spam".into())),
        };

        assert_eq!(case.title(), "Member Banned | Case 4");
        let names: Vec<&str> = case.fields().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["Name", "ID", "Moderator", "Reason"]);
        assert_eq!(case.fields()[0].1, "**bad** (<@2>)");
    }

    #[test]
    fn test_clear_case_carries_channel_and_count() {
        let case = ModCase {
            case_number: 1,
            log_channel_id: 50,
            draft: CaseDraft::new(ModAction::Clear, UserRef::new(1, "mod"))
                .channel(77)
                .message_count(25),
        };

        let fields = case.fields();
        assert_eq!(fields[1], ("Channel", "<#77>".to_string()));
        assert_eq!(fields[2], ("Message Count", "25".to_string()));
    }

    #[test]
    fn test_action_colours() {
        assert_eq!(ModAction::Kick.colour(), PUNITIVE_COLOUR);
        assert_eq!(ModAction::Unmute.colour(), RESTORATIVE_COLOUR);
        assert_eq!(ModAction::LogChannelDisabled.tone(), Tone::Punitive);
    }

    #[test]
    fn test_validators() {
        assert_eq!(validate_clear_amount(100), Ok(100));
        assert_eq!(validate_clear_amount(0), Err(ValidationError::ClearAmountOutOfRange));
        assert_eq!(validate_clear_amount(101), Err(ValidationError::ClearAmountOutOfRange));

        assert_eq!(validate_delete_days(None), Ok(0));
        assert_eq!(validate_delete_days(Some(8)), Err(ValidationError::DeleteDaysOutOfRange));

        let long = "r".repeat(MAX_REASON_LENGTH + 1);
        assert!(validate_reason(Some(&long)).is_err());
        assert_eq!(validate_reason(Some("  ")), Ok(None));
    }

    #[test]
    fn test_timeout_duration() {
        assert_eq!(
            timeout_duration(Some(30), Some(1), None),
            Ok(Duration::minutes(90))
        );
        assert_eq!(timeout_duration(None, None, None), Err(ValidationError::EmptyTimeout));
        assert_eq!(
            timeout_duration(None, None, Some(29)),
            Err(ValidationError::TimeoutTooLong)
        );
        assert_eq!(timeout_duration(None, None, Some(28)), Ok(Duration::days(28)));
        assert_eq!(
            timeout_duration(Some(i64::MAX), None, None),
            Err(ValidationError::TimeoutTooLong)
        );
    }
}
