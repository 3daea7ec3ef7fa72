// AFK domain models and the nickname helpers that go with them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Prefix put in front of an AFK member's nickname.
pub const AFK_PREFIX: &str = "[AFK]";
pub const MAX_AFK_REASON_LENGTH: usize = 100;
/// Discord's nickname limit.
pub const MAX_NICKNAME_LENGTH: usize = 32;
/// Discord's message content limit.
const MAX_MESSAGE_LENGTH: usize = 2000;

const UNSPECIFIED_REASON: &str = "Unspecified.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AfkRecord {
    pub user_id: u64,
    pub guild_id: u64,
    pub start: DateTime<Utc>,
    pub reason: Option<String>,
}

impl AfkRecord {
    pub fn new(user_id: u64, guild_id: u64, start: DateTime<Utc>, reason: Option<String>) -> Self {
        Self {
            user_id,
            guild_id,
            start,
            reason,
        }
    }

    pub fn reason_or_default(&self) -> &str {
        self.reason.as_deref().unwrap_or(UNSPECIFIED_REASON)
    }

    /// Discord timestamp markup, rendered in each reader's local time.
    pub fn start_markup(&self) -> String {
        format!("<t:{}:t>", self.start.timestamp())
    }

    /// "<@id> is afk since <t:..:t>.\n**Reason:** ..."
    pub fn status_line(&self) -> String {
        format!(
            "<@{}> is afk since {}.\n**Reason:** {}",
            self.user_id,
            self.start_markup(),
            self.reason_or_default()
        )
    }

    /// One numbered entry of `/afk list`.
    pub fn list_line(&self, index: usize) -> String {
        format!(
            "`{}.` <@{}> - since {} - **Reason:** {}",
            index,
            self.user_id,
            self.start_markup(),
            self.reason_or_default()
        )
    }

    /// Start time in the format the dashboard expects.
    pub fn dashboard_start(&self) -> String {
        self.start.format("%d-%m-%Y %H:%M:%S").to_string()
    }
}

/// Render the AFK list. Entries that would push the message past Discord's
/// limit are dropped and counted in a trailing line.
pub fn format_afk_list(records: &[AfkRecord]) -> String {
    if records.is_empty() {
        return "No members are afk.".to_string();
    }

    let mut output = String::new();
    for (i, record) in records.iter().enumerate() {
        let line = record.list_line(i + 1);
        let remaining = records.len() - i;
        // leave room for the "...and N more" footer
        if output.len() + line.len() + 32 > MAX_MESSAGE_LENGTH {
            output.push_str(&format!("...and {} more.", remaining));
            break;
        }
        output.push_str(&line);
        output.push('\n');
    }
    output.trim_end().to_string()
}

/// Nickname to apply when going AFK, or `None` if it already carries the prefix.
pub fn afk_nickname(display_name: &str) -> Option<String> {
    if display_name.starts_with(AFK_PREFIX) {
        return None;
    }
    let nickname = format!("{} {}", AFK_PREFIX, display_name);
    Some(nickname.chars().take(MAX_NICKNAME_LENGTH).collect())
}

/// Nickname to restore when coming back, or `None` if there is no prefix to strip.
pub fn strip_afk_prefix(display_name: &str) -> Option<String> {
    display_name
        .strip_prefix(AFK_PREFIX)
        .map(|rest| rest.trim_start().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(reason: Option<&str>) -> AfkRecord {
        let start = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        AfkRecord::new(10, 20, start, reason.map(String::from))
    }

    #[test]
    fn test_status_line_falls_back_to_unspecified() {
        let line = record(None).status_line();
        assert!(line.starts_with("<@10> is afk since <t:"));
        assert!(line.ends_with("**Reason:** Unspecified."));
    }

    #[test]
    fn test_dashboard_start_format() {
        assert_eq!(record(Some("lunch")).dashboard_start(), "09-03-2024 14:05:07");
    }

    #[test]
    fn test_afk_nickname_is_truncated() {
        let nick = afk_nickname("a-very-long-display-name-indeed!!").unwrap();
        assert_eq!(nick.chars().count(), MAX_NICKNAME_LENGTH);
        assert!(nick.starts_with("[AFK] a-very"));
        assert_eq!(afk_nickname("[AFK] bob"), None);
    }

    #[test]
    fn test_strip_afk_prefix() {
        assert_eq!(strip_afk_prefix("[AFK] bob").as_deref(), Some("bob"));
        assert_eq!(strip_afk_prefix("bob"), None);
    }

    #[test]
    fn test_empty_list_message() {
        assert_eq!(format_afk_list(&[]), "No members are afk.");
    }

    #[test]
    fn test_long_list_stays_under_message_limit() {
        let records: Vec<AfkRecord> = (0..200).map(|_| record(Some("brb"))).collect();
        let output = format_afk_list(&records);
        assert!(output.len() <= MAX_MESSAGE_LENGTH);
        assert!(output.ends_with("more."));
        assert!(output.starts_with("`1.` <@10>"));
    }
}
