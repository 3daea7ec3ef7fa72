// IPC request and response shapes.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};

/// Request body shared by every endpoint. Each endpoint reads the fields it needs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct IpcPayload {
    #[serde(deserialize_with = "flexible_id")]
    pub guild_id: Option<u64>,
    #[serde(deserialize_with = "flexible_id")]
    pub user_id: Option<u64>,
    #[serde(deserialize_with = "flexible_id")]
    pub channel_id: Option<u64>,
    pub message: Option<String>,
    pub reason: Option<String>,
}

/// Snowflakes arrive either as JSON numbers or as strings (JavaScript clients
/// cannot represent them as numbers without losing precision).
fn flexible_id<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(u64),
        Text(String),
    }

    match Option::<RawId>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawId::Number(0)) => Ok(None),
        Some(RawId::Number(id)) => Ok(Some(id)),
        Some(RawId::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(RawId::Text(text)) => text
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// An error answered to the dashboard as `{"error": {"code", "message"}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{code}: {message}")]
pub struct IpcError {
    pub code: u16,
    pub message: String,
}

impl IpcError {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(400, message)
    }

    pub fn unauthorized() -> Self {
        Self::new(401, "Unauthorized.")
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(404, message)
    }

    pub fn internal() -> Self {
        Self::new(500, "Internal error.")
    }

    pub fn to_json(&self) -> Value {
        json!({ "error": { "code": self.code, "message": self.message } })
    }
}

/// A text channel as the dashboard sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelSummary {
    pub id: u64,
    pub name: String,
}

/// A guild shared by the bot and a dashboard user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MutualGuild {
    #[serde(skip)]
    pub id: u64,
    pub name: String,
    pub member_manage_guild: bool,
    pub bot_manage_nicknames: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_accepts_string_and_number_ids() {
        let payload: IpcPayload =
            serde_json::from_str(r#"{"guild_id": "123456789012345678", "user_id": 42}"#).unwrap();

        assert_eq!(payload.guild_id, Some(123456789012345678));
        assert_eq!(payload.user_id, Some(42));
        assert_eq!(payload.channel_id, None);
    }

    #[test]
    fn test_null_and_zero_channel_mean_disable() {
        let payload: IpcPayload = serde_json::from_str(r#"{"channel_id": null}"#).unwrap();
        assert_eq!(payload.channel_id, None);

        let payload: IpcPayload = serde_json::from_str(r#"{"channel_id": 0}"#).unwrap();
        assert_eq!(payload.channel_id, None);
    }

    #[test]
    fn test_garbage_id_is_rejected() {
        assert!(serde_json::from_str::<IpcPayload>(r#"{"guild_id": "abc"}"#).is_err());
    }

    #[test]
    fn test_error_shape() {
        let json = IpcError::not_found("Guild not found.").to_json();
        assert_eq!(json["error"]["code"], 404);
        assert_eq!(json["error"]["message"], "Guild not found.");
    }
}
