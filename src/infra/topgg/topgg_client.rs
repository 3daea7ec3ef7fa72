use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// How often the guild count is posted.
pub const POST_INTERVAL: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, Error)]
pub enum TopggError {
    #[error("top.gg API error: {0}")]
    Api(String),
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct StatsBody {
    server_count: usize,
    shard_count: u32,
}

/// Minimal top.gg client. Only posts bot statistics.
pub struct TopggClient {
    client: Client,
    base_url: String,
}

impl TopggClient {
    pub fn new(token: &str) -> Result<Self, TopggError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "Authorization",
            HeaderValue::from_str(token).map_err(|e| TopggError::Api(e.to_string()))?,
        );
        headers.insert("User-Agent", HeaderValue::from_static("FumeGuard/0.1"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| TopggError::Api(e.to_string()))?;

        Ok(Self {
            client,
            base_url: "https://top.gg/api".to_string(),
        })
    }

    fn stats_url(&self, bot_id: u64) -> String {
        format!("{}/bots/{}/stats", self.base_url, bot_id)
    }

    pub async fn post_stats(
        &self,
        bot_id: u64,
        server_count: usize,
        shard_count: u32,
    ) -> Result<(), TopggError> {
        let response = self
            .client
            .post(self.stats_url(bot_id))
            .json(&StatsBody {
                server_count,
                shard_count,
            })
            .send()
            .await
            .map_err(|e| TopggError::Api(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TopggError::Api(format!("{}: {}", status, body)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_url() {
        let client = TopggClient::new("token").unwrap();
        assert_eq!(
            client.stats_url(123),
            "https://top.gg/api/bots/123/stats"
        );
    }

    #[test]
    fn test_stats_body_shape() {
        let body = serde_json::to_value(StatsBody {
            server_count: 42,
            shard_count: 2,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "server_count": 42, "shard_count": 2 }));
    }

    #[test]
    fn test_invalid_token_is_rejected() {
        assert!(TopggClient::new("bad\ntoken").is_err());
    }
}
