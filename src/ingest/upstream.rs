//! Upstream provider client (thin I/O).
//!
//! The provider's schema is deliberately untyped here: both endpoints return
//! raw nested JSON and all interpretation happens in the normalizer.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use crate::error::{GridironError, Result};

/// Source of raw scoreboard and per-game summary payloads.
#[async_trait]
pub trait Upstream: Send + Sync {
    /// Current scoreboard with all of today's games
    async fn scoreboard(&self) -> Result<Value>;

    /// Detailed summary for one game, including the live situation
    async fn game_summary(&self, game_id: &str) -> Result<Value>;
}

/// ESPN site API client
pub struct EspnUpstream {
    client: reqwest::Client,
    base_url: String,
}

impl EspnUpstream {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0")
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    async fn get_json(&self, url: String) -> Result<Value> {
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| GridironError::TransientNetwork(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GridironError::TransientNetwork(format!(
                "{url} returned {status}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| GridironError::TransientNetwork(format!("{url}: invalid body: {e}")))
    }
}

#[async_trait]
impl Upstream for EspnUpstream {
    async fn scoreboard(&self) -> Result<Value> {
        self.get_json(format!("{}/scoreboard", self.base_url)).await
    }

    async fn game_summary(&self, game_id: &str) -> Result<Value> {
        self.get_json(format!("{}/summary?event={}", self.base_url, game_id))
            .await
    }
}
