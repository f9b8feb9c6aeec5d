//! Xtream Codes player API client
//!
//! Fetches live categories and live streams and hands the raw JSON to the
//! playlist parser. Credentials are only used to build URLs.

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{debug, info};

use crate::models::ParseResult;
use crate::playlist::parse_api_json;

/// Xtream player API client for one account
pub struct XtreamClient {
    server: String,
    username: String,
    password: String,
    client: reqwest::Client,
}

impl XtreamClient {
    /// Create a client for `server` (e.g. `http://panel.example:8080`)
    pub fn new(
        server: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let server: String = server.into();
        Self {
            server: server.trim_end_matches('/').to_string(),
            username: username.into(),
            password: password.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    /// `player_api.php` URL for an action
    pub fn action_url(&self, action: &str) -> String {
        format!(
            "{}/player_api.php?username={}&password={}&action={}",
            self.server,
            urlencoding::encode(&self.username),
            urlencoding::encode(&self.password),
            action
        )
    }

    /// Raw `get_live_categories` response
    pub async fn live_categories(&self) -> Result<Value> {
        self.fetch_action("get_live_categories").await
    }

    /// Raw `get_live_streams` response
    pub async fn live_streams(&self) -> Result<Value> {
        self.fetch_action("get_live_streams").await
    }

    /// Fetch categories and streams and normalize them into channels
    pub async fn live_channels(&self) -> Result<ParseResult> {
        let categories = self.live_categories().await?;
        let streams = self.live_streams().await?;

        let result = parse_api_json(
            &streams,
            &categories,
            &self.server,
            &self.username,
            &self.password,
        );
        info!(
            "Loaded {} live channels from {}",
            result.channels.len(),
            self.server
        );
        Ok(result)
    }

    async fn fetch_action(&self, action: &str) -> Result<Value> {
        debug!("Xtream request: {} on {}", action, self.server);
        let response = self
            .client
            .get(self.action_url(action))
            .send()
            .await
            .with_context(|| format!("Failed to reach Xtream server for {}", action))?;

        // Check for HTTP errors
        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Xtream server returned HTTP {} for {}", status, action);
        }

        let text = response
            .text()
            .await
            .context("Failed to read response body")?;

        serde_json::from_str(&text).with_context(|| format!("Failed to parse {} response", action))
    }
}
