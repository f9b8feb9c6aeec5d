//! API clients for external services
//!
//! - Xtream: live categories/streams via the player API
//! - Playlist fetch: M3U text over HTTP(S)

pub mod xtream;

pub use xtream::XtreamClient;

use anyhow::{Context, Result};

/// Download playlist text from an HTTP(S) URL
pub async fn fetch_playlist(url: &str) -> Result<String> {
    let response = reqwest::get(url)
        .await
        .with_context(|| format!("Failed to fetch playlist from {}", url))?;

    let status = response.status();
    if !status.is_success() {
        anyhow::bail!("Playlist server returned HTTP {}", status);
    }

    response
        .text()
        .await
        .context("Failed to read playlist body")
}
