//! Playlist normalization
//!
//! Turns M3U text or Xtream API lists into a [`ParseResult`]. Neither entry
//! point fails: malformed lines and records are skipped.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::models::{
    ApiCategory, ApiStream, Channel, ParseResult, DEFAULT_API_GROUP, DEFAULT_CHANNEL_NAME,
    DEFAULT_GROUP,
};

/// `group-title="..."`, key matched case-insensitively
static GROUP_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)group-title="(.*?)""#).expect("valid group-title regex"));

/// Parse line-oriented M3U text.
///
/// Metadata from the most recent `#EXTINF` line applies to every following
/// URL line until the next `#EXTINF`, so a bare URL reuses the last name
/// and group.
pub fn parse_text(raw: &str) -> ParseResult {
    let mut result = ParseResult::default();
    let mut name = DEFAULT_CHANNEL_NAME.to_string();
    let mut group = DEFAULT_GROUP.to_string();

    for line in raw.lines().map(str::trim) {
        if line.starts_with("#EXTINF") {
            name = extinf_name(line);
            group = GROUP_TITLE
                .captures(line)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_uppercase())
                .unwrap_or_else(|| DEFAULT_GROUP.to_string());
        } else if is_url_line(line) {
            result.push(Channel::new(name.clone(), group.clone(), line));
        }
    }

    debug!(
        "parsed {} channels in {} groups from playlist text",
        result.channels.len(),
        result.group_map.len()
    );
    result
}

/// Display name: text after the last comma of an `#EXTINF` line
fn extinf_name(line: &str) -> String {
    match line.rsplit_once(',') {
        Some((_, name)) if !name.trim().is_empty() => name.trim().to_string(),
        _ => DEFAULT_CHANNEL_NAME.to_string(),
    }
}

fn is_url_line(line: &str) -> bool {
    let prefix: String = line.chars().take(8).collect::<String>().to_lowercase();
    prefix.starts_with("http://") || prefix.starts_with("https://")
}

/// Build channels from Xtream live categories and streams.
///
/// Category names are used exactly as the panel sends them. Stream URLs
/// follow `{server_base}/live/{username}/{password}/{stream_id}.ts`.
pub fn parse_api_lists(
    streams: &[ApiStream],
    categories: &[ApiCategory],
    server_base: &str,
    username: &str,
    password: &str,
) -> ParseResult {
    let category_index: HashMap<&str, &str> = categories
        .iter()
        .map(|c| (c.category_id.as_str(), c.category_name.as_str()))
        .collect();

    let server_base = server_base.trim_end_matches('/');
    let mut result = ParseResult::default();

    for stream in streams {
        let group = stream
            .category_id
            .as_deref()
            .and_then(|id| category_index.get(id))
            .filter(|name| !name.is_empty())
            .copied()
            .unwrap_or(DEFAULT_API_GROUP);
        let name = stream
            .name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(DEFAULT_CHANNEL_NAME);
        let url = format!(
            "{}/live/{}/{}/{}.ts",
            server_base, username, password, stream.stream_id
        );
        result.push(Channel::new(name, group, url));
    }

    debug!(
        "built {} channels from {} API streams and {} categories",
        result.channels.len(),
        streams.len(),
        categories.len()
    );
    result
}

/// Same as [`parse_api_lists`] over raw API JSON.
///
/// Anything that is not an array counts as an empty list; records that fail
/// to deserialize are skipped.
pub fn parse_api_json(
    streams: &Value,
    categories: &Value,
    server_base: &str,
    username: &str,
    password: &str,
) -> ParseResult {
    let streams: Vec<ApiStream> = records(streams, "stream");
    let categories: Vec<ApiCategory> = records(categories, "category");
    parse_api_lists(&streams, &categories, server_base, username, password)
}

fn records<T: serde::de::DeserializeOwned>(value: &Value, kind: &str) -> Vec<T> {
    let Some(items) = value.as_array() else {
        if !value.is_null() {
            warn!("expected a JSON array of {} records, ignoring", kind);
        }
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match T::deserialize(item) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!("skipping malformed {} record: {}", kind, e);
                None
            }
        })
        .collect()
}
