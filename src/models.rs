//! Data structures and types for streamcascade
//!
//! Contains all shared models used across the crate organized by domain:
//! - **Playlist**: normalized channels, group buckets and parse results
//! - **Xtream**: raw category/stream records from the player API
//! - **Playback**: format hints, cascade states and visual filters

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Name given to channels whose metadata carries no display name
pub const DEFAULT_CHANNEL_NAME: &str = "CHANNEL";

/// Group for M3U entries without a `group-title` attribute
pub const DEFAULT_GROUP: &str = "GENERAL";

/// Group for API streams whose category is unknown
pub const DEFAULT_API_GROUP: &str = "OTHER";

// =============================================================================
// Playlist Models
// =============================================================================

/// A single playable entry from a playlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub name: String,
    pub group: String,
    pub url: String,
}

impl Channel {
    pub fn new(name: impl Into<String>, group: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            group: group.into(),
            url: url.into(),
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} - {}", self.group, self.name, self.url)
    }
}

/// Group name -> channels in insertion order
pub type GroupMap = BTreeMap<String, Vec<Channel>>;

/// Output of every playlist parse: the flat list plus its group buckets
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseResult {
    pub channels: Vec<Channel>,
    pub group_map: GroupMap,
}

impl ParseResult {
    /// Append a channel to the flat list and to its group bucket
    pub fn push(&mut self, channel: Channel) {
        self.group_map
            .entry(channel.group.clone())
            .or_default()
            .push(channel.clone());
        self.channels.push(channel);
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Channels of one group (exact, case-sensitive key)
    pub fn channels_in(&self, group: &str) -> &[Channel] {
        self.group_map.get(group).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of channels per group
    pub fn group_counts(&self) -> BTreeMap<&str, usize> {
        self.group_map
            .iter()
            .map(|(name, channels)| (name.as_str(), channels.len()))
            .collect()
    }
}

// =============================================================================
// Xtream API Models
// =============================================================================

/// Live category as returned by `get_live_categories`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiCategory {
    #[serde(deserialize_with = "deserialize_id")]
    pub category_id: String,
    #[serde(default)]
    pub category_name: String,
}

/// Live stream as returned by `get_live_streams`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiStream {
    #[serde(deserialize_with = "deserialize_id")]
    pub stream_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub category_id: Option<String>,
}

/// Xtream panels emit ids both as JSON numbers and as strings
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> String {
        match raw {
            RawId::Int(n) => n.to_string(),
            RawId::Float(n) if n.fract() == 0.0 => format!("{}", n as i64),
            RawId::Float(n) => n.to_string(),
            RawId::Text(s) => s,
        }
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawId::deserialize(deserializer).map(String::from)
}

fn deserialize_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawId>::deserialize(deserializer)?.map(String::from))
}

// =============================================================================
// Playback Models
// =============================================================================

/// Container guess made from the URL alone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatHint {
    Hls,
    Unknown,
}

impl fmt::Display for FormatHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatHint::Hls => write!(f, "HLS"),
            FormatHint::Unknown => write!(f, "unknown"),
        }
    }
}

/// Strategy currently driving the sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecoderKind {
    Hls,
    Ts,
    Native,
}

impl fmt::Display for DecoderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecoderKind::Hls => write!(f, "HLS"),
            DecoderKind::Ts => write!(f, "TS"),
            DecoderKind::Native => write!(f, "native"),
        }
    }
}

/// Cascade state of the playback engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    Idle,
    TryingHls,
    TryingTs,
    TryingNative,
    Playing(DecoderKind),
    Failed,
}

impl PlaybackState {
    /// Playing and Failed end a play request
    pub fn is_terminal(&self) -> bool {
        matches!(self, PlaybackState::Playing(_) | PlaybackState::Failed)
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackState::Idle => write!(f, "Idle"),
            PlaybackState::TryingHls => write!(f, "Trying HLS..."),
            PlaybackState::TryingTs => write!(f, "Trying TS..."),
            PlaybackState::TryingNative => write!(f, "Trying native..."),
            PlaybackState::Playing(kind) => write!(f, "▶ Playing ({})", kind),
            PlaybackState::Failed => write!(f, "Failed"),
        }
    }
}

/// Picture adjustments pushed to the sink as a CSS filter string
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualFilter {
    /// Percent, 100 = unchanged
    pub brightness: f32,
    pub contrast: f32,
    pub saturation: f32,
    /// Degrees
    pub hue: f32,
}

impl Default for VisualFilter {
    fn default() -> Self {
        Self {
            brightness: 100.0,
            contrast: 100.0,
            saturation: 100.0,
            hue: 0.0,
        }
    }
}

impl VisualFilter {
    /// Filter value that removes every adjustment
    pub const NONE: &'static str = "none";

    /// Render as a CSS `filter` value
    pub fn css(&self) -> String {
        format!(
            "brightness({}%) contrast({}%) saturate({}%) hue-rotate({}deg)",
            self.brightness, self.contrast, self.saturation, self.hue
        )
    }
}

impl fmt::Display for VisualFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.css())
    }
}
