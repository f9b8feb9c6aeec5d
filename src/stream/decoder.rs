//! Collaborator seams for the playback cascade
//!
//! The engine never talks to a concrete demuxer or output surface. Hosts plug
//! in decoder factories and a [`MediaSink`], then feed the asynchronous
//! outcomes those collaborators produce back as [`PlaybackEvent`]s.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by decoder commands
#[derive(Debug, Error)]
pub enum DecoderError {
    #[error("decoder could not be created: {0}")]
    Create(String),
    #[error("failed to load stream: {0}")]
    Load(String),
    #[error("failed to attach to sink: {0}")]
    Attach(String),
    #[error("failed to start playback: {0}")]
    Play(String),
    #[error("failed to release decoder: {0}")]
    Release(String),
}

/// Errors raised by sink commands
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("sink rejected source: {0}")]
    Source(String),
    #[error("sink playback request failed: {0}")]
    Play(String),
    #[error("sink command failed: {0}")]
    Command(String),
}

// =============================================================================
// Configuration handed to decoder factories
// =============================================================================

/// Settings for HLS decoder creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HlsConfig {
    pub max_manifest_retries: u32,
    pub max_level_retries: u32,
    /// Let the decoder fetch and demux off the main context
    pub background_loading: bool,
}

impl Default for HlsConfig {
    fn default() -> Self {
        Self {
            max_manifest_retries: 3,
            max_level_retries: 3,
            background_loading: true,
        }
    }
}

/// Settings for Transport-Stream decoder creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TsConfig {
    pub stream_type: String,
    pub url: String,
    pub is_live: bool,
    pub cors: bool,
}

impl TsConfig {
    /// Live MPEG-TS config for a URL
    pub fn live(url: impl Into<String>) -> Self {
        Self {
            stream_type: "mpegts".to_string(),
            url: url.into(),
            is_live: true,
            cors: true,
        }
    }
}

// =============================================================================
// Collaborator traits
// =============================================================================

/// The playable surface decoders attach to
pub trait MediaSink {
    /// Point the sink's native source at a URL
    fn set_source(&mut self, url: &str) -> Result<(), SinkError>;

    /// Request playback; the outcome arrives later as a [`SinkEvent`]
    fn play(&mut self) -> Result<(), SinkError>;

    fn pause(&mut self) -> Result<(), SinkError>;

    fn clear_source(&mut self) -> Result<(), SinkError>;

    /// Drop whatever the sink has buffered
    fn reload_buffer(&mut self) -> Result<(), SinkError>;

    fn set_visual_filter(&mut self, css: &str) -> Result<(), SinkError>;

    /// A new play request starts; events reported from now on carry `request`
    fn begin_request(&mut self, _request: RequestId) {}
}

/// A live HLS decoder instance
pub trait HlsDecoder {
    fn load_source(&mut self, url: &str) -> Result<(), DecoderError>;

    fn attach_to_sink(&mut self, sink: &mut dyn MediaSink) -> Result<(), DecoderError>;

    /// Detach from the sink and free everything the decoder holds
    fn destroy(&mut self) -> Result<(), DecoderError>;
}

/// Creates HLS decoders; absence of a factory means no HLS support
pub trait HlsDecoderFactory {
    /// Whether the runtime can play HLS at all
    fn is_supported(&self) -> bool {
        true
    }

    /// Events of the created decoder must be reported with `request`
    fn create(
        &self,
        config: &HlsConfig,
        request: RequestId,
    ) -> Result<Box<dyn HlsDecoder>, DecoderError>;
}

/// A live MPEG-TS decoder instance
pub trait TsDecoder {
    fn attach_to_sink(&mut self, sink: &mut dyn MediaSink) -> Result<(), DecoderError>;

    fn load(&mut self) -> Result<(), DecoderError>;

    /// Request playback; the outcome arrives later as a [`TsEvent`]
    fn play(&mut self) -> Result<(), DecoderError>;

    fn destroy(&mut self) -> Result<(), DecoderError>;
}

/// Creates TS decoders
pub trait TsDecoderFactory {
    /// Must report live-playback capability specifically, not just presence
    fn supports_live_playback(&self) -> bool {
        true
    }

    fn create(&self, config: &TsConfig, request: RequestId) -> Result<Box<dyn TsDecoder>, DecoderError>;
}

/// Receives every human-readable status message the engine emits
pub trait StatusObserver {
    fn on_status(&self, message: &str);
}

impl<F> StatusObserver for F
where
    F: Fn(&str),
{
    fn on_status(&self, message: &str) {
        self(message)
    }
}

// =============================================================================
// Events reported back by collaborators
// =============================================================================

/// Identity of one play request. Events stamped with an older request are
/// dropped by the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

impl RequestId {
    pub fn next(self) -> Self {
        RequestId(self.0.wrapping_add(1))
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HlsEvent {
    ManifestParsed,
    Error { fatal: bool, details: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TsEvent {
    PlaybackStarted,
    PlaybackFailed(String),
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    PlaybackStarted,
    /// Playback refused, e.g. by an autoplay policy
    PlaybackRejected(String),
}

/// Asynchronous outcome fed to [`PlaybackEngine::handle_event`](super::PlaybackEngine::handle_event)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackEvent {
    Hls(HlsEvent),
    Ts(TsEvent),
    Sink(SinkEvent),
}

impl From<HlsEvent> for PlaybackEvent {
    fn from(event: HlsEvent) -> Self {
        PlaybackEvent::Hls(event)
    }
}

impl From<TsEvent> for PlaybackEvent {
    fn from(event: TsEvent) -> Self {
        PlaybackEvent::Ts(event)
    }
}

impl From<SinkEvent> for PlaybackEvent {
    fn from(event: SinkEvent) -> Self {
        PlaybackEvent::Sink(event)
    }
}
