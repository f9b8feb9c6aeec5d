//! Playback Engine - format cascade state machine
//!
//! Plays a URL whose container is unknown up front by walking a fixed
//! cascade of strategies:
//!
//! ```text
//! Idle ─play─> TryingHls ─fatal─> TryingTs ─error─> TryingNative ─> Playing | Failed
//!          └──(no HLS hint)──────────^
//! ```
//!
//! A missing HLS factory skips straight to the native stage. The engine owns
//! at most one decoder at a time; every transition releases the previous one
//! before anything new touches the sink.
//!
//! Every `play()` and `stop()` opens a new [`RequestId`]. Collaborators stamp
//! their events with the request they were created for, and anything stamped
//! with an older request is dropped.

use thiserror::Error;
use tracing::{debug, info, warn};

use super::decoder::{
    DecoderError, HlsConfig, HlsDecoder, HlsDecoderFactory, HlsEvent, MediaSink, PlaybackEvent,
    RequestId, SinkEvent, StatusObserver, TsConfig, TsDecoder, TsDecoderFactory, TsEvent,
};
use super::detect::detect;
use crate::models::{DecoderKind, FormatHint, PlaybackState, VisualFilter};

/// Errors returned synchronously by [`PlaybackEngine::play`]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlayError {
    #[error("no stream URL given")]
    MissingUrl,
    #[error("invalid stream URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Check that a play target is a non-empty absolute URL
pub fn validate_url(url: &str) -> Result<&str, PlayError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(PlayError::MissingUrl);
    }
    url::Url::parse(url).map_err(|e| PlayError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    Ok(url)
}

// =============================================================================
// Decoder slot
// =============================================================================

/// The single decoder the engine may own
#[derive(Default)]
enum DecoderSlot {
    #[default]
    Empty,
    Hls(Box<dyn HlsDecoder>),
    Ts(Box<dyn TsDecoder>),
}

impl DecoderSlot {
    fn kind(&self) -> Option<DecoderKind> {
        match self {
            DecoderSlot::Empty => None,
            DecoderSlot::Hls(_) => Some(DecoderKind::Hls),
            DecoderSlot::Ts(_) => Some(DecoderKind::Ts),
        }
    }

    /// Destroy the occupant, if any. Release failures are logged only.
    fn release(&mut self) {
        match std::mem::take(self) {
            DecoderSlot::Empty => {}
            DecoderSlot::Hls(mut decoder) => {
                debug!("releasing HLS decoder");
                if let Err(e) = decoder.destroy() {
                    warn!("HLS decoder release failed: {}", e);
                }
            }
            DecoderSlot::Ts(mut decoder) => {
                debug!("releasing TS decoder");
                if let Err(e) = decoder.destroy() {
                    warn!("TS decoder release failed: {}", e);
                }
            }
        }
    }

    /// Replace the occupant, releasing the previous one first
    fn install(&mut self, next: DecoderSlot) {
        self.release();
        *self = next;
    }
}

// =============================================================================
// Engine
// =============================================================================

/// Cascade playback engine over a host-provided sink
pub struct PlaybackEngine<S: MediaSink> {
    sink: S,
    hls_factory: Option<Box<dyn HlsDecoderFactory>>,
    ts_factory: Option<Box<dyn TsDecoderFactory>>,
    hls_config: HlsConfig,
    observers: Vec<Box<dyn StatusObserver>>,
    slot: DecoderSlot,
    state: PlaybackState,
    target_url: Option<String>,
    request: RequestId,
}

impl<S: MediaSink> PlaybackEngine<S> {
    /// Create an engine with no decoders; every URL goes to native playback
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            hls_factory: None,
            ts_factory: None,
            hls_config: HlsConfig::default(),
            observers: Vec::new(),
            slot: DecoderSlot::Empty,
            state: PlaybackState::Idle,
            target_url: None,
            request: RequestId::default(),
        }
    }

    pub fn with_hls(mut self, factory: impl HlsDecoderFactory + 'static) -> Self {
        self.hls_factory = Some(Box::new(factory));
        self
    }

    pub fn with_ts(mut self, factory: impl TsDecoderFactory + 'static) -> Self {
        self.ts_factory = Some(Box::new(factory));
        self
    }

    pub fn with_hls_config(mut self, config: HlsConfig) -> Self {
        self.hls_config = config;
        self
    }

    pub fn with_observer(mut self, observer: impl StatusObserver + 'static) -> Self {
        self.add_observer(observer);
        self
    }

    pub fn add_observer(&mut self, observer: impl StatusObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Decoder currently attached to the sink, if any
    pub fn active_decoder(&self) -> Option<DecoderKind> {
        match self.state {
            PlaybackState::Playing(kind) => Some(kind),
            PlaybackState::TryingNative => Some(DecoderKind::Native),
            _ => self.slot.kind(),
        }
    }

    /// Request that events must be stamped with to be accepted
    pub fn request(&self) -> RequestId {
        self.request
    }

    pub fn target_url(&self) -> Option<&str> {
        self.target_url.as_deref()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Start playing a URL, restarting the cascade from scratch.
    ///
    /// Only an unusable URL is an error; playback failures are reported
    /// through observers and end in [`PlaybackState::Failed`].
    pub fn play(&mut self, url: &str) -> Result<(), PlayError> {
        let url = match validate_url(url) {
            Ok(url) => url.to_string(),
            Err(e) => {
                self.notify(&format!("⚠️ Warning: {}", e));
                return Err(e);
            }
        };

        self.notify("⌛ Analyzing link...");
        self.reset_internal();
        self.open_request();
        self.target_url = Some(url.clone());

        match detect(&url) {
            FormatHint::Hls => self.try_hls(&url),
            FormatHint::Unknown => self.try_ts(&url),
        }
        Ok(())
    }

    /// Tear everything down and return to Idle
    pub fn stop(&mut self) {
        self.reset_internal();
        self.open_request();
        self.target_url = None;
        self.state = PlaybackState::Idle;
        self.notify("⏹ Playback stopped");
    }

    /// Push picture adjustments to the sink
    pub fn apply_filters(&mut self, filter: &VisualFilter) {
        if let Err(e) = self.sink.set_visual_filter(&filter.css()) {
            warn!("failed to apply visual filter: {}", e);
        }
    }

    pub fn reset_filters(&mut self) {
        if let Err(e) = self.sink.set_visual_filter(VisualFilter::NONE) {
            warn!("failed to reset visual filter: {}", e);
        }
    }

    /// Feed an asynchronous collaborator outcome into the state machine.
    ///
    /// `request` is the id the reporting collaborator was created for.
    pub fn handle_event(&mut self, request: RequestId, event: impl Into<PlaybackEvent>) {
        let event = event.into();
        if request != self.request {
            debug!(
                "ignoring {:?} from request {} (current {})",
                event, request, self.request
            );
            return;
        }
        let Some(url) = self.target_url.clone() else {
            debug!("ignoring {:?} with no active play request", event);
            return;
        };

        match event {
            PlaybackEvent::Hls(event) if self.slot.kind() == Some(DecoderKind::Hls) => {
                self.on_hls_event(event, &url)
            }
            PlaybackEvent::Ts(event) if self.slot.kind() == Some(DecoderKind::Ts) => {
                self.on_ts_event(event, &url)
            }
            PlaybackEvent::Sink(event) => self.on_sink_event(event),
            event => debug!("ignoring stale {:?} in state {:?}", event, self.state),
        }
    }

    // -------------------------------------------------------------------------
    // Cascade stages
    // -------------------------------------------------------------------------

    fn try_hls(&mut self, url: &str) {
        self.enter(PlaybackState::TryingHls, "⌛ Trying HLS engine...");

        let factory = match self.hls_factory.as_ref() {
            Some(factory) if factory.is_supported() => factory,
            _ => {
                self.notify("⚠️ HLS not supported, trying native player...");
                return self.try_native(url);
            }
        };

        let decoder = match factory.create(&self.hls_config, self.request) {
            Ok(decoder) => decoder,
            Err(e) => return self.hls_failed(url, e),
        };

        self.slot.install(DecoderSlot::Hls(decoder));
        let DecoderSlot::Hls(decoder) = &mut self.slot else {
            return;
        };
        let started = decoder
            .load_source(url)
            .and_then(|()| decoder.attach_to_sink(&mut self.sink));
        if let Err(e) = started {
            self.hls_failed(url, e);
        }
    }

    fn hls_failed(&mut self, url: &str, error: DecoderError) {
        warn!("HLS stage failed for {}: {}", url, error);
        self.slot.release();
        self.notify("⚠️ HLS failed, switching to TS engine...");
        self.try_ts(url);
    }

    fn on_hls_event(&mut self, event: HlsEvent, url: &str) {
        match event {
            HlsEvent::ManifestParsed if self.state == PlaybackState::TryingHls => {
                self.enter(PlaybackState::Playing(DecoderKind::Hls), "🟢 HLS engine active");
                if let Err(e) = self.sink.play() {
                    self.playback_rejected(&e.to_string());
                }
            }
            HlsEvent::ManifestParsed => debug!("duplicate manifest notification ignored"),
            HlsEvent::Error { fatal: true, details } => {
                self.hls_failed(url, DecoderError::Load(details));
            }
            HlsEvent::Error {
                fatal: false,
                details,
            } => {
                // The decoder recovers on its own; never escalated.
                debug!("non-fatal HLS error: {}", details);
                self.notify(&format!("⚠️ HLS stream hiccup (recovering): {}", details));
            }
        }
    }

    fn try_ts(&mut self, url: &str) {
        self.enter(PlaybackState::TryingTs, "⌛ Trying TS engine...");

        let factory = match self.ts_factory.as_ref() {
            Some(factory) if factory.supports_live_playback() => factory,
            _ => {
                self.notify("⚠️ TS not supported, trying native player...");
                return self.try_native(url);
            }
        };

        let decoder = match factory.create(&TsConfig::live(url), self.request) {
            Ok(decoder) => decoder,
            Err(e) => return self.ts_failed(url, &e.to_string()),
        };

        self.slot.install(DecoderSlot::Ts(decoder));
        let DecoderSlot::Ts(decoder) = &mut self.slot else {
            return;
        };
        let started = decoder
            .attach_to_sink(&mut self.sink)
            .and_then(|()| decoder.load())
            .and_then(|()| decoder.play());
        if let Err(e) = started {
            self.ts_failed(url, &e.to_string());
        }
    }

    fn ts_failed(&mut self, url: &str, reason: &str) {
        warn!("TS stage failed for {}: {}", url, reason);
        self.slot.release();
        self.notify("⚠️ TS failed, trying native player...");
        self.try_native(url);
    }

    fn on_ts_event(&mut self, event: TsEvent, url: &str) {
        match event {
            TsEvent::PlaybackStarted if self.state == PlaybackState::TryingTs => {
                self.enter(PlaybackState::Playing(DecoderKind::Ts), "🟢 TS engine active");
            }
            TsEvent::PlaybackStarted => debug!("duplicate TS start ignored"),
            TsEvent::PlaybackFailed(reason) | TsEvent::Error(reason) => {
                self.ts_failed(url, &reason);
            }
        }
    }

    fn try_native(&mut self, url: &str) {
        self.enter(PlaybackState::TryingNative, "⌛ Trying native player...");

        let requested = self.sink.set_source(url).and_then(|()| self.sink.play());
        if let Err(e) = requested {
            self.native_failed(&e.to_string());
        }
    }

    fn native_failed(&mut self, reason: &str) {
        warn!("native playback failed: {}", reason);
        self.enter(
            PlaybackState::Failed,
            "❌ Stream source connection error! (cannot play)",
        );
    }

    fn on_sink_event(&mut self, event: SinkEvent) {
        match (self.state, event) {
            (PlaybackState::TryingNative, SinkEvent::PlaybackStarted) => {
                self.enter(
                    PlaybackState::Playing(DecoderKind::Native),
                    "🟢 Native player active",
                );
            }
            (PlaybackState::TryingNative, SinkEvent::PlaybackRejected(reason)) => {
                self.native_failed(&reason);
            }
            (PlaybackState::Playing(_), SinkEvent::PlaybackRejected(reason)) => {
                self.playback_rejected(&reason);
            }
            (state, event) => debug!("ignoring sink {:?} in state {:?}", event, state),
        }
    }

    /// The sink refused to start; the active decoder stays in charge
    fn playback_rejected(&mut self, reason: &str) {
        warn!("sink refused to start playback: {}", reason);
        self.notify(&format!("⚠️ Autoplay blocked: {}", reason));
    }

    // -------------------------------------------------------------------------
    // Teardown and notification
    // -------------------------------------------------------------------------

    /// Release any decoder, then reset the sink. Every step runs even if an
    /// earlier one fails.
    fn reset_internal(&mut self) {
        self.slot.release();

        if let Err(e) = self.sink.pause() {
            warn!("sink pause failed during reset: {}", e);
        }
        if let Err(e) = self.sink.clear_source() {
            warn!("sink clear failed during reset: {}", e);
        }
        if let Err(e) = self.sink.reload_buffer() {
            warn!("sink buffer reset failed: {}", e);
        }
    }

    /// Invalidate everything reported for earlier requests
    fn open_request(&mut self) {
        self.request = self.request.next();
        self.sink.begin_request(self.request);
    }

    fn enter(&mut self, state: PlaybackState, message: &str) {
        debug!("{:?} -> {:?}", self.state, state);
        self.state = state;
        self.notify(message);
    }

    fn notify(&self, message: &str) {
        info!("{}", message);
        for observer in &self.observers {
            observer.on_status(message);
        }
    }
}

impl<S: MediaSink> Drop for PlaybackEngine<S> {
    fn drop(&mut self) {
        self.slot.release();
    }
}
