//! Local Player - VLC/mpv as the native playback surface
//!
//! Implements [`MediaSink`] on top of an external player process so the CLI
//! has a real native stage. Playback outcomes are reported through an
//! optional event channel the host drains into the engine.

use std::process::{ExitStatus, Stdio};
use thiserror::Error;
use tokio::process::{Child, Command};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use super::decoder::{MediaSink, PlaybackEvent, RequestId, SinkError, SinkEvent};

/// Sink outcome tagged with the play request it belongs to
pub type StampedEvent = (RequestId, PlaybackEvent);

/// Supported local players
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerType {
    /// VLC media player (default)
    #[default]
    Vlc,
    /// mpv media player
    Mpv,
}

impl PlayerType {
    /// Get the command name for this player
    pub fn command(&self) -> &'static str {
        match self {
            PlayerType::Vlc => {
                // On macOS, VLC is an app bundle - check for it
                #[cfg(target_os = "macos")]
                if std::path::Path::new("/Applications/VLC.app").exists() {
                    return "/Applications/VLC.app/Contents/MacOS/VLC";
                }
                "vlc"
            }
            PlayerType::Mpv => "mpv",
        }
    }

    /// Get a display name for this player
    pub fn display_name(&self) -> &'static str {
        match self {
            PlayerType::Vlc => "VLC",
            PlayerType::Mpv => "mpv",
        }
    }

    /// Parse a config/CLI name, case-insensitive
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "vlc" => Some(PlayerType::Vlc),
            "mpv" => Some(PlayerType::Mpv),
            _ => None,
        }
    }

    /// Arguments for playing a URL
    pub fn args(&self, url: &str) -> Vec<String> {
        match self {
            // Don't show filename overlay
            PlayerType::Vlc => vec![url.to_string(), "--no-video-title-show".to_string()],
            // Show window immediately, even for audio-only streams
            PlayerType::Mpv => vec![url.to_string(), "--force-window=immediate".to_string()],
        }
    }
}

impl std::fmt::Display for PlayerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Errors from local player operations
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("Player '{0}' not found. Install it first.")]
    NotFound(String),
    #[error("Failed to start player: {0}")]
    StartFailed(#[from] std::io::Error),
    #[error("No source set")]
    NoSource,
}

/// External player process acting as a media sink
pub struct LocalPlayer {
    player_type: PlayerType,
    source: Option<String>,
    child: Option<Child>,
    visual_filter: Option<String>,
    request: RequestId,
    events: Option<UnboundedSender<StampedEvent>>,
}

impl LocalPlayer {
    /// Create a new local player with the specified type
    pub fn new(player_type: PlayerType) -> Self {
        Self {
            player_type,
            source: None,
            child: None,
            visual_filter: None,
            request: RequestId::default(),
            events: None,
        }
    }

    /// Create a VLC player
    pub fn vlc() -> Self {
        Self::new(PlayerType::Vlc)
    }

    /// Create an mpv player
    pub fn mpv() -> Self {
        Self::new(PlayerType::Mpv)
    }

    /// Report playback outcomes on this channel
    pub fn with_events(mut self, events: UnboundedSender<StampedEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Get the player type
    pub fn player_type(&self) -> PlayerType {
        self.player_type
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Last filter pushed by the engine. External players have no CSS
    /// filter support, so it is only recorded.
    pub fn visual_filter(&self) -> Option<&str> {
        self.visual_filter.as_deref()
    }

    /// Check if the player is available on the system
    pub async fn is_available(&self) -> bool {
        let cmd = self.player_type.command();

        // If it's a full path (macOS app bundle), check if it exists
        if cmd.starts_with('/') {
            return std::path::Path::new(cmd).exists();
        }

        // Otherwise use 'which' to find in PATH
        Command::new("which")
            .arg(cmd)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    pub fn is_running(&self) -> bool {
        self.child.is_some()
    }

    /// Poll the player process; returns its status once it has exited
    pub fn try_exit_status(&mut self) -> Option<ExitStatus> {
        let child = self.child.as_mut()?;
        match child.try_wait() {
            Ok(Some(status)) => {
                self.child = None;
                Some(status)
            }
            Ok(None) => None,
            Err(e) => {
                warn!("failed to poll {}: {}", self.player_type, e);
                None
            }
        }
    }

    /// Spawn the player for the current source
    fn spawn(&mut self) -> Result<(), PlayerError> {
        let url = self.source.as_deref().ok_or(PlayerError::NoSource)?;

        let mut cmd = Command::new(self.player_type.command());
        cmd.args(self.player_type.args(url));
        // Don't capture output - let it display normally
        cmd.stdout(Stdio::null());
        cmd.stderr(Stdio::null());
        cmd.kill_on_drop(true);

        let child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PlayerError::NotFound(self.player_type.command().to_string())
            } else {
                PlayerError::StartFailed(e)
            }
        })?;
        debug!("spawned {} for {}", self.player_type, url);
        self.child = Some(child);
        Ok(())
    }

    fn kill(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.start_kill() {
                warn!("failed to stop {}: {}", self.player_type, e);
            }
        }
    }

    fn report(&self, event: SinkEvent) {
        if let Some(events) = &self.events {
            // Host loop gone means nobody is listening anymore
            let _ = events.send((self.request, PlaybackEvent::Sink(event)));
        }
    }
}

impl MediaSink for LocalPlayer {
    fn set_source(&mut self, url: &str) -> Result<(), SinkError> {
        self.source = Some(url.to_string());
        Ok(())
    }

    fn play(&mut self) -> Result<(), SinkError> {
        self.kill();
        match self.spawn() {
            Ok(()) => {
                self.report(SinkEvent::PlaybackStarted);
                Ok(())
            }
            Err(e) => {
                self.report(SinkEvent::PlaybackRejected(e.to_string()));
                Ok(())
            }
        }
    }

    /// External players can't be paused from here; the process is stopped.
    fn pause(&mut self) -> Result<(), SinkError> {
        self.kill();
        Ok(())
    }

    fn clear_source(&mut self) -> Result<(), SinkError> {
        self.kill();
        self.source = None;
        Ok(())
    }

    fn reload_buffer(&mut self) -> Result<(), SinkError> {
        Ok(())
    }

    fn set_visual_filter(&mut self, css: &str) -> Result<(), SinkError> {
        self.visual_filter = Some(css.to_string());
        Ok(())
    }

    fn begin_request(&mut self, request: RequestId) {
        self.request = request;
    }
}
