//! CLI - Command Line Interface for streamcascade
//!
//! Every command is scriptable. All output is JSON-parseable.
//!
//! # Examples
//!
//! ```bash
//! # Play a stream, cascading HLS -> TS -> native
//! streamcascade play "http://panel:8080/live/u/p/7.ts"
//!
//! # Inspect a playlist
//! streamcascade groups ./list.m3u
//! streamcascade channels ./list.m3u --group SPORTS
//!
//! # Export a subset
//! streamcascade export ./list.m3u -g NEWS -o news.m3u
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::io::IsTerminal;
use std::path::PathBuf;

use crate::models::{Channel, DecoderKind, FormatHint, PlaybackState};
use crate::playlist::export::DEFAULT_EXPORT_NAME;
use crate::stream::PlayerType;

// =============================================================================
// Exit Codes
// =============================================================================

/// Exit codes for CLI operations (semantic for scripting)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// General error
    Error = 1,
    /// Invalid arguments
    InvalidArgs = 2,
    /// Network error
    NetworkError = 3,
    /// Playlist had no matching channels
    NoChannels = 4,
    /// Every playback strategy failed
    PlaybackFailed = 5,
    /// Export could not be written
    ExportFailed = 6,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> std::process::ExitCode {
        std::process::ExitCode::from(code as u8)
    }
}

// =============================================================================
// Main CLI Structure
// =============================================================================

/// streamcascade - play anything, sort everything
#[derive(Parser, Debug)]
#[command(
    name = "streamcascade",
    version,
    about = "Format-cascading stream player and playlist normalizer",
    long_about = "Plays remote streams of unknown format by trying HLS, then \
                  MPEG-TS, then native playback.\n\n\
                  Also parses M3U playlists and Xtream panels into grouped \
                  channel lists and exports selections back to M3U.",
    after_help = "EXAMPLES:\n\
                  streamcascade play http://x/live/7.ts      Play a stream\n\
                  streamcascade detect http://x/index.m3u8   Show format hint\n\
                  streamcascade groups list.m3u --json       Ranked groups\n\
                  streamcascade export list.m3u -g NEWS      Export a group"
)]
pub struct Cli {
    /// Output format as JSON (default for non-TTY)
    #[arg(long, short = 'j', global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Path to config file
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, short = 'v', global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Check if JSON output should be used
    pub fn should_json(&self) -> bool {
        self.json || !std::io::stdout().is_terminal()
    }
}

// =============================================================================
// Subcommands
// =============================================================================

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play a stream through the HLS -> TS -> native cascade
    #[command(visible_alias = "p")]
    Play(PlayCmd),

    /// Show which cascade stage a URL starts in
    #[command(visible_alias = "d")]
    Detect(DetectCmd),

    /// List channels of an M3U playlist
    #[command(visible_alias = "ch")]
    Channels(ChannelsCmd),

    /// List playlist groups in priority order
    #[command(visible_alias = "g")]
    Groups(GroupsCmd),

    /// Load live channels from an Xtream panel
    #[command(visible_alias = "x")]
    Xtream(XtreamCmd),

    /// Export selected groups to an M3U file
    #[command(visible_alias = "e")]
    Export(ExportCmd),
}

// =============================================================================
// Playback Commands
// =============================================================================

/// Play a stream URL
#[derive(Args, Debug)]
pub struct PlayCmd {
    /// Stream URL (*.m3u8, *.ts or anything the player understands)
    #[arg(required = true)]
    pub url: String,

    /// Player for native playback (default from config, else vlc)
    #[arg(long, short = 'p', value_enum)]
    pub player: Option<PlayerChoice>,
}

/// Local player choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PlayerChoice {
    Vlc,
    Mpv,
}

impl From<PlayerChoice> for PlayerType {
    fn from(choice: PlayerChoice) -> Self {
        match choice {
            PlayerChoice::Vlc => PlayerType::Vlc,
            PlayerChoice::Mpv => PlayerType::Mpv,
        }
    }
}

/// Classify a URL without playing it
#[derive(Args, Debug)]
pub struct DetectCmd {
    #[arg(required = true)]
    pub url: String,
}

// =============================================================================
// Playlist Commands
// =============================================================================

/// List channels from a playlist file or URL
#[derive(Args, Debug)]
pub struct ChannelsCmd {
    /// Playlist file path or HTTP(S) URL
    #[arg(required = true)]
    pub source: String,

    /// Only channels of these groups (case-insensitive, repeatable)
    #[arg(long, short = 'g')]
    pub group: Vec<String>,

    /// Maximum number of channels
    #[arg(long, short = 'l')]
    pub limit: Option<usize>,
}

/// List ranked groups of a playlist
#[derive(Args, Debug)]
pub struct GroupsCmd {
    /// Playlist file path or HTTP(S) URL
    #[arg(required = true)]
    pub source: String,
}

/// Load channels from an Xtream panel
#[derive(Args, Debug)]
pub struct XtreamCmd {
    /// Panel base URL (default from config)
    #[arg(long, short = 's')]
    pub server: Option<String>,

    #[arg(long, short = 'u')]
    pub username: Option<String>,

    #[arg(long, short = 'P')]
    pub password: Option<String>,

    /// Print ranked groups instead of channels
    #[arg(long)]
    pub groups: bool,

    /// Only channels of these groups (repeatable)
    #[arg(long, short = 'g')]
    pub group: Vec<String>,
}

/// Export a channel selection
#[derive(Args, Debug)]
pub struct ExportCmd {
    /// Playlist file path or HTTP(S) URL
    #[arg(required = true)]
    pub source: String,

    /// Groups to export (case-insensitive, repeatable; default all)
    #[arg(long, short = 'g')]
    pub group: Vec<String>,

    /// Output filename, written into the export directory
    #[arg(long, short = 'o', default_value = DEFAULT_EXPORT_NAME)]
    pub output: String,

    /// Export directory (default from config, else Downloads)
    #[arg(long, short = 'd')]
    pub dir: Option<PathBuf>,
}

/// Keep channels whose group matches one of `groups` (all when empty)
pub fn filter_groups(channels: Vec<Channel>, groups: &[String]) -> Vec<Channel> {
    if groups.is_empty() {
        return channels;
    }
    let wanted: Vec<String> = groups.iter().map(|g| g.to_uppercase()).collect();
    channels
        .into_iter()
        .filter(|ch| wanted.contains(&ch.group.to_uppercase()))
        .collect()
}

// =============================================================================
// JSON Output Types
// =============================================================================

/// Generic JSON output wrapper with status
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonOutput<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "is_zero")]
    pub exit_code: i32,
}

fn is_zero(n: &i32) -> bool {
    *n == 0
}

impl<T: Serialize> JsonOutput<T> {
    /// Create success output with data
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            exit_code: 0,
        }
    }

    /// Create error output (no data)
    pub fn error_msg(msg: impl Into<String>, code: ExitCode) -> JsonOutput<()> {
        JsonOutput::<()> {
            data: None,
            error: Some(msg.into()),
            exit_code: code.into(),
        }
    }
}

/// Format detection response
#[derive(Debug, Serialize, Deserialize)]
pub struct DetectResponse {
    pub url: String,
    pub hint: FormatHint,
    /// First cascade stage the URL enters
    pub first_stage: DecoderKind,
}

/// One ranked group
#[derive(Debug, Serialize, Deserialize)]
pub struct GroupEntry {
    /// Index of the matching priority marker, none when unranked
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<usize>,
    pub name: String,
    pub channels: usize,
}

/// Final outcome of a play command
#[derive(Debug, Serialize, Deserialize)]
pub struct PlayResponse {
    pub url: String,
    pub state: PlaybackState,
    pub player: String,
}

/// Export success response
#[derive(Debug, Serialize, Deserialize)]
pub struct ExportResponse {
    pub status: String,
    pub path: PathBuf,
    pub channels: usize,
}

// =============================================================================
// Output Helpers
// =============================================================================

/// Output handler for consistent formatting
pub struct Output {
    pub json: bool,
    pub quiet: bool,
}

impl Output {
    pub fn new(cli: &Cli) -> Self {
        Self {
            json: cli.should_json(),
            quiet: cli.quiet,
        }
    }

    /// Print success data
    pub fn print<T: Serialize>(&self, data: T) -> anyhow::Result<()> {
        if self.json {
            let output = JsonOutput::success(data);
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            // For non-JSON, caller should handle formatting
            println!("{}", serde_json::to_string_pretty(&data)?);
        }
        Ok(())
    }

    /// Print error and return exit code
    pub fn error(&self, msg: impl Into<String>, code: ExitCode) -> ExitCode {
        let msg = msg.into();
        if self.json {
            let output = JsonOutput::<()>::error_msg(&msg, code);
            if let Ok(json) = serde_json::to_string_pretty(&output) {
                eprintln!("{}", json);
            }
        } else if !self.quiet {
            eprintln!("Error: {}", msg);
        }
        code
    }

    /// Print info message (suppressed in quiet mode)
    pub fn info(&self, msg: impl std::fmt::Display) {
        if !self.quiet && !self.json {
            eprintln!("{}", msg);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
