//! streamcascade - format-cascading stream playback and IPTV playlist tooling
//!
//! Plays a remote stream of unknown container by trying HLS, then MPEG-TS,
//! then the sink's native playback, and normalizes M3U/Xtream playlists into
//! ranked channel groups.
//!
//! # Modules
//!
//! - `models` - Channels, playlist results, playback states, filters
//! - `stream` - Cascade engine, decoder traits, local player sink
//! - `playlist` - M3U/Xtream parsing, group ranking, export
//! - `api` - Xtream client and playlist fetch
//! - `config` - TOML configuration
//! - `cli` / `commands` - Scriptable command line

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod models;
pub mod playlist;
pub mod stream;

// Re-export commonly used types
pub use models::{
    Channel, DecoderKind, FormatHint, GroupMap, ParseResult, PlaybackState, VisualFilter,
};

pub use api::XtreamClient;
pub use config::Config;
pub use playlist::{export_to_file, parse_api_json, parse_api_lists, parse_text, GroupRanker};
pub use stream::{detect, LocalPlayer, PlaybackEngine};
