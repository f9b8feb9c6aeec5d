//! Playlist ingestion
//!
//! - Parser: M3U text and Xtream API lists to normalized channels
//! - Ranker: priority-based group ordering
//! - Export: channel selection back to M3U

pub mod export;
pub mod parser;
pub mod ranker;

pub use export::{export_to_file, to_m3u, DirectorySaver, ExportError, FileSaver};
pub use parser::{parse_api_json, parse_api_lists, parse_text};
pub use ranker::GroupRanker;
