//! M3U export of a channel selection

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::models::Channel;

/// Suggested filename when the caller has none
pub const DEFAULT_EXPORT_NAME: &str = "playlist_export.m3u";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No channels selected for export")]
    Empty,
    #[error("Invalid export filename: {0}")]
    InvalidFilename(String),
    #[error("Failed to save {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Receives the serialized playlist, once per export
pub trait FileSaver {
    fn save(&mut self, payload: &str, filename: &str) -> Result<(), ExportError>;
}

/// Saves exports into a directory
#[derive(Debug, Clone)]
pub struct DirectorySaver {
    dir: PathBuf,
}

impl DirectorySaver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Where a filename ends up; only the final path component is kept
    pub fn target(&self, filename: &str) -> Result<PathBuf, ExportError> {
        let name = Path::new(filename)
            .file_name()
            .ok_or_else(|| ExportError::InvalidFilename(filename.to_string()))?;
        Ok(self.dir.join(name))
    }
}

impl FileSaver for DirectorySaver {
    fn save(&mut self, payload: &str, filename: &str) -> Result<(), ExportError> {
        let path = self.target(filename)?;
        let io_err = |source| ExportError::Io {
            path: path.clone(),
            source,
        };

        fs::create_dir_all(&self.dir).map_err(io_err)?;
        fs::write(&path, payload).map_err(io_err)?;
        info!("exported playlist to {}", path.display());
        Ok(())
    }
}

/// Serialize channels as an M3U playlist
pub fn to_m3u(channels: &[Channel]) -> String {
    let mut out = String::from("#EXTM3U\n");
    for ch in channels {
        out.push_str(&format!(
            "#EXTINF:-1 group-title=\"{}\",{}\n{}\n",
            ch.group, ch.name, ch.url
        ));
    }
    out
}

/// Serialize and hand the playlist to `saver`.
///
/// Returns `false` without touching the saver when nothing is selected, and
/// `false` when the saver fails.
pub fn export_to_file(channels: &[Channel], filename: &str, saver: &mut dyn FileSaver) -> bool {
    match try_export(channels, filename, saver) {
        Ok(()) => true,
        Err(e) => {
            warn!("{}", e);
            false
        }
    }
}

/// [`export_to_file`] with the failure reason
pub fn try_export(
    channels: &[Channel],
    filename: &str,
    saver: &mut dyn FileSaver,
) -> Result<(), ExportError> {
    if channels.is_empty() {
        return Err(ExportError::Empty);
    }
    saver.save(&to_m3u(channels), filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_m3u_format() {
        let channels = vec![Channel::new("A", "NEWS", "http://x/a.ts")];
        assert_eq!(
            to_m3u(&channels),
            "#EXTM3U\n#EXTINF:-1 group-title=\"NEWS\",A\nhttp://x/a.ts\n"
        );
    }

    #[test]
    fn test_target_keeps_only_file_name() {
        let saver = DirectorySaver::new("/tmp/out");
        assert_eq!(
            saver.target("../../etc/list.m3u").unwrap(),
            PathBuf::from("/tmp/out/list.m3u")
        );
        assert!(saver.target("..").is_err());
    }
}
