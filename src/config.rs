//! Configuration management for streamcascade
//!
//! Handles config file loading/saving. Config is stored at
//! ~/.config/streamcascade/config.toml unless a path is given.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::playlist::GroupRanker;
use crate::stream::{HlsConfig, PlayerType};

/// Xtream account used when the CLI gets no credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XtreamAccount {
    pub server: String,
    pub username: String,
    pub password: String,
}

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Local player for native playback (vlc, mpv)
    pub player: Option<String>,
    /// Group priority markers, earliest wins
    pub priority_groups: Option<Vec<String>>,
    /// Where exported playlists are written
    pub export_dir: Option<PathBuf>,
    /// HLS decoder settings
    pub hls: HlsConfig,
    pub xtream: Option<XtreamAccount>,
}

impl Config {
    /// Get config file path (~/.config/streamcascade/config.toml)
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("streamcascade").join("config.toml"))
    }

    /// Load config from the default path, or return default if missing or broken
    pub fn load() -> Self {
        match Self::path() {
            Some(path) if path.exists() => Self::load_from(&path).unwrap_or_else(|e| {
                warn!("Ignoring config: {:#}", e);
                Self::default()
            }),
            _ => Self::default(),
        }
    }

    /// Load config from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("Invalid config {}", path.display()))
    }

    /// Write config as TOML, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create parent directory if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let toml = toml::to_string_pretty(self)?;
        std::fs::write(path, toml)?;
        Ok(())
    }

    /// Configured player, VLC when unset or unknown
    pub fn player_type(&self) -> PlayerType {
        match self.player.as_deref() {
            Some(name) => PlayerType::from_name(name).unwrap_or_else(|| {
                warn!("Unknown player '{}', using VLC", name);
                PlayerType::default()
            }),
            None => PlayerType::default(),
        }
    }

    /// Group ranker from the configured priority table
    pub fn ranker(&self) -> GroupRanker {
        match &self.priority_groups {
            Some(priority) => GroupRanker::new(priority),
            None => GroupRanker::default(),
        }
    }

    /// Export directory with fallback chain:
    /// 1. Configured directory
    /// 2. User download directory
    /// 3. Current directory
    pub fn export_dir(&self) -> PathBuf {
        self.export_dir
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.player.is_none());
        assert!(config.xtream.is_none());
        assert_eq!(config.hls, HlsConfig::default());
        assert_eq!(config.player_type(), PlayerType::Vlc);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            player = "mpv"
            priority_groups = ["news", "sports"]

            [hls]
            max_manifest_retries = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.player_type(), PlayerType::Mpv);
        assert_eq!(config.hls.max_manifest_retries, 5);
        assert_eq!(config.hls.max_level_retries, 3);
        assert_eq!(config.ranker().priority(), ["NEWS", "SPORTS"]);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = Config {
            player: Some("mpv".into()),
            export_dir: Some(PathBuf::from("/tmp/exports")),
            xtream: Some(XtreamAccount {
                server: "http://panel:8080".into(),
                username: "u".into(),
                password: "p".into(),
            }),
            ..Config::default()
        };

        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_unknown_player_falls_back() {
        let config = Config {
            player: Some("winamp".into()),
            ..Config::default()
        };
        assert_eq!(config.player_type(), PlayerType::Vlc);
    }
}
