//! CLI Command Handlers
//!
//! Implements all CLI commands by calling the appropriate backend services.
//! Each handler takes CLI args, config and Output, returns ExitCode.

use anyhow::{Context, Result};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::api::{self, XtreamClient};
use crate::cli::{
    filter_groups, ChannelsCmd, DetectCmd, DetectResponse, ExitCode, ExportCmd, ExportResponse,
    GroupEntry, GroupsCmd, Output, PlayCmd, PlayResponse, XtreamCmd,
};
use crate::config::Config;
use crate::models::{DecoderKind, FormatHint, ParseResult, PlaybackState};
use crate::playlist::export::try_export;
use crate::playlist::ranker::UNRANKED;
use crate::playlist::{parse_text, DirectorySaver, ExportError, GroupRanker};
use crate::stream::{detect, LocalPlayer, PlaybackEngine, PlayerType};

/// How often the host checks whether the player process is still alive
const PLAYER_POLL_INTERVAL: Duration = Duration::from_millis(500);

// =============================================================================
// Play Command
// =============================================================================

pub async fn play_cmd(cmd: PlayCmd, config: &Config, output: &Output) -> ExitCode {
    let player_type = cmd
        .player
        .map(PlayerType::from)
        .unwrap_or_else(|| config.player_type());

    let (tx, mut rx) = mpsc::unbounded_channel();
    let sink = LocalPlayer::new(player_type).with_events(tx);

    if !sink.is_available().await {
        output.info(format!(
            "Warning: {} not found, native playback will fail",
            player_type.display_name()
        ));
    }

    let show_status = !output.quiet && !output.json;
    let mut engine = PlaybackEngine::new(sink)
        .with_hls_config(config.hls)
        .with_observer(move |msg: &str| {
            if show_status {
                eprintln!("{}", msg);
            }
        });

    if let Err(e) = engine.play(&cmd.url) {
        return output.error(e.to_string(), ExitCode::InvalidArgs);
    }

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut poll = tokio::time::interval(PLAYER_POLL_INTERVAL);

    // Last state before teardown, which always ends in Idle
    let outcome = loop {
        tokio::select! {
            Some((request, event)) = rx.recv() => {
                engine.handle_event(request, event);
                if engine.state() == PlaybackState::Failed {
                    break PlaybackState::Failed;
                }
            }
            _ = &mut ctrl_c => {
                let state = engine.state();
                engine.stop();
                break state;
            }
            _ = poll.tick() => {
                if let Some(status) = engine.sink_mut().try_exit_status() {
                    info!("{} exited with {}", player_type, status);
                    let state = exited_state(engine.state(), status.success());
                    engine.stop();
                    break state;
                }
            }
        }
    };

    if outcome == PlaybackState::Failed {
        return output.error(
            format!("No playback strategy could play {}", cmd.url),
            ExitCode::PlaybackFailed,
        );
    }

    let response = PlayResponse {
        url: cmd.url,
        state: outcome,
        player: player_type.display_name().to_string(),
    };
    if let Err(e) = output.print(&response) {
        return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
    }
    ExitCode::Success
}

/// State to report once the player process has exited on its own.
/// A player that exits with an error never really played the stream.
pub fn exited_state(state: PlaybackState, success: bool) -> PlaybackState {
    if success {
        state
    } else {
        PlaybackState::Failed
    }
}

// =============================================================================
// Detect Command
// =============================================================================

pub async fn detect_cmd(cmd: DetectCmd, output: &Output) -> ExitCode {
    let hint = detect(&cmd.url);
    let response = DetectResponse {
        first_stage: match hint {
            FormatHint::Hls => DecoderKind::Hls,
            FormatHint::Unknown => DecoderKind::Ts,
        },
        url: cmd.url,
        hint,
    };

    if let Err(e) = output.print(&response) {
        return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
    }
    ExitCode::Success
}

// =============================================================================
// Playlist Commands
// =============================================================================

/// Read a playlist from a file path or HTTP(S) URL and parse it
pub async fn load_playlist(source: &str) -> Result<ParseResult> {
    let lower = source.to_lowercase();
    let text = if lower.starts_with("http://") || lower.starts_with("https://") {
        api::fetch_playlist(source).await?
    } else {
        tokio::fs::read_to_string(source)
            .await
            .with_context(|| format!("Failed to read playlist {}", source))?
    };
    Ok(parse_text(&text))
}

/// Ranked groups with their channel counts
pub fn group_entries(ranker: &GroupRanker, result: &ParseResult) -> Vec<GroupEntry> {
    ranker
        .sort_groups(&result.group_map)
        .into_iter()
        .map(|name| {
            let rank = ranker.rank(&name);
            GroupEntry {
                rank: (rank != UNRANKED).then_some(rank),
                channels: result.channels_in(&name).len(),
                name,
            }
        })
        .collect()
}

pub async fn channels_cmd(cmd: ChannelsCmd, output: &Output) -> ExitCode {
    output.info(format!("Loading playlist: {}", cmd.source));

    let result = match load_playlist(&cmd.source).await {
        Ok(result) => result,
        Err(e) => return output.error(format!("{:#}", e), ExitCode::NetworkError),
    };

    let mut channels = filter_groups(result.channels, &cmd.group);
    if let Some(limit) = cmd.limit {
        channels.truncate(limit);
    }
    if channels.is_empty() {
        return output.error("No channels found", ExitCode::NoChannels);
    }

    if let Err(e) = output.print(&channels) {
        return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
    }
    ExitCode::Success
}

pub async fn groups_cmd(cmd: GroupsCmd, config: &Config, output: &Output) -> ExitCode {
    output.info(format!("Loading playlist: {}", cmd.source));

    let result = match load_playlist(&cmd.source).await {
        Ok(result) => result,
        Err(e) => return output.error(format!("{:#}", e), ExitCode::NetworkError),
    };
    if result.is_empty() {
        return output.error("Playlist has no channels", ExitCode::NoChannels);
    }

    let groups = group_entries(&config.ranker(), &result);
    if let Err(e) = output.print(&groups) {
        return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
    }
    ExitCode::Success
}

// =============================================================================
// Xtream Command
// =============================================================================

pub async fn xtream_cmd(cmd: XtreamCmd, config: &Config, output: &Output) -> ExitCode {
    let account = config.xtream.as_ref();
    let server = cmd.server.or_else(|| account.map(|a| a.server.clone()));
    let username = cmd.username.or_else(|| account.map(|a| a.username.clone()));
    let password = cmd.password.or_else(|| account.map(|a| a.password.clone()));

    let (Some(server), Some(username), Some(password)) = (server, username, password) else {
        return output.error(
            "Xtream server, username and password are required (flags or [xtream] in config)",
            ExitCode::InvalidArgs,
        );
    };

    output.info(format!("Loading live channels from {}", server));
    let client = XtreamClient::new(server, username, password);
    let result = match client.live_channels().await {
        Ok(result) => result,
        Err(e) => return output.error(format!("{:#}", e), ExitCode::NetworkError),
    };

    let printed = if cmd.groups {
        output.print(group_entries(&config.ranker(), &result))
    } else {
        let channels = filter_groups(result.channels, &cmd.group);
        if channels.is_empty() {
            return output.error("No channels found", ExitCode::NoChannels);
        }
        output.print(channels)
    };

    if let Err(e) = printed {
        return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
    }
    ExitCode::Success
}

// =============================================================================
// Export Command
// =============================================================================

pub async fn export_cmd(cmd: ExportCmd, config: &Config, output: &Output) -> ExitCode {
    let result = match load_playlist(&cmd.source).await {
        Ok(result) => result,
        Err(e) => return output.error(format!("{:#}", e), ExitCode::NetworkError),
    };

    let selected = filter_groups(result.channels, &cmd.group);
    let mut saver = DirectorySaver::new(cmd.dir.unwrap_or_else(|| config.export_dir()));
    let path = match saver.target(&cmd.output) {
        Ok(path) => path,
        Err(e) => return output.error(e.to_string(), ExitCode::InvalidArgs),
    };
    debug!("exporting {} channels to {}", selected.len(), path.display());

    match try_export(&selected, &cmd.output, &mut saver) {
        Ok(()) => {
            let response = ExportResponse {
                status: "exported".to_string(),
                path,
                channels: selected.len(),
            };
            if let Err(e) = output.print(&response) {
                return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
            }
            ExitCode::Success
        }
        Err(ExportError::Empty) => output.error(
            "No channels selected for export",
            ExitCode::NoChannels,
        ),
        Err(e) => output.error(e.to_string(), ExitCode::ExportFailed),
    }
}
