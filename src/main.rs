//! streamcascade - play anything, sort everything
//!
//! # Usage
//!
//! ```bash
//! # Play a stream (HLS -> TS -> native)
//! streamcascade play "http://panel:8080/live/u/p/7.m3u8"
//!
//! # Playlist tooling (for automation)
//! streamcascade groups ./list.m3u --json
//! streamcascade xtream -s http://panel:8080 -u user -P pass --groups
//! streamcascade export ./list.m3u -g SPOR -o spor.m3u
//! ```

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use streamcascade::cli::{Cli, Command, ExitCode, Output};
use streamcascade::commands;
use streamcascade::config::Config;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let exit_code = run_cli(cli).await;
    std::process::exit(exit_code.into());
}

/// Logs go to stderr so stdout stays JSON-parseable
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("streamcascade={}", level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

/// Run CLI command and return exit code
async fn run_cli(cli: Cli) -> ExitCode {
    let output = Output::new(&cli);

    let config = match &cli.config {
        Some(path) => match Config::load_from(path) {
            Ok(config) => config,
            Err(e) => return output.error(format!("{:#}", e), ExitCode::InvalidArgs),
        },
        None => Config::load(),
    };

    match cli.command {
        Command::Play(cmd) => commands::play_cmd(cmd, &config, &output).await,

        Command::Detect(cmd) => commands::detect_cmd(cmd, &output).await,

        Command::Channels(cmd) => commands::channels_cmd(cmd, &output).await,

        Command::Groups(cmd) => commands::groups_cmd(cmd, &config, &output).await,

        Command::Xtream(cmd) => commands::xtream_cmd(cmd, &config, &output).await,

        Command::Export(cmd) => commands::export_cmd(cmd, &config, &output).await,
    }
}
