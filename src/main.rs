//! logbot - IRC channel logger
//!
//! Connects to one network, joins the configured channels and writes every
//! join, part and message to daily log files.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use logbot::{BotConfig, FileSink, LogBot, RunOutcome};

#[derive(Debug, Parser)]
#[command(version, about = "IRC channel logger")]
struct Opts {
    /// Configuration file (TOML)
    #[arg(short, long)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let opts = Opts::parse();

    let config = match BotConfig::load(&opts.config) {
        Ok(config) => config,
        Err(e) if e.is_unreadable() => {
            eprintln!("cannot read config file {}: {}", opts.config.display(), e);
            let _ = Opts::command().print_help();
            return ExitCode::from(1);
        }
        Err(e) => {
            error!(path = %opts.config.display(), error = %e, "Failed to load config");
            return ExitCode::from(1);
        }
    };

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "fatal");
            ExitCode::from(1)
        }
    }
}

async fn run(config: BotConfig) -> anyhow::Result<()> {
    info!(
        network = %config.irc.network,
        port = config.irc.port,
        nick = %config.irc.nick,
        channels = ?config.irc.channels,
        "Starting logbot"
    );

    let sink = FileSink::new(&config.log.folder, config.log.format)
        .with_max_open(config.log.max_open_files);
    let mut bot = LogBot::new(config, Box::new(sink));

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    match bot.start(shutdown).await? {
        RunOutcome::Shutdown => info!("Stopped"),
        RunOutcome::Lost(reason) => warn!(reason = %reason, "Connection lost, exiting"),
    }
    Ok(())
}
