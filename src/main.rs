// champ-pilot entry point

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use champ_pilot::config::default_config_path;
use champ_pilot::lcu::{wait_for_client, LcuClient};
use champ_pilot::{load_config, logging, run, AutomationContext, AutomationError};

/// Automates lobby, ban/pick, runes and summoner spells in the League client.
#[derive(Parser, Debug)]
#[command(name = "champ-pilot", version)]
struct Args {
  /// Path to config.json
  #[arg(long)]
  config: Option<PathBuf>,

  /// League install directory (overrides the config)
  #[arg(long)]
  league_path: Option<String>,

  /// Keep running and automate every following game
  #[arg(long)]
  watch: bool,

  #[arg(short, long)]
  verbose: bool,
}

const CLIENT_RETRY: Duration = Duration::from_secs(1);
const BETWEEN_GAMES: Duration = Duration::from_secs(10);

async fn run_app(args: Args) -> Result<(), AutomationError> {
  let config_path = args.config.unwrap_or_else(default_config_path);
  let mut config = load_config(&config_path)?;
  if args.league_path.is_some() {
    config.league_path = args.league_path;
  }
  config.validate()?;

  let cancel = CancellationToken::new();
  let on_signal = cancel.clone();
  tokio::spawn(async move {
    if tokio::signal::ctrl_c().await.is_ok() {
      info!("[Champ Pilot] Interrupted, shutting down");
      on_signal.cancel();
    }
  });

  loop {
    info!("[Champ Pilot] Waiting for the League client");
    let conn = tokio::select! {
      conn = wait_for_client(config.league_path.as_deref(), CLIENT_RETRY) => conn,
      _ = cancel.cancelled() => return Ok(()),
    };

    let client = Arc::new(LcuClient::new(conn)?);
    let ctx = AutomationContext::from_config(client.clone(), config.clone())?;
    let outcome = run(&ctx, cancel.child_token()).await;
    client.shutdown();
    let outcome = outcome?;

    if !args.watch || outcome.end.is_none() || cancel.is_cancelled() {
      return Ok(());
    }
    tokio::select! {
      _ = tokio::time::sleep(BETWEEN_GAMES) => {}
      _ = cancel.cancelled() => return Ok(()),
    }
  }
}

#[tokio::main]
async fn main() -> ExitCode {
  let args = Args::parse();
  if let Some(path) = logging::init(args.verbose) {
    info!("[Champ Pilot] Live log at {}", path.display());
  }

  match run_app(args).await {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      error!("[Champ Pilot] Automation aborted ({:?}): {}", e.class(), e);
      ExitCode::FAILURE
    }
  }
}
