// Logging setup: stdout plus a live log file

use chrono::Utc;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::APP_DIR_NAME;

pub const LIVE_LOG_NAME: &str = "champ-pilot-live.log";

pub fn logs_dir() -> PathBuf {
  std::env::var("APPDATA")
    .map(|ap| PathBuf::from(ap).join(APP_DIR_NAME).join("logs"))
    .unwrap_or_else(|_| PathBuf::from(".").join("logs"))
}

fn open_live_log(path: &Path) -> io::Result<File> {
  if let Some(dir) = path.parent() {
    std::fs::create_dir_all(dir)?;
  }
  let mut file = File::options().create(true).append(true).open(path)?;
  writeln!(file, "==== champ-pilot started {} ====", Utc::now().to_rfc3339())?;
  Ok(file)
}

/// Install the global subscriber. Returns the live log path when it could be
/// opened; failing to open it only disables the file output.
pub fn init(verbose: bool) -> Option<PathBuf> {
  let default_level = if verbose { "debug" } else { "info" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

  let live_path = logs_dir().join(LIVE_LOG_NAME);
  let file_layer = match open_live_log(&live_path) {
    Ok(file) => Some(
      fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_writer(Mutex::new(file)),
    ),
    Err(e) => {
      eprintln!("[Logging] Failed to open live log {}: {}", live_path.display(), e);
      None
    }
  };
  let opened = file_layer.is_some();

  let result = tracing_subscriber::registry()
    .with(filter)
    .with(fmt::layer().with_target(false))
    .with(file_layer)
    .try_init();
  if let Err(e) = result {
    eprintln!("[Logging] Subscriber already installed: {}", e);
  }

  opened.then_some(live_path)
}
