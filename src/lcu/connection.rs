// League client lockfile discovery

use base64::{engine::general_purpose, Engine};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

const LOCKFILE_NAMES: [&str; 3] = ["lockfile", "LeagueClientUx.lockfile", "LeagueClient.lockfile"];

const DEFAULT_INSTALL_DIRS: [&str; 3] = [
  "C:\\Riot Games\\League of Legends",
  "C:\\Program Files\\Riot Games\\League of Legends",
  "C:\\Program Files (x86)\\Riot Games\\League of Legends",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LcuConnection {
  pub port: String,
  pub token: String,
  pub protocol: String,
  pub lockfile_path: PathBuf,
}

impl LcuConnection {
  /// Parse `name:pid:port:token:protocol`.
  pub fn parse_lockfile(content: &str, lockfile_path: &Path) -> Option<Self> {
    let parts: Vec<&str> = content.trim().split(':').collect();
    if parts.len() < 5 {
      return None;
    }
    Some(Self {
      port: parts[2].to_string(),
      token: parts[3].to_string(),
      protocol: parts[4].to_string(),
      lockfile_path: lockfile_path.to_path_buf(),
    })
  }

  pub fn base_url(&self) -> String {
    format!("{}://127.0.0.1:{}", self.protocol, self.port)
  }

  pub fn ws_url(&self) -> String {
    let scheme = if self.protocol == "http" { "ws" } else { "wss" };
    format!("{}://127.0.0.1:{}/", scheme, self.port)
  }

  pub fn auth_header(&self) -> String {
    format!(
      "Basic {}",
      general_purpose::STANDARD.encode(format!("riot:{}", self.token))
    )
  }
}

fn search_dirs(league_path: Option<&str>) -> Vec<PathBuf> {
  match league_path {
    Some(path) if !path.is_empty() => vec![PathBuf::from(path)],
    _ => DEFAULT_INSTALL_DIRS.iter().map(PathBuf::from).collect(),
  }
}

pub fn read_lockfile_once(league_path: Option<&str>) -> Option<LcuConnection> {
  for dir in search_dirs(league_path) {
    for name in LOCKFILE_NAMES {
      let path = dir.join(name);
      if let Ok(content) = std::fs::read_to_string(&path) {
        if let Some(conn) = LcuConnection::parse_lockfile(&content, &path) {
          debug!("[LCU] Found lockfile: {}", path.display());
          return Some(conn);
        }
      }
    }
  }
  None
}

/// Block until the client writes its lockfile.
pub async fn wait_for_client(league_path: Option<&str>, retry: Duration) -> LcuConnection {
  let mut announced = false;
  loop {
    if let Some(conn) = read_lockfile_once(league_path) {
      info!("[LCU] League client found on port {}", conn.port);
      return conn;
    }
    if !announced {
      info!("[LCU] No valid lockfile found. Is League running? Waiting for the client...");
      announced = true;
    }
    tokio::time::sleep(retry).await;
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_lockfile_fields() {
    let conn = LcuConnection::parse_lockfile(
      "LeagueClient:1234:54321:s3cr3t:https\n",
      Path::new("C:/Riot Games/League of Legends/lockfile"),
    )
    .unwrap();
    assert_eq!(conn.port, "54321");
    assert_eq!(conn.token, "s3cr3t");
    assert_eq!(conn.protocol, "https");
    assert_eq!(conn.base_url(), "https://127.0.0.1:54321");
    assert_eq!(conn.auth_header(), "Basic cmlvdDpzM2NyM3Q=");
  }

  #[test]
  fn urls_follow_lockfile_protocol() {
    let conn = LcuConnection::parse_lockfile("LeagueClient:1:2999:t:http", Path::new("lockfile")).unwrap();
    assert_eq!(conn.base_url(), "http://127.0.0.1:2999");
    assert_eq!(conn.ws_url(), "ws://127.0.0.1:2999/");
  }

  #[test]
  fn rejects_truncated_lockfile() {
    assert!(LcuConnection::parse_lockfile("LeagueClient:1234:54321", Path::new("lockfile")).is_none());
  }

  #[test]
  fn configured_path_replaces_default_dirs() {
    assert_eq!(search_dirs(Some("/games/lol")), vec![PathBuf::from("/games/lol")]);
    assert_eq!(search_dirs(None).len(), DEFAULT_INSTALL_DIRS.len());
  }
}
