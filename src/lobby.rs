// Party lobby operations run before champ select exists

use http::Method;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::champ_select::fetch_snapshot;
use crate::config::{GameMode, Role};
use crate::error::TransportError;
use crate::lcu::{get_json, Transport};

pub const LOBBY_PATH: &str = "/lol-lobby/v2/lobby";
pub const POSITION_PREFERENCES_PATH: &str = "/lol-lobby/v2/lobby/members/localMember/position-preferences";
pub const SEARCH_PATH: &str = "/lol-lobby/v2/lobby/matchmaking/search";
pub const MATCHMAKING_SEARCH_PATH: &str = "/lol-matchmaking/v1/search";
pub const READY_CHECK_PATH: &str = "/lol-matchmaking/v1/ready-check";
pub const READY_CHECK_ACCEPT_PATH: &str = "/lol-matchmaking/v1/ready-check/accept";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReadyCheck {
  pub state: String,
  pub player_response: String,
}

impl ReadyCheck {
  pub fn awaiting_local_response(&self) -> bool {
    self.state == "InProgress" && self.player_response == "None"
  }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchState {
  pub is_currently_in_queue: bool,
  pub search_state: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptOutcome {
  ChampSelect,
  LeftQueue,
  Cancelled,
}

pub struct PartyLobby {
  transport: Arc<dyn Transport>,
  poll_interval: Duration,
}

impl PartyLobby {
  pub fn new(transport: Arc<dyn Transport>, poll_interval: Duration) -> Self {
    Self {
      transport,
      poll_interval,
    }
  }

  pub async fn is_in_lobby(&self) -> bool {
    self
      .transport
      .request(Method::GET, LOBBY_PATH, None)
      .await
      .is_ok()
  }

  pub async fn create_lobby(&self, mode: GameMode) -> Result<(), TransportError> {
    info!("[Lobby] Creating {:?} lobby (queue {})", mode, mode.queue_id());
    self
      .transport
      .request(
        Method::POST,
        LOBBY_PATH,
        Some(json!({ "queueId": mode.queue_id() })),
      )
      .await?;
    Ok(())
  }

  pub async fn pick_positions(&self, first: Role, second: Role) -> Result<(), TransportError> {
    info!(
      "[Lobby] Position preferences {} / {}",
      first.lobby_position(),
      second.lobby_position()
    );
    self
      .transport
      .request(
        Method::PUT,
        POSITION_PREFERENCES_PATH,
        Some(json!({
          "firstPreference": first.lobby_position(),
          "secondPreference": second.lobby_position(),
        })),
      )
      .await?;
    Ok(())
  }

  pub async fn search_game(&self) -> Result<(), TransportError> {
    info!("[Lobby] Starting matchmaking search");
    self.transport.request(Method::POST, SEARCH_PATH, None).await?;
    Ok(())
  }

  /// Accept every ready check until champ select starts or the player
  /// is no longer queued.
  pub async fn auto_accept(&self, cancel: &CancellationToken) -> AcceptOutcome {
    loop {
      if let Ok(snapshot) = fetch_snapshot(&*self.transport).await {
        if snapshot.local_participant().is_some() {
          info!("[Lobby] Champ select started");
          return AcceptOutcome::ChampSelect;
        }
      }

      match get_json::<ReadyCheck>(&*self.transport, READY_CHECK_PATH).await {
        Ok(check) if check.awaiting_local_response() => {
          match self
            .transport
            .request(Method::POST, READY_CHECK_ACCEPT_PATH, None)
            .await
          {
            Ok(_) => info!("[Lobby] Ready check accepted"),
            Err(e) => warn!("[Lobby] Failed to accept ready check: {}", e),
          }
        }
        Ok(check) => debug!("[Lobby] Ready check state {}", check.state),
        Err(_) => match get_json::<SearchState>(&*self.transport, MATCHMAKING_SEARCH_PATH).await {
          Ok(search) if search.is_currently_in_queue => {
            debug!("[Lobby] Searching ({})", search.search_state)
          }
          Ok(_) | Err(_) => {
            info!("[Lobby] No longer in queue");
            return AcceptOutcome::LeftQueue;
          }
        },
      }

      tokio::select! {
        _ = cancel.cancelled() => return AcceptOutcome::Cancelled,
        _ = tokio::time::sleep(self.poll_interval) => {}
      }
    }
  }
}
