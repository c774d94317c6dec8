// Test doubles shared by the unit test modules

use async_trait::async_trait;
use http::Method;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

use crate::error::TransportError;
use crate::lcu::{Subscription, Transport};

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
  pub method: Method,
  pub path: String,
  pub body: Option<Value>,
}

type Scripted = VecDeque<Result<Value, TransportError>>;

/// In-memory transport: scripted responses per (method, path), recorded
/// requests, and manually pushed subscription events.
#[derive(Default)]
pub struct MockTransport {
  routes: Mutex<HashMap<(Method, String), Scripted>>,
  requests: Mutex<Vec<RecordedRequest>>,
  subscribers: Mutex<HashMap<String, Vec<mpsc::UnboundedSender<Value>>>>,
}

impl MockTransport {
  pub fn new() -> Arc<Self> {
    Arc::new(Self::default())
  }

  /// Always answer `method path` with `response`.
  pub fn respond(&self, method: Method, path: &str, response: Result<Value, TransportError>) {
    self.respond_sequence(method, path, vec![response]);
  }

  /// Answer with each response in turn; the last one repeats forever.
  pub fn respond_sequence(
    &self,
    method: Method,
    path: &str,
    responses: Vec<Result<Value, TransportError>>,
  ) {
    self
      .routes
      .lock()
      .unwrap()
      .insert((method, path.to_string()), responses.into());
  }

  pub fn push(&self, path: &str, value: Value) {
    if let Some(subs) = self.subscribers.lock().unwrap().get_mut(path) {
      subs.retain(|tx| tx.send(value.clone()).is_ok());
    }
  }

  pub fn subscriber_count(&self, path: &str) -> usize {
    self.subscribers.lock().unwrap().get(path).map_or(0, Vec::len)
  }

  pub fn requests(&self) -> Vec<RecordedRequest> {
    self.requests.lock().unwrap().clone()
  }

  /// Every request that is not a GET.
  pub fn mutations(&self) -> Vec<RecordedRequest> {
    self
      .requests()
      .into_iter()
      .filter(|r| r.method != Method::GET)
      .collect()
  }

  pub fn requests_to(&self, method: Method, path: &str) -> Vec<RecordedRequest> {
    self
      .requests()
      .into_iter()
      .filter(|r| r.method == method && r.path == path)
      .collect()
  }

  fn next_response(&self, method: &Method, path: &str) -> Result<Value, TransportError> {
    let mut routes = self.routes.lock().unwrap();
    match routes.get_mut(&(method.clone(), path.to_string())) {
      Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
      Some(queue) if !queue.is_empty() => queue[0].clone(),
      _ => Err(not_found()),
    }
  }
}

#[async_trait]
impl Transport for MockTransport {
  async fn request(
    &self,
    method: Method,
    path: &str,
    body: Option<Value>,
  ) -> Result<Value, TransportError> {
    self.requests.lock().unwrap().push(RecordedRequest {
      method: method.clone(),
      path: path.to_string(),
      body,
    });
    self.next_response(&method, path)
  }

  async fn subscribe(&self, path: &str) -> Result<Subscription, TransportError> {
    let (tx, rx) = mpsc::unbounded_channel();
    if let Ok(initial) = self.next_response(&Method::GET, path) {
      let _ = tx.send(initial);
    }
    self
      .subscribers
      .lock()
      .unwrap()
      .entry(path.to_string())
      .or_default()
      .push(tx);
    Ok(Subscription::new(path, rx, || {}))
  }
}

pub fn not_found() -> TransportError {
  TransportError::Http {
    status: 404,
    body: r#"{"errorCode":"RPC_ERROR","httpStatus":404,"message":"No active delegate"}"#.to_string(),
  }
}

pub fn conflict(message: &str) -> TransportError {
  TransportError::Http {
    status: 500,
    body: json!({"errorCode": "RPC_ERROR", "httpStatus": 500, "message": message}).to_string(),
  }
}

// ---------------------------------------------------------------------------
// Session payload builders
// ---------------------------------------------------------------------------

pub fn action_json(
  id: i64,
  action_type: &str,
  actor_cell_id: i64,
  completed: bool,
  in_progress: bool,
  champion_id: i64,
) -> Value {
  json!({
    "id": id,
    "type": action_type,
    "actorCellId": actor_cell_id,
    "completed": completed,
    "isInProgress": in_progress,
    "championId": champion_id,
    "isAllyAction": true,
  })
}

pub fn participant_json(cell_id: i64, position: &str, champion_id: i64) -> Value {
  json!({
    "cellId": cell_id,
    "championId": champion_id,
    "championPickIntent": 0,
    "assignedPosition": position,
    "spell1Id": 4,
    "spell2Id": 14,
  })
}

pub fn session_json(phase: &str, local_cell_id: i64, turns: Vec<Vec<Value>>, my_team: Vec<Value>) -> Value {
  json!({
    "actions": turns,
    "localPlayerCellId": local_cell_id,
    "timer": {"phase": phase},
    "myTeam": my_team,
    "theirTeam": [],
    "bans": {"myTeamBans": [], "theirTeamBans": []},
  })
}

/// Local player (cell 2, middle) with one pick action `id` in progress.
pub fn local_pick_session(phase: &str, action_id: i64) -> Value {
  session_json(
    phase,
    2,
    vec![
      vec![action_json(1, "ban", 2, true, false, 157)],
      vec![
        action_json(action_id, "pick", 2, false, true, 0),
        action_json(action_id + 1, "pick", 3, false, true, 0),
      ],
    ],
    vec![participant_json(2, "middle", 0), participant_json(3, "top", 0)],
  )
}

/// Local player (cell 2, middle) with one ban action `id` in progress.
pub fn local_ban_session(action_id: i64) -> Value {
  session_json(
    "BAN_PICK",
    2,
    vec![
      vec![
        action_json(action_id, "ban", 2, false, true, 0),
        action_json(action_id + 1, "ban", 3, true, true, 238),
      ],
      vec![action_json(action_id + 10, "pick", 2, false, false, 0)],
    ],
    vec![participant_json(2, "middle", 0), participant_json(3, "top", 0)],
  )
}

pub fn champion_summary_json() -> Value {
  json!([
    {"id": -1, "name": "None", "alias": "None"},
    {"id": 103, "name": "Ahri", "alias": "Ahri"},
    {"id": 99, "name": "Lux", "alias": "Lux"},
    {"id": 238, "name": "Zed", "alias": "Zed"},
    {"id": 145, "name": "Kai'Sa", "alias": "Kaisa"},
    {"id": 62, "name": "Wukong", "alias": "MonkeyKing"},
  ])
}

pub fn summoner_spells_json() -> Value {
  json!([
    {"id": 4, "name": "Flash", "gameModes": ["CLASSIC", "ARAM"]},
    {"id": 14, "name": "Ignite", "gameModes": ["CLASSIC", ""]},
    {"id": 12, "name": "Teleport", "gameModes": ["CLASSIC"]},
    {"id": 54, "name": "", "gameModes": []},
  ])
}

pub fn perks_json() -> Value {
  json!([
    {"id": 8112, "name": "Electrocute"},
    {"id": 8126, "name": "Cheap Shot"},
    {"id": 8138, "name": "Eyeball Collection"},
    {"id": 8106, "name": "Ultimate Hunter"},
    {"id": 8226, "name": "Manaflow Band"},
    {"id": 8237, "name": "Scorch"},
    {"id": 5008, "name": "Adaptive"},
    {"id": 5003, "name": "MagicRes"},
  ])
}

/// Serve the static game data lists plus availability sets.
pub fn serve_catalog(transport: &MockTransport, pickable: Value, bannable: Value) {
  transport.respond(
    Method::GET,
    "/lol-game-data/assets/v1/champion-summary.json",
    Ok(champion_summary_json()),
  );
  transport.respond(
    Method::GET,
    "/lol-game-data/assets/v1/summoner-spells.json",
    Ok(summoner_spells_json()),
  );
  transport.respond(Method::GET, "/lol-perks/v1/perks", Ok(perks_json()));
  transport.respond(Method::GET, "/lol-champ-select/v1/pickable-champion-ids", Ok(pickable));
  transport.respond(Method::GET, "/lol-champ-select/v1/bannable-champion-ids", Ok(bannable));
}
