// LCU WAMP event stream and per-path routing

use futures_util::{SinkExt, StreamExt};
use native_tls::TlsConnector;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::Connector;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::connection::LcuConnection;
use crate::error::TransportError;

const SUBSCRIBE_ALL_JSON_EVENTS: &str = "[5,\"OnJsonApiEvent\"]";

#[derive(Debug, Clone, PartialEq)]
pub struct LcuEvent {
  pub uri: String,
  pub event_type: String,
  pub data: Value,
}

pub fn parse_lcu_ws_event(msg: Message) -> Option<LcuEvent> {
  if !msg.is_text() {
    return None;
  }
  let txt = msg.into_text().ok()?;
  // [8, "OnJsonApiEvent", { uri, eventType, data }]
  let val: Value = serde_json::from_str(&txt).ok()?;
  let arr = val.as_array()?;
  if arr.len() < 3 || arr[0].as_i64() != Some(8) {
    return None;
  }
  let obj = arr[2].as_object()?;
  Some(LcuEvent {
    uri: obj.get("uri").and_then(|v| v.as_str()).unwrap_or("").to_string(),
    event_type: obj
      .get("eventType")
      .and_then(|v| v.as_str())
      .unwrap_or("")
      .to_string(),
    data: obj.get("data").cloned().unwrap_or(Value::Null),
  })
}

type RouteTable = HashMap<String, Vec<(u64, mpsc::UnboundedSender<Value>)>>;

/// Fans incoming events out to the subscribers of each uri.
#[derive(Default)]
pub struct EventRouter {
  routes: Mutex<RouteTable>,
  next_id: AtomicU64,
}

impl EventRouter {
  pub fn new() -> Arc<Self> {
    Arc::new(Self::default())
  }

  pub fn register(
    &self,
    path: &str,
  ) -> (u64, mpsc::UnboundedSender<Value>, mpsc::UnboundedReceiver<Value>) {
    let id = self.next_id.fetch_add(1, Ordering::Relaxed);
    let (tx, rx) = mpsc::unbounded_channel();
    self
      .lock()
      .entry(path.to_string())
      .or_default()
      .push((id, tx.clone()));
    (id, tx, rx)
  }

  pub fn remove(&self, path: &str, id: u64) {
    let mut routes = self.lock();
    if let Some(subscribers) = routes.get_mut(path) {
      subscribers.retain(|(sub_id, _)| *sub_id != id);
      if subscribers.is_empty() {
        routes.remove(path);
      }
    }
  }

  pub fn dispatch(&self, event: &LcuEvent) -> usize {
    let mut routes = self.lock();
    let Some(subscribers) = routes.get_mut(&event.uri) else {
      return 0;
    };
    subscribers.retain(|(_, tx)| tx.send(event.data.clone()).is_ok());
    subscribers.len()
  }

  /// Drop every sender so subscribers observe the end of the stream.
  pub fn close_all(&self) {
    self.lock().clear();
  }

  fn lock(&self) -> std::sync::MutexGuard<'_, RouteTable> {
    self.routes.lock().unwrap_or_else(|e| e.into_inner())
  }
}

/// Connect to the client's WebSocket and start routing events until the
/// socket closes or `cancel` fires.
pub async fn spawn_event_stream(
  conn: &LcuConnection,
  router: Arc<EventRouter>,
  cancel: CancellationToken,
) -> Result<JoinHandle<()>, TransportError> {
  let tls = TlsConnector::builder()
    .danger_accept_invalid_certs(true)
    .build()
    .map_err(|e| TransportError::Unavailable(format!("TLS connector: {}", e)))?;

  let mut request = conn
    .ws_url()
    .into_client_request()
    .map_err(|e| TransportError::Unavailable(format!("Invalid WebSocket URL: {}", e)))?;
  let auth = conn
    .auth_header()
    .parse()
    .map_err(|_| TransportError::Unavailable("Invalid auth header".to_string()))?;
  request.headers_mut().insert("Authorization", auth);
  request
    .headers_mut()
    .insert("Sec-WebSocket-Protocol", http::HeaderValue::from_static("wamp"));

  let (mut socket, _response) = tokio_tungstenite::connect_async_tls_with_config(
    request,
    None,
    false,
    Some(Connector::NativeTls(tls)),
  )
  .await
  .map_err(|e| TransportError::Unavailable(format!("WebSocket connect failed: {}", e)))?;

  socket
    .send(Message::Text(SUBSCRIBE_ALL_JSON_EVENTS.into()))
    .await
    .map_err(|e| TransportError::Unavailable(format!("WebSocket subscribe failed: {}", e)))?;
  info!("[LCU] Event stream connected");

  Ok(tokio::spawn(async move {
    loop {
      tokio::select! {
        _ = cancel.cancelled() => {
          let _ = socket.close(None).await;
          break;
        }
        msg = socket.next() => match msg {
          Some(Ok(msg)) => {
            if let Some(event) = parse_lcu_ws_event(msg) {
              let delivered = router.dispatch(&event);
              if delivered > 0 {
                debug!("[LCU] {} {} -> {} subscriber(s)", event.event_type, event.uri, delivered);
              }
            }
          }
          Some(Err(e)) => {
            warn!("[LCU] Event stream error: {}", e);
            break;
          }
          None => break,
        }
      }
    }
    info!("[LCU] Event stream closed");
    router.close_all();
  }))
}
