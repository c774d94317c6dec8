// Authenticated REST client + event subscriptions for the League client

use async_trait::async_trait;
use http::Method;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::connection::LcuConnection;
use super::events::{spawn_event_stream, EventRouter};
use super::transport::{Subscription, Transport};
use crate::error::TransportError;

pub struct LcuClient {
  conn: LcuConnection,
  http: reqwest::Client,
  router: Arc<EventRouter>,
  stream: AsyncMutex<Option<JoinHandle<()>>>,
  cancel: CancellationToken,
}

impl LcuClient {
  pub fn new(conn: LcuConnection) -> Result<Self, TransportError> {
    let http = reqwest::Client::builder()
      .danger_accept_invalid_certs(true)
      .timeout(Duration::from_secs(5))
      .connect_timeout(Duration::from_secs(2))
      .pool_max_idle_per_host(2)
      .build()
      .map_err(|e| TransportError::Unavailable(format!("Failed to create HTTP client: {}", e)))?;
    Ok(Self {
      conn,
      http,
      router: EventRouter::new(),
      stream: AsyncMutex::new(None),
      cancel: CancellationToken::new(),
    })
  }

  /// Stop the shared event stream; outstanding subscriptions see end-of-stream.
  pub fn shutdown(&self) {
    self.cancel.cancel();
  }

  async fn ensure_event_stream(&self) -> Result<(), TransportError> {
    let mut stream = self.stream.lock().await;
    let alive = stream.as_ref().map_or(false, |h| !h.is_finished());
    if !alive {
      let handle = spawn_event_stream(&self.conn, self.router.clone(), self.cancel.child_token()).await?;
      *stream = Some(handle);
    }
    Ok(())
  }
}

/// Normalize a raw LCU response body into JSON.
pub(crate) fn normalize_body(path: &str, status: u16, text: &str) -> Result<Value, TransportError> {
  if status == 204 || text.trim().is_empty() {
    return Ok(Value::Object(Default::default()));
  }
  let value: Value = serde_json::from_str(text).map_err(|e| TransportError::malformed(path, e))?;
  // Some endpoints answer 2xx with an error envelope.
  if let Some(error_status) = value
    .get("errorCode")
    .and(value.get("httpStatus"))
    .and_then(|s| s.as_u64())
  {
    return Err(TransportError::Http {
      status: error_status as u16,
      body: text.to_string(),
    });
  }
  Ok(value)
}

#[async_trait]
impl Transport for LcuClient {
  async fn request(
    &self,
    method: Method,
    path: &str,
    body: Option<Value>,
  ) -> Result<Value, TransportError> {
    let url = format!("{}{}", self.conn.base_url(), path);
    let mut builder = self
      .http
      .request(method.clone(), &url)
      .header("Authorization", self.conn.auth_header())
      .header("Accept", "application/json");
    if let Some(body) = body {
      builder = builder.json(&body);
    }

    let response = builder.send().await.map_err(|e| {
      if e.is_timeout() {
        TransportError::Timeout(format!("{} {}", method, path))
      } else {
        TransportError::Unavailable(format!("{} {}: {}", method, path, e))
      }
    })?;

    let status = response.status();
    let text = response
      .text()
      .await
      .map_err(|e| TransportError::Unavailable(format!("Failed to read body of {}: {}", path, e)))?;

    if !status.is_success() {
      debug!("[LCU] {} {} -> {}", method, path, status);
      return Err(TransportError::Http {
        status: status.as_u16(),
        body: text,
      });
    }
    normalize_body(path, status.as_u16(), &text)
  }

  async fn subscribe(&self, path: &str) -> Result<Subscription, TransportError> {
    self.ensure_event_stream().await?;

    let (id, tx, rx) = self.router.register(path);
    match self.request(Method::GET, path, None).await {
      Ok(initial) => {
        let _ = tx.send(initial);
      }
      Err(e) => warn!("[LCU] No initial value for {}: {}", path, e),
    }
    drop(tx);

    let router = self.router.clone();
    let route = path.to_string();
    Ok(Subscription::new(path, rx, move || router.remove(&route, id)))
  }
}

impl Drop for LcuClient {
  fn drop(&mut self) {
    self.cancel.cancel();
  }
}
