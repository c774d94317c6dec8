// Request/subscribe capability used by every other component

use async_trait::async_trait;
use http::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::error::TransportError;

#[async_trait]
pub trait Transport: Send + Sync {
  /// Perform an authenticated request. An empty or 204 response is `{}`.
  async fn request(
    &self,
    method: Method,
    path: &str,
    body: Option<Value>,
  ) -> Result<Value, TransportError>;

  /// Subscribe to change notifications for `path`. The current value is
  /// delivered first when the client already has one.
  async fn subscribe(&self, path: &str) -> Result<Subscription, TransportError>;
}

/// Typed GET used at the endpoint boundary; shape mismatches become
/// `MalformedResponse`.
pub async fn get_json<T: DeserializeOwned>(
  transport: &dyn Transport,
  path: &str,
) -> Result<T, TransportError> {
  let value = transport.request(Method::GET, path, None).await?;
  serde_json::from_value(value).map_err(|e| TransportError::malformed(path, e))
}

type UnsubscribeHook = Box<dyn FnOnce() + Send + Sync>;

/// Change notifications for one endpoint path.
pub struct Subscription {
  path: String,
  events: mpsc::UnboundedReceiver<Value>,
  on_unsubscribe: Option<UnsubscribeHook>,
}

impl Subscription {
  pub fn new(
    path: impl Into<String>,
    events: mpsc::UnboundedReceiver<Value>,
    on_unsubscribe: impl FnOnce() + Send + Sync + 'static,
  ) -> Self {
    Self {
      path: path.into(),
      events,
      on_unsubscribe: Some(Box::new(on_unsubscribe)),
    }
  }

  pub fn path(&self) -> &str {
    &self.path
  }

  /// Next notification, or `None` once the stream is gone.
  pub async fn next(&mut self) -> Option<Value> {
    self.events.recv().await
  }

  pub fn unsubscribe(mut self) {
    if let Some(hook) = self.on_unsubscribe.take() {
      hook();
    }
  }
}

impl Drop for Subscription {
  fn drop(&mut self) {
    if let Some(hook) = self.on_unsubscribe.take() {
      hook();
    }
  }
}

impl std::fmt::Debug for Subscription {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Subscription").field("path", &self.path).finish()
  }
}
