// Champ select observation loop and snapshot handler dispatch

use async_trait::async_trait;
use http::Method;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::types::{Phase, SessionSnapshot, SESSION_PATH};
use crate::error::{AutomationError, TransportError};
use crate::lcu::Transport;

/// Reacts to session snapshots. Implementations must tolerate a new
/// snapshot arriving while a previous call is still running.
#[async_trait]
pub trait SnapshotHandler: Send + Sync {
  fn name(&self) -> &str;
  async fn on_snapshot(&self, snapshot: Arc<SessionSnapshot>) -> Result<(), AutomationError>;
}

#[derive(Debug)]
pub struct HandlerFailure {
  pub handler: String,
  pub error: AutomationError,
}

#[derive(Debug, Clone)]
pub enum ObservationState {
  Waiting,
  Active(Arc<SessionSnapshot>),
  NotInLobby,
  Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
  GameStarting,
  LeftLobby,
  Stopped,
}

type HandlerEntry = (u64, Arc<dyn SnapshotHandler>);

#[derive(Default)]
struct HandlerRegistry {
  handlers: Mutex<Vec<HandlerEntry>>,
  next_id: AtomicU64,
}

impl HandlerRegistry {
  fn lock(&self) -> std::sync::MutexGuard<'_, Vec<HandlerEntry>> {
    self.handlers.lock().unwrap_or_else(|e| e.into_inner())
  }

  fn add(&self, handler: Arc<dyn SnapshotHandler>) -> u64 {
    let id = self.next_id.fetch_add(1, Ordering::Relaxed);
    self.lock().push((id, handler));
    id
  }

  fn remove(&self, id: u64) -> bool {
    let mut handlers = self.lock();
    let before = handlers.len();
    handlers.retain(|(h, _)| *h != id);
    handlers.len() != before
  }

  fn contains(&self, id: u64) -> bool {
    self.lock().iter().any(|(h, _)| *h == id)
  }

  fn entries(&self) -> Vec<HandlerEntry> {
    self.lock().clone()
  }
}

/// Returned by [`ChampSelectSession::on_snapshot`]; the only way to stop a
/// handler from reacting to future snapshots.
pub struct HandlerRegistration {
  id: u64,
  name: String,
  registry: Weak<HandlerRegistry>,
}

impl HandlerRegistration {
  pub fn name(&self) -> &str {
    &self.name
  }

  /// Returns false when the handler was already gone (e.g. removed after failing).
  pub fn unregister(self) -> bool {
    self.registry.upgrade().map_or(false, |r| r.remove(self.id))
  }
}

pub struct ChampSelectSession {
  transport: Arc<dyn Transport>,
  poll_interval: Duration,
  registry: Arc<HandlerRegistry>,
  state: Arc<watch::Sender<ObservationState>>,
  failures: mpsc::UnboundedSender<HandlerFailure>,
  cancel: CancellationToken,
  observer: Mutex<Option<JoinHandle<()>>>,
  /// Set once a session with the local player has been seen; a 404 after
  /// that means the player left.
  seen_session: Arc<AtomicBool>,
}

pub async fn fetch_snapshot(transport: &dyn Transport) -> Result<SessionSnapshot, TransportError> {
  let value = transport.request(Method::GET, SESSION_PATH, None).await?;
  SessionSnapshot::parse(value)
}

impl ChampSelectSession {
  pub fn new(
    transport: Arc<dyn Transport>,
    poll_interval: Duration,
  ) -> (Self, mpsc::UnboundedReceiver<HandlerFailure>) {
    let (failures, failure_rx) = mpsc::unbounded_channel();
    let (state, _) = watch::channel(ObservationState::Waiting);
    let session = Self {
      transport,
      poll_interval,
      registry: Arc::new(HandlerRegistry::default()),
      state: Arc::new(state),
      failures,
      cancel: CancellationToken::new(),
      observer: Mutex::new(None),
      seen_session: Arc::new(AtomicBool::new(false)),
    };
    (session, failure_rx)
  }

  /// Whether the local player is currently part of a champ select session.
  pub async fn is_in_champ_select(&self) -> bool {
    match fetch_snapshot(&*self.transport).await {
      Ok(snapshot) => snapshot.local_participant().is_some(),
      Err(_) => false,
    }
  }

  /// Poll until a session containing the local player exists. `None` if the
  /// session was stopped first.
  pub async fn wait_for_session(&self) -> Option<SessionSnapshot> {
    loop {
      match fetch_snapshot(&*self.transport).await {
        Ok(snapshot) if snapshot.local_participant().is_some() => {
          self.seen_session.store(true, Ordering::SeqCst);
          return Some(snapshot);
        }
        Ok(snapshot) => debug!(
          "[Champ Select] Session has no local player (cell {}), still waiting",
          snapshot.local_cell_id
        ),
        Err(e) => debug!("[Champ Select] Waiting for session: {}", e),
      }
      tokio::select! {
        _ = self.cancel.cancelled() => return None,
        _ = tokio::time::sleep(self.poll_interval) => {}
      }
    }
  }

  pub fn on_snapshot(&self, handler: Arc<dyn SnapshotHandler>) -> HandlerRegistration {
    let name = handler.name().to_string();
    let id = self.registry.add(handler);
    debug!("[Champ Select] Registered handler {} (#{})", name, id);
    HandlerRegistration {
      id,
      name,
      registry: Arc::downgrade(&self.registry),
    }
  }

  pub fn latest(&self) -> Option<Arc<SessionSnapshot>> {
    match &*self.state.borrow() {
      ObservationState::Active(snapshot) => Some(snapshot.clone()),
      _ => None,
    }
  }

  pub fn state(&self) -> watch::Receiver<ObservationState> {
    self.state.subscribe()
  }

  /// Start the polling loop. Calling it again while running is a no-op.
  pub fn start_observing(&self) {
    let mut observer = self.observer.lock().unwrap_or_else(|e| e.into_inner());
    if observer.as_ref().map_or(false, |h| !h.is_finished()) {
      return;
    }
    info!(
      "[Champ Select] Observing session every {}ms",
      self.poll_interval.as_millis()
    );
    *observer = Some(tokio::spawn(observe_loop(
      self.transport.clone(),
      self.poll_interval,
      self.registry.clone(),
      self.state.clone(),
      self.failures.clone(),
      self.seen_session.clone(),
      self.cancel.clone(),
    )));
  }

  /// Resolve once the game starts or the player leaves, then stop observing.
  pub async fn wait_for_end(&self) -> SessionEnd {
    let mut rx = self.state.subscribe();
    let end = loop {
      let current = rx.borrow_and_update().clone();
      match current {
        ObservationState::Active(s) if s.phase == Phase::GameStarting => break SessionEnd::GameStarting,
        ObservationState::NotInLobby => break SessionEnd::LeftLobby,
        ObservationState::Ended => break SessionEnd::Stopped,
        _ => {}
      }
      if rx.changed().await.is_err() {
        break SessionEnd::Stopped;
      }
    };
    self.stop();
    end
  }

  pub fn stop(&self) {
    self.cancel.cancel();
    if let Some(handle) = self
      .observer
      .lock()
      .unwrap_or_else(|e| e.into_inner())
      .take()
    {
      handle.abort();
    }
    self.state.send_if_modified(|state| {
      if matches!(state, ObservationState::Waiting | ObservationState::Active(_)) {
        *state = ObservationState::Ended;
        true
      } else {
        false
      }
    });
  }
}

impl Drop for ChampSelectSession {
  fn drop(&mut self) {
    self.stop();
  }
}

async fn observe_loop(
  transport: Arc<dyn Transport>,
  poll_interval: Duration,
  registry: Arc<HandlerRegistry>,
  state: Arc<watch::Sender<ObservationState>>,
  failures: mpsc::UnboundedSender<HandlerFailure>,
  seen_session: Arc<AtomicBool>,
  cancel: CancellationToken,
) {
  let mut ticker = tokio::time::interval(poll_interval);
  ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
  let mut last_dispatched: Option<Arc<SessionSnapshot>> = None;
  let mut last_phase: Option<Phase> = None;

  loop {
    tokio::select! {
      _ = cancel.cancelled() => break,
      _ = ticker.tick() => {}
    }

    let snapshot = match fetch_snapshot(&*transport).await {
      Ok(snapshot) => Arc::new(snapshot),
      Err(e) if e.is_not_found() && seen_session.load(Ordering::SeqCst) => {
        info!("[Champ Select] Session is gone; local player left champ select");
        state.send_replace(ObservationState::NotInLobby);
        break;
      }
      Err(e @ TransportError::MalformedResponse { .. }) => {
        warn!("[Champ Select] Skipping cycle: {}", e);
        continue;
      }
      Err(e) => {
        debug!("[Champ Select] Session not available yet: {}", e);
        continue;
      }
    };

    seen_session.store(true, Ordering::SeqCst);
    if last_phase != Some(snapshot.phase) {
      info!(
        "[Champ Select] Phase changed: {:?} -> {:?}",
        last_phase, snapshot.phase
      );
      last_phase = Some(snapshot.phase);
    }
    state.send_replace(ObservationState::Active(snapshot.clone()));

    if last_dispatched.as_deref() == Some(&*snapshot) {
      continue;
    }
    last_dispatched = Some(snapshot.clone());
    tokio::spawn(dispatch(
      registry.entries(),
      registry.clone(),
      snapshot,
      failures.clone(),
    ));
  }
}

/// Run every handler registered at snapshot time, in registration order.
async fn dispatch(
  handlers: Vec<HandlerEntry>,
  registry: Arc<HandlerRegistry>,
  snapshot: Arc<SessionSnapshot>,
  failures: mpsc::UnboundedSender<HandlerFailure>,
) {
  for (id, handler) in handlers {
    if !registry.contains(id) {
      continue;
    }
    if let Err(error) = handler.on_snapshot(snapshot.clone()).await {
      registry.remove(id);
      debug!(
        "[Champ Select] Handler {} failed and was removed: {}",
        handler.name(),
        error
      );
      let _ = failures.send(HandlerFailure {
        handler: handler.name().to_string(),
        error,
      });
    }
  }
}
