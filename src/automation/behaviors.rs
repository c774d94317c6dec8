// Declare / ban / pick behaviors

use async_trait::async_trait;
use http::Method;
use serde_json::{json, Value};
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

use super::context::AutomationContext;
use crate::catalog::{Catalog, Champion};
use crate::champ_select::{Action, ActionKind, Phase, SessionSnapshot, SnapshotHandler};
use crate::config::RolePreference;
use crate::error::{AutomationError, TransportError};
use crate::lcu::Transport;

pub fn action_path(action_id: i64) -> String {
  format!("/lol-champ-select/v1/session/actions/{}", action_id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BehaviorKind {
  Declare,
  Ban,
  Pick,
}

impl BehaviorKind {
  pub fn action_kind(self) -> ActionKind {
    match self {
      Self::Declare | Self::Pick => ActionKind::Pick,
      Self::Ban => ActionKind::Ban,
    }
  }

  pub fn required_phase(self) -> Phase {
    match self {
      Self::Declare => Phase::Planning,
      Self::Ban | Self::Pick => Phase::BanPick,
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Self::Declare => "Auto Declare",
      Self::Ban => "Auto Ban",
      Self::Pick => "Auto Pick",
    }
  }

  /// Unknown availability (`None`) is never eligible.
  fn is_eligible(self, champion: &Champion, snapshot: &SessionSnapshot) -> bool {
    match self {
      Self::Pick => champion.is_pickable(),
      // Declarations use the bannable set; it is the one populated during planning
      Self::Declare | Self::Ban => champion.is_bannable() && !snapshot.is_banned(champion.id),
    }
  }

  fn submission(self, champion_id: i64) -> Value {
    match self {
      Self::Declare => json!({ "championId": champion_id }),
      Self::Ban | Self::Pick => json!({ "championId": champion_id, "completed": true }),
    }
  }

  fn candidates(self, preference: &RolePreference) -> &[String] {
    match self {
      Self::Declare | Self::Pick => &preference.pick,
      Self::Ban => &preference.ban,
    }
  }
}

/// One automated behavior. Acts at most once per action id and consumes
/// its candidate list left to right across the whole activation.
pub struct ChampionBehavior {
  kind: BehaviorKind,
  transport: Arc<dyn Transport>,
  catalog: Arc<Catalog>,
  handled: Mutex<HashSet<i64>>,
  remaining: Mutex<VecDeque<String>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
  m.lock().unwrap_or_else(|e| e.into_inner())
}

impl ChampionBehavior {
  /// Seed the candidate list from the role preference.
  pub fn activate(
    kind: BehaviorKind,
    ctx: &AutomationContext,
    preference: &RolePreference,
  ) -> Result<Arc<Self>, AutomationError> {
    let candidates = kind.candidates(preference);
    if candidates.is_empty() {
      return Err(AutomationError::NoChampionConfigured(kind.action_kind()));
    }
    debug!(
      "[{}] Activated for {} with candidates {:?}",
      kind.label(),
      preference.role,
      candidates
    );
    Ok(Arc::new(Self {
      kind,
      transport: ctx.transport.clone(),
      catalog: ctx.catalog.clone(),
      handled: Mutex::new(HashSet::new()),
      remaining: Mutex::new(candidates.iter().cloned().collect()),
    }))
  }

  pub fn kind(&self) -> BehaviorKind {
    self.kind
  }

  pub fn handled_ids(&self) -> Vec<i64> {
    let mut ids: Vec<i64> = lock(&self.handled).iter().copied().collect();
    ids.sort_unstable();
    ids
  }

  pub fn remaining(&self) -> Vec<String> {
    lock(&self.remaining).iter().cloned().collect()
  }

  fn relevant_action(&self, snapshot: &SessionSnapshot) -> Option<Action> {
    let action = match self.kind {
      BehaviorKind::Declare => snapshot.first_uncompleted_pick_action(),
      BehaviorKind::Ban | BehaviorKind::Pick => snapshot.local_action_in_progress(),
    }?;
    (action.kind == self.kind.action_kind()).then(|| action.clone())
  }

  /// Returns false when the id was already handled.
  fn claim(&self, action_id: i64) -> bool {
    lock(&self.handled).insert(action_id)
  }

  fn next_candidate(&self) -> Option<String> {
    lock(&self.remaining).pop_front()
  }

  async fn submit(&self, action_id: i64, champion_id: i64) -> Result<(), TransportError> {
    self
      .transport
      .request(
        Method::PATCH,
        &action_path(action_id),
        Some(self.kind.submission(champion_id)),
      )
      .await
      .map(|_| ())
  }
}

#[async_trait]
impl SnapshotHandler for ChampionBehavior {
  fn name(&self) -> &str {
    self.kind.label()
  }

  async fn on_snapshot(&self, snapshot: Arc<SessionSnapshot>) -> Result<(), AutomationError> {
    let label = self.kind.label();
    if snapshot.phase != self.kind.required_phase() {
      return Ok(());
    }
    let Some(action) = self.relevant_action(&snapshot) else {
      return Ok(());
    };
    if !self.claim(action.id) {
      return Ok(());
    }
    info!("[{}] New {} action {}", label, action.kind, action.id);

    while let Some(name) = self.next_candidate() {
      let Some(champion) = self.catalog.resolve(&name) else {
        warn!("[{}] Unknown champion {:?}, skipping", label, name);
        continue;
      };
      if !self.kind.is_eligible(&champion, &snapshot) {
        debug!("[{}] {} is not eligible, skipping", label, champion.name);
        continue;
      }
      match self.submit(action.id, champion.id).await {
        Ok(()) => {
          info!("[{}] {} submitted for action {}", label, champion.name, action.id);
          return Ok(());
        }
        Err(e) if e.is_champion_conflict() => {
          info!("[{}] {} was taken meanwhile, trying next", label, champion.name);
        }
        Err(e) => {
          warn!("[{}] Submitting {} failed: {}", label, champion.name, e);
          return Err(e.into());
        }
      }
    }
    Err(AutomationError::NoEligibleChampion(self.kind.action_kind()))
  }
}
