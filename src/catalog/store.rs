// Champion / summoner spell / perk lookups backed by the client's game data

use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tokio::sync::{oneshot, OnceCell};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::runes::translate;
use super::types::{
  normalize_name, Availability, Champion, RawChampionSummary, RawPerk, SummonerSpell,
};
use crate::error::{AutomationError, TransportError};
use crate::lcu::{get_json, Subscription, Transport};
use crate::runes::{RuneRecommendation, RuneSelection};

pub const CHAMPION_SUMMARY_PATH: &str = "/lol-game-data/assets/v1/champion-summary.json";
pub const SUMMONER_SPELLS_PATH: &str = "/lol-game-data/assets/v1/summoner-spells.json";
pub const PERKS_PATH: &str = "/lol-perks/v1/perks";

const FIRST_AVAILABILITY_TIMEOUT: Duration = Duration::from_secs(5);

pub struct Catalog {
  transport: Arc<dyn Transport>,
  champions: RwLock<Vec<Champion>>,
  spells: RwLock<Vec<SummonerSpell>>,
  perk_ids: OnceCell<HashMap<String, i64>>,
}

impl Catalog {
  pub fn new(transport: Arc<dyn Transport>) -> Arc<Self> {
    Arc::new(Self {
      transport,
      champions: RwLock::new(Vec::new()),
      spells: RwLock::new(Vec::new()),
      perk_ids: OnceCell::new(),
    })
  }

  fn champions(&self) -> RwLockReadGuard<'_, Vec<Champion>> {
    self.champions.read().unwrap_or_else(|e| e.into_inner())
  }

  fn champions_mut(&self) -> RwLockWriteGuard<'_, Vec<Champion>> {
    self.champions.write().unwrap_or_else(|e| e.into_inner())
  }

  /// Fetch the static champion and summoner spell lists.
  pub async fn load(&self) -> Result<(), TransportError> {
    let raw: Vec<RawChampionSummary> = get_json(&*self.transport, CHAMPION_SUMMARY_PATH).await?;
    let champions: Vec<Champion> = raw
      .into_iter()
      .filter(|c| c.id > 0)
      .map(Champion::from)
      .collect();

    let spells: Vec<SummonerSpell> = get_json::<Vec<SummonerSpell>>(&*self.transport, SUMMONER_SPELLS_PATH)
      .await?
      .into_iter()
      .filter(|s| !s.name.is_empty())
      .collect();

    info!(
      "[Catalog] Loaded {} champions and {} summoner spells",
      champions.len(),
      spells.len()
    );
    *self.champions_mut() = champions;
    *self.spells.write().unwrap_or_else(|e| e.into_inner()) = spells;
    Ok(())
  }

  /// Normalized match on display name or alias.
  pub fn resolve(&self, name: &str) -> Option<Champion> {
    let wanted = normalize_name(name);
    if wanted.is_empty() {
      return None;
    }
    self.champions().iter().find(|c| c.matches(&wanted)).cloned()
  }

  pub fn champion_by_id(&self, id: i64) -> Option<Champion> {
    self.champions().iter().find(|c| c.id == id).cloned()
  }

  pub fn resolve_spell(&self, name: &str) -> Option<SummonerSpell> {
    let wanted = normalize_name(name);
    self
      .spells
      .read()
      .unwrap_or_else(|e| e.into_inner())
      .iter()
      .find(|s| normalize_name(&s.name) == wanted)
      .cloned()
  }

  /// Replace one availability flag on every champion from an id list.
  pub fn apply_availability(&self, which: Availability, ids: &[i64]) {
    let mut champions = self.champions_mut();
    for champion in champions.iter_mut() {
      let flag = Some(ids.contains(&champion.id));
      match which {
        Availability::Pickable => champion.pickable = flag,
        Availability::Bannable => champion.bannable = flag,
      }
    }
    debug!("[Catalog] {:?} set updated ({} ids)", which, ids.len());
  }

  /// Subscribe to pickable/bannable id sets. Returns once both have reported
  /// a first value, or after a bounded wait.
  pub async fn observe_availability(self: &Arc<Self>) -> Result<AvailabilityWatch, TransportError> {
    let cancel = CancellationToken::new();
    let mut tasks = Vec::new();
    let mut first_values = Vec::new();

    for which in [Availability::Pickable, Availability::Bannable] {
      let subscription = self.transport.subscribe(which.path()).await?;
      let (first_tx, first_rx) = oneshot::channel();
      first_values.push(first_rx);
      tasks.push(tokio::spawn(apply_updates(
        self.clone(),
        which,
        subscription,
        first_tx,
        cancel.clone(),
      )));
    }

    let first = futures_util::future::join_all(first_values);
    if tokio::time::timeout(FIRST_AVAILABILITY_TIMEOUT, first).await.is_err() {
      warn!("[Catalog] Availability not reported yet; champions stay ineligible until it is");
    }
    Ok(AvailabilityWatch { cancel, tasks })
  }

  async fn perk_ids(&self) -> Result<&HashMap<String, i64>, TransportError> {
    self
      .perk_ids
      .get_or_try_init(|| async {
        let perks: Vec<RawPerk> = get_json(&*self.transport, PERKS_PATH).await?;
        debug!("[Catalog] Loaded {} perks", perks.len());
        Ok::<_, TransportError>(
          perks
            .into_iter()
            .map(|p| (normalize_name(&p.name), p.id))
            .collect(),
        )
      })
      .await
  }

  /// Translate symbolic rune names into the ids a rune page expects.
  pub async fn translate_runes(
    &self,
    recommendation: &RuneRecommendation,
  ) -> Result<RuneSelection, AutomationError> {
    let perk_ids = self.perk_ids().await?;
    translate(recommendation, perk_ids)
  }
}

async fn apply_updates(
  catalog: Arc<Catalog>,
  which: Availability,
  mut subscription: Subscription,
  first_tx: oneshot::Sender<()>,
  cancel: CancellationToken,
) {
  let mut first_tx = Some(first_tx);
  loop {
    let value = tokio::select! {
      _ = cancel.cancelled() => break,
      next = subscription.next() => match next {
        Some(value) => value,
        None => break,
      },
    };
    // Delete events carry no data once the session is gone
    let ids = match value {
      Value::Null => Vec::new(),
      other => match serde_json::from_value::<Vec<i64>>(other) {
        Ok(ids) => ids,
        Err(e) => {
          warn!("[Catalog] Ignoring malformed {:?} update: {}", which, e);
          continue;
        }
      },
    };
    catalog.apply_availability(which, &ids);
    if let Some(tx) = first_tx.take() {
      let _ = tx.send(());
    }
  }
  subscription.unsubscribe();
}

/// Background availability updates; stopped explicitly or on drop.
pub struct AvailabilityWatch {
  cancel: CancellationToken,
  tasks: Vec<JoinHandle<()>>,
}

impl AvailabilityWatch {
  pub fn stop(&self) {
    self.cancel.cancel();
  }
}

impl Drop for AvailabilityWatch {
  fn drop(&mut self) {
    self.cancel.cancel();
    for task in &self.tasks {
      task.abort();
    }
  }
}
