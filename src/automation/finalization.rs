// Rune page and summoner spell post-processing, run once at FINALIZATION

use async_trait::async_trait;
use http::Method;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

use super::context::AutomationContext;
use crate::champ_select::{Phase, SessionSnapshot, SnapshotHandler};
use crate::config::{Role, RolePreference};
use crate::error::AutomationError;
use crate::runes::RunePageEditor;

pub const MY_SELECTION_PATH: &str = "/lol-champ-select/v1/session/my-selection";

pub struct FinalizationBehavior {
  ctx: AutomationContext,
  role: Role,
  preference: RolePreference,
  pages: RunePageEditor,
  handled: AtomicBool,
}

impl FinalizationBehavior {
  pub fn activate(ctx: &AutomationContext, role: Role, preference: &RolePreference) -> Arc<Self> {
    Arc::new(Self {
      pages: RunePageEditor::new(ctx.transport.clone()),
      ctx: ctx.clone(),
      role,
      preference: preference.clone(),
      handled: AtomicBool::new(false),
    })
  }

  pub fn has_run(&self) -> bool {
    self.handled.load(Ordering::SeqCst)
  }

  async fn apply_runes(&self, snapshot: &SessionSnapshot) -> Result<(), AutomationError> {
    let champion_id = snapshot
      .local_champion_id()
      .ok_or(AutomationError::NoSelectedChampion)?;
    let champion = self
      .ctx
      .catalog
      .champion_by_id(champion_id)
      .ok_or(AutomationError::UnknownChampionId(champion_id))?;
    let source = self
      .ctx
      .rune_source
      .as_ref()
      .ok_or(AutomationError::MissingRuneSource)?;

    let recommendation = source.get_runes(&champion.name, self.role).await?;
    let selection = self.ctx.catalog.translate_runes(&recommendation).await?;
    self.pages.apply(&selection).await?;
    info!("[Auto Runes] Runes for {} ({}) applied", champion.name, self.role);
    Ok(())
  }

  async fn apply_summoners(&self) -> Result<(), AutomationError> {
    let pair = self
      .preference
      .summoners
      .as_ref()
      .ok_or(AutomationError::MissingSummonerSpells(self.role))?;
    let spell_id = |name: &str| {
      self
        .ctx
        .catalog
        .resolve_spell(name)
        .map(|s| s.id)
        .ok_or_else(|| AutomationError::UnknownSummonerSpell(name.to_string()))
    };
    let spell1_id = spell_id(&pair.first)?;
    let spell2_id = spell_id(&pair.second)?;

    self
      .ctx
      .transport
      .request(
        Method::PATCH,
        MY_SELECTION_PATH,
        Some(json!({ "spell1Id": spell1_id, "spell2Id": spell2_id })),
      )
      .await?;
    info!(
      "[Auto Summoners] Selected {} + {}",
      pair.first, pair.second
    );
    Ok(())
  }
}

#[async_trait]
impl SnapshotHandler for FinalizationBehavior {
  fn name(&self) -> &str {
    "Finalization"
  }

  async fn on_snapshot(&self, snapshot: Arc<SessionSnapshot>) -> Result<(), AutomationError> {
    if snapshot.phase != Phase::Finalization {
      return Ok(());
    }
    if self.handled.swap(true, Ordering::SeqCst) {
      return Ok(());
    }

    if self.ctx.config.autorunes {
      if let Err(e) = self.apply_runes(&snapshot).await {
        warn!("[Auto Runes] Could not get/set runes: {}", e);
      }
    }
    if self.ctx.config.autosummoners {
      self.apply_summoners().await?;
    }
    Ok(())
  }
}
