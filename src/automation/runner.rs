// One automation run: lobby steps, then champ select behaviors until the game starts

use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::behaviors::{BehaviorKind, ChampionBehavior};
use super::context::AutomationContext;
use super::finalization::FinalizationBehavior;
use crate::champ_select::{
  ChampSelectSession, HandlerFailure, HandlerRegistration, SessionEnd, SnapshotHandler,
};
use crate::config::{Role, RolePreference};
use crate::error::{AutomationError, ErrorClass};
use crate::lobby::PartyLobby;

#[derive(Debug)]
pub struct RunOutcome {
  /// `None` when no champ select behavior was enabled.
  pub end: Option<SessionEnd>,
  pub role: Option<Role>,
  pub failures: Vec<HandlerFailure>,
}

impl RunOutcome {
  fn idle() -> Self {
    Self {
      end: None,
      role: None,
      failures: Vec::new(),
    }
  }
}

fn report(failure: &HandlerFailure) {
  match failure.error.class() {
    ErrorClass::Exhaustion => warn!("[Automation] {} gave up: {}", failure.handler, failure.error),
    _ => error!("[Automation] {} failed: {}", failure.handler, failure.error),
  }
}

async fn run_lobby_steps(
  ctx: &AutomationContext,
  session: &ChampSelectSession,
  poll: Duration,
  cancel: &CancellationToken,
) -> Result<(), AutomationError> {
  let config = &ctx.config;
  if !(config.autolobby || config.autoposition || config.autosearch || config.autoaccept) {
    return Ok(());
  }
  let lobby = PartyLobby::new(ctx.transport.clone(), poll);

  if config.autolobby && !lobby.is_in_lobby().await && !session.is_in_champ_select().await {
    let mode = config
      .preferred_game_mode
      .ok_or(AutomationError::MissingGameMode)?;
    lobby.create_lobby(mode).await?;
  }

  if session.is_in_champ_select().await {
    return Ok(());
  }
  if config.autoposition {
    let (Some(first), Some(second)) = (config.primary_role, config.secondary_role) else {
      return Err(AutomationError::MissingPosition(format!(
        "Primary: {:?} | Secondary: {:?}",
        config.primary_role, config.secondary_role
      )));
    };
    lobby.pick_positions(first, second).await?;
  }
  if config.autosearch {
    lobby.search_game().await?;
  }
  if config.autoaccept {
    let outcome = lobby.auto_accept(cancel).await;
    info!("[Lobby] Auto accept finished: {:?}", outcome);
  }
  Ok(())
}

/// Activate every enabled behavior and register it with the session.
fn register_behaviors(
  ctx: &AutomationContext,
  session: &ChampSelectSession,
  role: Role,
  preference: &RolePreference,
  failures: &mut Vec<HandlerFailure>,
) -> Vec<HandlerRegistration> {
  let config = &ctx.config;
  let mut handlers: Vec<Arc<dyn SnapshotHandler>> = Vec::new();

  let enabled = [
    (config.autodeclare, BehaviorKind::Declare),
    (config.autoban, BehaviorKind::Ban),
    (config.autopick, BehaviorKind::Pick),
  ];
  for (_, kind) in enabled.into_iter().filter(|(on, _)| *on) {
    match ChampionBehavior::activate(kind, ctx, preference) {
      Ok(behavior) => handlers.push(behavior),
      Err(error) => {
        let failure = HandlerFailure {
          handler: kind.label().to_string(),
          error,
        };
        report(&failure);
        failures.push(failure);
      }
    }
  }
  if config.autorunes || config.autosummoners {
    handlers.push(FinalizationBehavior::activate(ctx, role, preference));
  }

  handlers
    .into_iter()
    .map(|handler| session.on_snapshot(handler))
    .collect()
}

/// Run the enabled automation once. Configuration problems abort before any
/// request; behavior failures are collected and the run continues.
pub async fn run(ctx: &AutomationContext, cancel: CancellationToken) -> Result<RunOutcome, AutomationError> {
  let config = ctx.config.clone();
  config.validate()?;

  let poll = Duration::from_millis(config.poll_interval_ms.max(1));
  let (session, mut failure_rx) = ChampSelectSession::new(ctx.transport.clone(), poll);

  run_lobby_steps(ctx, &session, poll, &cancel).await?;
  if !config.champ_select_enabled() {
    return Ok(RunOutcome::idle());
  }

  info!("[Automation] Waiting for champ select");
  let first = tokio::select! {
    first = session.wait_for_session() => first,
    _ = cancel.cancelled() => None,
  };
  let Some(first) = first else {
    return Ok(RunOutcome {
      end: Some(SessionEnd::Stopped),
      ..RunOutcome::idle()
    });
  };

  let preference = config.resolve_preference(first.local_role())?.clone();
  let role = preference.role;
  info!("[Automation] Playing {} (assigned {:?})", role, first.local_role());

  ctx.catalog.load().await?;
  let availability = ctx.catalog.observe_availability().await?;

  let mut failures = Vec::new();
  let registrations = register_behaviors(ctx, &session, role, &preference, &mut failures);
  session.start_observing();

  let end = {
    let wait_end = session.wait_for_end();
    tokio::pin!(wait_end);
    loop {
      tokio::select! {
        biased;
        end = &mut wait_end => break end,
        Some(failure) = failure_rx.recv() => {
          report(&failure);
          failures.push(failure);
        }
        _ = cancel.cancelled() => {
          session.stop();
        }
      }
    }
  };

  for registration in registrations {
    registration.unregister();
  }
  availability.stop();
  while let Ok(failure) = failure_rx.try_recv() {
    report(&failure);
    failures.push(failure);
  }

  info!(
    "[Automation] Champ select finished: {:?} ({} failure(s))",
    end,
    failures.len()
  );
  Ok(RunOutcome {
    end: Some(end),
    role: Some(role),
    failures,
  })
}
