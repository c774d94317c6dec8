// Error types for the LCU transport, configuration and automation

use thiserror::Error;

use crate::champ_select::ActionKind;
use crate::config::Role;

/// Payload fragments the client uses when a champion was taken between
/// our eligibility check and the submission.
const CHAMPION_CONFLICT_MARKERS: &[&str] = &[
  "is currently banned",
  "already picked",
  "already banned",
  "not pickable",
];

#[derive(Debug, Clone, Error)]
pub enum TransportError {
  #[error("League client unavailable: {0}")]
  Unavailable(String),
  #[error("LCU returned HTTP {status}: {body}")]
  Http { status: u16, body: String },
  #[error("Request timed out: {0}")]
  Timeout(String),
  #[error("Malformed response from {path}: {reason}")]
  MalformedResponse { path: String, reason: String },
  #[error("Event stream closed")]
  Closed,
}

impl TransportError {
  pub fn malformed(path: &str, reason: impl ToString) -> Self {
    Self::MalformedResponse {
      path: path.to_string(),
      reason: reason.to_string(),
    }
  }

  pub fn is_not_found(&self) -> bool {
    matches!(self, Self::Http { status: 404, .. })
  }

  /// Inspect the failure payload for the "champion already used" message.
  pub fn is_champion_conflict(&self) -> bool {
    let Self::Http { body, .. } = self else {
      return false;
    };
    let message = serde_json::from_str::<serde_json::Value>(body)
      .ok()
      .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
      .unwrap_or_else(|| body.clone());
    CHAMPION_CONFLICT_MARKERS
      .iter()
      .any(|marker| message.contains(marker))
  }
}

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("Failed to read config {path}: {source}")]
  Read {
    path: String,
    #[source]
    source: std::io::Error,
  },
  #[error("Failed to parse config {path}: {source}")]
  Parse {
    path: String,
    #[source]
    source: serde_json::Error,
  },
  #[error("Invalid value for {field}: {reason}")]
  Invalid { field: String, reason: String },
}

/// Coarse classification used by the runner to decide what a failure means
/// for the rest of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
  Transient,
  Conflict,
  Exhaustion,
  Configuration,
  Translation,
}

#[derive(Debug, Error)]
pub enum AutomationError {
  #[error("No eligible champion left to {0}")]
  NoEligibleChampion(ActionKind),
  #[error("No champion configured to {0}")]
  NoChampionConfigured(ActionKind),
  #[error("No preference configured for role {0}")]
  MissingRolePreference(String),
  #[error("Missing lobby positions ({0})")]
  MissingPosition(String),
  #[error("No preferred game mode configured")]
  MissingGameMode,
  #[error("No summoner spells configured for role {0}")]
  MissingSummonerSpells(Role),
  #[error("Runes are enabled but no rune source is configured")]
  MissingRuneSource,
  #[error("Unknown rune ({0})")]
  UnknownRune(String),
  #[error("Unknown summoner spell ({0})")]
  UnknownSummonerSpell(String),
  #[error("Cannot find an available rune page to use")]
  NoEditableRunePage,
  #[error("Local player has no selected champion")]
  NoSelectedChampion,
  #[error("Champion {0} is not in the catalog")]
  UnknownChampionId(i64),
  #[error(transparent)]
  Transport(#[from] TransportError),
  #[error(transparent)]
  Config(#[from] ConfigError),
}

impl AutomationError {
  pub fn class(&self) -> ErrorClass {
    match self {
      Self::Transport(e) if e.is_champion_conflict() => ErrorClass::Conflict,
      Self::Transport(_) => ErrorClass::Transient,
      Self::NoEligibleChampion(_) | Self::NoChampionConfigured(_) => ErrorClass::Exhaustion,
      Self::MissingRolePreference(_)
      | Self::MissingPosition(_)
      | Self::MissingGameMode
      | Self::MissingSummonerSpells(_)
      | Self::MissingRuneSource
      | Self::Config(_) => ErrorClass::Configuration,
      Self::UnknownRune(_)
      | Self::UnknownSummonerSpell(_)
      | Self::NoEditableRunePage
      | Self::NoSelectedChampion
      | Self::UnknownChampionId(_) => ErrorClass::Translation,
    }
  }
}
