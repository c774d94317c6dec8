// Automation configuration (config.json)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{AutomationError, ConfigError};

pub const APP_DIR_NAME: &str = "com.champpilot.app";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
  Top,
  Jungle,
  Mid,
  Adc,
  Support,
}

impl Role {
  /// Map the champ select `assignedPosition` value.
  pub fn from_assigned_position(position: &str) -> Option<Self> {
    match position.to_lowercase().as_str() {
      "top" => Some(Self::Top),
      "jungle" => Some(Self::Jungle),
      "middle" | "mid" => Some(Self::Mid),
      "bottom" | "adc" => Some(Self::Adc),
      "utility" | "support" => Some(Self::Support),
      _ => None,
    }
  }

  /// Position name used by the lobby position-preferences endpoint.
  pub fn lobby_position(self) -> &'static str {
    match self {
      Self::Top => "TOP",
      Self::Jungle => "JUNGLE",
      Self::Mid => "MIDDLE",
      Self::Adc => "BOTTOM",
      Self::Support => "UTILITY",
    }
  }

  /// Position name used by the rune recommendation source.
  pub fn rune_position(self) -> &'static str {
    match self {
      Self::Top => "Top",
      Self::Jungle => "Jungle",
      Self::Mid => "Middle",
      Self::Adc => "ADC",
      Self::Support => "Support",
    }
  }
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Self::Top => "TOP",
      Self::Jungle => "JUNGLE",
      Self::Mid => "MID",
      Self::Adc => "ADC",
      Self::Support => "SUPPORT",
    };
    f.write_str(name)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GameMode {
  Flex,
  Soloq,
  Normal,
  Aram,
}

impl GameMode {
  pub fn queue_id(self) -> u32 {
    match self {
      Self::Flex => 440,
      Self::Soloq => 420,
      Self::Normal => 400,
      Self::Aram => 450,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummonerSpellPair {
  pub first: String,
  pub second: String,
}

/// Per-role preference lists, most preferred first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolePreference {
  pub role: Role,
  #[serde(default)]
  pub pick: Vec<String>,
  #[serde(default)]
  pub ban: Vec<String>,
  #[serde(default)]
  pub summoners: Option<SummonerSpellPair>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AutomationConfig {
  pub league_path: Option<String>,
  pub autolobby: bool,
  pub autoposition: bool,
  pub autosearch: bool,
  pub autoaccept: bool,
  pub autodeclare: bool,
  pub autoban: bool,
  pub autopick: bool,
  pub autorunes: bool,
  pub autosummoners: bool,
  pub primary_role: Option<Role>,
  pub secondary_role: Option<Role>,
  pub preferred_game_mode: Option<GameMode>,
  pub role_preferences: Vec<RolePreference>,
  pub poll_interval_ms: u64,
  pub rune_source_url: Option<String>,
}

impl Default for AutomationConfig {
  fn default() -> Self {
    Self {
      league_path: None,
      autolobby: false,
      autoposition: false,
      autosearch: false,
      autoaccept: false,
      autodeclare: false,
      autoban: false,
      autopick: false,
      autorunes: false,
      autosummoners: false,
      primary_role: None,
      secondary_role: None,
      preferred_game_mode: None,
      role_preferences: Vec::new(),
      poll_interval_ms: 1000,
      rune_source_url: None,
    }
  }
}

impl AutomationConfig {
  /// Whether any champion select behavior is switched on.
  pub fn champ_select_enabled(&self) -> bool {
    self.autodeclare || self.autoban || self.autopick || self.autorunes || self.autosummoners
  }

  pub fn preference_for(&self, role: Role) -> Option<&RolePreference> {
    self.role_preferences.iter().find(|p| p.role == role)
  }

  /// Pick the preference for the resolved role, falling back to the primary role.
  pub fn resolve_preference(&self, role: Option<Role>) -> Result<&RolePreference, AutomationError> {
    let role = role.or(self.primary_role).ok_or_else(|| {
      AutomationError::MissingRolePreference("unresolved role and no primary role".to_string())
    })?;
    let pref = self
      .preference_for(role)
      .ok_or_else(|| AutomationError::MissingRolePreference(role.to_string()))?;
    if self.autosummoners && pref.summoners.is_none() {
      return Err(AutomationError::MissingSummonerSpells(role));
    }
    Ok(pref)
  }

  /// Checks run before any request reaches the client.
  pub fn validate(&self) -> Result<(), AutomationError> {
    if self.autolobby && self.preferred_game_mode.is_none() {
      return Err(AutomationError::MissingGameMode);
    }
    if self.autoposition && (self.primary_role.is_none() || self.secondary_role.is_none()) {
      return Err(AutomationError::MissingPosition(format!(
        "Primary: {:?} | Secondary: {:?}",
        self.primary_role, self.secondary_role
      )));
    }
    if self.champ_select_enabled() {
      match self.primary_role {
        Some(role) => {
          self.resolve_preference(Some(role))?;
        }
        None if self.role_preferences.is_empty() => {
          return Err(AutomationError::MissingRolePreference(
            "no role preferences configured".to_string(),
          ));
        }
        None => {}
      }
      if self.autosummoners {
        if let Some(pref) = self.role_preferences.iter().find(|p| p.summoners.is_none()) {
          return Err(AutomationError::MissingSummonerSpells(pref.role));
        }
      }
    }
    if self.autorunes && self.rune_source_url.is_none() {
      return Err(AutomationError::MissingRuneSource);
    }
    Ok(())
  }
}

pub fn default_config_dir() -> PathBuf {
  std::env::var("APPDATA")
    .map(|ap| PathBuf::from(ap).join(APP_DIR_NAME).join("config"))
    .unwrap_or_else(|_| PathBuf::from(".").join("config"))
}

pub fn default_config_path() -> PathBuf {
  default_config_dir().join("config.json")
}

/// Load config.json, returning defaults when the file does not exist yet.
pub fn load_config(path: &Path) -> Result<AutomationConfig, ConfigError> {
  if !path.exists() {
    info!("[Config] {} does not exist, using defaults", path.display());
    return Ok(AutomationConfig::default());
  }
  let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
    path: path.display().to_string(),
    source,
  })?;
  let cfg: AutomationConfig = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
    path: path.display().to_string(),
    source,
  })?;
  debug!(
    "[Config] Loaded {} role preference(s) from {}",
    cfg.role_preferences.len(),
    path.display()
  );
  Ok(cfg)
}
