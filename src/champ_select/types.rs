// Champ select session shapes: raw LCU payloads and normalized snapshots

use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;

use crate::config::Role;
use crate::error::TransportError;

pub const SESSION_PATH: &str = "/lol-champ-select/v1/session";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
  Planning,
  BanPick,
  Finalization,
  GameStarting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
  Pick,
  Ban,
}

impl fmt::Display for ActionKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Pick => f.write_str("pick"),
      Self::Ban => f.write_str("ban"),
    }
  }
}

// ---------------------------------------------------------------------------
// Raw payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAction {
  pub id: i64,
  #[serde(rename = "type")]
  pub action_type: String,
  #[serde(default)]
  pub completed: bool,
  pub actor_cell_id: i64,
  #[serde(default)]
  pub champion_id: i64,
  #[serde(default)]
  pub is_ally_action: bool,
  #[serde(default)]
  pub is_in_progress: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawParticipant {
  pub cell_id: i64,
  #[serde(default)]
  pub champion_id: i64,
  #[serde(default)]
  pub champion_pick_intent: i64,
  #[serde(default)]
  pub assigned_position: String,
  #[serde(default)]
  pub spell1_id: i64,
  #[serde(default)]
  pub spell2_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct RawTimer {
  pub phase: Phase,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBans {
  #[serde(default)]
  pub my_team_bans: Vec<i64>,
  #[serde(default)]
  pub their_team_bans: Vec<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSession {
  pub actions: Vec<Vec<RawAction>>,
  pub local_player_cell_id: i64,
  pub timer: RawTimer,
  #[serde(default)]
  pub my_team: Vec<RawParticipant>,
  #[serde(default)]
  pub their_team: Vec<RawParticipant>,
  #[serde(default)]
  pub bans: RawBans,
}

// ---------------------------------------------------------------------------
// Normalized snapshot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
  pub id: i64,
  pub kind: ActionKind,
  pub completed: bool,
  pub owner_cell_id: i64,
  pub champion_id: Option<i64>,
  pub is_ally_action: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
  pub in_progress: bool,
  pub actions: Vec<Action>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
  pub cell_id: i64,
  pub champion_id: Option<i64>,
  pub champion_pick_intent: Option<i64>,
  pub assigned_position: String,
  pub spell1_id: Option<i64>,
  pub spell2_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
  pub phase: Phase,
  pub turns: Vec<Turn>,
  pub local_cell_id: i64,
  pub local_team: Vec<Participant>,
  pub enemy_team: Vec<Participant>,
  pub banned_champion_ids: HashSet<i64>,
}

fn positive(id: i64) -> Option<i64> {
  (id > 0).then_some(id)
}

impl From<RawParticipant> for Participant {
  fn from(p: RawParticipant) -> Self {
    Self {
      cell_id: p.cell_id,
      champion_id: positive(p.champion_id),
      champion_pick_intent: positive(p.champion_pick_intent),
      assigned_position: p.assigned_position,
      spell1_id: positive(p.spell1_id),
      spell2_id: positive(p.spell2_id),
    }
  }
}

impl From<RawSession> for SessionSnapshot {
  fn from(raw: RawSession) -> Self {
    let mut banned_champion_ids: HashSet<i64> = raw
      .bans
      .my_team_bans
      .iter()
      .chain(raw.bans.their_team_bans.iter())
      .copied()
      .filter(|id| *id > 0)
      .collect();

    let turns = raw
      .actions
      .into_iter()
      .map(|raw_turn| {
        let in_progress = raw_turn.iter().any(|a| a.is_in_progress);
        let actions = raw_turn
          .into_iter()
          .filter_map(|a| {
            let kind = match a.action_type.as_str() {
              "pick" => ActionKind::Pick,
              "ban" => ActionKind::Ban,
              // ten_bans_reveal and other bookkeeping actions
              _ => return None,
            };
            Some(Action {
              id: a.id,
              kind,
              completed: a.completed,
              owner_cell_id: a.actor_cell_id,
              champion_id: positive(a.champion_id),
              is_ally_action: a.is_ally_action,
            })
          })
          .collect::<Vec<_>>();
        Turn {
          in_progress,
          actions,
        }
      })
      .collect::<Vec<_>>();

    banned_champion_ids.extend(
      turns
        .iter()
        .flat_map(|t| t.actions.iter())
        .filter(|a| a.kind == ActionKind::Ban && a.completed)
        .filter_map(|a| a.champion_id),
    );

    Self {
      phase: raw.timer.phase,
      turns,
      local_cell_id: raw.local_player_cell_id,
      local_team: raw.my_team.into_iter().map(Participant::from).collect(),
      enemy_team: raw.their_team.into_iter().map(Participant::from).collect(),
      banned_champion_ids,
    }
  }
}

impl SessionSnapshot {
  /// Parse a session payload; any shape mismatch is `MalformedResponse`.
  pub fn parse(value: serde_json::Value) -> Result<Self, TransportError> {
    let raw: RawSession =
      serde_json::from_value(value).map_err(|e| TransportError::malformed(SESSION_PATH, e))?;
    Ok(raw.into())
  }

  pub fn current_turn_index(&self) -> Option<usize> {
    self.turns.iter().position(|t| t.in_progress)
  }

  /// The one action the local player can act on right now.
  pub fn local_action_in_progress(&self) -> Option<&Action> {
    if !matches!(self.phase, Phase::Planning | Phase::BanPick) {
      return None;
    }
    let turn = &self.turns[self.current_turn_index()?];
    turn
      .actions
      .iter()
      .find(|a| !a.completed && a.owner_cell_id == self.local_cell_id)
  }

  pub fn first_uncompleted_pick_action(&self) -> Option<&Action> {
    self.all_actions().find(|a| {
      a.kind == ActionKind::Pick && a.owner_cell_id == self.local_cell_id && !a.completed
    })
  }

  pub fn all_actions(&self) -> impl Iterator<Item = &Action> {
    self.turns.iter().flat_map(|t| t.actions.iter())
  }

  pub fn is_banned(&self, champion_id: i64) -> bool {
    self.banned_champion_ids.contains(&champion_id)
  }

  pub fn local_participant(&self) -> Option<&Participant> {
    self.local_team.iter().find(|p| p.cell_id == self.local_cell_id)
  }

  pub fn local_role(&self) -> Option<Role> {
    self
      .local_participant()
      .and_then(|p| Role::from_assigned_position(&p.assigned_position))
  }

  /// Champion the local player ended up with.
  pub fn local_champion_id(&self) -> Option<i64> {
    if let Some(id) = self.local_participant().and_then(|p| p.champion_id) {
      return Some(id);
    }
    self
      .all_actions()
      .filter(|a| a.kind == ActionKind::Pick && a.owner_cell_id == self.local_cell_id && a.completed)
      .find_map(|a| a.champion_id)
  }
}
