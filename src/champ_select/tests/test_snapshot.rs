// Tests for session parsing and derived accessors

use crate::champ_select::{ActionKind, Phase, SessionSnapshot};
use crate::config::Role;
use crate::error::TransportError;
use crate::test_support::*;

#[cfg(test)]
mod snapshot_tests {
  use super::*;
  use proptest::prelude::*;
  use serde_json::json;

  /// Test: Basic normalization of a ban/pick session
  ///
  /// Scenario: Session with a completed ban turn and an in-progress pick turn.
  /// Expected: Two turns, the pick turn is current, the local pick is actionable.
  #[test]
  fn test_parse_ban_pick_session() {
    let snapshot = SessionSnapshot::parse(local_pick_session("BAN_PICK", 7)).unwrap();

    assert_eq!(snapshot.phase, Phase::BanPick);
    assert_eq!(snapshot.turns.len(), 2);
    assert_eq!(snapshot.current_turn_index(), Some(1));
    let action = snapshot.local_action_in_progress().unwrap();
    assert_eq!(action.id, 7);
    assert_eq!(action.kind, ActionKind::Pick);
    assert_eq!(action.champion_id, None);
    assert!(snapshot.is_banned(157));
    assert_eq!(snapshot.local_role(), Some(Role::Mid));
  }

  /// Test: Team bans are merged into the banned set
  #[test]
  fn test_team_bans_are_banned() {
    let mut value = local_pick_session("BAN_PICK", 7);
    value["bans"] = json!({"myTeamBans": [1, 0], "theirTeamBans": [2]});
    let snapshot = SessionSnapshot::parse(value).unwrap();
    assert!(snapshot.is_banned(1));
    assert!(snapshot.is_banned(2));
    assert!(snapshot.is_banned(157));
    assert!(!snapshot.is_banned(0));
  }

  /// Test: Actionable local action only exists in PLANNING / BAN_PICK
  #[test]
  fn test_no_local_action_outside_pick_phases() {
    let snapshot = SessionSnapshot::parse(local_pick_session("FINALIZATION", 7)).unwrap();
    assert!(snapshot.local_action_in_progress().is_none());
    // Still discoverable for declare bookkeeping
    assert_eq!(snapshot.first_uncompleted_pick_action().map(|a| a.id), Some(7));
  }

  /// Test: Declare target during planning
  ///
  /// Scenario: PLANNING with the local pick in a later, not-yet-active turn.
  /// Expected: No actionable action, but the first uncompleted pick is found.
  #[test]
  fn test_first_uncompleted_pick_during_planning() {
    let value = session_json(
      "PLANNING",
      4,
      vec![
        vec![action_json(1, "ban", 4, false, false, 0)],
        vec![action_json(2, "pick", 1, false, false, 0)],
        vec![action_json(3, "pick", 4, false, false, 0)],
      ],
      vec![participant_json(4, "utility", 0)],
    );
    let snapshot = SessionSnapshot::parse(value).unwrap();
    assert_eq!(snapshot.current_turn_index(), None);
    assert!(snapshot.local_action_in_progress().is_none());
    assert_eq!(snapshot.first_uncompleted_pick_action().map(|a| a.id), Some(3));
    assert_eq!(snapshot.local_role(), Some(Role::Support));
  }

  /// Test: Bookkeeping actions are dropped but keep their turn position
  #[test]
  fn test_reveal_actions_are_dropped() {
    let value = session_json(
      "BAN_PICK",
      2,
      vec![
        vec![action_json(1, "ban", 2, true, false, 99)],
        vec![action_json(2, "ten_bans_reveal", -1, false, true, 0)],
        vec![action_json(3, "pick", 2, false, false, 0)],
      ],
      vec![participant_json(2, "top", 0)],
    );
    let snapshot = SessionSnapshot::parse(value).unwrap();
    assert_eq!(snapshot.turns.len(), 3);
    assert!(snapshot.turns[1].actions.is_empty());
    assert_eq!(snapshot.current_turn_index(), Some(1));
    assert!(snapshot.local_action_in_progress().is_none());
  }

  /// Test: Final champion comes from the team record, then from completed picks
  #[test]
  fn test_local_champion_id() {
    let value = session_json(
      "FINALIZATION",
      2,
      vec![vec![action_json(5, "pick", 2, true, false, 103)]],
      vec![participant_json(2, "middle", 0)],
    );
    assert_eq!(SessionSnapshot::parse(value).unwrap().local_champion_id(), Some(103));

    let value = session_json(
      "FINALIZATION",
      2,
      vec![vec![action_json(5, "pick", 2, true, false, 103)]],
      vec![participant_json(2, "middle", 99)],
    );
    assert_eq!(SessionSnapshot::parse(value).unwrap().local_champion_id(), Some(99));
  }

  /// Test: Malformed payloads are rejected as MalformedResponse
  #[test]
  fn test_malformed_session() {
    let missing_timer = json!({"actions": [], "localPlayerCellId": 1});
    assert!(matches!(
      SessionSnapshot::parse(missing_timer),
      Err(TransportError::MalformedResponse { .. })
    ));

    let mut unknown_phase = local_pick_session("BAN_PICK", 7);
    unknown_phase["timer"]["phase"] = json!("SOMETHING_ELSE");
    assert!(SessionSnapshot::parse(unknown_phase).is_err());

    assert!(SessionSnapshot::parse(json!({})).is_err());
  }

  fn arb_action() -> impl Strategy<Value = (bool, i64, bool, bool)> {
    // (is_pick, actor cell, completed, in progress)
    (any::<bool>(), 0i64..4, any::<bool>(), any::<bool>())
  }

  proptest! {
    /// At most one action is owned by the local player, uncompleted, and in the active turn.
    #[test]
    fn prop_at_most_one_current_local_action(
      turns in prop::collection::vec(prop::collection::vec(arb_action(), 0..4), 0..6),
      local in 0i64..4,
      planning in any::<bool>(),
    ) {
      let mut next_id = 0;
      let turns_json = turns
        .iter()
        .map(|turn| {
          turn
            .iter()
            .map(|(is_pick, actor, completed, in_progress)| {
              next_id += 1;
              action_json(next_id, if *is_pick { "pick" } else { "ban" }, *actor, *completed, *in_progress, 0)
            })
            .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();
      let phase = if planning { "PLANNING" } else { "BAN_PICK" };
      let snapshot = SessionSnapshot::parse(session_json(phase, local, turns_json, vec![])).unwrap();

      let current = snapshot.current_turn_index();
      let matching = snapshot
        .turns
        .iter()
        .enumerate()
        .filter(|(i, _)| Some(*i) == current)
        .flat_map(|(_, t)| t.actions.iter())
        .filter(|a| a.owner_cell_id == local && !a.completed)
        .count();
      match snapshot.local_action_in_progress() {
        Some(action) => {
          prop_assert_eq!(action.owner_cell_id, local);
          prop_assert!(!action.completed);
          prop_assert!(snapshot.turns[current.unwrap()].actions.contains(action));
        }
        None => prop_assert!(current.is_none() || matching == 0),
      }
    }
  }
}
