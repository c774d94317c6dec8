// Tests for rune and summoner spell post-processing

use http::Method;
use serde_json::json;
use std::sync::Arc;

use super::test_helpers::*;
use crate::automation::{FinalizationBehavior, MY_SELECTION_PATH};
use crate::champ_select::SnapshotHandler;
use crate::config::{AutomationConfig, Role, SummonerSpellPair};
use crate::error::AutomationError;
use crate::runes::{CURRENT_PAGE_PATH, PAGES_PATH, RUNE_PAGE_NAME};
use crate::test_support::*;

#[cfg(test)]
mod finalization_tests {
  use super::*;

  fn config() -> AutomationConfig {
    AutomationConfig {
      autorunes: true,
      autosummoners: true,
      ..Default::default()
    }
  }

  fn serve_rune_pages(transport: &MockTransport) {
    transport.respond(
      Method::GET,
      PAGES_PATH,
      Ok(json!([{"id": 5, "name": RUNE_PAGE_NAME, "isEditable": true, "isValid": true}])),
    );
    transport.respond(Method::PUT, "/lol-perks/v1/pages/5", Ok(json!({})));
    transport.respond(Method::PUT, CURRENT_PAGE_PATH, Ok(json!({})));
    transport.respond(Method::PATCH, MY_SELECTION_PATH, Ok(json!({})));
  }

  /// Test: Post-processing runs exactly once per session
  ///
  /// Scenario: FINALIZATION is observed in several consecutive snapshots.
  /// Expected: One recommendation fetch, one page edit, one spell selection.
  #[tokio::test]
  async fn test_runs_once_across_finalization_snapshots() {
    let transport = MockTransport::new();
    let ctx = loaded_context(&transport, config(), &[], &[]).await;
    serve_rune_pages(&transport);
    let source = StaticRuneSource::new(domination_runes());
    let ctx = ctx.with_rune_source(source.clone());

    let behavior = FinalizationBehavior::activate(&ctx, Role::Mid, &mid_preference(&["Ahri"], &[]));
    let session = snapshot(finalization_session(103));
    let (a, b) = tokio::join!(behavior.on_snapshot(session.clone()), behavior.on_snapshot(session.clone()));
    a.unwrap();
    b.unwrap();
    behavior.on_snapshot(session).await.unwrap();

    assert!(behavior.has_run());
    assert_eq!(source.calls(), 1);
    assert_eq!(transport.requests_to(Method::PUT, CURRENT_PAGE_PATH).len(), 1);
    let selection = transport.requests_to(Method::PATCH, MY_SELECTION_PATH);
    assert_eq!(selection.len(), 1);
    assert_eq!(selection[0].body, Some(json!({"spell1Id": 4, "spell2Id": 14})));

    let page = transport.requests_to(Method::PUT, "/lol-perks/v1/pages/5");
    let body = page[0].body.clone().unwrap();
    assert_eq!(body["primaryStyleId"], 8100);
    assert_eq!(body["selectedPerkIds"][6], 5008);
    assert_eq!(body["selectedPerkIds"][8], 5003);
  }

  /// Test: Rune translation failures do not block summoner spells
  #[tokio::test]
  async fn test_unknown_rune_is_logged_not_fatal() {
    let transport = MockTransport::new();
    let ctx = loaded_context(&transport, config(), &[], &[]).await;
    serve_rune_pages(&transport);
    let mut runes = domination_runes();
    runes.primary_runes[0] = "NOTARUNE".into();
    let ctx = ctx.with_rune_source(StaticRuneSource::new(runes));

    let behavior = FinalizationBehavior::activate(&ctx, Role::Mid, &mid_preference(&["Ahri"], &[]));
    behavior.on_snapshot(snapshot(finalization_session(103))).await.unwrap();

    assert!(transport.requests_to(Method::PUT, CURRENT_PAGE_PATH).is_empty());
    assert_eq!(transport.requests_to(Method::PATCH, MY_SELECTION_PATH).len(), 1);
  }

  /// Test: An unknown spell name fails the behavior
  #[tokio::test]
  async fn test_unknown_summoner_spell() {
    let transport = MockTransport::new();
    let config = AutomationConfig {
      autosummoners: true,
      ..Default::default()
    };
    let ctx = loaded_context(&transport, config, &[], &[]).await;
    let mut preference = mid_preference(&["Ahri"], &[]);
    preference.summoners = Some(SummonerSpellPair {
      first: "Flash".into(),
      second: "Smite".into(),
    });

    let behavior = FinalizationBehavior::activate(&ctx, Role::Mid, &preference);
    let err = behavior.on_snapshot(snapshot(finalization_session(103))).await.unwrap_err();
    assert!(matches!(err, AutomationError::UnknownSummonerSpell(name) if name == "Smite"));
    assert!(transport.mutations().is_empty());
  }

  /// Test: Nothing happens before FINALIZATION
  #[tokio::test]
  async fn test_waits_for_finalization() {
    let transport = MockTransport::new();
    let ctx = loaded_context(&transport, config(), &[], &[]).await;
    let source = StaticRuneSource::new(domination_runes());
    let ctx = ctx.with_rune_source(source.clone());

    let behavior: Arc<FinalizationBehavior> =
      FinalizationBehavior::activate(&ctx, Role::Mid, &mid_preference(&["Ahri"], &[]));
    behavior.on_snapshot(snapshot(local_pick_session("BAN_PICK", 7))).await.unwrap();

    assert!(!behavior.has_run());
    assert_eq!(source.calls(), 0);
    assert!(transport.mutations().is_empty());
  }
}
