// Rune name -> id translation

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::error::AutomationError;
use crate::runes::{RuneRecommendation, RuneSelection};

pub static STYLE_IDS: Lazy<HashMap<&'static str, i64>> = Lazy::new(|| {
  HashMap::from([
    ("PRECISION", 8000),
    ("DOMINATION", 8100),
    ("SORCERY", 8200),
    ("INSPIRATION", 8300),
    ("RESOLVE", 8400),
  ])
});

// Recommendation sites spell some stat shards differently from the client.
static SHARD_ALIASES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
  HashMap::from([
    ("ADAPTIVEFORCE", "ADAPTIVE"),
    ("MAGICRESIST", "MAGICRES"),
    ("SCALINGCOOLDOWNREDUCTION", "CDRSCALING"),
    ("SCALINGHEALTH", "HEALTHSCALING"),
  ])
});

fn lookup(table: &HashMap<String, i64>, name: &str) -> Option<i64> {
  table.get(name).copied().or_else(|| {
    SHARD_ALIASES
      .get(name)
      .and_then(|alias| table.get(*alias).copied())
  })
}

/// Translate a normalized recommendation using the client's perk table.
pub fn translate(
  recommendation: &RuneRecommendation,
  perk_ids: &HashMap<String, i64>,
) -> Result<RuneSelection, AutomationError> {
  let style = |name: &str| {
    STYLE_IDS
      .get(name)
      .copied()
      .ok_or_else(|| AutomationError::UnknownRune(format!("style {}", name)))
  };
  let primary_style_id = style(&recommendation.primary_style)?;
  let sub_style_id = style(&recommendation.secondary_style)?;

  let selected_perk_ids = recommendation
    .rune_names()
    .map(|name| lookup(perk_ids, name).ok_or_else(|| AutomationError::UnknownRune(name.clone())))
    .collect::<Result<Vec<_>, _>>()?;

  Ok(RuneSelection {
    primary_style_id,
    sub_style_id,
    selected_perk_ids,
  })
}
