// Rune recommendation and rune page shapes

use serde::{Deserialize, Serialize};

use crate::catalog::normalize_name;

/// Recommendation expressed with symbolic (normalized) names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuneRecommendation {
  pub primary_style: String,
  pub secondary_style: String,
  pub primary_runes: Vec<String>,
  pub secondary_runes: Vec<String>,
  pub shard_runes: Vec<String>,
}

impl RuneRecommendation {
  pub fn normalized(self) -> Self {
    let norm = |v: Vec<String>| v.iter().map(|s| normalize_name(s)).collect();
    Self {
      primary_style: normalize_name(&self.primary_style),
      secondary_style: normalize_name(&self.secondary_style),
      primary_runes: norm(self.primary_runes),
      secondary_runes: norm(self.secondary_runes),
      shard_runes: norm(self.shard_runes),
    }
  }

  /// Rune names in page order: primary, secondary, shards.
  pub fn rune_names(&self) -> impl Iterator<Item = &String> {
    self
      .primary_runes
      .iter()
      .chain(self.secondary_runes.iter())
      .chain(self.shard_runes.iter())
  }
}

/// Numeric selection written into a rune page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuneSelection {
  pub primary_style_id: i64,
  pub sub_style_id: i64,
  pub selected_perk_ids: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunePageRecord {
  pub id: i64,
  pub name: String,
  #[serde(default)]
  pub is_editable: bool,
  #[serde(default)]
  pub is_valid: bool,
  #[serde(flatten)]
  pub rest: serde_json::Map<String, serde_json::Value>,
}
