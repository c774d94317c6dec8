// Catalog record shapes

use serde::Deserialize;

/// Keep ASCII letters only, uppercased ("Kai'Sa" -> "KAISA").
pub fn normalize_name(s: &str) -> String {
  s.chars()
    .filter(|c| c.is_ascii_alphabetic())
    .collect::<String>()
    .to_uppercase()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Champion {
  pub id: i64,
  pub name: String,
  /// Data-dragon style key, e.g. "MonkeyKing".
  pub alias: String,
  /// `None` until the client reports availability.
  pub pickable: Option<bool>,
  pub bannable: Option<bool>,
}

impl Champion {
  pub fn is_pickable(&self) -> bool {
    self.pickable == Some(true)
  }

  pub fn is_bannable(&self) -> bool {
    self.bannable == Some(true)
  }

  pub fn matches(&self, normalized: &str) -> bool {
    normalize_name(&self.name) == normalized || normalize_name(&self.alias) == normalized
  }
}

#[derive(Debug, Deserialize)]
pub struct RawChampionSummary {
  pub id: i64,
  pub name: String,
  #[serde(default)]
  pub alias: String,
}

impl From<RawChampionSummary> for Champion {
  fn from(raw: RawChampionSummary) -> Self {
    Self {
      id: raw.id,
      name: raw.name,
      alias: raw.alias,
      pickable: None,
      bannable: None,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummonerSpell {
  pub id: i64,
  pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct RawPerk {
  pub id: i64,
  pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
  Pickable,
  Bannable,
}

impl Availability {
  pub fn path(self) -> &'static str {
    match self {
      Self::Pickable => "/lol-champ-select/v1/pickable-champion-ids",
      Self::Bannable => "/lol-champ-select/v1/bannable-champion-ids",
    }
  }
}
