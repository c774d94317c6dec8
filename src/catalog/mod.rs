// Catalog module - champion names, availability, summoner spells and perks

pub mod runes;
pub mod store;
pub mod types;

#[cfg(test)]
mod tests;

pub use store::{AvailabilityWatch, Catalog, CHAMPION_SUMMARY_PATH, PERKS_PATH, SUMMONER_SPELLS_PATH};
pub use types::{normalize_name, Availability, Champion, SummonerSpell};
