// Automation module - champ select behaviors and the run loop

pub mod behaviors;
pub mod context;
pub mod finalization;
pub mod runner;

#[cfg(test)]
mod tests;

pub use behaviors::{action_path, BehaviorKind, ChampionBehavior};
pub use context::AutomationContext;
pub use finalization::{FinalizationBehavior, MY_SELECTION_PATH};
pub use runner::{run, RunOutcome};
