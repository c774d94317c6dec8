// Champ select module - session snapshots and the observation loop

pub mod session;
pub mod types;

#[cfg(test)]
mod tests;

pub use session::{
  fetch_snapshot, ChampSelectSession, HandlerFailure, HandlerRegistration, ObservationState,
  SessionEnd, SnapshotHandler,
};
pub use types::{Action, ActionKind, Participant, Phase, SessionSnapshot, Turn, SESSION_PATH};
