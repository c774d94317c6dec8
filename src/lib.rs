// champ-pilot: champion select automation for the League client

pub mod automation;
pub mod catalog;
pub mod champ_select;
pub mod config;
pub mod error;
pub mod lcu;
pub mod lobby;
pub mod logging;
pub mod runes;

#[cfg(test)]
pub mod test_support;

pub use automation::{run, AutomationContext, RunOutcome};
pub use config::{load_config, AutomationConfig};
pub use error::{AutomationError, ConfigError, ErrorClass, TransportError};
