// Per-run automation context

use std::sync::Arc;

use crate::catalog::Catalog;
use crate::config::AutomationConfig;
use crate::error::AutomationError;
use crate::lcu::Transport;
use crate::runes::{HttpRuneSource, RuneSource};

/// Everything one automation run needs; built once and handed to each component.
#[derive(Clone)]
pub struct AutomationContext {
  pub transport: Arc<dyn Transport>,
  pub catalog: Arc<Catalog>,
  pub config: Arc<AutomationConfig>,
  pub rune_source: Option<Arc<dyn RuneSource>>,
}

impl AutomationContext {
  pub fn new(transport: Arc<dyn Transport>, config: AutomationConfig) -> Self {
    Self {
      catalog: Catalog::new(transport.clone()),
      transport,
      config: Arc::new(config),
      rune_source: None,
    }
  }

  /// Context with the HTTP rune source configured by `rune_source_url`.
  pub fn from_config(transport: Arc<dyn Transport>, config: AutomationConfig) -> Result<Self, AutomationError> {
    let rune_source = match config.rune_source_url.as_deref() {
      Some(url) => Some(Arc::new(HttpRuneSource::new(url)?) as Arc<dyn RuneSource>),
      None => None,
    };
    let mut ctx = Self::new(transport, config);
    ctx.rune_source = rune_source;
    Ok(ctx)
  }

  pub fn with_rune_source(mut self, source: Arc<dyn RuneSource>) -> Self {
    self.rune_source = Some(source);
    self
  }
}
