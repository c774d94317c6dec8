// Rune recommendation source

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::types::RuneRecommendation;
use crate::config::Role;
use crate::error::{ConfigError, TransportError};

#[async_trait]
pub trait RuneSource: Send + Sync {
  /// Recommended runes for a champion (display name) played in `role`,
  /// with every name already normalized.
  async fn get_runes(&self, champion: &str, role: Role) -> Result<RuneRecommendation, TransportError>;
}

/// Fetches `{base}/{champion}/{position}` and expects the recommendation
/// JSON contract in return.
pub struct HttpRuneSource {
  http: reqwest::Client,
  base: Url,
}

impl HttpRuneSource {
  pub fn new(base_url: &str) -> Result<Self, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
      field: "rune_source_url".to_string(),
      reason,
    };
    let base = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
    if base.cannot_be_a_base() {
      return Err(invalid(format!("{} cannot be used as a base url", base_url)));
    }
    let http = reqwest::Client::builder()
      .timeout(Duration::from_secs(10))
      .build()
      .map_err(|e| invalid(format!("Failed to create HTTP client: {}", e)))?;
    Ok(Self { http, base })
  }

  pub fn endpoint(&self, champion: &str, role: Role) -> Url {
    let mut url = self.base.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
      segments.pop_if_empty().push(champion).push(role.rune_position());
    }
    url
  }
}

#[async_trait]
impl RuneSource for HttpRuneSource {
  async fn get_runes(&self, champion: &str, role: Role) -> Result<RuneRecommendation, TransportError> {
    let url = self.endpoint(champion, role);
    debug!("[Runes] Fetching recommendation from {}", url);

    let response = self.http.get(url.clone()).send().await.map_err(|e| {
      if e.is_timeout() {
        TransportError::Timeout(url.to_string())
      } else {
        TransportError::Unavailable(format!("{}: {}", url, e))
      }
    })?;
    let status = response.status();
    let text = response
      .text()
      .await
      .map_err(|e| TransportError::Unavailable(format!("Failed to read body of {}: {}", url, e)))?;
    if !status.is_success() {
      return Err(TransportError::Http {
        status: status.as_u16(),
        body: text,
      });
    }

    let recommendation: RuneRecommendation =
      serde_json::from_str(&text).map_err(|e| TransportError::malformed(url.as_str(), e))?;
    Ok(recommendation.normalized())
  }
}
