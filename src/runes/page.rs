// Rune page selection and editing

use http::Method;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;
use tracing::info;

use super::types::{RunePageRecord, RuneSelection};
use crate::error::{AutomationError, TransportError};
use crate::lcu::{get_json, Transport};

/// Name of the page the automation owns.
pub const RUNE_PAGE_NAME: &str = "DON'T EDIT THIS PAGE";
pub const PAGES_PATH: &str = "/lol-perks/v1/pages";
pub const CURRENT_PAGE_PATH: &str = "/lol-perks/v1/currentpage";

/// Edits one owned rune page, adopting an editable page the first time.
pub struct RunePageEditor {
  transport: Arc<dyn Transport>,
  working: AsyncMutex<Option<RunePageRecord>>,
}

fn page_path(id: i64) -> String {
  format!("{}/{}", PAGES_PATH, id)
}

/// First editable page, superseded by any later page that is editable and valid.
fn adoptable_page(pages: Vec<RunePageRecord>) -> Option<RunePageRecord> {
  pages.into_iter().fold(None, |chosen, page| match chosen {
    None if page.is_editable => Some(page),
    None => None,
    Some(_) if page.is_editable && page.is_valid => Some(page),
    keep => keep,
  })
}

impl RunePageEditor {
  pub fn new(transport: Arc<dyn Transport>) -> Self {
    Self {
      transport,
      working: AsyncMutex::new(None),
    }
  }

  async fn put_page(&self, page: &RunePageRecord) -> Result<(), TransportError> {
    let path = page_path(page.id);
    let body = serde_json::to_value(page).map_err(|e| TransportError::malformed(&path, e))?;
    self.transport.request(Method::PUT, &path, Some(body)).await?;
    Ok(())
  }

  async fn working_page(&self) -> Result<RunePageRecord, AutomationError> {
    let mut working = self.working.lock().await;
    if let Some(page) = working.as_ref() {
      return Ok(page.clone());
    }

    let pages: Vec<RunePageRecord> = get_json(&*self.transport, PAGES_PATH).await?;
    let page = match pages.iter().find(|p| p.name == RUNE_PAGE_NAME).cloned() {
      Some(page) => page,
      None => {
        let mut page = adoptable_page(pages).ok_or(AutomationError::NoEditableRunePage)?;
        info!("[Runes] Taking over rune page {} ({})", page.id, page.name);
        page.name = RUNE_PAGE_NAME.to_string();
        self.put_page(&page).await?;
        page
      }
    };
    *working = Some(page.clone());
    Ok(page)
  }

  /// Write the selection into the owned page and make it the current page.
  pub async fn apply(&self, selection: &RuneSelection) -> Result<i64, AutomationError> {
    let mut page = self.working_page().await?;
    page
      .rest
      .insert("primaryStyleId".to_string(), Value::from(selection.primary_style_id));
    page
      .rest
      .insert("subStyleId".to_string(), Value::from(selection.sub_style_id));
    page.rest.insert(
      "selectedPerkIds".to_string(),
      Value::from(selection.selected_perk_ids.clone()),
    );
    self.put_page(&page).await?;
    *self.working.lock().await = Some(page.clone());

    self
      .transport
      .request(Method::PUT, CURRENT_PAGE_PATH, Some(Value::from(page.id)))
      .await?;
    info!("[Runes] Rune page {} applied", page.id);
    Ok(page.id)
  }
}
