// Runes module - recommendation source and rune page editing

pub mod page;
pub mod source;
pub mod types;

#[cfg(test)]
mod tests;

pub use page::{RunePageEditor, CURRENT_PAGE_PATH, PAGES_PATH, RUNE_PAGE_NAME};
pub use source::{HttpRuneSource, RuneSource};
pub use types::{RunePageRecord, RuneRecommendation, RuneSelection};
