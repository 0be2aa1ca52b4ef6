//! Records stored in `metadata.json`.

use crate::outcome::{FetchOutcome, OutcomeStatus};
use serde::{Deserialize, Serialize};

/// Number of characters of page text kept in a record's preview.
pub const TEXT_PREVIEW_CHARS: usize = 200;

/// One entry of `metadata.json`.
///
/// Every field except `page_id` is optional on read so that datasets
/// written by older scraper versions still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    pub page_id: String,
    #[serde(default)]
    pub image_file: Option<String>,
    #[serde(default)]
    pub image_source: Option<String>,
    #[serde(default)]
    pub text_file: Option<String>,
    #[serde(default)]
    pub text_length: usize,
    #[serde(default)]
    pub text_preview: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub scraped_at: Option<String>,
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub attempts: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<OutcomeStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl PageRecord {
    /// Volume number taken from the leading part of `page_id`.
    pub fn volume(&self) -> Option<u32> {
        self.page_id.split('-').next()?.parse().ok()
    }
}

impl From<&FetchOutcome> for PageRecord {
    fn from(outcome: &FetchOutcome) -> Self {
        let artifacts = &outcome.artifacts;
        Self {
            page_id: outcome.page.to_string(),
            image_file: artifacts.image_file.clone(),
            image_source: artifacts.image_source.map(|s| s.as_str().to_string()),
            text_file: artifacts.text_file.clone(),
            text_length: artifacts.text_length,
            text_preview: artifacts.text_preview.clone(),
            url: artifacts.url.clone(),
            scraped_at: Some(outcome.fetched_at.to_rfc3339()),
            success: outcome.is_success(),
            attempts: artifacts.attempts,
            status: Some(outcome.status),
            message: outcome.message.clone(),
        }
    }
}

/// Truncates `text` to at most `max_chars` characters.
pub fn preview(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
