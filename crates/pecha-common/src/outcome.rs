use crate::page::PageId;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Classification of one page fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// Image, text and raw markup were all captured.
    Success,
    /// At least one artifact was captured, but not all of them.
    Partial,
    /// Nothing was captured.
    Failed,
}

/// Where a page image came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSource {
    Canvas,
    Img,
    Screenshot,
}

impl ImageSource {
    pub fn as_str(self) -> &'static str {
        match self {
            ImageSource::Canvas => "canvas",
            ImageSource::Img => "img",
            ImageSource::Screenshot => "screenshot",
        }
    }
}

/// Files and details captured for one page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifacts {
    pub image_file: Option<String>,
    pub image_source: Option<ImageSource>,
    pub text_file: Option<String>,
    pub text_length: usize,
    pub text_preview: Option<String>,
    pub html_file: Option<String>,
    pub url: Option<String>,
    pub attempts: u32,
}

impl Artifacts {
    /// Names of the artifacts that were not captured.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.image_file.is_none() {
            missing.push("image");
        }
        if self.text_file.is_none() {
            missing.push("text");
        }
        if self.html_file.is_none() {
            missing.push("html");
        }
        missing
    }

    /// All three artifacts present is a success, none is a failure,
    /// anything in between is partial.
    pub fn status(&self) -> OutcomeStatus {
        match self.missing().len() {
            0 => OutcomeStatus::Success,
            3 => OutcomeStatus::Failed,
            _ => OutcomeStatus::Partial,
        }
    }
}

/// Result of attempting to retrieve one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchOutcome {
    pub page: PageId,
    pub status: OutcomeStatus,
    pub message: Option<String>,
    pub artifacts: Artifacts,
    pub fetched_at: DateTime<Local>,
}

impl FetchOutcome {
    pub fn new(page: PageId, status: OutcomeStatus) -> Self {
        Self {
            page,
            status,
            message: None,
            artifacts: Artifacts::default(),
            fetched_at: Local::now(),
        }
    }

    /// Classifies an outcome from what was actually captured.
    ///
    /// Partial outcomes get a message naming the missing artifacts.
    pub fn from_artifacts(page: PageId, artifacts: Artifacts) -> Self {
        let status = artifacts.status();
        let message = match status {
            OutcomeStatus::Success => None,
            _ => Some(format!("missing {}", artifacts.missing().join(", "))),
        };
        Self {
            page,
            status,
            message,
            artifacts,
            fetched_at: Local::now(),
        }
    }

    pub fn failed(page: PageId, message: impl Into<String>) -> Self {
        Self::new(page, OutcomeStatus::Failed).with_message(message)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_artifacts(mut self, artifacts: Artifacts) -> Self {
        self.artifacts = artifacts;
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }
}
