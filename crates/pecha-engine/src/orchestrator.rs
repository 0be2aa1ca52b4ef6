//! Sequential fetch orchestration.
//!
//! Drives one fetch per resolved page, strictly in order, and folds the
//! outcomes into a [`RunReport`]. Per-page failures never end a run.

use crate::backend::PageFetcher;
use pecha_common::{FetchError, FetchOutcome, OutcomeStatus, PageId, RunReport};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Lifecycle of an orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    NotStarted,
    Running,
    Completed,
}

pub struct FetchOrchestrator {
    state: RunState,
    page_delay: Duration,
    cancel: CancellationToken,
}

impl Default for FetchOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl FetchOrchestrator {
    pub fn new() -> Self {
        Self {
            state: RunState::NotStarted,
            page_delay: Duration::ZERO,
            cancel: CancellationToken::new(),
        }
    }

    /// Pause inserted between two consecutive fetches.
    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    /// Use an externally owned token, e.g. one cancelled on Ctrl-C.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Fetch every page once, in order.
    ///
    /// Cancellation is checked before each fetch and during the inter-page
    /// pause; a fetch already in flight runs to completion. The returned
    /// report then holds only the pages processed so far.
    pub async fn run<F: PageFetcher + ?Sized>(
        &mut self,
        fetcher: &mut F,
        pages: &[PageId],
    ) -> RunReport {
        self.state = RunState::Running;
        let mut builder = RunReport::builder(pages.len());
        let mut interrupted = false;

        for (index, page) in pages.iter().enumerate() {
            if self.cancel.is_cancelled() {
                interrupted = true;
                break;
            }

            if index > 0 && !self.page_delay.is_zero() {
                tokio::select! {
                    _ = tokio::time::sleep(self.page_delay) => {}
                    _ = self.cancel.cancelled() => {
                        interrupted = true;
                        break;
                    }
                }
            }

            info!("[{}/{}] Fetching page {}", index + 1, pages.len(), page);
            let outcome = match fetcher.fetch(page).await {
                Ok(outcome) => outcome,
                Err(e) => FetchOutcome::failed(page.clone(), e.to_string()),
            };
            log_outcome(&outcome);
            builder.record(outcome);
        }

        if interrupted {
            warn!(
                "Run interrupted after {} of {} pages",
                builder.len(),
                pages.len()
            );
        }

        self.state = RunState::Completed;
        builder.finish(interrupted)
    }
}

fn log_outcome(outcome: &FetchOutcome) {
    let message = outcome.message.as_deref().unwrap_or_default();
    match outcome.status {
        OutcomeStatus::Success => info!("Page {} captured", outcome.page),
        OutcomeStatus::Partial => warn!("Page {} partially captured: {}", outcome.page, message),
        OutcomeStatus::Failed => warn!("Page {} failed: {}", outcome.page, message),
    }
}

/// Launch the fetcher, run every page, then close the fetcher.
///
/// The fetcher is closed whether or not the run was interrupted. Only a
/// failed launch is returned as an error.
pub async fn run_session<F: PageFetcher + ?Sized>(
    fetcher: &mut F,
    orchestrator: &mut FetchOrchestrator,
    pages: &[PageId],
) -> Result<RunReport, FetchError> {
    if let Err(e) = fetcher.launch().await {
        if let Err(close_err) = fetcher.close().await {
            warn!("Failed to release fetcher after launch error: {}", close_err);
        }
        return Err(e);
    }

    let report = orchestrator.run(fetcher, pages).await;

    if let Err(e) = fetcher.close().await {
        warn!("Failed to close fetcher: {}", e);
    }
    Ok(report)
}
