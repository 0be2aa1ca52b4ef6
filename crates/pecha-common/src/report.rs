use crate::outcome::{FetchOutcome, OutcomeStatus};
use crate::page::PageId;

/// Accumulates outcomes while a run is in progress.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    requested: usize,
    outcomes: Vec<FetchOutcome>,
}

impl ReportBuilder {
    pub fn new(requested: usize) -> Self {
        Self {
            requested,
            outcomes: Vec::with_capacity(requested),
        }
    }

    pub fn record(&mut self, outcome: FetchOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Freezes the collected outcomes into a report.
    pub fn finish(self, interrupted: bool) -> RunReport {
        let count = |status| self.outcomes.iter().filter(|o| o.status == status).count();
        let success_count = count(OutcomeStatus::Success);
        let partial_count = count(OutcomeStatus::Partial);
        let failed_count = count(OutcomeStatus::Failed);

        RunReport {
            requested: self.requested,
            interrupted,
            success_count,
            partial_count,
            failed_count,
            outcomes: self.outcomes,
        }
    }
}

/// Outcomes of one run, in processing order, with their aggregate counts.
#[derive(Debug, Clone)]
pub struct RunReport {
    requested: usize,
    interrupted: bool,
    success_count: usize,
    partial_count: usize,
    failed_count: usize,
    outcomes: Vec<FetchOutcome>,
}

impl RunReport {
    pub fn builder(requested: usize) -> ReportBuilder {
        ReportBuilder::new(requested)
    }

    pub fn outcomes(&self) -> &[FetchOutcome] {
        &self.outcomes
    }

    /// Number of pages actually processed.
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    /// Number of pages the run was asked to process.
    pub fn requested(&self) -> usize {
        self.requested
    }

    /// True when the run stopped before processing every requested page.
    pub fn interrupted(&self) -> bool {
        self.interrupted
    }

    pub fn success_count(&self) -> usize {
        self.success_count
    }

    pub fn partial_count(&self) -> usize {
        self.partial_count
    }

    pub fn failed_count(&self) -> usize {
        self.failed_count
    }

    pub fn outcome_for(&self, page: &PageId) -> Option<&FetchOutcome> {
        self.outcomes.iter().find(|o| &o.page == page)
    }
}
