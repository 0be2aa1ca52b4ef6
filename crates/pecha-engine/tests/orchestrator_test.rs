use async_trait::async_trait;
use pecha_engine::backend::PageFetcher;
use pecha_engine::orchestrator::{FetchOrchestrator, RunState, run_session};
use pecha_engine::resolver::{PageSelection, resolve};
use pecha_engine::{FetchError, FetchOutcome, OutcomeStatus, PageId};
use std::collections::HashMap;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Scripted fetcher: returns the configured status per page, `Err` for
/// pages listed in `errors`, success otherwise.
#[derive(Default)]
struct ScriptedFetcher {
    statuses: HashMap<String, OutcomeStatus>,
    errors: Vec<String>,
    calls: Vec<String>,
    launched: bool,
    closed: bool,
    fail_launch: bool,
    cancel_after: Option<(usize, CancellationToken)>,
}

impl ScriptedFetcher {
    fn failing_on(page: &str) -> Self {
        Self {
            errors: vec![page.to_string()],
            ..Self::default()
        }
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn launch(&mut self) -> Result<(), FetchError> {
        if self.fail_launch {
            return Err(FetchError::Launch("no browser".into()));
        }
        self.launched = true;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), FetchError> {
        self.closed = true;
        Ok(())
    }

    async fn fetch(&mut self, page: &PageId) -> Result<FetchOutcome, FetchError> {
        let key = page.to_string();
        self.calls.push(key.clone());

        if let Some((after, token)) = &self.cancel_after {
            if self.calls.len() == *after {
                token.cancel();
            }
        }

        if self.errors.contains(&key) {
            return Err(FetchError::Navigation(format!("timeout loading {}", key)));
        }
        let status = self
            .statuses
            .get(&key)
            .copied()
            .unwrap_or(OutcomeStatus::Success);
        Ok(FetchOutcome::new(page.clone(), status))
    }
}

#[tokio::test]
async fn test_single_page_success() {
    let pages = resolve(&PageSelection::explicit(["1-1b"])).unwrap();
    let mut fetcher = ScriptedFetcher::default();
    let mut orchestrator = FetchOrchestrator::new();
    assert_eq!(orchestrator.state(), RunState::NotStarted);

    let report = orchestrator.run(&mut fetcher, &pages).await;

    assert_eq!(orchestrator.state(), RunState::Completed);
    assert_eq!(report.total(), 1);
    assert_eq!(report.success_count(), 1);
    assert_eq!(report.partial_count(), 0);
    assert_eq!(report.failed_count(), 0);
    assert!(!report.interrupted());
}

#[tokio::test]
async fn test_failure_does_not_abort_run() {
    let pages = resolve(&PageSelection::range(1, 1, 1, 2)).unwrap();
    let mut fetcher = ScriptedFetcher::failing_on("1-2a");

    let report = FetchOrchestrator::new().run(&mut fetcher, &pages).await;

    assert_eq!(report.total(), 4);
    assert_eq!(report.success_count(), 3);
    assert_eq!(report.partial_count(), 0);
    assert_eq!(report.failed_count(), 1);
    assert_eq!(fetcher.calls, vec!["1-1a", "1-1b", "1-2a", "1-2b"]);

    let failed = report.outcome_for(&"1-2a".parse().unwrap()).unwrap();
    assert_eq!(failed.status, OutcomeStatus::Failed);
    assert!(failed.message.as_deref().unwrap().contains("timeout loading 1-2a"));
}

#[tokio::test]
async fn test_deduplicated_selection_fetches_once() {
    let pages = resolve(&PageSelection::explicit(["1-1b", "1-1b"])).unwrap();
    let mut fetcher = ScriptedFetcher::default();

    let report = FetchOrchestrator::new().run(&mut fetcher, &pages).await;

    assert_eq!(report.total(), 1);
    assert_eq!(fetcher.calls, vec!["1-1b"]);
}

#[tokio::test]
async fn test_mixed_statuses_are_counted() {
    let pages = resolve(&PageSelection::range(1, 1, 1, 3)).unwrap();
    let mut fetcher = ScriptedFetcher::default();
    fetcher
        .statuses
        .insert("1-1b".into(), OutcomeStatus::Partial);
    fetcher
        .statuses
        .insert("1-3a".into(), OutcomeStatus::Partial);
    fetcher.statuses.insert("1-3b".into(), OutcomeStatus::Failed);
    fetcher.errors.push("1-2b".into());

    let report = FetchOrchestrator::new().run(&mut fetcher, &pages).await;

    assert_eq!(report.total(), 6);
    assert_eq!(report.success_count(), 2);
    assert_eq!(report.partial_count(), 2);
    assert_eq!(report.failed_count(), 2);
    let order: Vec<String> = report.outcomes().iter().map(|o| o.page.to_string()).collect();
    assert_eq!(order, vec!["1-1a", "1-1b", "1-2a", "1-2b", "1-3a", "1-3b"]);
}

#[tokio::test]
async fn test_every_page_failing_still_reports() {
    let pages = resolve(&PageSelection::range(1, 1, 1, 1)).unwrap();
    let mut fetcher = ScriptedFetcher::default();
    fetcher.errors = vec!["1-1a".into(), "1-1b".into()];

    let report = FetchOrchestrator::new().run(&mut fetcher, &pages).await;

    assert_eq!(report.total(), 2);
    assert_eq!(report.failed_count(), 2);
}

#[tokio::test]
async fn test_cancellation_stops_before_next_fetch() {
    let pages = resolve(&PageSelection::range(1, 1, 1, 5)).unwrap();
    let token = CancellationToken::new();
    let mut fetcher = ScriptedFetcher {
        cancel_after: Some((3, token.clone())),
        ..ScriptedFetcher::default()
    };

    let mut orchestrator = FetchOrchestrator::new().with_cancellation(token);
    let report = orchestrator.run(&mut fetcher, &pages).await;

    assert_eq!(fetcher.calls.len(), 3);
    assert_eq!(report.total(), 3);
    assert_eq!(report.requested(), 10);
    assert!(report.interrupted());
    assert_eq!(orchestrator.state(), RunState::Completed);
}

#[tokio::test]
async fn test_cancelled_before_start_fetches_nothing() {
    let pages = resolve(&PageSelection::explicit(["1-1a"])).unwrap();
    let mut orchestrator = FetchOrchestrator::new();
    orchestrator.cancellation_token().cancel();
    let mut fetcher = ScriptedFetcher::default();

    let report = orchestrator.run(&mut fetcher, &pages).await;

    assert!(fetcher.calls.is_empty());
    assert_eq!(report.total(), 0);
    assert!(report.interrupted());
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_interrupts_page_delay() {
    let pages = resolve(&PageSelection::range(1, 1, 1, 2)).unwrap();
    let token = CancellationToken::new();
    let mut fetcher = ScriptedFetcher::default();

    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        canceller.cancel();
    });

    let start = tokio::time::Instant::now();
    let mut orchestrator = FetchOrchestrator::new()
        .with_page_delay(Duration::from_secs(3600))
        .with_cancellation(token);
    let report = orchestrator.run(&mut fetcher, &pages).await;

    assert_eq!(report.total(), 1);
    assert_eq!(fetcher.calls, vec!["1-1a"]);
    assert!(report.interrupted());
    assert!(start.elapsed() < Duration::from_secs(3600));
}

#[tokio::test(start_paused = true)]
async fn test_page_delay_between_fetches() {
    let pages = resolve(&PageSelection::range(1, 1, 1, 1)).unwrap();
    let mut fetcher = ScriptedFetcher::default();
    let start = tokio::time::Instant::now();

    let report = FetchOrchestrator::new()
        .with_page_delay(Duration::from_secs(2))
        .run(&mut fetcher, &pages)
        .await;

    assert_eq!(report.total(), 2);
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(2));
    assert!(elapsed < Duration::from_secs(4));
}

#[tokio::test]
async fn test_session_launches_and_closes() {
    let pages = resolve(&PageSelection::explicit(["1-1a"])).unwrap();
    let mut fetcher = ScriptedFetcher::default();
    let mut orchestrator = FetchOrchestrator::new();

    let report = run_session(&mut fetcher, &mut orchestrator, &pages)
        .await
        .unwrap();

    assert_eq!(report.total(), 1);
    assert!(fetcher.launched);
    assert!(fetcher.closed);
}

#[tokio::test]
async fn test_session_launch_failure_fetches_nothing() {
    let pages = resolve(&PageSelection::explicit(["1-1a"])).unwrap();
    let mut fetcher = ScriptedFetcher {
        fail_launch: true,
        ..ScriptedFetcher::default()
    };
    let mut orchestrator = FetchOrchestrator::new();

    let err = run_session(&mut fetcher, &mut orchestrator, &pages)
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Launch(_)));
    assert!(fetcher.calls.is_empty());
    assert!(fetcher.closed);
    assert_eq!(orchestrator.state(), RunState::NotStarted);
}
