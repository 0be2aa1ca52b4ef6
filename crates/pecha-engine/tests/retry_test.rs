use pecha_engine::retry::{RetryPolicy, Retryable, with_retry};
use std::time::Duration;

#[derive(Debug, PartialEq)]
struct Capture {
    complete: bool,
}

impl Retryable for Capture {
    fn should_retry(&self) -> bool {
        !self.complete
    }
}

fn policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        delay: Duration::from_secs(5),
    }
}

#[tokio::test(start_paused = true)]
async fn test_stops_on_first_complete_attempt() {
    let mut calls = Vec::new();
    let result = with_retry(&policy(3), "page 1-1a", |attempt| {
        calls.push(attempt);
        async move { Capture { complete: attempt == 2 } }
    })
    .await;

    assert_eq!(result, Capture { complete: true });
    assert_eq!(calls, vec![1, 2]);
}

#[tokio::test(start_paused = true)]
async fn test_returns_last_attempt_when_exhausted() {
    let mut calls = 0;
    let start = tokio::time::Instant::now();
    let result = with_retry(&policy(3), "page 1-1a", |_| {
        calls += 1;
        async { Capture { complete: false } }
    })
    .await;

    assert_eq!(result, Capture { complete: false });
    assert_eq!(calls, 3);
    assert!(start.elapsed() >= Duration::from_secs(10));
}

#[tokio::test(start_paused = true)]
async fn test_errors_are_retried() {
    let result: Result<Capture, String> = with_retry(&policy(2), "page 1-1a", |attempt| async move {
        if attempt == 1 {
            Err("browser crashed".to_string())
        } else {
            Ok(Capture { complete: true })
        }
    })
    .await;

    assert_eq!(result, Ok(Capture { complete: true }));
}

#[tokio::test(start_paused = true)]
async fn test_zero_attempts_still_runs_once() {
    let mut calls = 0;
    let _ = with_retry(&policy(0), "page 1-1a", |_| {
        calls += 1;
        async { Capture { complete: false } }
    })
    .await;
    assert_eq!(calls, 1);
}
