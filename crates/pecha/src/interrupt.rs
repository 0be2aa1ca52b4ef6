use std::future::Future;

/// Exit status after a forced second interrupt.
pub const FORCED_EXIT_CODE: i32 = 130;

/// Waits for interrupts from `next_signal`. The first one calls `cancel`
/// so the run stops after the current page. Returns true on the second
/// one, false if the signal source fails.
pub async fn watch<C, F, Fut>(cancel: C, mut next_signal: F) -> bool
where
    C: FnOnce(),
    F: FnMut() -> Fut,
    Fut: Future<Output = std::io::Result<()>>,
{
    if next_signal().await.is_err() {
        return false;
    }
    tracing::warn!("Interrupt received, stopping after the current page (Ctrl-C again to abort)");
    cancel();

    if next_signal().await.is_err() {
        return false;
    }
    tracing::warn!("Second interrupt received, aborting");
    true
}
