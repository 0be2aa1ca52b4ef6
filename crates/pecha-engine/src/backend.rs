use async_trait::async_trait;
use pecha_common::{FetchError, FetchOutcome, PageId};

/// The PageFetcher trait is the interface every page source implements.
///
/// A fetcher owns whatever session it needs (a browser, an HTTP client).
/// The session is acquired in `launch` and released in `close`; the
/// orchestrator only ever calls `fetch`, one page at a time.
#[async_trait]
pub trait PageFetcher: Send {
    /// Acquire the session (start a browser, open a connection, ...).
    async fn launch(&mut self) -> Result<(), FetchError> {
        Ok(())
    }

    /// Release the session. Must be safe to call after a failed launch.
    async fn close(&mut self) -> Result<(), FetchError> {
        Ok(())
    }

    /// Retrieve and persist every artifact of one page.
    ///
    /// Partial captures are reported through the outcome status; an `Err`
    /// means the fetch could not run at all.
    async fn fetch(&mut self, page: &PageId) -> Result<FetchOutcome, FetchError>;
}
