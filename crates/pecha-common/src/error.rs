use crate::page::ParseError;
use thiserror::Error;

/// Fatal errors raised while turning range options into a page sequence.
///
/// Either one aborts the run before any page is fetched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error(transparent)]
    InvalidIdentifier(#[from] ParseError),

    #[error("page selection is empty: check --pages, --start-page/--end-page and --start-vol/--end-vol")]
    EmptyRange,
}

/// Errors raised by a page fetcher.
///
/// The orchestrator turns these into failed outcomes; they never end a run.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Fetcher not ready")]
    NotReady,

    #[error("Launch error: {0}")]
    Launch(String),

    #[error("Navigation error: {0}")]
    Navigation(String),

    #[error("Script evaluation error: {0}")]
    Evaluation(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}
