pub mod analyze;
pub mod backend;
pub mod config;
pub mod orchestrator;
pub mod resolver;
pub mod retry;
pub mod store;

pub use pecha_common::formatter;
pub use pecha_common::metadata;
pub use pecha_common::{
    Artifacts, FetchError, FetchOutcome, ImageSource, OutcomeStatus, PageId, ResolveError,
    RunReport, Side,
};
