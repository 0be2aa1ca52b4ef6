pub mod error;
pub mod formatter;
pub mod metadata;
pub mod outcome;
pub mod page;
pub mod report;

pub use error::{FetchError, ResolveError};
pub use outcome::{Artifacts, FetchOutcome, ImageSource, OutcomeStatus};
pub use page::{PageId, ParseError, Side};
pub use report::{ReportBuilder, RunReport};
