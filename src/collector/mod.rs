/// Collector module
///
/// Turns a page count into one ordered movie collection:
/// - Requests pages sequentially through a `PageSource`
/// - Records one `PageOutcome` per page
/// - Folds outcomes into a `Collection`
///
/// Nothing here knows about HTTP or blob storage.
pub mod runner;

pub use runner::{Collection, collect};
