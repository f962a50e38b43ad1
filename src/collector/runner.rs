use log::{debug, error, info};

use crate::{
    schema::{Movie, MovieCatalog, PageFailure, PageOutcome},
    source::adapter::PageSource,
};

/// Result of one collection run.
///
/// `movies` is the concatenation of every successful page, in page
/// order. Failed pages are listed in `failures` and contribute no
/// records.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Collection {
    pub movies: Vec<Movie>,
    pub pages_requested: u32,
    pub failures: Vec<(u32, PageFailure)>,
}

impl Collection {
    /// Folds page outcomes into a collection.
    ///
    /// Outcomes are consumed in the order given.
    pub fn from_outcomes<I>(outcomes: I) -> Self
    where
        I: IntoIterator<Item = PageOutcome>,
    {
        let mut collection = Collection::default();
        for outcome in outcomes {
            collection.push(outcome);
        }
        collection
    }

    fn push(&mut self, outcome: PageOutcome) {
        self.pages_requested += 1;
        match outcome {
            PageOutcome::Success { movies, .. } => self.movies.extend(movies),
            PageOutcome::Failure { page, reason } => self.failures.push((page, reason)),
        }
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    pub fn into_catalog(self) -> MovieCatalog {
        MovieCatalog {
            movies: self.movies,
        }
    }
}

/// Requests pages `1..=total_pages` one after another.
///
/// GUARANTEES:
/// - Exactly one request per page, strictly ascending
/// - Page N+1 is requested only after page N resolved
/// - One outcome per page, in page order
/// - Never fails: per-page problems become `PageOutcome::Failure`
///
pub async fn fetch_pages(source: &dyn PageSource, total_pages: u32) -> Vec<PageOutcome> {
    let mut outcomes = Vec::new();
    let mut running_total = 0usize;

    for page in 1..=total_pages {
        let outcome = match source.fetch_page(page).await {
            Ok(movies) => PageOutcome::Success { page, movies },
            Err(reason) => PageOutcome::Failure { page, reason },
        };

        running_total += outcome.record_count();
        log_outcome(&outcome, running_total);
        outcomes.push(outcome);
    }

    outcomes
}

/// Runs a full collection against `source`.
pub async fn collect(source: &dyn PageSource, total_pages: u32) -> Collection {
    info!("Collecting {} page(s) from {}", total_pages, source.name());

    let collection = Collection::from_outcomes(fetch_pages(source, total_pages).await);

    info!(
        "Collected {} movies from {} page(s), {} failed",
        collection.len(),
        collection.pages_requested,
        collection.failures.len()
    );

    collection
}

/// Writes the diagnostic line for a single page.
pub fn log_outcome(outcome: &PageOutcome, running_total: usize) {
    match outcome {
        PageOutcome::Success { page, movies } if movies.is_empty() => {
            debug!("Page {}: no movies in response", page);
        }
        PageOutcome::Success { page, movies } => {
            info!(
                "Page {}: Added {} movies (Total so far: {})",
                page,
                movies.len(),
                running_total
            );
        }
        PageOutcome::Failure {
            page,
            reason: PageFailure::Status(code),
        } => {
            error!("Failed to fetch page {}: {}", page, code);
        }
        PageOutcome::Failure { page, reason } => {
            error!("Error fetching page {}: {}", page, reason);
        }
    }
}
