use std::cmp::Ordering;

use crate::model::ResultRow;

/// Selectors rank rows by a score and optionally truncate the result.
pub trait Selector<C> {
    /// Default selection: sort, then truncate to `size()` if set.
    fn select(&self, candidates: Vec<C>) -> Vec<C> {
        let mut sorted = self.sort(candidates);
        if let Some(limit) = self.size() {
            sorted.truncate(limit);
        }
        sorted
    }

    /// Extract the score used for ranking.
    fn score(&self, candidate: &C) -> f64;

    /// Sort by score, highest first. Equal scores keep their incoming
    /// order; NaN scores sink to the end.
    fn sort(&self, candidates: Vec<C>) -> Vec<C> {
        let mut sorted = candidates;
        sorted.sort_by(|a, b| rank_order(self.score(a), self.score(b)));
        sorted
    }

    /// Maximum number of rows to keep. Defaults to no truncation.
    fn size(&self) -> Option<usize> {
        None
    }
}

/// Descending by value, with every NaN after every number.
fn rank_order(a: f64, b: f64) -> Ordering {
    a.is_nan()
        .cmp(&b.is_nan())
        .then_with(|| b.partial_cmp(&a).unwrap_or(Ordering::Equal))
}

/// Ranks result rows by their across-period `Average`.
#[derive(Clone, Copy, Debug, Default)]
pub struct AverageSelector {
    pub limit: Option<usize>,
}

impl AverageSelector {
    pub fn top(limit: usize) -> Self {
        Self { limit: Some(limit) }
    }
}

impl Selector<ResultRow> for AverageSelector {
    fn score(&self, candidate: &ResultRow) -> f64 {
        candidate.average
    }

    fn size(&self) -> Option<usize> {
        self.limit
    }
}
