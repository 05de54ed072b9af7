use threshold_core::{ResultRow, TrendDirection};

use crate::source::type_label;

/// Result of a filter operation, partitioning rows into kept and removed.
pub struct FilterResult<C> {
    pub kept: Vec<C>,
    pub removed: Vec<C>,
}

/// Filters run sequentially over the ranked rows. Kept rows keep their
/// relative order.
pub trait RowFilter: Send + Sync {
    fn filter(&self, rows: Vec<ResultRow>) -> FilterResult<ResultRow>;

    /// Returns a stable name for logging.
    fn name(&self) -> &str {
        type_label::<Self>()
    }
}

/// Keeps only SKUs whose threshold is falling.
#[derive(Default)]
pub struct WorseningFilter;

impl RowFilter for WorseningFilter {
    fn filter(&self, rows: Vec<ResultRow>) -> FilterResult<ResultRow> {
        let (kept, removed) = rows
            .into_iter()
            .partition(|r| r.trend == TrendDirection::Worsening);
        FilterResult { kept, removed }
    }
}

/// Drops SKUs whose across-period average is below a floor.
pub struct MinAverageFilter {
    pub min_average: f64,
}

impl MinAverageFilter {
    pub fn new(min_average: f64) -> Self {
        Self { min_average }
    }
}

impl RowFilter for MinAverageFilter {
    fn filter(&self, rows: Vec<ResultRow>) -> FilterResult<ResultRow> {
        let (kept, removed) = rows
            .into_iter()
            .partition(|r| r.average >= self.min_average);
        FilterResult { kept, removed }
    }
}
