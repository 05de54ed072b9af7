//! Inventory threshold engine.
//!
//! Turns a log of fulfillment events into a per-SKU "inventory threshold":
//! the quantity that can reliably be found on the shelf before orders stop
//! being served in full. Thresholds are computed per SKU per day, averaged
//! per period and ranked, so SKUs whose threshold is falling stand out as
//! stockout risks.
//!
//! Everything here is a pure in-memory transform; reading files and
//! rendering results live in `threshold-pipeline`.

pub mod aggregate;
pub mod config;
pub mod daily;
pub mod error;
pub mod model;
pub mod period;
pub mod selector;
pub mod trend;

pub use aggregate::{aggregate, weekly_cells, Aggregator};
pub use config::ThresholdConfig;
pub use daily::{extract, extract_daily};
pub use error::{ThresholdError, ThresholdResult};
pub use model::{DailyThreshold, FulfillmentEvent, ResultRow, ThresholdTable, WeeklyCell};
pub use period::{Period, PeriodKey};
pub use selector::{AverageSelector, Selector};
pub use trend::TrendDirection;

/// Run extraction, aggregation and ranking over a whole dataset.
///
/// An empty event list, like an empty set of daily thresholds, yields
/// [`ThresholdError::EmptyDataset`].
pub fn compute(
    events: &[FulfillmentEvent],
    config: &ThresholdConfig,
) -> ThresholdResult<ThresholdTable> {
    if events.is_empty() {
        return Err(ThresholdError::EmptyDataset("no fulfillment events".into()));
    }

    let daily = extract_daily(events, config.parallel);
    let mut table = Aggregator::new(config.period)
        .with_trend_tolerance(config.trend_tolerance)
        .aggregate(&daily)?;

    if let Some(limit) = config.top {
        table.rows = AverageSelector::top(limit).select(table.rows);
    }
    Ok(table)
}
