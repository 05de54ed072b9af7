//! Period averaging, SKU x period pivot and ranking.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::config::DEFAULT_TREND_TOLERANCE;
use crate::error::{ThresholdError, ThresholdResult};
use crate::model::{DailyThreshold, ResultRow, ThresholdTable, WeeklyCell};
use crate::period::{Period, PeriodKey};
use crate::selector::{AverageSelector, Selector};
use crate::trend;

/// Running sum and count for one SKU x period bucket.
#[derive(Clone, Copy, Debug, Default)]
struct Bucket {
    sum: f64,
    days: usize,
}

impl Bucket {
    fn mean(&self) -> f64 {
        self.sum / self.days as f64
    }
}

/// Buckets per SKU, SKUs kept in first-seen order.
struct Grouped<'a> {
    order: Vec<&'a str>,
    buckets: HashMap<&'a str, BTreeMap<PeriodKey, Bucket>>,
}

fn group<'a>(daily: &'a [DailyThreshold], period: Period) -> Grouped<'a> {
    let mut order = Vec::new();
    let mut buckets: HashMap<&str, BTreeMap<PeriodKey, Bucket>> = HashMap::new();
    for record in daily {
        let per_sku = buckets.entry(record.sku.as_str()).or_insert_with(|| {
            order.push(record.sku.as_str());
            BTreeMap::new()
        });
        let bucket = per_sku.entry(period.key(record.day)).or_default();
        bucket.sum += record.threshold;
        bucket.days += 1;
    }
    Grouped { order, buckets }
}

/// Mean daily threshold per SKU x period, SKU first-seen order then
/// oldest period first.
pub fn weekly_cells(daily: &[DailyThreshold], period: Period) -> Vec<WeeklyCell> {
    let grouped = group(daily, period);
    grouped
        .order
        .iter()
        .flat_map(|sku| {
            grouped.buckets[sku].iter().map(move |(key, bucket)| WeeklyCell {
                sku: sku.to_string(),
                period: *key,
                average_threshold: bucket.mean(),
            })
        })
        .collect()
}

/// Builds the ranked SKU x period table from daily thresholds.
#[derive(Clone, Copy, Debug)]
pub struct Aggregator {
    pub period: Period,
    pub trend_tolerance: f64,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self {
            period: Period::IsoWeek,
            trend_tolerance: DEFAULT_TREND_TOLERANCE,
        }
    }
}

impl Aggregator {
    pub fn new(period: Period) -> Self {
        Self {
            period,
            ..Self::default()
        }
    }

    pub fn with_trend_tolerance(mut self, tolerance: f64) -> Self {
        self.trend_tolerance = tolerance;
        self
    }

    /// Average per period, pivot, append `Average` and rank descending.
    ///
    /// Columns are every period observed in the data, oldest first. A SKU
    /// with no days in a period gets `None` for that column. Rows with
    /// equal averages keep SKU first-seen order.
    pub fn aggregate(&self, daily: &[DailyThreshold]) -> ThresholdResult<ThresholdTable> {
        if daily.is_empty() {
            return Err(ThresholdError::EmptyDataset(
                "no daily thresholds to aggregate".into(),
            ));
        }

        let grouped = group(daily, self.period);
        let columns: Vec<PeriodKey> = grouped
            .buckets
            .values()
            .flat_map(|per_sku| per_sku.keys().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let rows: Vec<ResultRow> = grouped
            .order
            .iter()
            .map(|sku| {
                let per_sku = &grouped.buckets[sku];
                let cells: Vec<Option<f64>> = columns
                    .iter()
                    .map(|key| per_sku.get(key).map(Bucket::mean))
                    .collect();
                let observed: Vec<f64> = cells.iter().filter_map(|c| *c).collect();
                let average = observed.iter().sum::<f64>() / observed.len() as f64;
                ResultRow {
                    sku: sku.to_string(),
                    trend: trend::classify(&observed, self.trend_tolerance),
                    cells,
                    average,
                }
            })
            .collect();

        log::debug!(
            "aggregated {} daily thresholds into {} SKUs x {} {} columns",
            daily.len(),
            rows.len(),
            columns.len(),
            self.period
        );

        Ok(ThresholdTable {
            columns,
            rows: AverageSelector::default().select(rows),
        })
    }
}

/// [`Aggregator::aggregate`] with the default trend tolerance.
pub fn aggregate(daily: &[DailyThreshold], period: Period) -> ThresholdResult<ThresholdTable> {
    Aggregator::new(period).aggregate(daily)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dt(sku: &str, (y, m, d): (i32, u32, u32), threshold: f64) -> DailyThreshold {
        DailyThreshold {
            sku: sku.into(),
            day: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            threshold,
        }
    }

    fn week(year: i32, week: u32) -> PeriodKey {
        PeriodKey::Week { year, week }
    }

    #[test]
    fn averages_days_within_a_week() {
        // Monday and Wednesday of 2024-W10.
        let daily = vec![dt("A", (2024, 3, 4), 15.0), dt("A", (2024, 3, 6), 10.0)];
        let cells = weekly_cells(&daily, Period::IsoWeek);
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].period, week(2024, 10));
        assert_eq!(cells[0].average_threshold, 12.5);
    }

    #[test]
    fn pivot_leaves_missing_weeks_empty() {
        let daily = vec![
            dt("A", (2024, 3, 4), 10.0),
            dt("A", (2024, 3, 11), 20.0),
            dt("B", (2024, 3, 12), 0.0),
        ];
        let table = aggregate(&daily, Period::IsoWeek).unwrap();
        assert_eq!(table.columns, vec![week(2024, 10), week(2024, 11)]);

        let b = table.row("B").unwrap();
        assert_eq!(b.cells, vec![None, Some(0.0)]);
        assert_eq!(b.average, 0.0);
        assert_eq!(table.cell("B", &week(2024, 10)), None);
        assert_eq!(table.cell("B", &week(2024, 11)), Some(0.0));
    }

    #[test]
    fn average_ignores_missing_cells() {
        let daily = vec![
            dt("A", (2024, 3, 4), 10.0),
            dt("A", (2024, 3, 18), 20.0),
            dt("B", (2024, 3, 11), 1.0),
        ];
        let table = aggregate(&daily, Period::IsoWeek).unwrap();
        let a = table.row("A").unwrap();
        assert_eq!(a.cells, vec![Some(10.0), None, Some(20.0)]);
        assert_eq!(a.average, 15.0);
    }

    #[test]
    fn rows_ranked_by_average_with_first_seen_ties() {
        let daily = vec![
            dt("LOW", (2024, 3, 4), 1.0),
            dt("TIE1", (2024, 3, 4), 5.0),
            dt("HIGH", (2024, 3, 4), 9.0),
            dt("TIE2", (2024, 3, 5), 5.0),
        ];
        let table = aggregate(&daily, Period::IsoWeek).unwrap();
        let order: Vec<&str> = table.rows.iter().map(|r| r.sku.as_str()).collect();
        assert_eq!(order, vec!["HIGH", "TIE1", "TIE2", "LOW"]);
    }

    #[test]
    fn month_period_groups_by_calendar_month() {
        let daily = vec![
            dt("A", (2024, 1, 31), 4.0),
            dt("A", (2024, 2, 1), 8.0),
            dt("A", (2024, 2, 29), 2.0),
        ];
        let table = aggregate(&daily, Period::Month).unwrap();
        assert_eq!(
            table.columns.iter().map(|c| c.label()).collect::<Vec<_>>(),
            vec!["2024-01", "2024-02"]
        );
        let a = table.row("A").unwrap();
        assert_eq!(a.cells, vec![Some(4.0), Some(5.0)]);
        assert_eq!(a.average, 4.5);
    }

    #[test]
    fn dropping_threshold_is_flagged_worsening() {
        let daily = vec![
            dt("A", (2024, 3, 4), 20.0),
            dt("A", (2024, 3, 11), 20.0),
            dt("A", (2024, 3, 18), 5.0),
        ];
        let table = aggregate(&daily, Period::IsoWeek).unwrap();
        assert_eq!(
            table.row("A").unwrap().trend,
            crate::trend::TrendDirection::Worsening
        );
    }

    #[test]
    fn empty_input_is_empty_dataset_error() {
        let err = aggregate(&[], Period::IsoWeek).unwrap_err();
        assert!(err.is_empty_dataset());
    }
}
