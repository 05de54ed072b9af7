use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::period::PeriodKey;
use crate::trend::TrendDirection;

/// Lifecycle label that always breaks a day's accumulation, compared
/// case-insensitively.
pub const REMOVED_STATE: &str = "removed";

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One fulfillment attempt: how much of a SKU was ordered and how much
/// was actually found on the shelf.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FulfillmentEvent {
    pub sku: String,
    pub timestamp: NaiveDateTime,
    pub ordered_quantity: f64,
    pub found_quantity: f64,
    /// Free-text lifecycle label. Only "removed" carries meaning.
    pub state: String,
}

impl FulfillmentEvent {
    pub fn new(
        sku: impl Into<String>,
        timestamp: NaiveDateTime,
        ordered_quantity: f64,
        found_quantity: f64,
        state: impl Into<String>,
    ) -> Self {
        Self {
            sku: sku.into(),
            timestamp,
            ordered_quantity,
            found_quantity,
            state: state.into(),
        }
    }

    /// Calendar day of the event, taken from the timestamp as recorded.
    pub fn day(&self) -> NaiveDate {
        self.timestamp.date()
    }

    pub fn is_removed(&self) -> bool {
        self.state.eq_ignore_ascii_case(REMOVED_STATE)
    }

    /// An order counts toward the threshold only when it was served in
    /// full and not withdrawn. Quantities are compared exactly.
    #[allow(clippy::float_cmp)]
    pub fn is_fully_served(&self) -> bool {
        self.found_quantity == self.ordered_quantity && !self.is_removed()
    }
}

// ---------------------------------------------------------------------------
// Derived records
// ---------------------------------------------------------------------------

/// Threshold of one SKU on one calendar day.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DailyThreshold {
    pub sku: String,
    pub day: NaiveDate,
    pub threshold: f64,
}

/// Mean daily threshold of one SKU within one period bucket.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WeeklyCell {
    pub sku: String,
    pub period: PeriodKey,
    pub average_threshold: f64,
}

/// One output row: a SKU with its per-period averages.
///
/// `cells` is aligned with [`ThresholdTable::columns`]; `None` means the
/// SKU had no activity in that period, which is different from a measured 0.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResultRow {
    pub sku: String,
    pub cells: Vec<Option<f64>>,
    pub average: f64,
    pub trend: TrendDirection,
}

/// SKU x period pivot, rows ranked by `average` descending.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ThresholdTable {
    pub columns: Vec<PeriodKey>,
    pub rows: Vec<ResultRow>,
}

impl ThresholdTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell for `sku` in `column`, if both exist and the cell is present.
    pub fn cell(&self, sku: &str, column: &PeriodKey) -> Option<f64> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.rows
            .iter()
            .find(|r| r.sku == sku)
            .and_then(|r| r.cells.get(idx).copied().flatten())
    }

    pub fn row(&self, sku: &str) -> Option<&ResultRow> {
        self.rows.iter().find(|r| r.sku == sku)
    }
}
