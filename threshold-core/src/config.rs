//! Run configuration and defaults.

use crate::period::Period;

/// Relative change between the latest period and the earlier mean that
/// still counts as a stable threshold (5%).
pub const DEFAULT_TREND_TOLERANCE: f64 = 0.05;

/// Settings for one threshold computation.
#[derive(Clone, Debug, PartialEq)]
pub struct ThresholdConfig {
    /// Bucket used to average daily thresholds.
    pub period: Period,
    /// Extract SKU partitions on the rayon pool.
    pub parallel: bool,
    pub trend_tolerance: f64,
    /// Keep only the N highest-ranked SKUs. `None` keeps every row.
    pub top: Option<usize>,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            period: Period::IsoWeek,
            parallel: true,
            trend_tolerance: DEFAULT_TREND_TOLERANCE,
            top: None,
        }
    }
}

impl ThresholdConfig {
    pub fn with_period(mut self, period: Period) -> Self {
        self.period = period;
        self
    }

    pub fn with_top(mut self, top: Option<usize>) -> Self {
        self.top = top;
        self
    }

    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}
