//! Period bucketing for daily thresholds.
//!
//! The default bucket is the ISO 8601 week: weeks start on Monday and
//! belong to the ISO week-year, so the last days of December can land in
//! week 1 of the following year. The month bucket keeps the calendar-month
//! grouping some reports still use.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Serialize, Serializer};

/// How daily thresholds are bucketed before averaging.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Period {
    #[default]
    IsoWeek,
    Month,
}

impl Period {
    /// Bucket a calendar day.
    pub fn key(&self, day: NaiveDate) -> PeriodKey {
        match self {
            Period::IsoWeek => {
                let iso = day.iso_week();
                PeriodKey::Week {
                    year: iso.year(),
                    week: iso.week(),
                }
            }
            Period::Month => PeriodKey::Month {
                year: day.year(),
                month: day.month(),
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::IsoWeek => "week",
            Period::Month => "month",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "week" | "iso-week" | "isoweek" | "weekly" => Ok(Period::IsoWeek),
            "month" | "monthly" => Ok(Period::Month),
            other => Err(format!(
                "unknown period '{}', expected 'week' or 'month'",
                other
            )),
        }
    }
}

/// Sortable bucket label.
///
/// Ordering is chronological, and the rendered label (`2024-W09`,
/// `2024-03`) sorts the same way as text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PeriodKey {
    Week { year: i32, week: u32 },
    Month { year: i32, month: u32 },
}

impl PeriodKey {
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodKey::Week { year, week } => write!(f, "{:04}-W{:02}", year, week),
            PeriodKey::Month { year, month } => write!(f, "{:04}-{:02}", year, month),
        }
    }
}

impl Serialize for PeriodKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
