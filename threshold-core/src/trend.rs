//! Direction of a SKU's threshold across periods.

use std::fmt;

use serde::Serialize;

/// Which direction a SKU's threshold is heading.
///
/// A falling threshold means less stock can be relied on before orders
/// start coming up short, so `Worsening` is the stockout-risk signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum TrendDirection {
    Worsening,
    Stable,
    Improving,
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendDirection::Worsening => write!(f, "\u{2193} Worsening"),
            TrendDirection::Stable => write!(f, "\u{2192} Stable"),
            TrendDirection::Improving => write!(f, "\u{2191} Improving"),
        }
    }
}

/// Compare the latest observed period with the mean of the earlier ones.
///
/// `values` are the non-missing period averages, oldest first. `tolerance`
/// is the relative change that still counts as stable.
pub fn classify(values: &[f64], tolerance: f64) -> TrendDirection {
    let Some((&latest, earlier)) = values.split_last() else {
        return TrendDirection::Stable;
    };
    if earlier.is_empty() {
        return TrendDirection::Stable;
    }

    let baseline = earlier.iter().sum::<f64>() / earlier.len() as f64;
    if baseline == 0.0 {
        return if latest > 0.0 {
            TrendDirection::Improving
        } else {
            TrendDirection::Stable
        };
    }

    let change = (latest - baseline) / baseline;
    if change < -tolerance {
        TrendDirection::Worsening
    } else if change > tolerance {
        TrendDirection::Improving
    } else {
        TrendDirection::Stable
    }
}
