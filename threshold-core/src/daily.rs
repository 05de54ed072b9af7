//! Daily threshold extraction.
//!
//! A SKU's threshold for a day is the quantity found across the longest
//! run of fully served orders at the start of that day. The first order
//! that is short, over-filled or removed ends the run, and neither its
//! quantity nor anything after it is counted.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use rayon::prelude::*;

use crate::model::{DailyThreshold, FulfillmentEvent};

/// Compute the threshold for one SKU on one day.
///
/// Events are ordered by timestamp first; ties keep their input order.
pub fn extract(events: &[FulfillmentEvent]) -> f64 {
    let mut ordered: Vec<&FulfillmentEvent> = events.iter().collect();
    ordered.sort_by_key(|e| e.timestamp);
    accumulate_until_failure(ordered)
}

/// Sum `found_quantity` over the fully-served prefix of an already
/// time-ordered sequence.
fn accumulate_until_failure<'a, I>(ordered: I) -> f64
where
    I: IntoIterator<Item = &'a FulfillmentEvent>,
{
    ordered
        .into_iter()
        .try_fold(0.0, |cumulative, event| {
            if event.is_fully_served() {
                Ok(cumulative + event.found_quantity)
            } else {
                Err(cumulative)
            }
        })
        .unwrap_or_else(|stopped_at| stopped_at)
}

/// Partition events by SKU, keeping SKUs in first-seen order.
pub fn partition_by_sku(events: &[FulfillmentEvent]) -> Vec<(&str, Vec<&FulfillmentEvent>)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut partitions: Vec<(&str, Vec<&FulfillmentEvent>)> = Vec::new();
    for event in events {
        let slot = *index.entry(event.sku.as_str()).or_insert_with(|| {
            partitions.push((event.sku.as_str(), Vec::new()));
            partitions.len() - 1
        });
        partitions[slot].1.push(event);
    }
    partitions
}

/// Thresholds for every day one SKU was active, oldest day first.
fn extract_sku(sku: &str, events: &[&FulfillmentEvent]) -> Vec<DailyThreshold> {
    let mut days: BTreeMap<NaiveDate, Vec<&FulfillmentEvent>> = BTreeMap::new();
    for event in events {
        days.entry(event.day()).or_default().push(*event);
    }

    days.into_iter()
        .map(|(day, mut day_events)| {
            day_events.sort_by_key(|e| e.timestamp);
            DailyThreshold {
                sku: sku.to_string(),
                day,
                threshold: accumulate_until_failure(day_events),
            }
        })
        .collect()
}

/// Compute one [`DailyThreshold`] per SKU x day in a single grouping pass.
///
/// Output is ordered by SKU first-seen order, then by day. With `parallel`
/// set, SKU partitions are extracted on the rayon pool; the indexed collect
/// keeps the same order as the sequential path.
pub fn extract_daily(events: &[FulfillmentEvent], parallel: bool) -> Vec<DailyThreshold> {
    let partitions = partition_by_sku(events);
    log::debug!(
        "extracting daily thresholds: {} events across {} SKUs",
        events.len(),
        partitions.len()
    );

    let per_sku: Vec<Vec<DailyThreshold>> = if parallel {
        partitions
            .par_iter()
            .map(|(sku, sku_events)| extract_sku(sku, sku_events))
            .collect()
    } else {
        partitions
            .iter()
            .map(|(sku, sku_events)| extract_sku(sku, sku_events))
            .collect()
    };

    per_sku.into_iter().flatten().collect()
}
