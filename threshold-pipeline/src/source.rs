use std::path::PathBuf;

use threshold_core::{FulfillmentEvent, ThresholdResult};

use crate::event_loader::load_events_file;
use crate::sample_data::sample_events;

/// Where a run's fulfillment events come from.
pub trait EventSource: Send + Sync {
    /// Load the full dataset. Fails on the first malformed row.
    fn load(&self) -> ThresholdResult<Vec<FulfillmentEvent>>;

    /// Returns a stable name for logging.
    fn name(&self) -> &str {
        type_label::<Self>()
    }
}

/// Last path segment of `T`'s type name, used as a log label.
pub(crate) fn type_label<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

/// Events read from a CSV file on disk.
pub struct CsvFileSource {
    pub path: PathBuf,
}

impl CsvFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl EventSource for CsvFileSource {
    fn load(&self) -> ThresholdResult<Vec<FulfillmentEvent>> {
        load_events_file(&self.path)
    }
}

/// The built-in demo dataset.
#[derive(Default)]
pub struct SampleSource;

impl EventSource for SampleSource {
    fn load(&self) -> ThresholdResult<Vec<FulfillmentEvent>> {
        sample_events()
    }
}

/// Events already in memory, e.g. parsed by a caller.
pub struct InMemorySource {
    events: Vec<FulfillmentEvent>,
}

impl InMemorySource {
    pub fn new(events: Vec<FulfillmentEvent>) -> Self {
        Self { events }
    }
}

impl EventSource for InMemorySource {
    fn load(&self) -> ThresholdResult<Vec<FulfillmentEvent>> {
        Ok(self.events.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use threshold_core::ThresholdError;

    #[test]
    fn source_names() {
        assert_eq!(SampleSource.name(), "SampleSource");
        assert_eq!(CsvFileSource::new("x.csv").name(), "CsvFileSource");
    }

    #[test]
    fn type_label_drops_module_path() {
        assert_eq!(type_label::<InMemorySource>(), "InMemorySource");
        assert_eq!(type_label::<dyn EventSource>(), "EventSource");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = CsvFileSource::new("/nonexistent/events.csv").load().unwrap_err();
        match err {
            ThresholdError::Io(e) => assert!(e.to_string().contains("/nonexistent/events.csv")),
            other => panic!("expected io error, got {:?}", other),
        }
    }

    #[test]
    fn in_memory_source_returns_events() {
        let events = sample_events().unwrap();
        let source = InMemorySource::new(events.clone());
        assert_eq!(source.load().unwrap(), events);
    }
}
