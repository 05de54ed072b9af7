//! Ingestion, orchestration and presentation around `threshold-core`.
//!
//! Flow: an [`EventSource`] loads fulfillment events (CSV file or the
//! built-in sample), [`ThresholdPipeline`] runs the core computation and
//! any row filters, and [`report`] renders the outcome as CSV, JSON or a
//! terminal table.

pub mod event_loader;
pub mod filter;
pub mod pipeline;
pub mod report;
pub mod sample_data;
pub mod source;

pub use event_loader::{load_events, load_events_file};
pub use filter::{FilterResult, MinAverageFilter, RowFilter, WorseningFilter};
pub use pipeline::{PipelineOutcome, ThresholdPipeline};
pub use source::{CsvFileSource, EventSource, InMemorySource, SampleSource};
