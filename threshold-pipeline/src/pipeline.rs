use threshold_core::{
    extract_daily, Aggregator, AverageSelector, FulfillmentEvent, ResultRow, Selector,
    ThresholdConfig, ThresholdError, ThresholdResult, ThresholdTable,
};

use crate::filter::RowFilter;
use crate::source::EventSource;

/// Everything a presentation layer needs from one run.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub table: ThresholdTable,
    pub events_processed: usize,
    pub daily_thresholds: usize,
    /// Rows dropped by filters, in rank order.
    pub filtered_out: Vec<ResultRow>,
    /// Informative note for the user, set when there is nothing to show.
    pub message: Option<String>,
}

impl PipelineOutcome {
    fn empty(events_processed: usize, daily_thresholds: usize, message: String) -> Self {
        Self {
            table: ThresholdTable::default(),
            events_processed,
            daily_thresholds,
            filtered_out: Vec::new(),
            message: Some(message),
        }
    }
}

/// Threshold report pipeline.
///
/// Pipeline flow:
/// 1. Daily extraction per SKU x day
/// 2. Period averaging, pivot and ranking
/// 3. Row filters, in registration order
/// 4. Top-N selection
///
/// Schema and parse failures abort the run. An empty dataset is not a
/// failure: it yields an empty table with a message.
pub struct ThresholdPipeline {
    config: ThresholdConfig,
    filters: Vec<Box<dyn RowFilter>>,
}

impl ThresholdPipeline {
    pub fn new(config: ThresholdConfig) -> Self {
        Self {
            config,
            filters: Vec::new(),
        }
    }

    pub fn with_filter(mut self, filter: impl RowFilter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn config(&self) -> &ThresholdConfig {
        &self.config
    }

    pub fn run(&self, events: &[FulfillmentEvent]) -> ThresholdResult<PipelineOutcome> {
        if events.is_empty() {
            let err = ThresholdError::EmptyDataset("the dataset contains no fulfillment events".into());
            log::warn!("{}", err);
            return Ok(PipelineOutcome::empty(0, 0, err.to_string()));
        }

        let daily = extract_daily(events, self.config.parallel);
        let table = match Aggregator::new(self.config.period)
            .with_trend_tolerance(self.config.trend_tolerance)
            .aggregate(&daily)
        {
            Ok(table) => table,
            Err(err) if err.is_empty_dataset() => {
                log::warn!("{}", err);
                return Ok(PipelineOutcome::empty(events.len(), daily.len(), err.to_string()));
            }
            Err(err) => return Err(err),
        };

        let ThresholdTable { columns, mut rows } = table;
        let mut filtered_out = Vec::new();
        for filter in &self.filters {
            let result = filter.filter(rows);
            log::debug!(
                "{} kept {} rows, removed {}",
                filter.name(),
                result.kept.len(),
                result.removed.len()
            );
            rows = result.kept;
            filtered_out.extend(result.removed);
        }

        let rows = AverageSelector {
            limit: self.config.top,
        }
        .select(rows);

        let message = if rows.is_empty() {
            Some("No SKUs matched the selected filters.".to_string())
        } else {
            None
        };

        log::info!(
            "{} events -> {} SKU-days -> {} SKUs across {} {} columns",
            events.len(),
            daily.len(),
            rows.len(),
            columns.len(),
            self.config.period
        );

        Ok(PipelineOutcome {
            table: ThresholdTable { columns, rows },
            events_processed: events.len(),
            daily_thresholds: daily.len(),
            filtered_out,
            message,
        })
    }

    /// Load from `source`, then [`run`](Self::run).
    pub fn run_source(&self, source: &dyn EventSource) -> ThresholdResult<PipelineOutcome> {
        let events = source.load()?;
        log::info!("{} loaded {} events", source.name(), events.len());
        self.run(&events)
    }
}

impl Default for ThresholdPipeline {
    fn default() -> Self {
        Self::new(ThresholdConfig::default())
    }
}
