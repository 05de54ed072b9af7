//! `shelf-threshold` - inventory threshold report from a fulfillment log.

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use threshold_core::config::DEFAULT_TREND_TOLERANCE;
use threshold_core::{Period, ThresholdConfig};
use threshold_pipeline::report::{render_text, to_json, write_csv_file};
use threshold_pipeline::{
    CsvFileSource, EventSource, MinAverageFilter, SampleSource, ThresholdPipeline,
    WorseningFilter,
};

#[derive(Debug, Parser)]
#[command(
    name = "shelf-threshold",
    version,
    about = "Rank SKUs by the stock they reliably have on the shelf, per week"
)]
struct Cli {
    /// Fulfillment log CSV (sku, timestamp, ordered_quantity, found_quantity, state)
    #[arg(required_unless_present = "sample", conflicts_with = "sample")]
    input: Option<PathBuf>,

    /// Use the built-in sample dataset instead of a file
    #[arg(long)]
    sample: bool,

    /// Bucket for averaging daily thresholds: week (ISO, Monday start) or month
    #[arg(long, default_value = "week", env = "SHELF_THRESHOLD_PERIOD")]
    period: Period,

    /// Only report the N highest-ranked SKUs (N >= 1)
    #[arg(long, env = "SHELF_THRESHOLD_TOP")]
    top: Option<NonZeroUsize>,

    /// Only report SKUs whose threshold is falling
    #[arg(long)]
    worsening_only: bool,

    /// Drop SKUs whose average threshold is below this value
    #[arg(long)]
    min_average: Option<f64>,

    /// Relative change between the latest period and earlier ones that still counts as stable
    #[arg(long, default_value_t = DEFAULT_TREND_TOLERANCE)]
    trend_tolerance: f64,

    /// Print the result as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Also write the result table as CSV to this path
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Process SKUs on a single thread
    #[arg(long)]
    sequential: bool,

    /// Log progress to stderr
    #[arg(long, short)]
    verbose: bool,
}

impl Cli {
    fn config(&self) -> ThresholdConfig {
        ThresholdConfig {
            period: self.period,
            parallel: !self.sequential,
            trend_tolerance: self.trend_tolerance,
            top: self.top.map(NonZeroUsize::get),
        }
    }

    fn source(&self) -> Box<dyn EventSource> {
        match &self.input {
            Some(path) if !self.sample => Box::new(CsvFileSource::new(path)),
            _ => Box::new(SampleSource),
        }
    }

    fn pipeline(&self) -> ThresholdPipeline {
        let mut pipeline = ThresholdPipeline::new(self.config());
        if let Some(min) = self.min_average {
            pipeline = pipeline.with_filter(MinAverageFilter::new(min));
        }
        if self.worsening_only {
            pipeline = pipeline.with_filter(WorseningFilter);
        }
        pipeline
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let source = cli.source();

    let load_start = Instant::now();
    let events = source
        .load()
        .with_context(|| format!("could not load fulfillment events ({})", source.name()))?;
    let load_ms = load_start.elapsed().as_millis();

    let pipeline = cli.pipeline();
    let pipeline_start = Instant::now();
    let outcome = pipeline.run(&events)?;
    let pipeline_ms = pipeline_start.elapsed().as_millis();
    log::info!("loaded in {}ms, computed in {}ms", load_ms, pipeline_ms);

    if let Some(path) = &cli.output {
        write_csv_file(&outcome.table, path)
            .with_context(|| format!("could not write {}", path.display()))?;
    }

    if cli.json {
        println!("{}", to_json(&outcome, pipeline.config().period)?);
    } else {
        print!("{}", render_text(&outcome));
        println!(
            "  \u{23f1}  CSV loaded in {}ms \u{00b7} Thresholds computed in {}ms",
            load_ms, pipeline_ms
        );
        if let Some(path) = &cli.output {
            println!("  CSV written to {}", path.display());
        }
        println!();
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn input_and_sample_are_exclusive() {
        assert!(Cli::try_parse_from(["shelf-threshold"]).is_err());
        assert!(Cli::try_parse_from(["shelf-threshold", "a.csv", "--sample"]).is_err());
        assert!(Cli::try_parse_from(["shelf-threshold", "--sample"]).is_ok());
    }

    #[test]
    fn flags_map_to_config() {
        let cli = Cli::try_parse_from([
            "shelf-threshold",
            "events.csv",
            "--period",
            "month",
            "--top",
            "3",
            "--sequential",
        ])
        .unwrap();
        let config = cli.config();
        assert_eq!(config.period, Period::Month);
        assert_eq!(config.top, Some(3));
        assert!(!config.parallel);
        assert_eq!(cli.source().name(), "CsvFileSource");
    }

    #[test]
    fn top_must_be_positive() {
        assert!(Cli::try_parse_from(["shelf-threshold", "--sample", "--top", "0"]).is_err());
        let cli = Cli::try_parse_from(["shelf-threshold", "--sample", "--top", "1"]).unwrap();
        assert_eq!(cli.pipeline().config().top, Some(1));
    }

    #[test]
    fn unknown_period_is_rejected() {
        assert!(Cli::try_parse_from(["shelf-threshold", "--sample", "--period", "day"]).is_err());
    }
}
