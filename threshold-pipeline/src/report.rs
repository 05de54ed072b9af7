//! Rendering of threshold tables: CSV download, JSON digest and a
//! human-readable ranked table.

use std::path::Path;

use chrono::Utc;
use serde::Serialize;
use threshold_core::{Period, ThresholdError, ThresholdResult, ThresholdTable, TrendDirection};

use crate::pipeline::PipelineOutcome;

/// Header of the first and last CSV columns.
pub const SKU_HEADER: &str = "sku";
pub const AVERAGE_HEADER: &str = "Average";

/// Shortest decimal form that round-trips (`19`, `12.5`, `9.25`).
fn format_value(value: f64) -> String {
    format!("{}", value)
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// Encode the table as UTF-8 CSV: `sku`, one column per period, `Average`.
/// Missing cells are written as empty fields.
pub fn to_csv(table: &ThresholdTable) -> ThresholdResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = vec![SKU_HEADER.to_string()];
    header.extend(table.columns.iter().map(|c| c.label()));
    header.push(AVERAGE_HEADER.to_string());
    writer.write_record(&header).map_err(csv_error)?;

    for row in &table.rows {
        let mut record = Vec::with_capacity(row.cells.len() + 2);
        record.push(row.sku.clone());
        record.extend(row.cells.iter().map(|c| c.map(format_value).unwrap_or_default()));
        record.push(format_value(row.average));
        writer.write_record(&record).map_err(csv_error)?;
    }

    writer
        .into_inner()
        .map_err(|e| ThresholdError::Csv(e.to_string()))
}

/// Write the CSV encoding of `table` to `path`.
pub fn write_csv_file<P: AsRef<Path>>(table: &ThresholdTable, path: P) -> ThresholdResult<()> {
    let bytes = to_csv(table)?;
    std::fs::write(path.as_ref(), bytes)?;
    log::info!("wrote {} rows to {}", table.rows.len(), path.as_ref().display());
    Ok(())
}

fn csv_error(e: csv::Error) -> ThresholdError {
    ThresholdError::Csv(e.to_string())
}

// ---------------------------------------------------------------------------
// JSON output contract
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct ThresholdDigest {
    pub generated_at: String,
    pub period: String,
    pub columns: Vec<String>,
    pub rows: Vec<RowJson>,
    pub summary: SummaryJson,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RowJson {
    pub rank: usize,
    pub sku: String,
    /// Aligned with `columns`; `null` where the SKU had no activity.
    pub cells: Vec<Option<f64>>,
    pub average: f64,
    pub trend: String,
}

#[derive(Debug, Serialize)]
pub struct SummaryJson {
    pub events_processed: usize,
    pub daily_thresholds: usize,
    pub skus_reported: usize,
    pub skus_filtered_out: usize,
    pub worsening_skus: usize,
}

pub fn build_digest(outcome: &PipelineOutcome, period: Period) -> ThresholdDigest {
    let table = &outcome.table;
    ThresholdDigest {
        generated_at: Utc::now().to_rfc3339(),
        period: period.to_string(),
        columns: table.columns.iter().map(|c| c.label()).collect(),
        rows: table
            .rows
            .iter()
            .enumerate()
            .map(|(i, r)| RowJson {
                rank: i + 1,
                sku: r.sku.clone(),
                cells: r.cells.clone(),
                average: r.average,
                trend: format!("{:?}", r.trend),
            })
            .collect(),
        summary: SummaryJson {
            events_processed: outcome.events_processed,
            daily_thresholds: outcome.daily_thresholds,
            skus_reported: table.rows.len(),
            skus_filtered_out: outcome.filtered_out.len(),
            worsening_skus: table
                .rows
                .iter()
                .filter(|r| r.trend == TrendDirection::Worsening)
                .count(),
        },
        message: outcome.message.clone(),
    }
}

pub fn to_json(outcome: &PipelineOutcome, period: Period) -> ThresholdResult<String> {
    serde_json::to_string_pretty(&build_digest(outcome, period))
        .map_err(|e| ThresholdError::Serialization(e.to_string()))
}

// ---------------------------------------------------------------------------
// Human-readable output
// ---------------------------------------------------------------------------

const CELL_WIDTH: usize = 10;

/// Ranked table for terminal display.
pub fn render_text(outcome: &PipelineOutcome) -> String {
    let table = &outcome.table;
    let mut out = String::new();

    out.push('\n');
    out.push_str("  INVENTORY THRESHOLDS\n");
    out.push_str(&format!(
        "  {} events \u{00b7} {} SKU-days \u{00b7} {} SKUs ranked ({} filtered out)\n\n",
        outcome.events_processed,
        outcome.daily_thresholds,
        table.rows.len(),
        outcome.filtered_out.len()
    ));

    if let Some(message) = &outcome.message {
        out.push_str(&format!("  {}\n", message));
    }
    if table.is_empty() {
        return out;
    }

    let sku_width = table
        .rows
        .iter()
        .map(|r| r.sku.chars().count())
        .max()
        .unwrap_or(0)
        .max(SKU_HEADER.len());

    out.push_str(&format!("  {:>3}  {:<w$}", "#", SKU_HEADER, w = sku_width));
    for column in &table.columns {
        out.push_str(&format!(" {:>w$}", column.label(), w = CELL_WIDTH));
    }
    out.push_str(&format!(" {:>w$}  Trend\n", AVERAGE_HEADER, w = CELL_WIDTH));

    let rule_width = 7 + sku_width + (table.columns.len() + 1) * (CELL_WIDTH + 1) + 14;
    out.push_str(&format!("  {:\u{2500}<w$}\n", "", w = rule_width));

    for (i, row) in table.rows.iter().enumerate() {
        out.push_str(&format!("  {:>3}  {:<w$}", i + 1, row.sku, w = sku_width));
        for cell in &row.cells {
            let text = cell.map(|v| format!("{:.2}", v)).unwrap_or_default();
            out.push_str(&format!(" {:>w$}", text, w = CELL_WIDTH));
        }
        out.push_str(&format!(" {:>w$.2}  {}\n", row.average, row.trend, w = CELL_WIDTH));
    }
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use threshold_core::{PeriodKey, ResultRow};

    fn table() -> ThresholdTable {
        ThresholdTable {
            columns: vec![
                PeriodKey::Week { year: 2024, week: 10 },
                PeriodKey::Week { year: 2024, week: 11 },
            ],
            rows: vec![
                ResultRow {
                    sku: "SKU2".into(),
                    cells: vec![Some(19.0), None],
                    average: 19.0,
                    trend: TrendDirection::Stable,
                },
                ResultRow {
                    sku: "SKU1".into(),
                    cells: vec![Some(12.5), Some(6.0)],
                    average: 9.25,
                    trend: TrendDirection::Worsening,
                },
            ],
        }
    }

    fn outcome(table: ThresholdTable, message: Option<&str>) -> PipelineOutcome {
        PipelineOutcome {
            table,
            events_processed: 11,
            daily_thresholds: 4,
            filtered_out: Vec::new(),
            message: message.map(String::from),
        }
    }

    #[test]
    fn csv_has_header_blank_cells_and_average() {
        let bytes = to_csv(&table()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(
            text,
            "sku,2024-W10,2024-W11,Average\nSKU2,19,,19\nSKU1,12.5,6,9.25\n"
        );
    }

    #[test]
    fn empty_table_csv_has_only_header() {
        let text = String::from_utf8(to_csv(&ThresholdTable::default()).unwrap()).unwrap();
        assert_eq!(text, "sku,Average\n");
    }

    #[test]
    fn json_digest_marks_missing_cells_null() {
        let json = to_json(&outcome(table(), None), Period::IsoWeek).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["period"], "week");
        assert_eq!(value["columns"][1], "2024-W11");
        assert_eq!(value["rows"][0]["rank"], 1);
        assert_eq!(value["rows"][0]["cells"][1], serde_json::Value::Null);
        assert_eq!(value["rows"][1]["trend"], "Worsening");
        assert_eq!(value["summary"]["worsening_skus"], 1);
        assert!(value.get("message").is_none());
    }

    #[test]
    fn text_lists_rows_in_rank_order() {
        let text = render_text(&outcome(table(), None));
        let sku2 = text.find("SKU2").unwrap();
        let sku1 = text.find("SKU1").unwrap();
        assert!(sku2 < sku1);
        assert!(text.contains("2024-W10"));
        assert!(text.contains("9.25"));
    }

    #[test]
    fn text_for_empty_result_shows_message() {
        let text = render_text(&outcome(ThresholdTable::default(), Some("No data to report")));
        assert!(text.contains("No data to report"));
        assert!(!text.contains(AVERAGE_HEADER));
    }
}
