//! CSV fulfillment event loader.
//!
//! Parses fulfillment logs into `FulfillmentEvent`s. Header names are
//! matched case-insensitively and several spellings are accepted per
//! field (see [`COLUMNS`]), so exports that still use the legacy
//! `nombre_item, creacion_job, unidades_pedidas, unidades_encontradas,
//! estado_item` layout load without conversion.
//!
//! Any bad row aborts the whole load; no partial datasets are returned.

use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use threshold_core::{FulfillmentEvent, ThresholdError, ThresholdResult};

/// An input field and the header spellings that map to it.
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub field: &'static str,
    pub aliases: &'static [&'static str],
    pub required: bool,
}

pub const COLUMNS: [Column; 5] = [
    Column {
        field: "sku",
        aliases: &["sku", "nombre_item", "item", "item_name", "product_id"],
        required: true,
    },
    Column {
        field: "timestamp",
        aliases: &["timestamp", "creacion_job", "created_at", "datetime", "date"],
        required: true,
    },
    Column {
        field: "ordered_quantity",
        aliases: &["ordered_quantity", "unidades_pedidas", "ordered", "qty_ordered"],
        required: true,
    },
    Column {
        field: "found_quantity",
        aliases: &["found_quantity", "unidades_encontradas", "found", "qty_found"],
        required: true,
    },
    Column {
        field: "state",
        aliases: &["state", "estado_item", "status"],
        required: false,
    },
];

/// A CSV row after header canonicalization.
#[derive(Debug, Clone, Deserialize)]
struct EventRecord {
    sku: String,
    timestamp: String,
    ordered_quantity: f64,
    found_quantity: f64,
    #[serde(default)]
    state: String,
}

/// Canonical field names for a header row, plus the original spelling of
/// each recognized field for error messages.
struct HeaderMap {
    canonical: csv::StringRecord,
    original: csv::StringRecord,
}

impl HeaderMap {
    fn resolve(headers: &csv::StringRecord) -> ThresholdResult<Self> {
        let mut canonical = csv::StringRecord::new();
        let mut seen: Vec<(&'static str, &str)> = Vec::new();

        for header in headers.iter() {
            let normalized = header.trim().to_ascii_lowercase();
            match COLUMNS
                .iter()
                .find(|c| c.aliases.contains(&normalized.as_str()))
            {
                Some(column) => {
                    if let Some((_, first)) = seen.iter().find(|(f, _)| *f == column.field) {
                        return Err(ThresholdError::Schema(format!(
                            "columns '{}' and '{}' both map to '{}'",
                            first, header, column.field
                        )));
                    }
                    seen.push((column.field, header));
                    canonical.push_field(column.field);
                }
                None => canonical.push_field(&normalized),
            }
        }

        for column in COLUMNS.iter().filter(|c| c.required) {
            if !seen.iter().any(|(f, _)| *f == column.field) {
                return Err(ThresholdError::Schema(format!(
                    "missing required column '{}' (accepted headers: {})",
                    column.field,
                    column.aliases.join(", ")
                )));
            }
        }

        Ok(Self {
            canonical,
            original: headers.clone(),
        })
    }

    /// Header as written in the file for a canonical field.
    fn original_name(&self, field: &str) -> String {
        self.canonical
            .iter()
            .position(|h| h == field)
            .and_then(|i| self.original.get(i))
            .unwrap_or(field)
            .to_string()
    }
}

/// Load fulfillment events from a CSV reader.
pub fn load_events<R: Read>(reader: R) -> ThresholdResult<Vec<FulfillmentEvent>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = HeaderMap::resolve(csv_reader.headers().map_err(csv_error)?)?;

    let mut events = Vec::new();
    let mut raw = csv::StringRecord::new();
    while csv_reader.read_record(&mut raw).map_err(csv_error)? {
        let line = raw.position().map(|p| p.line()).unwrap_or(0);
        let record: EventRecord = raw
            .deserialize(Some(&headers.canonical))
            .map_err(|e| deserialize_error(e, line, &headers))?;
        events.push(validate(record, line, &headers)?);
    }

    log::debug!("loaded {} fulfillment events", events.len());
    Ok(events)
}

/// Load fulfillment events from a CSV file path.
pub fn load_events_file<P: AsRef<Path>>(path: P) -> ThresholdResult<Vec<FulfillmentEvent>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|e| {
        ThresholdError::Io(std::io::Error::new(
            e.kind(),
            format!("failed to open '{}': {}", path.display(), e),
        ))
    })?;
    load_events(file)
}

fn validate(record: EventRecord, line: u64, headers: &HeaderMap) -> ThresholdResult<FulfillmentEvent> {
    if record.sku.is_empty() {
        return Err(ThresholdError::Parse {
            line,
            column: headers.original_name("sku"),
            reason: "SKU must not be empty".into(),
        });
    }
    let timestamp = parse_timestamp(&record.timestamp).ok_or_else(|| ThresholdError::Parse {
        line,
        column: headers.original_name("timestamp"),
        reason: format!("unrecognized timestamp '{}'", record.timestamp),
    })?;
    for (field, value) in [
        ("ordered_quantity", record.ordered_quantity),
        ("found_quantity", record.found_quantity),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(ThresholdError::Parse {
                line,
                column: headers.original_name(field),
                reason: format!("quantity must be a non-negative number, got {}", value),
            });
        }
    }

    Ok(FulfillmentEvent {
        sku: record.sku,
        timestamp,
        ordered_quantity: record.ordered_quantity,
        found_quantity: record.found_quantity,
        state: record.state,
    })
}

fn csv_error(e: csv::Error) -> ThresholdError {
    ThresholdError::Csv(e.to_string())
}

fn deserialize_error(e: csv::Error, line: u64, headers: &HeaderMap) -> ThresholdError {
    match e.kind() {
        csv::ErrorKind::Deserialize { err, .. } => ThresholdError::Parse {
            line,
            column: err
                .field()
                .and_then(|i| headers.original.get(i as usize))
                .unwrap_or("?")
                .to_string(),
            reason: err.kind().to_string(),
        },
        _ => csv_error(e),
    }
}

const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];

/// Parse a timestamp in any of the accepted layouts.
///
/// Offsets are not converted: a timestamp with an offset keeps its own
/// wall-clock time, so the day it falls on is the day the source recorded.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(dt.naive_local());
    }
    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
    {
        return Some(dt);
    }
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const SAMPLE_CSV: &str = "\
sku,timestamp,ordered_quantity,found_quantity,state
SKU1,2024-03-04 09:00:00,10,10,ADDED
SKU1,2024-03-04 10:00:00,5,5,ADDED
SKU1,2024-03-04 11:00:00,3,2,ADDED
SKU2,2024-03-04T12:30:00,7.5,7.5,removed
";

    fn ts(d: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, d)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn load_sample_csv() {
        let events = load_events(SAMPLE_CSV.as_bytes()).unwrap();
        assert_eq!(events.len(), 4);
        assert_eq!(events[0].sku, "SKU1");
        assert_eq!(events[0].timestamp, ts(4, 9, 0));
        assert_eq!(events[2].found_quantity, 2.0);
        assert_eq!(events[3].timestamp, ts(4, 12, 30));
        assert!((events[3].ordered_quantity - 7.5).abs() < f64::EPSILON);
        assert!(events[3].is_removed());
    }

    #[test]
    fn legacy_headers_are_accepted() {
        let csv_data = "\
Nombre_Item , creacion_job,unidades_pedidas,unidades_encontradas,estado_item
Leche,2024-03-04 08:00:00,2,2,ADDED
";
        let events = load_events(csv_data.as_bytes()).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].sku, "Leche");
        assert_eq!(events[0].state, "ADDED");
    }

    #[test]
    fn state_column_is_optional() {
        let csv_data = "\
sku,timestamp,ordered_quantity,found_quantity,store
A,2024-03-04,1,1,store-7
";
        let events = load_events(csv_data.as_bytes()).unwrap();
        assert_eq!(events[0].state, "");
        assert_eq!(events[0].timestamp, ts(4, 0, 0));
    }

    #[test]
    fn missing_required_column_is_schema_error() {
        let csv_data = "sku,timestamp,ordered_quantity,state\nA,2024-03-04,1,ADDED\n";
        let err = load_events(csv_data.as_bytes()).unwrap_err();
        match err {
            ThresholdError::Schema(msg) => {
                assert!(msg.contains("found_quantity"), "{}", msg);
                assert!(msg.contains("unidades_encontradas"), "{}", msg);
            }
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn duplicate_field_is_schema_error() {
        let csv_data = "sku,item,timestamp,ordered,found\nA,B,2024-03-04,1,1\n";
        let err = load_events(csv_data.as_bytes()).unwrap_err();
        assert!(matches!(err, ThresholdError::Schema(ref m) if m.contains("both map to 'sku'")));
    }

    #[test]
    fn bad_timestamp_reports_line_and_column() {
        let csv_data = "\
sku,creacion_job,ordered,found
A,2024-03-04 09:00,1,1
B,yesterday,1,1
";
        let err = load_events(csv_data.as_bytes()).unwrap_err();
        match err {
            ThresholdError::Parse { line, column, reason } => {
                assert_eq!(line, 3);
                assert_eq!(column, "creacion_job");
                assert!(reason.contains("yesterday"), "{}", reason);
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn bad_quantity_reports_column() {
        let csv_data = "sku,timestamp,ordered,found\nA,2024-03-04,ten,10\n";
        let err = load_events(csv_data.as_bytes()).unwrap_err();
        assert!(matches!(err, ThresholdError::Parse { line: 2, ref column, .. } if column == "ordered"));
    }

    #[test]
    fn negative_quantity_is_rejected() {
        let csv_data = "sku,timestamp,ordered,found\nA,2024-03-04,1,-1\n";
        let err = load_events(csv_data.as_bytes()).unwrap_err();
        assert!(matches!(err, ThresholdError::Parse { ref column, .. } if column == "found"));
    }

    #[test]
    fn empty_sku_is_rejected() {
        let csv_data = "sku,timestamp,ordered,found\n  ,2024-03-04,1,1\n";
        let err = load_events(csv_data.as_bytes()).unwrap_err();
        assert!(matches!(err, ThresholdError::Parse { line: 2, .. }));
    }

    #[test]
    fn header_only_file_loads_no_events() {
        let events = load_events("sku,timestamp,ordered,found\n".as_bytes()).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn timestamp_layouts() {
        let expected = ts(4, 9, 30);
        for raw in [
            "2024-03-04 09:30:00",
            "2024-03-04T09:30:00",
            "2024-03-04 09:30",
            "2024-03-04 09:30:00.000",
            "2024-03-04T09:30:00+05:00",
            "2024-03-04T09:30:00Z",
            "2024-03-04 09:30:00-03:00",
            "04/03/2024 09:30",
        ] {
            assert_eq!(parse_timestamp(raw), Some(expected), "{}", raw);
        }
        assert_eq!(parse_timestamp("2024-03-04"), Some(ts(4, 0, 0)));
        assert_eq!(parse_timestamp("not a date"), None);
    }
}
