//! Row ingestion.
//!
//! Query results arrive as rows of named columns. This module turns them
//! into the column arrays each renderer consumes, using the same column
//! heuristics for every chart type.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::geometry::GeoPoint;
use crate::plots::AxisKey;

/// A single cell of a result row.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// SQL NULL or a missing column.
    Null,
    /// Boolean.
    Bool(bool),
    /// Integer.
    Int(i64),
    /// Floating point (also decimals that do not fit an `i64`).
    Float(f64),
    /// Text, and nested JSON rendered as text.
    Text(String),
}

impl CellValue {
    /// Convert a JSON scalar. Arrays and objects become their JSON text.
    #[must_use]
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => n.as_f64().map_or(Self::Null, Self::Float),
            },
            Value::String(s) => Self::Text(s),
            other => Self::Text(other.to_string()),
        }
    }

    /// Numeric reading. Text is parsed, booleans count as 0 or 1.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Null => None,
            Self::Bool(b) => Some(f64::from(u8::from(*b))),
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }

    /// True for [`CellValue::Int`] and [`CellValue::Float`].
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Float(_))
    }

    /// True for [`CellValue::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Axis key for pivoting. Date-like text is normalised so keys sort
    /// chronologically.
    #[must_use]
    pub fn to_axis_key(&self) -> AxisKey {
        match self {
            Self::Null => AxisKey::Null,
            Self::Text(text) => AxisKey::Text(normalize_date(text).unwrap_or_else(|| text.clone())),
            other => AxisKey::Text(other.to_string()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// One result row: column names in query order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    columns: Vec<(String, CellValue)>,
}

impl Record {
    /// Create an empty row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.columns.push((name.into(), value.into()));
        self
    }

    /// Build from a JSON object, keeping its key order.
    pub fn from_json(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(map.into_iter().map(|(k, v)| (k, CellValue::from_json(v))).collect()),
            other => Err(Error::InvalidRows(format!("expected an object, got {other}"))),
        }
    }

    /// Value of a column, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&CellValue> {
        self.columns.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Whether the row has a column.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Column names in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(k, _)| k.as_str())
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// True when the row has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl FromIterator<(String, CellValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, CellValue)>>(iter: I) -> Self {
        Self { columns: iter.into_iter().collect() }
    }
}

/// Parse a JSON array of row objects.
pub fn records_from_json(json: &str) -> Result<Vec<Record>> {
    match serde_json::from_str::<Value>(json)? {
        Value::Array(rows) => rows.into_iter().map(Record::from_json).collect(),
        other => Err(Error::InvalidRows(format!("expected an array of rows, got {}", json_kind(&other)))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ============================================================================
// Dates
// ============================================================================

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%m/%d/%Y"];

/// Canonical `YYYY-MM-DD[ HH:MM:SS]` form of a date-like string.
///
/// Formats are tried in order, so `01/02/2024` reads as day-first.
/// Fractional seconds are dropped.
#[must_use]
pub fn normalize_date(text: &str) -> Option<String> {
    let trimmed = text.trim();
    let whole = trimmed.split('.').next().unwrap_or(trimmed);

    if let Some(dt) = DATETIME_FORMATS.iter().find_map(|fmt| NaiveDateTime::parse_from_str(whole, fmt).ok()) {
        return Some(dt.format("%Y-%m-%d %H:%M:%S").to_string());
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .map(|d| d.format("%Y-%m-%d").to_string())
}

// ============================================================================
// Chart rows
// ============================================================================

/// A geographic row (`lat`/`lon` columns).
#[derive(Debug, Clone, PartialEq)]
pub struct GeoRow {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lon: f64,
    /// Weight from a `value` column or a numeric `color` column.
    pub value: Option<f64>,
    /// Color label from a text `color` column.
    pub color: Option<String>,
}

impl GeoRow {
    /// Map input point.
    #[must_use]
    pub fn to_point(&self) -> GeoPoint {
        GeoPoint { lat: self.lat, lon: self.lon, value: self.value, label: self.color.clone() }
    }
}

/// A generic `x`/`y` row.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesRow {
    /// Category or time key; dates are normalised.
    pub x: AxisKey,
    /// Numeric y, when it parses.
    pub y: Option<f64>,
    /// Weight from a `value` column or a numeric `color` column.
    pub value: Option<f64>,
    /// Series label from a text `color` column.
    pub color: Option<String>,
}

/// Rows routed by shape.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartRows {
    /// The first row has both `lat` and `lon`.
    Geo(Vec<GeoRow>),
    /// Everything else.
    Series(Vec<SeriesRow>),
}

/// `(value, color)` from the `color`/`value` columns. A numeric color is a value.
fn value_and_color(record: &Record, has_color: bool, has_value: bool) -> (Option<f64>, Option<String>) {
    if has_color {
        match record.get("color") {
            Some(CellValue::Text(label)) => (None, Some(label.clone())),
            Some(v) if v.is_numeric() => (v.as_f64(), None),
            _ => (None, None),
        }
    } else if has_value {
        (record.get("value").and_then(CellValue::as_f64), None)
    } else {
        (None, None)
    }
}

impl ChartRows {
    /// Route rows. Column presence is decided by the first row.
    #[must_use]
    pub fn from_records(records: &[Record]) -> Self {
        let Some(first) = records.first() else {
            return Self::Series(Vec::new());
        };
        let has_color = first.contains("color");
        let has_value = first.contains("value");

        if first.contains("lat") && first.contains("lon") {
            let rows: Vec<GeoRow> = records
                .iter()
                .filter_map(|r| {
                    let lat = r.get("lat").and_then(CellValue::as_f64)?;
                    let lon = r.get("lon").and_then(CellValue::as_f64)?;
                    let (value, color) = value_and_color(r, has_color, has_value);
                    Some(GeoRow { lat, lon, value, color })
                })
                .collect();
            if rows.len() < records.len() {
                log::debug!("dropped {} rows without numeric lat/lon", records.len() - rows.len());
            }
            return Self::Geo(rows);
        }

        Self::Series(
            records
                .iter()
                .map(|r| {
                    let (value, color) = value_and_color(r, has_color, has_value);
                    SeriesRow {
                        x: r.get("x").map_or(AxisKey::Null, CellValue::to_axis_key),
                        y: r.get("y").and_then(CellValue::as_f64),
                        value,
                        color,
                    }
                })
                .collect(),
        )
    }

    /// Map points; empty for series rows.
    #[must_use]
    pub fn points(&self) -> Vec<GeoPoint> {
        match self {
            Self::Geo(rows) => rows.iter().map(GeoRow::to_point).collect(),
            Self::Series(_) => Vec::new(),
        }
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Geo(rows) => rows.len(),
            Self::Series(rows) => rows.len(),
        }
    }

    /// True when no rows survived ingestion.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// Proportions and pivots
// ============================================================================

/// Substrings that identify label and value columns (case-insensitive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnKeywords {
    /// Label column hints.
    pub label: &'static [&'static str],
    /// Value column hints.
    pub value: &'static [&'static str],
}

/// Column hints for waffle charts and gauges.
pub const WAFFLE_KEYWORDS: ColumnKeywords = ColumnKeywords {
    label: &["name", "label", "category", "type", "group"],
    value: &["value", "count", "sum", "total", "amount"],
};

/// Column hints for pie charts (also accept `x`/`y`).
pub const PIE_KEYWORDS: ColumnKeywords = ColumnKeywords {
    label: &["name", "label", "category", "type", "group", "x"],
    value: &["value", "count", "sum", "total", "amount", "y"],
};

/// Values and labels for a proportional chart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Proportions {
    /// One value per row; non-numeric cells read as 0.
    pub values: Vec<f64>,
    /// One label per row.
    pub labels: Vec<String>,
}

/// Pick label/value columns by keyword, falling back to the first two
/// columns (or the only column for both).
#[must_use]
pub fn extract_proportions(records: &[Record], keywords: ColumnKeywords) -> Proportions {
    let Some(first) = records.first() else {
        return Proportions::default();
    };
    let keys: Vec<&str> = first.keys().collect();
    let hinted = |key: &str, words: &[&str]| {
        let lower = key.to_lowercase();
        words.iter().any(|w| lower.contains(w))
    };

    let mut label_col = None;
    let mut value_col = None;
    for &key in &keys {
        if label_col.is_none() && hinted(key, keywords.label) {
            label_col = Some(key);
        } else if value_col.is_none() && hinted(key, keywords.value) {
            value_col = Some(key);
        }
    }
    let label_col = label_col.or_else(|| keys.first().copied());
    let value_col = value_col.or_else(|| keys.get(1).or_else(|| keys.first()).copied());

    let mut out = Proportions::default();
    for record in records {
        if let Some(col) = label_col {
            let label = record.get(col).filter(|v| !v.is_null());
            out.labels.push(label.map_or_else(|| "Unknown".to_string(), ToString::to_string));
        }
        if let Some(col) = value_col {
            out.values.push(record.get(col).and_then(CellValue::as_f64).unwrap_or(0.0));
        }
    }
    out
}

/// Gauge reading from the first row: the first numeric column is the value,
/// the second the total (100 when absent).
#[must_use]
pub fn extract_gauge(records: &[Record]) -> Option<(f64, f64)> {
    let first = records.first()?;
    let mut numbers = first.columns.iter().filter_map(|(_, v)| v.as_f64());
    let value = numbers.next()?;
    Some((value, numbers.next().unwrap_or(100.0)))
}

/// Columns for a matrix heatmap.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatrixColumns {
    /// Column keys.
    pub x: Vec<AxisKey>,
    /// Row keys.
    pub y: Vec<AxisKey>,
    /// Cell contributions.
    pub values: Vec<f64>,
    /// Caption for the columns (first column name).
    pub x_label: Option<String>,
    /// Caption for the rows (second column name).
    pub y_label: Option<String>,
}

impl MatrixColumns {
    /// True when there is nothing to pivot.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// Pick x/y/value columns: names containing `x`, `y`, then `value`,
/// `count` or `sum`; otherwise the first three columns. Without a value
/// column every row counts 1.
#[must_use]
pub fn extract_matrix(records: &[Record]) -> MatrixColumns {
    let Some(first) = records.first() else {
        return MatrixColumns::default();
    };
    let keys: Vec<&str> = first.keys().collect();

    let mut x_col = None;
    let mut y_col = None;
    let mut value_col = None;
    for &key in &keys {
        let lower = key.to_lowercase();
        if x_col.is_none() && lower.contains('x') {
            x_col = Some(key);
        } else if y_col.is_none() && lower.contains('y') {
            y_col = Some(key);
        } else if value_col.is_none() && ["value", "count", "sum"].iter().any(|w| lower.contains(w)) {
            value_col = Some(key);
        }
    }
    let x_col = x_col.or_else(|| keys.first().copied());
    let y_col = y_col.or_else(|| keys.get(1).copied());
    let value_col = value_col.or_else(|| keys.get(2).copied());

    let (Some(x_col), Some(y_col)) = (x_col, y_col) else {
        return MatrixColumns::default();
    };

    let key_of = |record: &Record, col: &str| record.get(col).map_or(AxisKey::Null, CellValue::to_axis_key);
    MatrixColumns {
        x: records.iter().map(|r| key_of(r, x_col)).collect(),
        y: records.iter().map(|r| key_of(r, y_col)).collect(),
        values: records
            .iter()
            .map(|r| match value_col.and_then(|c| r.get(c)) {
                Some(v) => v.as_f64().unwrap_or(0.0),
                None => 1.0,
            })
            .collect(),
        x_label: keys.first().map(ToString::to_string),
        y_label: keys.get(1).map(ToString::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(json: &str) -> Vec<Record> {
        records_from_json(json).expect("parsing rows should succeed")
    }

    #[test]
    fn test_records_keep_column_order() {
        let records = rows(r#"[{"zeta": 1, "alpha": "a", "mid": null}]"#);
        let keys: Vec<&str> = records[0].keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
        assert_eq!(records[0].get("mid"), Some(&CellValue::Null));
    }

    #[test]
    fn test_records_reject_non_array() {
        let err = records_from_json(r#"{"a": 1}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidRows(_)));
        let err = records_from_json("[1, 2]").unwrap_err();
        assert!(matches!(err, Error::InvalidRows(_)));
        assert!(matches!(records_from_json("[{").unwrap_err(), Error::Json(_)));
    }

    #[test]
    fn test_cell_value_numeric_reading() {
        assert_eq!(CellValue::from("3.5").as_f64(), Some(3.5));
        assert_eq!(CellValue::Bool(true).as_f64(), Some(1.0));
        assert_eq!(CellValue::Int(7).as_f64(), Some(7.0));
        assert_eq!(CellValue::Null.as_f64(), None);
        assert_eq!(CellValue::from("abc").as_f64(), None);
    }

    #[test]
    fn test_normalize_date_formats() {
        assert_eq!(normalize_date("2024-03-05").as_deref(), Some("2024-03-05"));
        assert_eq!(normalize_date("2024/03/05").as_deref(), Some("2024-03-05"));
        assert_eq!(normalize_date("05/03/2024").as_deref(), Some("2024-03-05"));
        assert_eq!(normalize_date("12/31/2024").as_deref(), Some("2024-12-31"));
        assert_eq!(normalize_date("2024-03-05 10:20:30.123").as_deref(), Some("2024-03-05 10:20:30"));
        assert_eq!(normalize_date("Tuesday"), None);
    }

    #[test]
    fn test_geo_rows_from_lat_lon() {
        let records = rows(r#"[{"lat": 40.7, "lon": -74.0, "color": "red"}, {"lat": "x", "lon": 1}]"#);
        let ChartRows::Geo(geo) = ChartRows::from_records(&records) else {
            panic!("lat/lon rows should route to Geo");
        };
        assert_eq!(geo.len(), 1);
        assert_eq!(geo[0].color.as_deref(), Some("red"));
        assert_eq!(geo[0].to_point().lon, -74.0);
    }

    #[test]
    fn test_numeric_color_becomes_value() {
        let records = rows(r#"[{"lat": 1, "lon": 2, "color": 5.5}]"#);
        let points = ChartRows::from_records(&records).points();
        assert_eq!(points[0].value, Some(5.5));
        assert_eq!(points[0].label, None);
    }

    #[test]
    fn test_series_rows() {
        let records = rows(r#"[{"x": "2024/01/02", "y": "12", "value": 3}]"#);
        let ChartRows::Series(series) = ChartRows::from_records(&records) else {
            panic!("x/y rows should route to Series");
        };
        assert_eq!(series[0].x, AxisKey::from("2024-01-02"));
        assert_eq!(series[0].y, Some(12.0));
        assert_eq!(series[0].value, Some(3.0));
        assert!(ChartRows::from_records(&records).points().is_empty());
    }

    #[test]
    fn test_extract_proportions_by_keyword() {
        let records = rows(r#"[{"total": 10, "category": "a"}, {"total": "bad", "category": "b"}]"#);
        let p = extract_proportions(&records, WAFFLE_KEYWORDS);
        assert_eq!(p.labels, vec!["a", "b"]);
        assert_eq!(p.values, vec![10.0, 0.0]);
    }

    #[test]
    fn test_null_label_reads_unknown() {
        let records = rows(r#"[{"category": null, "count": 2}, {"count": 1}]"#);
        let p = extract_proportions(&records, WAFFLE_KEYWORDS);
        assert_eq!(p.labels, vec!["Unknown", "Unknown"]);
        assert_eq!(p.values, vec![2.0, 1.0]);
    }

    #[test]
    fn test_extract_proportions_fallback() {
        let records = rows(r#"[{"k": "a", "v": 2}]"#);
        let p = extract_proportions(&records, WAFFLE_KEYWORDS);
        assert_eq!(p.labels, vec!["a"]);
        assert_eq!(p.values, vec![2.0]);

        let single = rows(r#"[{"n": 4}]"#);
        let p = extract_proportions(&single, WAFFLE_KEYWORDS);
        assert_eq!(p.labels, vec!["4"]);
        assert_eq!(p.values, vec![4.0]);
    }

    #[test]
    fn test_pie_keywords_accept_xy() {
        let records = rows(r#"[{"y": 3, "x": "east"}]"#);
        let p = extract_proportions(&records, PIE_KEYWORDS);
        assert_eq!(p.labels, vec!["east"]);
        assert_eq!(p.values, vec![3.0]);
    }

    #[test]
    fn test_extract_matrix_columns() {
        let records = rows(r#"[{"hour": 1, "weekday": "Mon", "count": 4}, {"hour": 2, "weekday": null}]"#);
        let m = extract_matrix(&records);
        // "hour" has neither x nor y, so positional fallback picks it
        assert_eq!(m.x, vec![AxisKey::from("1"), AxisKey::from("2")]);
        assert_eq!(m.y, vec![AxisKey::from("Mon"), AxisKey::Null]);
        assert_eq!(m.values, vec![4.0, 1.0]);
        assert_eq!(m.x_label.as_deref(), Some("hour"));
        assert_eq!(m.y_label.as_deref(), Some("weekday"));
    }

    #[test]
    fn test_extract_matrix_needs_two_columns() {
        let records = rows(r#"[{"only": 1}]"#);
        assert!(extract_matrix(&records).is_empty());
        assert!(extract_matrix(&[]).is_empty());
    }

    #[test]
    fn test_extract_gauge() {
        let records = rows(r#"[{"name": "cpu", "used": 42, "cap": 80}]"#);
        assert_eq!(extract_gauge(&records), Some((42.0, 80.0)));
        let records = rows(r#"[{"used": 42}]"#);
        assert_eq!(extract_gauge(&records), Some((42.0, 100.0)));
    }
}
