//! Recipient row ingestion
//!
//! Rows arrive as a JSON array of objects. Column names are matched
//! case-insensitively after trimming, and only the first row is checked for
//! the required columns.

use anyhow::{bail, Context, Result};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Columns the first row must carry (normalized form)
pub const REQUIRED_COLUMNS: [&str; 3] = ["name", "course", "issuedate"];

/// Rendered in place of a missing or empty value
pub const UNKNOWN: &str = "Unknown";

/// One recipient, before an identifier is assigned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub name: String,
    pub course: String,
    pub issue_date: String,
}

/// Parse and normalize the rows of a records file
///
/// Input must be UTF-8 JSON; invalid bytes are an error, not replaced.
pub fn parse_rows(json: impl AsRef<[u8]>) -> Result<Vec<Row>> {
    let value: Value =
        serde_json::from_slice(json.as_ref()).context("Records are not valid JSON")?;
    let Value::Array(items) = value else {
        bail!("Records must be a JSON array of objects");
    };
    if items.is_empty() {
        bail!("Records file contains no rows");
    }

    let rows = items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(map) => Ok(normalize_keys(map)),
            _ => bail!("Row {} is not an object", i + 1),
        })
        .collect::<Result<Vec<_>>>()?;

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|column| !rows[0].contains_key(*column))
        .collect();
    if !missing.is_empty() {
        bail!("Missing required columns: {}", missing.join(", "));
    }

    Ok(rows
        .iter()
        .map(|row| Row {
            name: column(row, "name"),
            course: column(row, "course"),
            issue_date: column(row, "issuedate"),
        })
        .collect())
}

fn normalize_keys(map: Map<String, Value>) -> BTreeMap<String, Value> {
    map.into_iter()
        .map(|(key, value)| (key.trim().to_lowercase(), value))
        .collect()
}

fn column(row: &BTreeMap<String, Value>, key: &str) -> String {
    match row.get(key).map(value_to_string) {
        Some(text) if !text.is_empty() => text,
        _ => UNKNOWN.to_string(),
    }
}

/// Convert a JSON value to display text
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}
