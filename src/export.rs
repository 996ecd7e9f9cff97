//! CSV export for uniform flat record lists.
//!
//! This is a purpose-built formatter, not a general CSV encoder: a field is
//! quoted only when it contains a comma, and embedded quote characters or
//! newlines inside fields are not escaped.

use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use crate::error::{ConnectError, Result};

/// Render a record list as CSV text. Column headers come from the first
/// record's field names in declaration order; each record becomes one
/// comma-joined row. Returns `None` for an empty list.
pub fn to_csv_string<T: Serialize>(records: &[T]) -> Result<Option<String>> {
    if records.is_empty() {
        return Ok(None);
    }

    let mut rows = Vec::with_capacity(records.len());
    for record in records {
        match serde_json::to_value(record)? {
            Value::Object(fields) => rows.push(fields),
            _ => {
                return Err(ConnectError::invalid_request(
                    "CSV export requires flat record types",
                ))
            }
        }
    }

    let headers: Vec<String> = rows[0].keys().cloned().collect();
    let mut out = headers.join(",");
    for row in &rows {
        out.push('\n');
        let line = headers
            .iter()
            .map(|name| csv_field(row.get(name)))
            .collect::<Vec<_>>()
            .join(",");
        out.push_str(&line);
    }
    Ok(Some(out))
}

/// Write the record list as CSV under `path`. Strict no-op for an empty
/// list: no file is created and no error is raised.
pub fn export_to_csv<T: Serialize>(records: &[T], path: impl AsRef<Path>) -> Result<()> {
    match to_csv_string(records)? {
        Some(text) => {
            std::fs::write(path, text)?;
            Ok(())
        }
        None => Ok(()),
    }
}

fn csv_field(value: Option<&Value>) -> String {
    let text = match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    };
    if text.contains(',') {
        format!("\"{}\"", text)
    } else {
        text
    }
}
