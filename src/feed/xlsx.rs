//! Spreadsheet feeds: first worksheet, header row, one JSON object per row.
//!
//! Dotted headers nest, so a `price.price` column lands where the transformer
//! reads the supplier price.

use crate::{FeedError, Result};
use calamine::{open_workbook_from_rs, DataType, Reader, Xlsx};
use serde_json::{Map, Number, Value};
use std::io::Cursor;

/// Reads up to `limit` non-empty data rows. Empty cells are left out of the
/// row object so missing columns behave like missing fields; blank rows are
/// skipped and do not count towards the limit.
pub fn read_rows(data: &[u8], limit: usize) -> Result<Vec<Value>> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(data))
        .map_err(|e| FeedError::Parse(format!("failed to open workbook: {e}")))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| FeedError::Parse("no sheets found in workbook".into()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .ok_or_else(|| FeedError::Parse(format!("worksheet '{sheet_name}' is missing")))?
        .map_err(|e| FeedError::Parse(format!("failed to read worksheet: {e}")))?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header) => header.iter().map(|cell| cell.to_string().trim().to_string()).collect(),
        None => return Ok(vec![]),
    };

    Ok(rows
        .map(|row| row_object(&headers, row))
        .filter(|row| !row.is_empty())
        .take(limit)
        .map(Value::Object)
        .collect())
}

fn row_object(headers: &[String], row: &[DataType]) -> Map<String, Value> {
    let mut object = Map::new();
    for (header, cell) in headers.iter().zip(row) {
        if header.is_empty() { continue; }
        if let Some(value) = cell_value(cell) {
            insert_path(&mut object, header, value);
        }
    }
    object
}

/// Conflicting paths keep whichever value arrived first.
fn insert_path(object: &mut Map<String, Value>, path: &str, value: Value) {
    match path.split_once('.') {
        None => { object.entry(path.to_string()).or_insert(value); }
        Some((head, rest)) => {
            let child = object.entry(head.to_string()).or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(inner) = child {
                insert_path(inner, rest, value);
            }
        }
    }
}

fn cell_value(cell: &DataType) -> Option<Value> {
    match cell {
        DataType::Empty => None,
        DataType::String(s) if s.trim().is_empty() => None,
        DataType::String(s) => Some(Value::String(s.clone())),
        DataType::Int(i) => Some(Value::from(*i)),
        DataType::Float(f) => Number::from_f64(*f).map(Value::Number),
        DataType::Bool(b) => Some(Value::Bool(*b)),
        other => Some(Value::String(other.to_string())),
    }
}
