//! JSON record reading.
//!
//! Accepts an array of objects or newline-delimited objects. Scalar columns
//! follow the CSV inference rules; object- or array-valued fields become
//! nested columns, which survive only until materialization.

use std::io::Read;

use serde_json::Value;

use crate::column::{Column, Float64Column, Int64Column, NestedColumn, StringColumn};
use crate::error::{Error, Result};
use crate::frame::Table;

/// Read a table from a JSON byte stream.
pub fn read_json<R: Read>(mut reader: R) -> Result<Table> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    let records = parse_records(&text)?;

    // Union of keys in first-seen order; late keys backfill nulls.
    let mut names: Vec<String> = Vec::new();
    let mut columns: Vec<Vec<Option<Value>>> = Vec::new();
    for (row, record) in records.iter().enumerate() {
        for (key, value) in record {
            let idx = match names.iter().position(|n| n == key) {
                Some(idx) => idx,
                None => {
                    names.push(key.clone());
                    columns.push(vec![None; row]);
                    names.len() - 1
                }
            };
            columns[idx].push(if value.is_null() {
                None
            } else {
                Some(value.clone())
            });
        }
        for column in columns.iter_mut() {
            if column.len() <= row {
                column.push(None);
            }
        }
    }

    log::info!("read JSON: {} rows x {} columns", records.len(), names.len());

    let mut table = Table::new();
    for (name, values) in names.into_iter().zip(columns) {
        table.add_column(name, infer_column(values))?;
    }
    Ok(table)
}

fn parse_records(text: &str) -> Result<Vec<serde_json::Map<String, Value>>> {
    let trimmed = text.trim();
    let values: Vec<Value> = if trimmed.starts_with('[') {
        match serde_json::from_str(trimmed)? {
            Value::Array(items) => items,
            _ => Vec::new(),
        }
    } else {
        trimmed
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(serde_json::from_str)
            .collect::<std::result::Result<_, _>>()?
    };

    values
        .into_iter()
        .map(|v| match v {
            Value::Object(map) => Ok(map),
            other => Err(Error::InvalidInput(format!(
                "expected a JSON object per record, got {}",
                other
            ))),
        })
        .collect()
}

fn infer_column(values: Vec<Option<Value>>) -> Column {
    let non_null: Vec<&Value> = values.iter().flatten().collect();

    if non_null.iter().any(|v| v.is_object() || v.is_array()) {
        return Column::Nested(NestedColumn::from_options(values));
    }

    if !non_null.is_empty() && non_null.iter().all(|v| v.as_i64().is_some()) {
        let ints = values
            .iter()
            .map(|v| v.as_ref().and_then(|v| v.as_i64()))
            .collect();
        return Column::Int64(Int64Column::from_options(ints));
    }

    if !non_null.is_empty() && non_null.iter().all(|v| v.as_f64().is_some()) {
        let floats = values
            .iter()
            .map(|v| v.as_ref().and_then(|v| v.as_f64()))
            .collect();
        return Column::Float64(Float64Column::from_options(floats));
    }

    // Everything else (strings, booleans, mixtures) renders as text.
    let texts = values
        .iter()
        .map(|v| {
            v.as_ref().map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
        })
        .collect();
    Column::String(StringColumn::from_options(texts))
}
