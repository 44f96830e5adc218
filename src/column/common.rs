use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::column::{DatetimeColumn, Float64Column, Int64Column, NestedColumn, StringColumn};
use crate::error::{Error, Result};

/// Concrete storage type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    Int64,
    Float64,
    String,
    Datetime,
    /// Structured values (objects/arrays); only produced by the JSON reader
    /// and dropped at materialization.
    Nested,
}

/// Enum representing a column
#[derive(Debug, Clone)]
pub enum Column {
    Int64(Int64Column),
    Float64(Float64Column),
    String(StringColumn),
    Datetime(DatetimeColumn),
    Nested(NestedColumn),
}

/// A dynamically-typed scalar extracted from (or destined for) a table cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Int(i64),
    Float(f64),
    Str(String),
    Datetime(NaiveDateTime),
}

impl Cell {
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Text rendering; nulls render as the empty string.
    pub fn to_text(&self) -> String {
        match self {
            Cell::Null => String::new(),
            Cell::Int(v) => v.to_string(),
            Cell::Float(v) => v.to_string(),
            Cell::Str(v) => v.clone(),
            Cell::Datetime(v) => v.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_text())
    }
}

/// Utility functions for column operations
pub mod utils {
    use std::sync::Arc;

    /// Creates a null bitmask from per-row null flags, or `None` when the
    /// column has no nulls.
    pub fn create_bitmask(nulls: &[bool]) -> Option<Arc<[u8]>> {
        if !nulls.iter().any(|&is_null| is_null) {
            return None;
        }
        let bytes_needed = (nulls.len() + 7) / 8;
        let mut data = vec![0u8; bytes_needed];
        for (i, &is_null) in nulls.iter().enumerate() {
            if is_null {
                data[i / 8] |= 1 << (i % 8);
            }
        }
        Some(data.into())
    }

    /// Checks whether a bit is set in a bitmask.
    pub fn is_set(mask: &[u8], index: usize) -> bool {
        let byte_idx = index / 8;
        byte_idx < mask.len() && (mask[byte_idx] & (1 << (index % 8))) != 0
    }

    /// Counts the set bits over the first `len` positions.
    pub fn count_set(mask: &[u8], len: usize) -> usize {
        (0..len).filter(|&i| is_set(mask, i)).count()
    }
}

impl Column {
    /// Returns the length of the column
    pub fn len(&self) -> usize {
        match self {
            Column::Int64(col) => col.len(),
            Column::Float64(col) => col.len(),
            Column::String(col) => col.len(),
            Column::Datetime(col) => col.len(),
            Column::Nested(col) => col.len(),
        }
    }

    /// Returns whether the column is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the type of the column
    pub fn column_type(&self) -> ColumnType {
        match self {
            Column::Int64(_) => ColumnType::Int64,
            Column::Float64(_) => ColumnType::Float64,
            Column::String(_) => ColumnType::String,
            Column::Datetime(_) => ColumnType::Datetime,
            Column::Nested(_) => ColumnType::Nested,
        }
    }

    /// Whether the value at `index` is null. Out-of-range indices are not
    /// null; use `cell` for checked access.
    pub fn is_null(&self, index: usize) -> bool {
        match self {
            Column::Int64(col) => col.is_null(index),
            Column::Float64(col) => col.is_null(index),
            Column::String(col) => col.is_null(index),
            Column::Datetime(col) => col.is_null(index),
            Column::Nested(col) => col.is_null(index),
        }
    }

    /// Number of null values in the column.
    pub fn null_count(&self) -> usize {
        match self {
            Column::Int64(col) => col.null_count(),
            Column::Float64(col) => col.null_count(),
            Column::String(col) => col.null_count(),
            Column::Datetime(col) => col.null_count(),
            Column::Nested(col) => col.null_count(),
        }
    }

    /// Checked scalar access. Nested values surface as their JSON text.
    pub fn cell(&self, index: usize) -> Result<Cell> {
        if index >= self.len() {
            return Err(Error::IndexOutOfBounds {
                index,
                size: self.len(),
            });
        }
        Ok(match self {
            Column::Int64(col) => col.get(index).map_or(Cell::Null, Cell::Int),
            Column::Float64(col) => col.get(index).map_or(Cell::Null, Cell::Float),
            Column::String(col) => col.get(index).map_or(Cell::Null, |v| Cell::Str(v.to_string())),
            Column::Datetime(col) => col.get(index).map_or(Cell::Null, Cell::Datetime),
            Column::Nested(col) => col
                .get(index)
                .map_or(Cell::Null, |v| Cell::Str(v.to_string())),
        })
    }

    /// Text rendering of the value at `index`; `None` when null.
    ///
    /// The caller is expected to stay within bounds; out-of-range reads
    /// return `None` like nulls do.
    pub fn text(&self, index: usize) -> Option<String> {
        if index >= self.len() {
            return None;
        }
        match self {
            Column::Int64(col) => col.get(index).map(|v| v.to_string()),
            Column::Float64(col) => col.get(index).map(|v| v.to_string()),
            Column::String(col) => col.get(index).map(|v| v.to_string()),
            Column::Datetime(col) => col
                .get(index)
                .map(|v| v.format("%Y-%m-%d %H:%M:%S").to_string()),
            Column::Nested(col) => col.get(index).map(|v| v.to_string()),
        }
    }

    /// Numeric view of the value at `index`; `None` for nulls and for
    /// non-numeric column types.
    pub fn f64_at(&self, index: usize) -> Option<f64> {
        match self {
            Column::Int64(col) => col.get(index).map(|v| v as f64),
            Column::Float64(col) => col.get(index),
            _ => None,
        }
    }

    /// Datetime view of the value at `index`; `None` for nulls and for
    /// non-temporal column types.
    pub fn datetime_at(&self, index: usize) -> Option<NaiveDateTime> {
        match self {
            Column::Datetime(col) => col.get(index),
            _ => None,
        }
    }

    /// Non-null numeric values in row order (empty for non-numeric columns).
    pub fn f64_values(&self) -> Vec<f64> {
        (0..self.len()).filter_map(|i| self.f64_at(i)).collect()
    }
}
