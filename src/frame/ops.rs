//! Eager transform kernels over `Table`.
//!
//! These are the evaluation targets of the lazy operation queue; each
//! returns a new table and leaves its input untouched.

use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::column::{
    millis_to_datetime, Cell, Column, ColumnType, DatetimeColumn, Float64Column, Int64Column,
    NestedColumn, StringColumn,
};
use crate::error::{Error, Result};
use crate::frame::Table;
use crate::stats;

// Key separator for row identity; \x1f never occurs in rendered cells
// produced by this crate's loaders.
const KEY_SEP: char = '\u{1f}';
const NULL_KEY: &str = "\u{1f}<null>";

impl Table {
    /// Project down to `names`, preserving the given order.
    pub fn select(&self, names: &[String]) -> Result<Table> {
        let mut out = Table::new();
        for name in names {
            let column = self.column(name)?.clone();
            out.add_column(name.clone(), column)?;
        }
        // A projection of zero columns still keeps the row count so later
        // stages see a consistent shape.
        if names.is_empty() {
            out.row_count = self.row_count;
        }
        Ok(out)
    }

    /// Gather the given row indices, in order, across all columns.
    pub fn take_rows(&self, indices: &[usize]) -> Result<Table> {
        for &idx in indices {
            if idx >= self.row_count {
                return Err(Error::IndexOutOfBounds {
                    index: idx,
                    size: self.row_count,
                });
            }
        }
        let mut out = Table::new();
        for (name, column) in self.iter_columns() {
            out.add_column(name.to_string(), take(column, indices))?;
        }
        if self.columns.is_empty() {
            out.row_count = indices.len();
        }
        Ok(out)
    }

    /// Keep rows where `mask` is true.
    pub fn filter_rows(&self, mask: &[bool]) -> Result<Table> {
        if mask.len() != self.row_count {
            return Err(Error::DimensionMismatch(format!(
                "filter mask has {} entries for {} rows",
                mask.len(),
                self.row_count
            )));
        }
        let indices: Vec<usize> = mask
            .iter()
            .enumerate()
            .filter_map(|(i, &keep)| keep.then_some(i))
            .collect();
        self.take_rows(&indices)
    }

    /// First `n` rows.
    pub fn head(&self, n: usize) -> Result<Table> {
        let indices: Vec<usize> = (0..self.row_count.min(n)).collect();
        self.take_rows(&indices)
    }

    /// Drop rows containing at least one null in `subset` (or in any column
    /// when `subset` is `None`).
    pub fn drop_nulls(&self, subset: Option<&[String]>) -> Result<Table> {
        let scope = self.scope_indices(subset)?;
        let indices: Vec<usize> = (0..self.row_count)
            .filter(|&row| !scope.iter().any(|&c| self.columns[c].is_null(row)))
            .collect();
        self.take_rows(&indices)
    }

    /// Remove duplicate rows over `subset` (or the full row), keeping the
    /// first occurrence.
    pub fn unique(&self, subset: Option<&[String]>) -> Result<Table> {
        let scope = self.scope_indices(subset)?;
        let mut seen = HashSet::with_capacity(self.row_count);
        let mut indices = Vec::new();
        for row in 0..self.row_count {
            let mut key = String::new();
            for &c in &scope {
                match self.columns[c].text(row) {
                    Some(text) => key.push_str(&text),
                    None => key.push_str(NULL_KEY),
                }
                key.push(KEY_SEP);
            }
            if seen.insert(key) {
                indices.push(row);
            }
        }
        self.take_rows(&indices)
    }

    /// Replace empty or whitespace-only values with null in the named string
    /// columns. Non-string columns pass through unchanged.
    pub fn blank_to_null(&self, columns: &[String]) -> Result<Table> {
        let mut out = self.clone();
        for name in columns {
            let column = self.column(name)?;
            if let Column::String(col) = column {
                let values: Vec<Option<String>> = col
                    .iter()
                    .map(|v| v.filter(|s| !s.trim().is_empty()).map(|s| s.to_string()))
                    .collect();
                out.replace_column(name, Column::String(StringColumn::from_options(values)))?;
            }
        }
        Ok(out)
    }

    /// Fill nulls in the named columns with `value`.
    ///
    /// An integral number fill keeps an `Int64` column integral; a
    /// fractional fill promotes it to `Float64`. String columns accept
    /// number fills as their text form. A `Null` fill is a no-op.
    pub fn fill_null(&self, columns: &[String], value: &Cell) -> Result<Table> {
        if value.is_null() {
            return Ok(self.clone());
        }
        let mut out = self.clone();
        for name in columns {
            let column = self.column(name)?;
            if column.null_count() == 0 {
                continue;
            }
            let filled = fill_column(name, column, value)?;
            out.replace_column(name, filled)?;
        }
        Ok(out)
    }

    /// Cast a column to the target type. Strict: the first value that does
    /// not parse aborts with `TypeConversion`; nulls pass through.
    pub fn cast_column(&self, name: &str, to: ColumnType) -> Result<Table> {
        let column = self.column(name)?;
        if column.column_type() == to {
            return Ok(self.clone());
        }
        let mut out = self.clone();
        out.replace_column(name, cast(name, column, to)?)?;
        Ok(out)
    }

    /// Replace each value of the named numeric columns with its z-score over
    /// the column's non-null values (sample standard deviation). A column
    /// with no non-null values is left unchanged; zero variance yields NaN
    /// for every non-null row.
    pub fn zscore(&self, columns: &[String]) -> Result<Table> {
        let mut out = self.clone();
        for name in columns {
            let column = self.column(name)?;
            if !matches!(column.column_type(), ColumnType::Int64 | ColumnType::Float64) {
                return Err(Error::InvalidOperation(format!(
                    "normalization requires a numeric column, '{}' is {:?}",
                    name,
                    column.column_type()
                )));
            }
            let values = column.f64_values();
            let Some(mean) = stats::mean(&values) else {
                continue;
            };
            let std = stats::std_dev(&values, 1).unwrap_or(f64::NAN);
            let scaled: Vec<Option<f64>> = (0..column.len())
                .map(|i| column.f64_at(i).map(|v| (v - mean) / std))
                .collect();
            out.replace_column(name, Column::Float64(Float64Column::from_options(scaled)))?;
        }
        Ok(out)
    }

    fn scope_indices(&self, subset: Option<&[String]>) -> Result<Vec<usize>> {
        match subset {
            Some(names) => names.iter().map(|n| self.column_index(n)).collect(),
            None => Ok((0..self.columns.len()).collect()),
        }
    }
}

fn take(column: &Column, indices: &[usize]) -> Column {
    match column {
        Column::Int64(col) => {
            let values = indices.iter().map(|&i| col.get(i)).collect();
            Column::Int64(Int64Column::from_options(values))
        }
        Column::Float64(col) => {
            let values = indices.iter().map(|&i| col.get(i)).collect();
            Column::Float64(Float64Column::from_options(values))
        }
        Column::String(col) => {
            let values = indices
                .iter()
                .map(|&i| col.get(i).map(|s| s.to_string()))
                .collect();
            Column::String(StringColumn::from_options(values))
        }
        Column::Datetime(col) => {
            let values = indices.iter().map(|&i| col.get(i)).collect();
            Column::Datetime(DatetimeColumn::from_options(values))
        }
        Column::Nested(col) => {
            let values = indices.iter().map(|&i| col.get(i).cloned()).collect();
            Column::Nested(NestedColumn::from_options(values))
        }
    }
}

fn fill_column(name: &str, column: &Column, value: &Cell) -> Result<Column> {
    match (column, value) {
        (Column::String(col), fill) => {
            let text = fill.to_text();
            let values: Vec<Option<String>> = col
                .iter()
                .map(|v| Some(v.map(|s| s.to_string()).unwrap_or_else(|| text.clone())))
                .collect();
            Ok(Column::String(StringColumn::from_options(values)))
        }
        (Column::Int64(col), Cell::Int(fill)) => {
            let values: Vec<Option<i64>> = col.iter().map(|v| Some(v.unwrap_or(*fill))).collect();
            Ok(Column::Int64(Int64Column::from_options(values)))
        }
        (Column::Int64(col), Cell::Float(fill)) => {
            if fill.fract() == 0.0 && fill.is_finite() {
                let int_fill = *fill as i64;
                let values: Vec<Option<i64>> =
                    col.iter().map(|v| Some(v.unwrap_or(int_fill))).collect();
                Ok(Column::Int64(Int64Column::from_options(values)))
            } else {
                let values: Vec<Option<f64>> = col
                    .iter()
                    .map(|v| Some(v.map(|i| i as f64).unwrap_or(*fill)))
                    .collect();
                Ok(Column::Float64(Float64Column::from_options(values)))
            }
        }
        (Column::Float64(col), Cell::Float(fill)) => {
            let values: Vec<Option<f64>> = col.iter().map(|v| Some(v.unwrap_or(*fill))).collect();
            Ok(Column::Float64(Float64Column::from_options(values)))
        }
        (Column::Float64(col), Cell::Int(fill)) => {
            let float_fill = *fill as f64;
            let values: Vec<Option<f64>> =
                col.iter().map(|v| Some(v.unwrap_or(float_fill))).collect();
            Ok(Column::Float64(Float64Column::from_options(values)))
        }
        (Column::Datetime(col), Cell::Datetime(fill)) => {
            let values: Vec<Option<NaiveDateTime>> =
                col.iter().map(|v| Some(v.unwrap_or(*fill))).collect();
            Ok(Column::Datetime(DatetimeColumn::from_options(values)))
        }
        (column, fill) => Err(Error::InvalidOperation(format!(
            "cannot fill {:?} column '{}' with {:?}",
            column.column_type(),
            name,
            fill
        ))),
    }
}

fn cast(name: &str, column: &Column, to: ColumnType) -> Result<Column> {
    let conversion_error = |value: String| Error::TypeConversion {
        column: name.to_string(),
        value,
        target: to,
    };

    match to {
        ColumnType::String => {
            let values: Vec<Option<String>> = (0..column.len()).map(|i| column.text(i)).collect();
            Ok(Column::String(StringColumn::from_options(values)))
        }
        ColumnType::Int64 => {
            let mut values = Vec::with_capacity(column.len());
            for i in 0..column.len() {
                values.push(match column {
                    Column::Int64(col) => col.get(i),
                    Column::Float64(col) => match col.get(i) {
                        Some(v) if v.is_finite() => Some(v.trunc() as i64),
                        Some(v) => return Err(conversion_error(v.to_string())),
                        None => None,
                    },
                    Column::String(col) => match col.get(i) {
                        Some(s) => Some(s.parse().map_err(|_| conversion_error(s.to_string()))?),
                        None => None,
                    },
                    Column::Datetime(col) => col.get_millis(i),
                    Column::Nested(col) => match col.get(i) {
                        Some(v) => return Err(conversion_error(v.to_string())),
                        None => None,
                    },
                });
            }
            Ok(Column::Int64(Int64Column::from_options(values)))
        }
        ColumnType::Float64 => {
            let mut values = Vec::with_capacity(column.len());
            for i in 0..column.len() {
                values.push(match column {
                    Column::Int64(col) => col.get(i).map(|v| v as f64),
                    Column::Float64(col) => col.get(i),
                    Column::String(col) => match col.get(i) {
                        Some(s) => Some(s.parse().map_err(|_| conversion_error(s.to_string()))?),
                        None => None,
                    },
                    Column::Datetime(col) => col.get_millis(i).map(|v| v as f64),
                    Column::Nested(col) => match col.get(i) {
                        Some(v) => return Err(conversion_error(v.to_string())),
                        None => None,
                    },
                });
            }
            Ok(Column::Float64(Float64Column::from_options(values)))
        }
        ColumnType::Datetime => {
            let mut values = Vec::with_capacity(column.len());
            for i in 0..column.len() {
                values.push(match column {
                    Column::Datetime(col) => col.get(i),
                    // Integers are read as epoch milliseconds.
                    Column::Int64(col) => match col.get(i) {
                        Some(v) => Some(
                            millis_to_datetime(v).ok_or_else(|| conversion_error(v.to_string()))?,
                        ),
                        None => None,
                    },
                    Column::String(col) => match col.get(i) {
                        Some(s) => Some(
                            parse_datetime_text(s).ok_or_else(|| conversion_error(s.to_string()))?,
                        ),
                        None => None,
                    },
                    Column::Float64(col) => match col.get(i) {
                        Some(v) => return Err(conversion_error(v.to_string())),
                        None => None,
                    },
                    Column::Nested(col) => match col.get(i) {
                        Some(v) => return Err(conversion_error(v.to_string())),
                        None => None,
                    },
                });
            }
            Ok(Column::Datetime(DatetimeColumn::from_options(values)))
        }
        ColumnType::Nested => Err(Error::InvalidOperation(format!(
            "cannot cast column '{}' to a nested type",
            name
        ))),
    }
}

fn parse_datetime_text(text: &str) -> Option<NaiveDateTime> {
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}
