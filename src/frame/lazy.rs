//! Lazy query layer: an operation queue over a source table.

use std::fmt::{self, Debug};
use std::sync::Arc;

use crate::clean::filter::RowFilter;
use crate::column::{Cell, ColumnType};
use crate::error::Result;
use crate::frame::Table;

/// Table wrapper for lazy evaluation
///
/// Builder methods append operation descriptors; nothing is computed until
/// `collect`. Cloning shares the source table.
#[derive(Clone)]
pub struct LazyFrame {
    // Original table
    source: Arc<Table>,
    // Queue of operations to apply
    operations: Vec<Operation>,
}

/// Operations for lazy evaluation
#[derive(Debug, Clone)]
pub enum Operation {
    /// Select columns
    Select(Vec<String>),
    /// Keep rows matching a constrained predicate
    Filter(RowFilter),
    /// Drop rows with nulls in the subset (all columns when `None`)
    DropNulls(Option<Vec<String>>),
    /// Drop duplicate rows over the subset (full row when `None`)
    Unique(Option<Vec<String>>),
    /// Whitespace-only values to null in the named string columns
    BlankToNull(Vec<String>),
    /// Fill nulls in the named columns
    FillNull { columns: Vec<String>, value: Cell },
    /// Strict cast of one column
    Cast { column: String, to: ColumnType },
    /// Z-score normalization of the named numeric columns
    Normalize(Vec<String>),
    /// Keep the first n rows
    Limit(usize),
}

impl LazyFrame {
    /// Create a new LazyFrame over a source table
    pub fn new(table: Table) -> Self {
        Self {
            source: Arc::new(table),
            operations: Vec::new(),
        }
    }

    /// Pending operations, in application order
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    fn push(mut self, op: Operation) -> Self {
        log::debug!("queueing {:?}", op);
        self.operations.push(op);
        self
    }

    /// Select columns
    pub fn select<I, S>(self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns = columns.into_iter().map(Into::into).collect();
        self.push(Operation::Select(columns))
    }

    /// Filter rows with a constrained predicate
    pub fn filter(self, filter: RowFilter) -> Self {
        self.push(Operation::Filter(filter))
    }

    /// Drop rows containing nulls
    pub fn drop_nulls(self, subset: Option<Vec<String>>) -> Self {
        self.push(Operation::DropNulls(subset))
    }

    /// Drop duplicate rows
    pub fn unique(self, subset: Option<Vec<String>>) -> Self {
        self.push(Operation::Unique(subset))
    }

    /// Null out blank values in the named string columns
    pub fn blank_to_null(self, columns: Vec<String>) -> Self {
        self.push(Operation::BlankToNull(columns))
    }

    /// Fill nulls in the named columns with a scalar
    pub fn fill_null(self, columns: Vec<String>, value: Cell) -> Self {
        self.push(Operation::FillNull { columns, value })
    }

    /// Cast one column to a target type
    pub fn cast(self, column: impl Into<String>, to: ColumnType) -> Self {
        self.push(Operation::Cast {
            column: column.into(),
            to,
        })
    }

    /// Z-score normalize the named numeric columns
    pub fn normalize(self, columns: Vec<String>) -> Self {
        self.push(Operation::Normalize(columns))
    }

    /// Keep the first n rows
    pub fn limit(self, n: usize) -> Self {
        self.push(Operation::Limit(n))
    }

    /// Schema after all pending operations, without evaluating any data.
    ///
    /// Tracks selections, casts, normalization, and fill promotions; a
    /// selection naming an unknown column is skipped here and reported by
    /// `collect`.
    pub fn schema(&self) -> Vec<(String, ColumnType)> {
        let mut schema = self.source.schema();
        for op in &self.operations {
            match op {
                Operation::Select(names) => {
                    schema = names
                        .iter()
                        .filter_map(|n| {
                            schema
                                .iter()
                                .find(|(name, _)| name == n)
                                .map(|(name, ty)| (name.clone(), *ty))
                        })
                        .collect();
                }
                Operation::Cast { column, to } => {
                    for entry in schema.iter_mut() {
                        if &entry.0 == column {
                            entry.1 = *to;
                        }
                    }
                }
                Operation::Normalize(columns) => {
                    for entry in schema.iter_mut() {
                        if columns.contains(&entry.0) && entry.1 == ColumnType::Int64 {
                            entry.1 = ColumnType::Float64;
                        }
                    }
                }
                Operation::FillNull { columns, value } => {
                    // A fractional number fill promotes Int64 to Float64.
                    if let Cell::Float(f) = value {
                        if f.fract() != 0.0 {
                            for entry in schema.iter_mut() {
                                if columns.contains(&entry.0) && entry.1 == ColumnType::Int64 {
                                    entry.1 = ColumnType::Float64;
                                }
                            }
                        }
                    }
                }
                _ => {}
            }
        }
        schema
    }

    /// Execute the pending operations and return the resulting table.
    ///
    /// Errors carry the failing stage's own variant (`TypeConversion`,
    /// `ColumnNotFound`, ...); see `materialize` for the wrapped form.
    pub fn collect(self) -> Result<Table> {
        let mut table = (*self.source).clone();
        for op in self.operations {
            table = match op {
                Operation::Select(columns) => table.select(&columns)?,
                Operation::Filter(filter) => {
                    let mask = filter.mask(&table)?;
                    table.filter_rows(&mask)?
                }
                Operation::DropNulls(subset) => table.drop_nulls(subset.as_deref())?,
                Operation::Unique(subset) => table.unique(subset.as_deref())?,
                Operation::BlankToNull(columns) => table.blank_to_null(&columns)?,
                Operation::FillNull { columns, value } => table.fill_null(&columns, &value)?,
                Operation::Cast { column, to } => table.cast_column(&column, to)?,
                Operation::Normalize(columns) => table.zscore(&columns)?,
                Operation::Limit(n) => table.head(n)?,
            };
        }
        Ok(table)
    }
}

impl From<Table> for LazyFrame {
    fn from(table: Table) -> Self {
        LazyFrame::new(table)
    }
}

impl Debug for LazyFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LazyFrame({} rows x {} columns, {} pending ops)",
            self.source.row_count(),
            self.source.column_count(),
            self.operations.len()
        )
    }
}
