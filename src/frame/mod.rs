//! Column-oriented table and its lazy query layer.

pub mod lazy;
pub mod materialize;
mod ops;

use std::collections::HashMap;
use std::fmt::{self, Debug, Display};

use crate::column::{Cell, Column, ColumnType};
use crate::error::{Error, Result};

/// Materialized table
/// Uses column-oriented storage; column order is stable under every
/// transform except explicit selection.
#[derive(Clone, Default)]
pub struct Table {
    // Column data
    pub(crate) columns: Vec<Column>,
    // Column name -> index mapping
    pub(crate) column_indices: HashMap<String, usize>,
    // Column order
    pub(crate) column_names: Vec<String>,
    // Row count
    pub(crate) row_count: usize,
}

impl Table {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from (name, column) pairs
    pub fn from_columns<I>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, Column)>,
    {
        let mut table = Table::new();
        for (name, column) in columns {
            table.add_column(name, column)?;
        }
        Ok(table)
    }

    /// Add a column. The first column fixes the row count; later columns
    /// must match it.
    pub fn add_column(&mut self, name: impl Into<String>, column: Column) -> Result<()> {
        let name = name.into();
        if self.column_indices.contains_key(&name) {
            return Err(Error::DuplicateColumnName(name));
        }
        if !self.columns.is_empty() && column.len() != self.row_count {
            return Err(Error::InconsistentRowCount {
                expected: self.row_count,
                found: column.len(),
            });
        }
        if self.columns.is_empty() {
            self.row_count = column.len();
        }
        self.column_indices.insert(name.clone(), self.columns.len());
        self.column_names.push(name);
        self.columns.push(column);
        Ok(())
    }

    /// Replace an existing column, keeping its position. The new column must
    /// match the table's row count.
    pub fn replace_column(&mut self, name: &str, column: Column) -> Result<()> {
        let idx = self.column_index(name)?;
        if column.len() != self.row_count {
            return Err(Error::InconsistentRowCount {
                expected: self.row_count,
                found: column.len(),
            });
        }
        self.columns[idx] = column;
        Ok(())
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    pub fn contains_column(&self, name: &str) -> bool {
        self.column_indices.contains_key(name)
    }

    pub(crate) fn column_index(&self, name: &str) -> Result<usize> {
        self.column_indices
            .get(name)
            .copied()
            .ok_or_else(|| Error::ColumnNotFound(name.to_string()))
    }

    /// Get a column by name
    pub fn column(&self, name: &str) -> Result<&Column> {
        Ok(&self.columns[self.column_index(name)?])
    }

    /// Iterate (name, column) pairs in column order
    pub fn iter_columns(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.column_names
            .iter()
            .map(|n| n.as_str())
            .zip(self.columns.iter())
    }

    /// Schema as (name, type) pairs in column order
    pub fn schema(&self) -> Vec<(String, ColumnType)> {
        self.iter_columns()
            .map(|(name, col)| (name.to_string(), col.column_type()))
            .collect()
    }

    /// Checked scalar access by row index and column name
    pub fn cell(&self, row: usize, column: &str) -> Result<Cell> {
        self.column(column)?.cell(row)
    }

    /// All cells of one row, in column order
    pub fn row_cells(&self, row: usize) -> Result<Vec<Cell>> {
        if row >= self.row_count {
            return Err(Error::IndexOutOfBounds {
                index: row,
                size: self.row_count,
            });
        }
        self.columns.iter().map(|col| col.cell(row)).collect()
    }

    /// Total number of null cells across all columns
    pub fn null_count(&self) -> usize {
        self.columns.iter().map(|col| col.null_count()).sum()
    }
}

impl Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        <Self as Debug>::fmt(self, f)
    }
}

impl Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Maximum display rows
        const MAX_ROWS: usize = 10;

        if self.columns.is_empty() {
            return write!(f, "Table (0 rows x 0 columns)");
        }

        writeln!(
            f,
            "Table ({} rows x {} columns):",
            self.row_count,
            self.columns.len()
        )?;

        write!(f, "{:<5} |", "idx")?;
        for name in &self.column_names {
            write!(f, " {:<15} |", name)?;
        }
        writeln!(f)?;

        write!(f, "{:-<5}-+", "")?;
        for _ in &self.column_names {
            write!(f, "-{:-<15}-+", "")?;
        }
        writeln!(f)?;

        let display_rows = std::cmp::min(self.row_count, MAX_ROWS);
        for i in 0..display_rows {
            write!(f, "{:<5} |", i)?;
            for col in &self.columns {
                let text = col.text(i).unwrap_or_else(|| "null".to_string());
                write!(f, " {:<15} |", text)?;
            }
            writeln!(f)?;
        }
        if self.row_count > MAX_ROWS {
            writeln!(f, "... ({} more rows)", self.row_count - MAX_ROWS)?;
        }
        Ok(())
    }
}
