//! Exploratory profiling of a materialized table.

mod html;

use std::collections::HashSet;

use chrono::NaiveDateTime;

use crate::classify::{classify_table, ColumnKind};
use crate::column::{Column, ColumnType};
use crate::error::Result;
use crate::frame::Table;
use crate::stats::{self, DescriptiveStats};

const TOP_VALUES: usize = 10;

/// Per-column profiling summary.
#[derive(Debug, Clone)]
pub struct ColumnSummary {
    pub name: String,
    pub kind: ColumnKind,
    pub dtype: ColumnType,
    /// Non-null value count.
    pub count: usize,
    pub null_count: usize,
    pub distinct: usize,
    /// Numeric columns only.
    pub numeric: Option<DescriptiveStats>,
    /// Numeric columns only: exact-zero count.
    pub zero_count: usize,
    /// Most frequent values (capped), for non-numeric columns.
    pub top_values: Vec<(String, usize)>,
    /// String columns only: (min, max) rendered length.
    pub length_range: Option<(usize, usize)>,
    /// Datetime columns only: observed range.
    pub datetime_range: Option<(NaiveDateTime, NaiveDateTime)>,
}

/// Dataset-wide statistical profile.
#[derive(Debug, Clone)]
pub struct ProfileReport {
    pub title: String,
    pub row_count: usize,
    pub column_count: usize,
    pub missing_cells: usize,
    /// Missing cells over total cells, in [0, 1]; 0 for an empty table.
    pub missing_ratio: f64,
    pub duplicate_rows: usize,
    pub columns: Vec<ColumnSummary>,
}

impl ProfileReport {
    /// Profile every column of the table.
    pub fn from_table(table: &Table, title: impl Into<String>) -> Result<Self> {
        let kinds = classify_table(table);
        let columns = table
            .iter_columns()
            .zip(kinds)
            .map(|((name, column), (_, kind))| summarize_column(name, column, kind))
            .collect();

        let total_cells = table.row_count() * table.column_count();
        let missing_cells = table.null_count();
        let duplicate_rows = table.row_count() - table.unique(None)?.row_count();

        Ok(ProfileReport {
            title: title.into(),
            row_count: table.row_count(),
            column_count: table.column_count(),
            missing_cells,
            missing_ratio: if total_cells == 0 {
                0.0
            } else {
                missing_cells as f64 / total_cells as f64
            },
            duplicate_rows,
            columns,
        })
    }

    /// Render the profile as a self-contained HTML document.
    pub fn to_html(&self) -> String {
        html::render(self)
    }
}

fn summarize_column(name: &str, column: &Column, kind: ColumnKind) -> ColumnSummary {
    let len = column.len();
    let null_count = column.null_count();

    let texts: Vec<String> = (0..len).filter_map(|i| column.text(i)).collect();
    let distinct = texts.iter().collect::<HashSet<_>>().len();

    let numeric_values = column.f64_values();
    let numeric = stats::describe(&numeric_values).ok();
    let zero_count = numeric_values.iter().filter(|v| **v == 0.0).count();

    let top_values = if numeric.is_some() {
        Vec::new()
    } else {
        let mut counts = stats::value_counts(texts.iter().cloned());
        counts.truncate(TOP_VALUES);
        counts
    };

    let length_range = match column {
        Column::String(_) => texts
            .iter()
            .map(|t| t.chars().count())
            .fold(None, |acc: Option<(usize, usize)>, n| {
                Some(match acc {
                    Some((lo, hi)) => (lo.min(n), hi.max(n)),
                    None => (n, n),
                })
            }),
        _ => None,
    };

    let datetime_range = (0..len)
        .filter_map(|i| column.datetime_at(i))
        .fold(None, |acc: Option<(NaiveDateTime, NaiveDateTime)>, dt| {
            Some(match acc {
                Some((lo, hi)) => (lo.min(dt), hi.max(dt)),
                None => (dt, dt),
            })
        });

    ColumnSummary {
        name: name.to_string(),
        kind,
        dtype: column.column_type(),
        count: len - null_count,
        null_count,
        distinct,
        numeric,
        zero_count,
        top_values,
        length_range,
        datetime_range,
    }
}
