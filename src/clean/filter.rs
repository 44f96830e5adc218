//! Constrained row filters: one column, one predicate.
//!
//! Filters are plain column/predicate descriptors rather than free-form
//! expression strings, so nothing user-supplied is ever evaluated as code.

use chrono::{NaiveDate, NaiveTime};
use regex::Regex;

use crate::column::ColumnType;
use crate::error::{Error, Result};
use crate::frame::lazy::LazyFrame;
use crate::frame::Table;

/// A single-column row filter.
#[derive(Debug, Clone)]
pub struct RowFilter {
    pub column: String,
    pub predicate: FilterPredicate,
}

#[derive(Debug, Clone)]
pub enum FilterPredicate {
    /// Inclusive numeric range; nulls never match.
    NumericRange { min: f64, max: f64 },
    /// Inclusive date range; the upper bound is the end date at midnight.
    /// Nulls never match.
    DateRange { start: NaiveDate, end: NaiveDate },
    /// Literal substring containment over the value's text form. An empty
    /// pattern filters nothing (all rows kept, nulls included).
    Contains(String),
    /// Regular-expression match over the value's text form; nulls never
    /// match.
    Matches(String),
}

impl RowFilter {
    pub fn numeric_range(column: impl Into<String>, min: f64, max: f64) -> Self {
        RowFilter {
            column: column.into(),
            predicate: FilterPredicate::NumericRange { min, max },
        }
    }

    pub fn date_range(column: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        RowFilter {
            column: column.into(),
            predicate: FilterPredicate::DateRange { start, end },
        }
    }

    pub fn contains(column: impl Into<String>, pattern: impl Into<String>) -> Self {
        RowFilter {
            column: column.into(),
            predicate: FilterPredicate::Contains(pattern.into()),
        }
    }

    /// Regex filter; the pattern is validated here so a bad pattern fails at
    /// construction, not at evaluation.
    pub fn matches(column: impl Into<String>, pattern: impl Into<String>) -> Result<Self> {
        let pattern = pattern.into();
        Regex::new(&pattern)?;
        Ok(RowFilter {
            column: column.into(),
            predicate: FilterPredicate::Matches(pattern),
        })
    }

    /// Per-row keep mask against a materialized table.
    pub(crate) fn mask(&self, table: &Table) -> Result<Vec<bool>> {
        let column = table.column(&self.column)?;
        let rows = table.row_count();
        match &self.predicate {
            FilterPredicate::NumericRange { min, max } => {
                if !matches!(column.column_type(), ColumnType::Int64 | ColumnType::Float64) {
                    return Err(Error::InvalidOperation(format!(
                        "range filter requires a numeric column, '{}' is {:?}",
                        self.column,
                        column.column_type()
                    )));
                }
                Ok((0..rows)
                    .map(|i| {
                        column
                            .f64_at(i)
                            .map(|v| v >= *min && v <= *max)
                            .unwrap_or(false)
                    })
                    .collect())
            }
            FilterPredicate::DateRange { start, end } => {
                if column.column_type() != ColumnType::Datetime {
                    return Err(Error::InvalidOperation(format!(
                        "date filter requires a datetime column, '{}' is {:?}",
                        self.column,
                        column.column_type()
                    )));
                }
                let lo = start.and_time(NaiveTime::MIN);
                let hi = end.and_time(NaiveTime::MIN);
                Ok((0..rows)
                    .map(|i| {
                        column
                            .datetime_at(i)
                            .map(|v| v >= lo && v <= hi)
                            .unwrap_or(false)
                    })
                    .collect())
            }
            FilterPredicate::Contains(pattern) => {
                if pattern.is_empty() {
                    return Ok(vec![true; rows]);
                }
                Ok((0..rows)
                    .map(|i| {
                        column
                            .text(i)
                            .map(|t| t.contains(pattern.as_str()))
                            .unwrap_or(false)
                    })
                    .collect())
            }
            FilterPredicate::Matches(pattern) => {
                let re = Regex::new(pattern)?;
                Ok((0..rows)
                    .map(|i| column.text(i).map(|t| re.is_match(&t)).unwrap_or(false))
                    .collect())
            }
        }
    }
}

/// Current min/max of a numeric column, the default bounds for a range
/// filter; `None` when the column has no non-null values.
pub fn numeric_bounds(lf: &LazyFrame, column: &str) -> Result<Option<(f64, f64)>> {
    let table = lf.clone().collect()?;
    let values = table.column(column)?.f64_values();
    Ok(min_max(&values))
}

/// Current min/max dates of a datetime column, the default bounds for a
/// date filter; `None` when the column has no non-null values.
pub fn date_bounds(lf: &LazyFrame, column: &str) -> Result<Option<(NaiveDate, NaiveDate)>> {
    let table = lf.clone().collect()?;
    let column = table.column(column)?;
    let mut bounds: Option<(NaiveDate, NaiveDate)> = None;
    for i in 0..column.len() {
        if let Some(dt) = column.datetime_at(i) {
            let date = dt.date();
            bounds = Some(match bounds {
                Some((lo, hi)) => (lo.min(date), hi.max(date)),
                None => (date, date),
            });
        }
    }
    Ok(bounds)
}

fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    values.iter().fold(None, |acc, &v| {
        Some(match acc {
            Some((lo, hi)) => (lo.min(v), hi.max(v)),
            None => (v, v),
        })
    })
}
