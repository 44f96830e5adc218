//! Heuristic column classification for UI and transform decisions.
//!
//! Classification is a pure function of a column's current values: every
//! value of every column is re-scanned on each call (O(rows x columns)), so
//! callers driving a rendering pass should classify once and reuse the
//! result. A later cast invalidates earlier classifications.

use serde::{Deserialize, Serialize};

use crate::column::{Column, ColumnType};
use crate::error::Result;
use crate::frame::lazy::LazyFrame;
use crate::frame::Table;

/// Classification of a column for cleaning purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnKind {
    Numeric,
    Str,
    Datetime,
    /// Nested columns; no transform applies.
    Unsupported,
}

/// Classify every column of a materialized table.
pub fn classify_table(table: &Table) -> Vec<(String, ColumnKind)> {
    table
        .iter_columns()
        .map(|(name, column)| (name.to_string(), classify_column(column)))
        .collect()
}

/// Classify every column a lazy frame would produce.
///
/// Evaluates the pending chain on a clone of the frame; the frame itself is
/// untouched.
pub fn classify_frame(lf: &LazyFrame) -> Result<Vec<(String, ColumnKind)>> {
    let table = lf.clone().collect()?;
    Ok(classify_table(&table))
}

fn classify_column(column: &Column) -> ColumnKind {
    match column.column_type() {
        ColumnType::Datetime => ColumnKind::Datetime,
        ColumnType::Nested => ColumnKind::Unsupported,
        _ => {
            // Render every value to text and test the non-blank ones with
            // the numeric predicate. Blank means empty after trimming; the
            // predicate itself sees the raw text, so padded numbers count
            // as strings.
            let mut any_non_blank = false;
            for i in 0..column.len() {
                let Some(text) = column.text(i) else {
                    continue;
                };
                if text.trim().is_empty() {
                    continue;
                }
                if !is_numeric_text(&text) {
                    return ColumnKind::Str;
                }
                any_non_blank = true;
            }
            if any_non_blank {
                ColumnKind::Numeric
            } else {
                // All-null or all-blank columns classify as strings.
                ColumnKind::Str
            }
        }
    }
}

/// Numeric predicate: optional leading sign, at most one decimal point,
/// otherwise ASCII digits only, with at least one digit.
fn is_numeric_text(text: &str) -> bool {
    let rest = text.strip_prefix(['+', '-']).unwrap_or(text);
    let mut digits = 0usize;
    let mut seen_dot = false;
    for ch in rest.chars() {
        match ch {
            '0'..='9' => digits += 1,
            '.' if !seen_dot => seen_dot = true,
            _ => return false,
        }
    }
    digits > 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_text() {
        assert!(is_numeric_text("42"));
        assert!(is_numeric_text("4.2"));
        assert!(is_numeric_text("-42"));
        assert!(is_numeric_text("+0.5"));
        assert!(is_numeric_text("5."));
        assert!(is_numeric_text(".5"));

        assert!(!is_numeric_text(""));
        assert!(!is_numeric_text("."));
        assert!(!is_numeric_text("-"));
        assert!(!is_numeric_text(" 5"));
        assert!(!is_numeric_text("1.2.3"));
        assert!(!is_numeric_text("1e5"));
        assert!(!is_numeric_text("N/A"));
    }
}
