//! Forcing a lazy frame into a concrete table.

use crate::column::ColumnType;
use crate::error::{Error, Result};
use crate::frame::lazy::LazyFrame;
use crate::frame::Table;

/// Result of materialization: the concrete table plus the names of any
/// nested columns that had to be dropped.
#[derive(Debug, Clone)]
pub struct Materialized {
    pub table: Table,
    pub dropped: Vec<String>,
}

/// Evaluate all pending transforms.
///
/// Nested columns cannot be represented in a materialized table; they are
/// dropped up front and reported by name. Any evaluation failure is wrapped
/// as `Error::Materialization` with the stage error as its source; callers
/// wanting the raw stage error should use `LazyFrame::collect` directly.
pub fn materialize(lf: LazyFrame) -> Result<Materialized> {
    let schema = lf.schema();
    let dropped: Vec<String> = schema
        .iter()
        .filter(|(_, ty)| *ty == ColumnType::Nested)
        .map(|(name, _)| name.clone())
        .collect();

    let lf = if dropped.is_empty() {
        lf
    } else {
        log::warn!("dropping unsupported nested columns: {:?}", dropped);
        let keep: Vec<String> = schema
            .iter()
            .filter(|(_, ty)| *ty != ColumnType::Nested)
            .map(|(name, _)| name.clone())
            .collect();
        lf.select(keep)
    };

    let table = lf.collect().map_err(Error::materialization)?;
    Ok(Materialized { table, dropped })
}
