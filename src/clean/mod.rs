//! The cleaning transform pipeline.
//!
//! A `Cleaner` is an ordered list of stages applied to a lazy frame; each
//! stage appends operations and returns a new frame, so re-applying the same
//! configuration is idempotent. Stages that depend on column kinds
//! (blank normalization, replace fills) classify the frame as it stands when
//! the stage runs.

pub mod filter;

use chrono::NaiveDateTime;

use crate::classify::{classify_frame, ColumnKind};
use crate::clean::filter::RowFilter;
use crate::column::{unix_epoch, Cell, ColumnType};
use crate::error::Result;
use crate::frame::lazy::LazyFrame;

/// Policy for rows with missing values.
#[derive(Debug, Clone)]
pub enum MissingPolicy {
    /// Leave nulls in place.
    Ignore,
    /// Drop every row with at least one null in the subset (all columns
    /// when `None`).
    Delete { subset: Option<Vec<String>> },
    /// Fill nulls by column kind.
    Replace {
        string_fill: String,
        number_fill: f64,
        datetime_fill: NaiveDateTime,
    },
}

impl MissingPolicy {
    /// The replace policy with its stock defaults: `"blank"`, `0.0`, and
    /// the Unix epoch.
    pub fn replace_defaults() -> Self {
        MissingPolicy::Replace {
            string_fill: "blank".to_string(),
            number_fill: 0.0,
            datetime_fill: unix_epoch(),
        }
    }
}

impl Default for MissingPolicy {
    fn default() -> Self {
        MissingPolicy::Ignore
    }
}

/// One configurable stage of the cleaning pipeline.
#[derive(Debug, Clone)]
pub enum CleanStage {
    /// Whitespace-only values to null in string-classified columns.
    BlankNormalize,
    /// Missing-value handling. Blank normalization always runs first within
    /// this stage, whatever the policy.
    HandleMissing(MissingPolicy),
    /// Remove duplicate rows (full row, or a key subset), keeping the first
    /// occurrence.
    Dedup { subset: Option<Vec<String>> },
    /// Project down to the chosen columns, in the chosen order.
    SelectColumns(Vec<String>),
    /// Strict per-column casts.
    CastTypes(Vec<(String, ColumnType)>),
    /// Z-score normalization of the named numeric columns.
    Normalize(Vec<String>),
    /// One constrained row filter.
    Filter(RowFilter),
}

/// Pipeline of cleaning stages applied in order.
#[derive(Debug, Clone, Default)]
pub struct Cleaner {
    /// Pipeline stages
    pub stages: Vec<CleanStage>,
}

impl Cleaner {
    /// Create a new empty cleaner
    pub fn new() -> Self {
        Cleaner { stages: Vec::new() }
    }

    /// Add a stage to the pipeline
    pub fn add_stage(&mut self, stage: CleanStage) -> &mut Self {
        self.stages.push(stage);
        self
    }

    /// Builder-style stage append
    pub fn with_stage(mut self, stage: CleanStage) -> Self {
        self.stages.push(stage);
        self
    }

    /// Apply every stage to the frame, in order.
    pub fn apply(&self, lf: LazyFrame) -> Result<LazyFrame> {
        let mut lf = lf;
        for stage in &self.stages {
            lf = apply_stage(stage, lf)?;
        }
        Ok(lf)
    }
}

fn apply_stage(stage: &CleanStage, lf: LazyFrame) -> Result<LazyFrame> {
    match stage {
        CleanStage::BlankNormalize => blank_normalize(lf),
        CleanStage::HandleMissing(policy) => {
            let lf = blank_normalize(lf)?;
            match policy {
                MissingPolicy::Ignore => Ok(lf),
                MissingPolicy::Delete { subset } => Ok(lf.drop_nulls(subset.clone())),
                MissingPolicy::Replace {
                    string_fill,
                    number_fill,
                    datetime_fill,
                } => {
                    let kinds = classify_frame(&lf)?;
                    let by_kind = |kind: ColumnKind| -> Vec<String> {
                        kinds
                            .iter()
                            .filter(|(_, k)| *k == kind)
                            .map(|(name, _)| name.clone())
                            .collect()
                    };
                    let mut lf = lf;
                    let string_cols = by_kind(ColumnKind::Str);
                    if !string_cols.is_empty() {
                        lf = lf.fill_null(string_cols, Cell::Str(string_fill.clone()));
                    }
                    let numeric_cols = by_kind(ColumnKind::Numeric);
                    if !numeric_cols.is_empty() {
                        lf = lf.fill_null(numeric_cols, Cell::Float(*number_fill));
                    }
                    let datetime_cols = by_kind(ColumnKind::Datetime);
                    if !datetime_cols.is_empty() {
                        lf = lf.fill_null(datetime_cols, Cell::Datetime(*datetime_fill));
                    }
                    Ok(lf)
                }
            }
        }
        CleanStage::Dedup { subset } => Ok(lf.unique(subset.clone())),
        CleanStage::SelectColumns(names) => Ok(lf.select(names.clone())),
        CleanStage::CastTypes(casts) => {
            let mut lf = lf;
            for (column, to) in casts {
                lf = lf.cast(column.clone(), *to);
            }
            Ok(lf)
        }
        CleanStage::Normalize(columns) => Ok(lf.normalize(columns.clone())),
        CleanStage::Filter(filter) => Ok(lf.filter(filter.clone())),
    }
}

fn blank_normalize(lf: LazyFrame) -> Result<LazyFrame> {
    let kinds = classify_frame(&lf)?;
    let string_cols: Vec<String> = kinds
        .into_iter()
        .filter(|(_, kind)| *kind == ColumnKind::Str)
        .map(|(name, _)| name)
        .collect();
    if string_cols.is_empty() {
        Ok(lf)
    } else {
        Ok(lf.blank_to_null(string_cols))
    }
}
