//! Feature preprocessing: imputation, scaling, and encoding.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::column::{Cell, Column, ColumnType};
use crate::error::{Error, Result};
use crate::frame::Table;
use crate::stats;

/// Standard scaler over a fixed set of numeric features.
///
/// Uses population standard deviation, the convention of the usual ML
/// scalers (the cleaning pipeline's z-score stage uses the sample estimator
/// instead). A zero-variance feature scales by 1 so transforms stay finite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    means: Vec<f64>,
    stds: Vec<f64>,
}

impl StandardScaler {
    /// Fit means and deviations over column-major feature values.
    pub fn fit(columns: &[Vec<f64>]) -> Self {
        let mut means = Vec::with_capacity(columns.len());
        let mut stds = Vec::with_capacity(columns.len());
        for values in columns {
            let mean = stats::mean(values).unwrap_or(0.0);
            let std = stats::std_dev(values, 0).unwrap_or(0.0);
            means.push(mean);
            stds.push(if std == 0.0 { 1.0 } else { std });
        }
        StandardScaler { means, stds }
    }

    pub fn mean(&self, feature: usize) -> f64 {
        self.means[feature]
    }

    pub fn scale(&self, feature: usize, value: f64) -> f64 {
        (value - self.means[feature]) / self.stds[feature]
    }
}

/// One-hot encoder over a fixed set of categorical features.
///
/// Categories are learned at fit time; unknown categories (and nulls)
/// encode as all-zeros rather than erroring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneHotEncoder {
    categories: Vec<Vec<String>>,
}

impl OneHotEncoder {
    /// Learn sorted distinct categories per feature from rendered values.
    pub fn fit(columns: &[Vec<String>]) -> Self {
        let categories = columns
            .iter()
            .map(|values| {
                let mut distinct: Vec<String> = values.to_vec();
                distinct.sort();
                distinct.dedup();
                distinct
            })
            .collect();
        OneHotEncoder { categories }
    }

    pub fn width(&self) -> usize {
        self.categories.iter().map(|c| c.len()).sum()
    }

    /// Append the encoding of `value` for `feature` to the output row.
    pub fn encode_into(&self, feature: usize, value: Option<&str>, out: &mut Vec<f64>) {
        for category in &self.categories[feature] {
            let hit = value == Some(category.as_str());
            out.push(if hit { 1.0 } else { 0.0 });
        }
    }
}

/// The full feature transform for one trained model: which columns are
/// numeric vs categorical, plus the fitted scaler and encoder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preprocessor {
    numeric: Vec<String>,
    categorical: Vec<String>,
    scaler: StandardScaler,
    encoder: OneHotEncoder,
}

impl Preprocessor {
    /// Fit on a training table. Numeric columns are scaled; string and
    /// datetime columns (rendered as text) are one-hot encoded; nested
    /// columns must have been excluded by the caller.
    pub fn fit(table: &Table, feature_columns: &[String]) -> Result<Self> {
        let mut numeric = Vec::new();
        let mut categorical = Vec::new();
        for name in feature_columns {
            let column = table.column(name)?;
            match column.column_type() {
                ColumnType::Int64 | ColumnType::Float64 => numeric.push(name.clone()),
                ColumnType::Nested => {
                    return Err(Error::InvalidOperation(format!(
                        "nested column '{}' cannot be used as a feature",
                        name
                    )))
                }
                _ => categorical.push(name.clone()),
            }
        }

        let numeric_values: Vec<Vec<f64>> = numeric
            .iter()
            .map(|name| Ok(table.column(name)?.f64_values()))
            .collect::<Result<_>>()?;
        let categorical_values: Vec<Vec<String>> = categorical
            .iter()
            .map(|name| {
                let column = table.column(name)?;
                Ok((0..column.len()).filter_map(|i| column.text(i)).collect())
            })
            .collect::<Result<_>>()?;

        Ok(Preprocessor {
            scaler: StandardScaler::fit(&numeric_values),
            encoder: OneHotEncoder::fit(&categorical_values),
            numeric,
            categorical,
        })
    }

    pub fn n_features(&self) -> usize {
        self.numeric.len() + self.encoder.width()
    }

    /// Every column this preprocessor consumes.
    pub fn feature_columns(&self) -> impl Iterator<Item = &str> {
        self.numeric
            .iter()
            .chain(self.categorical.iter())
            .map(|s| s.as_str())
    }

    /// Build the row-major design matrix for a table. A null numeric cell
    /// falls back to the fitted mean (scaling to zero).
    pub fn transform(&self, table: &Table) -> Result<Vec<Vec<f64>>> {
        let numeric_cols: Vec<&Column> = self
            .numeric
            .iter()
            .map(|n| table.column(n))
            .collect::<Result<_>>()?;
        let categorical_cols: Vec<&Column> = self
            .categorical
            .iter()
            .map(|n| table.column(n))
            .collect::<Result<_>>()?;

        let mut rows = Vec::with_capacity(table.row_count());
        for row in 0..table.row_count() {
            let mut out = Vec::with_capacity(self.n_features());
            for (i, column) in numeric_cols.iter().enumerate() {
                let value = column.f64_at(row).unwrap_or_else(|| self.scaler.mean(i));
                out.push(self.scaler.scale(i, value));
            }
            for (i, column) in categorical_cols.iter().enumerate() {
                let text = column.text(row);
                self.encoder.encode_into(i, text.as_deref(), &mut out);
            }
            rows.push(out);
        }
        Ok(rows)
    }

    /// Encode a single row given by (column name, cell) pairs. Every feature
    /// column must be present; numeric features accept numeric cells or
    /// parseable text.
    pub fn transform_row(&self, cells: &HashMap<String, Cell>) -> Result<Vec<f64>> {
        let mut out = Vec::with_capacity(self.n_features());
        for (i, name) in self.numeric.iter().enumerate() {
            let cell = cells
                .get(name)
                .ok_or_else(|| Error::InvalidInput(format!("missing feature '{}'", name)))?;
            let value = match cell {
                Cell::Int(v) => *v as f64,
                Cell::Float(v) => *v,
                Cell::Null => self.scaler.mean(i),
                Cell::Str(s) => s.parse().map_err(|_| {
                    Error::InvalidInput(format!(
                        "feature '{}' expects a number, got '{}'",
                        name, s
                    ))
                })?,
                Cell::Datetime(_) => {
                    return Err(Error::InvalidInput(format!(
                        "feature '{}' expects a number, got a datetime",
                        name
                    )))
                }
            };
            out.push(self.scaler.scale(i, value));
        }
        for (i, name) in self.categorical.iter().enumerate() {
            let cell = cells
                .get(name)
                .ok_or_else(|| Error::InvalidInput(format!("missing feature '{}'", name)))?;
            let text = (!cell.is_null()).then(|| cell.to_text());
            self.encoder.encode_into(i, text.as_deref(), &mut out);
        }
        Ok(out)
    }
}

/// Pre-training imputation: numeric columns fill nulls with their median,
/// all other columns with their most frequent value. Columns with no
/// non-null values are left untouched.
pub fn impute_for_training(table: &Table) -> Result<Table> {
    let mut out = table.clone();
    let names: Vec<String> = table.column_names().to_vec();
    for name in &names {
        let column = table.column(name)?;
        if column.null_count() == 0 {
            continue;
        }
        let fill = match column.column_type() {
            ColumnType::Int64 | ColumnType::Float64 => {
                median(&column.f64_values()).map(Cell::Float)
            }
            ColumnType::Datetime => mode_datetime(column),
            ColumnType::String => mode_text(column).map(Cell::Str),
            ColumnType::Nested => None,
        };
        if let Some(fill) = fill {
            out = out.fill_null(std::slice::from_ref(name), &fill)?;
        }
    }
    Ok(out)
}

fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    Some(if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    })
}

fn mode_text(column: &Column) -> Option<String> {
    let texts = (0..column.len()).filter_map(|i| column.text(i));
    stats::value_counts(texts).into_iter().next().map(|(v, _)| v)
}

fn mode_datetime(column: &Column) -> Option<Cell> {
    let mut counts: HashMap<i64, usize> = HashMap::new();
    for i in 0..column.len() {
        if let Some(dt) = column.datetime_at(i) {
            *counts
                .entry(crate::column::datetime_to_millis(dt))
                .or_insert(0) += 1;
        }
    }
    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
        .and_then(|(millis, _)| crate::column::millis_to_datetime(millis))
        .map(Cell::Datetime)
}
