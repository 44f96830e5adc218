//! Training, evaluation, and prediction over tables.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::column::{Cell, ColumnType};
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::frame::Table;
use crate::ml::forest::RandomForest;
use crate::ml::metrics::classification::{accuracy_score, f1_weighted};
use crate::ml::metrics::regression::{mean_absolute_error, r2_score};
use crate::ml::preprocessing::{impute_for_training, Preprocessor};

/// Numeric targets with at most this many distinct values train a
/// classifier.
const CLASSIFICATION_CARDINALITY: usize = 20;

/// Supervised task kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Task {
    Classification,
    Regression,
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Task::Classification => write!(f, "classification"),
            Task::Regression => write!(f, "regression"),
        }
    }
}

/// A single prediction.
#[derive(Debug, Clone, PartialEq)]
pub enum Prediction {
    Class(String),
    Value(f64),
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prediction::Class(label) => write!(f, "{}", label),
            Prediction::Value(v) => write!(f, "{}", v),
        }
    }
}

/// A fitted preprocessing + estimator pipeline, ready to persist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionPipeline {
    target: String,
    task: Task,
    preprocessor: Preprocessor,
    forest: RandomForest,
    /// Class labels by index; empty for regression.
    classes: Vec<String>,
}

impl PredictionPipeline {
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn task(&self) -> Task {
        self.task
    }

    /// Columns a prediction input must provide.
    pub fn feature_columns(&self) -> Vec<String> {
        self.preprocessor
            .feature_columns()
            .map(|s| s.to_string())
            .collect()
    }

    /// Predict every row of a table.
    pub fn predict(&self, table: &Table) -> Result<Vec<Prediction>> {
        let x = self.preprocessor.transform(table)?;
        let raw = self.forest.predict(&x)?;
        Ok(raw.into_iter().map(|v| self.to_prediction(v)).collect())
    }

    /// Predict a single row given as (column name, cell) pairs.
    pub fn predict_row(&self, cells: &HashMap<String, Cell>) -> Result<Prediction> {
        let row = self.preprocessor.transform_row(cells)?;
        let raw = self.forest.predict_one(&row)?;
        Ok(self.to_prediction(raw))
    }

    fn to_prediction(&self, raw: f64) -> Prediction {
        match self.task {
            Task::Regression => Prediction::Value(raw),
            Task::Classification => {
                let idx = (raw as usize).min(self.classes.len().saturating_sub(1));
                Prediction::Class(
                    self.classes
                        .get(idx)
                        .cloned()
                        .unwrap_or_else(|| raw.to_string()),
                )
            }
        }
    }
}

/// Outcome of `train_and_eval`.
#[derive(Debug, Clone)]
pub struct TrainOutcome {
    pub pipeline: PredictionPipeline,
    /// `accuracy`/`f1` for classification, `r2`/`mae` for regression.
    pub metrics: HashMap<String, f64>,
    pub task: Task,
}

/// Infer the task from the target column: numeric with at most 20 distinct
/// non-null values (or non-numeric of any cardinality) is classification.
pub fn infer_task(table: &Table, target: &str) -> Result<Task> {
    let column = table.column(target)?;
    match column.column_type() {
        ColumnType::Int64 | ColumnType::Float64 => {
            let distinct: HashSet<String> = (0..column.len())
                .filter_map(|i| column.text(i))
                .collect();
            if distinct.len() <= CLASSIFICATION_CARDINALITY {
                Ok(Task::Classification)
            } else {
                Ok(Task::Regression)
            }
        }
        _ => Ok(Task::Classification),
    }
}

/// Split a table into train and test partitions after a seeded shuffle.
pub fn train_test_split(table: &Table, test_size: f64, seed: u64) -> Result<(Table, Table)> {
    let (train_idx, test_idx) = split_indices(table.row_count(), test_size, seed, None)?;
    Ok((table.take_rows(&train_idx)?, table.take_rows(&test_idx)?))
}

/// Train a model on `table` with the default settings (0.2 test fraction,
/// seed 42), evaluating on the held-out split.
pub fn train_and_eval(table: &Table, target: &str, task: Option<Task>) -> Result<TrainOutcome> {
    train_and_eval_with(table, target, task, &Settings::default())
}

/// `train_and_eval` with explicit settings.
pub fn train_and_eval_with(
    table: &Table,
    target: &str,
    task: Option<Task>,
    settings: &Settings,
) -> Result<TrainOutcome> {
    let started = Instant::now();
    table.column(target)?;

    // Median/mode imputation before anything else, as the reference flow
    // does on its ML page.
    let table = impute_for_training(table)?;

    let task = match task {
        Some(task) => task,
        None => infer_task(&table, target)?,
    };

    let feature_names: Vec<String> = table
        .iter_columns()
        .filter(|(name, column)| *name != target && column.column_type() != ColumnType::Nested)
        .map(|(name, _)| name.to_string())
        .collect();
    if feature_names.is_empty() {
        return Err(Error::InvalidInput(
            "no usable feature columns besides the target".to_string(),
        ));
    }

    let target_column = table.column(target)?;
    if target_column.null_count() == target_column.len() {
        return Err(Error::InsufficientData(format!(
            "target column '{}' has no values",
            target
        )));
    }

    // Encode the target.
    let (y, classes) = match task {
        Task::Classification => {
            let labels: Vec<String> = (0..target_column.len())
                .map(|i| target_column.text(i).unwrap_or_default())
                .collect();
            let mut classes: Vec<String> = labels.iter().cloned().collect::<HashSet<_>>().into_iter().collect();
            classes.sort();
            let index: HashMap<&str, usize> = classes
                .iter()
                .enumerate()
                .map(|(i, c)| (c.as_str(), i))
                .collect();
            let y: Vec<f64> = labels.iter().map(|l| index[l.as_str()] as f64).collect();
            (y, classes)
        }
        Task::Regression => {
            if !matches!(
                target_column.column_type(),
                ColumnType::Int64 | ColumnType::Float64
            ) {
                return Err(Error::InvalidOperation(format!(
                    "regression needs a numeric target, '{}' is {:?}",
                    target,
                    target_column.column_type()
                )));
            }
            let y: Vec<f64> = (0..target_column.len())
                .map(|i| target_column.f64_at(i).unwrap_or(0.0))
                .collect();
            (y, Vec::new())
        }
    };

    // Stratify only when it is safe: classification with at least two
    // members in every class.
    let strata: Option<Vec<usize>> = match task {
        Task::Classification => {
            let ids: Vec<usize> = y.iter().map(|&v| v as usize).collect();
            let mut counts = vec![0usize; classes.len()];
            for &id in &ids {
                counts[id] += 1;
            }
            (classes.len() >= 2 && counts.iter().all(|&c| c >= 2)).then_some(ids)
        }
        Task::Regression => None,
    };

    let (train_idx, test_idx) = split_indices(
        table.row_count(),
        settings.test_size,
        settings.random_seed,
        strata.as_deref(),
    )?;

    let train = table.take_rows(&train_idx)?;
    let test = table.take_rows(&test_idx)?;
    let preprocessor = Preprocessor::fit(&train, &feature_names)?;

    let x_train = preprocessor.transform(&train)?;
    let x_test = preprocessor.transform(&test)?;
    let y_train: Vec<f64> = train_idx.iter().map(|&i| y[i]).collect();
    let y_test: Vec<f64> = test_idx.iter().map(|&i| y[i]).collect();

    let mut forest = match task {
        Task::Classification => RandomForest::classifier(),
        Task::Regression => RandomForest::regressor(),
    }
    .with_seed(settings.random_seed);
    forest.fit(&x_train, &y_train)?;

    let predictions = forest.predict(&x_test)?;
    let mut metrics = HashMap::new();
    match task {
        Task::Classification => {
            let true_idx: Vec<usize> = y_test.iter().map(|&v| v as usize).collect();
            let pred_idx: Vec<usize> = predictions.iter().map(|&v| v as usize).collect();
            metrics.insert(
                "accuracy".to_string(),
                accuracy_score(&true_idx, &pred_idx)?,
            );
            metrics.insert("f1".to_string(), f1_weighted(&true_idx, &pred_idx)?);
        }
        Task::Regression => {
            metrics.insert("r2".to_string(), r2_score(&y_test, &predictions)?);
            metrics.insert(
                "mae".to_string(),
                mean_absolute_error(&y_test, &predictions)?,
            );
        }
    }

    log::info!(
        "trained {} model on '{}' in {:.2}s ({} train / {} test rows)",
        task,
        target,
        started.elapsed().as_secs_f64(),
        train_idx.len(),
        test_idx.len()
    );

    Ok(TrainOutcome {
        pipeline: PredictionPipeline {
            target: target.to_string(),
            task,
            preprocessor,
            forest,
            classes,
        },
        metrics,
        task,
    })
}

/// Shuffled (train, test) index partition; stratified per class when
/// `strata` is given.
fn split_indices(
    n: usize,
    test_size: f64,
    seed: u64,
    strata: Option<&[usize]>,
) -> Result<(Vec<usize>, Vec<usize>)> {
    if test_size <= 0.0 || test_size >= 1.0 {
        return Err(Error::InvalidInput(
            "test_size must be between 0 and 1".to_string(),
        ));
    }
    if n < 2 {
        return Err(Error::InsufficientData(
            "need at least two rows to split".to_string(),
        ));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    match strata {
        None => {
            let n_test = ((n as f64 * test_size).ceil() as usize).clamp(1, n - 1);
            let mut indices: Vec<usize> = (0..n).collect();
            indices.shuffle(&mut rng);
            let test = indices.split_off(n - n_test);
            Ok((indices, test))
        }
        Some(classes) => {
            let n_classes = classes.iter().max().map(|&m| m + 1).unwrap_or(0);
            let mut per_class: Vec<Vec<usize>> = vec![Vec::new(); n_classes];
            for (i, &class) in classes.iter().enumerate() {
                per_class[class].push(i);
            }
            let mut train = Vec::new();
            let mut test = Vec::new();
            for mut members in per_class {
                if members.is_empty() {
                    continue;
                }
                members.shuffle(&mut rng);
                let m = members.len();
                let m_test = (((m as f64) * test_size).round() as usize).clamp(1, m - 1);
                test.extend(members.split_off(m - m_test));
                train.extend(members);
            }
            train.sort_unstable();
            test.sort_unstable();
            Ok((train, test))
        }
    }
}
