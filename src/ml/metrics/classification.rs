//! Classification model evaluation metrics

use crate::error::{Error, Result};

/// Calculate accuracy
///
/// # Arguments
/// * `y_true` - True labels
/// * `y_pred` - Predicted labels
///
/// # Returns
/// * `Result<f64>` - Accuracy (0 to 1)
pub fn accuracy_score<T: PartialEq>(y_true: &[T], y_pred: &[T]) -> Result<f64> {
    check_lengths(y_true, y_pred)?;

    let correct_count = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(t, p)| t == p)
        .count();

    Ok(correct_count as f64 / y_true.len() as f64)
}

/// Calculate precision (binary classification)
pub fn precision_score(y_true: &[bool], y_pred: &[bool]) -> Result<f64> {
    check_lengths(y_true, y_pred)?;

    let tp = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(&t, &p)| t && p)
        .count();
    let fp = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(&t, &p)| !t && p)
        .count();

    if tp + fp == 0 {
        return Ok(0.0); // No positive predictions
    }

    Ok(tp as f64 / (tp + fp) as f64)
}

/// Calculate recall (binary classification)
pub fn recall_score(y_true: &[bool], y_pred: &[bool]) -> Result<f64> {
    check_lengths(y_true, y_pred)?;

    let tp = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(&t, &p)| t && p)
        .count();
    let fn_ = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(&t, &p)| t && !p)
        .count();

    if tp + fn_ == 0 {
        return Ok(0.0); // No actual positive samples
    }

    Ok(tp as f64 / (tp + fn_) as f64)
}

/// Calculate F1 score (binary classification)
pub fn f1_score(y_true: &[bool], y_pred: &[bool]) -> Result<f64> {
    let precision = precision_score(y_true, y_pred)?;
    let recall = recall_score(y_true, y_pred)?;

    if precision + recall == 0.0 {
        return Ok(0.0); // Avoid division by zero
    }

    Ok(2.0 * precision * recall / (precision + recall))
}

/// Calculate the support-weighted F1 score over class indices
///
/// The multiclass counterpart of `f1_score`: per-class F1 values averaged
/// with each class's true-label count as its weight.
///
/// # Arguments
/// * `y_true` - True class indices
/// * `y_pred` - Predicted class indices
///
/// # Returns
/// * `Result<f64>` - Weighted F1 score (0 to 1)
pub fn f1_weighted(y_true: &[usize], y_pred: &[usize]) -> Result<f64> {
    check_lengths(y_true, y_pred)?;

    let n_classes = y_true
        .iter()
        .chain(y_pred.iter())
        .max()
        .map(|&m| m + 1)
        .unwrap_or(0);

    let mut weighted_sum = 0.0;
    for class in 0..n_classes {
        let support = y_true.iter().filter(|&&t| t == class).count();
        if support == 0 {
            continue;
        }
        let tp = y_true
            .iter()
            .zip(y_pred.iter())
            .filter(|(&t, &p)| t == class && p == class)
            .count();
        let fp = y_pred
            .iter()
            .zip(y_true.iter())
            .filter(|(&p, &t)| p == class && t != class)
            .count();
        let fn_ = support - tp;

        let precision = if tp + fp == 0 {
            0.0
        } else {
            tp as f64 / (tp + fp) as f64
        };
        let recall = if tp + fn_ == 0 {
            0.0
        } else {
            tp as f64 / (tp + fn_) as f64
        };
        let f1 = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };
        weighted_sum += support as f64 * f1;
    }

    Ok(weighted_sum / y_true.len() as f64)
}

fn check_lengths<T, U>(y_true: &[T], y_pred: &[U]) -> Result<()> {
    if y_true.len() != y_pred.len() {
        return Err(Error::DimensionMismatch(format!(
            "length mismatch between true and predicted labels: {} vs {}",
            y_true.len(),
            y_pred.len()
        )));
    }
    if y_true.is_empty() {
        return Err(Error::InvalidOperation(
            "cannot calculate with empty data".to_string(),
        ));
    }
    Ok(())
}
