use std::collections::HashMap;

use datalens::{
    impute_for_training, infer_task, train_and_eval, train_test_split, Cell, Column, Error,
    Float64Column, Int64Column, ModelRegistry, Prediction, StringColumn, Table, Task,
};

fn classification_table() -> Table {
    // Separable binary target with a numeric and a categorical feature.
    let n = 40;
    let x: Vec<Option<i64>> = (0..n).map(|i| Some(i)).collect();
    let group: Vec<Option<String>> = (0..n)
        .map(|i| Some(if i % 2 == 0 { "even" } else { "odd" }.to_string()))
        .collect();
    let label: Vec<Option<String>> = (0..n)
        .map(|i| Some(if i < n / 2 { "low" } else { "high" }.to_string()))
        .collect();

    let mut df = Table::new();
    df.add_column("x", Column::Int64(Int64Column::from_options(x)))
        .unwrap();
    df.add_column("group", Column::String(StringColumn::from_options(group)))
        .unwrap();
    df.add_column("label", Column::String(StringColumn::from_options(label)))
        .unwrap();
    df
}

fn regression_table() -> Table {
    let n = 40;
    let x: Vec<Option<f64>> = (0..n).map(|i| Some(i as f64)).collect();
    let y: Vec<Option<f64>> = (0..n).map(|i| Some(2.0 * i as f64 + 1.0)).collect();

    let mut df = Table::new();
    df.add_column("x", Column::Float64(Float64Column::from_options(x)))
        .unwrap();
    df.add_column("y", Column::Float64(Float64Column::from_options(y)))
        .unwrap();
    df
}

#[test]
fn test_infer_task_low_cardinality_numeric_is_classification() {
    let mut df = Table::new();
    df.add_column(
        "target",
        Column::Int64(Int64Column::new(vec![0, 1, 0, 1, 1, 0])),
    )
    .unwrap();
    assert_eq!(infer_task(&df, "target").unwrap(), Task::Classification);
}

#[test]
fn test_infer_task_high_cardinality_numeric_is_regression() {
    let df = regression_table();
    assert_eq!(infer_task(&df, "y").unwrap(), Task::Regression);
}

#[test]
fn test_infer_task_text_is_classification() {
    let df = classification_table();
    assert_eq!(infer_task(&df, "label").unwrap(), Task::Classification);
}

#[test]
fn test_infer_task_unknown_column() {
    let df = classification_table();
    assert!(matches!(
        infer_task(&df, "missing"),
        Err(Error::ColumnNotFound(_))
    ));
}

#[test]
fn test_impute_for_training_fills_median_and_mode() {
    let mut df = Table::new();
    df.add_column(
        "n",
        Column::Int64(Int64Column::from_options(vec![
            Some(1),
            Some(3),
            None,
            Some(5),
        ])),
    )
    .unwrap();
    df.add_column(
        "s",
        Column::String(StringColumn::from_options(vec![
            Some("a".to_string()),
            Some("a".to_string()),
            Some("b".to_string()),
            None,
        ])),
    )
    .unwrap();

    let imputed = impute_for_training(&df).unwrap();
    assert_eq!(imputed.null_count(), 0);
    assert_eq!(imputed.cell(2, "n").unwrap(), Cell::Int(3));
    assert_eq!(imputed.cell(3, "s").unwrap(), Cell::Str("a".to_string()));
}

#[test]
fn test_train_test_split_sizes() {
    let df = regression_table();
    let (train, test) = train_test_split(&df, 0.2, 42).unwrap();

    assert_eq!(train.row_count(), 32);
    assert_eq!(test.row_count(), 8);
    assert_eq!(train.column_names(), df.column_names());
}

#[test]
fn test_classification_scenario() {
    let df = classification_table();
    let outcome = train_and_eval(&df, "label", None).unwrap();

    assert_eq!(outcome.task, Task::Classification);
    let accuracy = outcome.metrics["accuracy"];
    let f1 = outcome.metrics["f1"];
    assert!((0.0..=1.0).contains(&accuracy));
    assert!((0.0..=1.0).contains(&f1));
    // The target is perfectly separable on x.
    assert!(accuracy > 0.8);
}

#[test]
fn test_regression_scenario() {
    let df = regression_table();
    let outcome = train_and_eval(&df, "y", None).unwrap();

    assert_eq!(outcome.task, Task::Regression);
    assert!(outcome.metrics.contains_key("r2"));
    assert!(outcome.metrics.contains_key("mae"));
    assert!(outcome.metrics["r2"] > 0.8);
}

#[test]
fn test_predict_row() {
    let df = classification_table();
    let outcome = train_and_eval(&df, "label", None).unwrap();

    let mut cells = HashMap::new();
    cells.insert("x".to_string(), Cell::Int(2));
    cells.insert("group".to_string(), Cell::Str("even".to_string()));
    let prediction = outcome.pipeline.predict_row(&cells).unwrap();
    assert_eq!(prediction, Prediction::Class("low".to_string()));

    cells.insert("x".to_string(), Cell::Int(38));
    let prediction = outcome.pipeline.predict_row(&cells).unwrap();
    assert_eq!(prediction, Prediction::Class("high".to_string()));
}

#[test]
fn test_predict_row_missing_feature() {
    let df = classification_table();
    let outcome = train_and_eval(&df, "label", None).unwrap();

    let cells = HashMap::from([("x".to_string(), Cell::Int(2))]);
    assert!(matches!(
        outcome.pipeline.predict_row(&cells),
        Err(Error::InvalidInput(_))
    ));
}

#[test]
fn test_registry_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let registry = ModelRegistry::new(dir.path());
    assert!(!registry.exists("demo"));

    let df = classification_table();
    let outcome = train_and_eval(&df, "label", None).unwrap();
    registry.save("demo", &outcome.pipeline).unwrap();

    assert!(registry.exists("demo"));
    assert_eq!(registry.list().unwrap(), vec!["demo".to_string()]);
    assert_eq!(registry.latest().unwrap(), Some("demo".to_string()));

    let loaded = registry.load("demo").unwrap();
    let mut cells = HashMap::new();
    cells.insert("x".to_string(), Cell::Int(5));
    cells.insert("group".to_string(), Cell::Str("odd".to_string()));
    assert_eq!(
        loaded.predict_row(&cells).unwrap(),
        outcome.pipeline.predict_row(&cells).unwrap()
    );
}

#[test]
fn test_registry_missing_model() {
    let dir = tempfile::tempdir().unwrap();
    let registry = ModelRegistry::new(dir.path());

    match registry.load("nope") {
        Err(Error::ModelNotFound(name)) => assert_eq!(name, "nope"),
        _ => panic!("expected a ModelNotFound error"),
    }
    assert!(registry.list().unwrap().is_empty());
    assert!(registry.latest().unwrap().is_none());
}

#[test]
fn test_registry_rejects_path_traversal() {
    let dir = tempfile::tempdir().unwrap();
    let registry = ModelRegistry::new(dir.path());
    let df = classification_table();
    let outcome = train_and_eval(&df, "label", None).unwrap();

    assert!(registry.save("../escape", &outcome.pipeline).is_err());
    assert!(registry.save("", &outcome.pipeline).is_err());
}

#[test]
fn test_train_rejects_target_only_table() {
    let mut df = Table::new();
    df.add_column("y", Column::Int64(Int64Column::new(vec![0, 1, 0, 1])))
        .unwrap();
    assert!(matches!(
        train_and_eval(&df, "y", None),
        Err(Error::InvalidInput(_))
    ));
}
