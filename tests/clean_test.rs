use chrono::NaiveDate;
use datalens::{
    date_bounds, materialize, numeric_bounds, Cell, CleanStage, Cleaner, Column, ColumnType, Error,
    Int64Column, LazyFrame, MissingPolicy, RowFilter, StringColumn, Table,
};

fn table_cells(table: &Table) -> Vec<Vec<Cell>> {
    (0..table.row_count())
        .map(|row| table.row_cells(row).unwrap())
        .collect()
}

fn messy_table() -> Table {
    let mut df = Table::new();
    df.add_column(
        "name",
        Column::String(StringColumn::from_options(vec![
            Some("alice".to_string()),
            Some("  ".to_string()),
            Some("bob".to_string()),
            Some("bob".to_string()),
        ])),
    )
    .unwrap();
    df.add_column(
        "age",
        Column::Int64(Int64Column::from_options(vec![
            Some(30),
            Some(25),
            None,
            None,
        ])),
    )
    .unwrap();
    df
}

#[test]
fn test_blank_normalize_turns_whitespace_into_null() {
    let cleaner = Cleaner::new().with_stage(CleanStage::BlankNormalize);
    let out = cleaner
        .apply(LazyFrame::new(messy_table()))
        .unwrap()
        .collect()
        .unwrap();

    assert!(out.column("name").unwrap().is_null(1));
    assert_eq!(out.column("name").unwrap().null_count(), 1);
}

#[test]
fn test_blank_normalize_is_idempotent() {
    let once = Cleaner::new().with_stage(CleanStage::BlankNormalize);
    let twice = Cleaner::new()
        .with_stage(CleanStage::BlankNormalize)
        .with_stage(CleanStage::BlankNormalize);

    let a = once
        .apply(LazyFrame::new(messy_table()))
        .unwrap()
        .collect()
        .unwrap();
    let b = twice
        .apply(LazyFrame::new(messy_table()))
        .unwrap()
        .collect()
        .unwrap();

    assert_eq!(table_cells(&a), table_cells(&b));
}

#[test]
fn test_delete_policy_leaves_no_nulls() {
    let cleaner = Cleaner::new().with_stage(CleanStage::HandleMissing(MissingPolicy::Delete {
        subset: None,
    }));
    let out = cleaner
        .apply(LazyFrame::new(messy_table()))
        .unwrap()
        .collect()
        .unwrap();

    assert_eq!(out.null_count(), 0);
    // Blank normalization ran first, so the whitespace-only name row went
    // too.
    assert_eq!(out.row_count(), 1);
}

#[test]
fn test_replace_policy_fills_by_kind() {
    let cleaner = Cleaner::new().with_stage(CleanStage::HandleMissing(
        MissingPolicy::replace_defaults(),
    ));
    let out = cleaner
        .apply(LazyFrame::new(messy_table()))
        .unwrap()
        .collect()
        .unwrap();

    assert_eq!(out.null_count(), 0);
    assert_eq!(out.cell(1, "name").unwrap(), Cell::Str("blank".to_string()));
    assert_eq!(out.cell(2, "age").unwrap(), Cell::Int(0));
    assert_eq!(out.cell(3, "age").unwrap(), Cell::Int(0));
}

#[test]
fn test_ignore_policy_keeps_nulls() {
    let cleaner =
        Cleaner::new().with_stage(CleanStage::HandleMissing(MissingPolicy::Ignore));
    let out = cleaner
        .apply(LazyFrame::new(messy_table()))
        .unwrap()
        .collect()
        .unwrap();

    // Blank normalization still runs: the whitespace name is now null too.
    assert_eq!(out.null_count(), 3);
    assert_eq!(out.row_count(), 4);
}

#[test]
fn test_dedup_keeps_distinct_rows() {
    let cleaner = Cleaner::new()
        .with_stage(CleanStage::HandleMissing(MissingPolicy::replace_defaults()))
        .with_stage(CleanStage::Dedup { subset: None });
    let out = cleaner
        .apply(LazyFrame::new(messy_table()))
        .unwrap()
        .collect()
        .unwrap();

    assert_eq!(out.row_count(), 3);
    let rows = table_cells(&out);
    for a in 0..rows.len() {
        for b in (a + 1)..rows.len() {
            assert_ne!(rows[a], rows[b]);
        }
    }
}

#[test]
fn test_select_columns_projects_in_order() {
    let cleaner = Cleaner::new().with_stage(CleanStage::SelectColumns(vec![
        "age".to_string(),
        "name".to_string(),
    ]));
    let out = cleaner
        .apply(LazyFrame::new(messy_table()))
        .unwrap()
        .collect()
        .unwrap();

    assert_eq!(out.column_names(), &["age", "name"]);
}

#[test]
fn test_normalize_stage_standardizes() {
    let mut df = Table::new();
    df.add_column(
        "v",
        Column::Int64(Int64Column::new(vec![10, 20, 30, 40, 50])),
    )
    .unwrap();

    let cleaner = Cleaner::new().with_stage(CleanStage::Normalize(vec!["v".to_string()]));
    let out = cleaner
        .apply(LazyFrame::new(df))
        .unwrap()
        .collect()
        .unwrap();

    let values = out.column("v").unwrap().f64_values();
    let mean: f64 = values.iter().sum::<f64>() / values.len() as f64;
    let std: f64 = (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
        / (values.len() - 1) as f64)
        .sqrt();
    assert!(mean.abs() < 1e-9);
    assert!((std - 1.0).abs() < 1e-9);
}

#[test]
fn test_numeric_range_filter() {
    let mut df = Table::new();
    df.add_column("age", Column::Int64(Int64Column::new(vec![5, 15, 25, 35])))
        .unwrap();

    let cleaner = Cleaner::new().with_stage(CleanStage::Filter(RowFilter::numeric_range(
        "age", 10.0, 30.0,
    )));
    let out = cleaner
        .apply(LazyFrame::new(df))
        .unwrap()
        .collect()
        .unwrap();

    assert_eq!(out.row_count(), 2);
    assert_eq!(out.cell(0, "age").unwrap(), Cell::Int(15));
    assert_eq!(out.cell(1, "age").unwrap(), Cell::Int(25));
}

#[test]
fn test_contains_filter_empty_pattern_keeps_everything() {
    let lf = LazyFrame::new(messy_table()).filter(RowFilter::contains("name", ""));
    assert_eq!(lf.collect().unwrap().row_count(), 4);
}

#[test]
fn test_contains_filter_is_literal() {
    let mut df = Table::new();
    df.add_column(
        "s",
        Column::String(StringColumn::from_options(vec![
            Some("a.b".to_string()),
            Some("axb".to_string()),
        ])),
    )
    .unwrap();

    let out = LazyFrame::new(df)
        .filter(RowFilter::contains("s", "a.b"))
        .collect()
        .unwrap();
    assert_eq!(out.row_count(), 1);
    assert_eq!(out.cell(0, "s").unwrap(), Cell::Str("a.b".to_string()));
}

#[test]
fn test_matches_filter_rejects_bad_pattern() {
    assert!(matches!(
        RowFilter::matches("s", "("),
        Err(Error::InvalidRegex(_))
    ));
}

#[test]
fn test_date_range_filter() {
    let mut df = Table::new();
    df.add_column(
        "joined",
        Column::String(StringColumn::from_options(vec![
            Some("2021-01-01".to_string()),
            Some("2021-06-15".to_string()),
            Some("2022-03-01".to_string()),
        ])),
    )
    .unwrap();

    let start = NaiveDate::from_ymd_opt(2021, 2, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2021, 12, 31).unwrap();
    let cleaner = Cleaner::new()
        .with_stage(CleanStage::CastTypes(vec![(
            "joined".to_string(),
            ColumnType::Datetime,
        )]))
        .with_stage(CleanStage::Filter(RowFilter::date_range(
            "joined", start, end,
        )));

    let out = cleaner
        .apply(LazyFrame::new(df))
        .unwrap()
        .collect()
        .unwrap();
    assert_eq!(out.row_count(), 1);
    assert_eq!(
        out.column("joined").unwrap().text(0).unwrap(),
        "2021-06-15 00:00:00"
    );
}

#[test]
fn test_filter_bounds_helpers() {
    let mut df = Table::new();
    df.add_column("age", Column::Int64(Int64Column::new(vec![5, 15, 25, 35])))
        .unwrap();
    df.add_column(
        "joined",
        Column::String(StringColumn::from_options(vec![
            Some("2021-01-05".to_string()),
            Some("2021-03-01".to_string()),
            Some("2020-12-31".to_string()),
            Some("2021-02-02".to_string()),
        ])),
    )
    .unwrap();

    let lf = LazyFrame::new(df).cast("joined", ColumnType::Datetime);
    assert_eq!(numeric_bounds(&lf, "age").unwrap(), Some((5.0, 35.0)));
    assert_eq!(
        date_bounds(&lf, "joined").unwrap(),
        Some((
            NaiveDate::from_ymd_opt(2020, 12, 31).unwrap(),
            NaiveDate::from_ymd_opt(2021, 3, 1).unwrap()
        ))
    );
}

#[test]
fn test_cast_stage_failure_propagates() {
    let mut df = Table::new();
    df.add_column(
        "age",
        Column::String(StringColumn::from_options(vec![
            Some("12".to_string()),
            Some("N/A".to_string()),
        ])),
    )
    .unwrap();

    let cleaner = Cleaner::new().with_stage(CleanStage::CastTypes(vec![(
        "age".to_string(),
        ColumnType::Int64,
    )]));
    let lf = cleaner.apply(LazyFrame::new(df)).unwrap();

    match lf.collect() {
        Err(Error::TypeConversion { value, .. }) => assert_eq!(value, "N/A"),
        _ => panic!("expected a TypeConversion error"),
    }
}

#[test]
fn test_end_to_end_csv_replace_scenario() {
    let csv = "name,age,joined\nalice,30,2021-01-01\n  ,25,2021-01-02\nbob,,2021-01-03\n";
    let table = datalens::read_csv_from_reader(csv.as_bytes()).unwrap();

    let cleaner = Cleaner::new().with_stage(CleanStage::HandleMissing(MissingPolicy::Replace {
        string_fill: "blank".to_string(),
        number_fill: 0.0,
        datetime_fill: datalens::column::unix_epoch(),
    }));
    let cleaned = cleaner.apply(LazyFrame::new(table)).unwrap();
    let result = materialize(cleaned).unwrap();

    assert_eq!(result.table.null_count(), 0);
    assert_eq!(
        result.table.cell(1, "name").unwrap(),
        Cell::Str("blank".to_string())
    );
    assert_eq!(result.table.cell(2, "age").unwrap(), Cell::Int(0));

    let bytes = datalens::to_csv_bytes(&result.table).unwrap();
    let text = String::from_utf8(bytes).unwrap();
    assert!(text.starts_with("name,age,joined\n"));
    assert!(text.contains("blank,25,2021-01-02"));
    assert!(text.contains("bob,0,2021-01-03"));
}

#[test]
fn test_reapplying_a_cleaner_is_idempotent() {
    let cleaner = Cleaner::new()
        .with_stage(CleanStage::HandleMissing(MissingPolicy::replace_defaults()))
        .with_stage(CleanStage::Dedup { subset: None })
        .with_stage(CleanStage::Filter(RowFilter::numeric_range(
            "age", 0.0, 100.0,
        )));

    let once = cleaner
        .apply(LazyFrame::new(messy_table()))
        .unwrap()
        .collect()
        .unwrap();
    let again = cleaner
        .apply(LazyFrame::new(once.clone()))
        .unwrap()
        .collect()
        .unwrap();

    assert_eq!(table_cells(&once), table_cells(&again));
}
