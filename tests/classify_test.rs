use datalens::{
    classify_frame, classify_table, Column, ColumnKind, ColumnType, Float64Column, Int64Column,
    LazyFrame, StringColumn, Table,
};

fn string_column(values: &[Option<&str>]) -> Column {
    Column::String(StringColumn::from_options(
        values.iter().map(|v| v.map(|s| s.to_string())).collect(),
    ))
}

#[test]
fn test_typed_numeric_columns_are_numeric() {
    let mut df = Table::new();
    df.add_column("i", Column::Int64(Int64Column::new(vec![1, 2])))
        .unwrap();
    df.add_column("f", Column::Float64(Float64Column::new(vec![0.5, 1.5])))
        .unwrap();

    let kinds = classify_table(&df);
    assert_eq!(kinds[0].1, ColumnKind::Numeric);
    assert_eq!(kinds[1].1, ColumnKind::Numeric);
}

#[test]
fn test_digit_text_classifies_numeric() {
    let mut df = Table::new();
    df.add_column("n", string_column(&[Some("12"), Some("3.5"), None]))
        .unwrap();

    assert_eq!(classify_table(&df)[0].1, ColumnKind::Numeric);
}

#[test]
fn test_mixed_values_classify_string() {
    let mut df = Table::new();
    df.add_column("n", string_column(&[Some("12"), Some("twelve")]))
        .unwrap();

    assert_eq!(classify_table(&df)[0].1, ColumnKind::Str);
}

#[test]
fn test_all_blank_column_classifies_string() {
    let mut df = Table::new();
    df.add_column("b", string_column(&[Some("   "), Some(""), None]))
        .unwrap();

    assert_eq!(classify_table(&df)[0].1, ColumnKind::Str);
}

#[test]
fn test_datetime_column_classifies_datetime() {
    let mut df = Table::new();
    df.add_column("d", string_column(&[Some("2021-01-01"), Some("2021-01-02")]))
        .unwrap();
    let cast = df.cast_column("d", ColumnType::Datetime).unwrap();

    assert_eq!(classify_table(&cast)[0].1, ColumnKind::Datetime);
}

#[test]
fn test_classification_is_total() {
    let mut df = Table::new();
    df.add_column("a", string_column(&[Some("x"), None])).unwrap();
    df.add_column("b", Column::Int64(Int64Column::new(vec![1, 2])))
        .unwrap();
    df.add_column("c", string_column(&[None, None])).unwrap();

    let kinds = classify_table(&df);
    assert_eq!(kinds.len(), df.column_count());
    for (name, kind) in kinds {
        assert!(!name.is_empty());
        assert!(matches!(
            kind,
            ColumnKind::Numeric | ColumnKind::Str | ColumnKind::Datetime | ColumnKind::Unsupported
        ));
    }
}

#[test]
fn test_nested_columns_are_unsupported() {
    let json = br#"[{"id": 1, "tags": [1, 2]}]"#;
    let table = datalens::read_json(&json[..]).unwrap();

    let kinds = classify_table(&table);
    let tags = kinds.iter().find(|(name, _)| name == "tags").unwrap();
    assert_eq!(tags.1, ColumnKind::Unsupported);
}

#[test]
fn test_classification_reflects_pending_casts() {
    let mut df = Table::new();
    df.add_column("d", string_column(&[Some("2021-01-01")])).unwrap();

    // As loaded the column is a string; after a pending cast the classifier
    // sees a datetime.
    assert_eq!(classify_table(&df)[0].1, ColumnKind::Str);
    let lf = LazyFrame::new(df).cast("d", ColumnType::Datetime);
    assert_eq!(classify_frame(&lf).unwrap()[0].1, ColumnKind::Datetime);
}

#[test]
fn test_padded_numbers_classify_string() {
    let mut df = Table::new();
    df.add_column("n", string_column(&[Some(" 5"), Some("6")]))
        .unwrap();

    assert_eq!(classify_table(&df)[0].1, ColumnKind::Str);
}
