use datalens::{read_csv_from_reader, read_json, to_csv_bytes, Cell, ColumnType};

#[test]
fn test_csv_reader_infers_types() {
    let csv = "id,score,label\n1,0.5,a\n2,1.5,b\n3,2.5,c\n";
    let table = read_csv_from_reader(csv.as_bytes()).unwrap();

    assert_eq!(table.column("id").unwrap().column_type(), ColumnType::Int64);
    assert_eq!(
        table.column("score").unwrap().column_type(),
        ColumnType::Float64
    );
    assert_eq!(
        table.column("label").unwrap().column_type(),
        ColumnType::String
    );
    assert_eq!(table.row_count(), 3);
}

#[test]
fn test_csv_reader_empty_fields_are_null() {
    let csv = "a,b\n1,\n,x\n";
    let table = read_csv_from_reader(csv.as_bytes()).unwrap();

    assert!(table.column("b").unwrap().is_null(0));
    assert!(table.column("a").unwrap().is_null(1));
    assert_eq!(table.cell(0, "a").unwrap(), Cell::Int(1));
}

#[test]
fn test_csv_reader_mixed_column_stays_text() {
    let csv = "v\n1\ntwo\n";
    let table = read_csv_from_reader(csv.as_bytes()).unwrap();
    assert_eq!(table.column("v").unwrap().column_type(), ColumnType::String);
}

#[test]
fn test_csv_reader_empty_input() {
    let table = read_csv_from_reader("".as_bytes()).unwrap();
    assert_eq!(table.column_count(), 0);
    assert_eq!(table.row_count(), 0);
}

#[test]
fn test_csv_writer_format() {
    let csv = "name,age\nalice,30\nbob,\n";
    let table = read_csv_from_reader(csv.as_bytes()).unwrap();
    let bytes = to_csv_bytes(&table).unwrap();
    let text = String::from_utf8(bytes).unwrap();

    // Header row, no index column, nulls as empty fields.
    assert_eq!(text, "name,age\nalice,30\nbob,\n");
}

#[test]
fn test_csv_round_trip() {
    let csv = "a,b,c\n1,x,0.5\n2,y,1.5\n";
    let table = read_csv_from_reader(csv.as_bytes()).unwrap();
    let bytes = to_csv_bytes(&table).unwrap();
    let again = read_csv_from_reader(&bytes[..]).unwrap();

    assert_eq!(table.column_names(), again.column_names());
    for row in 0..table.row_count() {
        assert_eq!(
            table.row_cells(row).unwrap(),
            again.row_cells(row).unwrap()
        );
    }
}

#[test]
fn test_json_reader_array_of_objects() {
    let json = br#"[{"id": 1, "name": "a"}, {"id": 2, "name": "b"}]"#;
    let table = read_json(&json[..]).unwrap();

    assert_eq!(table.column_names(), &["id", "name"]);
    assert_eq!(table.column("id").unwrap().column_type(), ColumnType::Int64);
    assert_eq!(table.row_count(), 2);
}

#[test]
fn test_json_reader_ndjson_and_key_union() {
    let json = b"{\"a\": 1}\n{\"a\": 2, \"b\": \"x\"}\n";
    let table = read_json(&json[..]).unwrap();

    assert_eq!(table.column_names(), &["a", "b"]);
    assert!(table.column("b").unwrap().is_null(0));
    assert_eq!(table.cell(1, "b").unwrap(), Cell::Str("x".to_string()));
}

#[test]
fn test_json_reader_nested_values() {
    let json = br#"[{"id": 1, "meta": {"k": 1}}, {"id": 2, "meta": null}]"#;
    let table = read_json(&json[..]).unwrap();

    let meta = table.column("meta").unwrap();
    assert_eq!(meta.column_type(), ColumnType::Nested);
    assert_eq!(meta.null_count(), 1);
}

#[test]
fn test_json_reader_rejects_non_objects() {
    let json = br#"[1, 2, 3]"#;
    assert!(read_json(&json[..]).is_err());
}
