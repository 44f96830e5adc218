//! CSV reading and writing.
//!
//! Reading infers one concrete type per column over the full column: empty
//! fields are null, a column whose non-null fields all parse as `i64`
//! becomes `Int64`, otherwise all-`f64` becomes `Float64`, otherwise it
//! stays text. Datetime columns never arise from inference — only from an
//! explicit cast downstream.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use csv::{ReaderBuilder, Writer};

use crate::column::{Column, Float64Column, Int64Column, StringColumn};
use crate::error::Result;
use crate::frame::Table;

/// Read a table from a CSV file with a header row.
pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Table> {
    let file = File::open(path.as_ref())?;
    read_csv_from_reader(file)
}

/// Read a table from any CSV byte stream with a header row.
pub fn read_csv_from_reader<R: Read>(reader: R) -> Result<Table> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();

    // Collect raw text per column; empty fields are nulls.
    let mut raw: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    for result in rdr.records() {
        let record = result?;
        for (i, slot) in raw.iter_mut().enumerate() {
            let field = record.get(i).unwrap_or("");
            slot.push(if field.is_empty() {
                None
            } else {
                Some(field.to_string())
            });
        }
    }

    let row_count = raw.first().map(|c| c.len()).unwrap_or(0);
    log::info!(
        "read CSV: {} rows x {} columns",
        row_count,
        headers.len()
    );

    let mut table = Table::new();
    for (name, values) in headers.into_iter().zip(raw) {
        table.add_column(name, infer_column(values))?;
    }
    Ok(table)
}

fn infer_column(values: Vec<Option<String>>) -> Column {
    let non_null: Vec<&str> = values.iter().flatten().map(|s| s.as_str()).collect();

    if !non_null.is_empty() && non_null.iter().all(|s| s.parse::<i64>().is_ok()) {
        let ints = values
            .iter()
            .map(|v| v.as_deref().and_then(|s| s.parse().ok()))
            .collect();
        return Column::Int64(Int64Column::from_options(ints));
    }

    if !non_null.is_empty() && non_null.iter().all(|s| s.parse::<f64>().is_ok()) {
        let floats = values
            .iter()
            .map(|v| v.as_deref().and_then(|s| s.parse().ok()))
            .collect();
        return Column::Float64(Float64Column::from_options(floats));
    }

    Column::String(StringColumn::from_options(values))
}

/// Write a table as CSV: header row, no index column, nulls as empty
/// fields.
pub fn write_csv<W: Write>(table: &Table, writer: W) -> Result<()> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(table.column_names())?;

    for row in 0..table.row_count() {
        let cells = table.row_cells(row)?;
        let fields: Vec<String> = cells.iter().map(|c| c.to_text()).collect();
        wtr.write_record(&fields)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write a table to a CSV file.
pub fn write_csv_path<P: AsRef<Path>>(table: &Table, path: P) -> Result<()> {
    let file = File::create(path.as_ref())?;
    write_csv(table, file)
}

/// The table as UTF-8 CSV bytes, ready for download.
pub fn to_csv_bytes(table: &Table) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    write_csv(table, &mut buffer)?;
    Ok(buffer)
}
