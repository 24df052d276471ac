//! CSV reader and writer for exported spreadsheet sheets

use crate::error::{Error, Result};
use crate::table::{parse_cell, Column, Row, Table};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

/// Parse a CSV file into a Table named after the file stem
pub fn parse_csv<P: AsRef<Path>>(path: P) -> Result<Table> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    read_table(BufReader::new(file), &name, path.to_path_buf())
}

/// Parse CSV from a string (useful for testing)
pub fn parse_csv_str(content: &str, sheet_name: &str) -> Result<Table> {
    let path = PathBuf::from(format!("{}.csv", sheet_name));
    read_table(content.as_bytes(), sheet_name, path)
}

fn read_table<R: Read>(reader: R, sheet_name: &str, path: PathBuf) -> Result<Table> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true) // Spreadsheet exports drop trailing empty cells
        .from_reader(reader);

    let headers = csv_reader.headers().map_err(|e| Error::Csv {
        path: path.clone(),
        source: e,
    })?;

    let columns: Vec<Column> = headers
        .iter()
        .enumerate()
        .map(|(i, name)| Column::new(name.trim().to_string(), i))
        .collect();

    if columns.is_empty() {
        return Err(Error::CsvParse {
            path,
            message: "no columns found in CSV".to_string(),
        });
    }

    let mut rows = Vec::new();
    for (row_idx, result) in csv_reader.records().enumerate() {
        let record = result.map_err(|e| Error::Csv {
            path: path.clone(),
            source: e,
        })?;

        let mut cells: Vec<Option<String>> = record.iter().map(parse_cell).collect();

        if cells.len() > columns.len() {
            if cells[columns.len()..].iter().any(Option::is_some) {
                log::warn!(
                    "row {} in {} has more cells than columns, truncating",
                    row_idx + 2,
                    path.display()
                );
            }
            cells.truncate(columns.len());
        }
        cells.resize(columns.len(), None);

        // Line 1 is the header
        rows.push(Row::new(row_idx + 2, cells));
    }

    log::debug!("Parsed {} rows from sheet '{}'", rows.len(), sheet_name);

    Ok(Table {
        name: sheet_name.to_string(),
        columns,
        rows,
        source_path: path,
    })
}

/// Write a Table back out as CSV, header first
pub fn write_csv<P: AsRef<Path>>(table: &Table, path: P) -> Result<()> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path).map_err(|e| Error::Csv {
        path: path.to_path_buf(),
        source: e,
    })?;

    let to_csv_err = |e: csv::Error| Error::Csv {
        path: path.to_path_buf(),
        source: e,
    };

    writer
        .write_record(table.columns.iter().map(|c| c.name.as_str()))
        .map_err(to_csv_err)?;

    for row in &table.rows {
        let record: Vec<&str> = (0..table.columns.len())
            .map(|i| row.get(i).unwrap_or(""))
            .collect();
        writer.write_record(&record).map_err(to_csv_err)?;
    }

    writer.flush()?;
    Ok(())
}
