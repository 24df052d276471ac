//! Core table types for representing spreadsheet sheets

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A parsed sheet from a single CSV file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    /// Sheet name (file stem of the source)
    pub name: String,
    /// Column definitions
    pub columns: Vec<Column>,
    /// Row data
    pub rows: Vec<Row>,
    /// Source file path
    pub source_path: PathBuf,
}

impl Table {
    /// Create a new empty table
    pub fn new(name: impl Into<String>, source_path: PathBuf) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            rows: Vec::new(),
            source_path,
        }
    }

    /// Get the number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get the number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Find a column by name
    pub fn find_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Get a cell by row position and column name
    pub fn value(&self, row: usize, column: &str) -> Option<&str> {
        let col = self.find_column(column)?;
        self.rows.get(row).and_then(|r| r.get(col.index))
    }
}

/// A column definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    /// Column header (e.g., "Name" or "Group Name")
    pub name: String,
    /// Column index (0-based)
    pub index: usize,
}

impl Column {
    /// Create a new column
    pub fn new(name: String, index: usize) -> Self {
        Self { name, index }
    }
}

/// A row of data
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Row {
    /// 1-based line number in the sheet, counting the header
    pub line: usize,
    /// Cell values for each column, `None` for empty cells
    pub cells: Vec<Option<String>>,
}

impl Row {
    /// Create a new row
    pub fn new(line: usize, cells: Vec<Option<String>>) -> Self {
        Self { line, cells }
    }

    /// Get a non-empty cell value by column index
    pub fn get(&self, index: usize) -> Option<&str> {
        self.cells.get(index).and_then(|c| c.as_deref())
    }

    /// Replace a cell value
    pub fn set(&mut self, index: usize, value: Option<String>) {
        if index >= self.cells.len() {
            self.cells.resize(index + 1, None);
        }
        self.cells[index] = value;
    }

    /// True when every cell is empty
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|c| c.is_none())
    }
}

/// Normalize a raw cell: whitespace-only cells become `None`
pub fn parse_cell(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cell_trims() {
        assert_eq!(parse_cell("  Alice "), Some("Alice".to_string()));
        assert_eq!(parse_cell("Rare"), Some("Rare".to_string()));
    }

    #[test]
    fn test_parse_cell_empty() {
        assert_eq!(parse_cell(""), None);
        assert_eq!(parse_cell("   "), None);
    }

    #[test]
    fn test_row_get_and_set() {
        let mut row = Row::new(2, vec![Some("a".to_string()), None]);
        assert_eq!(row.get(0), Some("a"));
        assert_eq!(row.get(1), None);
        assert_eq!(row.get(5), None);

        row.set(3, Some("d".to_string()));
        assert_eq!(row.cells.len(), 4);
        assert_eq!(row.get(3), Some("d"));
    }

    #[test]
    fn test_row_is_blank() {
        assert!(Row::new(2, vec![None, None]).is_blank());
        assert!(!Row::new(2, vec![None, Some("x".to_string())]).is_blank());
    }

    #[test]
    fn test_table_value_by_column_name() {
        let mut table = Table::new("Cards", PathBuf::from("Cards.csv"));
        table.columns = vec![
            Column::new("Name".to_string(), 0),
            Column::new("Rarity".to_string(), 1),
        ];
        table
            .rows
            .push(Row::new(2, vec![Some("Alice".to_string()), None]));

        assert_eq!(table.value(0, "Name"), Some("Alice"));
        assert_eq!(table.value(0, "Rarity"), None);
        assert_eq!(table.value(0, "Missing"), None);
        assert_eq!(table.value(1, "Name"), None);
    }
}
