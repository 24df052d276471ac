//! Workbook discovery: a directory of CSV exports, one per sheet

use crate::bundle::BundleType;
use crate::card::{resolve_sheet_cards, Card};
use crate::error::{Error, Result};
use crate::parser::parse_csv;
use crate::rows::{bundle_rows, card_rows, BundleRow};
use crate::table::Table;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Sheet holding one row per card
pub const CARDS_SHEET: &str = "Cards";

/// A sheet file found in the workbook directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetFile {
    /// Sheet name as written in the file name
    pub name: String,
    pub path: PathBuf,
}

/// The sheets of one spreadsheet export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workbook {
    pub root: PathBuf,
    /// Sheets keyed by lowercased name
    sheets: BTreeMap<String, SheetFile>,
}

impl Workbook {
    /// Discover sheet files directly inside `root`
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(Error::FileRead {
                path: root.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "workbook directory not found",
                ),
            });
        }

        let mut sheets = BTreeMap::new();

        for entry in WalkDir::new(root).min_depth(1).max_depth(1).follow_links(true) {
            let entry = entry?;
            let path = entry.path();

            if !entry.file_type().is_file()
                || !path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
            {
                continue;
            }

            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                log::debug!("Found sheet '{}' at {}", stem, path.display());
                sheets.insert(
                    stem.to_ascii_lowercase(),
                    SheetFile {
                        name: stem.to_string(),
                        path: path.to_path_buf(),
                    },
                );
            }
        }

        log::info!("Workbook {}: {} sheets", root.display(), sheets.len());
        Ok(Self {
            root: root.to_path_buf(),
            sheets,
        })
    }

    /// Find a sheet by name, ignoring ASCII case
    pub fn find_sheet(&self, name: &str) -> Option<&SheetFile> {
        self.sheets.get(&name.to_ascii_lowercase())
    }

    /// All sheet names, sorted
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.values().map(|s| s.name.as_str()).collect()
    }

    /// Parse a sheet that must exist
    pub fn read_sheet(&self, name: &str) -> Result<Table> {
        let sheet = self.find_sheet(name).ok_or_else(|| Error::SheetNotFound {
            workbook: self.root.clone(),
            sheet: name.to_string(),
        })?;
        parse_csv(&sheet.path)
    }

    /// Read and resolve the `Cards` sheet
    pub fn read_cards(&self) -> Result<Vec<Card>> {
        let table = self.read_sheet(CARDS_SHEET)?;
        let rows = card_rows(&table)?;
        resolve_sheet_cards(&rows, &table.name)
    }

    /// Read membership rows from every bundle sheet present
    ///
    /// Rows come back card sheet first, then character, then meta.
    pub fn read_bundle_rows(&self) -> Result<Vec<BundleRow>> {
        let mut rows = Vec::new();
        for bundle_type in BundleType::ALL {
            let sheet = bundle_type.sheet_name();
            if self.find_sheet(sheet).is_none() {
                log::warn!("Workbook has no '{}' sheet, skipping", sheet);
                continue;
            }
            let table = self.read_sheet(sheet)?;
            let sheet_rows = bundle_rows(&table, bundle_type)?;
            log::debug!("Read {} {} bundle rows", sheet_rows.len(), bundle_type);
            rows.extend(sheet_rows);
        }
        Ok(rows)
    }
}
