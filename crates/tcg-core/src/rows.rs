//! Typed row schema for the card and bundle sheets
//!
//! Sheets are loosely structured; this is the boundary where they become
//! named fields. A missing required column is fatal here, so nothing past
//! this module does string-keyed lookups.

use crate::bundle::BundleType;
use crate::error::{Error, Result};
use crate::table::Table;

pub const COL_NAME: &str = "Name";
pub const COL_VARIANT: &str = "Variant";
pub const COL_GROUP: &str = "Group";
pub const COL_COMPANY: &str = "Company";
pub const COL_RARITY: &str = "Rarity";
pub const COL_CREDIT: &str = "Credit";
pub const COL_SOURCE_URL: &str = "Source URL";
pub const COL_FILE_URI: &str = "File URI";
pub const COL_GROUP_NAME: &str = "Group Name";

/// One row of the `Cards` sheet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardRow {
    /// Line number in the sheet, for diagnostics
    pub line: usize,
    pub name: Option<String>,
    pub variant: Option<String>,
    pub group: Option<String>,
    pub company: Option<String>,
    pub rarity: Option<String>,
    pub credit: Option<String>,
    pub source_url: Option<String>,
    pub file_uri: Option<String>,
}

/// One row of a bundle sheet, stamped with the sheet's bundle type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleRow {
    pub name: String,
    pub variant: Option<String>,
    pub bundle_name: String,
    pub bundle_type: BundleType,
}

impl BundleRow {
    pub fn new(
        bundle_type: BundleType,
        bundle_name: impl Into<String>,
        name: impl Into<String>,
        variant: Option<&str>,
    ) -> Self {
        Self {
            name: name.into(),
            variant: variant.map(str::to_string),
            bundle_name: bundle_name.into(),
            bundle_type,
        }
    }
}

fn require_column(table: &Table, column: &str) -> Result<usize> {
    table
        .find_column(column)
        .map(|c| c.index)
        .ok_or_else(|| Error::MissingColumn {
            sheet: table.name.clone(),
            column: column.to_string(),
        })
}

fn optional_column(table: &Table, column: &str) -> Option<usize> {
    table.find_column(column).map(|c| c.index)
}

/// Extract card rows from the `Cards` sheet
///
/// `Name` and `Rarity` must exist as columns; every other column is optional
/// and reads as `None` when absent.
pub fn card_rows(table: &Table) -> Result<Vec<CardRow>> {
    let name = require_column(table, COL_NAME)?;
    let rarity = require_column(table, COL_RARITY)?;
    let variant = optional_column(table, COL_VARIANT);
    let group = optional_column(table, COL_GROUP);
    let company = optional_column(table, COL_COMPANY);
    let credit = optional_column(table, COL_CREDIT);
    let source_url = optional_column(table, COL_SOURCE_URL);
    let file_uri = optional_column(table, COL_FILE_URI);

    let rows = table
        .rows
        .iter()
        .map(|row| {
            let cell = |idx: Option<usize>| idx.and_then(|i| row.get(i)).map(str::to_string);
            CardRow {
                line: row.line,
                name: cell(Some(name)),
                variant: cell(variant),
                group: cell(group),
                company: cell(company),
                rarity: cell(Some(rarity)),
                credit: cell(credit),
                source_url: cell(source_url),
                file_uri: cell(file_uri),
            }
        })
        .collect();

    Ok(rows)
}

/// Extract membership rows from a bundle sheet
///
/// Rows without a `Name` or `Group Name` cannot belong to anything and are
/// skipped; fully blank rows are skipped without a warning.
pub fn bundle_rows(table: &Table, bundle_type: BundleType) -> Result<Vec<BundleRow>> {
    let name_idx = require_column(table, COL_NAME)?;
    let bundle_idx = require_column(table, COL_GROUP_NAME)?;
    let variant_idx = optional_column(table, COL_VARIANT);

    let mut rows = Vec::new();
    for row in &table.rows {
        if row.is_blank() {
            continue;
        }

        match (row.get(name_idx), row.get(bundle_idx)) {
            (Some(name), Some(bundle_name)) => rows.push(BundleRow::new(
                bundle_type,
                bundle_name,
                name,
                variant_idx.and_then(|i| row.get(i)),
            )),
            _ => log::warn!(
                "Skipping row {} of '{}': needs both '{}' and '{}'",
                row.line,
                table.name,
                COL_NAME,
                COL_GROUP_NAME
            ),
        }
    }

    Ok(rows)
}
