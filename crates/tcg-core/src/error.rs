//! Error types for tcg-core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in tcg-core
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse CSV
    #[error("failed to parse CSV '{path}': {message}")]
    CsvParse { path: PathBuf, message: String },

    /// CSV parsing error from the csv crate
    #[error("CSV error in '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Directory traversal error
    #[error("failed to traverse directory: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// A sheet the pipeline needs is not in the workbook
    #[error("sheet '{sheet}' not found in workbook '{workbook}'")]
    SheetNotFound { workbook: PathBuf, sheet: String },

    /// A required column is absent from a sheet
    #[error("sheet '{sheet}' is missing required column '{column}'")]
    MissingColumn { sheet: String, column: String },

    /// A required cell is empty
    #[error("row {row} of sheet '{sheet}' has no value for '{column}'")]
    MissingField {
        sheet: String,
        row: usize,
        column: String,
    },

    /// Rarity outside the fixed set
    #[error("invalid rarity '{0}' (expected Common, Rare or SpecialRare)")]
    InvalidRarity(String),

    /// Bundle type outside the fixed set
    #[error("invalid bundle type '{0}' (expected card, character or meta)")]
    InvalidBundleType(String),

    /// Image reference that is neither a URL nor a path
    #[error("unsupported image URI '{0}'")]
    UnsupportedUri(String),

    /// Remote artwork could not be fetched
    #[error("HTTP {status} while fetching '{url}'")]
    HttpStatus { url: String, status: u16 },

    /// Crop rectangle does not fit the source image
    #[error("crop region for '{card}' is outside the {width}x{height} source image")]
    InvalidCropRegion {
        card: String,
        width: u32,
        height: u32,
    },

    /// Font file that ab_glyph cannot parse
    #[error("invalid font file '{0}'")]
    InvalidFont(PathBuf),

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Image decode/encode error
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// Statistics database error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
