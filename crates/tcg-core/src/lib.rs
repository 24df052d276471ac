//! tcg-core: Core library for building trading-card packs from spreadsheets
//!
//! This library provides functionality to:
//! - Read a workbook of CSV sheet exports into typed card and bundle rows
//! - Resolve cards and reconcile bundle membership against them
//! - Copy or download artwork and crop it onto the card canvas
//! - Assemble and export the pack JSON consumed by the card-game bot
//! - Render framed card previews
//! - Report summary statistics over a finished pack

pub mod bundle;
pub mod card;
pub mod config;
pub mod crop;
pub mod error;
pub mod fixup;
pub mod images;
pub mod pack;
pub mod parser;
pub mod pipeline;
pub mod preview;
pub mod rows;
pub mod stats;
pub mod table;
pub mod workbook;

pub use bundle::{resolve_bundles, Bundle, BundleType};
pub use card::{composite_name, resolve_cards, Card, Rarity};
pub use config::PipelineConfig;
pub use crop::{CropPlan, CropRegion, CropSpec, Cropper};
pub use error::{Error, Result};
pub use fixup::fixup_file_uris;
pub use images::{ImageSource, ImageStore};
pub use pack::{assemble_pack, ExportCard, Pack};
pub use parser::{parse_csv, write_csv};
pub use pipeline::{resolve_workbook, run_pipeline, PipelineSummary};
pub use preview::{load_font, render_preview, PreviewRenderer};
pub use rows::{bundle_rows, card_rows, BundleRow, CardRow};
pub use stats::StatsContext;
pub use table::{Column, Row, Table};
pub use workbook::Workbook;
