//! End-to-end pack build
//!
//! Sheets are read and resolved first, so schema problems abort the run
//! before any artwork is fetched. Nothing is written to the pack file until
//! every earlier stage has succeeded.

use crate::bundle::{resolve_bundles, Bundle};
use crate::card::Card;
use crate::config::PipelineConfig;
use crate::crop::{CropPlan, Cropper};
use crate::error::Result;
use crate::images::ImageStore;
use crate::pack::{assemble_pack, export_bundles_json, export_cards_json};
use crate::preview::{load_font, PreviewRenderer};
use crate::stats::StatsContext;
use crate::workbook::Workbook;
use std::fs;
use std::path::{Path, PathBuf};

/// What a pipeline run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSummary {
    pub cards: usize,
    pub bundles: usize,
    /// Cards with local artwork
    pub images: usize,
    /// Cards with a fixed-size image
    pub crops: usize,
    /// Framed previews rendered
    pub previews: usize,
    pub pack_path: PathBuf,
    /// Every file written besides images
    pub files_written: Vec<PathBuf>,
}

/// Read a workbook and resolve its cards and bundles
pub fn resolve_workbook<P: AsRef<Path>>(workbook: P) -> Result<(Vec<Card>, Vec<Bundle>)> {
    let workbook = Workbook::open(workbook)?;
    let cards = workbook.read_cards()?;
    let rows = workbook.read_bundle_rows()?;
    let bundles = resolve_bundles(&rows, &cards);
    Ok((cards, bundles))
}

/// Run the whole pipeline described by `config`
pub fn run_pipeline(config: &PipelineConfig) -> Result<PipelineSummary> {
    log::info!(
        "Building pack '{}' from {}",
        config.pack_name,
        config.workbook.display()
    );
    let (mut cards, bundles) = resolve_workbook(&config.workbook)?;
    let font = config.preview_font.as_ref().map(load_font).transpose()?;

    fs::create_dir_all(&config.export_dir)?;

    let store = ImageStore::new(config.image_path())?;
    let images = store.materialize_all(&mut cards)?;
    log::info!("{} of {} cards have local artwork", images, cards.len());

    let plan = match &config.crop_plan {
        Some(path) => CropPlan::load(path)?,
        None => CropPlan::new(),
    };
    let cropper = Cropper::new(config.crop_path())?;
    let crops = cropper.crop_all(&mut cards, &plan)?;
    log::info!("{} of {} cards have a card image", crops, cards.len());

    let pack = assemble_pack(config.pack_name.clone(), &cards, bundles);
    let mut files_written = Vec::new();

    let pack_path = config.pack_path();
    pack.save(&pack_path)?;
    log::info!("Wrote {}", pack_path.display());
    files_written.push(pack_path.clone());

    if let Some(path) = config.card_path() {
        export_cards_json(&pack, &path)?;
        files_written.push(path);
    }
    if let Some(path) = config.bundle_path() {
        export_bundles_json(&pack, &path)?;
        files_written.push(path);
    }
    if let Some(path) = config.stats_path() {
        StatsContext::from_pack(&pack)?
            .with_timestamp(config.stats_timestamp)
            .write_report_file(&path)?;
        log::info!("Wrote stats to {}", path.display());
        files_written.push(path);
    }

    let mut previews = 0;
    if let Some(path) = config.preview_path() {
        let mut renderer = PreviewRenderer::new(config.crop_path(), &path)?;
        if let Some(font) = font {
            renderer = renderer.with_font(font);
        }
        previews = renderer.render_all(&pack.cards)?;
        log::info!("Rendered {} previews to {}", previews, path.display());
    }

    Ok(PipelineSummary {
        cards: pack.cards.len(),
        bundles: pack.bundles.len(),
        images,
        crops,
        previews,
        pack_path,
        files_written,
    })
}
