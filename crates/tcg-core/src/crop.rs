//! Crop and compose card artwork onto the fixed card canvas
//!
//! The operator picks crop rectangles by editing a crop plan (JSON keyed by
//! card name). Cards without an entry get a centered crop at the canvas
//! aspect ratio. Outputs that already exist are never redone, so re-running
//! the pipeline only touches new cards.

use crate::card::Card;
use crate::error::{Error, Result};
use crate::images::{image_dimensions, open_image};
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Card canvas width in pixels
pub const CANVAS_WIDTH: u32 = 550;
/// Card canvas height in pixels
pub const CANVAS_HEIGHT: u32 = 750;

/// A rectangle in source image pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRegion {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Largest centered region of the given aspect ratio inside an image
    pub fn centered(image_width: u32, image_height: u32, ratio_w: u32, ratio_h: u32) -> Self {
        let (iw, ih) = (image_width as u64, image_height as u64);
        let (rw, rh) = (ratio_w.max(1) as u64, ratio_h.max(1) as u64);

        let (w, h) = if iw * rh > ih * rw {
            // Too wide: keep full height
            ((ih * rw / rh).max(1), ih)
        } else {
            (iw, (iw * rh / rw).max(1))
        };

        Self {
            x: ((iw - w.min(iw)) / 2) as u32,
            y: ((ih - h.min(ih)) / 2) as u32,
            width: w.min(iw) as u32,
            height: h.min(ih) as u32,
        }
    }

    /// True if the region is non-empty and lies inside the image
    pub fn fits(&self, image_width: u32, image_height: u32) -> bool {
        let right = self.x.checked_add(self.width);
        let bottom = self.y.checked_add(self.height);
        self.width > 0
            && self.height > 0
            && right.is_some_and(|r| r <= image_width)
            && bottom.is_some_and(|b| b <= image_height)
    }
}

/// Operator choices for one card
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<CropRegion>,
    /// RGBA fill behind transparent artwork
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<[u8; 4]>,
}

/// Crop choices keyed by composite card name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropPlan {
    pub cards: BTreeMap<String, CropSpec>,
}

impl CropPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a crop plan from JSON
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| Error::FileRead {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(Error::Json)
    }

    /// Save the crop plan to JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn get(&self, card_name: &str) -> Option<&CropSpec> {
        self.cards.get(card_name)
    }

    pub fn insert(&mut self, card_name: impl Into<String>, spec: CropSpec) {
        self.cards.insert(card_name.into(), spec);
    }

    /// Starting plan with centered regions for every card with local artwork
    pub fn for_cards(cards: &[Card]) -> Result<Self> {
        let mut plan = Self::new();
        for card in cards {
            let Some(path) = &card.local_image_path else {
                continue;
            };
            let (w, h) = image_dimensions(path)?;
            plan.insert(
                card.card_name(),
                CropSpec {
                    region: Some(CropRegion::centered(w, h, CANVAS_WIDTH, CANVAS_HEIGHT)),
                    background: None,
                },
            );
        }
        Ok(plan)
    }
}

/// Crop an image and composite it over a solid fill at the canvas size
pub fn compose(
    source: &DynamicImage,
    region: CropRegion,
    background: [u8; 4],
    width: u32,
    height: u32,
) -> RgbaImage {
    let cropped = source
        .crop_imm(region.x, region.y, region.width, region.height)
        .resize_exact(width, height, FilterType::Lanczos3)
        .to_rgba8();

    let mut canvas = RgbaImage::from_pixel(width, height, Rgba(background));
    imageops::overlay(&mut canvas, &cropped, 0, 0);
    canvas
}

/// Writes the fixed-size image for each card
pub struct Cropper {
    output_dir: PathBuf,
    width: u32,
    height: u32,
}

impl Cropper {
    /// Cropper for the standard card canvas
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Result<Self> {
        Self::with_size(output_dir, CANVAS_WIDTH, CANVAS_HEIGHT)
    }

    pub fn with_size<P: AsRef<Path>>(output_dir: P, width: u32, height: u32) -> Result<Self> {
        let output_dir = output_dir.as_ref().to_path_buf();
        fs::create_dir_all(&output_dir)?;
        Ok(Self {
            output_dir,
            width,
            height,
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Produce the card's cropped image unless it already exists
    ///
    /// Sets `resized_uri` to the output file name. Returns `Ok(None)` when
    /// there is neither an existing output nor local artwork to crop.
    pub fn crop_card(&self, card: &mut Card, plan: &CropPlan) -> Result<Option<PathBuf>> {
        let card_name = card.card_name();
        let filename = card.image_filename(".png");
        let target = self.output_dir.join(&filename);
        let spec = plan.get(&card_name).cloned().unwrap_or_default();

        if let Some(background) = spec.background {
            card.background_fill = background;
        }

        if target.exists() {
            log::debug!("Keeping existing crop {}", target.display());
        } else {
            let Some(source_path) = &card.local_image_path else {
                log::warn!("Card '{}' has no local artwork, not cropping", card_name);
                return Ok(None);
            };

            let source = open_image(source_path)?;
            let (w, h) = (source.width(), source.height());
            let region = spec
                .region
                .unwrap_or_else(|| CropRegion::centered(w, h, self.width, self.height));

            if !region.fits(w, h) {
                return Err(Error::InvalidCropRegion {
                    card: card_name,
                    width: w,
                    height: h,
                });
            }

            log::info!("Cropping '{}' to {}", card_name, target.display());
            compose(&source, region, card.background_fill, self.width, self.height)
                .save(&target)?;
        }

        card.resized_uri = Some(filename);
        Ok(Some(target))
    }

    /// Crop every card, returning how many have an output image
    pub fn crop_all(&self, cards: &mut [Card], plan: &CropPlan) -> Result<usize> {
        let mut count = 0;
        for card in cards.iter_mut() {
            if self.crop_card(card, plan)?.is_some() {
                count += 1;
            }
        }
        Ok(count)
    }
}
