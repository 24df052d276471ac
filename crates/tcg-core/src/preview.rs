//! Framed card previews
//!
//! Draws each cropped card image inside the card frame: a rounded border,
//! a name banner, the company box and the rarity box. Text needs a font
//! file; without one the boxes are drawn empty.

use crate::error::{Error, Result};
use crate::images::open_image;
use crate::pack::ExportCard;
use ab_glyph::{FontVec, PxScale};
use image::{GrayImage, Luma, Rgba, RgbaImage};
use imageproc::definitions::Image;
use imageproc::drawing::{
    draw_filled_circle_mut, draw_filled_rect_mut, draw_line_segment_mut, draw_text_mut, text_size,
};
use imageproc::rect::Rect;
use std::fs;
use std::path::{Path, PathBuf};

/// Preview width in pixels
pub const PREVIEW_WIDTH: u32 = 600;
/// Preview height in pixels
pub const PREVIEW_HEIGHT: u32 = 800;

pub const BORDER_COLOR: Rgba<u8> = Rgba([255, 189, 123, 255]);
pub const TEXTBOX_COLOR: Rgba<u8> = Rgba([213, 213, 213, 255]);
const OUTLINE_COLOR: Rgba<u8> = Rgba([0, 0, 0, 255]);
const TEXT_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);
const RARITY_COLOR: Rgba<u8> = Rgba([255, 215, 0, 255]);

const BORDER_WIDTH: i32 = 28;
const BORDER_OUTLINE: i32 = 3;
const BORDER_RADIUS: i32 = 40;

const TEXTBOX_OUTLINE: i32 = 2;
const TEXTBOX_RADIUS: i32 = 20;
const TEXT_STROKE: i32 = 2;

const HEADER_WIDTH: i32 = 566;
const HEADER_Y: i32 = 20;
const BOX_HEIGHT: i32 = 60;
const COMPANY_X: i32 = 13;
const COMPANY_WIDTH: i32 = 350;
const RARITY_X: i32 = 426;
const RARITY_WIDTH: i32 = 162;
const FOOTER_Y: i32 = 672;

/// Inclusive pixel box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Area {
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
}

impl Area {
    fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    fn inset(self, by: i32) -> Self {
        Self::new(self.x1 + by, self.y1 + by, self.x2 - by, self.y2 - by)
    }

    fn center(self) -> (i32, i32) {
        ((self.x1 + self.x2) / 2, (self.y1 + self.y2) / 2)
    }
}

fn fill_rounded<P: image::Pixel>(canvas: &mut Image<P>, area: Area, radius: i32, color: P) {
    let (w, h) = (area.x2 - area.x1 + 1, area.y2 - area.y1 + 1);
    if w <= 0 || h <= 0 {
        return;
    }
    let r = radius.clamp(0, w.min(h) / 2);

    if w - 2 * r > 0 {
        let rect = Rect::at(area.x1 + r, area.y1).of_size((w - 2 * r) as u32, h as u32);
        draw_filled_rect_mut(canvas, rect, color);
    }
    if h - 2 * r > 0 {
        let rect = Rect::at(area.x1, area.y1 + r).of_size(w as u32, (h - 2 * r) as u32);
        draw_filled_rect_mut(canvas, rect, color);
    }
    if r > 0 {
        for center in [
            (area.x1 + r, area.y1 + r),
            (area.x2 - r, area.y1 + r),
            (area.x1 + r, area.y2 - r),
            (area.x2 - r, area.y2 - r),
        ] {
            draw_filled_circle_mut(canvas, center, r, color);
        }
    }
}

fn outlined_rounded(canvas: &mut RgbaImage, area: Area, radius: i32, outline: i32, fill: Rgba<u8>) {
    fill_rounded(canvas, area, radius, OUTLINE_COLOR);
    fill_rounded(canvas, area.inset(outline), radius - outline, fill);
}

/// Stroked text centered on `center`
fn draw_label(
    canvas: &mut RgbaImage,
    font: &FontVec,
    center: (i32, i32),
    text: &str,
    size: f32,
    color: Rgba<u8>,
) {
    let scale = PxScale::from(size);
    let (w, h) = text_size(scale, font, text);
    let x = center.0 - w as i32 / 2;
    let y = center.1 - h as i32 / 2;

    for dx in -TEXT_STROKE..=TEXT_STROKE {
        for dy in -TEXT_STROKE..=TEXT_STROKE {
            if dx != 0 || dy != 0 {
                draw_text_mut(canvas, OUTLINE_COLOR, x + dx, y + dy, scale, font, text);
            }
        }
    }
    draw_text_mut(canvas, color, x, y, scale, font, text);
}

fn draw_textbox(canvas: &mut RgbaImage, font: Option<&FontVec>, area: Area, text: Option<&str>) {
    outlined_rounded(canvas, area, TEXTBOX_RADIUS, TEXTBOX_OUTLINE, TEXTBOX_COLOR);
    if let (Some(font), Some(text)) = (font, text) {
        draw_label(canvas, font, area.center(), text, 40.0, TEXT_COLOR);
    }
}

/// Render one card's preview from its cropped image
pub fn render_preview(card: &ExportCard, art: &RgbaImage, font: Option<&FontVec>) -> RgbaImage {
    let (w, h) = (PREVIEW_WIDTH as i32, PREVIEW_HEIGHT as i32);
    let mut canvas = RgbaImage::new(PREVIEW_WIDTH, PREVIEW_HEIGHT);

    let outer = Area::new(0, 0, w - 1, h - 1).inset(1);
    outlined_rounded(&mut canvas, outer, BORDER_RADIUS, BORDER_OUTLINE, BORDER_COLOR);
    let inner = outer.inset(BORDER_WIDTH);
    outlined_rounded(&mut canvas, inner, BORDER_RADIUS, BORDER_OUTLINE, BORDER_COLOR);

    // Art shows through the inner frame only
    let mut mask = GrayImage::new(PREVIEW_WIDTH, PREVIEW_HEIGHT);
    fill_rounded(
        &mut mask,
        inner.inset(BORDER_OUTLINE),
        BORDER_RADIUS - BORDER_OUTLINE - 1,
        Luma([255]),
    );
    let offset_x = (w - art.width() as i32) / 2;
    let offset_y = (h - art.height() as i32) / 2;
    for (x, y, m) in mask.enumerate_pixels() {
        if m[0] == 0 {
            continue;
        }
        let (ax, ay) = (x as i32 - offset_x, y as i32 - offset_y);
        let pixel = if ax >= 0 && ay >= 0 && (ax as u32) < art.width() && (ay as u32) < art.height()
        {
            *art.get_pixel(ax as u32, ay as u32)
        } else {
            Rgba([0, 0, 0, 0])
        };
        canvas.put_pixel(x, y, pixel);
    }

    let header_x = (w - HEADER_WIDTH) / 2;
    let header = Area::new(header_x, HEADER_Y, header_x + HEADER_WIDTH, HEADER_Y + BOX_HEIGHT);
    draw_textbox(&mut canvas, font, header, Some(card.name.as_str()));

    let company = Area::new(
        COMPANY_X,
        FOOTER_Y,
        COMPANY_X + COMPANY_WIDTH,
        FOOTER_Y + BOX_HEIGHT,
    );
    draw_textbox(&mut canvas, font, company, card.subtext.as_deref());

    let rarity = Area::new(RARITY_X, FOOTER_Y, RARITY_X + RARITY_WIDTH, FOOTER_Y + BOX_HEIGHT);
    draw_textbox(&mut canvas, font, rarity, None);
    if let Some(font) = font {
        let (cx, cy) = rarity.center();
        draw_label(&mut canvas, font, (cx - 30, cy), "1", 35.0, TEXTBOX_COLOR);
        draw_label(
            &mut canvas,
            font,
            (cx + 48, cy),
            card.rarity.short_name(),
            35.0,
            RARITY_COLOR,
        );
    }
    for x in [526.0, 527.0] {
        draw_line_segment_mut(&mut canvas, (x, 680.0), (x, 722.0), OUTLINE_COLOR);
    }

    canvas
}

/// Load a TrueType/OpenType font for preview text
pub fn load_font<P: AsRef<Path>>(path: P) -> Result<FontVec> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    FontVec::try_from_vec(bytes).map_err(|_| Error::InvalidFont(path.to_path_buf()))
}

/// Writes a preview for every card with a cropped image
pub struct PreviewRenderer {
    crop_dir: PathBuf,
    output_dir: PathBuf,
    font: Option<FontVec>,
}

impl PreviewRenderer {
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(crop_dir: P, output_dir: Q) -> Result<Self> {
        let output_dir = output_dir.as_ref().to_path_buf();
        fs::create_dir_all(&output_dir)?;
        Ok(Self {
            crop_dir: crop_dir.as_ref().to_path_buf(),
            output_dir,
            font: None,
        })
    }

    pub fn with_font(mut self, font: FontVec) -> Self {
        self.font = Some(font);
        self
    }

    /// Render one preview, named like the card's cropped image
    pub fn render_card(&self, card: &ExportCard) -> Result<Option<PathBuf>> {
        let Some(image_url) = card.image_url.as_deref() else {
            log::warn!("Card '{}' has no card image, no preview", card.name);
            return Ok(None);
        };

        let art = open_image(&self.crop_dir.join(image_url))?.to_rgba8();
        let target = self.output_dir.join(image_url);
        log::debug!("Writing preview {}", target.display());
        render_preview(card, &art, self.font.as_ref()).save(&target)?;
        Ok(Some(target))
    }

    pub fn render_all(&self, cards: &[ExportCard]) -> Result<usize> {
        if self.font.is_none() {
            log::warn!("No preview font given, text boxes will be empty");
        }
        let mut count = 0;
        for card in cards {
            if self.render_card(card)?.is_some() {
                count += 1;
            }
        }
        Ok(count)
    }
}
