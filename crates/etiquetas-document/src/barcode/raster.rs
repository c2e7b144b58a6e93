// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Barcode rasteriser — paint a module sequence (and optionally its
// human-readable text) into a grayscale image using the `image` and
// `imageproc` crates and the Spleen bitmap font.

use etiquetas_core::{BarcodeSettings, EncodingError};
use image::{GrayImage, Luma};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use spleen_font::{FONT_12X24, PSF2Font};
use tracing::{debug, instrument};

const WHITE: Luma<u8> = Luma([255]);
const BLACK: Luma<u8> = Luma([0]);

/// Spleen 12×24 glyph cell.
const GLYPH_WIDTH: u32 = 12;
const GLYPH_HEIGHT: u32 = 24;
/// Gap between the bars and the human-readable text.
const TEXT_GAP: u32 = 6;
/// Blank rows below the text.
const TEXT_BOTTOM: u32 = 4;

/// Paints barcode modules into a [`GrayImage`].
///
/// ```ignore
/// let image = Rasterizer::new(&settings)
///     .bars(&modules, 120)
///     .caption("7891234567895")
///     .finish()?;
/// ```
pub(crate) struct Rasterizer<'a> {
    settings: &'a BarcodeSettings,
    modules: &'a [u8],
    bar_height: u32,
    caption: Option<&'a str>,
}

impl<'a> Rasterizer<'a> {
    pub(crate) fn new(settings: &'a BarcodeSettings) -> Self {
        Self {
            settings,
            modules: &[],
            bar_height: 0,
            caption: None,
        }
    }

    /// Set the module sequence (1 = bar, 0 = space) and the bar height.
    pub(crate) fn bars(self, modules: &'a [u8], bar_height: u32) -> Self {
        Self {
            modules,
            bar_height,
            ..self
        }
    }

    /// Print `text` below the bars when human-readable output is enabled.
    pub(crate) fn caption(self, text: &'a str) -> Self {
        let caption = self.settings.human_readable.then_some(text);
        Self { caption, ..self }
    }

    /// Paint the image.
    #[instrument(skip(self), fields(modules = self.modules.len(), bar_height = self.bar_height))]
    pub(crate) fn finish(self) -> Result<GrayImage, EncodingError> {
        let module_px = self.settings.module_px.max(1);
        let quiet_px = self.settings.quiet_zone_modules * module_px;
        let module_count = u32::try_from(self.modules.len())
            .map_err(|_| EncodingError::Raster("barcode too long".into()))?;
        let bars_width = module_count * module_px + 2 * quiet_px;

        let caption_width = self
            .caption
            .map(|text| text.chars().count() as u32 * GLYPH_WIDTH + 2 * quiet_px)
            .unwrap_or(0);
        let width = bars_width.max(caption_width);
        let height = match self.caption {
            Some(_) => self.bar_height + TEXT_GAP + GLYPH_HEIGHT + TEXT_BOTTOM,
            None => self.bar_height,
        };
        if width == 0 || self.bar_height == 0 {
            return Err(EncodingError::Raster(format!(
                "empty raster ({width}x{})",
                self.bar_height
            )));
        }

        let mut image = GrayImage::from_pixel(width, height, WHITE);

        // Paint runs of adjacent bar modules as single rectangles.
        let origin = (width - bars_width) / 2 + quiet_px;
        let mut idx = 0;
        while idx < self.modules.len() {
            if self.modules[idx] == 0 {
                idx += 1;
                continue;
            }
            let start = idx;
            while idx < self.modules.len() && self.modules[idx] != 0 {
                idx += 1;
            }
            let x = origin + start as u32 * module_px;
            let run_width = (idx - start) as u32 * module_px;
            draw_filled_rect_mut(
                &mut image,
                Rect::at(x as i32, 0).of_size(run_width, self.bar_height),
                BLACK,
            );
        }

        if let Some(text) = self.caption {
            let text_width = text.chars().count() as u32 * GLYPH_WIDTH;
            let left = (width - text_width) / 2;
            draw_caption(&mut image, text, left, self.bar_height + TEXT_GAP)?;
        }

        debug!(width, height, "Barcode rasterised");
        Ok(image)
    }
}

/// Draw `text` with its top-left corner at (`left`, `top`).
fn draw_caption(image: &mut GrayImage, text: &str, left: u32, top: u32) -> Result<(), EncodingError> {
    let mut font = PSF2Font::new(FONT_12X24)
        .map_err(|err| EncodingError::Raster(format!("font load failed: {err:?}")))?;

    let mut utf8 = [0u8; 4];
    for (col, ch) in text.chars().enumerate() {
        let cell_x = left + col as u32 * GLYPH_WIDTH;
        let Some(glyph) = font.glyph_for_utf8(ch.encode_utf8(&mut utf8).as_bytes()) else {
            continue;
        };
        for (row_y, row) in glyph.enumerate() {
            for (col_x, on) in row.enumerate() {
                let (x, y) = (cell_x + col_x as u32, top + row_y as u32);
                if on && x < image.width() && y < image.height() {
                    image.put_pixel(x, y, BLACK);
                }
            }
        }
    }
    Ok(())
}
