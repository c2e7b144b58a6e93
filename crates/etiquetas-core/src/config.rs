// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Generator configuration: page stock, layout constants, barcode raster
// settings and run options. Every field has a default so a partial JSON file
// is enough to override a single value.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::PageSize;
use crate::error::{EtiquetasError, Result};

/// A horizontal band of the label: distance from the top edge and height,
/// both in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxRow {
    pub top: f32,
    pub height: f32,
}

impl BoxRow {
    pub const fn new(top: f32, height: f32) -> Self {
        Self { top, height }
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

/// Millimetre offsets of every box on the label.
///
/// These must match the physical label stock; the defaults are tuned for
/// 100mm × 70mm landscape labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConstants {
    /// Outer margin on every edge.
    pub margin: f32,
    /// Distance from the left and right page edges to the boxed columns.
    pub left_inset: f32,
    /// Width of the fixed caption box on the left of each row.
    pub label_box_width: f32,
    /// Inner padding between a box border and its content.
    pub padding: f32,
    pub header: BoxRow,
    pub code_row: BoxRow,
    pub ean_row: BoxRow,
    pub description_row: BoxRow,
    pub lot_row: BoxRow,
    pub expiry_row: BoxRow,
    /// Width of the lot text cell inside the lot content box; the barcode
    /// takes the remainder.
    pub lot_text_width: f32,
    pub header_font_pt: f32,
    pub caption_font_pt: f32,
    pub value_font_pt: f32,
    pub description_font_pt: f32,
    pub expiry_font_pt: f32,
    /// Line height as a multiple of the font size.
    pub line_height_factor: f32,
    /// Descriptions longer than this many characters are cut before wrapping.
    pub description_max_chars: usize,
}

impl Default for LayoutConstants {
    fn default() -> Self {
        Self {
            margin: 1.0,
            left_inset: 3.0,
            label_box_width: 22.0,
            padding: 1.0,
            header: BoxRow::new(1.0, 9.0),
            code_row: BoxRow::new(10.0, 6.0),
            ean_row: BoxRow::new(16.0, 16.0),
            description_row: BoxRow::new(32.0, 16.0),
            lot_row: BoxRow::new(48.0, 14.0),
            expiry_row: BoxRow::new(62.0, 7.0),
            lot_text_width: 24.0,
            header_font_pt: 14.0,
            caption_font_pt: 7.0,
            value_font_pt: 10.0,
            description_font_pt: 9.0,
            expiry_font_pt: 14.0,
            line_height_factor: 1.15,
            description_max_chars: 132,
        }
    }
}

impl LayoutConstants {
    /// Check that every box lies on a page of the given size.
    pub fn validate(&self, page: &PageSize) -> Result<()> {
        let (width, height) = page.dimensions_mm();

        let content_width = width - 2.0 * self.left_inset - self.label_box_width;
        if content_width <= 0.0 {
            return Err(EtiquetasError::Config(format!(
                "label box width {}mm leaves no room for content on a {}mm page",
                self.label_box_width, width
            )));
        }
        if self.lot_text_width <= 0.0 || self.lot_text_width >= content_width {
            return Err(EtiquetasError::Config(format!(
                "lot text width {}mm must be inside the {}mm content box",
                self.lot_text_width, content_width
            )));
        }

        let rows = [
            ("header", self.header),
            ("code", self.code_row),
            ("ean", self.ean_row),
            ("description", self.description_row),
            ("lot", self.lot_row),
            ("expiry", self.expiry_row),
        ];
        if self.margin < 0.0 || 2.0 * self.margin >= height {
            return Err(EtiquetasError::Config(format!(
                "margin {}mm does not fit a {}mm page",
                self.margin, height
            )));
        }
        let (top_limit, bottom_limit) = (self.margin, height - self.margin);
        for (name, row) in rows {
            if row.height <= 0.0 || row.top < top_limit || row.bottom() > bottom_limit {
                return Err(EtiquetasError::Config(format!(
                    "{name} row ({}mm + {}mm) is outside the {}mm..{}mm printable band",
                    row.top, row.height, top_limit, bottom_limit
                )));
            }
        }

        if self.description_max_chars == 0 {
            return Err(EtiquetasError::Config(
                "description_max_chars must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Raster settings for the barcode images.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BarcodeSettings {
    /// Width of one barcode module in pixels.
    pub module_px: u32,
    /// Height of the bars in pixels.
    pub pixel_height: u32,
    /// Blank modules on either side of the symbol.
    pub quiet_zone_modules: u32,
    /// Print the encoded text below the bars.
    pub human_readable: bool,
}

impl Default for BarcodeSettings {
    fn default() -> Self {
        Self {
            module_px: 3,
            pixel_height: 120,
            quiet_zone_modules: 10,
            human_readable: true,
        }
    }
}

/// Settings for one label generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    pub page: PageSize,
    pub layout: LayoutConstants,
    pub barcode: BarcodeSettings,
    /// Reject the whole input on the first incomplete row instead of
    /// dropping it.
    pub strict_rows: bool,
    /// Encode barcodes for all records in parallel before assembling pages.
    pub parallel_encoding: bool,
    /// Default output file name.
    pub output_file: String,
    /// Title embedded in the PDF metadata.
    pub title: String,
    /// Largest `QTD_ETIQUETAS` accepted for one row.
    pub max_repeat: u32,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            page: PageSize::LABEL_100X70,
            layout: LayoutConstants::default(),
            barcode: BarcodeSettings::default(),
            strict_rows: false,
            parallel_encoding: false,
            output_file: "etiquetas.pdf".into(),
            title: "Etiquetas".into(),
            max_repeat: 1000,
        }
    }
}

impl LabelConfig {
    /// Load a configuration from a JSON file and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let config: LabelConfig = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.layout.validate(&self.page)?;
        if self.barcode.module_px == 0 || self.barcode.pixel_height == 0 {
            return Err(EtiquetasError::Config(
                "barcode module width and height must be positive".into(),
            ));
        }
        if self.max_repeat == 0 {
            return Err(EtiquetasError::Config("max_repeat must be at least 1".into()));
        }
        if self.output_file.trim().is_empty() {
            return Err(EtiquetasError::Config("output file name is empty".into()));
        }
        Ok(())
    }
}
