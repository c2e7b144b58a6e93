// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Barcode module — the encoder capability and the raster it produces.

pub mod code128;
pub(crate) mod raster;

pub use code128::Code128Encoder;

use etiquetas_core::EncodingError;
use image::GrayImage;

/// A rasterised barcode plus the text it encodes.
///
/// Produced once per record and shared read-only by every page printed for
/// that record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarcodeRaster {
    text: String,
    pixel_height: u32,
    image: GrayImage,
}

impl BarcodeRaster {
    pub fn new(text: impl Into<String>, pixel_height: u32, image: GrayImage) -> Self {
        Self {
            text: text.into(),
            pixel_height,
            image,
        }
    }

    /// The encoded text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Requested bar height in pixels.
    pub fn pixel_height(&self) -> u32 {
        self.pixel_height
    }

    pub fn image(&self) -> &GrayImage {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Anything that can turn text into a barcode raster.
///
/// Implementations must be deterministic: the same `(text, pixel_height)`
/// always yields the same raster.
pub trait BarcodeEncoder: Send + Sync {
    fn encode(&self, text: &str, pixel_height: u32) -> Result<BarcodeRaster, EncodingError>;
}
