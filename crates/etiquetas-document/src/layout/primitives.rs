// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Drawing primitives for one label page. Coordinates are millimetres from the
// top-left corner of the page; the PDF writer flips them into PDF space.

use std::sync::Arc;

use crate::barcode::BarcodeRaster;

/// Millimetres per PostScript point.
pub const MM_PER_PT: f32 = 25.4 / 72.0;

/// An axis-aligned rectangle in page millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    /// Shrink by `pad` on every side, never below zero size.
    pub fn inset(&self, pad: f32) -> Rect {
        let width = (self.width - 2.0 * pad).max(0.0);
        let height = (self.height - 2.0 * pad).max(0.0);
        Rect::new(self.x + pad, self.y + pad, width, height)
    }

    /// Split into a left part `left_width` wide and the remainder.
    pub fn split_at_x(&self, left_width: f32) -> (Rect, Rect) {
        let left_width = left_width.clamp(0.0, self.width);
        (
            Rect::new(self.x, self.y, left_width, self.height),
            Rect::new(self.x + left_width, self.y, self.width - left_width, self.height),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontWeight {
    Regular,
    Bold,
}

/// Helvetica at a given weight and size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Font {
    pub weight: FontWeight,
    pub size_pt: f32,
}

impl Font {
    pub const fn regular(size_pt: f32) -> Self {
        Self {
            weight: FontWeight::Regular,
            size_pt,
        }
    }

    pub const fn bold(size_pt: f32) -> Self {
        Self {
            weight: FontWeight::Bold,
            size_pt,
        }
    }

    /// Font size in millimetres.
    pub fn size_mm(&self) -> f32 {
        self.size_pt * MM_PER_PT
    }
}

/// Horizontal anchoring of a text run relative to its `x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// Which part of the label a text run or image fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Header,
    Caption,
    Code,
    EanBarcode,
    Description,
    Lot,
    LotBarcode,
    Expiry,
}

/// One or more lines of text drawn with the same font.
///
/// `y` is the vertical middle of the first line; following lines are
/// `line_height` apart.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub slot: Slot,
    pub lines: Vec<String>,
    pub x: f32,
    pub y: f32,
    pub line_height: f32,
    pub align: Align,
    pub font: Font,
}

impl TextRun {
    /// Vertical middle of line `idx`.
    pub fn line_y(&self, idx: usize) -> f32 {
        self.y + idx as f32 * self.line_height
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// Stroked box outline.
    Rect(Rect),
    /// Stroked straight line.
    Line { from: (f32, f32), to: (f32, f32) },
    Text(TextRun),
    /// A barcode raster stretched to fill `frame`.
    Image {
        slot: Slot,
        raster: Arc<BarcodeRaster>,
        frame: Rect,
    },
}

/// The ordered drawing primitives of one physical label.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelPage {
    primitives: Vec<Primitive>,
}

impl LabelPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, primitive: Primitive) {
        self.primitives.push(primitive);
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    /// All text runs, in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &TextRun> {
        self.primitives.iter().filter_map(|primitive| match primitive {
            Primitive::Text(run) => Some(run),
            _ => None,
        })
    }

    /// The first text run filling `slot`.
    pub fn text(&self, slot: Slot) -> Option<&TextRun> {
        self.texts().find(|run| run.slot == slot)
    }

    /// The raster placed in `slot`, with its frame.
    pub fn image(&self, slot: Slot) -> Option<(&Arc<BarcodeRaster>, Rect)> {
        self.primitives.iter().find_map(|primitive| match primitive {
            Primitive::Image {
                slot: image_slot,
                raster,
                frame,
            } if *image_slot == slot => Some((raster, *frame)),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inset_never_goes_negative() {
        let rect = Rect::new(10.0, 10.0, 1.0, 4.0).inset(1.0);
        assert_eq!(rect, Rect::new(11.0, 11.0, 0.0, 2.0));
    }

    #[test]
    fn split_keeps_total_width() {
        let (left, right) = Rect::new(25.0, 48.0, 72.0, 14.0).split_at_x(24.0);
        assert_eq!(left, Rect::new(25.0, 48.0, 24.0, 14.0));
        assert_eq!(right, Rect::new(49.0, 48.0, 48.0, 14.0));
    }

    #[test]
    fn ten_point_font_in_millimetres() {
        assert!((Font::regular(10.0).size_mm() - 3.5278).abs() < 1e-3);
    }
}
