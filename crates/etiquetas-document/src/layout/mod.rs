// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Label layout — turn one record and its two barcode rasters into the
// drawing primitives of a single 100mm × 70mm label.
//
// The label is four stacked regions. Below the header every row is a
// fixed-width caption box on the left and a content box on the right:
//
//   +--------------------------------------------+
//   |              CUSTOMER NAME                 |
//   | CÓDIGO    | code                           |
//   | EAN       | ||||||||| ean barcode |||||||| |
//   | DESCRIÇÃO | wrapped, centred description   |
//   | LOTE      | lot  | |||| lot barcode |||||  |
//   | VENCIMENTO| expiry                         |
//   +--------------------------------------------+

pub mod primitives;
pub mod text;

use std::sync::Arc;

use etiquetas_core::{BoxRow, LabelConfig, LabelRecord, LayoutConstants, PageSize};
use tracing::{trace, warn};

pub use primitives::{Align, Font, FontWeight, LabelPage, Primitive, Rect, Slot, TextRun};
pub use text::{TextMeasure, centered_start_y, line_height, truncate_chars};

use crate::barcode::BarcodeRaster;

pub const CAPTION_CODE: &str = "CÓDIGO";
pub const CAPTION_EAN: &str = "EAN";
pub const CAPTION_DESCRIPTION: &str = "DESCRIÇÃO";
pub const CAPTION_LOT: &str = "LOTE";
pub const CAPTION_EXPIRY: &str = "VENCIMENTO";

/// Computes label pages. Stateless apart from its constants.
pub struct LabelLayoutEngine {
    constants: LayoutConstants,
    page: PageSize,
    metrics: Arc<dyn TextMeasure>,
}

impl LabelLayoutEngine {
    pub fn new(constants: LayoutConstants, page: PageSize, metrics: Arc<dyn TextMeasure>) -> Self {
        Self {
            constants,
            page,
            metrics,
        }
    }

    pub fn from_config(config: &LabelConfig, metrics: Arc<dyn TextMeasure>) -> Self {
        Self::new(config.layout.clone(), config.page, metrics)
    }

    /// Lay out one physical label.
    pub fn layout(
        &self,
        record: &LabelRecord,
        ean: &Arc<BarcodeRaster>,
        lot: &Arc<BarcodeRaster>,
    ) -> LabelPage {
        let c = &self.constants;
        let (page_width, _) = self.page.dimensions_mm();
        let mut page = LabelPage::new();

        // 1. Header: no box, spans the boxed columns.
        let header = Rect::new(
            c.left_inset,
            c.header.top,
            page_width - 2.0 * c.left_inset,
            c.header.height,
        );
        self.centered_text(
            &mut page,
            Slot::Header,
            &record.customer_name,
            header,
            Font::bold(c.header_font_pt),
            Align::Center,
        );

        // 2. Code / EAN.
        let code_box = self.row(&mut page, CAPTION_CODE, c.code_row);
        self.centered_text(
            &mut page,
            Slot::Code,
            &record.code,
            code_box,
            Font::regular(c.value_font_pt),
            Align::Center,
        );

        let ean_box = self.row(&mut page, CAPTION_EAN, c.ean_row);
        page.push(Primitive::Image {
            slot: Slot::EanBarcode,
            raster: Arc::clone(ean),
            frame: ean_box.inset(c.padding),
        });

        // 3. Description, cut before wrapping.
        let description_box = self.row(&mut page, CAPTION_DESCRIPTION, c.description_row);
        let description = truncate_chars(&record.description, c.description_max_chars);
        self.centered_text(
            &mut page,
            Slot::Description,
            description,
            description_box,
            Font::regular(c.description_font_pt),
            Align::Left,
        );

        // 4. Lot (text cell | barcode) and expiry.
        let lot_box = self.row(&mut page, CAPTION_LOT, c.lot_row);
        let (lot_text, lot_code) = lot_box.split_at_x(c.lot_text_width);
        page.push(Primitive::Line {
            from: (lot_text.right(), lot_box.y),
            to: (lot_text.right(), lot_box.bottom()),
        });
        self.centered_text(
            &mut page,
            Slot::Lot,
            &record.lot,
            lot_text,
            Font::bold(c.value_font_pt),
            Align::Center,
        );
        page.push(Primitive::Image {
            slot: Slot::LotBarcode,
            raster: Arc::clone(lot),
            frame: lot_code.inset(c.padding),
        });

        let expiry_box = self.row(&mut page, CAPTION_EXPIRY, c.expiry_row);
        self.centered_text(
            &mut page,
            Slot::Expiry,
            &record.expiry,
            expiry_box,
            Font::bold(c.expiry_font_pt),
            Align::Center,
        );

        trace!(line = record.line, primitives = page.primitives().len(), "Label laid out");
        page
    }

    /// Draw a caption box and its content box for `row`; returns the content
    /// box.
    fn row(&self, page: &mut LabelPage, caption: &str, row: BoxRow) -> Rect {
        let c = &self.constants;
        let (page_width, _) = self.page.dimensions_mm();

        let label = Rect::new(c.left_inset, row.top, c.label_box_width, row.height);
        let content_x = label.right();
        let content = Rect::new(
            content_x,
            row.top,
            page_width - c.left_inset - content_x,
            row.height,
        );

        page.push(Primitive::Rect(label));
        self.centered_text(
            page,
            Slot::Caption,
            caption,
            label,
            Font::bold(c.caption_font_pt),
            Align::Center,
        );
        page.push(Primitive::Rect(content));
        content
    }

    /// Wrap `text` to `frame` and centre the block vertically in it.
    fn centered_text(
        &self,
        page: &mut LabelPage,
        slot: Slot,
        text: &str,
        frame: Rect,
        font: Font,
        align: Align,
    ) {
        let padding = self.constants.padding;
        let inner = frame.inset(padding);
        let lines = self.metrics.split_to_width(text, font, inner.width);
        let pitch = line_height(font, self.constants.line_height_factor);
        let y = centered_start_y(frame.center_y(), lines.len(), pitch);

        // Truncation is the only overflow guard; taller blocks spill over
        // the box border.
        let block_height = lines.len() as f32 * pitch;
        if block_height > frame.height {
            warn!(
                ?slot,
                lines = lines.len(),
                block_height,
                box_height = frame.height,
                "Text overflows its box"
            );
        }

        let x = match align {
            Align::Left => inner.x,
            Align::Center => frame.center_x(),
            Align::Right => inner.right(),
        };

        page.push(Primitive::Text(TextRun {
            slot,
            lines,
            x,
            y,
            line_height: pitch,
            align,
            font,
        }));
    }
}
