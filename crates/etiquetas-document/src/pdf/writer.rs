// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer — render label documents using `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use etiquetas_core::error::Result;
use etiquetas_core::{EmptyInputCause, EtiquetasError, LabelConfig, PageSize};
use image::DynamicImage;
use lopdf::Object;
use printpdf::{
    BuiltinFont, Color, Line, LinePoint, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions,
    PdfWarnMsg, Point, Pt, RawImage, RawImageData, RawImageFormat, Rgb, TextItem, XObjectId,
    XObjectTransform,
};
use tracing::{debug, info, instrument, warn};

use super::metrics::BuiltinMetrics;
use crate::assemble::LabelDocument;
use crate::barcode::BarcodeRaster;
use crate::layout::{Align, FontWeight, LabelPage, Primitive, Rect, TextMeasure, TextRun};

/// Resolution the barcode rasters are declared at; placement rescales them
/// to their frame anyway.
const RASTER_DPI: f32 = 300.0;

/// Half the Helvetica cap height (718/1000 em). Added to a line's middle to
/// get its baseline.
const HALF_CAP_HEIGHT: f32 = 0.359;

/// Stroke width of box outlines.
const OUTLINE_PT: f32 = 0.5;

/// Renders [`LabelDocument`]s as PDF.
pub struct PdfWriter {
    /// Label stock every page is created with.
    page: PageSize,
    /// Title metadata embedded in the PDF /Info dictionary. Falls back to
    /// the document's own title.
    title: Option<String>,
    metrics: BuiltinMetrics,
}

impl PdfWriter {
    pub fn new(page: PageSize) -> Self {
        Self {
            page,
            title: None,
            metrics: BuiltinMetrics,
        }
    }

    /// Writer for the 100mm × 70mm label stock.
    pub fn label_stock() -> Self {
        Self::new(PageSize::LABEL_100X70)
    }

    pub fn from_config(config: &LabelConfig) -> Self {
        let mut writer = Self::new(config.page);
        writer.set_title(config.title.clone());
        writer
    }

    /// Set a title for the PDF metadata.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    /// Page dimensions in printpdf's Mm units.
    fn page_dimensions(&self) -> (Mm, Mm) {
        let (w_mm, h_mm) = self.page.dimensions_mm();
        (Mm(w_mm), Mm(h_mm))
    }

    /// Render every page of `document`, in order, to PDF bytes.
    ///
    /// Each distinct barcode raster is embedded once and referenced by all
    /// pages that show it.
    #[instrument(skip_all, fields(pages = document.len()))]
    pub fn render(&self, document: &LabelDocument) -> Result<Vec<u8>> {
        if document.is_empty() {
            return Err(EtiquetasError::EmptyInput(EmptyInputCause::NoRecords));
        }

        let (page_w, page_h) = self.page_dimensions();
        let title = self.title.as_deref().unwrap_or(document.title());
        info!(pages = document.len(), title, "Rendering label PDF");

        let mut doc = PdfDocument::new(title);
        let mut images: HashMap<usize, XObjectId> = HashMap::new();
        let mut pages: Vec<PdfPage> = Vec::with_capacity(document.len());

        for label in document.pages() {
            let ops = self.page_ops(&mut doc, &mut images, label)?;
            pages.push(PdfPage::new(page_w, page_h, ops));
        }

        doc.with_pages(pages);
        debug!(
            pages = doc.pages.len(),
            images = images.len(),
            "Label pages built"
        );

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let output = doc.save(&PdfSaveOptions::default(), &mut warnings);
        if !warnings.is_empty() {
            warn!(count = warnings.len(), "printpdf reported warnings while saving");
        }

        exact_page_boxes(&output, page_w.into_pt().0, page_h.into_pt().0)
    }

    /// Render `document` and write it to `path`.
    pub fn write_to_file(&self, document: &LabelDocument, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.render(document)?;
        std::fs::write(path.as_ref(), &bytes)?;
        info!("Wrote label PDF to {}", path.as_ref().display());
        Ok(())
    }

    // -- Page content ---------------------------------------------------------

    fn page_ops(
        &self,
        doc: &mut PdfDocument,
        images: &mut HashMap<usize, XObjectId>,
        label: &LabelPage,
    ) -> Result<Vec<Op>> {
        let mut ops = vec![
            Op::SetOutlineColor {
                col: Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)),
            },
            Op::SetOutlineThickness { pt: Pt(OUTLINE_PT) },
        ];

        for primitive in label.primitives() {
            match primitive {
                Primitive::Rect(rect) => ops.push(self.outline(rect)),
                Primitive::Line { from, to } => ops.push(Op::DrawLine {
                    line: Line {
                        points: vec![self.line_point(*from), self.line_point(*to)],
                        is_closed: false,
                    },
                }),
                Primitive::Text(run) => self.push_text(&mut ops, run),
                Primitive::Image { raster, frame, .. } => {
                    let key = Arc::as_ptr(raster) as usize;
                    let id = match images.get(&key) {
                        Some(id) => id.clone(),
                        None => {
                            let id = doc.add_image(&raw_image(raster)?);
                            images.insert(key, id.clone());
                            id
                        }
                    };
                    ops.push(self.place_image(id, raster, frame));
                }
            }
        }

        Ok(ops)
    }

    /// Convert a top-left millimetre position into PDF space.
    fn point(&self, x_mm: f32, y_mm: f32) -> Point {
        let (_, page_h) = self.page.dimensions_mm();
        Point {
            x: Mm(x_mm).into_pt(),
            y: Mm(page_h - y_mm).into_pt(),
        }
    }

    fn line_point(&self, (x, y): (f32, f32)) -> LinePoint {
        LinePoint {
            p: self.point(x, y),
            bezier: false,
        }
    }

    fn outline(&self, rect: &Rect) -> Op {
        let corners = [
            (rect.x, rect.y),
            (rect.right(), rect.y),
            (rect.right(), rect.bottom()),
            (rect.x, rect.bottom()),
        ];
        Op::DrawLine {
            line: Line {
                points: corners.into_iter().map(|c| self.line_point(c)).collect(),
                is_closed: true,
            },
        }
    }

    fn push_text(&self, ops: &mut Vec<Op>, run: &TextRun) {
        let font = match run.font.weight {
            FontWeight::Regular => BuiltinFont::Helvetica,
            FontWeight::Bold => BuiltinFont::HelveticaBold,
        };
        let baseline_offset = run.font.size_mm() * HALF_CAP_HEIGHT;

        for (idx, line) in run.lines.iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            let width = self.metrics.text_width(line, run.font);
            let x = match run.align {
                Align::Left => run.x,
                Align::Center => run.x - width / 2.0,
                Align::Right => run.x - width,
            };

            ops.push(Op::StartTextSection);
            ops.push(Op::SetTextCursor {
                pos: self.point(x, run.line_y(idx) + baseline_offset),
            });
            ops.push(Op::SetFontSizeBuiltinFont {
                size: Pt(run.font.size_pt),
                font,
            });
            ops.push(Op::WriteTextBuiltinFont {
                items: vec![TextItem::Text(line.clone())],
                font,
            });
            ops.push(Op::EndTextSection);
        }
    }

    /// Stretch the raster over `frame`.
    fn place_image(&self, id: XObjectId, raster: &BarcodeRaster, frame: &Rect) -> Op {
        let native_w_pt = raster.width() as f32 / RASTER_DPI * 72.0;
        let native_h_pt = raster.height() as f32 / RASTER_DPI * 72.0;
        let target_w_pt = Mm(frame.width).into_pt().0;
        let target_h_pt = Mm(frame.height).into_pt().0;
        // The image origin is its bottom-left corner.
        let origin = self.point(frame.x, frame.bottom());

        Op::UseXobject {
            id,
            transform: XObjectTransform {
                translate_x: Some(origin.x),
                translate_y: Some(origin.y),
                scale_x: Some(target_w_pt / native_w_pt),
                scale_y: Some(target_h_pt / native_h_pt),
                dpi: Some(RASTER_DPI),
                rotate: None,
            },
        }
    }
}

/// Rewrite every page's /MediaBox, /CropBox and /TrimBox to the exact label
/// size. printpdf rounds them to whole points, which loses up to 0.18mm.
fn exact_page_boxes(pdf: &[u8], width_pt: f32, height_pt: f32) -> Result<Vec<u8>> {
    let mut document = lopdf::Document::load_mem(pdf).map_err(|err| {
        EtiquetasError::PdfError(format!("failed to reload rendered PDF: {}", err))
    })?;

    let page_box = || {
        Object::Array(vec![
            Object::Real(0.0),
            Object::Real(0.0),
            Object::Real(width_pt),
            Object::Real(height_pt),
        ])
    };
    let page_ids: Vec<lopdf::ObjectId> = document.get_pages().values().copied().collect();
    for page_id in page_ids {
        let Ok(Object::Dictionary(dict)) = document.get_object_mut(page_id) else {
            return Err(EtiquetasError::PdfError(format!(
                "page object {:?} is not a dictionary",
                page_id
            )));
        };
        for key in ["MediaBox", "CropBox", "TrimBox"] {
            dict.set(key, page_box());
        }
    }

    let mut output = Vec::new();
    document.save_to(&mut output).map_err(|err| {
        EtiquetasError::PdfError(format!("failed to serialise label PDF: {}", err))
    })?;
    Ok(output)
}

/// Convert a grayscale raster to the RGB8 layout printpdf embeds.
fn raw_image(raster: &BarcodeRaster) -> Result<RawImage> {
    if raster.width() == 0 || raster.height() == 0 {
        return Err(EtiquetasError::ImageError(format!(
            "barcode raster for {:?} is empty",
            raster.text()
        )));
    }
    let rgb = DynamicImage::ImageLuma8(raster.image().clone()).to_rgb8();
    Ok(RawImage {
        pixels: RawImageData::U8(rgb.into_raw()),
        width: raster.width() as usize,
        height: raster.height() as usize,
        data_format: RawImageFormat::RGB8,
        tag: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use etiquetas_core::LabelRecord;

    use super::*;
    use crate::assemble::DocumentAssembler;
    use crate::pdf::PdfReader;

    fn record(copies: u32) -> LabelRecord {
        LabelRecord {
            customer_name: "ACME ALIMENTOS".into(),
            code: "C1".into(),
            barcode_id: "7891234567895".into(),
            description: "Widget de aço inox, caixa com 12 unidades".into(),
            lot: "L2406A".into(),
            expiry: "01/2030".into(),
            repeat_count: copies,
            line: 2,
        }
    }

    fn document(copies: u32) -> LabelDocument {
        let mut config = LabelConfig::default();
        config.barcode.pixel_height = 30;
        DocumentAssembler::from_config(&config)
            .assemble(&[record(copies)])
            .expect("assemble")
            .document
    }

    #[test]
    fn renders_one_pdf_page_per_label() {
        let bytes = PdfWriter::label_stock().render(&document(3)).expect("render");
        assert!(bytes.starts_with(b"%PDF"));

        let reader = PdfReader::from_bytes(&bytes).expect("reopen");
        assert_eq!(reader.page_count(), 3);
    }

    #[test]
    fn pages_are_label_sized() {
        let bytes = PdfWriter::label_stock().render(&document(3)).expect("render");
        let reader = PdfReader::from_bytes(&bytes).expect("reopen");
        for page in 1..=3 {
            let (width, height) = reader.page_size_mm(page).expect("media box");
            assert!((width - 100.0).abs() < 0.1, "width {width}");
            assert!((height - 70.0).abs() < 0.1, "height {height}");
        }
    }

    #[test]
    fn every_page_box_matches_the_label_stock() {
        let bytes = PdfWriter::label_stock().render(&document(2)).expect("render");
        let pdf = lopdf::Document::load_mem(&bytes).expect("reload");
        let expected = [0.0, 0.0, Mm(100.0).into_pt().0, Mm(70.0).into_pt().0];

        for page_id in pdf.get_pages().values() {
            let dict = pdf.get_dictionary(*page_id).expect("page");
            for key in ["MediaBox", "CropBox", "TrimBox"] {
                let values: Vec<f32> = dict
                    .get(key.as_bytes())
                    .and_then(Object::as_array)
                    .expect("box")
                    .iter()
                    .map(|v| v.as_float().expect("number"))
                    .collect();
                for (got, want) in values.iter().zip(expected) {
                    assert!((got - want).abs() < 0.01, "{key}: {values:?}");
                }
                assert_eq!(values.len(), 4);
            }
        }
    }

    #[test]
    fn empty_document_is_refused() {
        let err = PdfWriter::label_stock()
            .render(&LabelDocument::new("empty"))
            .expect_err("empty");
        assert!(matches!(
            err,
            EtiquetasError::EmptyInput(EmptyInputCause::NoRecords)
        ));
    }

    #[test]
    fn write_to_file_creates_pdf() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("etiquetas.pdf");
        PdfWriter::label_stock()
            .write_to_file(&document(2), &path)
            .expect("write");

        let reader = PdfReader::open(&path).expect("open");
        assert_eq!(reader.page_count(), 2);
    }

    #[test]
    fn points_are_flipped_into_pdf_space() {
        let writer = PdfWriter::label_stock();
        let top_left = writer.point(0.0, 0.0);
        assert_eq!(top_left.x, Pt(0.0));
        assert!((top_left.y.0 - Mm(70.0).into_pt().0).abs() < 1e-3);
        let bottom = writer.point(10.0, 70.0);
        assert!(bottom.y.0.abs() < 1e-3);
    }

    #[test]
    fn centred_text_is_shifted_by_half_its_width() {
        let writer = PdfWriter::label_stock();
        let run = TextRun {
            slot: crate::layout::Slot::Header,
            lines: vec!["ACME".into(), String::new()],
            x: 50.0,
            y: 5.0,
            line_height: 5.0,
            align: Align::Center,
            font: crate::layout::Font::bold(14.0),
        };
        let mut ops = Vec::new();
        writer.push_text(&mut ops, &run);

        // The empty second line draws nothing.
        assert_eq!(ops.len(), 5);
        let width = BuiltinMetrics.text_width("ACME", run.font);
        let expected = writer.point(50.0 - width / 2.0, 5.0 + run.font.size_mm() * HALF_CAP_HEIGHT);
        assert!(matches!(&ops[1], Op::SetTextCursor { pos } if *pos == expected));
    }

    #[test]
    fn distinct_raster_embedded_once() {
        let doc = document(4);
        let writer = PdfWriter::label_stock();
        let mut pdf = PdfDocument::new("test");
        let mut images = HashMap::new();
        for page in doc.pages() {
            writer.page_ops(&mut pdf, &mut images, page).expect("ops");
        }
        // One EAN and one lot raster for the single record.
        assert_eq!(images.len(), 2);
    }
}
