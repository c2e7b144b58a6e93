// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document assembly — encode each record's barcodes once, then lay out one
// page per physical label, in input order.

use std::sync::Arc;

use etiquetas_core::error::Result;
use etiquetas_core::{
    BarcodeField, Diagnostic, EmptyInputCause, EtiquetasError, LabelConfig, LabelRecord,
};
use rayon::prelude::*;
use tracing::{debug, info, instrument, warn};

use crate::barcode::{BarcodeEncoder, BarcodeRaster, Code128Encoder};
use crate::layout::{LabelLayoutEngine, LabelPage};
use crate::pdf::metrics::BuiltinMetrics;

/// The ordered pages of one print run.
///
/// Pages can only be appended; the writer consumes the finished document.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelDocument {
    title: String,
    pages: Vec<LabelPage>,
}

impl LabelDocument {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            pages: Vec::new(),
        }
    }

    pub fn push(&mut self, page: LabelPage) {
        self.pages.push(page);
    }

    pub fn pages(&self) -> &[LabelPage] {
        &self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn title(&self) -> &str {
        &self.title
    }
}

/// A finished document plus the records that were skipped on the way.
#[derive(Debug, Clone)]
pub struct Assembly {
    pub document: LabelDocument,
    pub diagnostics: Vec<Diagnostic>,
}

/// Both rasters of one record, shared by all of its pages.
type EncodedRecord = (Arc<BarcodeRaster>, Arc<BarcodeRaster>);

/// Turns validated records into a [`LabelDocument`].
pub struct DocumentAssembler {
    encoder: Arc<dyn BarcodeEncoder>,
    engine: LabelLayoutEngine,
    pixel_height: u32,
    parallel: bool,
    title: String,
}

impl DocumentAssembler {
    pub fn new(encoder: Arc<dyn BarcodeEncoder>, engine: LabelLayoutEngine, pixel_height: u32) -> Self {
        Self {
            encoder,
            engine,
            pixel_height,
            parallel: false,
            title: LabelConfig::default().title,
        }
    }

    /// Code 128 encoding and built-in font metrics, as configured.
    pub fn from_config(config: &LabelConfig) -> Self {
        let encoder = Arc::new(Code128Encoder::new(config.barcode.clone()));
        let engine = LabelLayoutEngine::from_config(config, Arc::new(BuiltinMetrics));
        Self::new(encoder, engine, config.barcode.pixel_height)
            .with_parallel(config.parallel_encoding)
            .with_title(config.title.clone())
    }

    /// Encode all records on the rayon pool before assembling pages.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Build the document for `records`.
    ///
    /// A record whose EAN or lot cannot be encoded is skipped and reported
    /// as a [`Diagnostic`]. Fails with [`EtiquetasError::EmptyInput`] when
    /// no page at all would be produced.
    #[instrument(skip_all, fields(records = records.len(), parallel = self.parallel))]
    pub fn assemble(&self, records: &[LabelRecord]) -> Result<Assembly> {
        if records.is_empty() {
            return Err(EtiquetasError::EmptyInput(EmptyInputCause::NoRecords));
        }

        // Collecting an indexed parallel iterator keeps input order.
        let encoded: Vec<std::result::Result<EncodedRecord, Diagnostic>> = if self.parallel {
            records.par_iter().map(|record| self.encode_record(record)).collect()
        } else {
            records.iter().map(|record| self.encode_record(record)).collect()
        };

        let mut document = LabelDocument::new(self.title.clone());
        let mut diagnostics = Vec::new();

        for (record, result) in records.iter().zip(encoded) {
            match result {
                Ok((ean, lot)) => {
                    for _ in 0..record.repeat_count.max(1) {
                        document.push(self.engine.layout(record, &ean, &lot));
                    }
                    debug!(
                        line = record.line,
                        code = %record.code,
                        copies = record.repeat_count,
                        "Record laid out"
                    );
                }
                Err(diagnostic) => {
                    warn!(%diagnostic, "Skipping record");
                    diagnostics.push(diagnostic);
                }
            }
        }

        if document.is_empty() {
            return Err(EtiquetasError::EmptyInput(
                EmptyInputCause::AllRecordsFailed {
                    failed: diagnostics.len(),
                },
            ));
        }

        info!(
            pages = document.len(),
            skipped = diagnostics.len(),
            "Document assembled"
        );
        Ok(Assembly {
            document,
            diagnostics,
        })
    }

    fn encode_record(&self, record: &LabelRecord) -> std::result::Result<EncodedRecord, Diagnostic> {
        let encode = |field: BarcodeField| {
            let value = field.value_of(record);
            self.encoder
                .encode(value, self.pixel_height)
                .map(Arc::new)
                .map_err(|error| Diagnostic {
                    line: record.line,
                    code: record.code.clone(),
                    field,
                    value: value.to_string(),
                    error,
                })
        };
        Ok((encode(BarcodeField::Ean)?, encode(BarcodeField::Lot)?))
    }
}

#[cfg(test)]
mod tests {
    use etiquetas_core::EncodingError;

    use super::*;
    use crate::layout::Slot;

    fn record(name: &str, ean: &str, lot: &str, copies: u32, line: u64) -> LabelRecord {
        LabelRecord {
            customer_name: name.into(),
            code: format!("C{line}"),
            barcode_id: ean.into(),
            description: "Widget".into(),
            lot: lot.into(),
            expiry: "01/2030".into(),
            repeat_count: copies,
            line,
        }
    }

    fn config() -> LabelConfig {
        let mut config = LabelConfig::default();
        config.barcode.pixel_height = 30;
        config
    }

    fn assembler() -> DocumentAssembler {
        DocumentAssembler::from_config(&config())
    }

    fn headers(document: &LabelDocument) -> Vec<String> {
        document
            .pages()
            .iter()
            .map(|page| page.text(Slot::Header).expect("header").lines.join(" "))
            .collect()
    }

    /// Rejects any value starting with "BAD".
    struct PickyEncoder(Code128Encoder);

    impl BarcodeEncoder for PickyEncoder {
        fn encode(&self, text: &str, pixel_height: u32) -> std::result::Result<BarcodeRaster, EncodingError> {
            if text.starts_with("BAD") {
                return Err(EncodingError::Symbology("rejected".into()));
            }
            self.0.encode(text, pixel_height)
        }
    }

    fn picky_assembler() -> DocumentAssembler {
        let config = config();
        let engine = LabelLayoutEngine::from_config(&config, Arc::new(BuiltinMetrics));
        DocumentAssembler::new(
            Arc::new(PickyEncoder(Code128Encoder::new(config.barcode.clone()))),
            engine,
            config.barcode.pixel_height,
        )
    }

    #[test]
    fn repeat_count_gives_identical_pages() {
        let assembly = assembler()
            .assemble(&[record("ACME", "789", "L1", 3, 2)])
            .expect("assemble");

        let pages = assembly.document.pages();
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0], pages[1]);
        assert_eq!(pages[1], pages[2]);
        assert_eq!(headers(&assembly.document), vec!["ACME"; 3]);
        let (ean, _) = pages[0].image(Slot::EanBarcode).expect("ean");
        assert_eq!(ean.text(), "789");
        assert!(assembly.diagnostics.is_empty());
    }

    #[test]
    fn rasters_are_shared_between_copies() {
        let assembly = assembler()
            .assemble(&[record("ACME", "789", "L1", 2, 2)])
            .expect("assemble");
        let pages = assembly.document.pages();
        let (first, _) = pages[0].image(Slot::LotBarcode).expect("lot");
        let (second, _) = pages[1].image(Slot::LotBarcode).expect("lot");
        assert!(Arc::ptr_eq(first, second));
    }

    #[test]
    fn pages_follow_input_order() {
        let records = [
            record("FIRST", "111", "A", 2, 2),
            record("SECOND", "222", "B", 1, 3),
            record("THIRD", "333", "C", 3, 4),
        ];
        let assembly = assembler().assemble(&records).expect("assemble");
        assert_eq!(assembly.document.len(), 6);
        assert_eq!(
            headers(&assembly.document),
            vec!["FIRST", "FIRST", "SECOND", "THIRD", "THIRD", "THIRD"]
        );
    }

    #[test]
    fn unencodable_record_is_skipped_with_diagnostic() {
        let records = [
            record("ACME", "789", "L1", 2, 2),
            record("BROKEN", "789", "LOTÉ", 5, 3),
            record("SILVA", "456", "L2", 1, 4),
        ];
        let assembly = assembler().assemble(&records).expect("assemble");

        assert_eq!(headers(&assembly.document), vec!["ACME", "ACME", "SILVA"]);
        assert_eq!(assembly.diagnostics.len(), 1);
        let diagnostic = &assembly.diagnostics[0];
        assert_eq!(diagnostic.line, 3);
        assert_eq!(diagnostic.field, BarcodeField::Lot);
        assert_eq!(diagnostic.value, "LOTÉ");
        assert_eq!(
            diagnostic.error,
            EncodingError::UnsupportedCharacter { ch: 'É', position: 3 }
        );
    }

    #[test]
    fn ean_failure_is_reported_before_lot() {
        let assembly = picky_assembler()
            .assemble(&[
                record("X", "BAD-EAN", "BAD-LOT", 1, 2),
                record("Y", "123", "L1", 1, 3),
            ])
            .expect("assemble");
        assert_eq!(assembly.document.len(), 1);
        assert_eq!(assembly.diagnostics[0].field, BarcodeField::Ean);
        assert_eq!(assembly.diagnostics[0].value, "BAD-EAN");
    }

    #[test]
    fn no_records_is_empty_input() {
        let err = assembler().assemble(&[]).expect_err("empty");
        assert!(matches!(
            err,
            EtiquetasError::EmptyInput(EmptyInputCause::NoRecords)
        ));
    }

    #[test]
    fn all_records_failing_is_empty_input() {
        let err = picky_assembler()
            .assemble(&[
                record("X", "BAD1", "L1", 2, 2),
                record("Y", "123", "BAD2", 1, 3),
            ])
            .expect_err("all failed");
        assert!(matches!(
            err,
            EtiquetasError::EmptyInput(EmptyInputCause::AllRecordsFailed { failed: 2 })
        ));
    }

    #[test]
    fn parallel_matches_sequential() {
        let records: Vec<LabelRecord> = (0..12)
            .map(|i| {
                let lot = if i % 5 == 3 { format!("LOTÉ{i}") } else { format!("L{i}") };
                record(&format!("CLIENT {i}"), &format!("789{i:04}"), &lot, (i % 3 + 1) as u32, i + 2)
            })
            .collect();

        let sequential = assembler().assemble(&records).expect("sequential");
        let parallel = assembler()
            .with_parallel(true)
            .assemble(&records)
            .expect("parallel");

        assert_eq!(sequential.document, parallel.document);
        assert_eq!(sequential.diagnostics, parallel.diagnostics);
    }

    #[test]
    fn title_comes_from_config() {
        let mut config = config();
        config.title = "Lote semanal".into();
        let assembly = DocumentAssembler::from_config(&config)
            .assemble(&[record("ACME", "789", "L1", 1, 2)])
            .expect("assemble");
        assert_eq!(assembly.document.title(), "Lote semanal");
    }
}
