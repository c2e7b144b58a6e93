// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// End-to-end label generation: CSV text in, PDF bytes out.

use etiquetas_core::error::Result;
use etiquetas_core::{Diagnostic, LabelConfig};
use tracing::{info, instrument};

use crate::assemble::DocumentAssembler;
use crate::ingest::RecordIngestor;
use crate::pdf::PdfWriter;

/// Result of one generation run.
#[derive(Debug, Clone)]
pub struct GeneratedLabels {
    /// The finished PDF.
    pub pdf: Vec<u8>,
    /// Number of pages (physical labels) in `pdf`.
    pub pages: usize,
    /// Records that passed validation.
    pub records: usize,
    /// Rows dropped for missing required fields.
    pub dropped_rows: usize,
    /// Records skipped because a barcode could not be encoded.
    pub diagnostics: Vec<Diagnostic>,
}

/// Ingest `csv_text`, assemble the label document and render it.
#[instrument(skip_all, fields(input_len = csv_text.len()))]
pub fn generate_labels(csv_text: &str, config: &LabelConfig) -> Result<GeneratedLabels> {
    let ingested = RecordIngestor::from_config(config).ingest_str(csv_text)?;
    let assembly = DocumentAssembler::from_config(config).assemble(&ingested.records)?;
    let pdf = PdfWriter::from_config(config).render(&assembly.document)?;

    info!(
        records = ingested.records.len(),
        dropped = ingested.dropped_rows,
        skipped = assembly.diagnostics.len(),
        pages = assembly.document.len(),
        "Labels generated"
    );

    Ok(GeneratedLabels {
        pdf,
        pages: assembly.document.len(),
        records: ingested.records.len(),
        dropped_rows: ingested.dropped_rows,
        diagnostics: assembly.diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use etiquetas_core::{BarcodeField, EmptyInputCause, EtiquetasError};

    use super::*;
    use crate::ingest::TEMPLATE_CSV;
    use crate::pdf::PdfReader;

    const HEADER: &str = "NOME_CLIENTE;CODIGO;EAN;DESCRICAO;LOTE;VENCIMENTO;QTD_ETIQUETAS";

    fn config() -> LabelConfig {
        let mut config = LabelConfig::default();
        config.barcode.pixel_height = 30;
        config
    }

    #[test]
    fn acme_row_prints_three_labels() {
        let csv = format!("{HEADER}\nACME;C1;789;Widget;L1;01/2030;3\n");
        let generated = generate_labels(&csv, &config()).expect("generate");

        assert_eq!(generated.records, 1);
        assert_eq!(generated.pages, 3);
        assert!(generated.diagnostics.is_empty());
        let reader = PdfReader::from_bytes(&generated.pdf).expect("reopen");
        assert_eq!(reader.page_count(), 3);
    }

    #[test]
    fn template_generates_its_labels() {
        let generated = generate_labels(TEMPLATE_CSV, &config()).expect("generate");
        assert_eq!(generated.records, 2);
        assert_eq!(generated.pages, 3);
    }

    #[test]
    fn bad_lot_is_reported_and_the_rest_printed() {
        let csv = format!(
            "{HEADER}\nACME;C1;789;Widget;LOTÉ;01/2030;2\nSILVA;C2;456;Gadget;L9;02/2031;1\n"
        );
        let generated = generate_labels(&csv, &config()).expect("generate");

        assert_eq!(generated.pages, 1);
        assert_eq!(generated.diagnostics.len(), 1);
        assert_eq!(generated.diagnostics[0].line, 2);
        assert_eq!(generated.diagnostics[0].field, BarcodeField::Lot);
    }

    #[test]
    fn rows_all_missing_ean_is_empty_input() {
        let csv = format!("{HEADER}\nACME;C1;;Widget;L1;01/2030;1\nSILVA;C2; ;Gadget;L2;02/2031;4\n");
        let err = generate_labels(&csv, &config()).expect_err("empty");
        assert!(matches!(
            err,
            EtiquetasError::EmptyInput(EmptyInputCause::NoRecords)
        ));
    }

    #[test]
    fn dropped_rows_are_counted() {
        let csv = format!("{HEADER}\nACME;C1;789;Widget;L1;01/2030;1\n;C2;456;Gadget;L2;02/2031;1\n");
        let generated = generate_labels(&csv, &config()).expect("generate");
        assert_eq!(generated.records, 1);
        assert_eq!(generated.dropped_rows, 1);
    }

    #[test]
    fn schema_error_stops_before_rendering() {
        let csv = "NOME_CLIENTE;CODIGO;EAN;DESCRICAO;LOTE\nACME;C1;789;Widget;L1\n";
        let err = generate_labels(csv, &config()).expect_err("schema");
        assert!(matches!(
            err,
            EtiquetasError::Schema { ref missing } if missing == &vec!["VENCIMENTO".to_string()]
        ));
    }

    #[test]
    fn strict_config_rejects_incomplete_row() {
        let mut config = config();
        config.strict_rows = true;
        let csv = format!("{HEADER}\nACME;C1;789;Widget;L1;01/2030;1\nSILVA;C2;;Gadget;L2;02/2031;1\n");
        let err = generate_labels(&csv, &config).expect_err("strict");
        assert!(matches!(err, EtiquetasError::RowValidation { line: 3, .. }));
    }

    #[test]
    fn parallel_encoding_gives_same_page_count() {
        let mut config = config();
        config.parallel_encoding = true;
        let generated = generate_labels(TEMPLATE_CSV, &config).expect("generate");
        assert_eq!(generated.pages, 3);
    }
}
