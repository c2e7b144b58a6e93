// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the label generator.

use serde::{Deserialize, Serialize};

use crate::error::EncodingError;

/// One validated input row: the identity of a product lot to be labelled.
///
/// All text fields are non-empty and `repeat_count` is at least 1; the
/// ingestor is the only producer and guarantees both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRecord {
    pub customer_name: String,
    pub code: String,
    /// EAN/DUN identifier printed as the first barcode.
    pub barcode_id: String,
    pub description: String,
    pub lot: String,
    pub expiry: String,
    /// Number of identical physical labels to print.
    pub repeat_count: u32,
    /// 1-based line of the source row (header is line 1).
    pub line: u64,
}

/// The two record fields that are rendered as barcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BarcodeField {
    Ean,
    Lot,
}

impl BarcodeField {
    /// Column name of the field in the input table.
    pub fn column(&self) -> &'static str {
        match self {
            Self::Ean => "EAN",
            Self::Lot => "LOTE",
        }
    }

    /// The value of this field on a record.
    pub fn value_of<'a>(&self, record: &'a LabelRecord) -> &'a str {
        match self {
            Self::Ean => &record.barcode_id,
            Self::Lot => &record.lot,
        }
    }
}

impl std::fmt::Display for BarcodeField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column())
    }
}

/// A recoverable, per-record failure surfaced alongside the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Source line of the skipped record.
    pub line: u64,
    /// Product code of the skipped record, for operator reference.
    pub code: String,
    pub field: BarcodeField,
    /// The value that failed to encode.
    pub value: String,
    pub error: EncodingError,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "line {} (code {}): {} value {:?} skipped: {}",
            self.line, self.code, self.field, self.value, self.error
        )
    }
}

/// Page orientation of the generated document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// Physical page size of one label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    /// Length of the short side in millimetres.
    pub short_mm: f32,
    /// Length of the long side in millimetres.
    pub long_mm: f32,
    pub orientation: Orientation,
}

impl PageSize {
    /// The 100mm × 70mm landscape label stock.
    pub const LABEL_100X70: PageSize = PageSize {
        short_mm: 70.0,
        long_mm: 100.0,
        orientation: Orientation::Landscape,
    };

    /// Dimensions in millimetres (width, height) after applying orientation.
    pub fn dimensions_mm(&self) -> (f32, f32) {
        match self.orientation {
            Orientation::Landscape => (self.long_mm, self.short_mm),
            Orientation::Portrait => (self.short_mm, self.long_mm),
        }
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::LABEL_100X70
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_stock_is_landscape_100_by_70() {
        assert_eq!(PageSize::LABEL_100X70.dimensions_mm(), (100.0, 70.0));
    }

    #[test]
    fn portrait_swaps_dimensions() {
        let page = PageSize {
            orientation: Orientation::Portrait,
            ..PageSize::LABEL_100X70
        };
        assert_eq!(page.dimensions_mm(), (70.0, 100.0));
    }

    #[test]
    fn diagnostic_names_field_and_value() {
        let diag = Diagnostic {
            line: 4,
            code: "C1".into(),
            field: BarcodeField::Lot,
            value: "LOTÉ".into(),
            error: EncodingError::UnsupportedCharacter { ch: 'É', position: 3 },
        };
        let text = diag.to_string();
        assert!(text.contains("line 4"));
        assert!(text.contains("LOTE value \"LOTÉ\""));
    }
}
