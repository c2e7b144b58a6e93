// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// etiquetas-document — Label generation for Etiquetas.
//
// Ingests `;`-delimited product spreadsheets, encodes Code 128 barcodes,
// lays out 100mm × 70mm label pages and renders them to PDF.

pub mod assemble;
pub mod barcode;
pub mod ingest;
pub mod layout;
pub mod pdf;
pub mod pipeline;

// Re-export the primary types so callers can use `etiquetas_document::PdfWriter` etc.
pub use assemble::{Assembly, DocumentAssembler, LabelDocument};
pub use barcode::{BarcodeEncoder, BarcodeRaster, Code128Encoder};
pub use ingest::{Ingested, RecordIngestor, REQUIRED_COLUMNS, TEMPLATE_CSV, read_utf8};
pub use layout::{LabelLayoutEngine, LabelPage, TextMeasure};
pub use pdf::{BuiltinMetrics, PdfReader, PdfWriter};
pub use pipeline::{GeneratedLabels, generate_labels};
