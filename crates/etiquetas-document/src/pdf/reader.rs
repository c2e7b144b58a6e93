// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader — re-open generated label files with `lopdf` to verify them.

use std::path::Path;

use etiquetas_core::error::{EtiquetasError, Result};
use lopdf::{Document, Object};
use tracing::{debug, info, instrument};

use crate::layout::primitives::MM_PER_PT;

/// Read-only view of an existing PDF.
pub struct PdfReader {
    /// The underlying lopdf document.
    document: Document,
}

impl PdfReader {
    /// Open a PDF from the filesystem.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path_ref = path.as_ref();
        info!("Opening PDF: {}", path_ref.display());

        let document = Document::load(path_ref).map_err(|err| {
            EtiquetasError::PdfError(format!("failed to open {}: {}", path_ref.display(), err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded");

        Ok(Self { document })
    }

    /// Create a reader from raw PDF bytes already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let document = Document::load_mem(data).map_err(|err| {
            EtiquetasError::PdfError(format!("failed to load PDF from memory: {}", err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded from bytes");

        Ok(Self { document })
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Width and height of page `page_number` (1-indexed) in millimetres,
    /// from its /MediaBox (inherited from the page tree when absent).
    pub fn page_size_mm(&self, page_number: u32) -> Result<(f32, f32)> {
        let pages = self.document.get_pages();
        let mut id = *pages.get(&page_number).ok_or_else(|| {
            EtiquetasError::PdfError(format!(
                "page {} not found (document has {} pages)",
                page_number,
                pages.len()
            ))
        })?;

        loop {
            let dict = self.document.get_dictionary(id).map_err(|err| {
                EtiquetasError::PdfError(format!("cannot read page object {:?}: {}", id, err))
            })?;

            if let Ok(media_box) = dict.get(b"MediaBox") {
                return self.media_box_mm(media_box);
            }

            id = dict
                .get(b"Parent")
                .and_then(Object::as_reference)
                .map_err(|_| {
                    EtiquetasError::PdfError(format!("page {} has no /MediaBox", page_number))
                })?;
        }
    }

    fn media_box_mm(&self, media_box: &Object) -> Result<(f32, f32)> {
        let media_box = match media_box {
            Object::Reference(id) => self.document.get_object(*id).map_err(|err| {
                EtiquetasError::PdfError(format!("cannot resolve /MediaBox: {}", err))
            })?,
            other => other,
        };

        let values = media_box
            .as_array()
            .and_then(|items| items.iter().map(Object::as_float).collect::<lopdf::Result<Vec<f32>>>())
            .map_err(|err| EtiquetasError::PdfError(format!("malformed /MediaBox: {}", err)))?;

        match values.as_slice() {
            [x0, y0, x1, y1] => Ok(((x1 - x0).abs() * MM_PER_PT, (y1 - y0).abs() * MM_PER_PT)),
            _ => Err(EtiquetasError::PdfError(format!(
                "/MediaBox has {} entries, expected 4",
                values.len()
            ))),
        }
    }
}
