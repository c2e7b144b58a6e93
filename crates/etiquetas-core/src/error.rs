// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Etiquetas.

use thiserror::Error;

/// Why a barcode value could not be turned into a raster.
///
/// Encoding failures are recoverable at record granularity: the assembler
/// turns them into a [`crate::Diagnostic`] and moves on to the next record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    #[error("barcode text is empty")]
    Empty,

    #[error("character {ch:?} at position {position} is not supported by Code 128 set B")]
    UnsupportedCharacter { ch: char, position: usize },

    #[error("symbol encoder rejected the value: {0}")]
    Symbology(String),

    #[error("barcode rasterisation failed: {0}")]
    Raster(String),
}

/// Why a run produced no pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyInputCause {
    /// No valid records reached the assembler.
    NoRecords,
    /// Every record failed barcode encoding.
    AllRecordsFailed { failed: usize },
}

impl std::fmt::Display for EmptyInputCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoRecords => write!(f, "no valid label records"),
            Self::AllRecordsFailed { failed } => {
                write!(f, "all {failed} record(s) failed barcode encoding")
            }
        }
    }
}

/// What is wrong with a rejected input row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowProblem {
    /// Required columns left empty, in `REQUIRED_COLUMNS` order.
    Missing(Vec<String>),
    /// `QTD_ETIQUETAS` above the configured maximum.
    RepeatOverLimit { count: u64, max: u32 },
}

impl std::fmt::Display for RowProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing(missing) => {
                write!(f, "missing required value(s): {}", missing.join(", "))
            }
            Self::RepeatOverLimit { count, max } => {
                write!(f, "asks for {count} labels, more than the limit of {max}")
            }
        }
    }
}

/// Top-level error type for all Etiquetas operations.
#[derive(Debug, Error)]
pub enum EtiquetasError {
    // -- Input errors --
    #[error("missing required column(s): {}", missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("line {line} {problem}")]
    RowValidation { line: u64, problem: RowProblem },

    #[error("CSV parsing failed: {0}")]
    Csv(String),

    // -- Label generation errors --
    #[error("nothing to print: {0}")]
    EmptyInput(EmptyInputCause),

    // -- Document errors --
    #[error("PDF operation failed: {0}")]
    PdfError(String),

    #[error("image processing failed: {0}")]
    ImageError(String),

    // -- Configuration / persistence --
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, EtiquetasError>;
