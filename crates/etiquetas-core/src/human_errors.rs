// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable messages for the people preparing label spreadsheets.
//
// Every technical error is mapped to plain language with a clear suggestion,
// so a failed run never ends in silence.

use crate::error::{EmptyInputCause, EncodingError, EtiquetasError, RowProblem};
use crate::types::Diagnostic;

/// Severity of an error from the operator's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Part of the input was skipped; the rest was printed.
    Warning,
    /// The spreadsheet must be fixed before anything can be printed.
    ActionRequired,
    /// Not fixable by editing the input (disk, configuration, internal).
    Permanent,
}

/// A human-readable error with a plain message and an actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Short summary (one line).
    pub message: String,
    /// What the operator should try.
    pub suggestion: String,
    pub severity: Severity,
}

/// Convert an `EtiquetasError` into a `HumanError`.
pub fn humanize_error(err: &EtiquetasError) -> HumanError {
    match err {
        EtiquetasError::Schema { missing } => HumanError {
            message: format!("The spreadsheet is missing column(s): {}.", missing.join(", ")),
            suggestion: "Add the columns to the first row exactly as written (upper case, no accents), or start from the template.".into(),
            severity: Severity::ActionRequired,
        },

        EtiquetasError::RowValidation {
            line,
            problem: RowProblem::Missing(missing),
        } => HumanError {
            message: format!("Line {line} has empty required value(s): {}.", missing.join(", ")),
            suggestion: "Fill in the empty cells or remove the line, then try again.".into(),
            severity: Severity::ActionRequired,
        },

        EtiquetasError::RowValidation {
            line,
            problem: RowProblem::RepeatOverLimit { count, max },
        } => HumanError {
            message: format!("Line {line} asks for {count} labels."),
            suggestion: format!("Check QTD_ETIQUETAS for a typo; at most {max} labels per line are allowed."),
            severity: Severity::ActionRequired,
        },

        EtiquetasError::Csv(detail) => HumanError {
            message: "The file could not be read as a spreadsheet.".into(),
            suggestion: format!("Save the file as CSV (UTF-8) with ';' as the separator. ({detail})"),
            severity: Severity::ActionRequired,
        },

        EtiquetasError::EmptyInput(EmptyInputCause::NoRecords) => HumanError {
            message: "There are no complete lines to print.".into(),
            suggestion: "Every line needs NOME_CLIENTE, CODIGO, EAN, DESCRICAO, LOTE and VENCIMENTO filled in.".into(),
            severity: Severity::ActionRequired,
        },

        EtiquetasError::EmptyInput(EmptyInputCause::AllRecordsFailed { failed }) => HumanError {
            message: format!("None of the {failed} line(s) could be turned into barcodes."),
            suggestion: "Check the EAN and LOTE columns: only plain letters, digits and punctuation can be printed as barcodes.".into(),
            severity: Severity::ActionRequired,
        },

        EtiquetasError::PdfError(_) => HumanError {
            message: "The label document could not be created.".into(),
            suggestion: "Try again. If this keeps happening, please report it.".into(),
            severity: Severity::Permanent,
        },

        EtiquetasError::ImageError(_) => HumanError {
            message: "A barcode image could not be produced.".into(),
            suggestion: "Try again. If this keeps happening, please report it.".into(),
            severity: Severity::Permanent,
        },

        EtiquetasError::Config(detail) => HumanError {
            message: "The configuration file is not valid.".into(),
            suggestion: format!("Fix the configuration or remove it to use the defaults. ({detail})"),
            severity: Severity::Permanent,
        },

        EtiquetasError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "The file couldn't be found.".into(),
                    suggestion: "Check the file name and folder, then try again.".into(),
                    severity: Severity::ActionRequired,
                }
            } else if io_err.kind() == std::io::ErrorKind::PermissionDenied {
                HumanError {
                    message: "Permission denied while reading or writing a file.".into(),
                    suggestion: "Choose a folder you can write to, or close the PDF if it is open in another program.".into(),
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "There was a problem reading or writing a file.".into(),
                    suggestion: "Try again. If this keeps happening, the disk may be full.".into(),
                    severity: Severity::Permanent,
                }
            }
        }

        EtiquetasError::Serialization(_) => HumanError {
            message: "The configuration file is not valid JSON.".into(),
            suggestion: "Fix the syntax, or print a fresh one with `etiquetas config`.".into(),
            severity: Severity::Permanent,
        },
    }
}

/// Describe a skipped record in plain language.
pub fn humanize_diagnostic(diag: &Diagnostic) -> HumanError {
    let cause = humanize_encoding_error(&diag.error);
    HumanError {
        message: format!(
            "Line {} (code {}) was not printed, {} \"{}\": {}",
            diag.line,
            diag.code,
            diag.field,
            diag.value,
            cause.message.trim_end_matches('.').to_lowercase()
        ),
        suggestion: cause.suggestion,
        severity: Severity::Warning,
    }
}

fn humanize_encoding_error(err: &EncodingError) -> HumanError {
    match err {
        EncodingError::Empty => HumanError {
            message: "The barcode value is empty.".into(),
            suggestion: "Fill in the value and try again.".into(),
            severity: Severity::Warning,
        },
        EncodingError::UnsupportedCharacter { ch, .. } => HumanError {
            message: format!("The character '{ch}' cannot be printed in a barcode."),
            suggestion: "Remove accents and special symbols from the value.".into(),
            severity: Severity::Warning,
        },
        EncodingError::Symbology(_) | EncodingError::Raster(_) => HumanError {
            message: "The barcode could not be generated.".into(),
            suggestion: "Check the value for unusual characters and try again.".into(),
            severity: Severity::Warning,
        },
    }
}
