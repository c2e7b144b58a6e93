// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Etiquetas — Core types, configuration and error definitions shared across
// all crates.

pub mod config;
pub mod error;
pub mod human_errors;
pub mod types;

pub use config::{BarcodeSettings, BoxRow, LabelConfig, LayoutConstants};
pub use error::{EmptyInputCause, EncodingError, EtiquetasError, RowProblem};
pub use types::*;
