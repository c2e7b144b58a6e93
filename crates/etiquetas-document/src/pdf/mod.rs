// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — font metrics, label rendering and read-back verification.

pub mod metrics;
pub mod reader;
pub mod writer;

pub use metrics::BuiltinMetrics;
pub use reader::PdfReader;
pub use writer::PdfWriter;
