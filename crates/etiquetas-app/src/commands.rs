// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command implementations behind the CLI.

use std::path::{Path, PathBuf};

use etiquetas_core::error::Result;
use etiquetas_core::human_errors::humanize_diagnostic;
use etiquetas_core::{Diagnostic, LabelConfig};
use etiquetas_document::{PdfReader, TEMPLATE_CSV, generate_labels, read_utf8};
use tracing::{info, instrument, warn};

use crate::GenerateArgs;

/// What a `generate` run produced.
#[derive(Debug)]
pub struct GenerateReport {
    pub output: PathBuf,
    pub pages: usize,
    pub records: usize,
    pub dropped_rows: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl GenerateReport {
    /// One line per skipped record, then a summary.
    pub fn print(&self) {
        for diagnostic in &self.diagnostics {
            let human = humanize_diagnostic(diagnostic);
            println!("warning: {}", human.message);
            println!("  {}", human.suggestion);
        }
        println!(
            "{} label(s) from {} record(s) written to {}",
            self.pages,
            self.records,
            self.output.display()
        );
        if self.dropped_rows > 0 {
            println!(
                "{} row(s) ignored for empty values or too many labels (use --strict to see which)",
                self.dropped_rows
            );
        }
    }
}

/// Resolve configuration from the optional file plus CLI overrides.
pub fn resolve_config(args: &GenerateArgs) -> Result<LabelConfig> {
    let mut config = match &args.config {
        Some(path) => LabelConfig::load(path)?,
        None => LabelConfig::default(),
    };
    config.strict_rows |= args.strict;
    config.parallel_encoding |= args.parallel;
    Ok(config)
}

#[instrument(skip_all, fields(input = %args.input.display()))]
pub fn generate(args: &GenerateArgs) -> Result<GenerateReport> {
    let config = resolve_config(args)?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.output_file));

    let text = read_utf8(std::fs::File::open(&args.input)?)?;

    let generated = generate_labels(&text, &config)?;
    std::fs::write(&output, &generated.pdf)?;

    let written = PdfReader::open(&output)?.page_count();
    if written != generated.pages {
        warn!(expected = generated.pages, written, "Page count mismatch in written PDF");
    } else {
        info!(pages = written, output = %output.display(), "Label PDF verified");
    }

    Ok(GenerateReport {
        output,
        pages: generated.pages,
        records: generated.records,
        dropped_rows: generated.dropped_rows,
        diagnostics: generated.diagnostics,
    })
}

pub fn write_template(path: &Path) -> Result<()> {
    std::fs::write(path, TEMPLATE_CSV)?;
    info!("Wrote template to {}", path.display());
    Ok(())
}

pub fn default_config_json() -> Result<String> {
    Ok(serde_json::to_string_pretty(&LabelConfig::default())?)
}

#[cfg(test)]
mod tests {
    use etiquetas_core::{EmptyInputCause, EtiquetasError};

    use super::*;

    fn args(input: PathBuf, output: PathBuf) -> GenerateArgs {
        GenerateArgs {
            input,
            output: Some(output),
            ..GenerateArgs::default()
        }
    }

    #[test]
    fn template_round_trips_through_generate() {
        let dir = tempfile::tempdir().expect("tempdir");
        let csv = dir.path().join("modelo.csv");
        let pdf = dir.path().join("out.pdf");
        write_template(&csv).expect("template");

        let report = generate(&args(csv, pdf.clone())).expect("generate");
        assert_eq!(report.records, 2);
        assert_eq!(report.pages, 3);
        assert!(report.diagnostics.is_empty());
        assert_eq!(PdfReader::open(&pdf).expect("open").page_count(), 3);
    }

    #[test]
    fn header_only_input_fails_without_writing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let csv = dir.path().join("vazio.csv");
        let pdf = dir.path().join("out.pdf");
        std::fs::write(&csv, "NOME_CLIENTE;CODIGO;EAN;DESCRICAO;LOTE;VENCIMENTO\n").expect("write");

        let err = generate(&args(csv, pdf.clone())).expect_err("empty");
        assert!(matches!(
            err,
            EtiquetasError::EmptyInput(EmptyInputCause::NoRecords)
        ));
        assert!(!pdf.exists());
    }

    #[test]
    fn non_utf8_input_is_csv_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let csv = dir.path().join("latin1.csv");
        std::fs::write(&csv, b"NOME_CLIENTE;CODIGO\nA\xe7\xe3o;C1\n").expect("write");

        let err = generate(&args(csv, dir.path().join("out.pdf"))).expect_err("latin1");
        assert!(matches!(err, EtiquetasError::Csv(ref detail) if detail.contains("UTF-8")));
    }

    #[test]
    fn flags_override_config_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config_path = dir.path().join("etiquetas.json");
        let mut file_config = LabelConfig::default();
        file_config.output_file = "lote.pdf".into();
        file_config.save(&config_path).expect("save");

        let config = resolve_config(&GenerateArgs {
            config: Some(config_path),
            strict: true,
            ..GenerateArgs::default()
        })
        .expect("resolve");
        assert!(config.strict_rows);
        assert!(!config.parallel_encoding);
        assert_eq!(config.output_file, "lote.pdf");
    }

    #[test]
    fn default_config_is_valid_json() {
        let json = default_config_json().expect("json");
        let parsed: LabelConfig = serde_json::from_str(&json).expect("parse");
        assert_eq!(parsed, LabelConfig::default());
    }
}
