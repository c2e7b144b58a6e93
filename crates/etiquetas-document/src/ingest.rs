// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Record ingestion — turn a `;`-delimited spreadsheet export into validated
// `LabelRecord`s using the `csv` crate.

use std::io::Read;
use std::path::Path;

use etiquetas_core::error::{EtiquetasError, Result};
use etiquetas_core::{LabelConfig, LabelRecord, RowProblem};
use tracing::{debug, info, instrument, warn};

/// Columns that must be present in the header, in reporting order.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "NOME_CLIENTE",
    "CODIGO",
    "EAN",
    "DESCRICAO",
    "LOTE",
    "VENCIMENTO",
];

/// Optional column holding the number of labels to print for a row.
pub const REPEAT_COLUMN: &str = "QTD_ETIQUETAS";

/// Reference spreadsheet offered to operators as a starting point.
pub const TEMPLATE_CSV: &str = "\
NOME_CLIENTE;CODIGO;EAN;DESCRICAO;LOTE;VENCIMENTO;QTD_ETIQUETAS
ACME ALIMENTOS;10045;7891234567895;Biscoito integral 200g caixa com 24 unidades;L2406A;06/2026;2
COMERCIAL SILVA;20310;17891234567892;Suco de uva 1L fardo com 12 unidades;L2407B;07/2026;1
";

const BOM: char = '\u{feff}';

/// Result of a successful ingestion.
#[derive(Debug, Clone, Default)]
pub struct Ingested {
    /// Complete rows, in input order.
    pub records: Vec<LabelRecord>,
    /// Number of rows dropped because a required value was empty.
    pub dropped_rows: usize,
}

/// Parses label spreadsheets and validates their rows.
///
/// Incomplete rows, and rows asking for more than `max_repeat` labels, are
/// dropped unless strict mode is on, in which case the first one aborts
/// ingestion.
#[derive(Debug, Clone, Copy)]
pub struct RecordIngestor {
    strict: bool,
    max_repeat: u32,
}

impl Default for RecordIngestor {
    fn default() -> Self {
        Self {
            strict: false,
            max_repeat: LabelConfig::default().max_repeat,
        }
    }
}

/// Column positions resolved from the header row.
struct ColumnMap {
    required: [usize; REQUIRED_COLUMNS.len()],
    repeat: Option<usize>,
}

impl RecordIngestor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strict(strict: bool) -> Self {
        Self {
            strict,
            ..Self::default()
        }
    }

    pub fn with_max_repeat(mut self, max_repeat: u32) -> Self {
        self.max_repeat = max_repeat;
        self
    }

    pub fn from_config(config: &LabelConfig) -> Self {
        Self::strict(config.strict_rows).with_max_repeat(config.max_repeat)
    }

    /// Ingest a spreadsheet file from disk.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn ingest_path(&self, path: impl AsRef<Path>) -> Result<Ingested> {
        let file = std::fs::File::open(path.as_ref())?;
        self.ingest_reader(file)
    }

    /// Ingest a spreadsheet from any byte source.
    pub fn ingest_reader<R: Read>(&self, input: R) -> Result<Ingested> {
        self.ingest_str(&read_utf8(input)?)
    }

    /// Ingest spreadsheet text. A leading byte-order mark is ignored.
    #[instrument(skip_all, fields(input_len = text.len(), strict = self.strict))]
    pub fn ingest_str(&self, text: &str) -> Result<Ingested> {
        let text = text.strip_prefix(BOM).unwrap_or(text);

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b';')
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let headers = reader
            .headers()
            .map_err(|err| EtiquetasError::Csv(err.to_string()))?
            .clone();
        let columns = resolve_columns(&headers)?;

        let mut ingested = Ingested::default();
        for row in reader.records() {
            let row = row.map_err(|err| EtiquetasError::Csv(err.to_string()))?;
            let line = row.position().map(|pos| pos.line()).unwrap_or_default();

            match self.validate_row(&row, &columns, line)? {
                Some(record) => ingested.records.push(record),
                None => ingested.dropped_rows += 1,
            }
        }

        info!(
            records = ingested.records.len(),
            dropped = ingested.dropped_rows,
            "Spreadsheet ingested"
        );
        Ok(ingested)
    }

    /// Build a record from a row, or `None` when the row is dropped.
    fn validate_row(
        &self,
        row: &csv::StringRecord,
        columns: &ColumnMap,
        line: u64,
    ) -> Result<Option<LabelRecord>> {
        let value = |idx: usize| row.get(idx).unwrap_or("");

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .zip(columns.required)
            .filter(|(_, idx)| value(*idx).is_empty())
            .map(|(name, _)| (*name).to_string())
            .collect();

        if !missing.is_empty() {
            if self.strict {
                return Err(EtiquetasError::RowValidation {
                    line,
                    problem: RowProblem::Missing(missing),
                });
            }
            debug!(line, ?missing, "Dropping incomplete row");
            return Ok(None);
        }

        let count = parse_repeat_count(columns.repeat.map(value));
        let repeat_count = match u32::try_from(count) {
            Ok(count) if count <= self.max_repeat => count,
            _ => {
                let problem = RowProblem::RepeatOverLimit {
                    count,
                    max: self.max_repeat,
                };
                if self.strict {
                    return Err(EtiquetasError::RowValidation { line, problem });
                }
                warn!(line, count, max = self.max_repeat, "Dropping row over the label limit");
                return Ok(None);
            }
        };

        let [customer, code, ean, description, lot, expiry] = columns.required;
        Ok(Some(LabelRecord {
            customer_name: value(customer).to_string(),
            code: value(code).to_string(),
            barcode_id: value(ean).to_string(),
            description: value(description).to_string(),
            lot: value(lot).to_string(),
            expiry: value(expiry).to_string(),
            repeat_count,
            line,
        }))
    }
}

/// Read a whole spreadsheet, rejecting anything that is not UTF-8.
pub fn read_utf8<R: Read>(mut input: R) -> Result<String> {
    let mut bytes = Vec::new();
    input.read_to_end(&mut bytes)?;
    String::from_utf8(bytes).map_err(|err| {
        EtiquetasError::Csv(format!("input is not valid UTF-8: {}", err.utf8_error()))
    })
}

/// Locate every required column, failing with all missing names at once.
fn resolve_columns(headers: &csv::StringRecord) -> Result<ColumnMap> {
    let names: Vec<&str> = headers
        .iter()
        .map(|name| name.trim_start_matches(BOM).trim())
        .collect();
    let position = |wanted: &str| names.iter().position(|name| *name == wanted);

    let mut required = [0usize; REQUIRED_COLUMNS.len()];
    let mut missing = Vec::new();
    for (slot, column) in required.iter_mut().zip(REQUIRED_COLUMNS) {
        match position(column) {
            Some(idx) => *slot = idx,
            None => missing.push(column.to_string()),
        }
    }

    if !missing.is_empty() {
        return Err(EtiquetasError::Schema { missing });
    }

    Ok(ColumnMap {
        required,
        repeat: position(REPEAT_COLUMN),
    })
}

/// Number of labels for a row, read from the leading integer of the cell
/// ("3", "2.0", "2,0" and "3abc" all count). Absent, non-numeric, zero or
/// negative becomes 1; values too large for `u64` saturate.
pub fn parse_repeat_count(raw: Option<&str>) -> u64 {
    let Some(text) = raw.map(str::trim) else {
        return 1;
    };
    let (negative, unsigned) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let digits_len = unsigned.bytes().take_while(u8::is_ascii_digit).count();
    if negative || digits_len == 0 {
        return 1;
    }
    unsigned[..digits_len].parse::<u64>().unwrap_or(u64::MAX).max(1)
}
