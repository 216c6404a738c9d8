//! Delimited-file loading with delimiter detection and per-column typing.

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use reportpilot::table::{parse_date, parse_number};
use reportpilot::{PipelineConfig, ReportError, Table, Value};
use thiserror::Error;

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Errors raised while loading input files.
#[derive(Debug, Error)]
pub enum InputError {
    /// File could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Delimited text could not be parsed.
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// The file has no header or no data.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// The parsed rows do not form a valid table.
    #[error(transparent)]
    Table(#[from] ReportError),
}

/// A loaded file together with the delimiter it used.
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub table: Table,
    pub delimiter: u8,
}

/// Read a delimited file into a typed table.
pub fn load_table(path: &Path) -> Result<LoadedTable, InputError> {
    let contents = fs::read(path).map_err(|e| InputError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let delimiter = detect_delimiter(&contents)?;
    let table = parse_bytes(&contents, delimiter)?;
    tracing::debug!(
        path = %path.display(),
        delimiter = %format_name(delimiter),
        rows = table.row_count(),
        columns = table.column_count(),
        "Loaded input table"
    );

    Ok(LoadedTable { table, delimiter })
}

/// Read a JSON pipeline configuration, or the defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<PipelineConfig, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(PipelineConfig::default());
    };
    let text = fs::read_to_string(path).map_err(|e| InputError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(PipelineConfig::from_json_str(&text)?)
}

/// Short name of a delimiter, for messages.
pub fn format_name(delimiter: u8) -> &'static str {
    match delimiter {
        b'\t' => "tsv",
        b',' => "csv",
        b';' => "csv-semicolon",
        b'|' => "psv",
        _ => "delimited",
    }
}

/// File extension for a table written with this delimiter.
pub fn file_extension(delimiter: u8) -> &'static str {
    match delimiter {
        b'\t' => "tsv",
        b'|' => "psv",
        b',' | b';' => "csv",
        _ => "txt",
    }
}

/// Returns true for cell text that stands for a missing value.
pub fn is_null_token(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty()
        || ["na", "n/a", "null", "none", "nil"]
            .iter()
            .any(|token| trimmed.eq_ignore_ascii_case(token))
        || trimmed == "."
        || trimmed == "-"
}

fn parse_bytes(bytes: &[u8], delimiter: u8) -> Result<Table, InputError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader.headers()?.iter().map(|s| s.trim().to_string()).collect();
    if headers.is_empty() || headers.iter().all(String::is_empty) {
        return Err(InputError::EmptyData("No columns found".to_string()));
    }

    let expected_cols = headers.len();
    let mut raw_rows: Vec<Vec<String>> = Vec::new();
    for result in reader.records() {
        let record = result?;
        let mut row: Vec<String> = record.iter().map(|s| s.to_string()).collect();
        row.resize(expected_cols, String::new());
        raw_rows.push(row);
    }

    let kinds: Vec<CellKind> = (0..expected_cols)
        .map(|idx| infer_kind(raw_rows.iter().map(|row| row[idx].as_str())))
        .collect();

    let rows = raw_rows
        .into_iter()
        .map(|row| {
            row.into_iter()
                .zip(&kinds)
                .map(|(cell, kind)| kind.convert(cell))
                .collect()
        })
        .collect();

    Ok(Table::new(headers, rows)?)
}

/// Type every cell of a column is read as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellKind {
    Bool,
    Number,
    Date,
    Text,
}

impl CellKind {
    fn convert(self, cell: String) -> Value {
        if is_null_token(&cell) {
            return Value::Missing;
        }
        let parsed = match self {
            CellKind::Bool => parse_bool(&cell).map(Value::Bool),
            CellKind::Number => parse_number(&cell).map(Value::number),
            CellKind::Date => parse_date(&cell).map(Value::Date),
            CellKind::Text => None,
        };
        parsed.unwrap_or(Value::Text(cell))
    }
}

/// Pick the narrowest kind every non-null cell parses as.
fn infer_kind<'a>(cells: impl Iterator<Item = &'a str> + Clone) -> CellKind {
    let mut present = cells.filter(|c| !is_null_token(c)).peekable();
    if present.peek().is_none() {
        return CellKind::Text;
    }

    let all = |check: fn(&str) -> bool| present.clone().all(check);
    if all(|c| parse_bool(c).is_some()) {
        CellKind::Bool
    } else if all(|c| parse_number(c).is_some()) {
        CellKind::Number
    } else if all(|c| parse_date(c).is_some()) {
        CellKind::Date
    } else {
        CellKind::Text
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    let trimmed = s.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        Some(true)
    } else if trimmed.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Detect the delimiter by analyzing the first few lines.
fn detect_delimiter(bytes: &[u8]) -> Result<u8, InputError> {
    let lines: Vec<String> = BufReader::new(bytes)
        .lines()
        .take(10)
        .map_while(Result::ok)
        .filter(|l| !l.trim().is_empty())
        .collect();

    if lines.is_empty() {
        return Err(InputError::EmptyData("No lines to analyze".to_string()));
    }

    let mut best_delimiter = b',';
    let mut best_score = 0;

    for &delim in DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_delimiter_in_line(line, delim))
            .collect();

        let first_count = counts[0];
        if first_count == 0 {
            continue;
        }

        // Consistent counts across lines win; tab breaks ties.
        let consistent = counts.iter().all(|&c| c == first_count);
        let score = if consistent {
            first_count * 1000 + if delim == b'\t' { 100 } else { 0 }
        } else {
            first_count
        };

        if score > best_score {
            best_score = score;
            best_delimiter = delim;
        }
    }

    Ok(best_delimiter)
}

/// Count delimiter occurrences in a line, respecting quotes.
fn count_delimiter_in_line(line: &str, delimiter: u8) -> usize {
    let delim_char = delimiter as char;
    let mut count = 0;
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c == delim_char && !in_quotes => count += 1,
            _ => {}
        }
    }

    count
}
