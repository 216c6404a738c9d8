//! Writing cleaned tables, JSON results and the text digest.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use reportpilot::{SummarySet, Table, Value};
use serde::Serialize;

use crate::input::InputError;

const RULE_WIDTH: usize = 60;

/// Columns of the weekly totals that label the week rather than measure it.
const WEEK_LABELS: [&str; 3] = ["week_start", "week_number", "year"];

/// Write a table as delimited text. Missing cells are written empty.
pub fn write_table(table: &Table, path: &Path, delimiter: u8) -> Result<(), InputError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(path)?;

    writer.write_record(table.column_names())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(ToString::to_string))?;
    }
    writer.flush().map_err(|e| InputError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(())
}

/// Write any serializable value as pretty JSON.
pub fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).map_err(|e| InputError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(())
}

/// Plain-text digest of the latest week, its trends and the statistics.
pub fn render_digest(summaries: &SummarySet) -> String {
    let mut out = String::new();
    let rule = "=".repeat(RULE_WIDTH);
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "WEEKLY ACTIVITY REPORT SUMMARY");
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out);

    let weekly = &summaries.weekly_totals;
    if let Some(latest) = weekly.rows().last() {
        let _ = writeln!(out, "WEEKLY TOTALS:");
        for (name, value) in weekly.column_names().iter().zip(latest) {
            if !WEEK_LABELS.contains(&name.as_str()) {
                let _ = writeln!(out, "  Latest {}: {}", name, format_value(value));
            }
        }
        let _ = writeln!(out);
    }

    if let Some(trends) = summaries.trends.as_ref() {
        if let Some(latest) = trends.rows().last() {
            let _ = writeln!(out, "TRENDS (Latest Week):");
            for name in trends.column_names() {
                let Some(base) = name.strip_suffix("_trend") else {
                    continue;
                };
                let direction = trends
                    .column_index(name)
                    .map(|idx| &latest[idx])
                    .filter(|v| !v.is_missing());
                let pct = trends
                    .column_index(&format!("{}_pct_change", base))
                    .and_then(|idx| latest[idx].as_f64());
                if let (Some(direction), Some(pct)) = (direction, pct) {
                    let _ = writeln!(out, "  {}: {} ({:+.1}%)", base, direction, pct);
                }
            }
            let _ = writeln!(out);
        }
    }

    let stats = &summaries.statistics;
    if !stats.is_empty() {
        let _ = writeln!(out, "STATISTICS:");
        for row in 0..stats.row_count() {
            let field = |name: &str| stats.get_by_name(row, name).map(format_stat).unwrap_or_default();
            let _ = writeln!(
                out,
                "  {}: mean={}, median={}, std={}",
                field("column"),
                field("mean"),
                field("median"),
                field("std")
            );
        }
        let _ = writeln!(out);
    }

    let _ = write!(out, "{}", rule);
    out
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Missing => "n/a".to_string(),
        other => other.to_string(),
    }
}

fn format_stat(value: &Value) -> String {
    match value {
        Value::Number(n) => format!("{:.2}", n),
        other => format_value(other),
    }
}
