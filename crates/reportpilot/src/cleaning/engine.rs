//! Cleaning engine that applies the ordered cleaning stages to a table.

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::config::{CleaningConfig, CustomRule, FillStrategy};
use crate::diagnostics::DiagnosticsSink;
use crate::error::{ReportError, Result};
use crate::stats;
use crate::table::{ColumnType, Table, Value};

use super::report::CleaningReport;
use super::rules::rule_matches;

/// Multiplier applied to the interquartile range for outlier bounds.
const IQR_MULTIPLIER: f64 = 1.5;

/// Engine for cleaning a table according to a [`CleaningConfig`].
///
/// Stages always run in this order, each one only when its option is set:
/// required-column validation, empty-row removal, deduplication, text
/// standardization, date coercion, numeric coercion, missing-value
/// resolution, outlier removal, custom rules.
#[derive(Debug, Default)]
pub struct CleaningEngine {
    last_report: Option<CleaningReport>,
}

impl CleaningEngine {
    /// Create a new cleaning engine.
    pub fn new() -> Self {
        Self { last_report: None }
    }

    /// Clean a table.
    ///
    /// Fails before touching the data if the configuration is malformed or a
    /// required column is absent. After that every stage degrades softly:
    /// unparseable cells become missing and unusable options are skipped
    /// with a warning on `sink`.
    pub fn clean(
        &mut self,
        table: Table,
        config: &CleaningConfig,
        sink: &mut dyn DiagnosticsSink,
    ) -> Result<Table> {
        config.validate()?;
        self.validate_columns(&table, &config.required_columns, sink)?;

        let mut table = table;
        let mut report = CleaningReport::new(table.row_count(), table.column_count());
        sink.info(
            "clean",
            format!(
                "Starting data cleaning. Input shape: ({}, {})",
                table.row_count(),
                table.column_count()
            ),
        );

        if config.drop_empty_rows {
            let removed = self.drop_empty_rows(&mut table);
            if removed > 0 {
                sink.info("drop_empty_rows", format!("Removed {} completely empty rows", removed));
            }
            report.record("drop_empty_rows", removed, 0);
        }

        if config.drop_duplicates {
            let removed = self.drop_duplicates(&mut table);
            if removed > 0 {
                sink.info("drop_duplicates", format!("Removed {} duplicate rows", removed));
            }
            report.record("drop_duplicates", removed, 0);
        }

        if config.standardize_strings {
            let changed = self.standardize_strings(&mut table, sink);
            report.record("standardize_strings", 0, changed);
        }

        if !config.date_columns.is_empty() {
            let changed = self.convert_columns(&mut table, &config.date_columns, Coercion::Date, sink);
            report.record("convert_dates", 0, changed);
        }

        if let Some(ref numeric) = config.numeric_columns {
            let changed = self.convert_columns(&mut table, numeric, Coercion::Number, sink);
            report.record("convert_numeric", 0, changed);
        }

        if config.fill_missing != FillStrategy::None {
            let (removed, changed) = self.handle_missing(&mut table, &config.fill_missing, sink);
            report.record("fill_missing", removed, changed);
        }

        if config.remove_outliers {
            let targets = config
                .numeric_columns
                .clone()
                .unwrap_or_else(|| table.columns_of_type(ColumnType::Number));
            let removed = self.remove_outliers(&mut table, &targets, sink);
            report.record("remove_outliers", removed, 0);
        }

        for rule in &config.custom_rules {
            if let Some(removed) = self.apply_rule(&mut table, rule, sink) {
                report.record(format!("custom_rule: {}", rule), removed, 0);
            }
        }

        report.finish(table.row_count(), table.column_count());
        sink.info(
            "clean",
            format!(
                "Data cleaning completed. Output shape: ({}, {}). Removed {} rows, {} columns",
                report.final_rows, report.final_columns, report.rows_removed, report.columns_removed
            ),
        );

        self.last_report = Some(report);
        Ok(table)
    }

    /// Report from the most recent successful call to [`clean`](Self::clean).
    pub fn last_report(&self) -> Option<&CleaningReport> {
        self.last_report.as_ref()
    }

    /// Fail if any required column is absent.
    fn validate_columns(
        &self,
        table: &Table,
        required: &[String],
        sink: &mut dyn DiagnosticsSink,
    ) -> Result<()> {
        if required.is_empty() {
            return Ok(());
        }

        let missing: Vec<&String> = required.iter().filter(|c| !table.has_column(c)).collect();
        if !missing.is_empty() {
            return Err(ReportError::missing_columns(missing));
        }

        sink.info(
            "required_columns",
            format!("Validated {} required columns", required.len()),
        );
        Ok(())
    }

    /// Remove rows where every cell is missing.
    fn drop_empty_rows(&self, table: &mut Table) -> usize {
        table.retain_rows(|row| !row.iter().all(Value::is_missing))
    }

    /// Remove rows equal to an earlier row. The first occurrence is kept.
    fn drop_duplicates(&self, table: &mut Table) -> usize {
        let mut seen: HashSet<Vec<Value>> = HashSet::with_capacity(table.row_count());
        table.retain_rows(|row| seen.insert(row.to_vec()))
    }

    /// Trim leading and trailing whitespace from text cells.
    fn standardize_strings(&self, table: &mut Table, sink: &mut dyn DiagnosticsSink) -> usize {
        let text_columns: Vec<usize> = (0..table.column_count())
            .filter(|&idx| matches!(table.column_type(idx), ColumnType::Text | ColumnType::Mixed))
            .collect();

        let mut changed = 0;
        for &idx in &text_columns {
            for cell in table.column_values_mut(idx) {
                if let Value::Text(s) = cell {
                    let trimmed = s.trim();
                    if trimmed.len() != s.len() {
                        *s = trimmed.to_string();
                        changed += 1;
                    }
                }
            }
        }

        if !text_columns.is_empty() {
            sink.info(
                "standardize_strings",
                format!("Standardized {} string columns", text_columns.len()),
            );
        }
        changed
    }

    /// Coerce the named columns. Absent columns are skipped with a warning.
    fn convert_columns(
        &self,
        table: &mut Table,
        columns: &[String],
        coercion: Coercion,
        sink: &mut dyn DiagnosticsSink,
    ) -> usize {
        let operation = coercion.operation();
        let mut converted = Vec::new();
        let mut changed = 0;

        for name in columns {
            let Some(idx) = table.column_index(name) else {
                sink.warn(
                    operation,
                    format!("Column '{}' not found for {} conversion", name, coercion.label()),
                );
                continue;
            };

            let mut failed = 0;
            for cell in table.column_values_mut(idx) {
                let coerced = coercion.apply(cell);
                if coerced != *cell {
                    if coerced.is_missing() {
                        failed += 1;
                    }
                    *cell = coerced;
                    changed += 1;
                }
            }

            if failed > 0 {
                sink.warn(
                    operation,
                    format!(
                        "{} value(s) in '{}' could not be converted to {} and are now missing",
                        failed,
                        name,
                        coercion.label()
                    ),
                );
            }
            converted.push(name.as_str());
        }

        if !converted.is_empty() {
            sink.info(
                operation,
                format!(
                    "Converted {} columns to {}: {:?}",
                    converted.len(),
                    coercion.label(),
                    converted
                ),
            );
        }
        changed
    }

    /// Resolve missing cells. Returns (rows removed, cells filled).
    fn handle_missing(
        &self,
        table: &mut Table,
        strategy: &FillStrategy,
        sink: &mut dyn DiagnosticsSink,
    ) -> (usize, usize) {
        let before = count_missing(table);

        let (removed, filled) = match strategy {
            FillStrategy::None => (0, 0),
            FillStrategy::Drop => (table.retain_rows(|row| !row.iter().any(Value::is_missing)), 0),
            FillStrategy::Forward => (0, self.propagate(table, false)),
            FillStrategy::Backward => (0, self.propagate(table, true)),
            FillStrategy::Mean => (0, self.fill_mean(table)),
            FillStrategy::Zero => (0, self.fill_zero(table)),
            FillStrategy::Unrecognized(name) => {
                sink.warn(
                    "fill_missing",
                    format!("Unknown missing value strategy: {}", name),
                );
                return (0, 0);
            }
        };

        sink.info(
            "fill_missing",
            format!(
                "Handled missing values using '{}' strategy. Missing values reduced from {} to {}",
                strategy.as_str(),
                before,
                count_missing(table)
            ),
        );
        (removed, filled)
    }

    /// Copy the nearest present value into missing cells, per column.
    fn propagate(&self, table: &mut Table, backward: bool) -> usize {
        let mut filled = 0;
        for idx in 0..table.column_count() {
            let mut cells: Vec<&mut Value> = table.column_values_mut(idx).collect();
            if backward {
                cells.reverse();
            }

            let mut last: Option<Value> = None;
            for cell in cells {
                if cell.is_missing() {
                    if let Some(ref value) = last {
                        *cell = value.clone();
                        filled += 1;
                    }
                } else {
                    last = Some(cell.clone());
                }
            }
        }
        filled
    }

    /// Fill missing cells of numeric columns with the column mean.
    fn fill_mean(&self, table: &mut Table) -> usize {
        let mut filled = 0;
        for idx in 0..table.column_count() {
            if table.column_type(idx) != ColumnType::Number {
                continue;
            }
            let present: Vec<f64> = table.column_values(idx).filter_map(Value::as_f64).collect();
            let Some(mean) = stats::mean(&present) else {
                continue;
            };
            for cell in table.column_values_mut(idx) {
                if cell.is_missing() {
                    *cell = Value::Number(mean);
                    filled += 1;
                }
            }
        }
        filled
    }

    /// Fill every missing cell with the zero value of its column type.
    fn fill_zero(&self, table: &mut Table) -> usize {
        let mut filled = 0;
        for idx in 0..table.column_count() {
            let zero = zero_value(table.column_type(idx));
            for cell in table.column_values_mut(idx) {
                if cell.is_missing() {
                    *cell = zero.clone();
                    filled += 1;
                }
            }
        }
        filled
    }

    /// Remove rows with a value outside `[Q1 - 1.5 IQR, Q3 + 1.5 IQR]` in
    /// any targeted column. Bounds all come from the table as it was when
    /// the stage started.
    fn remove_outliers(
        &self,
        table: &mut Table,
        targets: &[String],
        sink: &mut dyn DiagnosticsSink,
    ) -> usize {
        let mut bounds: Vec<(usize, f64, f64)> = Vec::new();

        for name in targets {
            let Some(idx) = table.column_index(name) else {
                sink.warn(
                    "remove_outliers",
                    format!("Column '{}' not found for outlier removal", name),
                );
                continue;
            };
            if table.column_type(idx) != ColumnType::Number {
                continue;
            }

            let values: Vec<f64> = table.column_values(idx).filter_map(Value::as_f64).collect();
            let (Some(q1), Some(q3)) = (stats::quantile(&values, 0.25), stats::quantile(&values, 0.75))
            else {
                continue;
            };
            let iqr = q3 - q1;
            bounds.push((idx, q1 - IQR_MULTIPLIER * iqr, q3 + IQR_MULTIPLIER * iqr));
        }

        let removed = table.retain_rows(|row| {
            bounds.iter().all(|&(idx, lower, upper)| match row[idx].as_f64() {
                Some(v) => v >= lower && v <= upper,
                None => true,
            })
        });

        if removed > 0 {
            sink.info("remove_outliers", format!("Removed {} outlier rows", removed));
        }
        removed
    }

    /// Apply one custom rule. Returns `None` when the rule was skipped.
    fn apply_rule(
        &self,
        table: &mut Table,
        rule: &CustomRule,
        sink: &mut dyn DiagnosticsSink,
    ) -> Option<usize> {
        let Some(idx) = table.column_index(&rule.column) else {
            sink.warn(
                "custom_rules",
                format!("Column '{}' not found for custom rule", rule.column),
            );
            return None;
        };

        let removed = table.retain_rows(|row| rule_matches(rule, &row[idx]));
        if removed > 0 {
            sink.info(
                "custom_rules",
                format!("Custom rule '{}' removed {} rows", rule, removed),
            );
        }
        Some(removed)
    }
}

/// Target type of a column coercion.
#[derive(Debug, Clone, Copy)]
enum Coercion {
    Date,
    Number,
}

impl Coercion {
    fn operation(self) -> &'static str {
        match self {
            Coercion::Date => "convert_dates",
            Coercion::Number => "convert_numeric",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Coercion::Date => "date",
            Coercion::Number => "numeric",
        }
    }

    fn apply(self, value: &Value) -> Value {
        match self {
            Coercion::Date => value.to_date(),
            Coercion::Number => value.to_number(),
        }
    }
}

/// The zero/empty value for a column type.
fn zero_value(column_type: ColumnType) -> Value {
    match column_type {
        ColumnType::Text => Value::Text(String::new()),
        ColumnType::Boolean => Value::Bool(false),
        ColumnType::Date => Value::Date(NaiveDate::default()),
        ColumnType::Number | ColumnType::Missing | ColumnType::Mixed => Value::Number(0.0),
    }
}

fn count_missing(table: &Table) -> usize {
    table
        .rows()
        .iter()
        .map(|row| row.iter().filter(|v| v.is_missing()).count())
        .sum()
}
