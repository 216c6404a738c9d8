//! Cleaning report types.

use serde::{Deserialize, Serialize};

/// One effective cleaning operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleaningOperation {
    /// Operation name (e.g. `drop_duplicates`, `custom_rule: hours > 0`).
    pub operation: String,
    /// Rows removed by this operation.
    pub rows_removed: usize,
    /// Cells rewritten by this operation.
    pub values_changed: usize,
}

/// Counters describing a cleaning run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CleaningReport {
    /// Rows before cleaning.
    pub original_rows: usize,
    /// Columns before cleaning.
    pub original_columns: usize,
    /// Rows after cleaning.
    pub final_rows: usize,
    /// Columns after cleaning.
    pub final_columns: usize,
    /// Total rows removed.
    pub rows_removed: usize,
    /// Total columns removed.
    pub columns_removed: usize,
    /// Effective operations, in the order they ran.
    pub operations: Vec<CleaningOperation>,
}

impl CleaningReport {
    /// Start a report for a table of the given shape.
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            original_rows: rows,
            original_columns: columns,
            final_rows: rows,
            final_columns: columns,
            ..Self::default()
        }
    }

    /// Record an operation. No-ops (nothing removed or changed) are skipped.
    pub fn record(&mut self, operation: impl Into<String>, rows_removed: usize, values_changed: usize) {
        if rows_removed == 0 && values_changed == 0 {
            return;
        }
        self.operations.push(CleaningOperation {
            operation: operation.into(),
            rows_removed,
            values_changed,
        });
    }

    /// Close the report with the final table shape.
    pub fn finish(&mut self, rows: usize, columns: usize) {
        self.final_rows = rows;
        self.final_columns = columns;
        self.rows_removed = self.original_rows.saturating_sub(rows);
        self.columns_removed = self.original_columns.saturating_sub(columns);
    }

    /// Rows removed by operations with the given name prefix.
    pub fn rows_removed_by(&self, operation: &str) -> usize {
        self.operations
            .iter()
            .filter(|op| op.operation.starts_with(operation))
            .map(|op| op.rows_removed)
            .sum()
    }
}
