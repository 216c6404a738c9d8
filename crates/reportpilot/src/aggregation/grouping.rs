//! Grouped aggregation keyed by group tuple, then measure.

use std::collections::BTreeMap;

use indexmap::IndexMap;

use crate::config::{AggFunc, AggregationConfig};
use crate::error::{ReportError, Result};
use crate::table::{Table, Value};

use super::functions::aggregate;

/// Name of the row-count output column.
pub(crate) const COUNT_COLUMN: &str = "count";

/// A quantity computed for each group.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Measure {
    /// Number of rows in the group.
    RowCount,
    /// An aggregation function over a metric column.
    Metric { column: String, function: AggFunc },
}

/// A measure paired with the name of its output column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OutputMeasure {
    pub measure: Measure,
    pub name: String,
}

/// Which configured functions to apply per metric column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FunctionSelection {
    /// Every configured function.
    All,
    /// Only the first configured function.
    FirstOnly,
}

/// Build the measures for a table from the metric configuration.
///
/// Without metrics the single measure is a row count. Metric columns absent
/// from the table are skipped. A column gets `{column}_{function}` names
/// only when more than one function applies to it.
pub(crate) fn output_measures(
    table: &Table,
    config: &AggregationConfig,
    selection: FunctionSelection,
) -> Vec<OutputMeasure> {
    if config.metrics.is_empty() {
        return vec![OutputMeasure {
            measure: Measure::RowCount,
            name: COUNT_COLUMN.to_string(),
        }];
    }

    let mut measures = Vec::new();
    for (column, functions) in &config.metrics {
        if !table.has_column(column) {
            continue;
        }
        let functions = match selection {
            FunctionSelection::All => functions.as_slice(),
            FunctionSelection::FirstOnly => &functions[..functions.len().min(1)],
        };
        let multiple = functions.len() > 1;
        for &function in functions {
            let name = if multiple {
                format!("{}_{}", column, function)
            } else {
                column.clone()
            };
            measures.push(OutputMeasure {
                measure: Measure::Metric {
                    column: column.clone(),
                    function,
                },
                name,
            });
        }
    }
    measures
}

/// Partition row indices by the values of the key columns, sorted by key.
///
/// Rows with a missing value in any key column are left out.
pub(crate) fn group_rows(table: &Table, key_columns: &[usize]) -> BTreeMap<Vec<Value>, Vec<usize>> {
    let mut groups: BTreeMap<Vec<Value>, Vec<usize>> = BTreeMap::new();
    for (row_idx, row) in table.rows().iter().enumerate() {
        let key: Vec<Value> = key_columns.iter().map(|&c| row[c].clone()).collect();
        if key.iter().any(Value::is_missing) {
            continue;
        }
        groups.entry(key).or_default().push(row_idx);
    }
    groups
}

/// Aggregated values per group key, then per measure.
#[derive(Debug, Clone)]
pub struct GroupedAggregates {
    key_columns: Vec<String>,
    measures: Vec<OutputMeasure>,
    groups: IndexMap<Vec<Value>, IndexMap<Measure, Value>>,
}

impl GroupedAggregates {
    /// Group `table` by the named key columns and compute every measure.
    pub(crate) fn compute(
        table: &Table,
        key_columns: &[&str],
        measures: Vec<OutputMeasure>,
    ) -> Result<Self> {
        let key_idx = resolve_columns(table, key_columns)?;

        let mut groups = IndexMap::new();
        for (key, rows) in group_rows(table, &key_idx) {
            let mut values = IndexMap::with_capacity(measures.len());
            for output in &measures {
                let value = match &output.measure {
                    Measure::RowCount => Value::Number(rows.len() as f64),
                    Measure::Metric { column, function } => {
                        let col = table
                            .column_index(column)
                            .ok_or_else(|| ReportError::missing_columns([column.as_str()]))?;
                        let cells: Vec<&Value> = rows.iter().map(|&r| &table.rows()[r][col]).collect();
                        aggregate(*function, &cells)
                    }
                };
                values.insert(output.measure.clone(), value);
            }
            groups.insert(key, values);
        }

        Ok(Self {
            key_columns: key_columns.iter().map(|c| c.to_string()).collect(),
            measures,
            groups,
        })
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Returns true if there are no groups.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Look up one aggregated value.
    pub fn value(&self, key: &[Value], measure: &Measure) -> Option<&Value> {
        self.groups.get(key).and_then(|m| m.get(measure))
    }

    /// Flatten into a table: key columns, then one column per measure.
    pub fn to_table(&self) -> Result<Table> {
        let columns: Vec<String> = self
            .key_columns
            .iter()
            .cloned()
            .chain(self.measures.iter().map(|m| m.name.clone()))
            .collect();

        let rows = self
            .groups
            .iter()
            .map(|(key, values)| {
                key.iter()
                    .cloned()
                    .chain(
                        self.measures
                            .iter()
                            .map(|m| values.get(&m.measure).cloned().unwrap_or_default()),
                    )
                    .collect()
            })
            .collect();

        Table::new(columns, rows)
    }
}

/// Resolve column names to indices, failing on the first absent one.
pub(crate) fn resolve_columns(table: &Table, names: &[&str]) -> Result<Vec<usize>> {
    names
        .iter()
        .map(|name| {
            table
                .column_index(name)
                .ok_or_else(|| ReportError::missing_columns([*name]))
        })
        .collect()
}
