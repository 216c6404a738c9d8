//! Fixed-schema row container.

use std::collections::HashSet;

use serde::Serialize;

use crate::error::{ReportError, Result};

use super::types::ColumnType;
use super::value::Value;

/// Ordered rows over a fixed set of uniquely named columns.
///
/// Every row has exactly one cell per column. Column order is insertion
/// order and only matters for display.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Table {
    /// Column names in display order.
    columns: Vec<String>,
    /// Row data (row-major order).
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Create a table, validating names and row widths.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self> {
        check_unique(&columns)?;
        let width = columns.len();
        if let Some((idx, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(ReportError::Schema(format!(
                "Row {} has {} values, expected {}",
                idx,
                row.len(),
                width
            )));
        }
        Ok(Self { columns, rows })
    }

    /// Create an empty table with the given columns.
    pub fn with_columns<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(columns.into_iter().map(Into::into).collect(), Vec::new())
    }

    /// Create a table from named columns of equal length.
    pub fn from_columns<S: Into<String>>(columns: Vec<(S, Vec<Value>)>) -> Result<Self> {
        let height = columns.first().map(|(_, v)| v.len()).unwrap_or(0);
        let mut names = Vec::with_capacity(columns.len());
        let mut rows: Vec<Vec<Value>> = (0..height)
            .map(|_| Vec::with_capacity(columns.len()))
            .collect();

        for (name, values) in columns {
            let name = name.into();
            if values.len() != height {
                return Err(ReportError::Schema(format!(
                    "Column '{}' has {} values, expected {}",
                    name,
                    values.len(),
                    height
                )));
            }
            for (row, value) in rows.iter_mut().zip(values) {
                row.push(value);
            }
            names.push(name);
        }

        Self::new(names, rows)
    }

    /// Append a row.
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(ReportError::Schema(format!(
                "Row has {} values, expected {}",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get all column names.
    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    /// Get the position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Returns true if a column with this name exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Get all rows.
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Get a single row.
    pub fn row(&self, index: usize) -> Option<&[Value]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// Get a specific cell value.
    pub fn get(&self, row: usize, col: usize) -> Option<&Value> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Get a cell by column name.
    pub fn get_by_name(&self, row: usize, column: &str) -> Option<&Value> {
        self.column_index(column).and_then(|col| self.get(row, col))
    }

    /// Overwrite a cell. Out-of-range positions are ignored.
    pub fn set(&mut self, row: usize, col: usize, value: Value) {
        if let Some(cell) = self.rows.get_mut(row).and_then(|r| r.get_mut(col)) {
            *cell = value;
        }
    }

    /// Get all values for a column by index.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &Value> {
        self.rows.iter().filter_map(move |row| row.get(index))
    }

    /// Mutable access to all values of a column.
    pub fn column_values_mut(&mut self, index: usize) -> impl Iterator<Item = &mut Value> {
        self.rows.iter_mut().filter_map(move |row| row.get_mut(index))
    }

    /// Get a column by name.
    pub fn column_by_name(&self, name: &str) -> Option<Vec<&Value>> {
        let index = self.column_index(name)?;
        Some(self.column_values(index).collect())
    }

    /// Derive the type of a column from its present cells.
    pub fn column_type(&self, index: usize) -> ColumnType {
        self.column_values(index)
            .fold(ColumnType::Missing, |acc, v| acc.merge(v.column_type()))
    }

    /// Names of all columns with the given derived type.
    pub fn columns_of_type(&self, column_type: ColumnType) -> Vec<String> {
        (0..self.columns.len())
            .filter(|&idx| self.column_type(idx) == column_type)
            .map(|idx| self.columns[idx].clone())
            .collect()
    }

    /// Keep only rows matching the predicate. Returns the number removed.
    pub fn retain_rows<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&[Value]) -> bool,
    {
        let before = self.rows.len();
        self.rows.retain(|row| keep(row));
        before - self.rows.len()
    }

    /// Add a column, or overwrite an existing column of the same name.
    pub fn set_column(&mut self, name: impl Into<String>, values: Vec<Value>) -> Result<()> {
        let name = name.into();
        if values.len() != self.rows.len() {
            return Err(ReportError::Schema(format!(
                "Column '{}' has {} values, expected {}",
                name,
                values.len(),
                self.rows.len()
            )));
        }

        match self.column_index(&name) {
            Some(idx) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                self.columns.push(name);
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
        Ok(())
    }

    /// Reorder rows by a key over whole rows. The sort is stable.
    pub fn sort_rows_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&[Value], &[Value]) -> std::cmp::Ordering,
    {
        self.rows.sort_by(|a, b| compare(a, b));
    }

    /// Consume the table and return its parts.
    pub fn into_parts(self) -> (Vec<String>, Vec<Vec<Value>>) {
        (self.columns, self.rows)
    }
}

/// Reject duplicate column names.
fn check_unique(columns: &[String]) -> Result<()> {
    let mut seen = HashSet::new();
    for name in columns {
        if !seen.insert(name.as_str()) {
            return Err(ReportError::Schema(format!(
                "Duplicate column name '{}'",
                name
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::new(
            vec!["name".into(), "amount".into()],
            vec![
                vec![Value::text("a"), Value::Number(1.0)],
                vec![Value::text("b"), Value::Missing],
                vec![Value::text("c"), Value::Number(3.0)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_rejects_duplicate_columns() {
        let err = Table::with_columns(["a", "a"]).unwrap_err();
        assert!(err.is_schema());
    }

    #[test]
    fn test_rejects_ragged_rows() {
        let err = Table::new(vec!["a".into()], vec![vec![]]).unwrap_err();
        assert!(err.is_schema());
    }

    #[test]
    fn test_column_type() {
        let table = sample();
        assert_eq!(table.column_type(0), ColumnType::Text);
        assert_eq!(table.column_type(1), ColumnType::Number);
        assert_eq!(table.columns_of_type(ColumnType::Number), vec!["amount"]);
    }

    #[test]
    fn test_retain_rows() {
        let mut table = sample();
        let removed = table.retain_rows(|row| !row[1].is_missing());
        assert_eq!(removed, 1);
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn test_set_column_overwrites() {
        let mut table = sample();
        table
            .set_column("amount", vec![Value::Number(9.0); 3])
            .unwrap();
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.get(1, 1), Some(&Value::Number(9.0)));

        table
            .set_column("flag", vec![Value::Bool(true); 3])
            .unwrap();
        assert_eq!(table.column_names(), &["name", "amount", "flag"]);
    }

    #[test]
    fn test_set_column_length_mismatch() {
        let mut table = sample();
        assert!(table.set_column("x", vec![Value::Missing]).is_err());
    }
}
