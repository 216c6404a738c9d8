//! Column type tags.

use serde::{Deserialize, Serialize};

/// Type of a column, derived from the cells it holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// Floating-point numbers.
    Number,
    /// Text values.
    Text,
    /// Calendar dates.
    Date,
    /// Boolean values.
    Boolean,
    /// Every cell is missing (or the table has no rows).
    #[default]
    Missing,
    /// Present cells of more than one type.
    Mixed,
}

impl ColumnType {
    /// Returns true if this type is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Number)
    }

    /// Returns true if this type is temporal.
    pub fn is_temporal(&self) -> bool {
        matches!(self, ColumnType::Date)
    }

    /// Fold another cell's type into an accumulated column type.
    pub(crate) fn merge(self, cell: ColumnType) -> ColumnType {
        match (self, cell) {
            (acc, ColumnType::Missing) => acc,
            (ColumnType::Missing, cell) => cell,
            (acc, cell) if acc == cell => acc,
            _ => ColumnType::Mixed,
        }
    }
}
