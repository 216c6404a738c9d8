//! Aggregation configuration.

use std::fmt;

use chrono::Weekday;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

use crate::aggregation::WEEK_START;
use crate::error::{ReportError, Result};

/// Supported aggregation functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggFunc {
    /// Sum of numeric values.
    Sum,
    /// Arithmetic mean of numeric values.
    Mean,
    /// Median of numeric values.
    Median,
    /// Number of present values.
    Count,
    /// Smallest present value.
    Min,
    /// Largest present value.
    Max,
    /// Sample standard deviation.
    Std,
    /// Sample variance.
    Var,
    /// First present value in row order.
    First,
    /// Last present value in row order.
    Last,
    /// Number of distinct present values.
    Nunique,
}

impl AggFunc {
    /// The configuration name of this function.
    pub fn name(&self) -> &'static str {
        match self {
            AggFunc::Sum => "sum",
            AggFunc::Mean => "mean",
            AggFunc::Median => "median",
            AggFunc::Count => "count",
            AggFunc::Min => "min",
            AggFunc::Max => "max",
            AggFunc::Std => "std",
            AggFunc::Var => "var",
            AggFunc::First => "first",
            AggFunc::Last => "last",
            AggFunc::Nunique => "nunique",
        }
    }

    /// Functions that can rank items in top-N tables.
    pub fn is_rankable(&self) -> bool {
        matches!(self, AggFunc::Sum | AggFunc::Mean | AggFunc::Count)
    }
}

impl fmt::Display for AggFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for AggFunc {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self> {
        serde_json::from_value(serde_json::Value::String(s.trim().to_lowercase()))
            .map_err(|_| ReportError::Config(format!("Unknown aggregation function '{}'", s)))
    }
}

/// Options for the aggregation stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// Column holding the activity date.
    pub date_column: String,
    /// Category columns for grouped summaries and rankings.
    #[serde(deserialize_with = "one_or_many")]
    pub group_by: Vec<String>,
    /// Metric column to aggregation functions, in configuration order.
    #[serde(deserialize_with = "metric_functions")]
    pub metrics: IndexMap<String, Vec<AggFunc>>,
    /// Produce the `trends` summary.
    pub include_trends: bool,
    /// Add `_percentage` columns to `by_category`.
    pub include_percentages: bool,
    /// Rows kept in each top-N table.
    pub top_n: usize,
    /// First day of the reporting week.
    pub week_start: Weekday,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            date_column: "date".to_string(),
            group_by: Vec::new(),
            metrics: IndexMap::new(),
            include_trends: true,
            include_percentages: true,
            top_n: 10,
            week_start: Weekday::Mon,
        }
    }
}

impl AggregationConfig {
    /// Create a configuration for the given date column.
    pub fn new(date_column: impl Into<String>) -> Self {
        Self {
            date_column: date_column.into(),
            ..Self::default()
        }
    }

    /// Set the group-by columns.
    pub fn with_group_by<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_by = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Add a metric column with its aggregation functions.
    pub fn with_metric(mut self, column: impl Into<String>, functions: &[AggFunc]) -> Self {
        self.metrics.insert(column.into(), functions.to_vec());
        self
    }

    /// Enable or disable percentage columns.
    pub fn with_percentages(mut self, enabled: bool) -> Self {
        self.include_percentages = enabled;
        self
    }

    /// Enable or disable the trends summary.
    pub fn with_trends(mut self, enabled: bool) -> Self {
        self.include_trends = enabled;
        self
    }

    /// Set the number of items kept in each ranking.
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    /// Set the first day of the week.
    pub fn with_week_start(mut self, week_start: Weekday) -> Self {
        self.week_start = week_start;
        self
    }

    /// Check the configuration for structural errors.
    pub fn validate(&self) -> Result<()> {
        if self.date_column.trim().is_empty() {
            return Err(ReportError::Config("date_column must not be empty".to_string()));
        }
        if let Some((column, _)) = self.metrics.iter().find(|(_, f)| f.is_empty()) {
            return Err(ReportError::Config(format!(
                "Metric '{}' has no aggregation functions",
                column
            )));
        }
        if let Some(dup) = self
            .group_by
            .iter()
            .enumerate()
            .find(|(i, c)| self.group_by[..*i].contains(c))
            .map(|(_, c)| c)
        {
            return Err(ReportError::Config(format!(
                "group_by lists '{}' more than once",
                dup
            )));
        }
        if let Some(column) = self.group_by.iter().find(|c| self.metrics.contains_key(*c)) {
            return Err(ReportError::Config(format!(
                "Column '{}' cannot be both a group_by column and a metric",
                column
            )));
        }
        if let Some(column) = self
            .group_by
            .iter()
            .chain(self.metrics.keys())
            .find(|c| c.as_str() == WEEK_START)
        {
            return Err(ReportError::Config(format!(
                "'{}' is a derived column and cannot be grouped or aggregated",
                column
            )));
        }
        Ok(())
    }
}

/// A single item or a list of items.
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> From<OneOrMany<T>> for Vec<T> {
    fn from(value: OneOrMany<T>) -> Self {
        match value {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }
}

fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    OneOrMany::<String>::deserialize(deserializer).map(Vec::from)
}

fn metric_functions<'de, D>(
    deserializer: D,
) -> std::result::Result<IndexMap<String, Vec<AggFunc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = IndexMap::<String, OneOrMany<AggFunc>>::deserialize(deserializer)?;
    Ok(raw.into_iter().map(|(k, v)| (k, v.into())).collect())
}
