//! Cleaning configuration.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};
use crate::table::{Value, parse_date};

/// Strategy for resolving missing cells.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FillStrategy {
    /// Leave missing cells alone.
    #[default]
    None,
    /// Remove every row containing a missing cell.
    Drop,
    /// Propagate the nearest preceding value down each column.
    Forward,
    /// Propagate the nearest following value up each column.
    Backward,
    /// Fill numeric columns with their mean.
    Mean,
    /// Fill every missing cell with a zero/empty value of its column type.
    Zero,
    /// Any other name. Applied as a no-op with a warning.
    Unrecognized(String),
}

impl FillStrategy {
    /// The configuration name of this strategy.
    pub fn as_str(&self) -> &str {
        match self {
            FillStrategy::None => "none",
            FillStrategy::Drop => "drop",
            FillStrategy::Forward => "forward",
            FillStrategy::Backward => "backward",
            FillStrategy::Mean => "mean",
            FillStrategy::Zero => "zero",
            FillStrategy::Unrecognized(name) => name,
        }
    }
}

impl From<String> for FillStrategy {
    fn from(name: String) -> Self {
        match name.trim().to_lowercase().as_str() {
            "none" | "" => FillStrategy::None,
            "drop" => FillStrategy::Drop,
            "forward" | "ffill" => FillStrategy::Forward,
            "backward" | "bfill" => FillStrategy::Backward,
            "mean" => FillStrategy::Mean,
            "zero" => FillStrategy::Zero,
            _ => FillStrategy::Unrecognized(name),
        }
    }
}

impl From<FillStrategy> for String {
    fn from(strategy: FillStrategy) -> Self {
        strategy.as_str().to_string()
    }
}

/// Comparison used by a custom rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparator {
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "in")]
    In,
    #[serde(rename = "not_in")]
    NotIn,
}

impl Comparator {
    /// Returns true for `in` / `not_in`, which take a list of values.
    pub fn is_membership(&self) -> bool {
        matches!(self, Comparator::In | Comparator::NotIn)
    }

    /// The configuration symbol for this comparator.
    pub fn symbol(&self) -> &'static str {
        match self {
            Comparator::Gt => ">",
            Comparator::Lt => "<",
            Comparator::Ge => ">=",
            Comparator::Le => "<=",
            Comparator::Eq => "==",
            Comparator::Ne => "!=",
            Comparator::In => "in",
            Comparator::NotIn => "not_in",
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Right-hand side of a custom rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<RuleValue>),
}

impl RuleValue {
    /// Convert a scalar into a cell value. Lists become `Missing`.
    pub fn to_value(&self) -> Value {
        match self {
            RuleValue::Null | RuleValue::List(_) => Value::Missing,
            RuleValue::Bool(b) => Value::Bool(*b),
            RuleValue::Number(n) => Value::number(*n),
            RuleValue::Text(s) => Value::Text(s.clone()),
        }
    }

    /// Convert a scalar into a cell value comparable with `cell`.
    ///
    /// Text is read as a date when compared against a date cell.
    pub fn to_value_like(&self, cell: &Value) -> Value {
        match (self, cell) {
            (RuleValue::Text(s), Value::Date(_)) => {
                parse_date(s).map(Value::Date).unwrap_or(Value::Missing)
            }
            _ => self.to_value(),
        }
    }
}

impl fmt::Display for RuleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleValue::Null => f.write_str("null"),
            RuleValue::Bool(b) => write!(f, "{}", b),
            RuleValue::Number(n) => write!(f, "{}", n),
            RuleValue::Text(s) => write!(f, "'{}'", s),
            RuleValue::List(items) => {
                let parts: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

/// Keep rows where `column <comparator> value` holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomRule {
    /// Column the rule tests.
    pub column: String,
    /// Comparison to apply.
    #[serde(alias = "condition")]
    pub comparator: Comparator,
    /// Value to compare against.
    pub value: RuleValue,
}

impl CustomRule {
    /// Create a rule.
    pub fn new(column: impl Into<String>, comparator: Comparator, value: RuleValue) -> Self {
        Self {
            column: column.into(),
            comparator,
            value,
        }
    }

    /// Check that the value shape matches the comparator.
    pub fn validate(&self) -> Result<()> {
        let is_list = matches!(self.value, RuleValue::List(_));
        if self.comparator.is_membership() && !is_list {
            return Err(ReportError::Config(format!(
                "Rule on '{}': '{}' requires a list value, got {}",
                self.column, self.comparator, self.value
            )));
        }
        if !self.comparator.is_membership() && is_list {
            return Err(ReportError::Config(format!(
                "Rule on '{}': '{}' requires a single value, got {}",
                self.column, self.comparator, self.value
            )));
        }
        Ok(())
    }
}

impl fmt::Display for CustomRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.column, self.comparator, self.value)
    }
}

/// Options for the cleaning stage.
///
/// Stages run in a fixed order regardless of how options are set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    /// Remove exact-duplicate rows.
    pub drop_duplicates: bool,
    /// Remove rows where every cell is missing.
    pub drop_empty_rows: bool,
    /// Missing-value strategy.
    pub fill_missing: FillStrategy,
    /// Columns that must exist.
    pub required_columns: Vec<String>,
    /// Columns to coerce to dates.
    pub date_columns: Vec<String>,
    /// Columns to coerce to numbers. Also the outlier target set when given.
    pub numeric_columns: Option<Vec<String>>,
    /// Remove IQR outliers.
    pub remove_outliers: bool,
    /// Trim whitespace in text cells.
    pub standardize_strings: bool,
    /// Row filters applied in order.
    pub custom_rules: Vec<CustomRule>,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            drop_duplicates: true,
            drop_empty_rows: true,
            fill_missing: FillStrategy::None,
            required_columns: Vec::new(),
            date_columns: Vec::new(),
            numeric_columns: None,
            remove_outliers: false,
            standardize_strings: true,
            custom_rules: Vec::new(),
        }
    }
}

impl CleaningConfig {
    /// Create a configuration with every stage disabled.
    pub fn disabled() -> Self {
        Self {
            drop_duplicates: false,
            drop_empty_rows: false,
            standardize_strings: false,
            ..Self::default()
        }
    }

    /// Set the required columns.
    pub fn with_required_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Set the date columns.
    pub fn with_date_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.date_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Set the numeric columns.
    pub fn with_numeric_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.numeric_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set the missing-value strategy.
    pub fn with_fill_missing(mut self, strategy: FillStrategy) -> Self {
        self.fill_missing = strategy;
        self
    }

    /// Enable or disable outlier removal.
    pub fn with_outlier_removal(mut self, enabled: bool) -> Self {
        self.remove_outliers = enabled;
        self
    }

    /// Append a custom rule.
    pub fn with_rule(mut self, rule: CustomRule) -> Self {
        self.custom_rules.push(rule);
        self
    }

    /// Check the configuration for structural errors.
    pub fn validate(&self) -> Result<()> {
        self.custom_rules.iter().try_for_each(CustomRule::validate)
    }
}
