//! The set of summary tables produced by one aggregation run.

use indexmap::IndexMap;
use serde::Serialize;

use crate::table::Table;

/// Summary names, as used by downstream renderers.
pub const WEEKLY_TOTALS: &str = "weekly_totals";
pub const BY_CATEGORY: &str = "by_category";
pub const TRENDS: &str = "trends";
pub const DAILY_BREAKDOWN: &str = "daily_breakdown";
pub const STATISTICS: &str = "statistics";
pub const TOP_ITEMS: &str = "top_items";

/// Named summary tables.
///
/// `by_category` and `top_items` exist only when grouping columns are
/// configured, `trends` only when trends are enabled.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SummarySet {
    /// Aggregates per week.
    pub weekly_totals: Table,
    /// Aggregates per week and category, with optional percentages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by_category: Option<Table>,
    /// Week-over-week changes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trends: Option<Table>,
    /// Aggregates per day.
    pub daily_breakdown: Table,
    /// Descriptive statistics per numeric column.
    pub statistics: Table,
    /// Top-N rankings keyed `top_{group}` or `top_{group}_by_{metric}`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_items: Option<IndexMap<String, Table>>,
}

impl SummarySet {
    /// Look up a table-valued summary by name.
    pub fn get(&self, name: &str) -> Option<&Table> {
        match name {
            WEEKLY_TOTALS => Some(&self.weekly_totals),
            BY_CATEGORY => self.by_category.as_ref(),
            TRENDS => self.trends.as_ref(),
            DAILY_BREAKDOWN => Some(&self.daily_breakdown),
            STATISTICS => Some(&self.statistics),
            _ => None,
        }
    }

    /// Look up a single ranking table.
    pub fn top_item(&self, key: &str) -> Option<&Table> {
        self.top_items.as_ref().and_then(|items| items.get(key))
    }

    /// Names of the summaries present in this set.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names = vec![WEEKLY_TOTALS];
        if self.by_category.is_some() {
            names.push(BY_CATEGORY);
        }
        if self.trends.is_some() {
            names.push(TRENDS);
        }
        names.push(DAILY_BREAKDOWN);
        names.push(STATISTICS);
        if self.top_items.is_some() {
            names.push(TOP_ITEMS);
        }
        names
    }

    /// Number of summaries present.
    pub fn len(&self) -> usize {
        self.names().len()
    }

    /// Always false: weekly totals, daily breakdown and statistics are
    /// always present.
    pub fn is_empty(&self) -> bool {
        false
    }
}
