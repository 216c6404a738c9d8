//! Aggregation stage: time dimensions, grouped aggregates, percentages,
//! trends, statistics and top-N rankings.

mod engine;
mod functions;
mod grouping;
mod summary;
mod time;

pub use engine::AggregationEngine;
pub use grouping::{GroupedAggregates, Measure};
pub use summary::{
    BY_CATEGORY, DAILY_BREAKDOWN, STATISTICS, SummarySet, TOP_ITEMS, TRENDS, WEEKLY_TOTALS,
};
pub use time::{day_name, week_start};
pub(crate) use time::WEEK_START;
