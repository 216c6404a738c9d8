//! Aggregation engine that turns a cleaned table into weekly summaries.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::Datelike;
use indexmap::IndexMap;

use crate::config::{AggFunc, AggregationConfig};
use crate::diagnostics::DiagnosticsSink;
use crate::error::{ReportError, Result};
use crate::stats;
use crate::table::{ColumnType, Table, Value};

use super::functions::aggregate;
use super::grouping::{
    COUNT_COLUMN, FunctionSelection, GroupedAggregates, group_rows, output_measures,
    resolve_columns,
};
use super::summary::SummarySet;
use super::time::{self, CALENDAR_COLUMNS, DAY_OF_WEEK, WEEK_START};

/// Columns of `weekly_totals` that are labels rather than metrics.
const WEEK_LABEL_COLUMNS: [&str; 2] = ["week_number", "year"];

/// Columns of the statistics summary.
const STATISTICS_COLUMNS: [&str; 7] = ["column", "count", "mean", "median", "std", "min", "max"];

/// Engine for computing weekly summaries.
#[derive(Debug, Default)]
pub struct AggregationEngine {
    last_summaries: Option<SummarySet>,
}

impl AggregationEngine {
    /// Create a new aggregation engine.
    pub fn new() -> Self {
        Self {
            last_summaries: None,
        }
    }

    /// Compute every summary for a table.
    ///
    /// The input table is not modified; time dimensions are derived on a
    /// copy. Fails if the configuration is malformed or the date column or a
    /// grouping column is absent.
    pub fn summarize(
        &mut self,
        table: &Table,
        config: &AggregationConfig,
        sink: &mut dyn DiagnosticsSink,
    ) -> Result<SummarySet> {
        config.validate()?;
        self.validate_columns(table, config)?;

        sink.info("summarize", "Starting weekly summarization".to_string());
        for column in config.metrics.keys().filter(|c| !table.has_column(c)) {
            sink.warn(
                "summarize",
                format!("Metric column '{}' not found; skipped", column),
            );
        }

        let mut df = table.clone();
        time::add_time_dimensions(&mut df, &config.date_column, config.week_start, sink)?;

        let weekly_totals = self.weekly_totals(&df, config, sink)?;

        let by_category = if config.group_by.is_empty() {
            None
        } else {
            Some(self.group_summaries(&df, config, sink)?)
        };

        let trends = if config.include_trends {
            Some(self.trends(&weekly_totals, sink)?)
        } else {
            None
        };

        let daily_breakdown = self.daily_breakdown(&df, config, sink)?;
        let statistics = self.statistics(&df, sink)?;

        let top_items = if config.group_by.is_empty() {
            None
        } else {
            Some(self.top_items(&df, config, sink)?)
        };

        let summaries = SummarySet {
            weekly_totals,
            by_category,
            trends,
            daily_breakdown,
            statistics,
            top_items,
        };

        sink.info(
            "summarize",
            format!(
                "Weekly summarization completed. Generated {} summary reports",
                summaries.len()
            ),
        );

        self.last_summaries = Some(summaries.clone());
        Ok(summaries)
    }

    /// Summaries from the most recent successful call to
    /// [`summarize`](Self::summarize).
    pub fn last_summaries(&self) -> Option<&SummarySet> {
        self.last_summaries.as_ref()
    }

    /// Fail if the date column or any grouping column is absent.
    fn validate_columns(&self, table: &Table, config: &AggregationConfig) -> Result<()> {
        let missing: Vec<&str> = std::iter::once(config.date_column.as_str())
            .chain(config.group_by.iter().map(String::as_str))
            .filter(|c| !table.has_column(c))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ReportError::missing_columns(missing))
        }
    }

    /// Aggregates per week, labelled with ISO week number and year.
    fn weekly_totals(
        &self,
        df: &Table,
        config: &AggregationConfig,
        sink: &mut dyn DiagnosticsSink,
    ) -> Result<Table> {
        let measures = output_measures(df, config, FunctionSelection::All);
        let mut weekly = GroupedAggregates::compute(df, &[WEEK_START], measures)?.to_table()?;

        let starts: Vec<Option<chrono::NaiveDate>> =
            weekly.column_values(0).map(Value::as_date).collect();
        let week_numbers = starts
            .iter()
            .map(|d| Value::from(d.map(|d| f64::from(d.iso_week().week()))))
            .collect();
        let years = starts
            .iter()
            .map(|d| Value::from(d.map(|d| f64::from(d.year()))))
            .collect();
        weekly.set_column(WEEK_LABEL_COLUMNS[0], week_numbers)?;
        weekly.set_column(WEEK_LABEL_COLUMNS[1], years)?;

        sink.info(
            "weekly_totals",
            format!("Calculated weekly totals for {} weeks", weekly.row_count()),
        );
        Ok(weekly)
    }

    /// Aggregates per week and grouping-column combination.
    fn group_summaries(
        &self,
        df: &Table,
        config: &AggregationConfig,
        sink: &mut dyn DiagnosticsSink,
    ) -> Result<Table> {
        let keys: Vec<&str> = std::iter::once(WEEK_START)
            .chain(config.group_by.iter().map(String::as_str))
            .collect();
        let measures = output_measures(df, config, FunctionSelection::All);
        let mut summary = GroupedAggregates::compute(df, &keys, measures)?.to_table()?;

        if config.include_percentages {
            self.add_percentages(&mut summary, keys.len())?;
        }

        sink.info(
            "by_category",
            format!("Calculated group summaries with {} rows", summary.row_count()),
        );
        Ok(summary)
    }

    /// Add `{col}_percentage` for each numeric measure column: the share of
    /// the week's total, rounded to two decimals. A zero week total leaves
    /// the percentage missing.
    fn add_percentages(&self, summary: &mut Table, key_count: usize) -> Result<()> {
        let numeric: Vec<usize> = (key_count..summary.column_count())
            .filter(|&idx| summary.column_type(idx) == ColumnType::Number)
            .collect();

        for idx in numeric {
            let mut totals: HashMap<&Value, f64> = HashMap::new();
            for row in summary.rows() {
                if let Some(v) = row[idx].as_f64() {
                    *totals.entry(&row[0]).or_insert(0.0) += v;
                }
            }

            let percentages: Vec<Value> = summary
                .rows()
                .iter()
                .map(|row| {
                    let total = totals.get(&row[0]).copied().unwrap_or(0.0);
                    match row[idx].as_f64() {
                        Some(v) if total != 0.0 => Value::number(stats::round_to(v / total * 100.0, 2)),
                        _ => Value::Missing,
                    }
                })
                .collect();

            let name = format!("{}_percentage", summary.column_names()[idx]);
            summary.set_column(name, percentages)?;
        }
        Ok(())
    }

    /// Week-over-week change, percentage change and direction per metric.
    fn trends(&self, weekly: &Table, sink: &mut dyn DiagnosticsSink) -> Result<Table> {
        let mut trends = weekly.clone();
        let start_idx = trends
            .column_index(WEEK_START)
            .ok_or_else(|| ReportError::missing_columns([WEEK_START]))?;
        trends.sort_rows_by(|a, b| a[start_idx].cmp(&b[start_idx]));

        let metric_columns: Vec<usize> = (0..trends.column_count())
            .filter(|&idx| trends.column_type(idx) == ColumnType::Number)
            .filter(|&idx| !WEEK_LABEL_COLUMNS.contains(&trends.column_names()[idx].as_str()))
            .collect();

        let mut directions = Vec::with_capacity(metric_columns.len());
        for &idx in &metric_columns {
            let name = trends.column_names()[idx].clone();
            let values: Vec<Option<f64>> = trends.column_values(idx).map(Value::as_f64).collect();

            let mut changes = Vec::with_capacity(values.len());
            let mut pct_changes = Vec::with_capacity(values.len());
            let mut previous: Option<Option<f64>> = None;
            for &current in &values {
                let (change, pct) = match (previous, current) {
                    (Some(Some(prev)), Some(cur)) => {
                        let change = cur - prev;
                        let pct = (prev != 0.0).then(|| change / prev * 100.0);
                        (Some(change), pct)
                    }
                    _ => (None, None),
                };
                changes.push(change);
                pct_changes.push(pct);
                previous = Some(current);
            }

            directions.push((name.clone(), changes.iter().map(|c| trend_label(*c)).collect::<Vec<_>>()));
            trends.set_column(
                format!("{}_change", name),
                changes.into_iter().map(Value::from).collect(),
            )?;
            trends.set_column(
                format!("{}_pct_change", name),
                pct_changes.into_iter().map(Value::from).collect(),
            )?;
        }

        for (name, labels) in directions {
            trends.set_column(format!("{}_trend", name), labels)?;
        }

        sink.info(
            "trends",
            format!("Calculated trends for {} metrics", metric_columns.len()),
        );
        Ok(trends)
    }

    /// Aggregates per calendar day, using only the first function of each
    /// metric.
    fn daily_breakdown(
        &self,
        df: &Table,
        config: &AggregationConfig,
        sink: &mut dyn DiagnosticsSink,
    ) -> Result<Table> {
        let measures = output_measures(df, config, FunctionSelection::FirstOnly);
        let daily =
            GroupedAggregates::compute(df, &[config.date_column.as_str(), DAY_OF_WEEK], measures)?
                .to_table()?;

        sink.info(
            "daily_breakdown",
            format!("Calculated daily breakdown for {} days", daily.row_count()),
        );
        Ok(daily)
    }

    /// Count, mean, median, standard deviation, min and max per numeric
    /// column, excluding derived calendar columns.
    fn statistics(&self, df: &Table, sink: &mut dyn DiagnosticsSink) -> Result<Table> {
        let mut stats_table = Table::with_columns(STATISTICS_COLUMNS)?;

        for idx in 0..df.column_count() {
            let name = &df.column_names()[idx];
            if df.column_type(idx) != ColumnType::Number || CALENDAR_COLUMNS.contains(&name.as_str()) {
                continue;
            }

            let values: Vec<f64> = df.column_values(idx).filter_map(Value::as_f64).collect();
            let min = values.iter().copied().reduce(f64::min);
            let max = values.iter().copied().reduce(f64::max);
            stats_table.push_row(vec![
                Value::text(name.as_str()),
                Value::Number(values.len() as f64),
                Value::from(stats::mean(&values)),
                Value::from(stats::median(&values)),
                Value::from(stats::sample_std(&values)),
                Value::from(min),
                Value::from(max),
            ])?;
        }

        sink.info(
            "statistics",
            format!("Calculated statistics for {} metrics", stats_table.row_count()),
        );
        Ok(stats_table)
    }

    /// Top-N tables per grouping column, by occurrence count or by each
    /// rankable metric.
    fn top_items(
        &self,
        df: &Table,
        config: &AggregationConfig,
        sink: &mut dyn DiagnosticsSink,
    ) -> Result<IndexMap<String, Table>> {
        let mut top_items = IndexMap::new();

        for group_col in &config.group_by {
            let group_idx = resolve_columns(df, &[group_col.as_str()])?[0];

            if config.metrics.is_empty() {
                let mut counts: IndexMap<&Value, usize> = IndexMap::new();
                for value in df.column_values(group_idx).filter(|v| !v.is_missing()) {
                    *counts.entry(value).or_insert(0) += 1;
                }
                let mut ranked: Vec<(&Value, usize)> = counts.into_iter().collect();
                ranked.sort_by(|a, b| b.1.cmp(&a.1));

                let rows = ranked
                    .into_iter()
                    .take(config.top_n)
                    .map(|(value, count)| vec![value.clone(), Value::Number(count as f64)])
                    .collect();
                let table = Table::new(vec![group_col.clone(), COUNT_COLUMN.to_string()], rows)?;
                top_items.insert(format!("top_{}", group_col), table);
                continue;
            }

            for (metric_col, functions) in &config.metrics {
                let Some(metric_idx) = df.column_index(metric_col) else {
                    continue;
                };
                let Some(&function) = functions.first() else {
                    continue;
                };
                if !function.is_rankable() {
                    continue;
                }

                let table = self.rank_by_metric(df, group_idx, metric_idx, function, config.top_n)?;
                top_items.insert(format!("top_{}_by_{}", group_col, metric_col), table);
            }
        }

        sink.info(
            "top_items",
            format!("Calculated top items for {} categories", top_items.len()),
        );
        Ok(top_items)
    }

    /// Aggregate a metric per group value and keep the `top_n` largest.
    fn rank_by_metric(
        &self,
        df: &Table,
        group_idx: usize,
        metric_idx: usize,
        function: AggFunc,
        top_n: usize,
    ) -> Result<Table> {
        let mut ranked: Vec<(Value, Value)> = group_rows(df, &[group_idx])
            .into_iter()
            .map(|(mut key, rows)| {
                let cells: Vec<&Value> = rows.iter().map(|&r| &df.rows()[r][metric_idx]).collect();
                (key.remove(0), aggregate(function, &cells))
            })
            .collect();
        ranked.sort_by(|a, b| descending_missing_last(&a.1, &b.1));
        ranked.truncate(top_n);

        let columns = vec![
            df.column_names()[group_idx].clone(),
            df.column_names()[metric_idx].clone(),
        ];
        Table::new(columns, ranked.into_iter().map(|(k, v)| vec![k, v]).collect())
    }
}

/// Direction of a change: up, down or flat. Undefined changes stay missing.
fn trend_label(change: Option<f64>) -> Value {
    match change {
        Some(c) if c > 0.0 => Value::text("up"),
        Some(c) if c < 0.0 => Value::text("down"),
        Some(_) => Value::text("flat"),
        None => Value::Missing,
    }
}

/// Order numbers from largest to smallest with missing values at the end.
fn descending_missing_last(a: &Value, b: &Value) -> Ordering {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
