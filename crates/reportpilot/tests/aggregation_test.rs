//! Integration tests for the aggregation stage.

use chrono::{NaiveDate, Weekday};

use reportpilot::aggregation::{BY_CATEGORY, TOP_ITEMS, TRENDS};
use reportpilot::{AggFunc, AggregationConfig, AggregationEngine, Diagnostics, SummarySet, Table, Value};

fn date(y: i32, m: u32, d: u32) -> Value {
    Value::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

fn summarize(table: &Table, config: &AggregationConfig) -> SummarySet {
    AggregationEngine::new()
        .summarize(table, config, &mut Diagnostics::new())
        .expect("Summarization failed")
}

fn column(table: &Table, name: &str) -> Vec<Value> {
    table
        .column_by_name(name)
        .unwrap_or_else(|| panic!("missing column {}", name))
        .into_iter()
        .cloned()
        .collect()
}

/// One row per week starting Monday 2024-01-01, with the given hours.
fn weekly(hours: &[f64]) -> Table {
    let dates = (0..hours.len())
        .map(|w| date(2024, 1, 1 + 7 * w as u32 + 2))
        .collect();
    let hours = hours.iter().map(|&h| Value::Number(h)).collect();
    Table::from_columns(vec![("date", dates), ("hours", hours)]).unwrap()
}

/// Timesheet rows across two weeks and three categories.
fn timesheet() -> Table {
    Table::from_columns(vec![
        (
            "date",
            vec![
                Value::text("2024-01-01"),
                Value::text("2024-01-02"),
                Value::text("2024-01-02"),
                Value::text("2024-01-09"),
                Value::text("2024-01-10"),
                Value::text("2024-01-11"),
            ],
        ),
        (
            "category",
            vec![
                Value::text("a"),
                Value::text("b"),
                Value::text("a"),
                Value::text("a"),
                Value::text("b"),
                Value::text("c"),
            ],
        ),
        (
            "hours",
            vec![
                Value::Number(10.0),
                Value::Number(70.0),
                Value::Number(20.0),
                Value::Number(1.0),
                Value::Number(1.0),
                Value::Number(1.0),
            ],
        ),
    ])
    .unwrap()
}

// =============================================================================
// Validation
// =============================================================================

#[test]
fn test_missing_date_column_is_schema_error() {
    let table = Table::from_columns(vec![("hours", vec![Value::Number(1.0)])]).unwrap();
    let err = AggregationEngine::new()
        .summarize(&table, &AggregationConfig::default(), &mut Diagnostics::new())
        .unwrap_err();
    assert!(err.is_schema());
}

#[test]
fn test_missing_group_column_is_schema_error() {
    let config = AggregationConfig::default().with_group_by(["client"]);
    let mut engine = AggregationEngine::new();
    let err = engine
        .summarize(&timesheet(), &config, &mut Diagnostics::new())
        .unwrap_err();

    assert!(err.is_schema());
    assert!(err.to_string().contains("client"));
    assert!(engine.last_summaries().is_none());
}

#[test]
fn test_absent_metric_column_is_warned() {
    let config = AggregationConfig::default()
        .with_metric("hours", &[AggFunc::Sum])
        .with_metric("cost", &[AggFunc::Sum]);
    let mut diagnostics = Diagnostics::new();
    let summaries = AggregationEngine::new()
        .summarize(&timesheet(), &config, &mut diagnostics)
        .unwrap();

    assert_eq!(diagnostics.warning_count(), 1);
    assert!(summaries.weekly_totals.has_column("hours"));
    assert!(!summaries.weekly_totals.has_column("cost"));
}

// =============================================================================
// Weekly totals and daily breakdown
// =============================================================================

#[test]
fn test_weekly_totals_without_metrics_counts_rows() {
    let summaries = summarize(&timesheet(), &AggregationConfig::default());
    let weekly = &summaries.weekly_totals;

    assert_eq!(
        weekly.column_names(),
        &["week_start", "count", "week_number", "year"]
    );
    assert_eq!(column(weekly, "week_start"), vec![date(2024, 1, 1), date(2024, 1, 8)]);
    assert_eq!(column(weekly, "count"), vec![Value::Number(3.0), Value::Number(3.0)]);
    assert_eq!(column(weekly, "week_number"), vec![Value::Number(1.0), Value::Number(2.0)]);
    assert_eq!(column(weekly, "year"), vec![Value::Number(2024.0), Value::Number(2024.0)]);
}

#[test]
fn test_multiple_functions_get_suffixed_names() {
    let config = AggregationConfig::default().with_metric("hours", &[AggFunc::Sum, AggFunc::Max]);
    let summaries = summarize(&timesheet(), &config);

    let weekly = &summaries.weekly_totals;
    assert_eq!(column(weekly, "hours_sum"), vec![Value::Number(100.0), Value::Number(3.0)]);
    assert_eq!(column(weekly, "hours_max"), vec![Value::Number(70.0), Value::Number(1.0)]);

    // Daily breakdown keeps only the first function, under the bare name.
    let daily = &summaries.daily_breakdown;
    assert_eq!(daily.column_names(), &["date", "day_of_week", "hours"]);
    assert_eq!(daily.row_count(), 5);
    assert_eq!(daily.get_by_name(0, "day_of_week"), Some(&Value::text("Monday")));
    assert_eq!(daily.get_by_name(1, "hours"), Some(&Value::Number(90.0)));
}

#[test]
fn test_custom_week_start() {
    let config = AggregationConfig::default().with_week_start(Weekday::Sun);
    let summaries = summarize(&timesheet(), &config);

    // 2024-01-01 falls in the week starting Sunday 2023-12-31.
    assert_eq!(
        column(&summaries.weekly_totals, "week_start"),
        vec![date(2023, 12, 31), date(2024, 1, 7)]
    );
}

#[test]
fn test_unparseable_dates_are_left_out_of_weeks() {
    let mut table = timesheet();
    table.set(0, 0, Value::text("not a date"));
    let mut diagnostics = Diagnostics::new();
    let summaries = AggregationEngine::new()
        .summarize(&table, &AggregationConfig::default(), &mut diagnostics)
        .unwrap();

    assert_eq!(
        column(&summaries.weekly_totals, "count"),
        vec![Value::Number(2.0), Value::Number(3.0)]
    );
    assert_eq!(diagnostics.warning_count(), 1);
}

// =============================================================================
// Percentages
// =============================================================================

#[test]
fn test_percentages_sum_to_hundred_per_week() {
    let config = AggregationConfig::default()
        .with_group_by(["category"])
        .with_metric("hours", &[AggFunc::Sum]);
    let summaries = summarize(&timesheet(), &config);
    let by_category = summaries.get(BY_CATEGORY).unwrap();

    assert_eq!(
        by_category.column_names(),
        &["week_start", "category", "hours", "hours_percentage"]
    );
    assert_eq!(
        column(by_category, "hours_percentage"),
        vec![
            Value::Number(30.0),
            Value::Number(70.0),
            Value::Number(33.33),
            Value::Number(33.33),
            Value::Number(33.33),
        ]
    );

    let mut totals = std::collections::BTreeMap::new();
    for row in by_category.rows() {
        *totals.entry(row[0].clone()).or_insert(0.0) += row[3].as_f64().unwrap();
    }
    for total in totals.values() {
        assert!((total - 100.0).abs() < 0.05, "week total {}", total);
    }
}

#[test]
fn test_percentages_disabled() {
    let config = AggregationConfig::default()
        .with_group_by(["category"])
        .with_percentages(false);
    let summaries = summarize(&timesheet(), &config);

    let by_category = summaries.by_category.unwrap();
    assert_eq!(by_category.column_names(), &["week_start", "category", "count"]);
}

#[test]
fn test_zero_week_total_leaves_percentage_missing() {
    let mut table = timesheet();
    for row in 0..3 {
        table.set(row, 2, Value::Number(0.0));
    }
    let config = AggregationConfig::default()
        .with_group_by(["category"])
        .with_metric("hours", &[AggFunc::Sum]);
    let summaries = summarize(&table, &config);
    let by_category = summaries.by_category.unwrap();

    assert_eq!(by_category.get_by_name(0, "hours_percentage"), Some(&Value::Missing));
    assert_eq!(by_category.get_by_name(1, "hours_percentage"), Some(&Value::Missing));
}

// =============================================================================
// Trends
// =============================================================================

#[test]
fn test_trend_changes_and_directions() {
    let config = AggregationConfig::default().with_metric("hours", &[AggFunc::Sum]);
    let summaries = summarize(&weekly(&[100.0, 150.0, 150.0, 75.0]), &config);
    let trends = summaries.get(TRENDS).unwrap();

    assert_eq!(
        column(trends, "hours_change"),
        vec![
            Value::Missing,
            Value::Number(50.0),
            Value::Number(0.0),
            Value::Number(-75.0)
        ]
    );
    assert_eq!(
        column(trends, "hours_pct_change"),
        vec![
            Value::Missing,
            Value::Number(50.0),
            Value::Number(0.0),
            Value::Number(-50.0)
        ]
    );
    assert_eq!(
        column(trends, "hours_trend"),
        vec![
            Value::Missing,
            Value::text("up"),
            Value::text("flat"),
            Value::text("down")
        ]
    );
    assert!(!trends.has_column("week_number_change"));
    assert!(!trends.has_column("year_trend"));
}

#[test]
fn test_decline_is_down() {
    let config = AggregationConfig::default().with_metric("hours", &[AggFunc::Sum]);
    let summaries = summarize(&weekly(&[100.0, 80.0]), &config);
    let trends = summaries.trends.unwrap();

    assert_eq!(trends.get_by_name(1, "hours_change"), Some(&Value::Number(-20.0)));
    assert_eq!(trends.get_by_name(1, "hours_trend"), Some(&Value::text("down")));
}

#[test]
fn test_pct_change_from_zero_is_missing() {
    let config = AggregationConfig::default().with_metric("hours", &[AggFunc::Sum]);
    let summaries = summarize(&weekly(&[0.0, 10.0]), &config);
    let trends = summaries.trends.unwrap();

    assert_eq!(trends.get_by_name(1, "hours_change"), Some(&Value::Number(10.0)));
    assert_eq!(trends.get_by_name(1, "hours_pct_change"), Some(&Value::Missing));
    assert_eq!(trends.get_by_name(1, "hours_trend"), Some(&Value::text("up")));
}

#[test]
fn test_trends_disabled() {
    let config = AggregationConfig::default().with_trends(false);
    let summaries = summarize(&timesheet(), &config);
    assert!(summaries.trends.is_none());
    assert!(!summaries.names().contains(&TRENDS));
}

// =============================================================================
// Statistics
// =============================================================================

#[test]
fn test_statistics_for_numeric_columns() {
    let values = (1..=5).map(|v| Value::Number(f64::from(v))).collect();
    let dates = (1..=5).map(|d| date(2024, 1, d)).collect();
    let table = Table::from_columns(vec![("date", dates), ("value", values)]).unwrap();

    let summaries = summarize(&table, &AggregationConfig::default());
    let stats = &summaries.statistics;

    assert_eq!(stats.row_count(), 1);
    assert_eq!(stats.get_by_name(0, "column"), Some(&Value::text("value")));
    assert_eq!(stats.get_by_name(0, "count"), Some(&Value::Number(5.0)));
    assert_eq!(stats.get_by_name(0, "mean"), Some(&Value::Number(3.0)));
    assert_eq!(stats.get_by_name(0, "median"), Some(&Value::Number(3.0)));
    assert_eq!(stats.get_by_name(0, "min"), Some(&Value::Number(1.0)));
    assert_eq!(stats.get_by_name(0, "max"), Some(&Value::Number(5.0)));
    let std = stats.get_by_name(0, "std").and_then(Value::as_f64).unwrap();
    assert!((std - 2.5_f64.sqrt()).abs() < 1e-12);
}

#[test]
fn test_empty_table_yields_empty_summaries() {
    let table = Table::with_columns(["date", "project", "hours"]).unwrap();
    let config = AggregationConfig::default()
        .with_group_by(["project"])
        .with_metric("hours", &[AggFunc::Sum]);
    let summaries = summarize(&table, &config);

    assert!(summaries.statistics.is_empty());
    assert_eq!(summaries.statistics.column_count(), 7);
    assert!(summaries.weekly_totals.is_empty());
    assert!(summaries.trends.unwrap().is_empty());
    assert!(summaries.by_category.unwrap().is_empty());
}

#[test]
fn test_group_by_column_used_as_metric_is_config_error() {
    let table = Table::from_columns(vec![
        ("date", vec![date(2024, 1, 1), date(2024, 1, 2)]),
        ("hours", vec![Value::Number(1.0), Value::Number(2.0)]),
    ])
    .unwrap();
    let config = AggregationConfig::default()
        .with_group_by(["hours"])
        .with_metric("hours", &[AggFunc::Sum]);

    let mut engine = AggregationEngine::new();
    let err = engine
        .summarize(&table, &config, &mut Diagnostics::new())
        .unwrap_err();

    assert!(err.is_config());
    assert!(engine.last_summaries().is_none());
}

// =============================================================================
// Top items
// =============================================================================

#[test]
fn test_top_items_by_count() {
    let dates = (0..6).map(|_| date(2024, 1, 3)).collect();
    let categories = ["a", "a", "a", "b", "b", "c"]
        .iter()
        .map(|&c| Value::text(c))
        .collect();
    let table = Table::from_columns(vec![("date", dates), ("category", categories)]).unwrap();
    let config = AggregationConfig::default()
        .with_group_by(["category"])
        .with_top_n(2);

    let summaries = summarize(&table, &config);
    let top = summaries.top_item("top_category").unwrap();

    assert_eq!(top.column_names(), &["category", "count"]);
    assert_eq!(
        top.rows(),
        &[
            vec![Value::text("a"), Value::Number(3.0)],
            vec![Value::text("b"), Value::Number(2.0)],
        ]
    );
    assert!(summaries.names().contains(&TOP_ITEMS));
}

#[test]
fn test_top_items_by_metric() {
    let config = AggregationConfig::default()
        .with_group_by(["category"])
        .with_metric("hours", &[AggFunc::Sum, AggFunc::Max]);
    let summaries = summarize(&timesheet(), &config);
    let top = summaries.top_item("top_category_by_hours").unwrap();

    assert_eq!(top.column_names(), &["category", "hours"]);
    assert_eq!(
        top.rows(),
        &[
            vec![Value::text("b"), Value::Number(71.0)],
            vec![Value::text("a"), Value::Number(31.0)],
            vec![Value::text("c"), Value::Number(1.0)],
        ]
    );
}

#[test]
fn test_top_items_skip_unrankable_functions() {
    let config = AggregationConfig::default()
        .with_group_by(["category"])
        .with_metric("hours", &[AggFunc::Max, AggFunc::Sum]);
    let summaries = summarize(&timesheet(), &config);

    assert!(summaries.top_items.unwrap().is_empty());
}

#[test]
fn test_last_summaries_cached() {
    let mut engine = AggregationEngine::new();
    let summaries = engine
        .summarize(&timesheet(), &AggregationConfig::default(), &mut Diagnostics::new())
        .unwrap();
    assert_eq!(engine.last_summaries(), Some(&summaries));
}
