//! Example: Clean and summarize a small timesheet in memory.
//!
//! Usage:
//!   cargo run --example weekly_report

use reportpilot::{
    AggFunc, AggregationConfig, CleaningConfig, Comparator, CustomRule, Diagnostics,
    FillStrategy, Pipeline, PipelineConfig, RuleValue, Table, Value,
};

fn main() -> reportpilot::Result<()> {
    let rows = [
        ("2024-03-04", "design ", 6.0),
        ("2024-03-05", "build", 7.5),
        ("2024-03-05", "build", 7.5),
        ("2024-03-07", "review", -1.0),
        ("2024-03-11", "build", 8.0),
        ("2024-03-12", "design", 3.0),
        ("2024-03-14", "review", 2.5),
    ];
    let rows = rows
        .iter()
        .map(|&(date, activity, hours)| {
            vec![Value::text(date), Value::text(activity), Value::Number(hours)]
        })
        .collect();
    let table = Table::new(
        vec!["date".to_string(), "activity".to_string(), "hours".to_string()],
        rows,
    )?;

    let config = PipelineConfig {
        cleaning: CleaningConfig::default()
            .with_date_columns(["date"])
            .with_fill_missing(FillStrategy::Zero)
            .with_rule(CustomRule::new("hours", Comparator::Ge, RuleValue::Number(0.0))),
        aggregation: AggregationConfig::new("date")
            .with_group_by(["activity"])
            .with_metric("hours", &[AggFunc::Sum, AggFunc::Mean]),
    };

    let mut diagnostics = Diagnostics::new();
    let output = Pipeline::with_config(config).run(table, &mut diagnostics)?;

    let separator = "=".repeat(60);
    println!("{}", separator);
    println!("Weekly report");
    println!("{}", separator);
    println!();

    println!("## Cleaning");
    println!(
        "  Rows: {} -> {}",
        output.report.original_rows, output.report.final_rows
    );
    for op in &output.report.operations {
        println!("  {:35} removed={} changed={}", op.operation, op.rows_removed, op.values_changed);
    }
    println!();

    for name in output.summaries.names() {
        let Some(summary) = output.summaries.get(name) else {
            continue;
        };
        println!("## {}", name);
        println!("  {}", summary.column_names().join(" | "));
        for row in summary.rows() {
            let cells: Vec<String> = row.iter().map(ToString::to_string).collect();
            println!("  {}", cells.join(" | "));
        }
        println!();
    }

    if let Some(items) = output.summaries.top_items.as_ref() {
        for (key, ranking) in items {
            println!("## {}", key);
            for row in ranking.rows() {
                println!("  {} = {}", row[0], row[1]);
            }
        }
        println!();
    }

    println!("## Diagnostics");
    for diagnostic in diagnostics.entries() {
        println!("  {}", diagnostic);
    }

    Ok(())
}
