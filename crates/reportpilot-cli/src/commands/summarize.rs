//! Summarize command - compute weekly summaries for an already-clean file.

use std::path::PathBuf;

use colored::Colorize;
use reportpilot::Pipeline;

use super::{CommandSink, ensure_exists, print_warnings, sibling_path};
use crate::input::{load_config, load_table};
use crate::output::write_json;

pub fn run(
    file: PathBuf,
    config: Option<PathBuf>,
    output: Option<PathBuf>,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    ensure_exists(&file)?;
    let config = load_config(config.as_deref())?;

    println!(
        "{} {}",
        "Summarizing".cyan().bold(),
        file.display().to_string().white()
    );

    let loaded = load_table(&file)?;
    let mut pipeline = Pipeline::with_config(config);
    let mut sink = CommandSink::default();
    let summaries = pipeline.summarize(&loaded.table, &mut sink)?;

    println!(
        "Generated {} summaries over {} weeks",
        summaries.len().to_string().white().bold(),
        summaries.weekly_totals.row_count().to_string().white().bold()
    );

    if verbose {
        println!();
        println!("{}", "Summaries:".yellow().bold());
        for name in summaries.names() {
            match summaries.get(name) {
                Some(table) => println!(
                    "  {:20} {:>6} rows {:>4} columns",
                    name,
                    table.row_count(),
                    table.column_count()
                ),
                None => {
                    let count = summaries.top_items.as_ref().map_or(0, |items| items.len());
                    println!("  {:20} {:>6} rankings", name, count);
                }
            }
        }
    }
    print_warnings(&sink.diagnostics);

    let output_path = output.unwrap_or_else(|| sibling_path(&file, ".summary.json"));
    write_json(&summaries, &output_path)?;

    println!();
    println!(
        "{} {}",
        "Saved to".green().bold(),
        output_path.display().to_string().white()
    );

    Ok(())
}
