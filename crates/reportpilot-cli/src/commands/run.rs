//! Run command - clean, summarize and print a digest.

use std::path::PathBuf;

use colored::Colorize;
use reportpilot::Pipeline;

use super::{CommandSink, ensure_exists, print_report, print_warnings};
use crate::input::{load_config, load_table};
use crate::output::{render_digest, write_json};

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
        "Processing".cyan().bold(),
        file.display().to_string().white()
    );

    let loaded = load_table(&file)?;
    let mut pipeline = Pipeline::with_config(config);
    let mut sink = CommandSink::default();
    let result = pipeline.run(loaded.table, &mut sink)?;

    print_report(&result.report, verbose);
    print_warnings(&sink.diagnostics);
    println!();
    println!("{}", render_digest(&result.summaries));

    if let Some(output_path) = output {
        write_json(&result, &output_path)?;
        println!();
        println!(
            "{} {}",
            "Saved to".green().bold(),
            output_path.display().to_string().white()
        );
    }

    Ok(())
}
