//! Clean command - clean a data file and write the cleaned table.

use std::path::{Path, PathBuf};

use colored::Colorize;
use reportpilot::Pipeline;

use super::{CommandSink, ensure_exists, print_report, print_warnings, sibling_path};
use crate::input::{file_extension, load_config, load_table};
use crate::output::write_table;

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
        "Cleaning".cyan().bold(),
        file.display().to_string().white()
    );

    let loaded = load_table(&file)?;
    let mut pipeline = Pipeline::with_config(config);
    let mut sink = CommandSink::default();
    let cleaned = pipeline.clean(loaded.table, &mut sink)?;

    if let Some(report) = pipeline.last_report() {
        print_report(report, verbose);
    }
    print_warnings(&sink.diagnostics);

    let output_path = output.unwrap_or_else(|| cleaned_path(&file, loaded.delimiter));
    write_table(&cleaned, &output_path, loaded.delimiter)?;

    println!();
    println!(
        "{} {}",
        "Saved to".green().bold(),
        output_path.display().to_string().white()
    );

    Ok(())
}

/// Default output path: `<stem>_cleaned.<ext>` next to the input.
fn cleaned_path(file: &Path, delimiter: u8) -> PathBuf {
    sibling_path(file, &format!("_cleaned.{}", file_extension(delimiter)))
}
