//! CLI command implementations.

pub mod clean;
pub mod run;
pub mod summarize;

use std::path::{Path, PathBuf};

use colored::Colorize;
use reportpilot::{CleaningReport, Diagnostic, Diagnostics, DiagnosticsSink, TracingSink};

/// Sink that keeps diagnostics for the command summary and also logs them.
#[derive(Debug, Default)]
pub struct CommandSink {
    pub diagnostics: Diagnostics,
}

impl DiagnosticsSink for CommandSink {
    fn record(&mut self, diagnostic: Diagnostic) {
        TracingSink.record(diagnostic.clone());
        self.diagnostics.record(diagnostic);
    }
}

/// Fail early with a readable message if the input file is missing.
pub fn ensure_exists(file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }
    Ok(())
}

/// `<dir>/<stem><suffix>` next to the input file.
pub fn sibling_path(file: &Path, suffix: &str) -> PathBuf {
    let stem = file.file_stem().unwrap_or_default().to_string_lossy();
    file.with_file_name(format!("{}{}", stem, suffix))
}

/// Print the cleaning report; operations are listed only when verbose.
pub fn print_report(report: &CleaningReport, verbose: bool) {
    println!(
        "Cleaned {} rows to {} ({} removed)",
        report.original_rows.to_string().white().bold(),
        report.final_rows.to_string().white().bold(),
        report.rows_removed.to_string().red()
    );

    if verbose && !report.operations.is_empty() {
        println!();
        println!("{}", "Operations:".yellow().bold());
        for op in &report.operations {
            println!(
                "  {:40} {:>6} rows removed {:>6} values changed",
                op.operation, op.rows_removed, op.values_changed
            );
        }
    }
}

/// Print the warning count collected during the command.
pub fn print_warnings(diagnostics: &Diagnostics) {
    let count = diagnostics.warning_count();
    if count > 0 {
        println!(
            "{} {} warning(s); bad values were set to missing or options skipped",
            "Note:".yellow().bold(),
            count
        );
    }
}
