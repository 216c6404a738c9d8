//! Pipeline wiring: clean, then summarize, with one configuration.

use serde::Serialize;

use crate::aggregation::{AggregationEngine, SummarySet};
use crate::cleaning::{CleaningEngine, CleaningReport};
use crate::config::PipelineConfig;
use crate::diagnostics::DiagnosticsSink;
use crate::error::Result;
use crate::table::Table;

/// Everything a pipeline run produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineOutput {
    /// The cleaned table.
    pub table: Table,
    /// What the cleaning stage did.
    pub report: CleaningReport,
    /// Summary tables computed from the cleaned table.
    pub summaries: SummarySet,
}

/// Runs the cleaning and aggregation stages in sequence.
#[derive(Debug, Default)]
pub struct Pipeline {
    config: PipelineConfig,
    cleaning: CleaningEngine,
    aggregation: AggregationEngine,
}

impl Pipeline {
    /// Create a pipeline with default configuration.
    pub fn new() -> Self {
        Self::with_config(PipelineConfig::default())
    }

    /// Create a pipeline with custom configuration.
    pub fn with_config(config: PipelineConfig) -> Self {
        Self {
            config,
            cleaning: CleaningEngine::new(),
            aggregation: AggregationEngine::new(),
        }
    }

    /// The configuration this pipeline runs with.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Clean only.
    pub fn clean(&mut self, table: Table, sink: &mut dyn DiagnosticsSink) -> Result<Table> {
        self.cleaning.clean(table, &self.config.cleaning, sink)
    }

    /// Summarize only; the table is expected to be cleaned already.
    pub fn summarize(&mut self, table: &Table, sink: &mut dyn DiagnosticsSink) -> Result<SummarySet> {
        self.aggregation
            .summarize(table, &self.config.aggregation, sink)
    }

    /// Clean a table and summarize the result.
    ///
    /// Both stage configurations are validated before any data is touched.
    pub fn run(&mut self, table: Table, sink: &mut dyn DiagnosticsSink) -> Result<PipelineOutput> {
        self.config.validate()?;

        let table = self.clean(table, sink)?;
        let report = self.cleaning.last_report().cloned().unwrap_or_default();
        let summaries = self.summarize(&table, sink)?;

        Ok(PipelineOutput {
            table,
            report,
            summaries,
        })
    }

    /// Report from the most recent cleaning run.
    pub fn last_report(&self) -> Option<&CleaningReport> {
        self.cleaning.last_report()
    }

    /// Summaries from the most recent aggregation run.
    pub fn last_summaries(&self) -> Option<&SummarySet> {
        self.aggregation.last_summaries()
    }
}
