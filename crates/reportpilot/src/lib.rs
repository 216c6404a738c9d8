//! ReportPilot: weekly reporting pipeline for tabular records.
//!
//! A table goes through two stages: the cleaning stage validates,
//! deduplicates, coerces and filters rows, and the aggregation stage turns
//! the cleaned rows into named weekly summary tables.
//!
//! # Core Principles
//!
//! - **Pure core**: no file or network I/O; callers supply a [`Table`]
//! - **Fixed stage order**: every cleaning option has a defined position
//! - **Soft degradation**: bad cells become missing, unusable options are
//!   skipped, and both are reported to a [`DiagnosticsSink`]
//!
//! # Example
//!
//! ```
//! use reportpilot::{AggFunc, AggregationConfig, Diagnostics, Pipeline, PipelineConfig, Table, Value};
//!
//! let table = Table::from_columns(vec![
//!     ("date", vec![Value::text("2024-01-08"), Value::text("2024-01-15")]),
//!     ("hours", vec![Value::Number(6.0), Value::Number(9.0)]),
//! ])
//! .unwrap();
//!
//! let config = PipelineConfig {
//!     aggregation: AggregationConfig::new("date").with_metric("hours", &[AggFunc::Sum]),
//!     ..PipelineConfig::default()
//! };
//! let mut diagnostics = Diagnostics::new();
//! let output = Pipeline::with_config(config).run(table, &mut diagnostics).unwrap();
//!
//! assert_eq!(output.summaries.weekly_totals.row_count(), 2);
//! ```

pub mod aggregation;
pub mod cleaning;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod stats;
pub mod table;

mod pipeline;

pub use crate::pipeline::{Pipeline, PipelineOutput};
pub use aggregation::{AggregationEngine, SummarySet};
pub use cleaning::{CleaningEngine, CleaningOperation, CleaningReport};
pub use config::{
    AggFunc, AggregationConfig, CleaningConfig, Comparator, CustomRule, FillStrategy,
    PipelineConfig, RuleValue,
};
pub use diagnostics::{Diagnostic, Diagnostics, DiagnosticsSink, NullSink, Severity, TracingSink};
pub use error::{ReportError, Result};
pub use table::{ColumnType, Table, Value};
