//! Diagnostics sinks for observing pipeline runs.
//!
//! Engines never log through global state. Each call receives a
//! [`DiagnosticsSink`] and reports what it did (and what it skipped) there.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Severity level of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Progress information.
    Info,
    /// Soft degradation: something was skipped or coerced to missing.
    Warning,
}

impl Severity {
    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Info => "Info",
            Severity::Warning => "Warning",
        }
    }
}

/// A single event reported by an engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// How serious the event is.
    pub severity: Severity,
    /// Operation that produced the event (e.g. `drop_duplicates`).
    pub operation: String,
    /// Human-readable message.
    pub message: String,
}

impl Diagnostic {
    /// Create an informational diagnostic.
    pub fn info(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a warning diagnostic.
    pub fn warning(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            operation: operation.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.severity.label(),
            self.operation,
            self.message
        )
    }
}

/// Receiver for diagnostics emitted during a call.
pub trait DiagnosticsSink {
    /// Record one diagnostic.
    fn record(&mut self, diagnostic: Diagnostic);

    /// Record an informational event.
    fn info(&mut self, operation: &str, message: String) {
        self.record(Diagnostic::info(operation, message));
    }

    /// Record a soft-degradation event.
    fn warn(&mut self, operation: &str, message: String) {
        self.record(Diagnostic::warning(operation, message));
    }
}

/// In-memory accumulator of diagnostics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded diagnostics in order.
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    /// Iterate over warnings only.
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    /// Number of warnings recorded.
    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    /// Diagnostics emitted by a given operation.
    pub fn for_operation<'a>(&'a self, operation: &'a str) -> impl Iterator<Item = &'a Diagnostic> {
        self.entries.iter().filter(move |d| d.operation == operation)
    }

    /// Returns true if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DiagnosticsSink for Diagnostics {
    fn record(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }
}

/// Sink that forwards every diagnostic to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn record(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Info => {
                tracing::info!(operation = %diagnostic.operation, "{}", diagnostic.message)
            }
            Severity::Warning => {
                tracing::warn!(operation = %diagnostic.operation, "{}", diagnostic.message)
            }
        }
    }
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticsSink for NullSink {
    fn record(&mut self, _diagnostic: Diagnostic) {}
}

impl<S: DiagnosticsSink + ?Sized> DiagnosticsSink for &mut S {
    fn record(&mut self, diagnostic: Diagnostic) {
        (**self).record(diagnostic);
    }
}
