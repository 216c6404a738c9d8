//! Configuration for the cleaning and aggregation stages.

mod aggregation;
mod cleaning;

pub use aggregation::{AggFunc, AggregationConfig};
pub use cleaning::{CleaningConfig, Comparator, CustomRule, FillStrategy, RuleValue};

use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};

/// Configuration for a full pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Cleaning stage options.
    pub cleaning: CleaningConfig,
    /// Aggregation stage options.
    pub aggregation: AggregationConfig,
}

impl PipelineConfig {
    /// Parse a configuration from JSON text.
    ///
    /// Shape errors (unknown functions, comparators, wrong value types) are
    /// reported as configuration errors.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: PipelineConfig = serde_json::from_str(json)
            .map_err(|e| ReportError::Config(format!("Invalid pipeline configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration as pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate both stage configurations.
    pub fn validate(&self) -> Result<()> {
        self.cleaning.validate()?;
        self.aggregation.validate()
    }
}
