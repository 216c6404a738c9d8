//! Cleaning stage: validation, deduplication, coercion, missing values,
//! outliers and rule-based filtering.

mod engine;
mod report;
mod rules;

pub use engine::CleaningEngine;
pub use report::{CleaningOperation, CleaningReport};
