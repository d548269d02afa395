//! Application layer: use cases and services.
//!
//! Orchestrates the domain pipeline with the report port.

mod prediction;

pub use prediction::{Assessment, PredictionService, Report};
