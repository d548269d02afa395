//! # Cardioform
//!
//! Heart disease risk assessment from a short clinical form.
//!
//! Two pre-trained linear models (logistic regression and a linear SVM) score
//! a 22-feature encoding of the form. The logistic probability is mapped to a
//! risk tier with canned advice, and the result can be exported as a one-page
//! PDF report.
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Clinical record, feature schema, scorer and risk tiers
//! - `ports`: Trait definitions for parameter loading and report rendering
//! - `adapters`: JSON artifacts, PDF writer, log sanitizer
//! - `application`: The prediction service
//! - `config`: Environment configuration
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod tui;

pub use domain::{ClinicalRecord, PredictionResult, RiskTier};

/// Result type for Cardioform operations
pub type Result<T> = std::result::Result<T, CardioformError>;

/// Main error type for Cardioform
#[derive(Debug, thiserror::Error)]
pub enum CardioformError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Model artifacts could not be loaded: {0}")]
    Artifacts(#[from] adapters::ArtifactError),

    #[error("Invalid model parameters: {0}")]
    Parameters(#[from] domain::ParameterError),

    #[error("Report generation failed: {0}")]
    Report(#[from] ports::ReportError),

    #[error("Invalid clinical record: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
