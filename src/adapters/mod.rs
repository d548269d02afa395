//! Adapters layer: concrete implementations of ports.
//!
//! - `artifacts`: JSON model/scaler loader with optional signed manifest
//! - `pdf`: deterministic one-page PDF report renderer
//! - `sanitize`: redaction of clinical values and secrets in log output

pub mod artifacts;
pub mod pdf;
pub mod sanitize;

pub use artifacts::{ArtifactError, IntegrityPolicy, JsonArtifactSource};
pub use pdf::PdfReportRenderer;
