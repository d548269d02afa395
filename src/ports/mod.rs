//! Ports layer: Trait definitions for external operations.
//!
//! Following Hexagonal Architecture, these traits define the boundaries
//! between the prediction core and the outside world (model artifacts on
//! disk, document rendering).

mod parameters;
mod report;

pub use parameters::ParameterSource;
pub use report::{ReportError, ReportRenderer};
