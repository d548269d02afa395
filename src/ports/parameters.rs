//! Parameter source port: where model weights and the scaler come from.

use crate::domain::ParameterStore;

/// Loads the immutable parameter set once at startup.
///
/// Implementations must fail rather than return partially valid parameters:
/// a wrong parameter set silently produces wrong predictions.
pub trait ParameterSource {
    /// Error type for loading failures.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load and validate model and scaler parameters.
    ///
    /// # Errors
    /// Returns error if any artifact is missing, malformed, or inconsistent
    /// with the feature schema.
    fn load(&self) -> Result<ParameterStore, Self::Error>;
}
