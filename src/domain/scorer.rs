//! Scorer: scaling, logistic probability and SVM sign.
//!
//! Pure and deterministic. Zero scale factors are rejected when
//! [`ScalingParameters`] is built, so scaling here never divides by zero.
//! A decision value that is not finite is an error, never a probability.

use serde::{Deserialize, Serialize};

use super::model::{ModelParameters, ParameterError, ScalingParameters};
use super::schema::{FeatureVector, FEATURE_COUNT};

/// Feature vector after the per-feature affine transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaledFeatureVector([f64; FEATURE_COUNT]);

impl ScaledFeatureVector {
    #[must_use]
    pub fn as_array(&self) -> &[f64; FEATURE_COUNT] {
        &self.0
    }
}

/// Sign of the SVM decision value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SvmSign {
    Negative,
    /// Decision value exactly zero
    Zero,
    Positive,
}

impl SvmSign {
    #[must_use]
    pub fn from_decision(z: f64) -> Self {
        if z > 0.0 {
            Self::Positive
        } else if z < 0.0 {
            Self::Negative
        } else {
            Self::Zero
        }
    }

    /// -1, 0 or +1.
    #[must_use]
    pub fn as_i8(&self) -> i8 {
        match self {
            Self::Negative => -1,
            Self::Zero => 0,
            Self::Positive => 1,
        }
    }

    /// Only a strictly positive sign means heart disease; zero does not.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Positive => "Heart Disease",
            Self::Zero | Self::Negative => "No Heart Disease",
        }
    }
}

/// Raw outputs of both models for one request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    pub logistic_probability: f64,
    pub svm_sign: SvmSign,
}

/// `scaled[i] = (features[i] - center[i]) / scale[i]`
#[must_use]
pub fn scale(features: &FeatureVector, scaler: &ScalingParameters) -> ScaledFeatureVector {
    let mut out = [0.0; FEATURE_COUNT];
    let center = scaler.center();
    let factor = scaler.scale();
    for (i, (slot, x)) in out.iter_mut().zip(features.as_slice()).enumerate() {
        *slot = (x - center[i]) / factor[i];
    }
    ScaledFeatureVector(out)
}

/// Logistic function, arranged so neither branch overflows.
#[must_use]
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Scale the features and evaluate both linear models.
///
/// # Errors
/// Returns `ParameterError::NonFiniteScore` if either decision value is NaN
/// or infinite.
pub fn score(
    features: &FeatureVector,
    params: &ModelParameters,
    scaler: &ScalingParameters,
) -> Result<Scores, ParameterError> {
    let scaled = scale(features, scaler);
    let x = scaled.as_array();

    let logistic_z = params.logistic.decision(x);
    let svm_z = params.svm.decision(x);

    tracing::debug!(logistic_z, svm_z, "linear scores computed");

    if !logistic_z.is_finite() {
        return Err(ParameterError::NonFiniteScore { what: "logistic" });
    }
    if !svm_z.is_finite() {
        return Err(ParameterError::NonFiniteScore { what: "svm" });
    }

    Ok(Scores {
        logistic_probability: sigmoid(logistic_z),
        svm_sign: SvmSign::from_decision(svm_z),
    })
}
