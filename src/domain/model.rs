//! Pre-trained model parameters and the feature scaler.
//!
//! All types here are validated on construction and immutable afterwards, so
//! a [`ParameterStore`] can be shared read-only across the whole process.

use super::schema::{Feature, FEATURE_COUNT};

/// Errors raised when parameters cannot be used for scoring.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParameterError {
    #[error("{what}: expected 22 values, got {got}")]
    Length { what: &'static str, got: usize },

    #[error("{what}: non-finite value at index {index} ({feature})")]
    NonFinite {
        what: &'static str,
        index: usize,
        feature: &'static str,
    },

    #[error("{what}: non-finite bias")]
    NonFiniteBias { what: &'static str },

    #[error("scaler: zero scale factor at index {index} ({feature})")]
    ZeroScale { index: usize, feature: &'static str },

    #[error("{what}: decision value can overflow for inputs within the capture bounds")]
    Overflow { what: &'static str },

    #[error("{what}: decision value is not finite")]
    NonFiniteScore { what: &'static str },
}

fn to_fixed(what: &'static str, values: &[f64]) -> Result<[f64; FEATURE_COUNT], ParameterError> {
    let fixed: [f64; FEATURE_COUNT] = values.try_into().map_err(|_| ParameterError::Length {
        what,
        got: values.len(),
    })?;

    if let Some(index) = fixed.iter().position(|x| !x.is_finite()) {
        return Err(ParameterError::NonFinite {
            what,
            index,
            feature: Feature::ALL[index].name(),
        });
    }
    Ok(fixed)
}

/// A (weights, bias) pair over the feature schema.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    weights: [f64; FEATURE_COUNT],
    bias: f64,
}

impl LinearModel {
    /// # Errors
    /// Returns an error if the weight count is wrong or any value is not finite.
    pub fn new(what: &'static str, weights: &[f64], bias: f64) -> Result<Self, ParameterError> {
        let weights = to_fixed(what, weights)?;
        if !bias.is_finite() {
            return Err(ParameterError::NonFiniteBias { what });
        }
        Ok(Self { weights, bias })
    }

    #[must_use]
    pub fn weights(&self) -> &[f64; FEATURE_COUNT] {
        &self.weights
    }

    #[must_use]
    pub fn bias(&self) -> f64 {
        self.bias
    }

    /// `dot(x, w) + b`
    #[must_use]
    pub fn decision(&self, x: &[f64; FEATURE_COUNT]) -> f64 {
        self.weights
            .iter()
            .zip(x.iter())
            .map(|(w, v)| w * v)
            .sum::<f64>()
            + self.bias
    }

    /// Upper bound of `|decision|` over every encodable record after scaling.
    #[must_use]
    pub fn decision_bound(&self, scaler: &ScalingParameters) -> f64 {
        let mut bound = self.bias.abs();
        for (i, feature) in Feature::ALL.iter().enumerate() {
            let (lo, hi) = feature.capture_range();
            let c = scaler.center[i];
            let reach = (lo - c).abs().max((hi - c).abs()) / scaler.scale[i].abs();
            bound += self.weights[i].abs() * reach;
        }
        bound
    }
}

/// Logistic regression and linear SVM parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelParameters {
    pub logistic: LinearModel,
    pub svm: LinearModel,
}

/// Per-feature affine transform fitted at training time.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalingParameters {
    center: [f64; FEATURE_COUNT],
    scale: [f64; FEATURE_COUNT],
}

impl ScalingParameters {
    /// # Errors
    /// Returns an error on wrong lengths, non-finite values, or any zero scale.
    pub fn new(center: &[f64], scale: &[f64]) -> Result<Self, ParameterError> {
        let center = to_fixed("scaler center", center)?;
        let scale = to_fixed("scaler scale", scale)?;

        if let Some(index) = scale.iter().position(|&s| s == 0.0) {
            return Err(ParameterError::ZeroScale {
                index,
                feature: Feature::ALL[index].name(),
            });
        }

        Ok(Self { center, scale })
    }

    /// Identity transform (center 0, scale 1).
    #[must_use]
    pub fn identity() -> Self {
        Self {
            center: [0.0; FEATURE_COUNT],
            scale: [1.0; FEATURE_COUNT],
        }
    }

    #[must_use]
    pub fn center(&self) -> &[f64; FEATURE_COUNT] {
        &self.center
    }

    #[must_use]
    pub fn scale(&self) -> &[f64; FEATURE_COUNT] {
        &self.scale
    }
}

/// Everything the scorer needs, loaded once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterStore {
    pub model: ModelParameters,
    pub scaler: ScalingParameters,
}

impl ParameterStore {
    /// # Errors
    /// Returns `ParameterError::Overflow` if either model's decision value
    /// could leave the finite range for some record within the capture bounds.
    pub fn new(model: ModelParameters, scaler: ScalingParameters) -> Result<Self, ParameterError> {
        for (what, linear) in [("logistic", &model.logistic), ("svm", &model.svm)] {
            if !linear.decision_bound(&scaler).is_finite() {
                return Err(ParameterError::Overflow { what });
            }
        }
        Ok(Self { model, scaler })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_wrong_length() {
        let err = LinearModel::new("logistic", &[0.0; 21], 0.0).expect_err("short weights");
        assert_eq!(
            err,
            ParameterError::Length {
                what: "logistic",
                got: 21
            }
        );
    }

    #[test]
    fn test_rejects_non_finite() {
        let mut w = [0.0; FEATURE_COUNT];
        w[3] = f64::NAN;
        let err = LinearModel::new("svm", &w, 0.0).expect_err("nan weight");
        assert!(err.to_string().contains("max_heart_rate"));

        let err = LinearModel::new("svm", &[0.0; FEATURE_COUNT], f64::INFINITY)
            .expect_err("infinite bias");
        assert_eq!(err, ParameterError::NonFiniteBias { what: "svm" });
    }

    #[test]
    fn test_zero_scale_is_fatal() {
        let mut scale = [1.0; FEATURE_COUNT];
        scale[5] = 0.0;
        let err = ScalingParameters::new(&[0.0; FEATURE_COUNT], &scale).expect_err("zero scale");
        assert_eq!(
            err,
            ParameterError::ZeroScale {
                index: 5,
                feature: "sex_male"
            }
        );
    }

    #[test]
    fn test_decision() {
        let mut w = [0.0; FEATURE_COUNT];
        w[0] = 2.0;
        w[1] = -1.0;
        let model = LinearModel::new("logistic", &w, 0.5).expect("valid");
        let mut x = [0.0; FEATURE_COUNT];
        x[0] = 3.0;
        x[1] = 4.0;
        assert!((model.decision(&x) - 2.5).abs() < 1e-12);
    }

    fn opposing_extremes() -> LinearModel {
        let mut w = [0.0; FEATURE_COUNT];
        w[0] = 1e308;
        w[1] = -1e308;
        LinearModel::new("logistic", &w, 0.0).expect("every weight is finite")
    }

    #[test]
    fn test_store_rejects_overflowing_weights() {
        let svm = LinearModel::new("svm", &[0.0; FEATURE_COUNT], 0.0).expect("valid");
        let model = ModelParameters {
            logistic: opposing_extremes(),
            svm,
        };
        let err = ParameterStore::new(model, ScalingParameters::identity())
            .expect_err("overflowing decision");
        assert_eq!(err, ParameterError::Overflow { what: "logistic" });
    }

    #[test]
    fn test_tiny_scale_can_overflow() {
        let mut scale = [1.0; FEATURE_COUNT];
        scale[2] = 1e-307;
        let scaler = ScalingParameters::new(&[0.0; FEATURE_COUNT], &scale).expect("non-zero");
        let mut w = [0.0; FEATURE_COUNT];
        w[2] = 1e3;
        let model = ModelParameters {
            logistic: LinearModel::new("logistic", &[0.0; FEATURE_COUNT], 0.0).expect("valid"),
            svm: LinearModel::new("svm", &w, 0.0).expect("valid"),
        };
        // A zero weight does not help: 0 * inf is NaN in the scorer as well.
        let err = ParameterStore::new(model, scaler).expect_err("overflowing decision");
        assert_eq!(err, ParameterError::Overflow { what: "logistic" });
    }

    #[test]
    fn test_decision_bound_covers_capture_box() {
        let store = fixtures::store();
        let bound = store.model.logistic.decision_bound(&store.scaler);
        assert!(bound.is_finite());
        let mut x = [0.0; FEATURE_COUNT];
        for (i, feature) in Feature::ALL.iter().enumerate() {
            x[i] = (feature.capture_range().1 - store.scaler.center()[i]) / store.scaler.scale()[i];
        }
        assert!(store.model.logistic.decision(&x).abs() <= bound);
    }

    #[test]
    fn test_fixture_is_valid() {
        let store = fixtures::store();
        assert_eq!(store.scaler.center()[0], 54.0);
    }
}
