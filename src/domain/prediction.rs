//! Risk classification of the logistic probability.

use serde::{Deserialize, Serialize};

use super::scorer::{Scores, SvmSign};

/// Lower bound (inclusive) of the moderate tier.
pub const MODERATE_THRESHOLD: f64 = 0.95;

/// Lower bound (inclusive) of the high tier.
pub const HIGH_THRESHOLD: f64 = 0.97;

/// Qualitative risk tier derived from the logistic probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskTier {
    Low,
    Moderate,
    High,
}

impl RiskTier {
    /// Half-open intervals: `[0, 0.95)`, `[0.95, 0.97)`, `[0.97, 1]`.
    #[must_use]
    pub fn from_probability(prob: f64) -> Self {
        if prob < MODERATE_THRESHOLD {
            Self::Low
        } else if prob < HIGH_THRESHOLD {
            Self::Moderate
        } else {
            Self::High
        }
    }

    /// Label shown for the logistic model output.
    #[must_use]
    pub fn model_label(&self) -> &'static str {
        match self {
            Self::Low => "Low Risk",
            Self::Moderate => "Moderate Risk",
            Self::High => "High Risk",
        }
    }

    /// Recommendation text for this tier.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Low => {
                "Maintain healthy lifestyle, diet, and regular exercise. Routine checkups recommended."
            }
            Self::Moderate => {
                "Monitor blood pressure and cholesterol. Consider lifestyle modifications and annual checkups."
            }
            Self::High => {
                "Consult a cardiologist. Follow prescribed tests and dietary guidance. Immediate medical attention may be required."
            }
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Moderate => write!(f, "Moderate"),
            Self::High => write!(f, "High"),
        }
    }
}

/// Map a logistic probability to its tier and advice.
#[must_use]
pub fn classify(prob: f64) -> (RiskTier, &'static str) {
    let tier = RiskTier::from_probability(prob);
    (tier, tier.advice())
}

/// Outcome of one prediction request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionResult {
    /// Logistic probability in [0, 1]
    pub logistic_probability: f64,

    pub svm_sign: SvmSign,

    pub risk_tier: RiskTier,

    pub advice: &'static str,
}

impl PredictionResult {
    #[must_use]
    pub fn from_scores(scores: Scores) -> Self {
        let (risk_tier, advice) = classify(scores.logistic_probability);
        Self {
            logistic_probability: scores.logistic_probability,
            svm_sign: scores.svm_sign,
            risk_tier,
            advice,
        }
    }

    /// "Low Risk" / "Moderate Risk" / "High Risk"
    #[must_use]
    pub fn logistic_label(&self) -> &'static str {
        self.risk_tier.model_label()
    }

    /// "Heart Disease" / "No Heart Disease"
    #[must_use]
    pub fn svm_label(&self) -> &'static str {
        self.svm_sign.label()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(classify(0.94).0, RiskTier::Low);
        assert_eq!(classify(0.95).0, RiskTier::Moderate);
        assert_eq!(classify(0.969999).0, RiskTier::Moderate);
        assert_eq!(classify(0.97).0, RiskTier::High);
        assert_eq!(classify(0.0).0, RiskTier::Low);
        assert_eq!(classify(1.0).0, RiskTier::High);
    }

    #[test]
    fn test_advice_is_keyed_by_tier() {
        assert!(classify(0.2).1.starts_with("Maintain healthy lifestyle"));
        assert!(classify(0.955).1.starts_with("Monitor blood pressure"));
        assert!(classify(0.99).1.starts_with("Consult a cardiologist"));
    }

    #[test]
    fn test_result_labels() {
        let result = PredictionResult::from_scores(Scores {
            logistic_probability: 0.96,
            svm_sign: SvmSign::Positive,
        });
        assert_eq!(result.risk_tier, RiskTier::Moderate);
        assert_eq!(result.logistic_label(), "Moderate Risk");
        assert_eq!(result.svm_label(), "Heart Disease");
        assert_eq!(result.advice, RiskTier::Moderate.advice());
    }
}
