//! Domain layer: clinical record, feature schema and the scoring core.
//!
//! Everything in here is pure: no I/O, no global state. Parameters are passed
//! in explicitly as an immutable [`ParameterStore`].

mod encoder;
mod model;
mod prediction;
mod record;
mod schema;
mod scorer;

pub use encoder::encode;
pub use model::{LinearModel, ModelParameters, ParameterError, ParameterStore, ScalingParameters};
pub use prediction::{classify, PredictionResult, RiskTier, HIGH_THRESHOLD, MODERATE_THRESHOLD};
pub use record::{bounds, ChestPainType, ClinicalRecord, Sex};
pub use schema::{
    Feature, FeatureVector, MajorVessels, RestEcg, StSlope, Thalassemia, UntrackedDefaults,
    FEATURE_COUNT, FEATURE_NAMES,
};
pub use scorer::{scale, score, sigmoid, ScaledFeatureVector, Scores, SvmSign};

#[cfg(test)]
pub(crate) use model::fixtures;
