//! Feature schema shared by the encoder, the model weights and the scaler.
//!
//! The order of [`Feature::ALL`] is the training-time column order. Weight
//! and scaler artifacts must list exactly these names in exactly this order;
//! the artifact loader rejects anything else.

use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use super::record::bounds;

/// Number of model inputs.
pub const FEATURE_COUNT: usize = 22;

/// One column of the model input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Feature {
    Age,
    RestingBp,
    Cholesterol,
    MaxHeartRate,
    OxygenStress,
    SexMale,
    ChestPainAtypical,
    ChestPainNonCardiac,
    ChestPainTypical,
    FastingBloodSugar,
    RestEcgNormal,
    RestEcgSt,
    ExerciseAngina,
    StSlopeFlat,
    StSlopeUpsloping,
    VesselsOne,
    VesselsThree,
    VesselsTwo,
    VesselsZero,
    ThalassemiaNo,
    ThalassemiaNormal,
    ThalassemiaReversible,
}

impl Feature {
    /// All features in schema order.
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::Age,
        Feature::RestingBp,
        Feature::Cholesterol,
        Feature::MaxHeartRate,
        Feature::OxygenStress,
        Feature::SexMale,
        Feature::ChestPainAtypical,
        Feature::ChestPainNonCardiac,
        Feature::ChestPainTypical,
        Feature::FastingBloodSugar,
        Feature::RestEcgNormal,
        Feature::RestEcgSt,
        Feature::ExerciseAngina,
        Feature::StSlopeFlat,
        Feature::StSlopeUpsloping,
        Feature::VesselsOne,
        Feature::VesselsThree,
        Feature::VesselsTwo,
        Feature::VesselsZero,
        Feature::ThalassemiaNo,
        Feature::ThalassemiaNormal,
        Feature::ThalassemiaReversible,
    ];

    /// Column index in the model input.
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Artifact column name.
    #[must_use]
    pub fn name(self) -> &'static str {
        FEATURE_NAMES[self.index()]
    }

    /// Smallest and largest raw value the encoder can emit for this column.
    ///
    /// Numeric columns follow the capture bounds; indicators are 0 or 1.
    #[must_use]
    pub fn capture_range(self) -> (f64, f64) {
        let int = |r: std::ops::RangeInclusive<u16>| (f64::from(*r.start()), f64::from(*r.end()));
        match self {
            Self::Age => int(bounds::AGE),
            Self::RestingBp => int(bounds::RESTING_BP),
            Self::Cholesterol => int(bounds::CHOLESTEROL),
            Self::MaxHeartRate => int(bounds::MAX_HEART_RATE),
            Self::OxygenStress => (*bounds::OXYGEN_STRESS.start(), *bounds::OXYGEN_STRESS.end()),
            _ => (0.0, 1.0),
        }
    }
}

/// Column names as they appear in `models.json` and `scaler.json`.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "age",
    "resting_blood_pressure",
    "cholesterol",
    "max_heart_rate",
    "oxygen_stress",
    "sex_male",
    "chest_pain_atypical",
    "chest_pain_non_cardiac",
    "chest_pain_typical",
    "fasting_blood_sugar",
    "rest_ecg_normal",
    "rest_ecg_st",
    "exercise_induced_angina",
    "st_slope_flat",
    "st_slope_upsloping",
    "vessels_one",
    "vessels_three",
    "vessels_two",
    "vessels_zero",
    "thalassemia_no",
    "thalassemia_normal",
    "thalassemia_reversible",
];

/// Encoded model input, unscaled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    #[must_use]
    pub fn zeros() -> Self {
        Self([0.0; FEATURE_COUNT])
    }

    #[must_use]
    pub fn from_array(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

}

impl Index<Feature> for FeatureVector {
    type Output = f64;

    fn index(&self, feature: Feature) -> &f64 {
        &self.0[feature.index()]
    }
}

impl IndexMut<Feature> for FeatureVector {
    fn index_mut(&mut self, feature: Feature) -> &mut f64 {
        &mut self.0[feature.index()]
    }
}

/// Resting electrocardiogram result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RestEcg {
    Normal,
    StTAbnormality,
    /// Reference category, encoded as all zeros
    LeftVentricularHypertrophy,
}

/// Slope of the peak exercise ST segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StSlope {
    Upsloping,
    Flat,
    /// Reference category, encoded as all zeros
    Downsloping,
}

/// Number of major vessels colored by fluoroscopy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MajorVessels {
    Zero,
    One,
    Two,
    Three,
    /// Reference category, encoded as all zeros
    Four,
}

/// Thalassemia test result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Thalassemia {
    No,
    Normal,
    Reversible,
    /// Reference category, encoded as all zeros
    Fixed,
}

/// Fixed values for the features the form does not collect.
///
/// These are the only source of the untracked-feature constants; the encoder
/// reads nothing else for those columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UntrackedDefaults {
    /// Fasting blood sugar above 120 mg/dL
    pub fasting_blood_sugar: bool,
    pub rest_ecg: RestEcg,
    pub st_slope: StSlope,
    pub major_vessels: MajorVessels,
    pub thalassemia: Thalassemia,
}

impl UntrackedDefaults {
    /// Median-patient values used for every form submission.
    pub const STANDARD: UntrackedDefaults = UntrackedDefaults {
        fasting_blood_sugar: false,
        rest_ecg: RestEcg::Normal,
        st_slope: StSlope::Upsloping,
        major_vessels: MajorVessels::Zero,
        thalassemia: Thalassemia::Normal,
    };
}

impl Default for UntrackedDefaults {
    fn default() -> Self {
        Self::STANDARD
    }
}
