//! Clinical record captured from the assessment form.
//!
//! The record holds raw, unencoded measurements exactly as entered. It is the
//! snapshot that flows into the feature encoder and, unchanged, into the report.

use serde::{Deserialize, Serialize};

/// Inclusive bounds enforced at the capture boundary.
pub mod bounds {
    use std::ops::RangeInclusive;

    pub const AGE: RangeInclusive<u16> = 20..=90;
    pub const RESTING_BP: RangeInclusive<u16> = 80..=200;
    pub const CHOLESTEROL: RangeInclusive<u16> = 100..=600;
    pub const MAX_HEART_RATE: RangeInclusive<u16> = 50..=220;
    pub const OXYGEN_STRESS: RangeInclusive<f64> = 0.0..=10.0;
}

/// Biological sex as collected by the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    Female,
    Male,
}

impl Sex {
    pub const ALL: [Sex; 2] = [Sex::Female, Sex::Male];

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Female => "Female",
            Self::Male => "Male",
        }
    }
}

impl std::fmt::Display for Sex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Chest pain presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChestPainType {
    Typical,
    Atypical,
    NonCardiac,
}

impl ChestPainType {
    /// Form order: typical first, matching the original selection list.
    pub const ALL: [ChestPainType; 3] = [
        ChestPainType::Typical,
        ChestPainType::Atypical,
        ChestPainType::NonCardiac,
    ];

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Typical => "Typical Chest Pain",
            Self::Atypical => "Atypical Chest Pain",
            Self::NonCardiac => "Non-Cardiac Chest Pain",
        }
    }
}

impl std::fmt::Display for ChestPainType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Immutable snapshot of the measurements for one prediction request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClinicalRecord {
    /// Age in years (20-90)
    pub age: u16,

    /// Resting blood pressure in mmHg (80-200)
    pub resting_bp: u16,

    /// Serum cholesterol in mg/dL (100-600)
    pub cholesterol: u16,

    /// Maximum heart rate achieved (50-220)
    pub max_heart_rate: u16,

    /// Heart oxygen stress score, ST depression (0.0-10.0)
    pub oxygen_stress: f64,

    pub sex: Sex,

    pub chest_pain: ChestPainType,

    /// Chest pain during exercise
    pub exercise_angina: bool,
}

impl Default for ClinicalRecord {
    /// Values pre-filled in the assessment form.
    fn default() -> Self {
        Self {
            age: 45,
            resting_bp: 130,
            cholesterol: 240,
            max_heart_rate: 150,
            oxygen_stress: 1.0,
            sex: Sex::Female,
            chest_pain: ChestPainType::Typical,
            exercise_angina: false,
        }
    }
}

impl ClinicalRecord {
    /// Check every field against the capture-boundary bounds.
    ///
    /// The scoring core never calls this; it assumes valid ranges.
    ///
    /// # Errors
    /// Returns one message per out-of-range field.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        let integer_fields = [
            ("Age", self.age, bounds::AGE),
            ("Resting BP", self.resting_bp, bounds::RESTING_BP),
            ("Cholesterol", self.cholesterol, bounds::CHOLESTEROL),
            ("Max Heart Rate", self.max_heart_rate, bounds::MAX_HEART_RATE),
        ];
        for (label, value, range) in integer_fields {
            if !range.contains(&value) {
                errors.push(format!(
                    "{label} {value} out of range [{}, {}]",
                    range.start(),
                    range.end()
                ));
            }
        }

        if !bounds::OXYGEN_STRESS.contains(&self.oxygen_stress) {
            errors.push(format!(
                "Oxygen stress score {} out of range [{}, {}]",
                self.oxygen_stress,
                bounds::OXYGEN_STRESS.start(),
                bounds::OXYGEN_STRESS.end()
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// "Yes"/"No" rendering of the angina flag.
    #[must_use]
    pub fn exercise_angina_label(&self) -> &'static str {
        if self.exercise_angina {
            "Yes"
        } else {
            "No"
        }
    }

    /// Oxygen stress score with at least one decimal place ("1.0", "2.35").
    #[must_use]
    pub fn oxygen_stress_label(&self) -> String {
        if self.oxygen_stress.fract() == 0.0 {
            format!("{:.1}", self.oxygen_stress)
        } else {
            format!("{}", self.oxygen_stress)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_record_is_valid() {
        assert!(ClinicalRecord::default().validate().is_ok());
    }

    #[test]
    fn test_validation_reports_each_field() {
        let record = ClinicalRecord {
            age: 19,
            resting_bp: 201,
            cholesterol: 99,
            max_heart_rate: 221,
            oxygen_stress: 10.5,
            ..ClinicalRecord::default()
        };

        let errors = record.validate().expect_err("all numeric fields are out of range");
        assert_eq!(errors.len(), 5);
        assert!(errors[0].starts_with("Age 19"));
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let low = ClinicalRecord {
            age: 20,
            resting_bp: 80,
            cholesterol: 100,
            max_heart_rate: 50,
            oxygen_stress: 0.0,
            ..ClinicalRecord::default()
        };
        let high = ClinicalRecord {
            age: 90,
            resting_bp: 200,
            cholesterol: 600,
            max_heart_rate: 220,
            oxygen_stress: 10.0,
            ..ClinicalRecord::default()
        };
        assert!(low.validate().is_ok());
        assert!(high.validate().is_ok());
    }

    #[test]
    fn test_labels() {
        let record = ClinicalRecord {
            oxygen_stress: 2.35,
            exercise_angina: true,
            ..ClinicalRecord::default()
        };
        assert_eq!(record.oxygen_stress_label(), "2.35");
        assert_eq!(ClinicalRecord::default().oxygen_stress_label(), "1.0");
        assert_eq!(record.exercise_angina_label(), "Yes");
        assert_eq!(ChestPainType::NonCardiac.to_string(), "Non-Cardiac Chest Pain");
        assert_eq!(Sex::Male.to_string(), "Male");
    }
}
