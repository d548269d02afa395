//! Feature encoder: clinical record to model input.

use super::record::{ChestPainType, ClinicalRecord, Sex};
use super::schema::{
    Feature, FeatureVector, MajorVessels, RestEcg, StSlope, Thalassemia, UntrackedDefaults,
};

fn flag(on: bool) -> f64 {
    if on {
        1.0
    } else {
        0.0
    }
}

/// Encode a record into the fixed-order feature vector.
///
/// Performs no validation: ranges are enforced where the record is captured.
#[must_use]
pub fn encode(record: &ClinicalRecord, defaults: &UntrackedDefaults) -> FeatureVector {
    let mut v = FeatureVector::zeros();

    v[Feature::Age] = f64::from(record.age);
    v[Feature::RestingBp] = f64::from(record.resting_bp);
    v[Feature::Cholesterol] = f64::from(record.cholesterol);
    v[Feature::MaxHeartRate] = f64::from(record.max_heart_rate);
    v[Feature::OxygenStress] = record.oxygen_stress;

    v[Feature::SexMale] = flag(record.sex == Sex::Male);

    v[Feature::ChestPainAtypical] = flag(record.chest_pain == ChestPainType::Atypical);
    v[Feature::ChestPainNonCardiac] = flag(record.chest_pain == ChestPainType::NonCardiac);
    v[Feature::ChestPainTypical] = flag(record.chest_pain == ChestPainType::Typical);

    v[Feature::FastingBloodSugar] = flag(defaults.fasting_blood_sugar);

    v[Feature::RestEcgNormal] = flag(defaults.rest_ecg == RestEcg::Normal);
    v[Feature::RestEcgSt] = flag(defaults.rest_ecg == RestEcg::StTAbnormality);

    v[Feature::ExerciseAngina] = flag(record.exercise_angina);

    v[Feature::StSlopeFlat] = flag(defaults.st_slope == StSlope::Flat);
    v[Feature::StSlopeUpsloping] = flag(defaults.st_slope == StSlope::Upsloping);

    v[Feature::VesselsOne] = flag(defaults.major_vessels == MajorVessels::One);
    v[Feature::VesselsThree] = flag(defaults.major_vessels == MajorVessels::Three);
    v[Feature::VesselsTwo] = flag(defaults.major_vessels == MajorVessels::Two);
    v[Feature::VesselsZero] = flag(defaults.major_vessels == MajorVessels::Zero);

    v[Feature::ThalassemiaNo] = flag(defaults.thalassemia == Thalassemia::No);
    v[Feature::ThalassemiaNormal] = flag(defaults.thalassemia == Thalassemia::Normal);
    v[Feature::ThalassemiaReversible] = flag(defaults.thalassemia == Thalassemia::Reversible);

    v
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schema::FEATURE_COUNT;
    use proptest::prelude::*;

    fn golden_record() -> ClinicalRecord {
        ClinicalRecord {
            age: 45,
            resting_bp: 130,
            cholesterol: 240,
            max_heart_rate: 150,
            oxygen_stress: 1.0,
            sex: Sex::Male,
            chest_pain: ChestPainType::Typical,
            exercise_angina: false,
        }
    }

    #[test]
    fn test_encode_golden_record() {
        let v = encode(&golden_record(), &UntrackedDefaults::STANDARD);
        let expected = [
            45.0, 130.0, 240.0, 150.0, 1.0, // numeric block
            1.0, // male
            0.0, 0.0, 1.0, // chest pain: atypical, non-cardiac, typical
            0.0, // fasting blood sugar
            1.0, 0.0, // rest ecg: normal, st
            0.0, // angina
            0.0, 1.0, // slope: flat, upsloping
            0.0, 0.0, 0.0, 1.0, // vessels: one, three, two, zero
            0.0, 1.0, 0.0, // thal: no, normal, reversible
        ];
        assert_eq!(v.as_slice(), &expected[..]);
    }

    #[test]
    fn test_female_with_angina() {
        let record = ClinicalRecord {
            sex: Sex::Female,
            chest_pain: ChestPainType::NonCardiac,
            exercise_angina: true,
            ..golden_record()
        };
        let v = encode(&record, &UntrackedDefaults::STANDARD);
        assert_eq!(v[Feature::SexMale], 0.0);
        assert_eq!(v[Feature::ExerciseAngina], 1.0);
        assert_eq!(v[Feature::ChestPainNonCardiac], 1.0);
        assert_eq!(v[Feature::ChestPainTypical], 0.0);
    }

    #[test]
    fn test_reference_categories_encode_as_zeros() {
        let defaults = UntrackedDefaults {
            fasting_blood_sugar: true,
            rest_ecg: RestEcg::LeftVentricularHypertrophy,
            st_slope: StSlope::Downsloping,
            major_vessels: MajorVessels::Four,
            thalassemia: Thalassemia::Fixed,
        };
        let v = encode(&golden_record(), &defaults);
        assert_eq!(v[Feature::FastingBloodSugar], 1.0);
        for feature in &Feature::ALL[Feature::RestEcgNormal.index()..] {
            if *feature != Feature::ExerciseAngina {
                assert_eq!(v[*feature], 0.0, "{feature:?} should be zero");
            }
        }
    }

    fn any_record() -> impl Strategy<Value = ClinicalRecord> {
        (
            20u16..=90,
            80u16..=200,
            100u16..=600,
            50u16..=220,
            0.0f64..=10.0,
            prop::sample::select(Sex::ALL.to_vec()),
            prop::sample::select(ChestPainType::ALL.to_vec()),
            any::<bool>(),
        )
            .prop_map(
                |(age, resting_bp, cholesterol, max_heart_rate, oxygen_stress, sex, chest_pain, exercise_angina)| {
                    ClinicalRecord {
                        age,
                        resting_bp,
                        cholesterol,
                        max_heart_rate,
                        oxygen_stress,
                        sex,
                        chest_pain,
                        exercise_angina,
                    }
                },
            )
    }

    proptest! {
        #[test]
        fn prop_exactly_one_chest_pain_indicator(record in any_record()) {
            let v = encode(&record, &UntrackedDefaults::STANDARD);
            prop_assert_eq!(v.as_slice().len(), FEATURE_COUNT);
            let hot = v[Feature::ChestPainAtypical]
                + v[Feature::ChestPainNonCardiac]
                + v[Feature::ChestPainTypical];
            prop_assert_eq!(hot, 1.0);
            prop_assert_eq!(v[Feature::Age], f64::from(record.age));
            prop_assert_eq!(v[Feature::OxygenStress], record.oxygen_stress);
        }
    }
}
