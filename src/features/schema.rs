//! The fixed feature schema the preprocessing transform and model were fitted on.
//!
//! Order matters: `Feature::ALL` is the column order of every normalized record.

use std::fmt;

/// One column of the feature schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Age,
    Gender,
    Bmi,
    AlcoholConsumption,
    SmokingStatus,
    HepatitisB,
    HepatitisC,
    LiverFunctionScore,
    AlphaFetoproteinLevel,
    CirrhosisHistory,
    FamilyHistoryCancer,
    PhysicalActivityLevel,
    Diabetes,
}

/// Number of schema columns.
pub const FEATURE_COUNT: usize = 13;

/// How a raw value for a feature is coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    /// Free-form measurement, coerced to a float.
    Continuous,
    /// Label mapped to an integer code, then coerced to a float.
    Categorical(&'static [(&'static str, u8)]),
    /// Binary indicator, coerced to an integer.
    Flag,
}

const GENDER: &[(&str, u8)] = &[("Male", 0), ("M", 0), ("Female", 1), ("F", 1)];
const ALCOHOL: &[(&str, u8)] = &[("Never", 0), ("Occasional", 1), ("Regular", 2)];
const SMOKING: &[(&str, u8)] = &[("Never", 0), ("Former", 1), ("Current", 2)];
const ACTIVITY: &[(&str, u8)] = &[("Low", 0), ("Moderate", 1), ("High", 2)];

impl Feature {
    /// All features in schema order.
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::Age,
        Feature::Gender,
        Feature::Bmi,
        Feature::AlcoholConsumption,
        Feature::SmokingStatus,
        Feature::HepatitisB,
        Feature::HepatitisC,
        Feature::LiverFunctionScore,
        Feature::AlphaFetoproteinLevel,
        Feature::CirrhosisHistory,
        Feature::FamilyHistoryCancer,
        Feature::PhysicalActivityLevel,
        Feature::Diabetes,
    ];

    /// Continuous measurements, in schema order. The column-split scaler is fitted on these.
    pub const CONTINUOUS: [Feature; 4] = [
        Feature::Age,
        Feature::Bmi,
        Feature::LiverFunctionScore,
        Feature::AlphaFetoproteinLevel,
    ];

    /// JSON key and fitted column name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Age => "age",
            Self::Gender => "gender",
            Self::Bmi => "bmi",
            Self::AlcoholConsumption => "alcohol_consumption",
            Self::SmokingStatus => "smoking_status",
            Self::HepatitisB => "hepatitis_b",
            Self::HepatitisC => "hepatitis_c",
            Self::LiverFunctionScore => "liver_function_score",
            Self::AlphaFetoproteinLevel => "alpha_fetoprotein_level",
            Self::CirrhosisHistory => "cirrhosis_history",
            Self::FamilyHistoryCancer => "family_history_cancer",
            Self::PhysicalActivityLevel => "physical_activity_level",
            Self::Diabetes => "diabetes",
        }
    }

    pub fn kind(&self) -> FeatureKind {
        match self {
            Self::Age | Self::Bmi | Self::LiverFunctionScore | Self::AlphaFetoproteinLevel => {
                FeatureKind::Continuous
            }
            Self::Gender => FeatureKind::Categorical(GENDER),
            Self::AlcoholConsumption => FeatureKind::Categorical(ALCOHOL),
            Self::SmokingStatus => FeatureKind::Categorical(SMOKING),
            Self::PhysicalActivityLevel => FeatureKind::Categorical(ACTIVITY),
            Self::HepatitisB
            | Self::HepatitisC
            | Self::CirrhosisHistory
            | Self::FamilyHistoryCancer
            | Self::Diabetes => FeatureKind::Flag,
        }
    }

    /// Position within `Feature::ALL`.
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Look up a label in a category map. Matching is case-sensitive after trimming.
pub fn category_code(map: &[(&str, u8)], label: &str) -> Option<u8> {
    let label = label.trim();
    map.iter()
        .find(|(known, _)| *known == label)
        .map(|(_, code)| *code)
}
