//! Request normalization: loosely typed JSON → fixed-order feature record.
//!
//! Normalization never fails. Anything that cannot be coerced becomes
//! [`FeatureValue::Missing`]; an unrecognized category label that is not
//! numeric either is kept as [`FeatureValue::Text`] so the caller can apply
//! its configured policy.

use serde_json::{Map, Value};

use super::schema::{FEATURE_COUNT, Feature, FeatureKind, category_code};

/// A raw prediction request body.
pub type RawRequest = Map<String, Value>;

/// One normalized cell.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    Number(f64),
    Missing,
    /// Unrecognized category label, passed through untouched.
    Text(String),
}

impl FeatureValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

/// A record with exactly one value per schema feature, in schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    values: [FeatureValue; FEATURE_COUNT],
}

impl NormalizedRecord {
    pub fn get(&self, feature: Feature) -> &FeatureValue {
        &self.values[feature.index()]
    }

    pub fn set(&mut self, feature: Feature, value: FeatureValue) {
        self.values[feature.index()] = value;
    }

    /// `(feature, value)` pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (Feature, &FeatureValue)> {
        Feature::ALL.into_iter().zip(self.values.iter())
    }

    pub fn missing_features(&self) -> Vec<Feature> {
        self.iter()
            .filter(|(_, v)| v.is_missing())
            .map(|(f, _)| f)
            .collect()
    }

    /// Features holding pass-through text, with the text.
    pub fn unrecognized(&self) -> Vec<(Feature, &str)> {
        self.iter()
            .filter_map(|(f, v)| match v {
                FeatureValue::Text(t) => Some((f, t.as_str())),
                _ => None,
            })
            .collect()
    }
}

/// Outcome of coercing a single raw value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coerced {
    Value(f64),
    Missing,
}

impl From<Coerced> for FeatureValue {
    fn from(c: Coerced) -> Self {
        match c {
            Coerced::Value(n) => FeatureValue::Number(n),
            Coerced::Missing => FeatureValue::Missing,
        }
    }
}

/// Float coercion. Booleans count as 0/1; strings are trimmed; non-finite results are missing.
pub fn coerce_float(raw: Option<&Value>) -> Coerced {
    let n = match raw {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::Bool(b)) => Some(if *b { 1.0 } else { 0.0 }),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match n {
        Some(n) if n.is_finite() => Coerced::Value(n),
        _ => Coerced::Missing,
    }
}

/// Integer coercion for binary flags. Fractional numbers truncate; strings must be integral.
pub fn coerce_int(raw: Option<&Value>) -> Coerced {
    match raw {
        Some(Value::Bool(b)) => Coerced::Value(if *b { 1.0 } else { 0.0 }),
        Some(Value::Number(n)) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => Coerced::Value(i as f64),
            (None, Some(f)) if f.is_finite() => Coerced::Value(f.trunc()),
            _ => Coerced::Missing,
        },
        Some(Value::String(s)) => match s.trim().parse::<i64>() {
            Ok(i) => Coerced::Value(i as f64),
            Err(_) => Coerced::Missing,
        },
        _ => Coerced::Missing,
    }
}

fn normalize_category(map: &[(&str, u8)], raw: Option<&Value>) -> FeatureValue {
    if let Some(Value::String(label)) = raw {
        if let Some(code) = category_code(map, label) {
            return FeatureValue::Number(f64::from(code));
        }
        let trimmed = label.trim();
        if trimmed.is_empty() {
            return FeatureValue::Missing;
        }
        return match coerce_float(raw) {
            Coerced::Value(n) => FeatureValue::Number(n),
            Coerced::Missing => FeatureValue::Text(trimmed.to_string()),
        };
    }
    coerce_float(raw).into()
}

/// Map a raw request onto the feature schema. Unknown keys are ignored.
pub fn normalize(raw: &RawRequest) -> NormalizedRecord {
    let values = Feature::ALL.map(|feature| {
        let value = raw.get(feature.name()).filter(|v| !v.is_null());
        match feature.kind() {
            FeatureKind::Continuous => coerce_float(value).into(),
            FeatureKind::Flag => coerce_int(value).into(),
            FeatureKind::Categorical(map) => normalize_category(map, value),
        }
    });
    NormalizedRecord { values }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn complete_request() -> RawRequest {
        json!({
            "age": 50,
            "gender": "Male",
            "bmi": 25.0,
            "alcohol_consumption": "Occasional",
            "smoking_status": "Never",
            "hepatitis_b": 0,
            "hepatitis_c": 0,
            "liver_function_score": 60.0,
            "alpha_fetoprotein_level": 5.0,
            "cirrhosis_history": 0,
            "family_history_cancer": 0,
            "physical_activity_level": "Moderate",
            "diabetes": 0
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    #[test]
    fn complete_request_has_no_missing_values() {
        let record = normalize(&complete_request());
        assert!(record.missing_features().is_empty());
        let numbers: Vec<f64> = record.iter().filter_map(|(_, v)| v.as_number()).collect();
        assert_eq!(
            numbers,
            vec![50.0, 0.0, 25.0, 1.0, 0.0, 0.0, 0.0, 60.0, 5.0, 0.0, 0.0, 1.0, 0.0]
        );
    }

    #[test]
    fn each_absent_field_is_marked_missing_alone() {
        for feature in Feature::ALL {
            let mut raw = complete_request();
            raw.remove(feature.name());
            let record = normalize(&raw);
            assert_eq!(record.missing_features(), vec![feature], "removed {feature}");
        }
    }

    #[test]
    fn null_and_empty_values_are_missing() {
        let mut raw = complete_request();
        raw.insert("bmi".into(), Value::Null);
        raw.insert("diabetes".into(), json!(""));
        raw.insert("gender".into(), json!("   "));
        let record = normalize(&raw);
        assert_eq!(
            record.missing_features(),
            vec![Feature::Gender, Feature::Bmi, Feature::Diabetes]
        );
    }

    #[test]
    fn numeric_codes_are_not_remapped() {
        let mut raw = complete_request();
        raw.insert("gender".into(), json!("0"));
        raw.insert("smoking_status".into(), json!(2));
        let record = normalize(&raw);
        assert_eq!(record.get(Feature::Gender), &FeatureValue::Number(0.0));
        assert_eq!(record.get(Feature::SmokingStatus), &FeatureValue::Number(2.0));

        raw.insert("gender".into(), json!("Female"));
        let record = normalize(&raw);
        assert_eq!(record.get(Feature::Gender), &FeatureValue::Number(1.0));
    }

    #[test]
    fn category_matching_is_case_sensitive_after_trim() {
        let mut raw = complete_request();
        raw.insert("physical_activity_level".into(), json!(" High "));
        raw.insert("alcohol_consumption".into(), json!("regular"));
        let record = normalize(&raw);
        assert_eq!(
            record.get(Feature::PhysicalActivityLevel),
            &FeatureValue::Number(2.0)
        );
        assert_eq!(
            record.get(Feature::AlcoholConsumption),
            &FeatureValue::Text("regular".into())
        );
        assert_eq!(
            record.unrecognized(),
            vec![(Feature::AlcoholConsumption, "regular")]
        );
    }

    #[test]
    fn flags_coerce_booleans_and_integers() {
        let mut raw = complete_request();
        raw.insert("hepatitis_b".into(), json!(true));
        raw.insert("hepatitis_c".into(), json!(" 1 "));
        raw.insert("cirrhosis_history".into(), json!(1.9));
        raw.insert("family_history_cancer".into(), json!("1.0"));
        raw.insert("diabetes".into(), json!("yes"));
        let record = normalize(&raw);
        assert_eq!(record.get(Feature::HepatitisB), &FeatureValue::Number(1.0));
        assert_eq!(record.get(Feature::HepatitisC), &FeatureValue::Number(1.0));
        assert_eq!(record.get(Feature::CirrhosisHistory), &FeatureValue::Number(1.0));
        assert!(record.get(Feature::FamilyHistoryCancer).is_missing());
        assert!(record.get(Feature::Diabetes).is_missing());
    }

    #[test]
    fn continuous_fields_accept_numeric_strings_only() {
        let mut raw = complete_request();
        raw.insert("age".into(), json!(" 61.5"));
        raw.insert("bmi".into(), json!("heavy"));
        raw.insert("liver_function_score".into(), json!([60]));
        raw.insert("alpha_fetoprotein_level".into(), json!("NaN"));
        let record = normalize(&raw);
        assert_eq!(record.get(Feature::Age), &FeatureValue::Number(61.5));
        assert!(record.get(Feature::Bmi).is_missing());
        assert!(record.get(Feature::LiverFunctionScore).is_missing());
        assert!(record.get(Feature::AlphaFetoproteinLevel).is_missing());
    }

    #[test]
    fn extra_keys_are_ignored() {
        let mut raw = complete_request();
        raw.insert("patient_name".into(), json!("Jane"));
        assert_eq!(normalize(&raw), normalize(&complete_request()));
    }

    #[test]
    fn empty_request_is_all_missing() {
        let record = normalize(&RawRequest::new());
        assert_eq!(record.missing_features().len(), FEATURE_COUNT);
    }
}
