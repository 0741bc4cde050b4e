use crate::error::InferenceError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FeatureKind {
    Float,
    Integer,
    /// Accepts only 0 or 1.
    Binary,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct FeatureDef {
    pub name: String,
    pub kind: FeatureKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl FeatureDef {
    fn check(&self, value: f64) -> Result<(), InferenceError> {
        match self.kind {
            FeatureKind::Float => {}
            FeatureKind::Integer if value.fract() != 0.0 => {
                return Err(InferenceError::InvalidFeatureValue {
                    name: self.name.clone(),
                    reason: "must be an integer".to_string(),
                });
            }
            FeatureKind::Binary if value != 0.0 && value != 1.0 => {
                return Err(InferenceError::InvalidFeatureValue {
                    name: self.name.clone(),
                    reason: "must be 0 or 1".to_string(),
                });
            }
            _ => {}
        }

        let min = self.min.unwrap_or(f64::NEG_INFINITY);
        let max = self.max.unwrap_or(f64::INFINITY);
        if value < min || value > max {
            return Err(InferenceError::FeatureOutOfRange {
                name: self.name.clone(),
                value,
                min,
                max,
            });
        }

        Ok(())
    }
}

/// Ordered feature definitions matching the model's training-time input.
#[derive(Clone, Debug)]
pub struct FeatureSchema {
    features: Vec<FeatureDef>,
}

impl FeatureSchema {
    pub fn new(features: Vec<FeatureDef>) -> Self {
        Self { features }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn features(&self) -> &[FeatureDef] {
        &self.features
    }

    /// Builds the model input from a request body.
    ///
    /// Values are looked up by name and emitted in schema order, so the
    /// key order of the submitted object has no effect on the result.
    pub fn assemble(&self, body: &Value) -> Result<Vec<f32>, InferenceError> {
        let object = body.as_object().ok_or(InferenceError::NotAnObject)?;

        if object.len() != self.features.len() {
            return Err(InferenceError::FeatureCountMismatch {
                expected: self.features.len(),
                got: object.len(),
            });
        }

        // With equal counts, a missing schema name implies an unknown key.
        if let Some(missing) = self.features.iter().find(|f| !object.contains_key(&f.name)) {
            return Err(InferenceError::MissingFeature(missing.name.clone()));
        }

        self.features
            .iter()
            .map(|feature| {
                let value = object
                    .get(&feature.name)
                    .and_then(Value::as_f64)
                    .ok_or_else(|| InferenceError::NonNumericFeature(feature.name.clone()))?;
                feature.check(value)?;
                let narrowed = value as f32;
                if !narrowed.is_finite() {
                    return Err(InferenceError::InvalidFeatureValue {
                        name: feature.name.clone(),
                        reason: "is out of f32 range".to_string(),
                    });
                }
                Ok(narrowed)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn def(name: &str, kind: FeatureKind, min: Option<f64>, max: Option<f64>) -> FeatureDef {
        FeatureDef {
            name: name.to_string(),
            kind,
            min,
            max,
        }
    }

    fn schema() -> FeatureSchema {
        FeatureSchema::new(vec![
            def("age", FeatureKind::Integer, Some(1.0), Some(120.0)),
            def("bmi", FeatureKind::Float, None, None),
            def("smoker", FeatureKind::Binary, None, None),
        ])
    }

    #[test]
    fn test_assemble_in_schema_order() {
        let body = json!({"smoker": 1, "bmi": 30.2, "age": 45});
        let features = schema().assemble(&body).unwrap();
        assert_eq!(features, vec![45.0, 30.2, 1.0]);
    }

    #[test]
    fn test_rejects_non_object() {
        let err = schema().assemble(&json!([45, 30.2, 1])).unwrap_err();
        assert!(matches!(err, InferenceError::NotAnObject));
    }

    #[test]
    fn test_rejects_wrong_count() {
        let err = schema().assemble(&json!({"age": 45, "bmi": 30.2})).unwrap_err();
        match err {
            InferenceError::FeatureCountMismatch { expected, got } => {
                assert_eq!(expected, 3);
                assert_eq!(got, 2);
            }
            other => panic!("Expected FeatureCountMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_renamed_feature() {
        let body = json!({"age": 45, "bmi": 30.2, "smokes": 1});
        let err = schema().assemble(&body).unwrap_err();
        assert!(matches!(err, InferenceError::MissingFeature(ref name) if name == "smoker"));
    }

    #[test]
    fn test_rejects_non_numeric() {
        for bad in [json!("45"), json!(null), json!(true), json!([45])] {
            let body = json!({"age": bad, "bmi": 30.2, "smoker": 0});
            let err = schema().assemble(&body).unwrap_err();
            assert!(matches!(err, InferenceError::NonNumericFeature(ref name) if name == "age"));
        }
    }

    #[test]
    fn test_rejects_fractional_integer() {
        let body = json!({"age": 45.5, "bmi": 30.2, "smoker": 0});
        let err = schema().assemble(&body).unwrap_err();
        assert!(matches!(err, InferenceError::InvalidFeatureValue { .. }));
    }

    #[test]
    fn test_integer_accepts_whole_float() {
        let body = json!({"age": 45.0, "bmi": 30.2, "smoker": 0});
        assert!(schema().assemble(&body).is_ok());
    }

    #[test]
    fn test_rejects_non_binary() {
        let body = json!({"age": 45, "bmi": 30.2, "smoker": 2});
        let err = schema().assemble(&body).unwrap_err();
        assert_eq!(err.to_string(), "Feature 'smoker' must be 0 or 1");
    }

    #[test]
    fn test_range_bounds_are_inclusive() {
        let s = schema();
        assert!(s.assemble(&json!({"age": 1, "bmi": 0, "smoker": 0})).is_ok());
        assert!(s.assemble(&json!({"age": 120, "bmi": 0, "smoker": 0})).is_ok());

        let err = s
            .assemble(&json!({"age": 121, "bmi": 0, "smoker": 0}))
            .unwrap_err();
        assert!(matches!(err, InferenceError::FeatureOutOfRange { .. }));
    }

    #[test]
    fn test_rejects_value_beyond_f32() {
        let body = json!({"age": 45, "bmi": 1e300, "smoker": 0});
        let err = schema().assemble(&body).unwrap_err();
        assert_eq!(err.to_string(), "Feature 'bmi' is out of f32 range");

        let body = json!({"age": 45, "bmi": -1e39, "smoker": 0});
        assert!(schema().assemble(&body).is_err());
    }

    #[test]
    fn test_unbounded_float_accepts_negative() {
        let body = json!({"age": 45, "bmi": -3.5, "smoker": 0});
        let features = schema().assemble(&body).unwrap();
        assert_eq!(features[1], -3.5);
    }
}
