use crate::error::InferenceError;
use crate::model::classifier::Classification;
use serde::Serialize;

/// Float slack tolerated around [0, 1] before a probability is rejected.
const PROBABILITY_TOLERANCE: f32 = 1e-5;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLevel {
    High,
    Low,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::High => "High",
            RiskLevel::Low => "Low",
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RiskAssessment {
    pub risk: RiskLevel,
    /// Positive-class probability as a percentage, two decimals.
    pub probability: f64,
}

impl RiskAssessment {
    /// The label comes from the model's predicted class only; the
    /// probability is reported as-is and never re-thresholded.
    pub fn from_classification(
        classification: &Classification,
        positive_class: i64,
    ) -> Result<Self, InferenceError> {
        let probability = classification
            .probability_of(positive_class)
            .ok_or_else(|| {
                InferenceError::InvalidModelOutput(format!(
                    "no probability for positive class {}",
                    positive_class
                ))
            })?;

        let tolerated = -PROBABILITY_TOLERANCE..=1.0 + PROBABILITY_TOLERANCE;
        if !probability.is_finite() || !tolerated.contains(&probability) {
            return Err(InferenceError::InvalidModelOutput(format!(
                "probability {} is outside [0, 1]",
                probability
            )));
        }
        let probability = probability.clamp(0.0, 1.0);

        let risk = if classification.label == positive_class {
            RiskLevel::High
        } else {
            RiskLevel::Low
        };

        Ok(Self {
            risk,
            probability: to_percentage(probability),
        })
    }
}

fn to_percentage(probability: f32) -> f64 {
    (f64::from(probability) * 100.0 * 100.0).round() / 100.0
}
