use crate::model::classifier::BinaryClassifier;
use crate::preprocessing::features::{FeatureDef, FeatureSchema};
use serde::Serialize;
use std::sync::Arc;

/// Shared Application State
#[derive(Clone)]
pub struct AppState {
    pub classifier: Arc<dyn BinaryClassifier>,
    pub schema: FeatureSchema,
    pub positive_class: i64,
}

// --- DTOs (Data Transfer Objects) ---

// Prediction responses are `model::risk::RiskAssessment`; request bodies are
// free-form JSON objects checked against the schema.

#[derive(Serialize)]
pub struct ModelInfoResponse {
    pub features: Vec<FeatureDef>,
    pub positive_class: i64,
}
