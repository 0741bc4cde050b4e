use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("Model not found at path: {0}")]
    ModelNotFound(String),

    #[error("ONNX Runtime error: {0}")]
    OrtError(#[from] ort::Error),

    #[error("Input shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    #[error("Invalid request body: {0}")]
    InvalidRequest(String),

    #[error("Request body must be a JSON object")]
    NotAnObject,

    #[error("Expected {expected} features, got {got}")]
    FeatureCountMismatch { expected: usize, got: usize },

    #[error("Missing feature: {0}")]
    MissingFeature(String),

    #[error("Feature '{0}' must be a number")]
    NonNumericFeature(String),

    #[error("Feature '{name}' {reason}")]
    InvalidFeatureValue { name: String, reason: String },

    #[error("Feature '{name}' value {value} is outside [{min}, {max}]")]
    FeatureOutOfRange {
        name: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Invalid model output: {0}")]
    InvalidModelOutput(String),

    #[error("Model session lock poisoned")]
    SessionPoisoned,

    #[error("Inference task failed: {0}")]
    TaskFailed(String),
}

impl InferenceError {
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            InferenceError::InvalidRequest(_)
                | InferenceError::NotAnObject
                | InferenceError::FeatureCountMismatch { .. }
                | InferenceError::MissingFeature(_)
                | InferenceError::NonNumericFeature(_)
                | InferenceError::InvalidFeatureValue { .. }
                | InferenceError::FeatureOutOfRange { .. }
        )
    }

    /// Short label used for the `kind` metric dimension.
    pub fn kind(&self) -> &'static str {
        match self {
            InferenceError::ModelNotFound(_) => "model_not_found",
            InferenceError::OrtError(_) => "runtime",
            InferenceError::ShapeMismatch { .. } => "shape_mismatch",
            InferenceError::InvalidRequest(_) | InferenceError::NotAnObject => "invalid_request",
            InferenceError::FeatureCountMismatch { .. }
            | InferenceError::MissingFeature(_) => "schema_mismatch",
            InferenceError::NonNumericFeature(_)
            | InferenceError::InvalidFeatureValue { .. }
            | InferenceError::FeatureOutOfRange { .. } => "invalid_feature",
            InferenceError::InvalidModelOutput(_) => "model_output",
            InferenceError::SessionPoisoned | InferenceError::TaskFailed(_) => "internal",
        }
    }
}

impl IntoResponse for InferenceError {
    fn into_response(self) -> Response {
        let (status, error_message) = if self.is_client_error() {
            (StatusCode::BAD_REQUEST, self.to_string())
        } else {
            // ModelNotFound and ShapeMismatch only occur at startup
            match self {
                InferenceError::InvalidModelOutput(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
                }
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                ),
            }
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
