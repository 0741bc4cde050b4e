use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use metrics::{counter, histogram};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, warn};

use crate::error::InferenceError;
use crate::model::risk::RiskAssessment;
use crate::observability::{INFERENCE_DURATION_SECONDS, PREDICTIONS_TOTAL, PREDICTION_ERRORS_TOTAL};
use crate::server::types::*;

pub async fn health_check() -> &'static str {
    "OK"
}

pub async fn model_info(State(state): State<Arc<AppState>>) -> Json<ModelInfoResponse> {
    Json(ModelInfoResponse {
        features: state.schema.features().to_vec(),
        positive_class: state.positive_class,
    })
}

pub async fn predict(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<RiskAssessment>, InferenceError> {
    let result = run_prediction(&state, payload).await;

    match &result {
        Ok(assessment) => {
            counter!(PREDICTIONS_TOTAL, "risk" => assessment.risk.as_str()).increment(1);
        }
        Err(e) => {
            counter!(PREDICTION_ERRORS_TOTAL, "kind" => e.kind()).increment(1);
            if e.is_client_error() {
                warn!(error = %e, "Rejected prediction request");
            } else {
                error!(error = %e, "Prediction failed");
            }
        }
    }

    result.map(Json)
}

async fn run_prediction(
    state: &AppState,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<RiskAssessment, InferenceError> {
    // 1. Parse & validate
    let Json(body) = payload.map_err(|e| InferenceError::InvalidRequest(e.body_text()))?;
    let features = state.schema.assemble(&body)?;

    // 2. Inference
    let start = Instant::now();
    let classifier = Arc::clone(&state.classifier);
    let classification = tokio::task::spawn_blocking(move || classifier.classify(&features))
        .await
        .map_err(|e| InferenceError::TaskFailed(e.to_string()))??;
    let duration = start.elapsed();
    histogram!(INFERENCE_DURATION_SECONDS).record(duration.as_secs_f64());

    // 3. Post-process
    let assessment = RiskAssessment::from_classification(&classification, state.positive_class)?;

    debug!(
        label = classification.label,
        risk = assessment.risk.as_str(),
        probability = assessment.probability,
        inference_time_ms = duration.as_secs_f64() * 1000.0,
        "Prediction complete"
    );

    Ok(assessment)
}
