use crate::server::{handlers, types::AppState};
use axum::{
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub fn create_router(state: AppState, metrics_handle: PrometheusHandle) -> Router {
    let state = Arc::new(state);

    let metrics_route = Router::new().route(
        "/metrics",
        get(move || std::future::ready(metrics_handle.render())),
    );

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/model", get(handlers::model_info))
        .route("/predict", post(handlers::predict))
        .with_state(state)
        .merge(metrics_route)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
