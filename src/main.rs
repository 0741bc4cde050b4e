use riskserve::{config, model, observability, preprocessing, server};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load Config
    let config_path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());
    let config = config::AppConfig::load(&config_path)?;

    // 2. Init observability
    observability::init_tracing(&config.logging);
    let metrics_handle = observability::install_metrics()?;
    info!(path = %config_path, "Configuration loaded");

    // 3. Load the model; failure here stops the process before binding
    model::loader::init_ort()?;
    let schema = preprocessing::FeatureSchema::new(config.features.clone());
    let classifier = model::loader::load_classifier(&config.model, schema.len())?;
    info!(
        path = %config.model.path,
        features = schema.len(),
        positive_class = config.model.positive_class,
        "Model ready"
    );

    // 4. Create Router
    let state = server::types::AppState {
        classifier: Arc::new(classifier),
        schema,
        positive_class: config.model.positive_class,
    };
    let app = server::routes::create_router(state, metrics_handle);

    // 5. Bind & Serve
    let listener =
        TcpListener::bind(format!("{}:{}", config.server.host, config.server.port)).await?;
    info!(
        "Server listening on http://{}:{}",
        config.server.host, config.server.port
    );

    axum::serve(listener, app).await?;

    Ok(())
}
