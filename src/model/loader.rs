use crate::config::ModelConfig;
use crate::error::InferenceError;
use crate::model::classifier::{BinaryClassifier, OnnxClassifier};
use ort::session::{builder::GraphOptimizationLevel, Session};
use std::path::Path;
use tracing::info;

// Initialize the global environment for ORT (only needed once)
pub fn init_ort() -> Result<(), InferenceError> {
    ort::init().with_name("riskserve").commit()?;
    Ok(())
}

/// Loads an ONNX model from disk and creates an inference session.
///
/// # Arguments
/// * `model_path` - Path to the .onnx file
/// * `intra_threads` - Parallelism within an op
pub fn load_model(
    model_path: impl AsRef<Path>,
    intra_threads: usize,
) -> Result<Session, InferenceError> {
    let path = model_path.as_ref();
    if !path.exists() {
        return Err(InferenceError::ModelNotFound(path.display().to_string()));
    }

    let session = Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level3)?
        .with_intra_threads(intra_threads)?
        .commit_from_file(path)?;

    info!(path = %path.display(), "Loaded model");
    for (i, input) in session.inputs.iter().enumerate() {
        info!(index = i, name = %input.name, ty = ?input.input_type, "Model input");
    }
    for output in &session.outputs {
        info!(name = %output.name, ty = ?output.output_type, "Model output");
    }

    Ok(session)
}

/// Loads the configured model and checks it against the feature count.
pub fn load_classifier(
    config: &ModelConfig,
    feature_count: usize,
) -> Result<OnnxClassifier, InferenceError> {
    let session = load_model(&config.path, config.intra_threads)?;
    let classifier = OnnxClassifier::new(
        session,
        config.label_output.clone(),
        config.probability_output.clone(),
    )?;
    check_input_width(classifier.input_width(), feature_count)?;
    Ok(classifier)
}

fn check_input_width(
    input_width: Option<usize>,
    feature_count: usize,
) -> Result<(), InferenceError> {
    match input_width {
        Some(width) if width != feature_count => Err(InferenceError::ShapeMismatch {
            expected: vec![1, width],
            got: vec![1, feature_count],
        }),
        _ => Ok(()),
    }
}
