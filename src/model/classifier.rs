use crate::error::InferenceError;
use ort::memory::Allocator;
use ort::session::{Session, SessionOutputs};
use ort::value::{DowncastableTarget, DynMapValueType, DynSequenceValueType, DynValue, Tensor};
use std::sync::Mutex;
use tracing::debug;

/// Output of one classifier run: `predict` and `predict_proba` together.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub label: i64,
    /// `(class id, probability)` pairs.
    pub class_probabilities: Vec<(i64, f32)>,
}

impl Classification {
    pub fn probability_of(&self, class: i64) -> Option<f32> {
        self.class_probabilities
            .iter()
            .find(|(id, _)| *id == class)
            .map(|(_, p)| *p)
    }
}

/// A loaded binary classifier, shared read-only across request handlers.
pub trait BinaryClassifier: Send + Sync {
    /// Fixed input width declared by the model, if any.
    fn input_width(&self) -> Option<usize>;

    /// Runs a single-sample prediction.
    fn classify(&self, features: &[f32]) -> Result<Classification, InferenceError>;
}

/// Classifier backed by an ONNX Runtime session.
pub struct OnnxClassifier {
    session: Mutex<Session>,
    input_name: String,
    label_output: String,
    probability_output: String,
    input_width: Option<usize>,
}

impl OnnxClassifier {
    pub fn new(
        session: Session,
        label_output: Option<String>,
        probability_output: Option<String>,
    ) -> Result<Self, InferenceError> {
        let input = session
            .inputs
            .first()
            .ok_or_else(|| InferenceError::InvalidModelOutput("model has no inputs".to_string()))?;
        let input_name = input.name.clone();
        let input_width = match &input.input_type {
            ort::value::ValueType::Tensor { shape, .. } => shape
                .iter()
                .last()
                .copied()
                .filter(|&dim| dim > 0)
                .map(|dim| dim as usize),
            _ => None,
        };

        let output_names: Vec<String> = session.outputs.iter().map(|o| o.name.clone()).collect();
        let label_output = resolve_output(&output_names, label_output, "label", 0)?;
        let last = output_names.len().saturating_sub(1);
        let probability_output = resolve_output(&output_names, probability_output, "prob", last)?;

        debug!(
            input = %input_name,
            label = %label_output,
            probabilities = %probability_output,
            "Resolved model outputs"
        );

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            label_output,
            probability_output,
            input_width,
        })
    }

    fn extract_label(&self, outputs: &SessionOutputs) -> Result<i64, InferenceError> {
        let output = outputs.get(self.label_output.as_str()).ok_or_else(|| {
            InferenceError::InvalidModelOutput(format!("missing output '{}'", self.label_output))
        })?;
        let (_, data) = output.try_extract_tensor::<i64>()?;
        data.first().copied().ok_or_else(|| {
            InferenceError::InvalidModelOutput("label output is empty".to_string())
        })
    }

    fn extract_probabilities(
        &self,
        outputs: &SessionOutputs,
    ) -> Result<Vec<(i64, f32)>, InferenceError> {
        let output = outputs.get(self.probability_output.as_str()).ok_or_else(|| {
            InferenceError::InvalidModelOutput(format!(
                "missing output '{}'",
                self.probability_output
            ))
        })?;

        // Plain tensor: [batch, n_classes] or [n_classes]
        if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
            let dims: Vec<i64> = shape.iter().copied().collect();
            return Ok(probabilities_from_tensor(&dims, data));
        }

        // ZipMap export: seq(map(int64, float))
        let dtype = output.dtype();
        if DynSequenceValueType::can_downcast(&dtype) {
            return extract_from_sequence_map(output);
        }

        Err(InferenceError::InvalidModelOutput(format!(
            "unsupported probability output type {:?}",
            dtype
        )))
    }
}

impl BinaryClassifier for OnnxClassifier {
    fn input_width(&self) -> Option<usize> {
        self.input_width
    }

    fn classify(&self, features: &[f32]) -> Result<Classification, InferenceError> {
        let shape = vec![1_i64, features.len() as i64];
        let input_tensor = Tensor::from_array((shape, features.to_vec()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| InferenceError::SessionPoisoned)?;
        let outputs = session.run(ort::inputs![self.input_name.as_str() => input_tensor])?;

        let label = self.extract_label(&outputs)?;
        let class_probabilities = self.extract_probabilities(&outputs)?;

        Ok(Classification {
            label,
            class_probabilities,
        })
    }
}

fn resolve_output(
    names: &[String],
    configured: Option<String>,
    needle: &str,
    fallback: usize,
) -> Result<String, InferenceError> {
    if let Some(name) = configured {
        if names.contains(&name) {
            return Ok(name);
        }
        return Err(InferenceError::InvalidModelOutput(format!(
            "configured output '{}' not found in model outputs {:?}",
            name, names
        )));
    }

    names
        .iter()
        .find(|n| n.to_lowercase().contains(needle))
        .or_else(|| names.get(fallback))
        .cloned()
        .ok_or_else(|| InferenceError::InvalidModelOutput("model has no outputs".to_string()))
}

/// Reads the first sample's class distribution. Column index is the class id.
fn probabilities_from_tensor(dims: &[i64], data: &[f32]) -> Vec<(i64, f32)> {
    let num_classes = match dims {
        [_, classes] => *classes as usize,
        _ => data.len(),
    };

    data.iter()
        .take(num_classes)
        .enumerate()
        .map(|(class, &p)| (class as i64, p))
        .collect()
}

fn extract_from_sequence_map(output: &DynValue) -> Result<Vec<(i64, f32)>, InferenceError> {
    let allocator = Allocator::default();

    let sequence = output.downcast_ref::<DynSequenceValueType>()?;
    let maps = sequence.try_extract_sequence::<DynMapValueType>(&allocator)?;

    // Batch size is always 1
    let first = maps
        .first()
        .ok_or_else(|| InferenceError::InvalidModelOutput("empty probability sequence".to_string()))?;
    let mut pairs = first.try_extract_key_values::<i64, f32>()?;
    pairs.sort_by_key(|(class, _)| *class);

    Ok(pairs)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probability_of() {
        let classification = Classification {
            label: 1,
            class_probabilities: vec![(0, 0.25), (1, 0.75)],
        };
        assert_eq!(classification.probability_of(1), Some(0.75));
        assert_eq!(classification.probability_of(0), Some(0.25));
        assert_eq!(classification.probability_of(2), None);
    }

    #[test]
    fn test_probabilities_from_batched_tensor() {
        let probs = probabilities_from_tensor(&[1, 2], &[0.3, 0.7]);
        assert_eq!(probs, vec![(0, 0.3), (1, 0.7)]);
    }

    #[test]
    fn test_probabilities_from_flat_tensor() {
        let probs = probabilities_from_tensor(&[2], &[0.9, 0.1]);
        assert_eq!(probs, vec![(0, 0.9), (1, 0.1)]);
    }

    #[test]
    fn test_probabilities_ignore_trailing_samples() {
        let probs = probabilities_from_tensor(&[2, 2], &[0.4, 0.6, 0.1, 0.9]);
        assert_eq!(probs, vec![(0, 0.4), (1, 0.6)]);
    }

    #[test]
    fn test_resolve_output_prefers_configured() {
        let names = vec!["output_label".to_string(), "output_probability".to_string()];
        let name = resolve_output(&names, Some("output_probability".to_string()), "label", 0).unwrap();
        assert_eq!(name, "output_probability");
    }

    #[test]
    fn test_resolve_output_detects_by_name() {
        let names = vec!["output_label".to_string(), "output_probability".to_string()];
        assert_eq!(resolve_output(&names, None, "label", 0).unwrap(), "output_label");
        assert_eq!(resolve_output(&names, None, "prob", 1).unwrap(), "output_probability");
    }

    #[test]
    fn test_resolve_output_falls_back_to_position() {
        let names = vec!["y".to_string(), "scores".to_string()];
        assert_eq!(resolve_output(&names, None, "label", 0).unwrap(), "y");
        assert_eq!(resolve_output(&names, None, "prob", 1).unwrap(), "scores");
    }

    #[test]
    fn test_resolve_output_rejects_unknown_configured_name() {
        let names = vec!["output_label".to_string()];
        let err = resolve_output(&names, Some("probabilities".to_string()), "prob", 0).unwrap_err();
        assert!(matches!(err, InferenceError::InvalidModelOutput(_)));
    }
}
