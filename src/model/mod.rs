pub mod classifier;
pub mod loader;
pub mod risk;

pub use classifier::{BinaryClassifier, Classification, OnnxClassifier};
pub use risk::{RiskAssessment, RiskLevel};
