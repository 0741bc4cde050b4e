pub mod features;

pub use features::{FeatureDef, FeatureKind, FeatureSchema};
