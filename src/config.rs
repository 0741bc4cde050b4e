use crate::error::ConfigError;
use crate::preprocessing::features::FeatureDef;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

#[derive(Deserialize, Clone, Debug)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub model: ModelConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Training-time feature order.
    pub features: Vec<FeatureDef>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ModelConfig {
    pub path: String,
    /// Class id reported as "High" risk.
    #[serde(default = "default_positive_class")]
    pub positive_class: i64,
    #[serde(default = "default_intra_threads")]
    pub intra_threads: usize,
    /// Output names; detected from the model when absent.
    #[serde(default)]
    pub label_output: Option<String>,
    #[serde(default)]
    pub probability_output: Option<String>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

fn default_positive_class() -> i64 {
    1
}

fn default_intra_threads() -> usize {
    1
}

impl AppConfig {
    /// Reads and validates a YAML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.path.trim().is_empty() {
            return Err(ConfigError::Invalid("model.path is empty".to_string()));
        }
        if self.model.intra_threads == 0 {
            return Err(ConfigError::Invalid(
                "model.intra_threads must be at least 1".to_string(),
            ));
        }
        if self.features.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one feature must be declared".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for feature in &self.features {
            if !seen.insert(feature.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate feature '{}'",
                    feature.name
                )));
            }
            if let (Some(min), Some(max)) = (feature.min, feature.max) {
                if min > max {
                    return Err(ConfigError::Invalid(format!(
                        "feature '{}' has min {} greater than max {}",
                        feature.name, min, max
                    )));
                }
            }
        }

        Ok(())
    }
}
