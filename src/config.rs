//! Runtime configuration shared by training and scoring

use std::path::PathBuf;

use crate::model::TrainerConfig;
use crate::pipeline::loader::DataSource;
use crate::pipeline::target::ProxyConfig;

/// Default location of the persisted model bundle
pub const DEFAULT_ARTIFACT_PATH: &str = "data/modelo_crediticio.json";

/// Where to read training data, where to keep the model, and how to train it
#[derive(Debug, Clone, PartialEq)]
pub struct RiskConfig {
    pub data: DataSource,
    pub artifact_path: PathBuf,
    pub trainer: TrainerConfig,
    pub proxy: ProxyConfig,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            data: DataSource::default(),
            artifact_path: PathBuf::from(DEFAULT_ARTIFACT_PATH),
            trainer: TrainerConfig::default(),
            proxy: ProxyConfig::default(),
        }
    }
}

impl RiskConfig {
    pub fn with_data(mut self, data: DataSource) -> Self {
        self.data = data;
        self
    }

    pub fn with_artifact_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.artifact_path = path.into();
        self
    }

    pub fn with_trainer(mut self, trainer: TrainerConfig) -> Self {
        self.trainer = trainer;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::loader::{DEFAULT_DATA_PATH, DEFAULT_SHEET};

    #[test]
    fn test_defaults() {
        let config = RiskConfig::default();
        assert_eq!(config.data.path, PathBuf::from(DEFAULT_DATA_PATH));
        assert_eq!(config.data.sheet, DEFAULT_SHEET);
        assert_eq!(config.artifact_path, PathBuf::from("data/modelo_crediticio.json"));
        assert_eq!(config.trainer.classifier.n_trees, 150);
        assert_eq!(config.proxy.seed, 2025);
    }
}
