//! Model store: one versioned JSON artifact on disk
//!
//! The artifact is written to a sibling temp file and renamed over the old one,
//! so readers see either the previous bundle or the new one. An artifact that
//! cannot be read back is treated like a missing one and the store retrains.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::RiskConfig;
use crate::error::{Result, RiskError};
use crate::model::{train_models, ModelBundle};
use crate::pipeline::loader::{load_loan_records, source_columns};
use crate::pipeline::target::synthesize_targets;

/// Bumped whenever the bundle layout changes incompatibly
pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct ArtifactRef<'a> {
    format_version: u32,
    trained_at: String,
    bundle: &'a ModelBundle,
}

#[derive(Deserialize)]
struct Artifact {
    format_version: u32,
    trained_at: String,
    bundle: ModelBundle,
}

/// How [`ModelStore::load_with_outcome`] obtained its bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Read from the artifact
    Persisted,
    /// Trained because the artifact was missing or unreadable
    Trained,
}

/// Loads, saves and (re)trains the model bundle for one configuration
#[derive(Debug, Clone)]
pub struct ModelStore {
    config: RiskConfig,
}

impl ModelStore {
    pub fn new(config: RiskConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    pub fn artifact_path(&self) -> &Path {
        &self.config.artifact_path
    }

    /// Persisted bundle if readable, else a freshly trained and saved one
    pub fn load(&self) -> Result<ModelBundle> {
        self.load_with_outcome().map(|(bundle, _)| bundle)
    }

    /// Like [`load`](Self::load), also reporting whether training happened
    pub fn load_with_outcome(&self) -> Result<(ModelBundle, LoadOutcome)> {
        match self.read_artifact() {
            Ok(Some(bundle)) => {
                info!(path = %self.artifact_path().display(), "Loaded model artifact");
                Ok((bundle, LoadOutcome::Persisted))
            }
            Ok(None) => {
                info!(path = %self.artifact_path().display(), "No model artifact, training");
                Ok((self.retrain()?, LoadOutcome::Trained))
            }
            Err(err @ RiskError::CorruptArtifact { .. }) => {
                warn!(error = %err, "Discarding unreadable model artifact");
                Ok((self.retrain()?, LoadOutcome::Trained))
            }
            Err(err) => Err(err),
        }
    }

    /// Read the artifact: `Ok(None)` when absent, `CorruptArtifact` when it
    /// cannot be read, decoded, or has another format version.
    pub fn read_artifact(&self) -> Result<Option<ModelBundle>> {
        let path = self.artifact_path();
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(corrupt(path, e.to_string())),
        };

        let artifact: Artifact =
            serde_json::from_str(&contents).map_err(|e| corrupt(path, e.to_string()))?;
        if artifact.format_version != FORMAT_VERSION {
            return Err(corrupt(
                path,
                format!(
                    "format version {}, expected {}",
                    artifact.format_version, FORMAT_VERSION
                ),
            ));
        }
        debug!(trained_at = %artifact.trained_at, "Model artifact decoded");
        Ok(Some(artifact.bundle))
    }

    /// Replace the artifact with `bundle`
    pub fn save(&self, bundle: &ModelBundle) -> Result<()> {
        let path = self.artifact_path();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let artifact = ArtifactRef {
            format_version: FORMAT_VERSION,
            trained_at: Utc::now().to_rfc3339(),
            bundle,
        };
        let json = serde_json::to_string(&artifact)?;

        let tmp = temp_path(path);
        fs::write(&tmp, json)?;
        fs::rename(&tmp, path)?;

        info!(path = %path.display(), "Saved model artifact");
        Ok(())
    }

    /// Delete the artifact; a missing file is not an error
    pub fn discard(&self) -> Result<()> {
        match fs::remove_file(self.artifact_path()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Canonical columns the configured data source provides
    pub fn source_columns(&self) -> Result<Vec<String>> {
        source_columns(&self.config.data)
    }

    /// Load, label and train from the configured data source without saving
    pub fn train(&self) -> Result<ModelBundle> {
        let records = load_loan_records(&self.config.data)?;
        let labeled = synthesize_targets(&records, &self.config.proxy)?;
        train_models(&labeled, &self.config.trainer)
    }

    /// Train and save
    pub fn retrain(&self) -> Result<ModelBundle> {
        let bundle = self.train()?;
        self.save(&bundle)?;
        Ok(bundle)
    }
}

fn corrupt(path: &Path, reason: String) -> RiskError {
    RiskError::CorruptArtifact {
        path: path.to_path_buf(),
        reason,
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
