//! A fitted transformer paired with the forest trained on its output

use serde::{Deserialize, Serialize};

use super::forest::{RandomForestClassifier, RandomForestRegressor};
use crate::error::Result;
use crate::pipeline::features::{FeatureFrame, FeatureSchema, FittedTransformer};

/// Transformer + model; every prediction re-checks the input schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedPipeline<M> {
    transformer: FittedTransformer,
    model: M,
}

pub type ClassifierPipeline = FittedPipeline<RandomForestClassifier>;
pub type RegressorPipeline = FittedPipeline<RandomForestRegressor>;

impl<M> FittedPipeline<M> {
    pub fn new(transformer: FittedTransformer, model: M) -> Self {
        Self { transformer, model }
    }

    pub fn schema(&self) -> &FeatureSchema {
        self.transformer.schema()
    }

    pub fn transformer(&self) -> &FittedTransformer {
        &self.transformer
    }

    pub fn model(&self) -> &M {
        &self.model
    }
}

impl ClassifierPipeline {
    /// Default probability per row
    pub fn predict_proba(&self, frame: &FeatureFrame) -> Result<Vec<f64>> {
        let encoded = self.transformer.transform(frame)?;
        Ok(self.model.predict_proba(&encoded))
    }
}

impl RegressorPipeline {
    /// Expected loss per row
    pub fn predict(&self, frame: &FeatureFrame) -> Result<Vec<f64>> {
        let encoded = self.transformer.transform(frame)?;
        Ok(self.model.predict(&encoded))
    }
}
