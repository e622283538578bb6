//! Dual model trainer
//!
//! Trains the default-probability classifier and the expected-loss regressor
//! on a labeled loan table and packages them, with the feature schema and a
//! holdout report, into a [`ModelBundle`].

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::forest::{ForestConfig, RandomForestClassifier, RandomForestRegressor};
use super::metrics::{accuracy, mean_absolute_error, r2_score, roc_auc};
use super::pipeline::{ClassifierPipeline, FittedPipeline, RegressorPipeline};
use super::split::{shuffle_split, stratified_split};
use crate::error::{Result, RiskError};
use crate::pipeline::features::{ColumnTransformer, FeatureFrame, FeatureSchema, UnknownCategory};
use crate::pipeline::target::{ProxyTargets, DEFAULT_FLAG, EXPECTED_LOSS};

/// Training hyperparameters for both models
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainerConfig {
    pub classifier: ForestConfig,
    pub regressor: ForestConfig,
    /// Share of rows held out for evaluation
    pub test_fraction: f64,
    /// Seed for both train/test splits
    pub split_seed: u64,
    pub unknown_categories: UnknownCategory,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            classifier: ForestConfig::classification(),
            regressor: ForestConfig::regression(),
            test_fraction: 0.3,
            split_seed: 42,
            unknown_categories: UnknownCategory::default(),
        }
    }
}

impl TrainerConfig {
    /// Same tree count for both forests
    pub fn with_trees(mut self, n_trees: usize) -> Self {
        self.classifier.n_trees = n_trees;
        self.regressor.n_trees = n_trees;
        self
    }
}

/// Holdout evaluation of the classifier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassifierMetrics {
    pub train_rows: usize,
    pub test_rows: usize,
    /// At the 0.5 probability cutoff
    pub accuracy: f64,
    pub roc_auc: f64,
}

/// Holdout evaluation of the regressor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressorMetrics {
    pub train_rows: usize,
    pub test_rows: usize,
    pub mae: f64,
    pub r2: f64,
}

/// What a training run saw and how the models scored on held-out rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub rows: usize,
    pub features: usize,
    pub numerical_features: usize,
    pub categorical_features: usize,
    /// Share of rows labeled default
    pub positive_rate: f64,
    /// Risk-score cutoff used for the default label
    pub default_threshold: f64,
    pub classifier: ClassifierMetrics,
    pub regressor: RegressorMetrics,
}

/// Both fitted pipelines plus the schema they were trained on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelBundle {
    pub classifier: ClassifierPipeline,
    pub regressor: RegressorPipeline,
    pub schema: FeatureSchema,
    pub report: TrainingReport,
}

impl ModelBundle {
    pub fn numerical_features(&self) -> Vec<&str> {
        self.schema.numerical_features()
    }

    pub fn categorical_features(&self) -> Vec<&str> {
        self.schema.categorical_features()
    }

    pub fn feature_columns(&self) -> Vec<&str> {
        self.schema.feature_columns()
    }
}

/// Train both models on a labeled table
pub fn train_models(labeled: &ProxyTargets, config: &TrainerConfig) -> Result<ModelBundle> {
    let frame = &labeled.frame;
    let n = frame.height();
    if n == 0 {
        return Err(RiskError::InsufficientTrainingData(
            "labeled table is empty".to_string(),
        ));
    }

    let schema = FeatureSchema::infer(frame);
    if schema.is_empty() {
        return Err(RiskError::InsufficientTrainingData(
            "labeled table has no feature columns".to_string(),
        ));
    }

    let features = FeatureFrame::from_dataframe(frame, &schema)?;
    let labels = default_labels(frame)?;
    let losses = expected_losses(frame)?;

    let positives = labels.iter().filter(|&&l| l == 1).count();
    if positives == 0 || positives == n {
        return Err(RiskError::InsufficientTrainingData(format!(
            "default flag has a single class across {} rows",
            n
        )));
    }

    info!(
        rows = n,
        features = schema.len(),
        positives,
        "Training default-probability classifier"
    );

    let transformer = ColumnTransformer::new(schema.clone(), config.unknown_categories);

    let (classifier, classifier_metrics) =
        train_classifier(&transformer, &features, &labels, config)?;

    info!("Training expected-loss regressor");
    let (regressor, regressor_metrics) = train_regressor(&transformer, &features, &losses, config)?;

    let report = TrainingReport {
        rows: n,
        features: schema.len(),
        numerical_features: schema.numerical_features().len(),
        categorical_features: schema.categorical_features().len(),
        positive_rate: positives as f64 / n as f64,
        default_threshold: labeled.default_threshold,
        classifier: classifier_metrics,
        regressor: regressor_metrics,
    };

    info!(
        accuracy = report.classifier.accuracy,
        roc_auc = report.classifier.roc_auc,
        mae = report.regressor.mae,
        r2 = report.regressor.r2,
        "Training complete"
    );

    Ok(ModelBundle {
        classifier,
        regressor,
        schema,
        report,
    })
}

fn train_classifier(
    transformer: &ColumnTransformer,
    features: &FeatureFrame,
    labels: &[u8],
    config: &TrainerConfig,
) -> Result<(ClassifierPipeline, ClassifierMetrics)> {
    let split = stratified_split(labels, config.test_fraction, config.split_seed)?;
    let train_frame = features.select(&split.train);
    let test_frame = features.select(&split.test);
    let train_labels: Vec<u8> = split.train.iter().map(|&i| labels[i]).collect();
    let test_labels: Vec<u8> = split.test.iter().map(|&i| labels[i]).collect();

    let fitted = transformer.clone().fit(&train_frame)?;
    let x_train = fitted.transform(&train_frame)?;
    let forest = RandomForestClassifier::fit(&x_train, &train_labels, &config.classifier)?;
    let pipeline = FittedPipeline::new(fitted, forest);

    let scores = pipeline.predict_proba(&test_frame)?;
    let predicted: Vec<u8> = scores.iter().map(|&p| u8::from(p >= 0.5)).collect();
    let metrics = ClassifierMetrics {
        train_rows: split.train.len(),
        test_rows: split.test.len(),
        accuracy: accuracy(&test_labels, &predicted),
        roc_auc: roc_auc(&test_labels, &scores),
    };
    Ok((pipeline, metrics))
}

fn train_regressor(
    transformer: &ColumnTransformer,
    features: &FeatureFrame,
    losses: &[f64],
    config: &TrainerConfig,
) -> Result<(RegressorPipeline, RegressorMetrics)> {
    let split = shuffle_split(losses.len(), config.test_fraction, config.split_seed)?;
    let train_frame = features.select(&split.train);
    let test_frame = features.select(&split.test);
    let train_y: Vec<f64> = split.train.iter().map(|&i| losses[i]).collect();
    let test_y: Vec<f64> = split.test.iter().map(|&i| losses[i]).collect();

    let fitted = transformer.clone().fit(&train_frame)?;
    let x_train = fitted.transform(&train_frame)?;
    let forest = RandomForestRegressor::fit(&x_train, &train_y, &config.regressor)?;
    let pipeline = FittedPipeline::new(fitted, forest);

    let predicted = pipeline.predict(&test_frame)?;
    let metrics = RegressorMetrics {
        train_rows: split.train.len(),
        test_rows: split.test.len(),
        mae: mean_absolute_error(&test_y, &predicted),
        r2: r2_score(&test_y, &predicted),
    };
    Ok((pipeline, metrics))
}

fn default_labels(frame: &DataFrame) -> Result<Vec<u8>> {
    let column = frame
        .column(DEFAULT_FLAG)
        .map_err(|_| RiskError::MissingColumn(DEFAULT_FLAG.to_string()))?;
    let cast = column.cast(&DataType::Int32)?;
    Ok(cast
        .i32()?
        .into_iter()
        .map(|v| u8::from(v.unwrap_or(0) == 1))
        .collect())
}

fn expected_losses(frame: &DataFrame) -> Result<Vec<f64>> {
    let column = frame
        .column(EXPECTED_LOSS)
        .map_err(|_| RiskError::MissingColumn(EXPECTED_LOSS.to_string()))?;
    let cast = column.cast(&DataType::Float64)?;
    Ok(cast.f64()?.into_iter().map(|v| v.unwrap_or(0.0)).collect())
}
