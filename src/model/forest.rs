//! Bootstrap random forests (classifier and regressor)
//!
//! Per-tree seeds are drawn from the forest seed before any tree is grown, so
//! trees can be fitted on the rayon pool in any order and the result depends
//! only on the seed and the data.

use rand::prelude::*;
use rand::rngs::StdRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::tree::{Criterion, DecisionTree, MaxFeatures, TreeParams};
use crate::error::{Result, RiskError};

/// Hyperparameters shared by both forest kinds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForestConfig {
    pub n_trees: usize,
    pub seed: u64,
    pub max_features: MaxFeatures,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Resample rows with replacement for each tree
    pub bootstrap: bool,
}

impl ForestConfig {
    /// Default-probability classifier: sqrt features per split
    pub fn classification() -> Self {
        Self {
            n_trees: 150,
            seed: 42,
            max_features: MaxFeatures::Sqrt,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            bootstrap: true,
        }
    }

    /// Expected-loss regressor: every feature is a split candidate
    pub fn regression() -> Self {
        Self {
            max_features: MaxFeatures::All,
            ..Self::classification()
        }
    }

    pub fn with_trees(mut self, n_trees: usize) -> Self {
        self.n_trees = n_trees;
        self
    }

    fn tree_params(&self, criterion: Criterion) -> TreeParams {
        TreeParams {
            criterion,
            max_features: self.max_features,
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
        }
    }
}

/// Balanced binary classifier over 0/1 labels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestClassifier {
    config: ForestConfig,
    n_features: usize,
    trees: Vec<DecisionTree>,
}

impl RandomForestClassifier {
    /// Fit with balanced class weights `n / (2 * n_class)`.
    pub fn fit(x: &[Vec<f64>], labels: &[u8], config: &ForestConfig) -> Result<Self> {
        let n_features = validate_input(x, labels.len(), config)?;

        let positives = labels.iter().filter(|&&l| l == 1).count();
        let negatives = labels.len() - positives;
        if positives == 0 || negatives == 0 {
            return Err(RiskError::InsufficientTrainingData(
                "classifier needs both classes in its training rows".to_string(),
            ));
        }

        let n = labels.len() as f64;
        let positive_weight = n / (2.0 * positives as f64);
        let negative_weight = n / (2.0 * negatives as f64);
        let weights: Vec<f64> = labels
            .iter()
            .map(|&l| if l == 1 { positive_weight } else { negative_weight })
            .collect();
        let y: Vec<f64> = labels.iter().map(|&l| f64::from(l)).collect();

        let trees = fit_trees(x, &y, &weights, config, Criterion::Gini);
        Ok(Self {
            config: *config,
            n_features,
            trees,
        })
    }

    /// Probability of class 1: mean of the trees' leaf class fractions
    pub fn predict_proba(&self, x: &[Vec<f64>]) -> Vec<f64> {
        x.iter().map(|row| average(&self.trees, row)).collect()
    }

    /// Labels at the 0.5 probability cutoff
    pub fn predict(&self, x: &[Vec<f64>]) -> Vec<u8> {
        self.predict_proba(x)
            .into_iter()
            .map(|p| u8::from(p >= 0.5))
            .collect()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }
}

/// Squared-error regressor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    config: ForestConfig,
    n_features: usize,
    trees: Vec<DecisionTree>,
}

impl RandomForestRegressor {
    pub fn fit(x: &[Vec<f64>], y: &[f64], config: &ForestConfig) -> Result<Self> {
        let n_features = validate_input(x, y.len(), config)?;
        let weights = vec![1.0; y.len()];
        let trees = fit_trees(x, y, &weights, config, Criterion::SquaredError);
        Ok(Self {
            config: *config,
            n_features,
            trees,
        })
    }

    pub fn predict(&self, x: &[Vec<f64>]) -> Vec<f64> {
        x.iter().map(|row| average(&self.trees, row)).collect()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }
}

fn validate_input(x: &[Vec<f64>], n_targets: usize, config: &ForestConfig) -> Result<usize> {
    if x.is_empty() {
        return Err(RiskError::InsufficientTrainingData(
            "no training rows".to_string(),
        ));
    }
    if x.len() != n_targets {
        return Err(RiskError::InvalidConfig(format!(
            "{} feature rows but {} targets",
            x.len(),
            n_targets
        )));
    }
    if config.n_trees == 0 {
        return Err(RiskError::InvalidConfig(
            "forest needs at least one tree".to_string(),
        ));
    }
    Ok(x[0].len())
}

fn fit_trees(
    x: &[Vec<f64>],
    y: &[f64],
    weights: &[f64],
    config: &ForestConfig,
    criterion: Criterion,
) -> Vec<DecisionTree> {
    let params = config.tree_params(criterion);
    let n = y.len();

    let mut seeder = StdRng::seed_from_u64(config.seed);
    let seeds: Vec<u64> = (0..config.n_trees).map(|_| seeder.gen()).collect();

    seeds
        .par_iter()
        .map(|&seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            let samples: Vec<usize> = if config.bootstrap {
                (0..n).map(|_| rng.gen_range(0..n)).collect()
            } else {
                (0..n).collect()
            };
            DecisionTree::fit(x, y, weights, &samples, &params, &mut rng)
        })
        .collect()
}

fn average(trees: &[DecisionTree], row: &[f64]) -> f64 {
    if trees.is_empty() {
        return 0.0;
    }
    trees.iter().map(|t| t.predict_row(row)).sum::<f64>() / trees.len() as f64
}
