//! Tree ensembles and the dual model trainer

pub mod forest;
pub mod metrics;
pub mod pipeline;
pub mod split;
pub mod trainer;
pub mod tree;

pub use forest::{ForestConfig, RandomForestClassifier, RandomForestRegressor};
pub use pipeline::{ClassifierPipeline, FittedPipeline, RegressorPipeline};
pub use trainer::{train_models, ModelBundle, TrainerConfig, TrainingReport};
pub use tree::{Criterion, DecisionTree, MaxFeatures};
