//! Agrorisk: credit risk scoring for sustainable agricultural loans
//!
//! Trains a default-probability classifier and an expected-loss regressor on
//! historical disbursement records labeled with proxy targets, persists them
//! as one artifact, and scores loan applications into an approve / review /
//! reject decision alongside a rule-based sustainability score.

pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod scoring;
pub mod store;
pub mod utils;

pub use config::RiskConfig;
pub use error::{Result, RiskError};
pub use model::ModelBundle;
pub use scoring::{Assessment, Decision, RiskEngine, ScoringPayload, StoreProvider};
pub use store::ModelStore;
