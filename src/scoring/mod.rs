//! Inference: payload to feature row, model provider, eco score and decision

pub mod decision;
pub mod eco;
pub mod engine;
pub mod payload;
pub mod provider;

pub use decision::Decision;
pub use eco::{eco_fields_complete, eco_score};
pub use engine::{Assessment, RiskEngine};
pub use payload::{build_row, declared_schema, ScoringPayload};
pub use provider::{ModelProvider, ProviderState, StoreProvider};
