//! Pipeline module - loads, labels and shapes the historical loan records

pub mod features;
pub mod fields;
pub mod flags;
pub mod loader;
pub mod target;

pub use features::{
    ColumnTransformer, FeatureFrame, FeatureKind, FeatureSchema, FeatureSpec, FeatureValue,
    FittedTransformer, UnknownCategory,
};
pub use fields::{FieldRole, PayloadDefault, PayloadField, PAYLOAD_FIELDS, SOURCE_COLUMNS};
pub use flags::YesNo;
pub use loader::{
    clean_loan_records, load_dataset, load_loan_records, source_columns, DataSource,
};
pub use target::{synthesize_targets, ProxyConfig, ProxyTargets};
