//! Feature schema and column transformer
//!
//! The schema is the ordered list of model inputs with their kind. It is
//! inferred once from the labeled training table, stored in the model bundle,
//! and compared structurally against every row built at inference time.
//!
//! The transformer passes numerical columns through unchanged and one-hot
//! encodes categorical columns (categories sorted, one block per column).

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use super::fields::role_of;
use super::target::TARGET_COLUMNS;
use crate::error::{Result, RiskError};

/// Whether a column is passed through or one-hot encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureKind {
    Numerical,
    Categorical,
}

impl std::fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeatureKind::Numerical => write!(f, "numerical"),
            FeatureKind::Categorical => write!(f, "categorical"),
        }
    }
}

/// One model input column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSpec {
    pub name: String,
    pub kind: FeatureKind,
}

impl FeatureSpec {
    pub fn new(name: impl Into<String>, kind: FeatureKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Ordered feature columns with their kinds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    columns: Vec<FeatureSpec>,
}

impl FeatureSchema {
    pub fn new(columns: Vec<FeatureSpec>) -> Self {
        Self { columns }
    }

    /// Infer the schema of a labeled table: every column except identity,
    /// date and target columns, numerical when the dtype is primitive numeric
    /// and categorical otherwise. Column order is preserved.
    pub fn infer(df: &DataFrame) -> Self {
        let columns = df
            .get_columns()
            .iter()
            .filter(|c| is_feature_column(c.name().as_str()))
            .map(|c| {
                let kind = if c.dtype().is_primitive_numeric() {
                    FeatureKind::Numerical
                } else {
                    FeatureKind::Categorical
                };
                FeatureSpec::new(c.name().as_str(), kind)
            })
            .collect();
        Self { columns }
    }

    pub fn columns(&self) -> &[FeatureSpec] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Full ordered list of feature column names
    pub fn feature_columns(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn numerical_features(&self) -> Vec<&str> {
        self.names_of_kind(FeatureKind::Numerical)
    }

    pub fn categorical_features(&self) -> Vec<&str> {
        self.names_of_kind(FeatureKind::Categorical)
    }

    pub fn kind_of(&self, name: &str) -> Option<FeatureKind> {
        self.columns.iter().find(|c| c.name == name).map(|c| c.kind)
    }

    fn names_of_kind(&self, kind: FeatureKind) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.kind == kind)
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Check that `declared` (what a row builder produces) has exactly these
    /// columns, in this order, with these kinds.
    pub fn ensure_matches(&self, declared: &FeatureSchema) -> Result<()> {
        if self == declared {
            return Ok(());
        }

        let missing: Vec<String> = declared
            .columns
            .iter()
            .filter(|c| self.kind_of(&c.name).is_none())
            .map(|c| c.name.clone())
            .collect();
        let unexpected: Vec<String> = self
            .columns
            .iter()
            .filter(|c| declared.kind_of(&c.name).is_none())
            .map(|c| c.name.clone())
            .collect();
        let conflicting: Vec<String> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(i, c)| {
                declared
                    .columns
                    .iter()
                    .position(|d| d.name == c.name)
                    .is_some_and(|j| j != *i || declared.columns[j].kind != c.kind)
            })
            .map(|(_, c)| c.name.clone())
            .collect();

        Err(RiskError::SchemaMismatch {
            missing,
            unexpected,
            conflicting,
        })
    }
}

fn is_feature_column(name: &str) -> bool {
    if TARGET_COLUMNS.contains(&name) {
        return false;
    }
    role_of(name).map_or(true, |role| role.is_predictive())
}

/// A single cell of a feature row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FeatureValue {
    Number(f64),
    Text(String),
}

impl FeatureValue {
    pub fn kind(&self) -> FeatureKind {
        match self {
            FeatureValue::Number(_) => FeatureKind::Numerical,
            FeatureValue::Text(_) => FeatureKind::Categorical,
        }
    }
}

/// Row-major feature table aligned with a schema
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureFrame {
    schema: FeatureSchema,
    rows: Vec<Vec<FeatureValue>>,
}

impl FeatureFrame {
    /// Build a frame from rows; every row must match the schema's width and kinds.
    pub fn new(schema: FeatureSchema, rows: Vec<Vec<FeatureValue>>) -> Result<Self> {
        for row in &rows {
            check_row(&schema, row)?;
        }
        Ok(Self { schema, rows })
    }

    /// Extract the schema's columns from a DataFrame
    pub fn from_dataframe(df: &DataFrame, schema: &FeatureSchema) -> Result<Self> {
        let mut rows: Vec<Vec<FeatureValue>> = vec![Vec::with_capacity(schema.len()); df.height()];

        for spec in schema.columns() {
            let column = df
                .column(&spec.name)
                .map_err(|_| RiskError::MissingColumn(spec.name.clone()))?;
            match spec.kind {
                FeatureKind::Numerical => {
                    let cast = column.cast(&DataType::Float64)?;
                    for (row, value) in rows.iter_mut().zip(cast.f64()?.into_iter()) {
                        row.push(FeatureValue::Number(value.unwrap_or(0.0)));
                    }
                }
                FeatureKind::Categorical => {
                    let cast = column.cast(&DataType::String)?;
                    for (row, value) in rows.iter_mut().zip(cast.str()?.into_iter()) {
                        row.push(FeatureValue::Text(value.unwrap_or_default().to_string()));
                    }
                }
            }
        }

        Ok(Self {
            schema: schema.clone(),
            rows,
        })
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn rows(&self) -> &[Vec<FeatureValue>] {
        &self.rows
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Frame with the given rows, in the given order
    pub fn select(&self, indices: &[usize]) -> Self {
        Self {
            schema: self.schema.clone(),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
        }
    }
}

fn check_row(schema: &FeatureSchema, row: &[FeatureValue]) -> Result<()> {
    if row.len() != schema.len() {
        return Err(RiskError::SchemaMismatch {
            missing: Vec::new(),
            unexpected: Vec::new(),
            conflicting: vec![format!(
                "row width {} != schema width {}",
                row.len(),
                schema.len()
            )],
        });
    }
    let conflicting: Vec<String> = schema
        .columns()
        .iter()
        .zip(row)
        .filter(|(spec, value)| spec.kind != value.kind())
        .map(|(spec, _)| spec.name.clone())
        .collect();
    if conflicting.is_empty() {
        Ok(())
    } else {
        Err(RiskError::SchemaMismatch {
            missing: Vec::new(),
            unexpected: Vec::new(),
            conflicting,
        })
    }
}

/// What the one-hot encoder does with a category it did not see during fit.
///
/// Inference payloads are free text typed by users (plus the `"N/A"` sentinel
/// for unmapped columns), so the default zero-fills: the value contributes an
/// all-zero block and scoring continues.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnknownCategory {
    #[default]
    ZeroFill,
    /// Fail with [`RiskError::UnseenCategory`]
    Reject,
}

/// Unfitted column transformer definition.
///
/// Cloned once per model so each fits its own encoder on its own training rows.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnTransformer {
    schema: FeatureSchema,
    unknown: UnknownCategory,
}

impl ColumnTransformer {
    pub fn new(schema: FeatureSchema, unknown: UnknownCategory) -> Self {
        Self { schema, unknown }
    }

    /// Learn the sorted category list of every categorical column
    pub fn fit(&self, frame: &FeatureFrame) -> Result<FittedTransformer> {
        self.schema.ensure_matches(frame.schema())?;

        let mut numerical = Vec::new();
        let mut categorical = Vec::new();

        for (index, spec) in self.schema.columns().iter().enumerate() {
            match spec.kind {
                FeatureKind::Numerical => numerical.push(index),
                FeatureKind::Categorical => {
                    let mut categories: Vec<String> = frame
                        .rows()
                        .iter()
                        .filter_map(|row| match &row[index] {
                            FeatureValue::Text(s) => Some(s.clone()),
                            FeatureValue::Number(_) => None,
                        })
                        .collect();
                    categories.sort();
                    categories.dedup();
                    categorical.push(CategoricalEncoding {
                        index,
                        name: spec.name.clone(),
                        categories,
                    });
                }
            }
        }

        Ok(FittedTransformer {
            schema: self.schema.clone(),
            unknown: self.unknown,
            numerical,
            categorical,
        })
    }
}

/// Categories learned for one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct CategoricalEncoding {
    index: usize,
    name: String,
    categories: Vec<String>,
}

/// Fitted transformer: numerical pass-through followed by one-hot blocks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedTransformer {
    schema: FeatureSchema,
    unknown: UnknownCategory,
    numerical: Vec<usize>,
    categorical: Vec<CategoricalEncoding>,
}

impl FittedTransformer {
    /// Input schema the transformer was fitted on
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Number of encoded columns
    pub fn output_width(&self) -> usize {
        self.numerical.len()
            + self
                .categorical
                .iter()
                .map(|c| c.categories.len())
                .sum::<usize>()
    }

    /// Names of the encoded columns (`COLUMN=category` for one-hot blocks)
    pub fn output_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .numerical
            .iter()
            .map(|&i| self.schema.columns()[i].name.clone())
            .collect();
        for encoding in &self.categorical {
            names.extend(
                encoding
                    .categories
                    .iter()
                    .map(|c| format!("{}={}", encoding.name, c)),
            );
        }
        names
    }

    /// Encode every row of a frame whose schema matches the fitted one
    pub fn transform(&self, frame: &FeatureFrame) -> Result<Vec<Vec<f64>>> {
        self.schema.ensure_matches(frame.schema())?;
        frame.rows().iter().map(|row| self.encode(row)).collect()
    }

    fn encode(&self, row: &[FeatureValue]) -> Result<Vec<f64>> {
        let mut encoded = Vec::with_capacity(self.output_width());

        for &index in &self.numerical {
            match &row[index] {
                FeatureValue::Number(v) => encoded.push(*v),
                FeatureValue::Text(_) => return Err(kind_conflict(&self.schema, index)),
            }
        }

        for encoding in &self.categorical {
            let value = match &row[encoding.index] {
                FeatureValue::Text(s) => s,
                FeatureValue::Number(_) => return Err(kind_conflict(&self.schema, encoding.index)),
            };
            let start = encoded.len();
            encoded.resize(start + encoding.categories.len(), 0.0);
            match encoding.categories.binary_search(value) {
                Ok(position) => encoded[start + position] = 1.0,
                Err(_) => {
                    if self.unknown == UnknownCategory::Reject {
                        return Err(RiskError::UnseenCategory {
                            column: encoding.name.clone(),
                            value: value.clone(),
                        });
                    }
                }
            }
        }

        Ok(encoded)
    }
}

fn kind_conflict(schema: &FeatureSchema, index: usize) -> RiskError {
    RiskError::SchemaMismatch {
        missing: Vec::new(),
        unexpected: Vec::new(),
        conflicting: vec![schema.columns()[index].name.clone()],
    }
}
