//! Scoring payload and the feature-row builder
//!
//! A payload is a flat JSON object keyed by lowercase field names. The row
//! builder turns it into a one-row [`FeatureFrame`] laid out exactly like the
//! bundle's schema, or reports a [`RiskError::SchemaMismatch`] when the bundle
//! lacks a canonical column the data source provides or types one differently.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, RiskError};
use crate::pipeline::features::{
    FeatureFrame, FeatureKind, FeatureSchema, FeatureSpec, FeatureValue,
};
use crate::pipeline::fields::{
    payload_field, FieldRole, PayloadDefault, PayloadField, CULTIVATED_AREA_KEY, PAYLOAD_FIELDS,
    UNMAPPED_CATEGORY,
};
use crate::pipeline::flags::YesNo;

/// Applicant, loan and environmental attributes for one assessment.
///
/// Every key is optional; JSON `null` counts as omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoringPayload(Map<String, Value>);

impl ScoringPayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON object; blank input is an empty payload
    pub fn from_json_str(input: &str) -> Result<Self> {
        if input.trim().is_empty() {
            return Ok(Self::default());
        }
        match serde_json::from_str::<Value>(input)? {
            Value::Object(map) => Ok(Self(map)),
            other => Err(RiskError::InvalidPayload {
                field: "<payload>".to_string(),
                value: other.to_string(),
            }),
        }
    }

    /// Builder-style insert
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    /// Value for `key`, treating `null` as absent
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    /// Numeric value: JSON numbers, numeric strings and booleans are accepted
    pub fn number(&self, key: &str) -> Result<Option<f64>> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };
        let parsed = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        };
        parsed.map(Some).ok_or_else(|| RiskError::InvalidPayload {
            field: key.to_string(),
            value: value.to_string(),
        })
    }

    /// Text value; non-string scalars are rendered as JSON text
    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key).map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    pub fn flag(&self, key: &str) -> Option<YesNo> {
        self.get(key).map(|v| YesNo::from_json(Some(v)))
    }
}

impl From<Map<String, Value>> for ScoringPayload {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

fn canonical_kind(field: &PayloadField) -> FeatureKind {
    match field.role() {
        FieldRole::Numeric => FeatureKind::Numerical,
        _ => FeatureKind::Categorical,
    }
}

/// Schema the row builder produces for a bundle: the bundle's columns in its
/// order (canonical columns carry their canonical kind), then every canonical
/// payload column the bundle lacks but the data source provides.
///
/// With no known source columns only the bundle's own columns are declared.
pub fn declared_schema(
    bundle_schema: &FeatureSchema,
    source: Option<&[String]>,
) -> FeatureSchema {
    let mut columns: Vec<FeatureSpec> = bundle_schema
        .columns()
        .iter()
        .map(|spec| match payload_field(&spec.name) {
            Some(field) => FeatureSpec::new(spec.name.as_str(), canonical_kind(field)),
            None => spec.clone(),
        })
        .collect();

    let provided = |column: &str| source.is_some_and(|cols| cols.iter().any(|c| c == column));
    for field in PAYLOAD_FIELDS {
        if bundle_schema.kind_of(field.column).is_none() && provided(field.column) {
            columns.push(FeatureSpec::new(field.column, canonical_kind(field)));
        }
    }

    FeatureSchema::new(columns)
}

/// Build the one-row frame for `payload` against a bundle schema, given the
/// columns the data source currently provides
pub fn build_row(
    payload: &ScoringPayload,
    bundle_schema: &FeatureSchema,
    source: Option<&[String]>,
) -> Result<FeatureFrame> {
    bundle_schema.ensure_matches(&declared_schema(bundle_schema, source))?;

    let row = bundle_schema
        .columns()
        .iter()
        .map(|spec| match payload_field(&spec.name) {
            Some(field) => field_value(payload, field),
            None => Ok(match spec.kind {
                FeatureKind::Numerical => FeatureValue::Number(0.0),
                FeatureKind::Categorical => FeatureValue::Text(UNMAPPED_CATEGORY.to_string()),
            }),
        })
        .collect::<Result<Vec<_>>>()?;

    FeatureFrame::new(bundle_schema.clone(), vec![row])
}

fn field_value(payload: &ScoringPayload, field: &PayloadField) -> Result<FeatureValue> {
    let value = match field.default {
        PayloadDefault::Number(default) => {
            FeatureValue::Number(payload.number(field.key)?.unwrap_or(default))
        }
        PayloadDefault::CultivatedAreaOr(default) => {
            let value = match payload.number(field.key)? {
                Some(v) => v,
                None => payload
                    .number(CULTIVATED_AREA_KEY)?
                    .filter(|&area| area != 0.0)
                    .unwrap_or(default),
            };
            FeatureValue::Number(value)
        }
        PayloadDefault::Text(default) => {
            FeatureValue::Text(payload.text(field.key).unwrap_or_else(|| default.to_string()))
        }
        PayloadDefault::Flag(default) => {
            FeatureValue::Text(payload.flag(field.key).unwrap_or(default).as_str().to_string())
        }
    };
    Ok(value)
}
