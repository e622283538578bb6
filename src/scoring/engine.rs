//! Inference and decision engine

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::decision::{eco_tip, Decision, INCOMPLETE_MESSAGE};
use super::eco::{eco_fields_complete, eco_score};
use super::payload::{build_row, ScoringPayload};
use super::provider::ModelProvider;
use crate::error::Result;

/// Scoring response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    /// 0-100 in steps of 20
    pub eco_score: u8,
    pub decision: Decision,
    /// Expected loss in soles, 2 decimals, never negative
    #[serde(rename = "perdida_esperada")]
    pub expected_loss: f64,
    /// Default probability as a percentage, 2 decimals
    #[serde(rename = "prob_impago")]
    pub default_probability: f64,
    #[serde(rename = "resumen_ia")]
    pub summary: String,
    pub eco_tip: String,
}

/// Raw model outputs for one payload
#[derive(Debug, Clone, Copy)]
struct Scores {
    probability: f64,
    expected_loss: f64,
}

/// Scores payloads against the provider's current bundle, retraining once when
/// the bundle lacks columns the data source now provides.
#[derive(Debug)]
pub struct RiskEngine<P: ModelProvider> {
    provider: P,
}

impl<P: ModelProvider> RiskEngine<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn assess(&mut self, payload: &ScoringPayload) -> Result<Assessment> {
        let scores = match self.score(payload) {
            Ok(scores) => scores,
            Err(err) if err.is_schema_mismatch() => {
                warn!(error = %err, "Model schema drifted, retraining once");
                self.provider.mark_stale();
                self.provider.refresh()?;
                self.score(payload)?
            }
            Err(err) => return Err(err),
        };

        let eco = eco_score(payload);
        let decision = Decision::from_probability(scores.probability);
        let (summary, tip) = if eco_fields_complete(payload) {
            (decision.summary(), eco_tip(eco))
        } else {
            (INCOMPLETE_MESSAGE, INCOMPLETE_MESSAGE)
        };

        debug!(
            probability = scores.probability,
            expected_loss = scores.expected_loss,
            eco,
            decision = %decision,
            "Payload scored"
        );

        Ok(Assessment {
            eco_score: eco,
            decision,
            expected_loss: round2(scores.expected_loss.max(0.0)),
            default_probability: round2(scores.probability * 100.0),
            summary: summary.to_string(),
            eco_tip: tip.to_string(),
        })
    }

    fn score(&mut self, payload: &ScoringPayload) -> Result<Scores> {
        let source = self.provider.source_columns();
        let bundle = self.provider.bundle()?;
        let row = build_row(payload, &bundle.schema, source.as_deref())?;
        let probability = bundle.classifier.predict_proba(&row)?;
        let expected_loss = bundle.regressor.predict(&row)?;
        Ok(Scores {
            probability: probability.first().copied().unwrap_or(0.0),
            expected_loss: expected_loss.first().copied().unwrap_or(0.0),
        })
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
