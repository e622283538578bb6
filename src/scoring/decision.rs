//! Credit decision tiers and their narratives

use serde::{Deserialize, Serialize};

/// Default probability at or above which a loan is rejected
pub const REJECT_THRESHOLD: f64 = 0.50;

/// Default probability at or above which a loan goes to review
pub const REVIEW_THRESHOLD: f64 = 0.35;

/// Eco scores below this get the improvement tip
pub const ECO_TIP_THRESHOLD: u8 = 60;

pub const INCOMPLETE_MESSAGE: &str = "Complete los datos ambientales para activar la IA.";

const REJECT_SUMMARY: &str =
    "Riesgo elevado detectado. Se recomienda revisar garantías y plan de manejo.";
const REVIEW_SUMMARY: &str =
    "Riesgo moderado. Considere ajustar condiciones y acompañamiento técnico.";
const APPROVE_SUMMARY: &str = "Perfil saludable con buenas prácticas ambientales.";

const IMPROVE_TIP: &str = "Mejore prácticas sostenibles para reducir riesgo y costo financiero.";
const KEEP_TIP: &str = "Mantenga las buenas prácticas ambientales para sostener el score.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    #[serde(rename = "APROBADO")]
    Approved,
    #[serde(rename = "OBSERVACIÓN")]
    Review,
    #[serde(rename = "RECHAZADO")]
    Rejected,
}

impl Decision {
    /// Tier for a default probability in [0, 1]
    pub fn from_probability(probability: f64) -> Self {
        if probability >= REJECT_THRESHOLD {
            Decision::Rejected
        } else if probability >= REVIEW_THRESHOLD {
            Decision::Review
        } else {
            Decision::Approved
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Decision::Approved => "APROBADO",
            Decision::Review => "OBSERVACIÓN",
            Decision::Rejected => "RECHAZADO",
        }
    }

    /// Risk narrative for this tier
    pub fn summary(self) -> &'static str {
        match self {
            Decision::Rejected => REJECT_SUMMARY,
            Decision::Review => REVIEW_SUMMARY,
            Decision::Approved => APPROVE_SUMMARY,
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub fn eco_tip(eco_score: u8) -> &'static str {
    if eco_score < ECO_TIP_THRESHOLD {
        IMPROVE_TIP
    } else {
        KEEP_TIP
    }
}
