//! Rule-based sustainability score

use serde_json::Value;

use super::payload::ScoringPayload;
use crate::pipeline::flags::YesNo;

/// Environmental practice fields counted by the eco score
pub const ECO_FIELDS: [&str; 5] = [
    "predio_saf",
    "predio_libre_deforest",
    "predio_fuera_anp",
    "uso_abonos",
    "manejo_plagas",
];

/// round(100 * yes / 5) over [`ECO_FIELDS`]; missing fields count as No
pub fn eco_score(payload: &ScoringPayload) -> u8 {
    let yes = ECO_FIELDS
        .iter()
        .filter(|key| YesNo::from_json(payload.get(key)).is_yes())
        .count();
    (100.0 * yes as f64 / ECO_FIELDS.len() as f64).round() as u8
}

/// Whether every eco field is present, non-null and not an empty string
pub fn eco_fields_complete(payload: &ScoringPayload) -> bool {
    ECO_FIELDS.iter().all(|key| match payload.get(key) {
        None => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    })
}
