//! Yes/No normalization for sustainability and client flags
//!
//! Source sheets and user payloads spell the same answer many ways ("Sí", "si",
//! 1, true, "yes"). Every flag is folded into the two-valued domain below before
//! it reaches labeling, encoding or the eco score.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Text forms (after trimming and lowercasing) that mean Yes
const YES_FORMS: [&str; 6] = ["si", "sí", "s", "true", "1", "yes"];

/// Text forms (after trimming and lowercasing) that mean No.
/// Anything outside both lists is also No; the list documents the accepted spellings.
const NO_FORMS: [&str; 4] = ["no", "n", "false", "0"];

/// Numbers at or above this value read as Yes
const NUMERIC_YES_CUTOFF: f64 = 0.5;

/// Binary categorical answer used for every flag column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum YesNo {
    #[serde(rename = "Sí")]
    Yes,
    #[serde(rename = "No")]
    No,
}

impl YesNo {
    /// Category label written into flag columns
    pub fn as_str(self) -> &'static str {
        match self {
            YesNo::Yes => "Sí",
            YesNo::No => "No",
        }
    }

    pub fn is_yes(self) -> bool {
        self == YesNo::Yes
    }

    /// Parse free text. Unknown spellings are No.
    pub fn from_text(value: &str) -> Self {
        YesNo::recognize(value).unwrap_or(YesNo::No)
    }

    /// Classify text against the accepted spellings, `None` when it matches neither list
    pub fn recognize(value: &str) -> Option<Self> {
        let normalized = value.trim().to_lowercase();
        if YES_FORMS.contains(&normalized.as_str()) {
            Some(YesNo::Yes)
        } else if NO_FORMS.contains(&normalized.as_str()) {
            Some(YesNo::No)
        } else {
            None
        }
    }

    /// Parse a numeric flag (0/1 columns). NaN is No.
    pub fn from_number(value: f64) -> Self {
        if value >= NUMERIC_YES_CUTOFF {
            YesNo::Yes
        } else {
            YesNo::No
        }
    }

    pub fn from_bool(value: bool) -> Self {
        if value {
            YesNo::Yes
        } else {
            YesNo::No
        }
    }

    /// Parse an optional payload value. Missing, null, arrays and objects are No.
    pub fn from_json(value: Option<&Value>) -> Self {
        match value {
            Some(Value::String(s)) => YesNo::from_text(s),
            Some(Value::Bool(b)) => YesNo::from_bool(*b),
            Some(Value::Number(n)) => n.as_f64().map(YesNo::from_number).unwrap_or(YesNo::No),
            _ => YesNo::No,
        }
    }
}

impl std::fmt::Display for YesNo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_yes_forms() {
        for form in ["Sí", "si", "SI", " s ", "true", "TRUE", "1", "Yes", "sí"] {
            assert_eq!(YesNo::from_text(form), YesNo::Yes, "form {:?}", form);
        }
    }

    #[test]
    fn test_text_no_forms() {
        for form in ["No", "n", "false", "0", " NO "] {
            assert_eq!(YesNo::from_text(form), YesNo::No, "form {:?}", form);
        }
    }

    #[test]
    fn test_unknown_text_is_no() {
        for form in ["", "quizás", "y", "2", "N/A"] {
            assert_eq!(YesNo::recognize(form), None, "form {:?}", form);
            assert_eq!(YesNo::from_text(form), YesNo::No, "form {:?}", form);
        }
    }

    #[test]
    fn test_numbers() {
        assert_eq!(YesNo::from_number(1.0), YesNo::Yes);
        assert_eq!(YesNo::from_number(0.5), YesNo::Yes);
        assert_eq!(YesNo::from_number(0.49), YesNo::No);
        assert_eq!(YesNo::from_number(0.0), YesNo::No);
        assert_eq!(YesNo::from_number(f64::NAN), YesNo::No);
    }

    #[test]
    fn test_json_values() {
        assert_eq!(YesNo::from_json(Some(&json!("sí"))), YesNo::Yes);
        assert_eq!(YesNo::from_json(Some(&json!(true))), YesNo::Yes);
        assert_eq!(YesNo::from_json(Some(&json!(false))), YesNo::No);
        assert_eq!(YesNo::from_json(Some(&json!(1))), YesNo::Yes);
        assert_eq!(YesNo::from_json(Some(&json!(0))), YesNo::No);
        assert_eq!(YesNo::from_json(Some(&Value::Null)), YesNo::No);
        assert_eq!(YesNo::from_json(Some(&json!(["Sí"]))), YesNo::No);
        assert_eq!(YesNo::from_json(None), YesNo::No);
    }

    #[test]
    fn test_labels() {
        assert_eq!(YesNo::Yes.as_str(), "Sí");
        assert_eq!(YesNo::No.to_string(), "No");
    }
}
