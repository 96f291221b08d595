//! Response extraction — recovers typed values from free-text model output.
//!
//! The hosted model returns plain UTF-8 with no guaranteed structure, so every
//! operation here is best-effort and never fails the caller: on a parse or
//! validation problem it substitutes the shape's default and records why.
//! Callers inspect `ok` / `reason` to tell "the model said this" apart from
//! "we defaulted" — the distinction is surfaced in API responses rather than
//! hidden behind sentinel values.
//!
//! This module is pure and stateless. It performs no I/O and no fuzzy JSON
//! repair: a reply that wraps its JSON in prose or code fences is a fallback,
//! not something to salvage.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Shape the caller expects to recover from a model reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpectedShape {
    JsonObject,
    Percentage,
    FreeText,
}

/// Why an extraction fell back to its default value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FallbackReason {
    /// Malformed structured payload: bad JSON syntax, prose wrapping,
    /// a missing `%` marker, a non-numeric prefix.
    Parse(String),
    /// The payload parsed but the value is outside the expected range.
    Validation(String),
}

/// Outcome of one extraction attempt.
///
/// Always carries a usable value of the expected shape — no parse error
/// crosses this boundary. `ok` is false when `value` is the default.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Extraction<T> {
    pub value: T,
    pub ok: bool,
    pub reason: Option<FallbackReason>,
}

impl<T> Extraction<T> {
    fn extracted(value: T) -> Self {
        Self {
            value,
            ok: true,
            reason: None,
        }
    }

    fn fallback(default: T, shape: ExpectedShape, reason: FallbackReason) -> Self {
        warn!(?shape, ?reason, "extraction fell back to default");
        Self {
            value: default,
            ok: false,
            reason: Some(reason),
        }
    }
}

/// Sentiment verdict the model is asked to emit as `{"score": .., "label": ..}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    /// -1.0 (negative) to 1.0 (positive).
    pub score: f64,
    pub label: String,
}

impl Sentiment {
    /// The fallback when a sentiment reply cannot be used.
    pub fn neutral() -> Self {
        Self {
            score: 0.0,
            label: "neutral".to_string(),
        }
    }
}

/// Parses a model reply as a `{score, label}` JSON object.
///
/// Scores outside [-1, 1] are rejected as out-of-range rather than passed
/// through. Falls back to the neutral sentiment on any failure.
pub fn sentiment(text: &str) -> Extraction<Sentiment> {
    match serde_json::from_str::<Sentiment>(text) {
        Ok(parsed) if (-1.0..=1.0).contains(&parsed.score) => Extraction::extracted(parsed),
        Ok(parsed) => Extraction::fallback(
            Sentiment::neutral(),
            ExpectedShape::JsonObject,
            FallbackReason::Validation(format!(
                "sentiment score {} outside [-1, 1]",
                parsed.score
            )),
        ),
        Err(e) => Extraction::fallback(
            Sentiment::neutral(),
            ExpectedShape::JsonObject,
            FallbackReason::Parse(e.to_string()),
        ),
    }
}

/// Default probability when a percentage cannot be recovered from a reply.
pub const DEFAULT_PROBABILITY: f64 = 0.5;

/// Recovers a probability in [0, 1] from a reply that leads with `NN%`.
///
/// Splits on the first `%` and parses the whole trimmed prefix as a number;
/// prose before the number (`"Probability: 72%"`) is a parse failure, not
/// something to scan around. Values outside [0, 100] are out-of-range.
pub fn percentage(text: &str) -> Extraction<f64> {
    let Some((prefix, _)) = text.split_once('%') else {
        return Extraction::fallback(
            DEFAULT_PROBABILITY,
            ExpectedShape::Percentage,
            FallbackReason::Parse("no '%' marker in reply".to_string()),
        );
    };

    match prefix.trim().parse::<f64>() {
        Ok(v) if (0.0..=100.0).contains(&v) => Extraction::extracted(v / 100.0),
        Ok(v) => Extraction::fallback(
            DEFAULT_PROBABILITY,
            ExpectedShape::Percentage,
            FallbackReason::Validation(format!("percentage {v} outside [0, 100]")),
        ),
        Err(_) => Extraction::fallback(
            DEFAULT_PROBABILITY,
            ExpectedShape::Percentage,
            FallbackReason::Parse(format!("non-numeric prefix before '%': {:?}", prefix.trim())),
        ),
    }
}

/// Identity passthrough for replies consumed as narrative text.
pub fn passthrough(text: String) -> String {
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentiment_well_formed_json() {
        let result = sentiment(r#"{"score": 0.8, "label": "positive"}"#);
        assert!(result.ok);
        assert!(result.reason.is_none());
        assert!((result.value.score - 0.8).abs() < f64::EPSILON);
        assert_eq!(result.value.label, "positive");
    }

    #[test]
    fn test_sentiment_tolerates_extra_fields() {
        let result = sentiment(r#"{"score": -0.4, "label": "negative", "confidence": 0.9}"#);
        assert!(result.ok);
        assert!((result.value.score - -0.4).abs() < f64::EPSILON);
    }

    #[test]
    fn test_sentiment_non_json_falls_back_neutral() {
        let result = sentiment("hello world");
        assert!(!result.ok);
        assert_eq!(result.value, Sentiment::neutral());
        assert!(matches!(result.reason, Some(FallbackReason::Parse(_))));
    }

    #[test]
    fn test_sentiment_prose_wrapped_json_is_a_parse_failure() {
        // No fuzzy repair: the reply must BE the object, not contain one.
        let result = sentiment(r#"Sure! Here it is: {"score": 0.5, "label": "positive"}"#);
        assert!(!result.ok);
        assert_eq!(result.value, Sentiment::neutral());
    }

    #[test]
    fn test_sentiment_missing_field_falls_back() {
        let result = sentiment(r#"{"score": 0.5}"#);
        assert!(!result.ok);
        assert_eq!(result.value.label, "neutral");
    }

    #[test]
    fn test_sentiment_score_out_of_range_is_validation_failure() {
        let result = sentiment(r#"{"score": 3.2, "label": "positive"}"#);
        assert!(!result.ok);
        assert_eq!(result.value, Sentiment::neutral());
        assert!(matches!(result.reason, Some(FallbackReason::Validation(_))));
    }

    #[test]
    fn test_percentage_leading_number() {
        let result = percentage("72% chance of purchase");
        assert!(result.ok);
        assert!((result.value - 0.72).abs() < f64::EPSILON);
    }

    #[test]
    fn test_percentage_fractional() {
        let result = percentage("4.5% uplift expected");
        assert!(result.ok);
        assert!((result.value - 0.045).abs() < 1e-12);
    }

    #[test]
    fn test_percentage_no_marker_falls_back() {
        let result = percentage("no percentage here");
        assert!(!result.ok);
        assert!((result.value - DEFAULT_PROBABILITY).abs() < f64::EPSILON);
        assert!(matches!(result.reason, Some(FallbackReason::Parse(_))));
    }

    #[test]
    fn test_percentage_non_numeric_prefix_falls_back() {
        let result = percentage("abc%");
        assert!(!result.ok);
        assert!((result.value - DEFAULT_PROBABILITY).abs() < f64::EPSILON);
    }

    #[test]
    fn test_percentage_prose_prefix_falls_back() {
        // Whole-prefix semantics: prose before the number is not scanned away.
        let result = percentage("Probability: 72%");
        assert!(!result.ok);
    }

    #[test]
    fn test_percentage_out_of_range_is_validation_failure() {
        let result = percentage("140% guaranteed");
        assert!(!result.ok);
        assert!((result.value - DEFAULT_PROBABILITY).abs() < f64::EPSILON);
        assert!(matches!(result.reason, Some(FallbackReason::Validation(_))));
    }

    #[test]
    fn test_percentage_splits_on_first_marker() {
        let result = percentage("30% now, 60% later");
        assert!(result.ok);
        assert!((result.value - 0.30).abs() < f64::EPSILON);
    }

    #[test]
    fn test_passthrough_is_idempotent() {
        let text = "narrative insight".to_string();
        assert_eq!(passthrough(passthrough(text.clone())), text);
    }
}
