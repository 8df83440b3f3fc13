//! Oracle Reply Parsing
//!
//! The oracle answers in free text that should contain exactly one JSON
//! object. This module finds it, checks the score invariant and converts it
//! into a [`ScoreResult`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{IndexError, Result};

/// Per-token verdict (Fear & Greed only)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TokenScore {
    pub score: f64,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub summary: String,
}

/// Validated oracle verdict
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Composite score, always within [0, 100]
    pub score: f64,

    /// Categorical label, e.g. "Greed"
    pub label: String,

    /// Short free-text explanation
    pub reason: String,

    /// Factor key -> sub-score, `None` when the oracle skipped the factor
    pub factors: BTreeMap<String, Option<f64>>,

    /// Optional per-token scores
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub token_scores: Option<BTreeMap<String, TokenScore>>,
}

/// Locate the first balanced `{...}` substring that parses as JSON.
///
/// Braces inside string literals are ignored, so prose around the object
/// and braces inside the `reason` text do not confuse the scan.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let mut start_search = 0;

    while let Some(offset) = text[start_search..].find('{') {
        let start = start_search + offset;
        if let Some(end) = balanced_end(bytes, start) {
            let candidate = &text[start..=end];
            if serde_json::from_str::<Value>(candidate).is_ok_and(|v| v.is_object()) {
                return Some(candidate);
            }
        }
        start_search = start + 1;
    }
    None
}

fn balanced_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse and validate an oracle reply
pub fn parse_reply(text: &str) -> Result<ScoreResult> {
    let json = extract_json_object(text).ok_or(IndexError::NoJsonFound)?;
    let value: Value = serde_json::from_str(json)?;
    let object = value
        .as_object()
        .ok_or_else(|| IndexError::Parse("reply is not a JSON object".into()))?;

    let score = validate_score(object.get("score"))?;

    let label = object
        .get("label")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .ok_or_else(|| IndexError::Parse("missing label".into()))?
        .to_string();

    let reason = object
        .get("reason")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim()
        .to_string();

    let factors = object
        .get("factors")
        .and_then(Value::as_object)
        .map(sub_scores)
        .unwrap_or_default();

    let token_scores = match object.get("token_scores") {
        Some(Value::Object(tokens)) => Some(
            tokens
                .iter()
                .filter_map(|(symbol, entry)| {
                    serde_json::from_value::<TokenScore>(entry.clone())
                        .ok()
                        .map(|ts| (symbol.clone(), ts))
                })
                .collect(),
        ),
        _ => None,
    };

    Ok(ScoreResult {
        score,
        label,
        reason,
        factors,
        token_scores,
    })
}

fn validate_score(raw: Option<&Value>) -> Result<f64> {
    let Some(raw) = raw else {
        return Err(IndexError::InvalidScore("missing".into()));
    };
    match raw.as_f64() {
        Some(score) if score.is_finite() && (0.0..=100.0).contains(&score) => Ok(score),
        _ => Err(IndexError::InvalidScore(raw.to_string())),
    }
}

fn sub_scores(map: &Map<String, Value>) -> BTreeMap<String, Option<f64>> {
    map.iter()
        .map(|(key, value)| (key.clone(), value.as_f64().filter(|v| v.is_finite())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_object_from_prose() {
        let reply = "Sure! Here is the analysis:\n```json\n{\"score\": 62, \"label\": \"Greed\", \"reason\": \"x\", \"factors\": {\"volatility\": 40, \"social\": null}}\n```\nHope that helps.";
        let result = parse_reply(reply).unwrap();

        assert!((result.score - 62.0).abs() < f64::EPSILON);
        assert_eq!(result.label, "Greed");
        assert_eq!(result.reason, "x");
        assert_eq!(result.factors.get("volatility"), Some(&Some(40.0)));
        assert_eq!(result.factors.get("social"), Some(&None));
    }

    #[test]
    fn test_braces_inside_strings() {
        let reply = r#"{"score": 30, "label": "Fear", "reason": "traders fear a {crash}", "factors": {}}"#;
        let result = parse_reply(reply).unwrap();
        assert_eq!(result.reason, "traders fear a {crash}");
    }

    #[test]
    fn test_skips_non_json_brace_groups() {
        let reply = r#"Using {weights} as given: {"score": 50, "label": "Neutral", "reason": "", "factors": {}}"#;
        assert_eq!(parse_reply(reply).unwrap().label, "Neutral");
    }

    #[test]
    fn test_out_of_range_score_rejected() {
        let reply = r#"{"score": 150, "label": "Greed", "reason": "x", "factors": {}}"#;
        assert!(matches!(parse_reply(reply), Err(IndexError::InvalidScore(s)) if s == "150"));
    }

    #[test]
    fn test_string_score_rejected() {
        let reply = r#"{"score": "62", "label": "Greed", "reason": "x"}"#;
        assert!(matches!(parse_reply(reply), Err(IndexError::InvalidScore(_))));
    }

    #[test]
    fn test_missing_json() {
        assert!(matches!(parse_reply("I cannot help with that."), Err(IndexError::NoJsonFound)));
    }

    #[test]
    fn test_missing_label() {
        let reply = r#"{"score": 10, "reason": "x"}"#;
        assert!(matches!(parse_reply(reply), Err(IndexError::Parse(_))));
    }

    #[test]
    fn test_token_scores() {
        let reply = r#"{"score": 70, "label": "Greed", "reason": "r", "factors": {},
            "token_scores": {"BTC": {"score": 72, "label": "Greed", "summary": "strong"}, "ETH": "n/a"}}"#;
        let tokens = parse_reply(reply).unwrap().token_scores.unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens["BTC"].summary, "strong");
    }
}
