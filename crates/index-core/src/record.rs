//! Persisted Rows
//!
//! One append-only row per successful run: the verdict, the raw snapshot
//! columns chosen by the index, and the headlines used as context.

use serde::Serialize;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::headline::Headline;
use crate::score::ScoreResult;

/// A row ready to be appended to the index's history table
#[derive(Clone, Debug)]
pub struct PersistedRow {
    /// Destination table
    pub table: String,

    /// Run identifier (log correlation only, not persisted)
    pub run_id: Uuid,

    /// Validated oracle verdict
    pub result: ScoreResult,

    /// Raw snapshot columns, in insertion order
    pub columns: Map<String, Value>,

    /// Headlines shown to the oracle
    pub headlines: Vec<Headline>,
}

impl PersistedRow {
    pub fn new(table: impl Into<String>, run_id: Uuid, result: ScoreResult, headlines: Vec<Headline>) -> Self {
        Self {
            table: table.into(),
            run_id,
            result,
            columns: Map::new(),
            headlines,
        }
    }

    /// Add a raw snapshot column; values that fail to serialize become `null`
    pub fn column(mut self, name: impl Into<String>, value: impl Serialize) -> Self {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.columns.insert(name.into(), value);
        self
    }

    /// JSON object in the table's column layout
    pub fn to_json(&self) -> Value {
        let mut row = Map::new();
        row.insert("score".into(), json!(self.result.score));
        row.insert("label".into(), json!(self.result.label));
        row.insert("reason".into(), json!(self.result.reason));
        for (name, value) in &self.columns {
            row.insert(name.clone(), value.clone());
        }
        let headlines: Vec<Value> = self
            .headlines
            .iter()
            .map(|h| json!({"title": h.title, "link": h.link, "site": h.site}))
            .collect();
        row.insert("headlines".into(), Value::Array(headlines));
        row.insert(
            "factors".into(),
            if self.result.factors.is_empty() {
                Value::Null
            } else {
                json!(self.result.factors)
            },
        );
        Value::Object(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn result() -> ScoreResult {
        ScoreResult {
            score: 62.0,
            label: "Greed".into(),
            reason: "x".into(),
            factors: BTreeMap::from([("volatility".to_string(), Some(55.0)), ("social".to_string(), None)]),
            token_scores: None,
        }
    }

    #[test]
    fn test_row_layout() {
        let row = PersistedRow::new("fear_greed_index", Uuid::new_v4(), result(), vec![
            Headline::new("Decrypt", "Title", "https://decrypt.co/1"),
        ])
        .column("btc_price", 97_500.0)
        .column("btc_volume", Option::<f64>::None);

        let json = row.to_json();
        assert_eq!(json["score"], json!(62.0));
        assert_eq!(json["label"], "Greed");
        assert_eq!(json["btc_price"], json!(97_500.0));
        assert_eq!(json["btc_volume"], Value::Null);
        assert_eq!(json["headlines"][0], json!({"title": "Title", "link": "https://decrypt.co/1", "site": "Decrypt"}));
        assert_eq!(json["factors"]["social"], Value::Null);
        assert_eq!(json["factors"]["volatility"], json!(55.0));
    }

    #[test]
    fn test_empty_factors_are_null() {
        let mut verdict = result();
        verdict.factors.clear();
        let row = PersistedRow::new("t", Uuid::nil(), verdict, Vec::new());
        assert_eq!(row.to_json()["factors"], Value::Null);
    }
}
