use crate::factor::FactorSpec;
use crate::prompt::{IndexProfile, ScoreBand};

const FACTORS: &[FactorSpec] = &[FactorSpec::new("only", "ONLY", 100.0, "")];

const BANDS: &[ScoreBand] = &[ScoreBand { low: 0, high: 100, label: "Any", meaning: "anything" }];

pub fn profile() -> IndexProfile {
    IndexProfile {
        name: "Test",
        role: "You are a test analyst.",
        factors: FACTORS,
        bands: BANDS,
        extra_instructions: None,
        response_schema: r#"{"score": <number>}"#,
        headline_note: None,
        temperature: 0.2,
    }
}
