//! Prompt Assembly
//!
//! Renders factor readings and headlines into the single text prompt sent to
//! the scoring oracle. Assembly is total: any combination of present and
//! absent factors produces a prompt.

use std::fmt;
use std::fmt::Write as _;

use crate::factor::{FactorReading, FactorSpec};
use crate::headline::Headline;

/// Placeholder rendered for a factor whose reading is absent
pub const MISSING_FACTOR_NOTE: &str =
    "(Data not available — skip this factor and redistribute weight)";

/// One labelled range of the 0-100 scale
#[derive(Clone, Copy, Debug)]
pub struct ScoreBand {
    pub low: u8,
    pub high: u8,
    pub label: &'static str,
    pub meaning: &'static str,
}

/// Everything that distinguishes one composite index from another
#[derive(Clone, Debug)]
pub struct IndexProfile {
    /// Index name as shown to the oracle and the operator
    pub name: &'static str,

    /// Opening instruction describing the analyst role
    pub role: &'static str,

    /// Factors in rendering order
    pub factors: &'static [FactorSpec],

    /// Score bands, ascending
    pub bands: &'static [ScoreBand],

    /// Extra scoring instructions appended after the band table
    pub extra_instructions: Option<&'static str>,

    /// JSON template the oracle must answer with
    pub response_schema: &'static str,

    /// Note printed under the headline list
    pub headline_note: Option<&'static str>,

    /// Decoding temperature for this index
    pub temperature: f32,
}

impl IndexProfile {
    /// Label of the band containing `score`
    pub fn label_for(&self, score: f64) -> Option<&'static str> {
        if !(0.0..=100.0).contains(&score) {
            return None;
        }
        self.bands
            .iter()
            .find(|band| score < f64::from(band.high) + 1.0)
            .or_else(|| self.bands.last())
            .map(|band| band.label)
    }

    pub fn factor(&self, key: &str) -> Option<&FactorSpec> {
        self.factors.iter().find(|spec| spec.key == key)
    }
}

/// Unscored context block (e.g. per-token market data)
#[derive(Clone, Debug, Default)]
pub struct ContextSection {
    pub title: String,
    pub lines: Vec<String>,
}

impl ContextSection {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            lines: Vec::new(),
        }
    }

    pub fn line(mut self, line: impl Into<String>) -> Self {
        self.lines.push(line.into());
        self
    }
}

/// Immutable prompt text handed to the oracle
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoringPrompt(String);

impl ScoringPrompt {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ScoringPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Assemble the full scoring prompt
pub fn assemble(
    profile: &IndexProfile,
    readings: &[FactorReading],
    headlines: &[Headline],
    context: &[ContextSection],
) -> ScoringPrompt {
    let mut data = String::new();

    for (index, spec) in profile.factors.iter().enumerate() {
        if index > 0 {
            data.push_str("\n\n");
        }
        let _ = write!(
            data,
            "== FACTOR {}: {} (Weight: {}%) ==",
            index + 1,
            spec.title,
            spec.weight
        );

        let record = readings
            .iter()
            .find(|reading| reading.spec.key == spec.key)
            .and_then(FactorReading::record);

        match record {
            Some(record) => {
                for line in record.describe() {
                    let _ = write!(data, "\n- {line}");
                }
                if !spec.hint.is_empty() {
                    let _ = write!(data, "\nNOTE: {}", spec.hint);
                }
            }
            None => {
                data.push('\n');
                data.push_str(MISSING_FACTOR_NOTE);
            }
        }
    }

    if !headlines.is_empty() {
        data.push_str("\n\n== ADDITIONAL CONTEXT: LATEST NEWS HEADLINES ==");
        if let Some(note) = profile.headline_note {
            let _ = write!(data, "\n{note}");
        }
        for (i, headline) in headlines.iter().enumerate() {
            let _ = write!(data, "\n{}. [{}] \"{}\"", i + 1, headline.site, headline.title);
        }
    }

    for section in context {
        let _ = write!(data, "\n\n== {} ==", section.title);
        for line in &section.lines {
            let _ = write!(data, "\n{line}");
        }
    }

    let mut prompt = String::with_capacity(data.len() + 1024);
    let _ = write!(prompt, "{}\n\n{data}\n\n=== SCORING INSTRUCTIONS ===\n", profile.role);
    let _ = writeln!(
        prompt,
        "Calculate a weighted {} score from 0 to 100 based on the available factors above.",
        profile.name
    );
    prompt.push_str(
        "If any factor data is missing, redistribute its weight proportionally among the remaining factors.\n\nSCORE MEANING:\n",
    );
    for band in profile.bands {
        let _ = writeln!(prompt, "- {}-{}: {} ({})", band.low, band.high, band.label, band.meaning);
    }
    prompt.push_str("\nBe objective and data-driven. Weight each factor accordingly.\n");
    if let Some(extra) = profile.extra_instructions {
        let _ = write!(prompt, "\n{extra}\n");
    }
    let _ = write!(
        prompt,
        "\nYou MUST respond with ONLY a valid JSON object, no other text:\n{}",
        profile.response_schema
    );

    ScoringPrompt(prompt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::factor::FactorRecord;

    const FACTORS: &[FactorSpec] = &[
        FactorSpec::new("alpha", "ALPHA", 60.0, "High alpha = Greed."),
        FactorSpec::new("beta", "BETA", 40.0, "Low beta = Fear."),
    ];

    const BANDS: &[ScoreBand] = &[
        ScoreBand { low: 0, high: 49, label: "Low", meaning: "below half" },
        ScoreBand { low: 50, high: 100, label: "High", meaning: "above half" },
    ];

    fn profile() -> IndexProfile {
        IndexProfile {
            name: "Test",
            role: "You are a test analyst.",
            factors: FACTORS,
            bands: BANDS,
            extra_instructions: None,
            response_schema: r#"{"score": <number>}"#,
            headline_note: Some("(context only)"),
            temperature: 0.2,
        }
    }

    #[derive(Debug)]
    struct Alpha;

    impl FactorRecord for Alpha {
        fn describe(&self) -> Vec<String> {
            vec!["Alpha: 7".into()]
        }
    }

    #[test]
    fn test_all_factors_missing_renders_placeholders() {
        let prompt = assemble(&profile(), &[], &[], &[]);
        let text = prompt.as_str();

        assert_eq!(text.matches(MISSING_FACTOR_NOTE).count(), 2);
        assert!(text.contains("== FACTOR 1: ALPHA (Weight: 60%) =="));
        assert!(text.contains("== FACTOR 2: BETA (Weight: 40%) =="));
        assert!(!text.contains("LATEST NEWS HEADLINES"));
    }

    #[test]
    fn test_present_factor_renders_lines_and_hint() {
        let readings = vec![
            FactorReading::new(FACTORS[0], Ok(Alpha)),
            FactorReading::unavailable(FACTORS[1], FetchError::Network("timeout".into())),
        ];
        let prompt = assemble(&profile(), &readings, &[], &[]);
        let text = prompt.as_str();

        assert!(text.contains("- Alpha: 7\nNOTE: High alpha = Greed."));
        assert_eq!(text.matches(MISSING_FACTOR_NOTE).count(), 1);
        assert!(!text.contains("Low beta = Fear."));
    }

    #[test]
    fn test_headlines_and_context() {
        let headlines = vec![Headline::new("Decrypt", "Bitcoin rallies", "https://decrypt.co/1")];
        let context = vec![ContextSection::new("EXTRA").line("--- ETH ---")];
        let prompt = assemble(&profile(), &[], &headlines, &context);
        let text = prompt.as_str();

        assert!(text.contains("(context only)\n1. [Decrypt] \"Bitcoin rallies\""));
        assert!(text.contains("== EXTRA ==\n--- ETH ---"));
        assert!(text.contains("- 0-49: Low (below half)"));
        assert!(text.ends_with(r#"{"score": <number>}"#));
    }

    #[test]
    fn test_label_for() {
        let profile = profile();
        assert_eq!(profile.label_for(10.0), Some("Low"));
        assert_eq!(profile.label_for(62.0), Some("High"));
        assert_eq!(profile.label_for(100.0), Some("High"));
    }
}
