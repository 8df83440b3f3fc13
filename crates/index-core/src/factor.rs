//! Factor Readings
//!
//! A factor is one weighted input to a composite index. Each fetcher yields a
//! typed record or a [`FetchError`]; [`FactorReading`] pairs that outcome with
//! the factor's static description so the prompt assembler can render either
//! the data or a weight-redistribution placeholder.

use std::fmt::Debug;

use crate::error::FetchError;

/// Static description of one factor within an index
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FactorSpec {
    /// Key used in the oracle's `factors` map
    pub key: &'static str,

    /// Section heading, e.g. "VOLATILITY"
    pub title: &'static str,

    /// Weight in percent of the composite score
    pub weight: f64,

    /// Interpretation note appended below the data
    pub hint: &'static str,
}

impl FactorSpec {
    pub const fn new(key: &'static str, title: &'static str, weight: f64, hint: &'static str) -> Self {
        Self { key, title, weight, hint }
    }
}

/// A normalized reading produced by one factor fetcher
pub trait FactorRecord: Debug + Send + Sync {
    /// Field lines rendered under the factor heading (without leading "- ")
    fn describe(&self) -> Vec<String>;

    /// Whether the record carries anything worth scoring
    fn is_usable(&self) -> bool {
        true
    }
}

/// Outcome of one factor fetch, tagged with its spec
#[derive(Debug)]
pub struct FactorReading {
    pub spec: FactorSpec,
    pub outcome: Result<Box<dyn FactorRecord>, FetchError>,
}

impl FactorReading {
    pub fn new<R: FactorRecord + 'static>(spec: FactorSpec, result: Result<R, FetchError>) -> Self {
        Self {
            spec,
            outcome: result.map(|record| Box::new(record) as Box<dyn FactorRecord>),
        }
    }

    pub fn unavailable(spec: FactorSpec, error: FetchError) -> Self {
        Self { spec, outcome: Err(error) }
    }

    /// The record, if it was fetched and is usable
    pub fn record(&self) -> Option<&dyn FactorRecord> {
        match &self.outcome {
            Ok(record) if record.is_usable() => Some(record.as_ref()),
            _ => None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.record().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Fixed(bool);

    impl FactorRecord for Fixed {
        fn describe(&self) -> Vec<String> {
            vec!["Value: 1".into()]
        }

        fn is_usable(&self) -> bool {
            self.0
        }
    }

    const SPEC: FactorSpec = FactorSpec::new("fixed", "FIXED", 10.0, "");

    #[test]
    fn test_available_reading() {
        let reading = FactorReading::new(SPEC, Ok(Fixed(true)));
        assert!(reading.is_available());
        assert_eq!(reading.record().map(|r| r.describe()), Some(vec!["Value: 1".to_string()]));
    }

    #[test]
    fn test_unusable_record_counts_as_absent() {
        let reading = FactorReading::new(SPEC, Ok(Fixed(false)));
        assert!(!reading.is_available());
        assert!(reading.record().is_none());
    }

    #[test]
    fn test_failed_reading() {
        let reading = FactorReading::unavailable(SPEC, FetchError::unavailable("empty"));
        assert!(reading.record().is_none());
    }
}
