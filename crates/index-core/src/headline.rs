//! News Headlines
//!
//! Unscored context appended to the scoring prompt and stored with each row.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A headline picked from one news site
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Headline {
    /// Display name of the site
    pub site: String,

    /// Article title, whitespace-normalized
    pub title: String,

    /// Absolute article URL
    pub link: String,

    /// Publish time, when the page exposed one
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub published_at: Option<DateTime<Utc>>,
}

impl Headline {
    pub fn new(site: impl Into<String>, title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            site: site.into(),
            title: title.into(),
            link: link.into(),
            published_at: None,
        }
    }

    pub fn published(mut self, at: Option<DateTime<Utc>>) -> Self {
        self.published_at = at;
        self
    }
}

/// Parse the loosely formatted timestamps found in `datetime` / `data-*`
/// attributes: RFC 3339, bare dates, or unix seconds/milliseconds.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    let number: i64 = raw.parse().ok()?;
    if number > 10_000_000_000 {
        DateTime::from_timestamp_millis(number)
    } else {
        DateTime::from_timestamp(number, 0)
    }
}

/// Sort newest first; undated headlines keep their order after dated ones
pub fn sort_newest_first(headlines: &mut [Headline]) {
    headlines.sort_by(|a, b| match (a.published_at, b.published_at) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}

/// Insertion-ordered headline list, unique by link
#[derive(Clone, Debug, Default)]
pub struct HeadlineSet {
    items: Vec<Headline>,
    seen: HashSet<String>,
}

impl HeadlineSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a headline; returns false when its link is already present
    pub fn insert(&mut self, headline: Headline) -> bool {
        if !self.seen.insert(headline.link.clone()) {
            return false;
        }
        self.items.push(headline);
        true
    }

    pub fn contains_link(&self, link: &str) -> bool {
        self.seen.contains(link)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[Headline] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<Headline> {
        self.items
    }
}

impl Extend<Headline> for HeadlineSet {
    fn extend<T: IntoIterator<Item = Headline>>(&mut self, iter: T) {
        for headline in iter {
            self.insert(headline);
        }
    }
}
