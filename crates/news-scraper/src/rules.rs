//! Site Rules
//!
//! Declarative description of where headlines live on each news site.
//! Rules are plain data; `extract` interprets them against page HTML.

use serde::Serialize;
use url::Url;

/// Minimum anchor text length for link rules unless overridden
pub const DEFAULT_MIN_LEN: usize = 30;
/// Maximum anchor text length for every rule unless overridden
pub const DEFAULT_MAX_LEN: usize = 200;

/// News site grouping used by the monitor
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Indonesia,
    Global,
    Crypto,
    Sports,
}

impl Category {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Indonesia => "indonesia",
            Self::Global => "global",
            Self::Crypto => "crypto",
            Self::Sports => "sports",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anchors matching a selector, filtered by text length and boilerplate
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LinkRule {
    pub selector: &'static str,
    pub min_len: usize,
    pub max_len: usize,

    /// Substrings that disqualify an anchor text
    pub excludes: &'static [&'static str],
}

impl LinkRule {
    pub const fn new(selector: &'static str) -> Self {
        Self {
            selector,
            min_len: DEFAULT_MIN_LEN,
            max_len: DEFAULT_MAX_LEN,
            excludes: &[],
        }
    }

    pub const fn min_len(mut self, min_len: usize) -> Self {
        self.min_len = min_len;
        self
    }

    pub const fn excludes(mut self, excludes: &'static [&'static str]) -> Self {
        self.excludes = excludes;
        self
    }
}

/// Article cards: a heading and the first link inside each container
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CardRule {
    pub container: &'static str,
    pub heading: &'static str,
    pub min_len: usize,
}

/// Required shape of an article URL path
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlugShape {
    /// No path constraint
    Any,

    /// First path segment has at least `n` hyphen-separated words
    FirstSegmentWords(usize),

    /// Whole path has at least `min_words` hyphen-separated words; a nested
    /// path must contain `nested_requires` when set
    SlugWords {
        min_words: usize,
        nested_requires: Option<&'static str>,
    },

    /// At least `n` path segments
    PathDepth(usize),

    /// Exactly one path segment with at least `n` words
    RootSlugWords(usize),
}

impl SlugShape {
    /// Whether the path of `link` has this shape
    pub fn matches(self, link: &Url) -> bool {
        let slug = link.path().trim_matches('/');
        let segments: Vec<&str> = slug.split('/').filter(|s| !s.is_empty()).collect();
        let words = |s: &str| s.split('-').count();

        match self {
            Self::Any => true,
            Self::FirstSegmentWords(n) => segments.first().is_some_and(|first| words(first) >= n),
            Self::SlugWords {
                min_words,
                nested_requires,
            } => {
                if slug.is_empty() || words(slug) < min_words {
                    return false;
                }
                match nested_requires {
                    Some(marker) if slug.contains('/') => slug.contains(marker),
                    _ => true,
                }
            }
            Self::PathDepth(n) => segments.len() >= n,
            Self::RootSlugWords(n) => segments.len() == 1 && words(segments[0]) >= n,
        }
    }
}

/// Anchors whose resolved URL must stay on the site and fit a path shape
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlugRule {
    pub selector: &'static str,
    pub min_len: usize,
    pub max_len: usize,

    /// Substrings of the raw href that disqualify an anchor
    pub skip: &'static [&'static str],

    pub shape: SlugShape,
}

impl SlugRule {
    pub const fn new(selector: &'static str, shape: SlugShape) -> Self {
        Self {
            selector,
            min_len: 25,
            max_len: DEFAULT_MAX_LEN,
            skip: &[],
            shape,
        }
    }

    pub const fn text_len(mut self, min_len: usize, max_len: usize) -> Self {
        self.min_len = min_len;
        self.max_len = max_len;
        self
    }

    pub const fn skip(mut self, skip: &'static [&'static str]) -> Self {
        self.skip = skip;
        self
    }
}

/// How candidate headlines are found on a page
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExtractionRule {
    Links(LinkRule),
    ArticleCards(CardRule),
    SlugLinks(SlugRule),
}

/// One news source
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SiteDescriptor {
    pub name: &'static str,
    pub category: Category,

    /// Page to load
    pub url: &'static str,

    /// Selector awaited after navigation
    pub wait_for: Option<&'static str>,

    /// Origin relative links are resolved against
    pub base_url: &'static str,

    pub rule: ExtractionRule,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_first_segment_words() {
        let shape = SlugShape::FirstSegmentWords(3);
        assert!(shape.matches(&url("https://beincrypto.com/bitcoin-price-rally-stalls/")));
        assert!(!shape.matches(&url("https://beincrypto.com/news/")));
        assert!(!shape.matches(&url("https://beincrypto.com/")));
    }

    #[test]
    fn test_nested_slug_requires_marker() {
        let shape = SlugShape::SlugWords {
            min_words: 3,
            nested_requires: Some("crypto-news"),
        };
        assert!(shape.matches(&url("https://cryptopotato.com/eth-breaks-key-level/")));
        assert!(shape.matches(&url("https://cryptopotato.com/crypto-news/eth-breaks-key-level/")));
        assert!(!shape.matches(&url("https://cryptopotato.com/guides/how-to-stake-eth/")));
    }

    #[test]
    fn test_root_slug_and_depth() {
        let root = SlugShape::RootSlugWords(4);
        assert!(root.matches(&url("https://u.today/xrp-price-eyes-major-breakout")));
        assert!(!root.matches(&url("https://u.today/news/xrp-price-eyes-major-breakout")));
        assert!(!root.matches(&url("https://u.today/bitcoin-news")));

        let depth = SlugShape::PathDepth(2);
        assert!(depth.matches(&url("https://www.newsbtc.com/analysis/btc-holds")));
        assert!(!depth.matches(&url("https://www.newsbtc.com/analysis/")));
    }
}
