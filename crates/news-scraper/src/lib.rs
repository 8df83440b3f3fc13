//! # news-scraper
//!
//! Headline collection through rented remote browsers.
//!
//! ## Flow
//!
//! ```text
//! ┌────────────┐   ┌──────────────┐   ┌────────────┐   ┌────────────┐
//! │ Site pool  │──▶│ Browser      │──▶│ Extraction │──▶│ Headline   │
//! │ (shuffled) │   │ session/site │   │ rule       │   │ batch      │
//! └────────────┘   └──────────────┘   └────────────┘   └────────────┘
//! ```
//!
//! Sessions come from a [`BrowserProvider`]: [`BrowserCash`] in production,
//! [`StaticBrowser`] in tests. Site rules are data ([`SiteDescriptor`]); the
//! extractor interprets them against the rendered HTML.

pub mod browsercash;
pub mod cdp;
pub mod collector;
pub mod error;
pub mod extract;
pub mod reference;
pub mod rules;
pub mod session;
pub mod sites;

pub use browsercash::{BrowserCash, BrowserCashConfig};
pub use collector::{HeadlineCollector, TARGET_HEADLINES};
pub use error::{Result, ScrapeError};
pub use extract::extract_headlines;
pub use reference::{scrape_altcoin_season, scrape_fear_greed};
pub use rules::{Category, ExtractionRule, SiteDescriptor};
pub use session::{
    BrowserProfile, BrowserProvider, BrowserSession, PageVisit, SessionConfig, SessionKind, StaticBrowser,
    WindowSize, visit_page,
};
pub use sites::{CRYPTO_SITES, NEWS_MONITOR_SITES};
