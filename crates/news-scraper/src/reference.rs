//! Reference Index Scrapes
//!
//! Public index pages read through a browser session when no API is
//! available: the Alternative.me fear & greed page (fallback for its API)
//! and the CoinMarketCap altcoin season page.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::error::{Result, ScrapeError};
use crate::session::{BrowserProvider, PageVisit, SessionConfig, visit_page};

pub const FEAR_GREED_PAGE: &str = "https://alternative.me/crypto/fear-and-greed-index/";
pub const ALTCOIN_SEASON_PAGE: &str = "https://www.coinmarketcap.com/charts/altcoin-season-index/";

const FEAR_GREED_SETTLE: Duration = Duration::from_secs(3);
const ALTCOIN_SEASON_SETTLE: Duration = Duration::from_secs(5);

static FEAR_GREED_TEXT: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)Fear.*?Greed.*?(\d{1,2})").ok());
static ALTCOIN_SEASON_TEXT: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)(?:altcoin\s+season\s+index|altcoin\s+month)[:\s]*(\d{1,3})").ok());

/// Text of the page body, one line per text node, scripts and styles skipped
pub fn visible_text(page: &Html) -> String {
    page.root_element()
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let parent = node.parent().and_then(ElementRef::wrap)?;
            let hidden = matches!(parent.value().name(), "script" | "style" | "noscript" | "head" | "title");
            let trimmed = text.trim();
            (!hidden && !trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Leading integer of `text`, if it is a valid index value
fn index_value(text: &str) -> Option<u8> {
    let digits: String = text.trim().chars().take_while(char::is_ascii_digit).collect();
    digits.parse::<u8>().ok().filter(|v| *v <= 100)
}

fn first_capture(re: Option<&Regex>, text: &str) -> Option<u8> {
    re?.captures(text)?.get(1).and_then(|m| index_value(m.as_str()))
}

/// Current score shown on the Alternative.me index page
pub fn parse_fear_greed_page(html: &str) -> Option<u8> {
    let page = Html::parse_document(html);
    if let Ok(score) = Selector::parse(r#".fng-circle .fng-score, .fng-value, [class*="fear"] [class*="score"]"#) {
        let from_widget = page
            .select(&score)
            .next()
            .and_then(|el| index_value(&el.text().collect::<String>()));
        if from_widget.is_some() {
            return from_widget;
        }
    }
    first_capture((*FEAR_GREED_TEXT).as_ref(), &visible_text(&page))
}

/// Current score shown on the CoinMarketCap altcoin season page
pub fn parse_altcoin_season_page(html: &str) -> Option<u8> {
    let page = Html::parse_document(html);
    first_capture((*ALTCOIN_SEASON_TEXT).as_ref(), &visible_text(&page))
}

/// Scrape the fear & greed score through one browser session
pub async fn scrape_fear_greed(browser: &dyn BrowserProvider, session: &SessionConfig) -> Result<u8> {
    let visit = PageVisit::new(FEAR_GREED_PAGE).settle(FEAR_GREED_SETTLE);
    let html = visit_page(browser, session, &visit).await?;
    parse_fear_greed_page(&html).ok_or_else(|| ScrapeError::NotFound("fear & greed score".into()))
}

/// Scrape the altcoin season score through one browser session
pub async fn scrape_altcoin_season(browser: &dyn BrowserProvider, session: &SessionConfig) -> Result<u8> {
    let visit = PageVisit::new(ALTCOIN_SEASON_PAGE).settle(ALTCOIN_SEASON_SETTLE);
    let html = visit_page(browser, session, &visit).await?;
    parse_altcoin_season_page(&html).ok_or_else(|| ScrapeError::NotFound("altcoin season score".into()))
}
