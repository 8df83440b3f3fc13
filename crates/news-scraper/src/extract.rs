//! Headline Extraction
//!
//! Interprets a site's [`ExtractionRule`] against rendered page HTML and
//! returns candidate headlines in document order, unique by resolved link.

use std::collections::HashSet;

use index_core::headline::parse_timestamp;
use index_core::Headline;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::{Result, ScrapeError};
use crate::rules::{CardRule, ExtractionRule, LinkRule, SiteDescriptor, SlugRule};

/// Navigation phrases that are never headlines
pub const NAV_WORDS: [&str; 13] = [
    "Schedule",
    "Standings",
    "Scores",
    "Playoffs",
    "Results",
    "Watch Live",
    "Sign In",
    "Log In",
    "Subscribe",
    "Download",
    "More News",
    "See All",
    "View All",
];

/// Texts shorter than this are dropped when they contain a nav phrase
const SHORT_NAV_TEXT: usize = 35;

fn selector(source: &str) -> Result<Selector> {
    Selector::parse(source).map_err(|_| ScrapeError::Selector(source.to_string()))
}

/// Visible text with runs of whitespace collapsed to one space
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

fn is_navigation(text: &str) -> bool {
    NAV_WORDS
        .iter()
        .any(|word| text == *word || (text.chars().count() < SHORT_NAV_TEXT && text.contains(word)))
}

fn within(text: &str, min_len: usize, max_len: usize) -> bool {
    let len = text.chars().count();
    (min_len..=max_len).contains(&len)
}

/// Resolve `href` against the site origin; only http(s) links survive
pub fn resolve_link(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    let link = base.join(href).ok()?;
    matches!(link.scheme(), "http" | "https").then_some(link)
}

fn same_site(base: &Url, link: &Url) -> bool {
    let strip = |host: &str| host.trim_start_matches("www.").to_string();
    match (base.host_str(), link.host_str()) {
        (Some(a), Some(b)) => strip(a) == strip(b),
        _ => false,
    }
}

/// Publish time from the nearest card-like ancestor of `anchor`
fn published_near(anchor: ElementRef<'_>, precise: &Selector, loose: &Selector) -> Option<String> {
    let card = anchor
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| matches!(el.value().name(), "article" | "li" | "div" | "section"))?;

    let time = card.select(precise).next().or_else(|| card.select(loose).next())?;
    let value = time.value();
    value
        .attr("datetime")
        .or_else(|| value.attr("data-date"))
        .or_else(|| value.attr("data-timestamp"))
        .map(str::to_string)
}

struct Candidates<'a> {
    site: &'a str,
    seen: HashSet<String>,
    items: Vec<Headline>,
    precise: Selector,
    loose: Selector,
}

impl<'a> Candidates<'a> {
    fn new(site: &'a str) -> Result<Self> {
        Ok(Self {
            site,
            seen: HashSet::new(),
            items: Vec::new(),
            precise: selector("time[datetime]")?,
            loose: selector("[datetime], [data-date], [data-timestamp]")?,
        })
    }

    fn push(&mut self, title: String, link: &Url, anchor: ElementRef<'_>) {
        let link = link.to_string();
        if !self.seen.insert(link.clone()) {
            return;
        }
        let published = published_near(anchor, &self.precise, &self.loose).and_then(|raw| parse_timestamp(&raw));
        self.items.push(Headline::new(self.site, title, link).published(published));
    }
}

fn links(page: &Html, base: &Url, rule: &LinkRule, out: &mut Candidates<'_>) -> Result<()> {
    for anchor in page.select(&selector(rule.selector)?) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let text = element_text(anchor);
        if text.is_empty() || !within(&text, rule.min_len, rule.max_len) {
            continue;
        }
        if rule.excludes.iter().any(|ex| text.contains(ex)) || is_navigation(&text) {
            continue;
        }
        if let Some(link) = resolve_link(base, href) {
            out.push(text, &link, anchor);
        }
    }
    Ok(())
}

fn cards(page: &Html, base: &Url, rule: &CardRule, out: &mut Candidates<'_>) -> Result<()> {
    let heading = selector(rule.heading)?;
    let anchor = selector("a[href]")?;

    for card in page.select(&selector(rule.container)?) {
        let (Some(title), Some(link)) = (card.select(&heading).next(), card.select(&anchor).next()) else {
            continue;
        };
        let text = element_text(title);
        if text.chars().count() < rule.min_len {
            continue;
        }
        let resolved = link.value().attr("href").and_then(|href| resolve_link(base, href));
        if let Some(resolved) = resolved {
            out.push(text, &resolved, link);
        }
    }
    Ok(())
}

fn slug_links(page: &Html, base: &Url, rule: &SlugRule, out: &mut Candidates<'_>) -> Result<()> {
    for anchor in page.select(&selector(rule.selector)?) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        if rule.skip.iter().any(|s| href.contains(s)) {
            continue;
        }
        let text = element_text(anchor);
        if text.is_empty() || !within(&text, rule.min_len, rule.max_len) {
            continue;
        }
        let Some(link) = resolve_link(base, href) else {
            continue;
        };
        if same_site(base, &link) && rule.shape.matches(&link) {
            out.push(text, &link, anchor);
        }
    }
    Ok(())
}

/// All candidate headlines for `site` found in `html`
///
/// Fails only on an unparsable selector or base URL; a page with no
/// matching anchors yields an empty list.
pub fn extract_headlines(site: &SiteDescriptor, html: &str) -> Result<Vec<Headline>> {
    let base = Url::parse(site.base_url).map_err(|e| ScrapeError::Navigation(format!("{}: {e}", site.base_url)))?;
    let page = Html::parse_document(html);
    let mut out = Candidates::new(site.name)?;

    match &site.rule {
        ExtractionRule::Links(rule) => links(&page, &base, rule, &mut out)?,
        ExtractionRule::ArticleCards(rule) => cards(&page, &base, rule, &mut out)?,
        ExtractionRule::SlugLinks(rule) => slug_links(&page, &base, rule, &mut out)?,
    }

    Ok(out.items)
}
