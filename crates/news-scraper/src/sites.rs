//! Site Catalogues
//!
//! - [`CRYPTO_SITES`]: headline pool for the scoring runs
//! - [`NEWS_MONITOR_SITES`]: fixed rotation for the news monitor

use crate::rules::{CardRule, Category, ExtractionRule, LinkRule, SiteDescriptor, SlugRule, SlugShape};

const fn links(
    name: &'static str,
    category: Category,
    url: &'static str,
    wait_for: &'static str,
    base_url: &'static str,
    rule: LinkRule,
) -> SiteDescriptor {
    SiteDescriptor {
        name,
        category,
        url,
        wait_for: Some(wait_for),
        base_url,
        rule: ExtractionRule::Links(rule),
    }
}

const fn slugs(
    name: &'static str,
    url: &'static str,
    wait_for: &'static str,
    base_url: &'static str,
    rule: SlugRule,
) -> SiteDescriptor {
    SiteDescriptor {
        name,
        category: Category::Crypto,
        url,
        wait_for: Some(wait_for),
        base_url,
        rule: ExtractionRule::SlugLinks(rule),
    }
}

const fn cards(name: &'static str, url: &'static str, base_url: &'static str, heading: &'static str) -> SiteDescriptor {
    SiteDescriptor {
        name,
        category: Category::Indonesia,
        url,
        wait_for: Some("article"),
        base_url,
        rule: ExtractionRule::ArticleCards(CardRule {
            container: "article",
            heading,
            min_len: 11,
        }),
    }
}

const DECRYPT: SiteDescriptor = slugs(
    "Decrypt",
    "https://decrypt.co/",
    "a[href^=\"/3\"]",
    "https://decrypt.co",
    SlugRule::new("a[href^=\"/3\"]", SlugShape::Any)
        .text_len(21, 199)
        .skip(&["/price/"]),
);

const COINTELEGRAPH: SiteDescriptor = links(
    "CoinTelegraph",
    Category::Crypto,
    "https://cointelegraph.com/",
    "a[href*=\"/news/\"]",
    "https://cointelegraph.com",
    LinkRule::new("a[href*=\"/news/\"]"),
);

const THE_BLOCK: SiteDescriptor = links(
    "The Block",
    Category::Crypto,
    "https://www.theblock.co/",
    "a[href*=\"/post/\"]",
    "https://www.theblock.co",
    LinkRule::new("a[href*=\"/post/\"]"),
);

/// Headline pool for the scoring runs
pub const CRYPTO_SITES: [SiteDescriptor; 10] = [
    links(
        "CoinDesk",
        Category::Crypto,
        "https://www.coindesk.com/",
        "a[href*=\"/202\"]",
        "https://www.coindesk.com",
        LinkRule::new("a[href*=\"/202\"]")
            .min_len(25)
            .excludes(&["Subscribe", "Sign Up", "Newsletter"]),
    ),
    COINTELEGRAPH,
    DECRYPT,
    THE_BLOCK,
    slugs(
        "BeInCrypto",
        "https://beincrypto.com/news/",
        "article a, a[href*=\"/2\"]",
        "https://beincrypto.com",
        SlugRule::new("a", SlugShape::FirstSegmentWords(3)).skip(&[
            "/author/",
            "/tag/",
            "/category/",
            "/learn/",
            "/price/",
            "/exchanges/",
        ]),
    ),
    slugs(
        "CryptoSlate",
        "https://cryptoslate.com/top-news/",
        "article a, .post-title a",
        "https://cryptoslate.com",
        SlugRule::new(
            "article a, .post-title a, a.news-item, a[href*=\"cryptoslate.com/\"]",
            SlugShape::SlugWords {
                min_words: 3,
                nested_requires: None,
            },
        )
        .skip(&["/author/", "/tag/", "/category/", "/coins/", "/exchanges/"]),
    ),
    slugs(
        "Bitcoin Magazine",
        "https://bitcoinmagazine.com/",
        "a[href*=\"/news/\"], a[href*=\"/markets/\"]",
        "https://bitcoinmagazine.com",
        SlugRule::new(
            "a[href*=\"/news/\"], a[href*=\"/markets/\"], a[href*=\"/business/\"], a[href*=\"/technical/\"]",
            SlugShape::PathDepth(2),
        ),
    ),
    slugs(
        "U.Today",
        "https://u.today/latest-cryptocurrency-news",
        "a[href]",
        "https://u.today",
        SlugRule::new("a[href]", SlugShape::RootSlugWords(4)).skip(&["/latest-"]),
    ),
    slugs(
        "NewsBTC",
        "https://www.newsbtc.com/",
        "a[href*=\"/bitcoin-news/\"], a[href*=\"/altcoin/\"]",
        "https://www.newsbtc.com",
        SlugRule::new(
            "a[href*=\"/bitcoin-news/\"], a[href*=\"/altcoin/\"], a[href*=\"/news/\"], a[href*=\"/analysis/\"]",
            SlugShape::PathDepth(2),
        ),
    ),
    slugs(
        "CryptoPotato",
        "https://cryptopotato.com/crypto-news/",
        "article a, a[href*=\"cryptopotato.com/\"]",
        "https://cryptopotato.com",
        SlugRule::new(
            "article a, .entry-title a, a[href*=\"cryptopotato.com/\"]",
            SlugShape::SlugWords {
                min_words: 3,
                nested_requires: Some("crypto-news"),
            },
        )
        .skip(&["/author/", "/tag/", "/category/"]),
    ),
];

/// Fixed rotation for the news monitor, one session per site
pub const NEWS_MONITOR_SITES: [SiteDescriptor; 20] = [
    cards("CNN Indonesia", "https://www.cnnindonesia.com/", "https://www.cnnindonesia.com", "h2, h3"),
    cards("CNBC Indonesia", "https://www.cnbcindonesia.com/", "https://www.cnbcindonesia.com", "h2"),
    links(
        "Reuters",
        Category::Global,
        "https://www.reuters.com/",
        "a[href*=\"/world/\"], a[href*=\"/business/\"]",
        "https://www.reuters.com",
        LinkRule::new(
            "a[href*=\"/article/\"], a[href*=\"/world/\"], a[href*=\"/business/\"], a[href*=\"/technology/\"]",
        )
        .excludes(&["Subscribe", "Sign"]),
    ),
    links(
        "Al Jazeera",
        Category::Global,
        "https://www.aljazeera.com/",
        "a[href*=\"/news/\"]",
        "https://www.aljazeera.com",
        LinkRule::new("a[href*=\"/news/\"], a[href*=\"/features/\"], a[href*=\"/economy/\"]").excludes(&["More"]),
    ),
    links(
        "CNN International",
        Category::Global,
        "https://edition.cnn.com/",
        "a[href*=\"/202\"]",
        "https://edition.cnn.com",
        LinkRule::new("a[href*=\"/202\"]").min_len(25).excludes(&["Ad Feedback"]),
    ),
    links(
        "Bloomberg",
        Category::Global,
        "https://www.bloomberg.com/",
        "a[href*=\"/news/\"]",
        "https://www.bloomberg.com",
        LinkRule::new("a[href*=\"/news/\"], a[href*=\"/articles/\"]")
            .min_len(25)
            .excludes(&["Subscribe"]),
    ),
    DECRYPT,
    COINTELEGRAPH,
    THE_BLOCK,
    links(
        "Bitcoin Magazine",
        Category::Crypto,
        "https://bitcoinmagazine.com/",
        "a",
        "https://bitcoinmagazine.com",
        LinkRule::new("a[href*=\"/articles/\"], a[href*=\"/business/\"], a[href*=\"/markets/\"]"),
    ),
    links(
        "Messari",
        Category::Crypto,
        "https://messari.io/news",
        "a",
        "https://messari.io",
        LinkRule::new("a[href*=\"/news/\"], a[href*=\"/article/\"]"),
    ),
    links(
        "ESPN",
        Category::Sports,
        "https://www.espn.com/",
        "a[href*=\"/story/\"]",
        "https://www.espn.com",
        LinkRule::new("a[href*=\"/story/\"], a[href*=\"/article/\"]").excludes(&["ESPN+", "Subscribe"]),
    ),
    links(
        "Sky Sports",
        Category::Sports,
        "https://www.skysports.com/",
        "a[href*=\"/news/\"]",
        "https://www.skysports.com",
        LinkRule::new("a[href*=\"/news/\"], a[href*=\"/story/\"]").excludes(&["Watch", "Live"]),
    ),
    links(
        "Goal.com",
        Category::Sports,
        "https://www.goal.com/en",
        "a[href*=\"/news/\"]",
        "https://www.goal.com",
        LinkRule::new("a[href*=\"/news/\"], a[href*=\"/lists/\"]"),
    ),
    links(
        "Bleacher Report",
        Category::Sports,
        "https://bleacherreport.com/",
        "a",
        "https://bleacherreport.com",
        LinkRule::new("a[href*=\"/articles/\"]"),
    ),
    links(
        "UEFA",
        Category::Sports,
        "https://www.uefa.com/",
        "a",
        "https://www.uefa.com",
        LinkRule::new("a[href*=\"/news/\"], a[href*=\"/article/\"]").min_len(15),
    ),
    links(
        "MLB",
        Category::Sports,
        "https://www.mlb.com/news",
        "a[href*=\"/news/\"]",
        "https://www.mlb.com",
        LinkRule::new("a[href*=\"/news/\"]"),
    ),
    links(
        "NBA",
        Category::Sports,
        "https://www.nba.com/news",
        "a[href*=\"/news/\"]",
        "https://www.nba.com",
        LinkRule::new("a[href*=\"/news/\"], a[href*=\"/article/\"]"),
    ),
    links(
        "Marca",
        Category::Sports,
        "https://www.marca.com/en/",
        "a",
        "https://www.marca.com",
        LinkRule::new("a[href*=\"/football/\"], a[href*=\"/basketball/\"], a[href*=\"/tennis/\"]"),
    ),
    links(
        "Football365",
        Category::Sports,
        "https://www.football365.com/",
        "a[href*=\"/news/\"]",
        "https://www.football365.com",
        LinkRule::new("a[href*=\"/news/\"]"),
    ),
];
