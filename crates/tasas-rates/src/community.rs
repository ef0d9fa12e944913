use std::sync::OnceLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use tasas_models::quote::{labels, Currency, Quote, QuoteSet, SourceKind};

use crate::error::FetchError;
use crate::source::RateSource;

/// Keyword groups searched in the page text. Within a group the first keyword
/// with a usable number wins, so each group yields at most one quote.
const CATEGORIES: &[(&str, Currency, &[&str])] = &[
    (labels::ZELLE, Currency::Usd, &["zelle"]),
    (labels::PAYPAL, Currency::Usd, &["paypal"]),
    (labels::DOLLAR, Currency::Usd, &["dólar", "dollar"]),
    (labels::EURO, Currency::Eur, &["euro", "eur", "€"]),
];

/// Best-effort scraper for a community rates page.
///
/// The heuristic takes the first number that follows a keyword on the same
/// line. It is fragile by nature; callers fall back to derived estimates.
pub struct CommunityScrapeClient {
    client: reqwest::Client,
    url: String,
}

impl CommunityScrapeClient {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl RateSource for CommunityScrapeClient {
    fn name(&self) -> &str {
        "community_scrape"
    }

    fn kind(&self) -> SourceKind {
        SourceKind::CommunityScrape
    }

    async fn fetch(&self) -> Result<QuoteSet, FetchError> {
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let html = response.text().await?;
        let text = visible_text(&html);
        if text.trim().is_empty() {
            return Err(FetchError::InvalidPayload(
                "page has no visible text".to_string(),
            ));
        }

        let quotes = extract_quotes(&text, Utc::now());
        for quote in &quotes {
            tracing::info!(label = %quote.label, price = quote.price, "Community rate found");
        }
        Ok(quotes)
    }
}

struct Patterns {
    hidden: Regex,
    line_break: Regex,
    tag: Regex,
    spaces: Regex,
    keywords: Vec<(&'static str, Currency, Vec<Regex>)>,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let compile = |p: &str| Regex::new(p).expect("static pattern is valid");
        Patterns {
            hidden: compile(
                r"(?is)<head\b.*?</head\s*>|<script\b.*?</script\s*>|<style\b.*?</style\s*>|<noscript\b.*?</noscript\s*>",
            ),
            line_break: compile(r"(?i)<br\s*/?>|</(p|div|li|tr|h[1-6]|section|article|td|th)\s*>"),
            tag: compile(r"<[^>]*>"),
            spaces: compile(r"[ \t\x{a0}]+"),
            keywords: CATEGORIES
                .iter()
                .map(|(label, currency, words)| {
                    let regexes = words
                        .iter()
                        .map(|w| compile(&format!(r"(?i){}.*?(\d+[,.]?\d*)", regex::escape(w))))
                        .collect();
                    (*label, *currency, regexes)
                })
                .collect(),
        }
    })
}

/// Reduce an HTML document to its visible text, one block per line.
pub fn visible_text(html: &str) -> String {
    let p = patterns();
    let text = p.hidden.replace_all(html, " ");
    let text = p.line_break.replace_all(&text, "\n");
    let text = p.tag.replace_all(&text, " ");
    let text = decode_entities(&text);

    text.lines()
        .map(|line| p.spaces.replace_all(line, " ").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn decode_entities(text: &str) -> String {
    const ENTITIES: &[(&str, &str)] = &[
        ("&nbsp;", " "),
        ("&euro;", "€"),
        ("&#8364;", "€"),
        ("&oacute;", "ó"),
        ("&#243;", "ó"),
        ("&aacute;", "á"),
        ("&eacute;", "é"),
        ("&iacute;", "í"),
        ("&uacute;", "ú"),
        ("&ntilde;", "ñ"),
        ("&quot;", "\""),
        ("&#39;", "'"),
        ("&lt;", "<"),
        ("&gt;", ">"),
        ("&amp;", "&"),
    ];
    ENTITIES
        .iter()
        .fold(text.to_string(), |acc, (entity, ch)| acc.replace(entity, ch))
}

/// Apply the keyword patterns to page text.
pub fn extract_quotes(text: &str, fetched_at: DateTime<Utc>) -> QuoteSet {
    let lowered = text.to_lowercase();
    let mut quotes = Vec::new();

    for (label, currency, regexes) in &patterns().keywords {
        let found = regexes.iter().find_map(|re| {
            let captured = re.captures(&lowered)?.get(1)?.as_str();
            captured
                .replace(',', ".")
                .parse::<f64>()
                .ok()
                .filter(|price| *price > 0.0)
        });

        if let Some(price) = found {
            quotes.push(Quote::observed(
                SourceKind::CommunityScrape,
                *label,
                *currency,
                price,
                fetched_at,
            ));
        }
    }

    quotes
}
