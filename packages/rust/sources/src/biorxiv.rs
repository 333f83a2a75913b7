//! bioRxiv client (highwire search result scraping).
//!
//! bioRxiv has no search API; we scrape the result listing the same way a
//! browser renders it. Selectors target the highwire-cite markup.

use async_trait::async_trait;
use scraper::{Html, Selector};
use tracing::{debug, instrument, warn};
use url::Url;

use litscout_shared::{LitScoutError, Result, Source};

use crate::{RawCandidate, SourceClient, extract_year};

/// Production site root.
const DEFAULT_BASE_URL: &str = "https://www.biorxiv.org";

/// Searches bioRxiv by scraping its highwire search results.
///
/// Result snippets stand in for abstracts; authors are not present in the
/// listing markup and come back empty.
pub struct BiorxivClient {
    http: reqwest::Client,
    base_url: String,
}

impl BiorxivClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point the client at a different endpoint (integration tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl SourceClient for BiorxivClient {
    fn source(&self) -> Source {
        Source::Biorxiv
    }

    fn name(&self) -> &'static str {
        "biorxiv"
    }

    #[instrument(skip(self), fields(source = "biorxiv"))]
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<RawCandidate>> {
        // The search term plus display directives live in the path segment;
        // Url::parse percent-encodes the spaces.
        let raw = format!(
            "{}/search/{query} numresults:{max_results} sort:relevance-rank",
            self.base_url
        );
        let url = Url::parse(&raw)
            .map_err(|e| LitScoutError::Transport(format!("biorxiv: bad search URL: {e}")))?;

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| LitScoutError::Transport(format!("biorxiv: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LitScoutError::Transport(format!("biorxiv: HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| LitScoutError::Transport(format!("biorxiv: body read failed: {e}")))?;

        Ok(parse_listing(&body, &self.base_url, max_results))
    }
}

/// Parse a highwire search listing, skipping malformed citations.
fn parse_listing(body: &str, base_url: &str, max_results: u32) -> Vec<RawCandidate> {
    let doc = Html::parse_document(body);
    let cite_sel = Selector::parse("span.highwire-cite").expect("static selector");
    let title_sel = Selector::parse("span.highwire-cite-title").expect("static selector");
    let snippet_sel = Selector::parse("span.highwire-cite-snippet").expect("static selector");
    let date_sel = Selector::parse("span.highwire-cite-metadata-date").expect("static selector");
    let link_sel = Selector::parse("a").expect("static selector");

    let mut candidates = Vec::new();

    for cite in doc.select(&cite_sel) {
        if candidates.len() as u32 >= max_results {
            break;
        }

        let Some(title_el) = cite.select(&title_sel).next() else {
            warn!("biorxiv: citation without title, skipping");
            continue;
        };
        let title = title_el.text().collect::<String>().trim().to_string();

        let abstract_text = cite
            .select(&snippet_sel)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        let year = cite
            .select(&date_sel)
            .next()
            .and_then(|el| extract_year(&el.text().collect::<String>()));

        let url = title_el
            .select(&link_sel)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(|href| {
                if href.starts_with("http") {
                    href.to_string()
                } else {
                    format!("{base_url}{href}")
                }
            })
            .unwrap_or_default();

        candidates.push(RawCandidate {
            title,
            abstract_text,
            year,
            url,
            authors: Vec::new(),
        });
    }

    debug!(candidates = candidates.len(), "biorxiv listing parsed");
    candidates
}
