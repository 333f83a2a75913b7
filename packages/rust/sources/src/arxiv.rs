//! arXiv client (Atom query API).

use async_trait::async_trait;
use scraper::{Html, Selector};
use tracing::{debug, instrument, warn};

use litscout_shared::{LitScoutError, Result, Source};

use crate::{RawCandidate, SourceClient};

/// Production endpoint for the arXiv query API.
const DEFAULT_BASE_URL: &str = "http://export.arxiv.org";

/// Category filter keeping results in genomics / machine learning.
const CATEGORY_FILTER: &str = "cat:q-bio.GN OR cat:cs.LG OR cat:cs.AI OR cat:stat.ML";

/// Searches arXiv via its Atom feed API.
pub struct ArxivClient {
    http: reqwest::Client,
    base_url: String,
}

impl ArxivClient {
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
impl SourceClient for ArxivClient {
    fn source(&self) -> Source {
        Source::Arxiv
    }

    fn name(&self) -> &'static str {
        "arxiv"
    }

    #[instrument(skip(self), fields(source = "arxiv"))]
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<RawCandidate>> {
        let url = format!("{}/api/query", self.base_url);
        let search_query = format!("({query}) AND ({CATEGORY_FILTER})");

        let response = self
            .http
            .get(&url)
            .query(&[
                ("search_query", search_query.as_str()),
                ("start", "0"),
                ("max_results", &max_results.to_string()),
                ("sortBy", "relevance"),
            ])
            .send()
            .await
            .map_err(|e| LitScoutError::Transport(format!("arxiv: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LitScoutError::Transport(format!("arxiv: HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| LitScoutError::Transport(format!("arxiv: body read failed: {e}")))?;

        Ok(parse_feed(&body, max_results))
    }
}

/// Parse an Atom feed into raw candidates, skipping malformed entries.
fn parse_feed(body: &str, max_results: u32) -> Vec<RawCandidate> {
    let doc = Html::parse_document(body);
    let entry_sel = Selector::parse("entry").expect("static selector");
    let title_sel = Selector::parse("title").expect("static selector");
    let summary_sel = Selector::parse("summary").expect("static selector");
    let id_sel = Selector::parse("id").expect("static selector");
    let published_sel = Selector::parse("published").expect("static selector");
    let author_name_sel = Selector::parse("author name").expect("static selector");

    let mut candidates = Vec::new();

    for entry in doc.select(&entry_sel) {
        if candidates.len() as u32 >= max_results {
            break;
        }

        let text_of = |sel: &Selector| -> Option<String> {
            entry
                .select(sel)
                .next()
                .map(|el| el.text().collect::<String>().trim().to_string())
        };

        let Some(title) = text_of(&title_sel) else {
            warn!("arxiv: entry without title, skipping");
            continue;
        };

        // The entry id doubles as the abstract page URL.
        let url = text_of(&id_sel).unwrap_or_default();

        let year = text_of(&published_sel)
            .and_then(|published| published.get(..4).and_then(|y| y.parse::<i32>().ok()));

        let authors: Vec<String> = entry
            .select(&author_name_sel)
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();

        candidates.push(RawCandidate {
            title: normalize_whitespace(&title),
            abstract_text: text_of(&summary_sel)
                .map(|s| normalize_whitespace(&s))
                .unwrap_or_default(),
            year,
            url,
            authors,
        });
    }

    debug!(candidates = candidates.len(), "arxiv feed parsed");
    candidates
}

/// Atom feeds hard-wrap long titles/abstracts; collapse internal whitespace.
fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
