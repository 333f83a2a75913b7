//! Source clients for external publication providers.
//!
//! Each client implements [`SourceClient`]: `search(query, max_results)`
//! returns loosely-typed [`RawCandidate`]s, skipping malformed remote items
//! instead of failing the whole call, and honoring `max_results` as an
//! upper bound. Candidates cross into the core only through the strict
//! [`parse_candidate`] boundary, which yields a typed [`Publication`] or a
//! parse error; partially-typed data never propagates inward.

mod arxiv;
mod biorxiv;
mod pmc;

use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;

use litscout_shared::{LitScoutError, Publication, Result, Source};

pub use arxiv::ArxivClient;
pub use biorxiv::BiorxivClient;
pub use pmc::PmcClient;

/// User-Agent string for provider requests.
const USER_AGENT: &str = concat!("LitScout/", env!("CARGO_PKG_VERSION"));

/// Years accepted by the parse boundary. Anything outside is remote junk.
const PLAUSIBLE_YEARS: std::ops::RangeInclusive<i32> = 1900..=2100;

// ---------------------------------------------------------------------------
// RawCandidate + parse boundary
// ---------------------------------------------------------------------------

/// An untyped candidate tuple as returned by a provider, before validation.
#[derive(Debug, Clone, Default)]
pub struct RawCandidate {
    pub title: String,
    pub abstract_text: String,
    pub year: Option<i32>,
    pub url: String,
    pub authors: Vec<String>,
}

/// Convert a raw provider payload into a typed [`Publication`].
///
/// Rejects candidates with an empty title (they cannot be deduplicated),
/// a missing or implausible year, or an empty URL.
pub fn parse_candidate(raw: RawCandidate, source: Source) -> Result<Publication> {
    let title = raw.title.trim();
    if title.is_empty() {
        return Err(LitScoutError::parse(format!("{source}: candidate has no title")));
    }

    let year = raw
        .year
        .ok_or_else(|| LitScoutError::parse(format!("{source}: '{title}' has no year")))?;
    if !PLAUSIBLE_YEARS.contains(&year) {
        return Err(LitScoutError::parse(format!(
            "{source}: '{title}' has implausible year {year}"
        )));
    }

    if raw.url.trim().is_empty() {
        return Err(LitScoutError::parse(format!("{source}: '{title}' has no URL")));
    }

    Ok(Publication::new(
        title,
        raw.authors,
        year,
        raw.abstract_text.trim(),
        raw.url.trim(),
        source,
    ))
}

// ---------------------------------------------------------------------------
// SourceClient trait + registry
// ---------------------------------------------------------------------------

/// A provider-specific search client.
///
/// Implementations must never fail on partial/malformed remote data: a
/// malformed item is skipped and whatever could be parsed is returned.
/// Transport-level failures (network, timeout, non-2xx) are errors; the
/// caller skips that source/query pair and continues the run.
#[async_trait]
pub trait SourceClient: Send + Sync {
    /// Which provider this client talks to.
    fn source(&self) -> Source;

    /// Lowercase client name used in config and tracing.
    fn name(&self) -> &'static str;

    /// Search the provider. Returns at most `max_results` candidates.
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<RawCandidate>>;
}

/// Holds enabled clients in query order.
pub struct SourceRegistry {
    clients: Vec<Box<dyn SourceClient>>,
}

impl std::fmt::Debug for SourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceRegistry")
            .field(
                "clients",
                &self.clients.iter().map(|c| c.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl SourceRegistry {
    /// Build a registry from already-constructed clients (tests inject
    /// clients pointed at mock servers).
    pub fn new(clients: Vec<Box<dyn SourceClient>>) -> Self {
        Self { clients }
    }

    /// Build a registry for the named sources. Unknown names are rejected
    /// so a config typo surfaces before any external call.
    pub fn from_names(names: &[String], timeout: Duration) -> Result<Self> {
        let http = build_http_client(timeout)?;

        let mut clients: Vec<Box<dyn SourceClient>> = Vec::new();
        for name in names {
            match name.as_str() {
                "arxiv" => clients.push(Box::new(ArxivClient::new(http.clone()))),
                "pmc" => clients.push(Box::new(PmcClient::new(http.clone()))),
                "biorxiv" => clients.push(Box::new(BiorxivClient::new(http.clone()))),
                other => {
                    return Err(LitScoutError::config(format!(
                        "unknown source '{other}': expected arxiv, pmc, or biorxiv"
                    )));
                }
            }
        }
        Ok(Self { clients })
    }

    /// Enabled clients in configured order.
    pub fn clients(&self) -> &[Box<dyn SourceClient>] {
        &self.clients
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

/// Build a reqwest client with the per-request timeout from config.
fn build_http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(5))
        .timeout(timeout)
        .build()
        .map_err(|e| LitScoutError::Transport(format!("failed to build HTTP client: {e}")))
}

// ---------------------------------------------------------------------------
// Shared parsing helpers
// ---------------------------------------------------------------------------

/// Pull a four-digit 20xx year out of a free-form date string
/// (`"2023 Nov 14"`, `"Posted March 02, 2024"`, ...).
pub(crate) fn extract_year(text: &str) -> Option<i32> {
    let re = Regex::new(r"20\d{2}").expect("static year pattern");
    re.find(text)?.as_str().parse().ok()
}
