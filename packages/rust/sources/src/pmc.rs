//! PubMed Central client (NCBI E-utilities JSON API).

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use litscout_shared::{LitScoutError, Result, Source};

use crate::{RawCandidate, SourceClient, extract_year};

/// Production endpoint for the NCBI E-utilities.
const DEFAULT_BASE_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";

/// Searches PubMed Central via esearch + esummary.
///
/// Summaries carry no abstract text; candidates come back with an empty
/// abstract and are scored on title alone.
pub struct PmcClient {
    http: reqwest::Client,
    base_url: String,
}

impl PmcClient {
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

    async fn get_json(&self, path: &str, params: &[(&str, &str)]) -> Result<Value> {
        let url = format!("{}/{path}", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| LitScoutError::Transport(format!("pmc: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LitScoutError::Transport(format!("pmc: HTTP {status}")));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| LitScoutError::Transport(format!("pmc: invalid JSON body: {e}")))
    }
}

#[async_trait]
impl SourceClient for PmcClient {
    fn source(&self) -> Source {
        Source::Pmc
    }

    fn name(&self) -> &'static str {
        "pmc"
    }

    #[instrument(skip(self), fields(source = "pmc"))]
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<RawCandidate>> {
        // Step 1: esearch for matching PMC ids.
        let retmax = max_results.to_string();
        let search = self
            .get_json(
                "esearch.fcgi",
                &[
                    ("db", "pmc"),
                    ("term", query),
                    ("retmax", &retmax),
                    ("retmode", "json"),
                    ("sort", "relevance"),
                ],
            )
            .await?;

        let id_list: Vec<String> = search["esearchresult"]["idlist"]
            .as_array()
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| id.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default();

        if id_list.is_empty() {
            debug!("pmc: no matches");
            return Ok(Vec::new());
        }

        // Step 2: esummary for titles and publication dates.
        let joined = id_list.join(",");
        let summary = self
            .get_json(
                "esummary.fcgi",
                &[("db", "pmc"), ("id", joined.as_str()), ("retmode", "json")],
            )
            .await?;

        let mut candidates = Vec::new();
        for pmc_id in &id_list {
            if candidates.len() as u32 >= max_results {
                break;
            }
            match parse_summary(&summary["result"][pmc_id.as_str()], pmc_id) {
                Some(candidate) => candidates.push(candidate),
                None => warn!(pmc_id, "pmc: malformed summary, skipping"),
            }
        }

        debug!(candidates = candidates.len(), "pmc summaries parsed");
        Ok(candidates)
    }
}

/// Convert one esummary record into a raw candidate, or `None` if it is
/// missing the fields we need.
fn parse_summary(record: &Value, pmc_id: &str) -> Option<RawCandidate> {
    let title = record["title"].as_str()?.trim().to_string();
    if title.is_empty() {
        return None;
    }

    let year = record["pubdate"].as_str().and_then(extract_year);

    let authors: Vec<String> = record["authors"]
        .as_array()
        .map(|list| {
            list.iter()
                .filter_map(|a| a["name"].as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default();

    Some(RawCandidate {
        title,
        abstract_text: String::new(),
        year,
        url: format!("https://www.ncbi.nlm.nih.gov/pmc/articles/PMC{pmc_id}/"),
        authors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn esearch_body(ids: &[&str]) -> Value {
        serde_json::json!({
            "esearchresult": { "idlist": ids }
        })
    }

    #[test]
    fn parse_summary_extracts_title_year_authors() {
        let record = serde_json::json!({
            "title": "Genomic language models for wheat",
            "pubdate": "2023 Nov 14",
            "authors": [{"name": "Author A"}, {"name": "Author B"}]
        });
        let candidate = parse_summary(&record, "9999999").expect("parse");
        assert_eq!(candidate.title, "Genomic language models for wheat");
        assert_eq!(candidate.year, Some(2023));
        assert_eq!(candidate.authors, vec!["Author A", "Author B"]);
        assert!(candidate.url.ends_with("PMC9999999/"));
    }

    #[test]
    fn parse_summary_rejects_missing_title() {
        let record = serde_json::json!({ "pubdate": "2023" });
        assert!(parse_summary(&record, "1").is_none());
    }

    #[tokio::test]
    async fn search_parses_two_step_response() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/esearch.fcgi"))
            .respond_with(ResponseTemplate::new(200).set_body_json(esearch_body(&["11", "22"])))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/esummary.fcgi"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "result": {
                    "11": {
                        "title": "AgroNT applied to barley",
                        "pubdate": "2024 Jan 9",
                        "authors": [{"name": "Author A"}]
                    },
                    "22": {
                        // No title: must be skipped, not fatal.
                        "pubdate": "2022"
                    }
                }
            })))
            .mount(&server)
            .await;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        let client = PmcClient::new(http).with_base_url(server.uri());

        let candidates = client.search("barley genome transformer", 10).await.unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].title, "AgroNT applied to barley");
        assert_eq!(candidates[0].year, Some(2024));
    }

    #[tokio::test]
    async fn empty_id_list_returns_no_candidates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/esearch.fcgi"))
            .respond_with(ResponseTemplate::new(200).set_body_json(esearch_body(&[])))
            .mount(&server)
            .await;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        let client = PmcClient::new(http).with_base_url(server.uri());

        let candidates = client.search("no hits", 10).await.unwrap();
        assert!(candidates.is_empty());
    }

    #[tokio::test]
    async fn transport_failure_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/esearch.fcgi"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        let client = PmcClient::new(http).with_base_url(server.uri());

        let err = client.search("anything", 5).await.unwrap_err();
        assert!(matches!(err, LitScoutError::Transport(_)));
    }
}
