//! Core domain types for LitScout literature runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::SearchConfig;

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

/// External publication provider a candidate was retrieved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Arxiv,
    Pmc,
    Biorxiv,
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Source::Arxiv => "arXiv",
            Source::Pmc => "PMC",
            Source::Biorxiv => "bioRxiv",
        };
        write!(f, "{name}")
    }
}

// ---------------------------------------------------------------------------
// Publication
// ---------------------------------------------------------------------------

/// A scored publication record.
///
/// The title is the deduplication identity: two records with the same
/// non-empty title are the same publication and only the first encountered
/// is retained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Publication {
    /// Title, also the dedup key.
    pub title: String,
    /// Ordered author list (may be empty for sources that omit it).
    #[serde(default)]
    pub authors: Vec<String>,
    /// Publication year.
    pub year: i32,
    /// Abstract text; empty when the source only returns summaries.
    #[serde(rename = "abstract", default)]
    pub abstract_text: String,
    /// Canonical URL at the source.
    pub url: String,
    /// Which provider returned this record.
    pub source: Source,
    /// Heuristic 0-100 relevance estimate, set by the scorer.
    #[serde(default)]
    pub relevance_score: f64,
    /// Genomic model this publication is about, when identified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    /// Topics/crops the publication covers. Insertion order irrelevant.
    #[serde(default)]
    pub topic_focus: Vec<String>,
    /// Extracted findings (populated by downstream curation).
    #[serde(default)]
    pub key_findings: Vec<String>,
    /// Datasets referenced (populated by downstream curation).
    #[serde(default)]
    pub datasets_used: Vec<String>,
    /// Stated limitations (populated by downstream curation).
    #[serde(default)]
    pub limitations: Vec<String>,
}

impl Publication {
    /// Minimal constructor for a freshly parsed, unscored candidate.
    pub fn new(
        title: impl Into<String>,
        authors: Vec<String>,
        year: i32,
        abstract_text: impl Into<String>,
        url: impl Into<String>,
        source: Source,
    ) -> Self {
        Self {
            title: title.into(),
            authors,
            year,
            abstract_text: abstract_text.into(),
            url: url.into(),
            source,
            relevance_score: 0.0,
            model_name: None,
            topic_focus: Vec::new(),
            key_findings: Vec::new(),
            datasets_used: Vec::new(),
            limitations: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Recommendation
// ---------------------------------------------------------------------------

/// Discrete steering tag emitted by the parameter controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    /// Result count dropped: lower thresholds, broaden queries.
    ExpandSearch,
    /// Average quality dropped: raise the relevance bar, narrow queries.
    IncreaseStrictness,
    /// Count and quality are in the target band: change nothing.
    MaintainStrategy,
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self {
            Recommendation::ExpandSearch => "EXPAND_SEARCH",
            Recommendation::IncreaseStrictness => "INCREASE_STRICTNESS",
            Recommendation::MaintainStrategy => "MAINTAIN_STRATEGY",
        };
        write!(f, "{tag}")
    }
}

// ---------------------------------------------------------------------------
// GapReport
// ---------------------------------------------------------------------------

/// Target dimensions whose observed coverage fell below policy thresholds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GapReport {
    /// Target models with fewer publications than the model threshold.
    #[serde(default)]
    pub underrepresented_models: Vec<String>,
    /// Target topics with fewer publications than the topic threshold.
    #[serde(default)]
    pub underrepresented_topics: Vec<String>,
    /// One deterministic query per gap, in gap order (models then topics).
    #[serde(default)]
    pub suggested_queries: Vec<String>,
}

impl GapReport {
    /// True when no dimension is under-covered.
    pub fn is_empty(&self) -> bool {
        self.underrepresented_models.is_empty() && self.underrepresented_topics.is_empty()
    }
}

// ---------------------------------------------------------------------------
// RunRecord
// ---------------------------------------------------------------------------

/// Immutable record of one completed run, appended to the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    /// Unique record identifier (UUID v7, time-sortable).
    pub id: Uuid,
    /// When the run completed.
    pub timestamp: DateTime<Utc>,
    /// 1-based, assigned at append time, never reused.
    pub run_number: u32,
    /// Publications surviving dedup + relevance filtering.
    pub total_publications: usize,
    /// Mean relevance score of the surviving set (0 when empty).
    pub avg_relevance_score: f64,
    /// Snapshot of the config the run executed with (post-adjustment).
    pub config: SearchConfig,
    /// Queries issued, in generation order.
    pub queries_used: Vec<String>,
    /// Coverage gaps detected in the final publication set.
    pub gaps_identified: GapReport,
    /// Controller recommendations that fired before this run.
    pub recommendations: Vec<Recommendation>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recommendation_tags_serialize_screaming_snake() {
        let json = serde_json::to_string(&Recommendation::ExpandSearch).expect("serialize");
        assert_eq!(json, "\"EXPAND_SEARCH\"");
        let parsed: Recommendation =
            serde_json::from_str("\"INCREASE_STRICTNESS\"").expect("deserialize");
        assert_eq!(parsed, Recommendation::IncreaseStrictness);
        assert_eq!(Recommendation::MaintainStrategy.to_string(), "MAINTAIN_STRATEGY");
    }

    #[test]
    fn publication_roundtrip_uses_abstract_key() {
        let publication = Publication::new(
            "HyenaDNA for long-range genomes",
            vec!["A. Author".into()],
            2023,
            "Long context DNA modeling.",
            "https://arxiv.org/abs/0000.00000",
            Source::Arxiv,
        );

        let json = serde_json::to_string(&publication).expect("serialize");
        assert!(json.contains("\"abstract\":"));
        assert!(!json.contains("abstract_text"));

        let parsed: Publication = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed.title, publication.title);
        assert_eq!(parsed.abstract_text, "Long context DNA modeling.");
        assert_eq!(parsed.source, Source::Arxiv);
    }

    #[test]
    fn publication_defaults_for_missing_fields() {
        let json = r#"{
            "title": "Minimal record",
            "year": 2022,
            "url": "https://example.org/paper",
            "source": "pmc"
        }"#;
        let parsed: Publication = serde_json::from_str(json).expect("deserialize");
        assert!(parsed.authors.is_empty());
        assert_eq!(parsed.abstract_text, "");
        assert_eq!(parsed.relevance_score, 0.0);
        assert!(parsed.model_name.is_none());
        assert!(parsed.topic_focus.is_empty());
    }

    #[test]
    fn gap_report_empty_check() {
        let mut report = GapReport::default();
        assert!(report.is_empty());
        report.underrepresented_topics.push("rice".into());
        assert!(!report.is_empty());
    }
}
