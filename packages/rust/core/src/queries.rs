//! Query generation for a run.
//!
//! The query list is assembled from four layers, in order: the configured
//! base queries, gap-filling queries for under-covered models and topics,
//! expansion queries when the controller asked to widen, and narrowing
//! queries when it asked for strictness. The final list is deduplicated
//! with first occurrence winning, so the plan stays stable and bounded.

use tracing::debug;

use litscout_shared::{GapReport, Recommendation, SearchConfig};

/// Broad queries appended on [`Recommendation::ExpandSearch`].
const EXPANSION_QUERIES: [&str; 3] = [
    "plant genomics deep learning",
    "agricultural AI transformer",
    "crop breeding machine learning",
];

/// Focused queries appended on [`Recommendation::IncreaseStrictness`].
const NARROWING_QUERIES: [&str; 2] = [
    "plant genome pre-trained model",
    "crop genomics BERT transformer",
];

/// At most this many model-gap queries per run.
const MODEL_GAP_LIMIT: usize = 3;
/// At most this many topic-gap queries per run.
const TOPIC_GAP_LIMIT: usize = 2;

/// Build the ordered, deduplicated query plan for one run.
///
/// Gap queries are only added when `auto_refine_queries` is on; base
/// queries are always issued.
pub fn generate(
    config: &SearchConfig,
    gaps: &GapReport,
    recommendations: &[Recommendation],
) -> Vec<String> {
    let mut queries: Vec<String> = config.base_queries.clone();

    if config.auto_refine_queries {
        for model in gaps.underrepresented_models.iter().take(MODEL_GAP_LIMIT) {
            queries.push(format!("{model} transformer"));
        }
        for topic in gaps.underrepresented_topics.iter().take(TOPIC_GAP_LIMIT) {
            queries.push(format!("{topic} genomics neural network"));
        }
    }

    if recommendations.contains(&Recommendation::ExpandSearch) {
        queries.extend(EXPANSION_QUERIES.map(String::from));
    }
    if recommendations.contains(&Recommendation::IncreaseStrictness) {
        queries.extend(NARROWING_QUERIES.map(String::from));
    }

    let mut seen = std::collections::HashSet::new();
    queries.retain(|q| seen.insert(q.clone()));

    debug!(count = queries.len(), "query plan generated");
    queries
}
