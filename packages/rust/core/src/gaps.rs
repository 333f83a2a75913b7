//! Coverage gap analysis.
//!
//! Counts how often each target model and topic appears in the collected
//! set and flags the ones below their minimum count. Gaps feed targeted
//! follow-up queries back into the next run.

use tracing::debug;

use litscout_shared::{GapReport, Publication};

/// A model is covered once it appears this many times.
pub const DEFAULT_MIN_MODEL_COUNT: usize = 3;
/// Topics need broader coverage than individual models.
pub const DEFAULT_MIN_TOPIC_COUNT: usize = 5;

/// Analyze coverage of `publications` against the configured targets.
///
/// Model coverage uses case-insensitive equality on `model_name`; topic
/// coverage counts case-insensitive membership in each publication's
/// `topic_focus` list. Every underrepresented target yields one suggested
/// query, models first.
pub fn analyze(
    publications: &[Publication],
    target_models: &[String],
    target_topics: &[String],
    min_model_count: usize,
    min_topic_count: usize,
) -> GapReport {
    let mut report = GapReport::default();

    for model in target_models {
        let count = publications
            .iter()
            .filter(|p| {
                p.model_name
                    .as_deref()
                    .is_some_and(|name| name.eq_ignore_ascii_case(model))
            })
            .count();
        if count < min_model_count {
            report.underrepresented_models.push(model.clone());
            report
                .suggested_queries
                .push(format!("{model} genomics plant"));
        }
    }

    for topic in target_topics {
        let count = publications
            .iter()
            .filter(|p| {
                p.topic_focus
                    .iter()
                    .any(|t| t.eq_ignore_ascii_case(topic))
            })
            .count();
        if count < min_topic_count {
            report.underrepresented_topics.push(topic.clone());
            report
                .suggested_queries
                .push(format!("{topic} genome language model"));
        }
    }

    debug!(
        models = report.underrepresented_models.len(),
        topics = report.underrepresented_topics.len(),
        "gap analysis complete"
    );
    report
}
