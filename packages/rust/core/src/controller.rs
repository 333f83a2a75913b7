//! Adaptive parameter controller.
//!
//! Reads the run ledger, classifies the recent trend, and emits discrete
//! [`Recommendation`]s. Applying recommendations is a separate step so the
//! caller can observe without mutating (`adaptive_mode = false`, or the
//! `--no-adaptive` flag).
//!
//! Trend rules are independent and all fire in one analysis; they are
//! applied to the config in recommendation order, so a later rule can
//! partially undo an earlier one (expand then strictness nets out on
//! `min_relevance` but still raises `max_results_per_query`).

use tracing::{debug, info};

use litscout_shared::{Recommendation, RunRecord, SearchConfig};

/// Result count is "declining" when it drops below this fraction of the
/// previous run.
const DECLINE_RATIO: f64 = 0.8;
/// Average relevance below this marks a low-quality run.
const LOW_QUALITY_SCORE: f64 = 45.0;
/// Target band for result count.
const OPTIMAL_MIN_COUNT: usize = 30;
const OPTIMAL_MAX_COUNT: usize = 50;
/// Average relevance at or above this, inside the count band, is optimal.
const OPTIMAL_SCORE: f64 = 50.0;

/// Adjustment step applied per firing recommendation.
const RELEVANCE_STEP: f64 = 5.0;
const RESULTS_STEP: u32 = 5;
/// Hard bounds the controller never crosses.
const MIN_RELEVANCE_FLOOR: f64 = 30.0;
const MIN_RELEVANCE_CEIL: f64 = 60.0;
const MAX_RESULTS_CAP: u32 = 20;

/// Coarse classification of the trend between the last two runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Fewer than two completed runs; nothing to compare.
    FirstRun,
    /// Result count dropped sharply against the previous run.
    Declining,
    /// Average relevance fell below the quality bar.
    LowQuality,
    /// Count and quality are both in the target band.
    Optimal,
    /// No rule fired.
    Steady,
}

/// Outcome of one controller analysis.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub state: RunState,
    /// Recommendations in rule order; empty on the first run and when no
    /// rule fires.
    pub recommendations: Vec<Recommendation>,
}

/// One trend heuristic over the previous and latest run.
trait TrendRule {
    fn name(&self) -> &'static str;
    fn evaluate(&self, previous: &RunRecord, latest: &RunRecord) -> Option<Recommendation>;
}

struct DecliningResults;

impl TrendRule for DecliningResults {
    fn name(&self) -> &'static str {
        "declining-results"
    }

    fn evaluate(&self, previous: &RunRecord, latest: &RunRecord) -> Option<Recommendation> {
        let threshold = previous.total_publications as f64 * DECLINE_RATIO;
        ((latest.total_publications as f64) < threshold).then_some(Recommendation::ExpandSearch)
    }
}

struct LowQuality;

impl TrendRule for LowQuality {
    fn name(&self) -> &'static str {
        "low-quality"
    }

    fn evaluate(&self, _previous: &RunRecord, latest: &RunRecord) -> Option<Recommendation> {
        (latest.avg_relevance_score < LOW_QUALITY_SCORE)
            .then_some(Recommendation::IncreaseStrictness)
    }
}

struct OptimalBand;

impl TrendRule for OptimalBand {
    fn name(&self) -> &'static str {
        "optimal-band"
    }

    fn evaluate(&self, _previous: &RunRecord, latest: &RunRecord) -> Option<Recommendation> {
        let in_band = (OPTIMAL_MIN_COUNT..=OPTIMAL_MAX_COUNT).contains(&latest.total_publications);
        (in_band && latest.avg_relevance_score >= OPTIMAL_SCORE)
            .then_some(Recommendation::MaintainStrategy)
    }
}

/// Classify the trend over `history` (oldest first) and collect the
/// recommendations that fire. With fewer than two runs there is nothing to
/// compare and the analysis is empty.
pub fn analyze(history: &[RunRecord]) -> Analysis {
    let [.., previous, latest] = history else {
        debug!(runs = history.len(), "not enough history to analyze");
        return Analysis {
            state: RunState::FirstRun,
            recommendations: Vec::new(),
        };
    };

    let rules: [&dyn TrendRule; 3] = [&DecliningResults, &LowQuality, &OptimalBand];
    let mut recommendations = Vec::new();
    let mut state = RunState::Steady;

    for rule in rules {
        if let Some(recommendation) = rule.evaluate(previous, latest) {
            debug!(rule = rule.name(), %recommendation, "trend rule fired");
            if state == RunState::Steady {
                state = match recommendation {
                    Recommendation::ExpandSearch => RunState::Declining,
                    Recommendation::IncreaseStrictness => RunState::LowQuality,
                    Recommendation::MaintainStrategy => RunState::Optimal,
                };
            }
            recommendations.push(recommendation);
        }
    }

    Analysis {
        state,
        recommendations,
    }
}

/// Apply `recommendations` to the config in order. Returns whether any
/// field changed. With `adaptive_mode` off this observes only.
pub fn apply(config: &mut SearchConfig, recommendations: &[Recommendation]) -> bool {
    if !config.adaptive_mode {
        if !recommendations.is_empty() {
            info!("adaptive mode off, recommendations recorded but not applied");
        }
        return false;
    }

    let before = config.clone();

    for recommendation in recommendations {
        match recommendation {
            Recommendation::ExpandSearch => {
                config.min_relevance =
                    (config.min_relevance - RELEVANCE_STEP).max(MIN_RELEVANCE_FLOOR);
                config.max_results_per_query =
                    (config.max_results_per_query + RESULTS_STEP).min(MAX_RESULTS_CAP);
            }
            Recommendation::IncreaseStrictness => {
                config.min_relevance =
                    (config.min_relevance + RELEVANCE_STEP).min(MIN_RELEVANCE_CEIL);
            }
            Recommendation::MaintainStrategy => {}
        }
    }

    let changed = *config != before;
    if changed {
        info!(
            min_relevance = config.min_relevance,
            max_results = config.max_results_per_query,
            "search parameters adjusted"
        );
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use litscout_shared::GapReport;
    use uuid::Uuid;

    fn record(run_number: u32, total: usize, avg: f64) -> RunRecord {
        RunRecord {
            id: Uuid::now_v7(),
            timestamp: Utc::now(),
            run_number,
            total_publications: total,
            avg_relevance_score: avg,
            config: SearchConfig::default(),
            queries_used: vec![],
            gaps_identified: GapReport::default(),
            recommendations: vec![],
        }
    }

    #[test]
    fn single_run_yields_no_recommendations() {
        let analysis = analyze(&[record(1, 12, 55.0)]);
        assert_eq!(analysis.state, RunState::FirstRun);
        assert!(analysis.recommendations.is_empty());
    }

    #[test]
    fn sharp_decline_recommends_expansion() {
        let history = [record(1, 40, 60.0), record(2, 30, 60.0)];
        let analysis = analyze(&history);
        assert_eq!(analysis.state, RunState::Declining);
        assert_eq!(analysis.recommendations, vec![Recommendation::ExpandSearch]);
    }

    #[test]
    fn decline_threshold_is_strict() {
        // Exactly 80% of the previous run is not a decline.
        let history = [record(1, 40, 60.0), record(2, 32, 60.0)];
        let analysis = analyze(&history);
        assert!(analysis.recommendations.is_empty());
        assert_eq!(analysis.state, RunState::Steady);
    }

    #[test]
    fn low_average_recommends_strictness() {
        let history = [record(1, 10, 60.0), record(2, 10, 44.9)];
        let analysis = analyze(&history);
        assert_eq!(analysis.state, RunState::LowQuality);
        assert_eq!(
            analysis.recommendations,
            vec![Recommendation::IncreaseStrictness]
        );
    }

    #[test]
    fn target_band_recommends_maintain() {
        let history = [record(1, 35, 55.0), record(2, 40, 58.0)];
        let analysis = analyze(&history);
        assert_eq!(analysis.state, RunState::Optimal);
        assert_eq!(
            analysis.recommendations,
            vec![Recommendation::MaintainStrategy]
        );
    }

    #[test]
    fn decline_and_low_quality_both_fire() {
        let history = [record(1, 40, 55.0), record(2, 25, 42.0)];
        let analysis = analyze(&history);
        assert_eq!(analysis.state, RunState::Declining);
        assert_eq!(
            analysis.recommendations,
            vec![
                Recommendation::ExpandSearch,
                Recommendation::IncreaseStrictness,
            ]
        );

        // Applied in order: the strictness step undoes the relevance drop,
        // but the widened result cap sticks.
        let mut config = SearchConfig {
            min_relevance: 40.0,
            max_results_per_query: 10,
            ..SearchConfig::default()
        };
        assert!(apply(&mut config, &analysis.recommendations));
        assert_eq!(config.min_relevance, 40.0);
        assert_eq!(config.max_results_per_query, 15);
    }

    #[test]
    fn expansion_lowers_relevance_and_widens_results() {
        let mut config = SearchConfig {
            min_relevance: 40.0,
            max_results_per_query: 10,
            ..SearchConfig::default()
        };
        assert!(apply(&mut config, &[Recommendation::ExpandSearch]));
        assert_eq!(config.min_relevance, 35.0);
        assert_eq!(config.max_results_per_query, 15);
    }

    #[test]
    fn adjustments_respect_hard_bounds() {
        let mut config = SearchConfig {
            min_relevance: 31.0,
            max_results_per_query: 19,
            ..SearchConfig::default()
        };
        apply(&mut config, &[Recommendation::ExpandSearch]);
        assert_eq!(config.min_relevance, 30.0);
        assert_eq!(config.max_results_per_query, 20);

        // Saturated values no longer change.
        assert!(!apply(&mut config, &[Recommendation::ExpandSearch]));

        let mut strict = SearchConfig {
            min_relevance: 58.0,
            ..SearchConfig::default()
        };
        apply(&mut strict, &[Recommendation::IncreaseStrictness]);
        assert_eq!(strict.min_relevance, 60.0);
        assert!(!apply(&mut strict, &[Recommendation::IncreaseStrictness]));
    }

    #[test]
    fn maintain_changes_nothing() {
        let mut config = SearchConfig::default();
        let before = config.clone();
        assert!(!apply(&mut config, &[Recommendation::MaintainStrategy]));
        assert_eq!(config, before);
    }

    #[test]
    fn adaptive_mode_off_observes_only() {
        let mut config = SearchConfig {
            adaptive_mode: false,
            ..SearchConfig::default()
        };
        let before = config.clone();
        assert!(!apply(&mut config, &[Recommendation::ExpandSearch]));
        assert_eq!(config, before);
    }
}
