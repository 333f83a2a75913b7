//! Relevance scoring and filtering.
//!
//! [`score`] is a pure function from (title, abstract, year, config) to a
//! 0-100 estimate. [`is_relevant`] layers the hard gates on top: year range,
//! exclusion keywords, required keywords, then the score threshold. The gate
//! ordering is a correctness contract, not just an optimization; a candidate
//! outside the year range must never be scored.

use litscout_shared::SearchConfig;

// Year-recency step bonus, measured against config.max_year.
const RECENCY_NEWEST: f64 = 20.0;
const RECENCY_RECENT: f64 = 15.0;
const RECENCY_MID: f64 = 10.0;
const RECENCY_OLDEST: f64 = 5.0;

// Per-match points and per-category caps. Capping keeps one obsessively
// repeated keyword from dominating the score.
const REQUIRED_POINTS: f64 = 6.0;
const REQUIRED_CAP: f64 = 30.0;
const BOOST_POINTS: f64 = 3.0;
const BOOST_CAP: f64 = 30.0;
const MODEL_POINTS: f64 = 10.0;
const MODEL_CAP: f64 = 20.0;

// Exclusion penalties are deliberately uncapped: a single strong exclusion
// signal may drive the score to 0.
const EXCLUSION_PENALTY: f64 = 15.0;

/// Compute the 0-100 relevance estimate for a candidate.
///
/// Deterministic and side-effect free. Years outside
/// `[min_year, max_year]` earn no recency bonus but are not rejected here;
/// callers pre-filter via [`is_relevant`].
pub fn score(title: &str, abstract_text: &str, year: i32, config: &SearchConfig) -> f64 {
    let text = match_text(title, abstract_text);
    let mut score = recency_bonus(year, config);

    let required = count_matches(&text, &config.required_keywords) as f64;
    score += (required * REQUIRED_POINTS).min(REQUIRED_CAP);

    let boost = count_matches(&text, &config.boost_keywords) as f64;
    score += (boost * BOOST_POINTS).min(BOOST_CAP);

    let models = count_matches(&text, &config.target_models) as f64;
    score += (models * MODEL_POINTS).min(MODEL_CAP);

    let exclusions = count_matches(&text, &config.exclusion_keywords) as f64;
    score -= exclusions * EXCLUSION_PENALTY;

    score.clamp(0.0, 100.0)
}

/// Decide whether a candidate passes the relevance gates.
///
/// Ordered, short-circuiting rejects: year outside range, any exclusion
/// keyword present, required keywords configured but none matched. Only
/// then is the score computed and compared against `threshold_override`
/// (default `config.min_relevance`).
pub fn is_relevant(
    title: &str,
    abstract_text: &str,
    year: i32,
    config: &SearchConfig,
    threshold_override: Option<f64>,
) -> bool {
    if year < config.min_year || year > config.max_year {
        return false;
    }

    let text = match_text(title, abstract_text);

    if count_matches(&text, &config.exclusion_keywords) > 0 {
        return false;
    }

    if !config.required_keywords.is_empty() && count_matches(&text, &config.required_keywords) == 0
    {
        return false;
    }

    let threshold = threshold_override.unwrap_or(config.min_relevance);
    score(title, abstract_text, year, config) >= threshold
}

/// Lowercased `title + " " + abstract` haystack for substring matching.
fn match_text(title: &str, abstract_text: &str) -> String {
    format!("{title} {abstract_text}").to_lowercase()
}

/// Number of distinct keywords appearing in `text` (case-insensitive
/// substring search; `text` must already be lowercased).
fn count_matches(text: &str, keywords: &[String]) -> usize {
    keywords
        .iter()
        .filter(|kw| text.contains(&kw.to_lowercase()))
        .count()
}

/// Recency bonus: full for publications at most a year old, decaying in
/// steps down to a minimum at `min_year`; zero outside the year range.
fn recency_bonus(year: i32, config: &SearchConfig) -> f64 {
    if year < config.min_year || year > config.max_year {
        return 0.0;
    }
    match config.max_year - year {
        0..=1 => RECENCY_NEWEST,
        2..=3 => RECENCY_RECENT,
        4..=5 => RECENCY_MID,
        _ => RECENCY_OLDEST,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> SearchConfig {
        SearchConfig {
            min_year: 2018,
            max_year: 2025,
            required_keywords: vec!["transformer".into(), "language model".into()],
            exclusion_keywords: vec!["clinical trial".into(), "sleep".into()],
            boost_keywords: vec!["genome".into(), "rice".into(), "plant".into()],
            target_models: vec!["DNABERT".into(), "AgroNT".into()],
            min_relevance: 40.0,
            ..SearchConfig::default()
        }
    }

    #[test]
    fn score_is_clamped_to_valid_range() {
        let config = test_config();

        // Many exclusion hits cannot push below zero.
        let low = score(
            "sleep sleep clinical trial",
            "sleep study in a clinical trial",
            2024,
            &config,
        );
        assert!(low >= 0.0);

        // Stacking every bonus cannot exceed 100.
        let high = score(
            "DNABERT AgroNT transformer language model",
            "rice plant genome genome genome transformer language model",
            2025,
            &config,
        );
        assert!(high <= 100.0);
    }

    #[test]
    fn score_is_deterministic() {
        let config = test_config();
        let a = score("DNABERT rice genome", "transformer for plants", 2023, &config);
        let b = score("DNABERT rice genome", "transformer for plants", 2023, &config);
        assert_eq!(a, b);
    }

    #[test]
    fn recency_bonus_steps_down_with_age() {
        let config = test_config();
        let newest = score("transformer", "", 2025, &config);
        let recent = score("transformer", "", 2022, &config);
        let mid = score("transformer", "", 2020, &config);
        let oldest = score("transformer", "", 2018, &config);

        assert!(newest > recent);
        assert!(recent > mid);
        assert!(mid > oldest);
        // Oldest in-range year still earns the minimum bonus.
        assert_eq!(oldest, RECENCY_OLDEST + REQUIRED_POINTS);
    }

    #[test]
    fn out_of_range_year_gets_no_recency_bonus_but_is_scored() {
        let config = test_config();
        // The scorer itself does not reject out-of-range years.
        let pre_range = score("transformer", "", 2010, &config);
        assert_eq!(pre_range, REQUIRED_POINTS);
    }

    #[test]
    fn per_category_caps_limit_repeated_matches() {
        let config = test_config();
        // Both target models matched: 2 * 10 capped at 20.
        let two_models = score("DNABERT AgroNT", "", 2018, &config);
        let one_model = score("DNABERT", "", 2018, &config);
        assert_eq!(two_models - one_model, MODEL_POINTS);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let config = test_config();
        let lower = score("dnabert transformer", "", 2023, &config);
        let upper = score("DNABERT TRANSFORMER", "", 2023, &config);
        assert_eq!(lower, upper);
    }

    #[test]
    fn year_gate_is_absolute() {
        let config = test_config();
        // Well-matched text cannot rescue an out-of-range year.
        assert!(!is_relevant(
            "DNABERT transformer rice genome",
            "plant language model",
            2017,
            &config,
            None,
        ));
        assert!(!is_relevant(
            "DNABERT transformer rice genome",
            "plant language model",
            2026,
            &config,
            None,
        ));
    }

    #[test]
    fn exclusion_dominates_required_and_boost() {
        let config = test_config();
        assert!(!is_relevant(
            "DNABERT transformer rice genome clinical trial",
            "plant language model",
            2024,
            &config,
            None,
        ));
    }

    #[test]
    fn required_keywords_must_match_when_configured() {
        let config = test_config();
        assert!(!is_relevant(
            "rice genome assembly",
            "a classical pipeline without learning",
            2024,
            &config,
            None,
        ));
    }

    #[test]
    fn empty_required_set_skips_the_required_gate() {
        let config = SearchConfig {
            required_keywords: vec![],
            min_relevance: 10.0,
            ..test_config()
        };
        assert!(is_relevant("rice genome", "plant study", 2024, &config, None));
    }

    #[test]
    fn threshold_override_replaces_config_min_relevance() {
        let config = test_config();
        let s = score("transformer rice", "", 2024, &config);
        assert!(is_relevant("transformer rice", "", 2024, &config, Some(s)));
        assert!(!is_relevant("transformer rice", "", 2024, &config, Some(s + 0.1)));
    }
}
