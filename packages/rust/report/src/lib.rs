//! Report generation.
//!
//! Two artifacts come out of the state directory:
//!
//! - `report.json`: the structured [`ReviewReport`] for the latest run. Its
//!   `publications` array doubles as the steering input for the next run's
//!   gap analysis, so that key name is part of the on-disk contract.
//! - a Markdown progress document rendered from the full run ledger.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use litscout_core::pipeline::RunOutcome;
use litscout_shared::{
    GapReport, LitScoutError, Publication, Recommendation, Result, RunRecord,
};

/// Summary view limits.
const SUMMARY_TOP_N: usize = 10;

/// Header block of a review report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// When the report was generated.
    pub generated: DateTime<Utc>,
    /// Which run produced it.
    pub run_number: u32,
    /// Size of the surviving publication set.
    pub total_publications: usize,
    /// Mean relevance of the set (0 when empty).
    pub avg_relevance_score: f64,
    /// Min and max publication year in the set, when non-empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_range: Option<(i32, i32)>,
    /// Targets the run was tracking, for reader context.
    pub target_models: Vec<String>,
    pub target_topics: Vec<String>,
}

/// The structured literature review document for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewReport {
    pub metadata: ReportMetadata,
    /// Sorted by descending relevance, as the pipeline left them.
    pub publications: Vec<Publication>,
    pub gaps: GapReport,
    pub recommendations: Vec<Recommendation>,
}

impl ReviewReport {
    /// Build the report for a completed run.
    pub fn from_outcome(outcome: &RunOutcome) -> Self {
        let years: Vec<i32> = outcome.publications.iter().map(|p| p.year).collect();
        let year_range = match (years.iter().min(), years.iter().max()) {
            (Some(&min), Some(&max)) => Some((min, max)),
            _ => None,
        };

        Self {
            metadata: ReportMetadata {
                generated: Utc::now(),
                run_number: outcome.record.run_number,
                total_publications: outcome.publications.len(),
                avg_relevance_score: outcome.record.avg_relevance_score,
                year_range,
                target_models: outcome.record.config.target_models.clone(),
                target_topics: outcome.record.config.target_topics.clone(),
            },
            publications: outcome.publications.clone(),
            gaps: outcome.gaps.clone(),
            recommendations: outcome.recommendations.clone(),
        }
    }

    /// Write the report as pretty-printed JSON.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| LitScoutError::io(parent, e))?;
        }
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| LitScoutError::Storage(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| LitScoutError::io(path, e))?;
        debug!(?path, publications = self.publications.len(), "report written");
        Ok(())
    }

    /// Render the human-readable run summary printed after each run.
    pub fn render_summary(&self) -> String {
        let mut out = String::new();

        out.push_str(&format!(
            "Run #{}: {} publications, avg relevance {:.1}\n",
            self.metadata.run_number,
            self.metadata.total_publications,
            self.metadata.avg_relevance_score,
        ));
        if let Some((min, max)) = self.metadata.year_range {
            out.push_str(&format!("Years covered: {min}-{max}\n"));
        }

        if !self.publications.is_empty() {
            out.push_str(&format!("\nTop publications (max {SUMMARY_TOP_N}):\n"));
            for publication in self.publications.iter().take(SUMMARY_TOP_N) {
                out.push_str(&format!(
                    "  [{:>5.1}] {} ({}, {})\n",
                    publication.relevance_score,
                    publication.title,
                    publication.source,
                    publication.year,
                ));
            }
        }

        if !self.gaps.is_empty() {
            out.push_str("\nCoverage gaps:\n");
            for model in &self.gaps.underrepresented_models {
                out.push_str(&format!("  model: {model}\n"));
            }
            for topic in &self.gaps.underrepresented_topics {
                out.push_str(&format!("  topic: {topic}\n"));
            }
        }

        if !self.recommendations.is_empty() {
            out.push_str("\nRecommendations applied:\n");
            for recommendation in &self.recommendations {
                out.push_str(&format!("  {recommendation}\n"));
            }
        }

        out
    }
}

/// Render the Markdown progress document from the full run ledger.
pub fn render_progress(records: &[RunRecord]) -> String {
    let mut out = String::from("# Literature Search Progress\n\n");

    if records.is_empty() {
        out.push_str("No runs recorded yet.\n");
        return out;
    }

    out.push_str("| Run | Date | Publications | Avg relevance | Recommendations |\n");
    out.push_str("|----:|------|-------------:|--------------:|-----------------|\n");
    for record in records {
        let recommendations = if record.recommendations.is_empty() {
            "-".to_string()
        } else {
            record
                .recommendations
                .iter()
                .map(|r| r.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };
        out.push_str(&format!(
            "| {} | {} | {} | {:.1} | {} |\n",
            record.run_number,
            record.timestamp.format("%Y-%m-%d"),
            record.total_publications,
            record.avg_relevance_score,
            recommendations,
        ));
    }

    if let [.., previous, latest] = records {
        out.push_str("\n## Trend\n\n");
        let delta = latest.total_publications as i64 - previous.total_publications as i64;
        out.push_str(&format!(
            "- Publications: {} ({:+} vs previous run)\n",
            latest.total_publications, delta
        ));
        out.push_str(&format!(
            "- Avg relevance: {:.1} ({:+.1} vs previous run)\n",
            latest.avg_relevance_score,
            latest.avg_relevance_score - previous.avg_relevance_score,
        ));
    }

    if let Some(latest) = records.last() {
        out.push_str("\n## Current parameters\n\n");
        out.push_str(&format!("- min_relevance: {}\n", latest.config.min_relevance));
        out.push_str(&format!(
            "- max_results_per_query: {}\n",
            latest.config.max_results_per_query
        ));
        out.push_str(&format!(
            "- year range: {}-{}\n",
            latest.config.min_year, latest.config.max_year
        ));
        if !latest.gaps_identified.is_empty() {
            out.push_str(&format!(
                "- open gaps: {} models, {} topics\n",
                latest.gaps_identified.underrepresented_models.len(),
                latest.gaps_identified.underrepresented_topics.len(),
            ));
        }
    }

    out
}

/// Write the progress document next to the other state files.
pub fn write_progress(path: &Path, records: &[RunRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| LitScoutError::io(parent, e))?;
    }
    std::fs::write(path, render_progress(records)).map_err(|e| LitScoutError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use litscout_shared::{SearchConfig, Source};
    use std::time::Duration;
    use uuid::Uuid;

    fn publication(title: &str, score: f64, year: i32) -> Publication {
        let mut p = Publication::new(
            title,
            vec!["A. Author".into()],
            year,
            "abstract",
            "https://example.org/p",
            Source::Arxiv,
        );
        p.relevance_score = score;
        p
    }

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
            recommendations: vec![Recommendation::ExpandSearch],
        }
    }

    fn outcome(publications: Vec<Publication>) -> RunOutcome {
        let avg = if publications.is_empty() {
            0.0
        } else {
            publications.iter().map(|p| p.relevance_score).sum::<f64>() / publications.len() as f64
        };
        let mut rec = record(4, publications.len(), avg);
        rec.recommendations = vec![];
        RunOutcome {
            publications,
            gaps: GapReport::default(),
            recommendations: vec![],
            record: rec,
            queries: vec!["q".into()],
            elapsed: Duration::from_millis(5),
        }
    }

    #[test]
    fn report_metadata_reflects_the_outcome() {
        let report = ReviewReport::from_outcome(&outcome(vec![
            publication("A", 80.0, 2021),
            publication("B", 60.0, 2024),
        ]));
        assert_eq!(report.metadata.run_number, 4);
        assert_eq!(report.metadata.total_publications, 2);
        assert_eq!(report.metadata.year_range, Some((2021, 2024)));
        assert_eq!(report.metadata.avg_relevance_score, 70.0);
    }

    #[test]
    fn empty_outcome_has_no_year_range() {
        let report = ReviewReport::from_outcome(&outcome(vec![]));
        assert!(report.metadata.year_range.is_none());
    }

    #[test]
    fn written_json_exposes_the_publications_key() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("report.json");

        let report = ReviewReport::from_outcome(&outcome(vec![publication("A", 80.0, 2021)]));
        report.write_json(&path).expect("write");

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).expect("read")).expect("json");
        let publications = value.get("publications").expect("publications key");
        assert_eq!(publications.as_array().expect("array").len(), 1);
        // Publications keep their wire shape, including the abstract key.
        assert!(publications[0].get("abstract").is_some());
    }

    #[test]
    fn summary_lists_at_most_ten_publications() {
        let publications: Vec<Publication> = (0..15)
            .map(|i| publication(&format!("Paper {i:02}"), 90.0 - i as f64, 2023))
            .collect();
        let report = ReviewReport::from_outcome(&outcome(publications));

        let summary = report.render_summary();
        assert!(summary.contains("Paper 00"));
        assert!(summary.contains("Paper 09"));
        assert!(!summary.contains("Paper 10"));
    }

    #[test]
    fn summary_mentions_gaps_and_recommendations() {
        let mut report = ReviewReport::from_outcome(&outcome(vec![]));
        report.gaps.underrepresented_models.push("Evo".into());
        report.recommendations.push(Recommendation::IncreaseStrictness);

        let summary = report.render_summary();
        assert!(summary.contains("model: Evo"));
        assert!(summary.contains("INCREASE_STRICTNESS"));
    }

    #[test]
    fn progress_renders_one_row_per_run() {
        let records = vec![record(1, 30, 55.0), record(2, 12, 48.0)];
        let progress = render_progress(&records);

        assert!(progress.contains("| 1 |"));
        assert!(progress.contains("| 2 |"));
        assert!(progress.contains("EXPAND_SEARCH"));
        // Trend compares the last two runs.
        assert!(progress.contains("(-18 vs previous run)"));
        assert!(progress.contains("(-7.0 vs previous run)"));
    }

    #[test]
    fn progress_with_no_history_says_so() {
        let progress = render_progress(&[]);
        assert!(progress.contains("No runs recorded yet."));
    }

    #[test]
    fn progress_document_roundtrips_to_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("progress.md");
        write_progress(&path, &[record(1, 10, 50.0)]).expect("write");
        let content = std::fs::read_to_string(&path).expect("read");
        assert!(content.starts_with("# Literature Search Progress"));
    }
}
