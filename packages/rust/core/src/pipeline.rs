//! End-to-end run pipeline.
//!
//! One run: load state, let the controller adjust parameters, generate the
//! query plan, collect candidates from every enabled source, dedup, filter
//! and score, analyze coverage, append the run record, and persist what
//! changed. Transport failures skip that source/query pair; the run itself
//! only fails on invalid configuration or a state-directory write error.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use litscout_history::Ledger;
use litscout_shared::{
    GapReport, Publication, Recommendation, Result, RunRecord, SearchConfig, load_search_config,
    save_search_config,
};
use litscout_sources::{SourceRegistry, parse_candidate};

use crate::{controller, dedup, gaps, queries, scorer};

/// File names inside the state directory.
const SEARCH_CONFIG_FILE: &str = "search_config.json";
const HISTORY_FILE: &str = "history.json";
const REPORT_FILE: &str = "report.json";

/// Resolved locations of the on-disk state documents.
#[derive(Debug, Clone)]
pub struct StatePaths {
    root: PathBuf,
}

impl StatePaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn search_config(&self) -> PathBuf {
        self.root.join(SEARCH_CONFIG_FILE)
    }

    pub fn history(&self) -> PathBuf {
        self.root.join(HISTORY_FILE)
    }

    pub fn report(&self) -> PathBuf {
        self.root.join(REPORT_FILE)
    }
}

/// Per-run settings resolved at the process boundary (config file plus CLI
/// flags). The adaptive search parameters themselves live in
/// [`SearchConfig`], not here.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Directory holding the search config, ledger, and report.
    pub state_dir: PathBuf,
    /// Fixed delay between consecutive external requests.
    pub request_delay: Duration,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Enabled source names, in query order.
    pub sources: Vec<String>,
    /// One-off relevance threshold for this run only; the stored config is
    /// not touched.
    pub min_relevance_override: Option<f64>,
    /// When true, the controller analyzes but applies nothing this run.
    pub observe_only: bool,
}

/// Progress callbacks for long-running collection. The CLI drives a
/// spinner off these; library callers use [`SilentProgress`].
pub trait ProgressReporter: Send + Sync {
    fn query_started(&self, index: usize, total: usize, query: &str) {
        let _ = (index, total, query);
    }
    fn source_finished(&self, source: &str, candidates: usize) {
        let _ = (source, candidates);
    }
}

/// No-op reporter.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {}

/// Everything a completed run produced, for rendering and reporting.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Surviving publications, sorted by descending relevance.
    pub publications: Vec<Publication>,
    /// Coverage gaps in the final set.
    pub gaps: GapReport,
    /// Controller recommendations that fired before this run.
    pub recommendations: Vec<Recommendation>,
    /// The ledger record this run appended.
    pub record: RunRecord,
    /// Queries issued, in order.
    pub queries: Vec<String>,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
}

/// Execute a full run against the real source clients.
pub async fn run(options: &RunOptions, progress: &dyn ProgressReporter) -> Result<RunOutcome> {
    let registry = SourceRegistry::from_names(&options.sources, options.request_timeout)?;
    run_with_registry(options, &registry, progress).await
}

/// Execute a full run against an already-built registry. Split out so tests
/// can inject clients pointed at mock servers.
#[instrument(skip_all, fields(state_dir = %options.state_dir.display()))]
pub async fn run_with_registry(
    options: &RunOptions,
    registry: &SourceRegistry,
    progress: &dyn ProgressReporter,
) -> Result<RunOutcome> {
    let started = Instant::now();
    let paths = StatePaths::new(&options.state_dir);

    // Invalid parameters are fatal before any external call.
    let mut config = load_search_config(&paths.search_config());
    config.validate()?;

    let mut ledger = Ledger::load(&paths.history());
    let run_number = ledger.next_run_number();
    info!(run_number, sources = registry.len(), "starting run");

    let analysis = controller::analyze(ledger.all());
    let config_changed = if options.observe_only {
        if !analysis.recommendations.is_empty() {
            info!("adaptive adjustment disabled for this run");
        }
        false
    } else {
        controller::apply(&mut config, &analysis.recommendations)
    };

    // Gaps in the previous run's output steer this run's queries; gaps in
    // this run's output are recorded for the next one.
    let previous = load_previous_publications(&paths.report());
    let steering_gaps = gaps::analyze(
        &previous,
        &config.target_models,
        &config.target_topics,
        gaps::DEFAULT_MIN_MODEL_COUNT,
        gaps::DEFAULT_MIN_TOPIC_COUNT,
    );

    let plan = queries::generate(&config, &steering_gaps, &analysis.recommendations);
    let collected = collect(&plan, registry, &config, options.request_delay, progress).await;

    let unique = dedup::dedup_by_title(collected);
    let mut kept: Vec<Publication> = unique
        .into_iter()
        .filter_map(|mut publication| {
            let relevant = scorer::is_relevant(
                &publication.title,
                &publication.abstract_text,
                publication.year,
                &config,
                options.min_relevance_override,
            );
            relevant.then(|| {
                publication.relevance_score = scorer::score(
                    &publication.title,
                    &publication.abstract_text,
                    publication.year,
                    &config,
                );
                annotate_targets(&mut publication, &config);
                publication
            })
        })
        .collect();

    kept.sort_by(|a, b| {
        b.relevance_score
            .total_cmp(&a.relevance_score)
            .then_with(|| a.title.cmp(&b.title))
    });

    let avg_relevance_score = if kept.is_empty() {
        0.0
    } else {
        kept.iter().map(|p| p.relevance_score).sum::<f64>() / kept.len() as f64
    };

    let final_gaps = gaps::analyze(
        &kept,
        &config.target_models,
        &config.target_topics,
        gaps::DEFAULT_MIN_MODEL_COUNT,
        gaps::DEFAULT_MIN_TOPIC_COUNT,
    );

    let record = RunRecord {
        id: Uuid::now_v7(),
        timestamp: Utc::now(),
        run_number,
        total_publications: kept.len(),
        avg_relevance_score,
        config: config.clone(),
        queries_used: plan.clone(),
        gaps_identified: final_gaps.clone(),
        recommendations: analysis.recommendations.clone(),
    };

    ledger.append(record.clone());
    ledger.persist()?;

    if config_changed || !paths.search_config().exists() {
        save_search_config(&paths.search_config(), &config)?;
    }

    let elapsed = started.elapsed();
    info!(
        run_number,
        publications = kept.len(),
        avg_relevance = avg_relevance_score,
        elapsed_ms = elapsed.as_millis() as u64,
        "run complete"
    );

    Ok(RunOutcome {
        publications: kept,
        gaps: final_gaps,
        recommendations: analysis.recommendations,
        record,
        queries: plan,
        elapsed,
    })
}

/// Issue every query against every enabled source, pacing requests with the
/// configured delay. A failed source/query pair is logged and skipped;
/// malformed candidates are dropped at the parse boundary.
async fn collect(
    plan: &[String],
    registry: &SourceRegistry,
    config: &SearchConfig,
    delay: Duration,
    progress: &dyn ProgressReporter,
) -> Vec<Publication> {
    let mut collected = Vec::new();
    let mut first_request = true;

    for (index, query) in plan.iter().enumerate() {
        progress.query_started(index + 1, plan.len(), query);

        for client in registry.clients() {
            if !first_request && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            first_request = false;

            match client.search(query, config.max_results_per_query).await {
                Ok(raws) => {
                    let mut parsed = 0usize;
                    for raw in raws {
                        match parse_candidate(raw, client.source()) {
                            Ok(publication) => {
                                collected.push(publication);
                                parsed += 1;
                            }
                            Err(e) => debug!(error = %e, "dropping malformed candidate"),
                        }
                    }
                    progress.source_finished(client.name(), parsed);
                }
                Err(e) => {
                    warn!(source = client.name(), query, error = %e, "source query failed, skipping");
                    progress.source_finished(client.name(), 0);
                }
            }
        }
    }

    debug!(candidates = collected.len(), "collection finished");
    collected
}

/// Tag a publication with the target model and topics its text mentions,
/// so gap analysis can count coverage.
fn annotate_targets(publication: &mut Publication, config: &SearchConfig) {
    let text = format!("{} {}", publication.title, publication.abstract_text).to_lowercase();

    publication.model_name = config
        .target_models
        .iter()
        .find(|model| text.contains(&model.to_lowercase()))
        .cloned();

    publication.topic_focus = config
        .target_topics
        .iter()
        .filter(|topic| text.contains(&topic.to_lowercase()))
        .cloned()
        .collect();
}

/// Read the previous run's publication set out of the report document.
/// Missing or unreadable reports mean no steering input, never an error.
fn load_previous_publications(path: &Path) -> Vec<Publication> {
    let Ok(content) = std::fs::read_to_string(path) else {
        return Vec::new();
    };
    match serde_json::from_str::<serde_json::Value>(&content) {
        Ok(value) => value
            .get("publications")
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default(),
        Err(e) => {
            warn!(?path, error = %e, "previous report unreadable, ignoring");
            Vec::new()
        }
    }
}
