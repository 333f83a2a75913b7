//! Configuration for LitScout.
//!
//! Two layers, loaded at the process boundary and passed explicitly into
//! every component (never ambient globals):
//!
//! - [`AppConfig`]: process-level settings from `~/.litscout/litscout.toml`
//!   (state directory, request pacing, enabled sources). CLI flags override
//!   config file values, which override defaults. Never mutated by a run.
//! - [`SearchConfig`]: the adaptive search parameters, persisted as a JSON
//!   document in the state directory. Mutated only by the parameter
//!   controller, written back after every run in which it changed.

use std::path::{Path, PathBuf};

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::error::{LitScoutError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "litscout.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".litscout";

// ---------------------------------------------------------------------------
// AppConfig (litscout.toml)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Directory holding the search config, ledger, and reports.
    #[serde(default = "default_state_dir")]
    pub state_dir: String,

    /// Fixed delay between external requests, in milliseconds.
    #[serde(default = "default_request_delay")]
    pub request_delay_ms: u64,

    /// Per-request timeout, in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Enabled source clients, in query order.
    #[serde(default = "default_sources")]
    pub sources: Vec<String>,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            state_dir: default_state_dir(),
            request_delay_ms: default_request_delay(),
            request_timeout_secs: default_request_timeout(),
            sources: default_sources(),
        }
    }
}

fn default_state_dir() -> String {
    "~/litscout-state".into()
}
fn default_request_delay() -> u64 {
    1000
}
fn default_request_timeout() -> u64 {
    30
}
fn default_sources() -> Vec<String> {
    vec!["arxiv".into(), "pmc".into(), "biorxiv".into()]
}

// ---------------------------------------------------------------------------
// SearchConfig (search_config.json, controller-owned)
// ---------------------------------------------------------------------------

/// Adaptive search parameters.
///
/// Persisted as a JSON document; read at the start of each run and written
/// back at the end iff the controller changed any field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Oldest acceptable publication year.
    #[serde(default = "default_min_year")]
    pub min_year: i32,

    /// Newest acceptable publication year.
    #[serde(default = "default_max_year")]
    pub max_year: i32,

    /// Minimum relevance score (0-100) a publication must reach.
    #[serde(default = "default_min_relevance")]
    pub min_relevance: f64,

    /// Upper bound on results requested per query per source.
    #[serde(default = "default_max_results")]
    pub max_results_per_query: u32,

    /// At least one of these must appear in title+abstract. Case-insensitive.
    #[serde(default = "default_required_keywords")]
    pub required_keywords: Vec<String>,

    /// Any match hard-rejects the candidate. Case-insensitive.
    #[serde(default = "default_exclusion_keywords")]
    pub exclusion_keywords: Vec<String>,

    /// Matches boost the relevance score. Case-insensitive.
    #[serde(default = "default_boost_keywords")]
    pub boost_keywords: Vec<String>,

    /// Genomic models whose coverage the gap analyzer tracks.
    #[serde(default = "default_target_models")]
    pub target_models: Vec<String>,

    /// Topics/crops whose coverage the gap analyzer tracks.
    #[serde(default = "default_target_topics")]
    pub target_topics: Vec<String>,

    /// Queries issued on every run regardless of gaps or recommendations.
    #[serde(default = "default_base_queries")]
    pub base_queries: Vec<String>,

    /// Reserved adjustment scale in (0, 1]. The current policy applies
    /// fixed steps and does not consume this field.
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,

    /// When false the controller analyzes history but mutates nothing.
    #[serde(default = "default_true")]
    pub adaptive_mode: bool,

    /// When true the query generator adds gap-filling queries.
    #[serde(default = "default_true")]
    pub auto_refine_queries: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_year: default_min_year(),
            max_year: default_max_year(),
            min_relevance: default_min_relevance(),
            max_results_per_query: default_max_results(),
            required_keywords: default_required_keywords(),
            exclusion_keywords: default_exclusion_keywords(),
            boost_keywords: default_boost_keywords(),
            target_models: default_target_models(),
            target_topics: default_target_topics(),
            base_queries: default_base_queries(),
            learning_rate: default_learning_rate(),
            adaptive_mode: true,
            auto_refine_queries: true,
        }
    }
}

fn default_min_year() -> i32 {
    // Transformer-based genomic models emerged ~2017-2018.
    2018
}
fn default_max_year() -> i32 {
    chrono::Utc::now().year()
}
fn default_min_relevance() -> f64 {
    40.0
}
fn default_max_results() -> u32 {
    10
}
fn default_learning_rate() -> f64 {
    0.1
}
fn default_true() -> bool {
    true
}

fn default_required_keywords() -> Vec<String> {
    [
        "transformer",
        "language model",
        "foundation model",
        "pre-trained",
        "BERT",
        "attention mechanism",
        "embedding",
        "self-supervised",
        "deep learning",
        "neural network",
        "machine learning",
    ]
    .map(String::from)
    .to_vec()
}

fn default_exclusion_keywords() -> Vec<String> {
    [
        "sleep",
        "clinical trial",
        "patient",
        "disease diagnosis",
        "cancer therapy",
        "pharmaceutical",
        "medical imaging",
        "radiology",
        "circadian",
        "insomnia",
        "clinical outcome",
        "hospital",
        "medication",
    ]
    .map(String::from)
    .to_vec()
}

fn default_boost_keywords() -> Vec<String> {
    [
        "plant", "crop", "genome", "genomic", "DNA", "gene", "agriculture", "breeding",
        "chromosome", "nucleotide", "sequence", "rice", "wheat", "maize",
    ]
    .map(String::from)
    .to_vec()
}

fn default_target_models() -> Vec<String> {
    [
        "AgroNT",
        "PlantCAD",
        "AlphaGenome",
        "DNABERT",
        "Nucleotide Transformer",
        "HyenaDNA",
        "Caduceus",
        "GenSLM",
        "GENA-LM",
        "Enformer",
        "GPN",
        "Evo",
    ]
    .map(String::from)
    .to_vec()
}

fn default_target_topics() -> Vec<String> {
    ["rice", "wheat", "maize", "barley"].map(String::from).to_vec()
}

fn default_base_queries() -> Vec<String> {
    [
        "genomic foundation model plant",
        "crop genome language model",
    ]
    .map(String::from)
    .to_vec()
}

impl SearchConfig {
    /// Validate the structural invariants.
    ///
    /// A violation is a programming or hand-edit error; it is fatal and must
    /// be raised before any external call is made.
    pub fn validate(&self) -> Result<()> {
        if self.min_year > self.max_year {
            return Err(LitScoutError::invariant(format!(
                "min_year {} > max_year {}",
                self.min_year, self.max_year
            )));
        }
        if !(0.0..=100.0).contains(&self.min_relevance) {
            return Err(LitScoutError::invariant(format!(
                "min_relevance {} outside [0, 100]",
                self.min_relevance
            )));
        }
        if self.max_results_per_query == 0 {
            return Err(LitScoutError::invariant(
                "max_results_per_query must be positive",
            ));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err(LitScoutError::invariant(format!(
                "learning_rate {} outside (0, 1]",
                self.learning_rate
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// AppConfig loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.litscout/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| LitScoutError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.litscout/litscout.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| LitScoutError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| LitScoutError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| LitScoutError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| LitScoutError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| LitScoutError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

// ---------------------------------------------------------------------------
// SearchConfig persistence
// ---------------------------------------------------------------------------

/// Load the persisted search config, falling back to built-in defaults when
/// the file is missing or malformed. Never fatal: a corrupt store means a
/// fresh start, and validation of whatever was loaded happens separately.
pub fn load_search_config(path: &Path) -> SearchConfig {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::debug!(?path, error = %e, "search config not found, using defaults");
            return SearchConfig::default();
        }
    };

    match serde_json::from_str(&content) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(?path, error = %e, "search config malformed, using defaults");
            SearchConfig::default()
        }
    }
}

/// Persist the search config as pretty-printed JSON.
pub fn save_search_config(path: &Path, config: &SearchConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| LitScoutError::io(parent, e))?;
    }
    let content =
        serde_json::to_string_pretty(config).map_err(|e| LitScoutError::config(e.to_string()))?;
    std::fs::write(path, content).map_err(|e| LitScoutError::io(path, e))?;
    Ok(())
}
