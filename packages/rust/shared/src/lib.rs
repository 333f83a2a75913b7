//! Shared domain types, errors, and configuration for LitScout.

pub mod config;
pub mod error;
pub mod types;

pub use config::{
    AppConfig, DefaultsConfig, SearchConfig, config_dir, config_file_path, init_config,
    load_config, load_config_from, load_search_config, save_search_config,
};
pub use error::{LitScoutError, Result};
pub use types::{GapReport, Publication, Recommendation, RunRecord, Source};
