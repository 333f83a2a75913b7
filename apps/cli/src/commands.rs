//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use litscout_core::pipeline::{ProgressReporter, RunOptions, StatePaths};
use litscout_history::Ledger;
use litscout_report::ReviewReport;
use litscout_shared::{AppConfig, init_config, load_config};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// LitScout — adaptive literature discovery for plant genomic models.
#[derive(Parser)]
#[command(
    name = "litscout",
    version,
    about = "Search, score, and track literature on genomic foundation models in plant science.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Execute one search run and write the review report.
    Run {
        /// State directory (defaults to the configured one).
        #[arg(long)]
        state_dir: Option<String>,

        /// One-off relevance threshold for this run (0-100). The stored
        /// search config is not modified.
        #[arg(long)]
        min_relevance: Option<f64>,

        /// Analyze history but do not adjust search parameters.
        #[arg(long)]
        no_adaptive: bool,

        /// Sources to query (repeatable). Defaults to the configured list.
        #[arg(long = "source")]
        sources: Vec<String>,
    },

    /// Show recent runs from the ledger.
    History {
        /// Number of runs to show.
        #[arg(long, default_value = "10")]
        limit: usize,

        /// State directory (defaults to the configured one).
        #[arg(long)]
        state_dir: Option<String>,
    },

    /// Render the Markdown progress document from the full run history.
    Progress {
        /// Write to this file instead of stdout.
        #[arg(short, long)]
        out: Option<String>,

        /// State directory (defaults to the configured one).
        #[arg(long)]
        state_dir: Option<String>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "litscout=info",
        1 => "litscout=debug",
        _ => "litscout=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Run {
            state_dir,
            min_relevance,
            no_adaptive,
            sources,
        } => cmd_run(state_dir.as_deref(), min_relevance, no_adaptive, &sources).await,
        Command::History { limit, state_dir } => cmd_history(limit, state_dir.as_deref()).await,
        Command::Progress { out, state_dir } => {
            cmd_progress(out.as_deref(), state_dir.as_deref()).await
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_run(
    state_dir: Option<&str>,
    min_relevance: Option<f64>,
    no_adaptive: bool,
    sources: &[String],
) -> Result<()> {
    if let Some(threshold) = min_relevance {
        if !(0.0..=100.0).contains(&threshold) {
            return Err(eyre!("--min-relevance {threshold} outside [0, 100]"));
        }
    }

    let config = load_config()?;
    let state_dir = resolve_state_dir(state_dir, &config)?;
    let sources = if sources.is_empty() {
        config.defaults.sources.clone()
    } else {
        sources.to_vec()
    };

    let options = RunOptions {
        state_dir: state_dir.clone(),
        request_delay: Duration::from_millis(config.defaults.request_delay_ms),
        request_timeout: Duration::from_secs(config.defaults.request_timeout_secs),
        sources,
        min_relevance_override: min_relevance,
        observe_only: no_adaptive,
    };

    info!(
        state_dir = %state_dir.display(),
        sources = options.sources.len(),
        "starting literature run"
    );

    let reporter = CliProgress::new();
    let outcome = litscout_core::pipeline::run(&options, &reporter).await?;
    reporter.clear();

    let report = ReviewReport::from_outcome(&outcome);
    let paths = StatePaths::new(&state_dir);
    report.write_json(&paths.report())?;

    println!();
    println!("  Run #{} complete", outcome.record.run_number);
    println!("  Queries:      {}", outcome.queries.len());
    println!("  Publications: {}", outcome.publications.len());
    println!(
        "  Avg score:    {:.1}",
        outcome.record.avg_relevance_score
    );
    println!("  Report:       {}", paths.report().display());
    println!("  Time:         {:.1}s", outcome.elapsed.as_secs_f64());
    println!();
    print!("{}", report.render_summary());

    Ok(())
}

async fn cmd_history(limit: usize, state_dir: Option<&str>) -> Result<()> {
    let config = load_config()?;
    let state_dir = resolve_state_dir(state_dir, &config)?;
    let ledger = Ledger::load(&StatePaths::new(&state_dir).history());

    if ledger.is_empty() {
        println!("No runs recorded yet.");
        return Ok(());
    }

    println!("{:>4}  {:<12} {:>6}  {:>6}  recommendations", "run", "date", "pubs", "avg");
    for record in ledger.last(limit) {
        let recommendations = record
            .recommendations
            .iter()
            .map(|r| r.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "{:>4}  {:<12} {:>6}  {:>6.1}  {}",
            record.run_number,
            record.timestamp.format("%Y-%m-%d"),
            record.total_publications,
            record.avg_relevance_score,
            if recommendations.is_empty() { "-" } else { recommendations.as_str() },
        );
    }

    Ok(())
}

async fn cmd_progress(out: Option<&str>, state_dir: Option<&str>) -> Result<()> {
    let config = load_config()?;
    let state_dir = resolve_state_dir(state_dir, &config)?;
    let ledger = Ledger::load(&StatePaths::new(&state_dir).history());

    match out {
        Some(path) => {
            let path = PathBuf::from(path);
            litscout_report::write_progress(&path, ledger.all())?;
            println!("Progress written to: {}", path.display());
        }
        None => print!("{}", litscout_report::render_progress(ledger.all())),
    }

    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

/// Resolve the state directory from the flag or config, expanding a
/// leading `~`.
fn resolve_state_dir(flag: Option<&str>, config: &AppConfig) -> Result<PathBuf> {
    let raw = flag.unwrap_or(&config.defaults.state_dir);

    if let Some(rest) = raw.strip_prefix("~/") {
        let home =
            dirs::home_dir().ok_or_else(|| eyre!("cannot determine home directory for '{raw}'"))?;
        return Ok(home.join(rest));
    }
    if raw == "~" {
        return dirs::home_dir().ok_or_else(|| eyre!("cannot determine home directory"));
    }

    Ok(PathBuf::from(raw))
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    fn clear(&self) {
        self.spinner.finish_and_clear();
    }
}

impl ProgressReporter for CliProgress {
    fn query_started(&self, index: usize, total: usize, query: &str) {
        self.spinner
            .set_message(format!("Query [{index}/{total}] {query}"));
    }

    fn source_finished(&self, source: &str, candidates: usize) {
        self.spinner
            .set_message(format!("{source}: {candidates} candidates"));
    }
}
