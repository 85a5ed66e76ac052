//! CLI definition, option merging, tracing setup and the export command.

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use indicatif::{ProgressBar, ProgressStyle};
use ltb_export_core::{ExportStats, ProgressReporter, encode_document, run_export, write_output};
use ltb_export_repository::{DumpRepository, SiteUrls};
use ltb_export_shared::{AppConfig, ExportOptions, load_config, load_config_from};
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Export the GIS&T Body of Knowledge as a Living Textbook import file.
#[derive(Parser, Debug)]
#[command(
    name = "ltb-export",
    version,
    about = "Export the GIS&T Body of Knowledge as a Living Textbook JSON import file.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Output file; overwritten if it exists.
    pub output: PathBuf,

    /// Site dump to export from.
    #[arg(long, env = "LTB_EXPORT_SOURCE")]
    pub source: PathBuf,

    /// Maximum records per category (unlimited when unset).
    #[arg(long)]
    pub limit: Option<usize>,

    /// Tag-strip node content.
    #[arg(long)]
    pub strip: bool,

    /// Export only the category with this term id.
    #[arg(long)]
    pub ka: Option<u64>,

    /// Category vocabulary id.
    #[arg(long)]
    pub taxonomy: Option<String>,

    /// Config file (defaults to ~/.ltb-export/ltb-export.toml).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Indent the output JSON.
    #[arg(long)]
    pub pretty: bool,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text")]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "ltb_export=info",
        1 => "ltb_export=debug",
        _ => "ltb_export=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Option merging
// ---------------------------------------------------------------------------

/// Build runtime options from the config file, with CLI flags taking precedence.
pub(crate) fn export_options(cli: &Cli, config: &AppConfig) -> Result<ExportOptions> {
    let mut options = ExportOptions::try_from(config).wrap_err("invalid configuration")?;

    if let Some(limit) = cli.limit {
        options.limit = Some(limit);
    }
    if let Some(taxonomy) = &cli.taxonomy {
        options.taxonomy = taxonomy.clone();
    }
    options.strip |= cli.strip;
    options.pretty |= cli.pretty;
    options.category_filter = cli.ka;

    Ok(options)
}

fn resolve_config(cli: &Cli) -> Result<AppConfig> {
    let config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    Ok(config)
}

/// The four count lines printed after a run.
pub(crate) fn summary_lines(stats: &ExportStats) -> [String; 4] {
    [
        format!("Nodes: {}", stats.nodes),
        format!("Learning outcomes: {}", stats.learning_outcomes),
        format!("Keywords: {}", stats.keywords),
        format!("Bibliography: {}", stats.external_resources),
    ]
}

// ---------------------------------------------------------------------------
// Export command
// ---------------------------------------------------------------------------

/// Run the export.
pub(crate) fn run(cli: Cli) -> Result<()> {
    let config = resolve_config(&cli)?;
    let options = export_options(&cli, &config)?;

    let repo = DumpRepository::open(&cli.source, SiteUrls::new(options.base_url.clone()))
        .wrap_err_with(|| format!("failed to load site dump {}", cli.source.display()))?;

    info!(
        source = %cli.source.display(),
        output = %cli.output.display(),
        records = repo.record_count(),
        "starting export"
    );

    let reporter = CliProgress::new();
    let result = run_export(&repo, &options, &reporter)?;

    // An encoding failure is reported but still leaves an (empty) output file.
    let json = match encode_document(&result.document, options.pretty) {
        Ok(json) => json,
        Err(e) => {
            warn!(error = %e, "failed to encode export document");
            println!("{e}");
            String::new()
        }
    };
    write_output(&cli.output, &json)?;

    for line in summary_lines(&result.stats) {
        println!("{line}");
    }
    info!(
        output = %cli.output.display(),
        elapsed_ms = result.elapsed.as_millis() as u64,
        "export written"
    );

    Ok(())
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
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn category_started(&self, name: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Category [{current}/{total}] {name}"));
    }

    fn record_exported(&self, title: &str, node_count: usize) {
        self.spinner
            .set_message(format!("Exported node {node_count}: {title}"));
    }

    fn done(&self, _stats: &ExportStats) {
        self.spinner.finish_and_clear();
    }
}
