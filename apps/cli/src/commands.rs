//! CLI flag definitions, routing, and tracing setup.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use hcmdoc_core::pipeline::{PipelineConfig, PipelineSummary, ProgressReporter};
use hcmdoc_discovery::{DiscoveryOptions, TocSource};
use hcmdoc_shared::{
    AppConfig, HarvestConfig, init_config, init_config_at, load_config, load_config_from,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

/// Crates whose spans and events are shown at the selected verbosity.
const LOG_TARGETS: &[&str] = &[
    "hcmdoc_cli",
    "hcmdoc_core",
    "hcmdoc_crawler",
    "hcmdoc_discovery",
    "hcmdoc_extract",
    "hcmdoc_artifacts",
    "hcmdoc_shared",
];

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// hcmdoc: scrape Oracle HCM data-model docs into tables/views metadata.
///
/// Stages run in order when both of their paths are given:
/// `--toc` + `--csv` extracts links, `--csv` + `--json` converts them,
/// `--json` + `--tables` + `--views` extracts page metadata.
#[derive(Parser)]
#[command(
    name = "hcmdoc",
    version,
    about = "Scrape Oracle HCM data-model documentation into table and view metadata.",
    long_about = None,
    args_conflicts_with_subcommands = true,
)]
pub(crate) struct Cli {
    /// TOC script to read links from (path or http(s) URL).
    #[arg(long)]
    pub toc: Option<String>,

    /// Links CSV (written by link extraction, read by conversion).
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Links JSON (written by conversion, read by metadata extraction).
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Output file for table metadata.
    #[arg(long)]
    pub tables: Option<PathBuf>,

    /// Output file for view metadata.
    #[arg(long)]
    pub views: Option<PathBuf>,

    /// Config file (defaults to ~/.hcmdoc/hcmdoc.toml).
    #[arg(long, global = true, env = "HCMDOC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Base URL TOC hrefs are appended to.
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Delay after each page load before extraction, in milliseconds.
    #[arg(long, global = true)]
    pub settle_ms: Option<u64>,

    /// Pause after each page, in milliseconds.
    #[arg(long, global = true)]
    pub throttle_ms: Option<u64>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Subcommands. Without one, the scraping stages run.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Configuration management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Write a config file with defaults.
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

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let directives = LOG_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",");

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
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
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match &cli.command {
        Some(Command::Config { action }) => match action {
            ConfigAction::Init => cmd_config_init(&cli),
            ConfigAction::Show => cmd_config_show(&cli),
        },
        None => cmd_scrape(&cli).await,
    }
}

/// Load the config file and apply flag overrides (flags > file > defaults).
fn resolve_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config_from(path)
            .wrap_err_with(|| format!("loading config from {}", path.display()))?,
        None => load_config()?,
    };

    if let Some(base_url) = &cli.base_url {
        config.source.base_url = base_url.clone();
    }
    if let Some(ms) = cli.settle_ms {
        config.harvest.settle_ms = ms;
    }
    if let Some(ms) = cli.throttle_ms {
        config.harvest.throttle_ms = ms;
    }

    config.validate()?;
    Ok(config)
}

/// Map the stage flags onto a pipeline run.
fn pipeline_config(cli: &Cli, config: &AppConfig) -> PipelineConfig {
    PipelineConfig {
        toc: cli.toc.as_deref().map(TocSource::parse),
        csv: cli.csv.clone(),
        json: cli.json.clone(),
        tables: cli.tables.clone(),
        views: cli.views.clone(),
        base_url: config.source.base_url.clone(),
        harvest: HarvestConfig::from(config),
        discovery: DiscoveryOptions {
            timeout_secs: config.harvest.timeout_secs,
        },
    }
}

async fn cmd_scrape(cli: &Cli) -> Result<()> {
    let config = resolve_config(cli)?;
    let pipeline = pipeline_config(cli, &config);

    info!(base_url = %pipeline.base_url, "starting hcmdoc run");

    let reporter = CliProgress::new();
    let summary = hcmdoc_core::run_pipeline(&pipeline, &reporter).await?;

    if summary.is_empty() {
        info!("no stage had all of its paths, nothing to do");
        return Ok(());
    }

    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &PipelineSummary) {
    println!();
    if let Some(links) = &summary.links {
        println!("  Links:    {} -> {}", links.links, links.csv.display());
    }
    if let Some(convert) = &summary.convert {
        println!("  Rows:     {} -> {}", convert.rows, convert.json.display());
    }
    if let Some(harvest) = &summary.harvest {
        println!(
            "  Tables:   {} -> {}",
            harvest.tables,
            harvest.tables_path.display()
        );
        println!(
            "  Views:    {} -> {}",
            harvest.views,
            harvest.views_path.display()
        );
        if !harvest.failures.is_empty() {
            println!("  Skipped:  {}", harvest.failures.len());
        }
    }
    println!("  Time:     {:.1}s", summary.elapsed.as_secs_f64());
    println!();
}

fn cmd_config_init(cli: &Cli) -> Result<()> {
    let path = match &cli.config {
        Some(path) => init_config_at(path)?,
        None => init_config()?,
    };
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(cli: &Cli) -> Result<()> {
    let config = resolve_config(cli)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
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
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn page_started(&self, current: usize, total: usize, name: &str) {
        self.spinner
            .set_message(format!("Processing {current}/{total}: {name}"));
    }

    fn page_failed(&self, url: &str, error: &str) {
        self.spinner.println(format!("  skipped {url}: {error}"));
    }

    fn done(&self, _summary: &PipelineSummary) {
        self.spinner.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("hcmdoc").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn stage_flags_parse() {
        let cli = parse(&[
            "--toc",
            "toc.js",
            "--csv",
            "links.csv",
            "--json",
            "links.json",
            "--tables",
            "tables.json",
            "--views",
            "views.json",
        ]);
        assert_eq!(cli.toc.as_deref(), Some("toc.js"));
        assert_eq!(cli.views, Some(PathBuf::from("views.json")));
        assert!(cli.command.is_none());
    }

    #[test]
    fn stage_flags_conflict_with_subcommand() {
        let result = Cli::try_parse_from(["hcmdoc", "--toc", "toc.js", "config", "show"]);
        assert!(result.is_err());
    }

    #[test]
    fn flags_override_config_file() {
        let path = std::env::temp_dir().join(format!("hcmdoc-cli-{}.toml", std::process::id()));
        std::fs::write(
            &path,
            "[source]\nbase_url = \"https://file.example.com/\"\n[harvest]\nsettle_ms = 5\nthrottle_ms = 7\n",
        )
        .unwrap();

        let cli = parse(&[
            "--config",
            path.to_str().unwrap(),
            "--base-url",
            "https://flag.example.com/oedmh/",
            "--throttle-ms",
            "0",
        ]);
        let config = resolve_config(&cli);
        let _ = std::fs::remove_file(&path);
        let config = config.unwrap();

        assert_eq!(config.source.base_url, "https://flag.example.com/oedmh/");
        assert_eq!(config.harvest.settle_ms, 5);
        assert_eq!(config.harvest.throttle_ms, 0);
    }

    #[test]
    fn invalid_base_url_flag_is_rejected() {
        let path = std::env::temp_dir().join(format!("hcmdoc-cli-bad-{}.toml", std::process::id()));
        std::fs::write(&path, "").unwrap();

        let cli = parse(&["--config", path.to_str().unwrap(), "--base-url", "file:///tmp/"]);
        let result = resolve_config(&cli);
        let _ = std::fs::remove_file(&path);

        assert!(result.is_err());
    }

    #[test]
    fn pipeline_config_maps_remote_toc() {
        let cli = parse(&["--toc", "https://docs.example.com/oedmh/toc.js", "--csv", "l.csv"]);
        let pipeline = pipeline_config(&cli, &AppConfig::default());

        assert!(matches!(pipeline.toc, Some(TocSource::Remote(_))));
        assert_eq!(pipeline.harvest.throttle, Duration::from_secs(1));
        assert!(pipeline.json.is_none());
    }
}
