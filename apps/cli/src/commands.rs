//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use gazette_core::ingest::{IngestConfig, IngestResult, ProgressReporter, run_ingest};
use gazette_core::rebuild_site;
use gazette_discovery::{FeedClient, FeedOptions};
use gazette_render::{HttpMediaFetcher, HttpRenderer};
use gazette_server::ServeConfig;
use gazette_shared::{
    AppConfig, BasePath, ConfigOverrides, GazetteError, WorkItem, init_config, load_config,
    load_config_from, validate_for_ingest,
};
use gazette_site::{BuildOptions, BuildSummary};
use gazette_storage::ContentIndex;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Gazette: mirror a feed of posts into a searchable static site.
#[derive(Parser)]
#[command(
    name = "gazette",
    version,
    about = "Ingest posts from a discovery feed and publish them as a searchable static site.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Config file (defaults to ~/.gazette/gazette.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Discovery feed URL.
    #[arg(long, env = "API_URL", global = true)]
    pub feed_url: Option<String>,

    /// CSS selector of the element to extract from each page.
    #[arg(long, env = "CLASS_NAME", global = true)]
    pub selector: Option<String>,

    /// URL prefix for every generated link.
    #[arg(long, env = "MEDIA_PATH", global = true)]
    pub base_path: Option<String>,

    /// Port for `serve`.
    #[arg(long, env = "PORT", global = true)]
    pub port: Option<u16>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
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
    /// Fetch the feed and ingest every item not seen before.
    Ingest {
        /// Rebuild the static site afterwards.
        #[arg(long)]
        build: bool,
    },

    /// Regenerate the static site from the content index.
    Build,

    /// Serve the article API and the generated site.
    Serve,

    /// Query the content index.
    Search {
        /// Space-separated keywords; all must match.
        query: Option<String>,

        #[arg(long, default_value_t = 1)]
        page: usize,

        #[arg(long, default_value_t = 10)]
        per_page: usize,
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
        0 => "gazette=info",
        1 => "gazette=debug",
        _ => "gazette=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

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
    let config = resolve_config(&cli)?;

    match cli.command {
        Command::Ingest { build } => cmd_ingest(&config, build).await,
        Command::Build => cmd_build(&config),
        Command::Serve => cmd_serve(&config).await,
        Command::Search {
            query,
            page,
            per_page,
        } => cmd_search(&config, query.as_deref().unwrap_or(""), page, per_page),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(&config),
        },
    }
}

/// File (or defaults), then flags and environment on top.
fn resolve_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };

    config.apply(&ConfigOverrides {
        feed_endpoint: cli.feed_url.clone(),
        selector: cli.selector.clone(),
        base_path: cli.base_path.clone(),
        port: cli.port,
    });

    Ok(config)
}

fn build_options(config: &AppConfig) -> BuildOptions {
    BuildOptions {
        source_dir: config.paths.source_dir.clone(),
        build_dir: config.paths.build_dir.clone(),
        base_path: BasePath::new(&config.site.base_path),
        title: config.site.title.clone(),
        lang: config.site.lang.clone(),
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_ingest(config: &AppConfig, build: bool) -> Result<()> {
    validate_for_ingest(config)?;

    let feed = FeedClient::new(
        &config.feed.endpoint,
        &FeedOptions {
            timeout_secs: config.feed.timeout_secs,
        },
    )?;
    let renderer = HttpRenderer::new(config.render.timeout_secs)?;
    let media = HttpMediaFetcher::new(config.render.timeout_secs)?;

    let ingest_config = IngestConfig {
        ledger_path: config.paths.ledger.clone(),
        index_path: config.paths.index.clone(),
        source_dir: config.paths.source_dir.clone(),
        selector: config.render.selector.clone(),
        base_path: BasePath::new(&config.site.base_path),
        download_media: config.render.download_media,
    };

    info!(endpoint = %config.feed.endpoint, selector = %config.render.selector, "starting ingest");

    let reporter = CliProgress::new();
    let result = run_ingest(&ingest_config, &feed, &renderer, &media, &reporter).await?;

    println!();
    println!("  Ingest finished");
    println!("  Run:      {}", result.run_id);
    println!("  Fetched:  {}", result.fetched);
    println!("  New:      {}", result.new_items);
    println!("  Ingested: {}", result.ingested);
    println!("  Failed:   {}", result.failures.len());
    for failure in &result.failures {
        println!("    {} ({}): {}", failure.url, failure.date, failure.error);
    }
    println!("  Time:     {:.1}s", result.elapsed.as_secs_f64());
    println!();

    if build {
        cmd_build(config)?;
    }

    Ok(())
}

fn cmd_build(config: &AppConfig) -> Result<()> {
    let summary = rebuild_site(&config.paths.index, &build_options(config))?;
    print_build_summary(&summary);
    Ok(())
}

fn print_build_summary(summary: &BuildSummary) {
    println!();
    println!("  Site built at {}", summary.build_dir.display());
    println!("  Documents: {}", summary.documents);
    println!("  Copied:    {} files", summary.copied_files);
    for (per_page, pages) in &summary.pages {
        println!("  {per_page:>3}/page:  {pages} listing page(s)");
    }
    println!();
}

async fn cmd_serve(config: &AppConfig) -> Result<()> {
    let serve_config = ServeConfig {
        listen_addr: config.server.listen_addr.clone(),
        index_path: config.paths.index.clone(),
        build_dir: config.paths.build_dir.clone(),
    };

    println!("Serving on http://{}", serve_config.listen_addr);
    gazette_server::serve(&serve_config).await?;
    Ok(())
}

fn cmd_search(config: &AppConfig, query: &str, page: usize, per_page: usize) -> Result<()> {
    let index = ContentIndex::read(&config.paths.index)?;
    let view = index.query(query, page, per_page)?;

    if view.data.is_empty() {
        println!("No matching articles (total {}).", view.total);
        return Ok(());
    }

    for doc in &view.data {
        println!("{}  {}", doc.date, doc.title);
        println!("            {}", doc.url);
    }
    println!();
    println!(
        "Page {} of {} ({} matching)",
        view.current_page, view.total_pages, view.total
    );
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let toml_str =
        toml::to_string_pretty(config).map_err(|e| eyre!("cannot render config: {e}"))?;
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
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn item_started(&self, item: &WorkItem, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Rendering [{current}/{total}] {} ({})", item.title, item.date));
    }

    fn item_failed(&self, item: &WorkItem, error: &GazetteError) {
        self.spinner
            .suspend(|| eprintln!("  failed: {} ({}): {error}", item.url, item.date));
    }

    fn done(&self, _result: &IngestResult) {
        self.spinner.finish_and_clear();
    }

    fn aborted(&self, _error: &GazetteError) {
        self.spinner.finish_and_clear();
    }
}
