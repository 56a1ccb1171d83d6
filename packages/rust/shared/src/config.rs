//! Application configuration for Gazette.
//!
//! User config lives at `~/.gazette/gazette.toml`.
//! CLI flags (and their env fallbacks) override config file values, which
//! override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{GazetteError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "gazette.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".gazette";

// ---------------------------------------------------------------------------
// Config structs (matching gazette.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Discovery feed settings.
    #[serde(default)]
    pub feed: FeedConfig,

    /// Render capability settings.
    #[serde(default)]
    pub render: RenderConfig,

    /// Durable stores and output directories.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Generated site settings.
    #[serde(default)]
    pub site: SiteConfig,

    /// Live query server settings.
    #[serde(default)]
    pub server: ServerConfig,
}

/// `[feed]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Endpoint returning `{ "topics": [...] }`.
    #[serde(default)]
    pub endpoint: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// `[render]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// CSS selector of the element extracted from each page.
    #[serde(default = "default_selector")]
    pub selector: String,

    /// Page fetch timeout in seconds.
    #[serde(default = "default_render_timeout_secs")]
    pub timeout_secs: u64,

    /// Download referenced media next to each document.
    #[serde(default = "default_true")]
    pub download_media: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            selector: default_selector(),
            timeout_secs: default_render_timeout_secs(),
            download_media: true,
        }
    }
}

/// `[paths]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Discovery ledger file.
    #[serde(default = "default_ledger")]
    pub ledger: PathBuf,

    /// Content index file.
    #[serde(default = "default_index")]
    pub index: PathBuf,

    /// Per-document rendered tree written during ingestion.
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,

    /// Static site output directory.
    #[serde(default = "default_build_dir")]
    pub build_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            ledger: default_ledger(),
            index: default_index(),
            source_dir: default_source_dir(),
            build_dir: default_build_dir(),
        }
    }
}

/// `[site]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// URL prefix the site is hosted under (e.g. `archive` → `/archive/...`).
    #[serde(default)]
    pub base_path: String,

    /// Listing page title.
    #[serde(default = "default_title")]
    pub title: String,

    /// `lang` attribute of generated pages.
    #[serde(default = "default_lang")]
    pub lang: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_path: String::new(),
            title: default_title(),
            lang: default_lang(),
        }
    }
}

/// `[server]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address the live query server binds to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}
fn default_render_timeout_secs() -> u64 {
    30
}
fn default_true() -> bool {
    true
}
fn default_selector() -> String {
    "article".into()
}
fn default_ledger() -> PathBuf {
    "url_dictionary.json".into()
}
fn default_index() -> PathBuf {
    "search_index.json".into()
}
fn default_source_dir() -> PathBuf {
    "output".into()
}
fn default_build_dir() -> PathBuf {
    "output_static".into()
}
fn default_title() -> String {
    "Updates".into()
}
fn default_lang() -> String {
    "en".into()
}
fn default_listen_addr() -> String {
    "127.0.0.1:3000".into()
}

// ---------------------------------------------------------------------------
// Overrides (CLI flags / env)
// ---------------------------------------------------------------------------

/// Values supplied on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub feed_endpoint: Option<String>,
    pub selector: Option<String>,
    pub base_path: Option<String>,
    pub port: Option<u16>,
}

impl AppConfig {
    /// Apply overrides on top of file/default values.
    pub fn apply(&mut self, overrides: &ConfigOverrides) {
        if let Some(endpoint) = &overrides.feed_endpoint {
            self.feed.endpoint = endpoint.clone();
        }
        if let Some(selector) = &overrides.selector {
            self.render.selector = selector.clone();
        }
        if let Some(base_path) = &overrides.base_path {
            self.site.base_path = base_path.clone();
        }
        if let Some(port) = overrides.port {
            let host = self
                .server
                .listen_addr
                .rsplit_once(':')
                .map(|(host, _)| host.to_string())
                .unwrap_or_else(|| "127.0.0.1".into());
            self.server.listen_addr = format!("{host}:{port}");
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.gazette/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| GazetteError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.gazette/gazette.toml`).
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
    let content = std::fs::read_to_string(path).map_err(|e| GazetteError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| GazetteError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| GazetteError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| GazetteError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| GazetteError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Check that the settings an ingestion run needs are present.
pub fn validate_for_ingest(config: &AppConfig) -> Result<()> {
    if config.feed.endpoint.trim().is_empty() {
        return Err(GazetteError::config(
            "feed endpoint not set. Pass --feed-url, set API_URL, \
             or add [feed] endpoint to gazette.toml",
        ));
    }
    if config.render.selector.trim().is_empty() {
        return Err(GazetteError::config("render selector must not be empty"));
    }
    Ok(())
}
