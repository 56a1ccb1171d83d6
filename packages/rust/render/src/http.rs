//! HTTP implementations of the render and media capabilities.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use gazette_shared::{GazetteError, Result};

use crate::extract::extract_fragment;
use crate::{Fragment, MediaFetcher, MediaReference, Renderer};

/// User-Agent string for page and media requests.
const USER_AGENT: &str = concat!("Gazette/", env!("CARGO_PKG_VERSION"));

fn build_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(5))
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| GazetteError::config(format!("failed to build HTTP client: {e}")))
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Renders a page by fetching its server-side HTML and selecting one element.
pub struct HttpRenderer {
    client: Client,
}

impl HttpRenderer {
    /// Create a renderer whose requests time out after `timeout_secs`.
    pub fn new(timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout_secs)?,
        })
    }
}

impl Renderer for HttpRenderer {
    #[instrument(skip(self))]
    async fn render(&self, url: &str, selector: &str) -> Result<Fragment> {
        let page_url =
            Url::parse(url).map_err(|e| GazetteError::render(url, format!("invalid URL: {e}")))?;

        let response = self
            .client
            .get(page_url.as_str())
            .send()
            .await
            .map_err(|e| GazetteError::render(url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GazetteError::render(url, format!("HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| GazetteError::render(url, format!("failed to read body: {e}")))?;

        let fragment = extract_fragment(&body, &page_url, selector)?;
        debug!(
            html_len = fragment.html.len(),
            media = fragment.media.len(),
            "element extracted"
        );
        Ok(fragment)
    }
}

// ---------------------------------------------------------------------------
// Media fetcher
// ---------------------------------------------------------------------------

/// Downloads media references over HTTP.
pub struct HttpMediaFetcher {
    client: Client,
}

impl HttpMediaFetcher {
    pub fn new(timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout_secs)?,
        })
    }
}

impl MediaFetcher for HttpMediaFetcher {
    #[instrument(skip_all, fields(url = %media.url, file = %media.file_name))]
    async fn fetch(&self, media: &MediaReference, dir: &Path) -> Result<PathBuf> {
        let url = media.url.as_str();

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| GazetteError::render(url, format!("media download failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GazetteError::render(
                url,
                format!("media download failed: HTTP {status}"),
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| GazetteError::render(url, format!("media download failed: {e}")))?;

        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| GazetteError::io(dir, e))?;
        let target = dir.join(&media.file_name);
        tokio::fs::write(&target, &bytes)
            .await
            .map_err(|e| GazetteError::io(&target, e))?;

        debug!(bytes = bytes.len(), path = %target.display(), "media saved");
        Ok(target)
    }
}
