//! Work-item discovery: the upstream feed client and the deduplication ledger.
//!
//! A run fetches the feed's full topic list, asks the [`Ledger`] which URLs
//! have never been seen, and commits the whole batch back to the ledger.

mod ledger;

use std::future::Future;
use std::time::Duration;

use gazette_shared::{FeedResponse, GazetteError, Result, WorkItem};
use reqwest::Client;
use tracing::{info, instrument};
use url::Url;

pub use ledger::Ledger;

/// Maximum number of redirects to follow when fetching the feed.
const MAX_REDIRECTS: usize = 3;

/// Default timeout in seconds for fetching the feed.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// User-Agent string for feed requests.
const USER_AGENT: &str = concat!("Gazette/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Feed seam
// ---------------------------------------------------------------------------

/// Source of the external work-item list.
pub trait ItemFeed {
    /// Fetch the complete current item list, in feed order.
    fn fetch_items(&self) -> impl Future<Output = Result<Vec<WorkItem>>> + Send;
}

// ---------------------------------------------------------------------------
// Feed options
// ---------------------------------------------------------------------------

/// Configuration for the feed client.
#[derive(Debug, Clone)]
pub struct FeedOptions {
    /// Timeout for HTTP requests in seconds.
    pub timeout_secs: u64,
}

impl Default for FeedOptions {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

// ---------------------------------------------------------------------------
// HTTP feed client
// ---------------------------------------------------------------------------

/// Fetches `{ "topics": [{url, date, title}, ...] }` from a configured endpoint.
pub struct FeedClient {
    client: Client,
    endpoint: Url,
}

impl FeedClient {
    /// Create a client for `endpoint`.
    pub fn new(endpoint: &str, opts: &FeedOptions) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| GazetteError::config(format!("invalid feed endpoint '{endpoint}': {e}")))?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(Duration::from_secs(opts.timeout_secs))
            .build()
            .map_err(|e| GazetteError::Fetch(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, endpoint })
    }

    /// The endpoint this client reads.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl ItemFeed for FeedClient {
    #[instrument(skip_all, fields(endpoint = %self.endpoint))]
    async fn fetch_items(&self) -> Result<Vec<WorkItem>> {
        let url = &self.endpoint;

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| GazetteError::Fetch(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GazetteError::Fetch(format!("{url}: HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| GazetteError::Fetch(format!("{url}: failed to read body: {e}")))?;

        let feed: FeedResponse = serde_json::from_str(&body)
            .map_err(|e| GazetteError::Fetch(format!("{url}: malformed feed: {e}")))?;

        info!(items = feed.topics.len(), "feed fetched");
        Ok(feed.topics)
    }
}
