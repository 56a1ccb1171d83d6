//! Durable set of every work-item URL ever seen.
//!
//! Persisted as a JSON array of URL strings in first-seen order. The set only
//! grows; [`Ledger::commit`] records a whole fetched batch whether or not its
//! items were later ingested successfully.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use gazette_shared::json_file::{read_json_or_bootstrap, write_json_atomic};
use gazette_shared::{Result, WorkItem};
use tracing::{debug, info, instrument};

/// The discovery ledger.
#[derive(Debug)]
pub struct Ledger {
    path: PathBuf,
    /// First-seen order, as persisted.
    urls: Vec<String>,
    seen: HashSet<String>,
}

impl Ledger {
    /// Load the ledger at `path`, creating an empty one on disk if absent.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let stored: Vec<String> = read_json_or_bootstrap(&path)?;

        let mut ledger = Self {
            path,
            urls: Vec::with_capacity(stored.len()),
            seen: HashSet::with_capacity(stored.len()),
        };
        for url in stored {
            ledger.insert(url);
        }

        debug!(seen = ledger.len(), "ledger loaded");
        Ok(ledger)
    }

    /// Items whose URL has never been seen, oldest-discovered first.
    ///
    /// Feeds list newest first, so the unseen subsequence is reversed.
    pub fn filter_new(&self, items: &[WorkItem]) -> Vec<WorkItem> {
        let mut fresh: Vec<WorkItem> = items
            .iter()
            .filter(|item| !self.seen.contains(&item.url))
            .cloned()
            .collect();
        fresh.reverse();
        fresh
    }

    /// Record every URL in `items` and persist the full set.
    ///
    /// Persists even when nothing in the batch is new.
    #[instrument(skip_all, fields(path = %self.path.display(), batch = items.len()))]
    pub fn commit(&mut self, items: &[WorkItem]) -> Result<()> {
        let before = self.len();
        for item in items {
            self.insert(item.url.clone());
        }

        write_json_atomic(&self.path, &self.urls)?;

        info!(added = self.len() - before, seen = self.len(), "ledger committed");
        Ok(())
    }

    /// Whether `url` has been seen.
    pub fn contains(&self, url: &str) -> bool {
        self.seen.contains(url)
    }

    /// Number of distinct URLs seen.
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// Backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn insert(&mut self, url: String) {
        if self.seen.insert(url.clone()) {
            self.urls.push(url);
        }
    }
}
