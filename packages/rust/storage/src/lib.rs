//! Durable content index.
//!
//! The [`ContentIndex`] holds every [`IndexedDocument`] in a single JSON array
//! file, kept sorted by `date` descending, with at most one document per date.
//!
//! **Access rules:**
//! - Ingestion: read-write via [`ContentIndex::load`]; every upsert is a full
//!   load-mutate-save cycle
//! - Site build and live queries: snapshots via [`ContentIndex::load`] or the
//!   non-bootstrapping [`ContentIndex::read`]

pub mod text;

use std::path::{Path, PathBuf};

use gazette_shared::json_file::{read_json, read_json_or_bootstrap, write_json_atomic};
use gazette_shared::{GazetteError, IndexedDocument, PageView, Result, paginate};
use tracing::{debug, info, instrument, warn};

pub use text::plain_text;

/// What an upsert did to the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Replaced,
}

/// The content index handle.
#[derive(Debug)]
pub struct ContentIndex {
    path: PathBuf,
    docs: Vec<IndexedDocument>,
    readonly: bool,
}

impl ContentIndex {
    /// Load the index at `path`, creating an empty one on disk if absent.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let docs: Vec<IndexedDocument> = read_json_or_bootstrap(&path)?;
        let docs = normalize(&path, docs);

        debug!(documents = docs.len(), "index loaded");
        Ok(Self {
            path,
            docs,
            readonly: false,
        })
    }

    /// Read-only snapshot; a missing file is an empty index and nothing is written.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let docs: Vec<IndexedDocument> = read_json(&path)?.unwrap_or_default();
        let docs = normalize(&path, docs);

        Ok(Self {
            path,
            docs,
            readonly: true,
        })
    }

    /// Insert `doc`, or replace the document with the same date.
    ///
    /// Reloads the file first, so the write applies to the latest persisted
    /// state, then re-sorts and saves the whole collection.
    #[instrument(skip_all, fields(date = %doc.date))]
    pub fn upsert(&mut self, doc: IndexedDocument) -> Result<UpsertOutcome> {
        self.check_writable()?;
        let current: Vec<IndexedDocument> = read_json(&self.path)?.unwrap_or_default();
        self.docs = normalize(&self.path, current);

        let outcome = match self.docs.iter().position(|d| d.date == doc.date) {
            Some(i) => {
                self.docs[i] = doc;
                UpsertOutcome::Replaced
            }
            None => {
                self.docs.push(doc);
                UpsertOutcome::Inserted
            }
        };

        sort_descending(&mut self.docs);
        debug_assert!(is_sorted_descending(&self.docs));

        write_json_atomic(&self.path, &self.docs)?;
        info!(?outcome, documents = self.docs.len(), "index updated");
        Ok(outcome)
    }

    /// All documents, date-descending.
    pub fn documents(&self) -> &[IndexedDocument] {
        &self.docs
    }

    /// Look up the document for `date`.
    pub fn get(&self, date: &str) -> Option<&IndexedDocument> {
        self.docs.iter().find(|d| d.date == date)
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Keyword search with AND semantics across tokens.
    ///
    /// A document matches when every whitespace-separated token (case-insensitive)
    /// occurs in its title or its content. An empty query matches everything.
    /// Results keep index order.
    pub fn search(&self, query: &str) -> Vec<IndexedDocument> {
        let tokens = tokenize(query);
        if tokens.is_empty() {
            return self.docs.clone();
        }

        self.docs
            .iter()
            .filter(|doc| matches_all(doc, &tokens))
            .cloned()
            .collect()
    }

    /// One page of the full collection.
    pub fn page(&self, page_number: usize, per_page: usize) -> Result<PageView<IndexedDocument>> {
        paginate(&self.docs, page_number, per_page)
    }

    /// One page of the documents matching `query`.
    pub fn query(
        &self,
        query: &str,
        page_number: usize,
        per_page: usize,
    ) -> Result<PageView<IndexedDocument>> {
        if tokenize(query).is_empty() {
            return self.page(page_number, per_page);
        }
        paginate(&self.search(query), page_number, per_page)
    }

    fn check_writable(&self) -> Result<()> {
        if self.readonly {
            return Err(GazetteError::storage(
                &self.path,
                "index is opened in read-only mode",
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn tokenize(query: &str) -> Vec<String> {
    query.split_whitespace().map(str::to_lowercase).collect()
}

fn matches_all(doc: &IndexedDocument, tokens: &[String]) -> bool {
    let title = doc.title.to_lowercase();
    let content = doc.content.to_lowercase();
    tokens
        .iter()
        .all(|t| title.contains(t.as_str()) || content.contains(t.as_str()))
}

/// Stable sort, newest date first.
fn sort_descending(docs: &mut [IndexedDocument]) {
    docs.sort_by(|a, b| b.date.cmp(&a.date));
}

fn is_sorted_descending(docs: &[IndexedDocument]) -> bool {
    docs.windows(2).all(|w| w[0].date >= w[1].date)
}

/// Restore the sort and uniqueness invariants on data read from disk.
fn normalize(path: &Path, mut docs: Vec<IndexedDocument>) -> Vec<IndexedDocument> {
    if !is_sorted_descending(&docs) {
        warn!(path = %path.display(), "index file was not date-descending, re-sorting");
        sort_descending(&mut docs);
    }

    let before = docs.len();
    docs.dedup_by(|later, earlier| later.date == earlier.date);
    if docs.len() != before {
        warn!(
            path = %path.display(),
            dropped = before - docs.len(),
            "index file had duplicate dates, kept first occurrence"
        );
    }

    docs
}
