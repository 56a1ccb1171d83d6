//! Core orchestration for Gazette.
//!
//! This crate ties together discovery, rendering, the content index and the
//! site builder into the end-to-end workflows the CLI exposes
//! ([`ingest::run_ingest`] and [`rebuild_site`]).

pub mod ingest;
pub mod publish;

use std::path::Path;

use gazette_shared::Result;
use gazette_site::{BuildOptions, BuildSummary, build_site};
use gazette_storage::ContentIndex;
use tracing::instrument;

/// Regenerate the static site from the current contents of the index at `index_path`.
#[instrument(skip_all, fields(index = %index_path.display()))]
pub fn rebuild_site(index_path: &Path, options: &BuildOptions) -> Result<BuildSummary> {
    let index = ContentIndex::read(index_path)?;
    build_site(options, index.documents())
}
