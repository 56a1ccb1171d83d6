//! Render and media capabilities.
//!
//! This crate provides:
//! - [`Renderer`]: turns a page URL plus a CSS selector into a [`Fragment`]
//! - [`MediaFetcher`]: stores one referenced media file locally
//! - [`HttpRenderer`] / [`HttpMediaFetcher`]: the default HTTP implementations
//!
//! The orchestrator only sees the traits, so tests substitute stubs.

mod extract;
mod http;

use std::future::Future;
use std::path::{Path, PathBuf};

use gazette_shared::Result;
use url::Url;

pub use extract::extract_fragment;
pub use http::{HttpMediaFetcher, HttpRenderer};

/// One media element found inside a rendered fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaReference {
    /// The `src` value exactly as it appears in the fragment.
    pub origin: String,
    /// Absolute download URL.
    pub url: Url,
    /// Percent-decoded last path segment of `url`, used as the on-disk name.
    pub file_name: String,
}

/// The extracted element of a rendered page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    /// Outer HTML of the selected element.
    pub html: String,
    /// Media referenced inside the element, deduplicated by origin.
    pub media: Vec<MediaReference>,
}

/// Renders a page and extracts one element from it.
pub trait Renderer {
    /// Render `url` and return the first element matching `selector`.
    ///
    /// Fails with a render error if the page cannot be loaded or the element is absent.
    fn render(&self, url: &str, selector: &str) -> impl Future<Output = Result<Fragment>> + Send;
}

/// Retrieves referenced media into a local directory.
pub trait MediaFetcher {
    /// Store `media` as `dir/<file_name>` and return the written path.
    fn fetch(
        &self,
        media: &MediaReference,
        dir: &Path,
    ) -> impl Future<Output = Result<PathBuf>> + Send;
}
