//! Core domain types shared by the ledger, the index, and the site builder.

use serde::{Deserialize, Serialize};

use crate::error::{GazetteError, Result};

// ---------------------------------------------------------------------------
// WorkItem
// ---------------------------------------------------------------------------

/// One externally discovered content reference. Identity is `url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    /// Page to render.
    pub url: String,
    /// Publication date; becomes the document's identity once indexed.
    pub date: String,
    /// Display title.
    pub title: String,
}

/// Response body of the discovery feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedResponse {
    pub topics: Vec<WorkItem>,
}

// ---------------------------------------------------------------------------
// IndexedDocument
// ---------------------------------------------------------------------------

/// A persisted, searchable record. Identity is `date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedDocument {
    pub date: String,
    pub title: String,
    /// Plain text (markup stripped, whitespace collapsed).
    pub content: String,
    /// Path of the standalone document relative to the site root.
    pub url: String,
}

impl IndexedDocument {
    /// Build a document whose `url` follows the `<date>/<date>.html` layout.
    pub fn new(
        date: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let date = date.into();
        let url = document_path(&date);
        Self {
            date,
            title: title.into(),
            content: content.into(),
            url,
        }
    }
}

/// Site-relative path of the standalone file for `date`.
pub fn document_path(date: &str) -> String {
    format!("{date}/{date}.html")
}

/// Reject values that cannot be used verbatim as a single directory name.
pub fn validate_path_segment(value: &str) -> Result<()> {
    let bad = value.is_empty()
        || value == "."
        || value == ".."
        || value.contains(['/', '\\', '\0'])
        || value.trim() != value;
    if bad {
        return Err(GazetteError::validation(format!(
            "'{value}' is not usable as a path segment"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// PageView
// ---------------------------------------------------------------------------

/// One page of a sorted collection plus the paging envelope.
///
/// Serialized in the live query shape: `total`, `totalPages`, `currentPage`,
/// `perPage`, `data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageView<T> {
    pub total: usize,
    pub total_pages: usize,
    pub current_page: usize,
    pub per_page: usize,
    pub data: Vec<T>,
}

/// `ceil(total / per_page)`; zero for an empty collection.
pub fn total_pages(total: usize, per_page: usize) -> usize {
    if per_page == 0 {
        return 0;
    }
    total.div_ceil(per_page)
}

/// Slice `items` into the 1-indexed page `page_number` of size `per_page`.
///
/// Out-of-range pages (including 0) produce empty `data`.
pub fn paginate<T: Clone>(items: &[T], page_number: usize, per_page: usize) -> Result<PageView<T>> {
    if per_page == 0 {
        return Err(GazetteError::validation("perPage must be at least 1"));
    }

    let data = match page_number.checked_sub(1) {
        Some(index) => {
            let start = index.saturating_mul(per_page).min(items.len());
            let end = start.saturating_add(per_page).min(items.len());
            items[start..end].to_vec()
        }
        None => Vec::new(),
    };

    Ok(PageView {
        total: items.len(),
        total_pages: total_pages(items.len(), per_page),
        current_page: page_number,
        per_page,
        data,
    })
}
