//! Where listing pages live on disk and which URL points at each one.

use std::path::{Path, PathBuf};

use gazette_shared::BasePath;

use crate::DEFAULT_PER_PAGE;

/// Whether `(per_page, page)` is the canonical root listing.
pub(crate) fn is_root(per_page: usize, page: usize) -> bool {
    per_page == DEFAULT_PER_PAGE && page == 1
}

/// Directory holding the `index.html` of one listing page.
pub(crate) fn listing_dir(build_dir: &Path, per_page: usize, page: usize) -> PathBuf {
    if is_root(per_page, page) {
        build_dir.to_path_buf()
    } else {
        build_dir
            .join("page")
            .join(per_page.to_string())
            .join(page.to_string())
    }
}

/// URL of one listing page. The default view is always the site root.
pub(crate) fn listing_href(base: &BasePath, per_page: usize, page: usize) -> String {
    if is_root(per_page, page) {
        base.root()
    } else {
        base.join(&format!("page/{per_page}/{page}/"))
    }
}
