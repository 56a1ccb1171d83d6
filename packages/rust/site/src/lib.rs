//! Static site generation.
//!
//! [`build_site`] turns the sorted document collection plus the per-document
//! source tree into a self-contained directory:
//!
//! ```text
//! <build>/index.html                    first page, 10 per page
//! <build>/page/<perPage>/<n>/index.html every other listing page
//! <build>/search.js                     collection + client-side filter
//! <build>/styles.css
//! <build>/<date>/<date>.html            copied from the source tree
//! <build>/<date>/media/...
//! ```

mod assets;
mod copy;
mod listing;
mod paths;
mod search_script;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use gazette_shared::{BasePath, GazetteError, IndexedDocument, Result, paginate, total_pages};
use tracing::{debug, info, instrument};

use listing::ListingPage;

/// Page sizes offered by the listing selector.
pub const PER_PAGE_OPTIONS: [usize; 3] = [10, 20, 50];

/// Page size of the root listing.
pub const DEFAULT_PER_PAGE: usize = 10;

/// Inputs for one site build.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Per-document tree written by ingestion.
    pub source_dir: PathBuf,
    /// Output root.
    pub build_dir: PathBuf,
    pub base_path: BasePath,
    pub title: String,
    pub lang: String,
}

/// What a build produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    pub build_dir: PathBuf,
    pub documents: usize,
    pub copied_files: usize,
    /// `(per_page, listing pages written)` for every offered size.
    pub pages: Vec<(usize, usize)>,
}

impl BuildSummary {
    /// Listing pages written across all sizes.
    pub fn total_listing_pages(&self) -> usize {
        self.pages.iter().map(|(_, n)| n).sum()
    }
}

/// Regenerate the whole static tree from `documents`.
///
/// `documents` must already be sorted date-descending, as the content index
/// keeps them. Any file-system failure aborts the build.
#[instrument(
    skip_all,
    fields(build_dir = %options.build_dir.display(), documents = documents.len())
)]
pub fn build_site(options: &BuildOptions, documents: &[IndexedDocument]) -> Result<BuildSummary> {
    let start = Instant::now();
    let build_dir = &options.build_dir;

    fs::create_dir_all(build_dir).map_err(|e| GazetteError::build(build_dir, e))?;
    ensure_outside_source(&options.source_dir, build_dir)?;

    let stale = build_dir.join("page");
    if stale.exists() {
        debug!(path = %stale.display(), "removing stale listing pages");
        fs::remove_dir_all(&stale).map_err(|e| GazetteError::build(&stale, e))?;
    }

    let copied_files = copy::copy_tree(&options.source_dir, build_dir)?;
    debug!(copied_files, "copied source tree");

    let mut pages = Vec::with_capacity(PER_PAGE_OPTIONS.len());
    for per_page in PER_PAGE_OPTIONS {
        let count = total_pages(documents.len(), per_page).max(1);
        for page_number in 1..=count {
            let view = paginate(documents, page_number, per_page)?;
            let html = listing::render(&ListingPage {
                base: &options.base_path,
                title: &options.title,
                lang: &options.lang,
                documents: &view.data,
                per_page,
                current_page: page_number,
                total_pages: count,
            });
            let dir = paths::listing_dir(build_dir, per_page, page_number);
            write_file(&dir.join("index.html"), &html)?;
        }
        pages.push((per_page, count));
    }

    let script = search_script::render(&options.base_path, documents)?;
    write_file(&build_dir.join("search.js"), &script)?;
    write_file(&build_dir.join("styles.css"), assets::STYLES)?;

    let summary = BuildSummary {
        build_dir: build_dir.clone(),
        documents: documents.len(),
        copied_files,
        pages,
    };

    info!(
        documents = summary.documents,
        copied_files = summary.copied_files,
        listing_pages = summary.total_listing_pages(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "site build complete"
    );

    Ok(summary)
}

/// A build root inside the source tree would copy into itself.
fn ensure_outside_source(source_dir: &Path, build_dir: &Path) -> Result<()> {
    let Ok(source) = source_dir.canonicalize() else {
        return Ok(());
    };
    let build = build_dir
        .canonicalize()
        .map_err(|e| GazetteError::build(build_dir, e))?;

    if build.starts_with(&source) {
        return Err(GazetteError::validation(format!(
            "build directory {} must not be inside source directory {}",
            build_dir.display(),
            source_dir.display()
        )));
    }
    Ok(())
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| GazetteError::build(parent, e))?;
    }
    fs::write(path, contents).map_err(|e| GazetteError::build(path, e))
}

/// Build error for failures that carry no `io::Error` of their own.
pub(crate) fn site_error(path: impl Into<PathBuf>, message: String) -> GazetteError {
    GazetteError::build(path, std::io::Error::other(message))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_root(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("gz-site-{tag}-{}", uuid::Uuid::now_v7()))
    }

    fn options(root: &Path, base: &str) -> BuildOptions {
        BuildOptions {
            source_dir: root.join("output"),
            build_dir: root.join("output_static"),
            base_path: BasePath::new(base),
            title: "Updates".into(),
            lang: "en".into(),
        }
    }

    fn docs(n: usize) -> Vec<IndexedDocument> {
        (0..n)
            .map(|i| {
                IndexedDocument::new(format!("2024-02-{:02}", 28 - i), format!("Post {i}"), "text")
            })
            .collect()
    }

    #[test]
    fn writes_root_assets_and_every_size() {
        let tmp = temp_root("basic");
        let opts = options(&tmp, "");
        let summary = build_site(&opts, &docs(2)).unwrap();

        let build = &opts.build_dir;
        assert!(build.join("index.html").is_file());
        assert!(build.join("search.js").is_file());
        assert!(build.join("styles.css").is_file());
        assert!(build.join("page/20/1/index.html").is_file());
        assert!(build.join("page/50/1/index.html").is_file());
        assert!(!build.join("page/10/1").exists());
        assert_eq!(summary.pages, vec![(10, 1), (20, 1), (50, 1)]);
        assert_eq!(summary.documents, 2);

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn empty_collection_still_has_one_page_per_size() {
        let tmp = temp_root("empty");
        let opts = options(&tmp, "");
        let summary = build_site(&opts, &[]).unwrap();

        assert_eq!(summary.total_listing_pages(), 3);
        assert_eq!(summary.copied_files, 0);
        let root = fs::read_to_string(opts.build_dir.join("index.html")).unwrap();
        assert!(root.contains("Page 1 of 1"));

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn paginates_larger_collections() {
        let tmp = temp_root("paged");
        let opts = options(&tmp, "archive");
        let summary = build_site(&opts, &docs(25)).unwrap();

        let build = &opts.build_dir;
        assert!(build.join("page/10/2/index.html").is_file());
        assert!(build.join("page/10/3/index.html").is_file());
        assert!(!build.join("page/10/4").exists());
        assert!(build.join("page/20/2/index.html").is_file());
        assert_eq!(summary.pages, vec![(10, 3), (20, 2), (50, 1)]);

        let second = fs::read_to_string(build.join("page/10/2/index.html")).unwrap();
        assert!(second.contains(r#"rel="prev" href="/archive/""#));
        assert!(second.contains(r#"rel="next" href="/archive/page/10/3/""#));
        assert!(second.contains("Post 10"));
        assert!(!second.contains(">Post 9<"));

        let root = fs::read_to_string(build.join("index.html")).unwrap();
        assert!(root.contains(r#"href="/archive/2024-02-28/2024-02-28.html""#));
        assert!(root.contains(r#"href="/archive/styles.css""#));

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn copies_source_tree_verbatim() {
        let tmp = temp_root("copy");
        let opts = options(&tmp, "");
        let doc_dir = opts.source_dir.join("2024-02-28");
        fs::create_dir_all(doc_dir.join("media")).unwrap();
        fs::write(doc_dir.join("2024-02-28.html"), "<html>doc</html>").unwrap();
        fs::write(doc_dir.join("media/pic.png"), [9u8, 8, 7]).unwrap();

        let summary = build_site(&opts, &docs(1)).unwrap();

        assert_eq!(summary.copied_files, 2);
        let copied = opts.build_dir.join("2024-02-28");
        assert_eq!(fs::read_to_string(copied.join("2024-02-28.html")).unwrap(), "<html>doc</html>");
        assert_eq!(fs::read(copied.join("media/pic.png")).unwrap(), vec![9u8, 8, 7]);

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn removes_stale_listing_pages() {
        let tmp = temp_root("stale");
        let opts = options(&tmp, "");
        build_site(&opts, &docs(25)).unwrap();
        assert!(opts.build_dir.join("page/10/3/index.html").is_file());

        build_site(&opts, &docs(5)).unwrap();
        assert!(!opts.build_dir.join("page/10/3").exists());
        assert!(!opts.build_dir.join("page/10/2").exists());

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn search_bundle_embeds_collection() {
        let tmp = temp_root("search");
        let opts = options(&tmp, "/news/");
        build_site(&opts, &docs(2)).unwrap();

        let js = fs::read_to_string(opts.build_dir.join("search.js")).unwrap();
        assert!(js.contains(r#""title":"Post 0""#));
        assert!(js.contains(r#"const prefixPath = "/news";"#));
        assert_eq!(fs::read_to_string(opts.build_dir.join("styles.css")).unwrap(), assets::STYLES);

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_build_dir_inside_source() {
        let tmp = temp_root("nested");
        let mut opts = options(&tmp, "");
        fs::create_dir_all(&opts.source_dir).unwrap();
        opts.build_dir = opts.source_dir.join("static");

        let err = build_site(&opts, &[]).unwrap_err();
        assert!(matches!(err, GazetteError::Validation { .. }));

        let _ = fs::remove_dir_all(&tmp);
    }
}
