//! End-to-end ingestion run: feed → ledger → render → publish → index.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use gazette_discovery::{ItemFeed, Ledger};
use gazette_render::{Fragment, MediaFetcher, MediaReference, Renderer};
use gazette_shared::{
    BasePath, GazetteError, IndexedDocument, Result, WorkItem, validate_path_segment,
};
use gazette_storage::{ContentIndex, plain_text};
use tracing::{Span, error, info, instrument, warn};
use uuid::Uuid;

use crate::publish::{
    media_href, rewrite_reference, standalone_document, unique_file_name, write_document,
};

/// Configuration for one ingestion run.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Discovery ledger file.
    pub ledger_path: PathBuf,
    /// Content index file.
    pub index_path: PathBuf,
    /// Root of the per-document tree.
    pub source_dir: PathBuf,
    /// CSS selector of the element to extract from each page.
    pub selector: String,
    /// Prefix for rewritten media URLs.
    pub base_path: BasePath,
    /// Download referenced media and rewrite the fragment to point at it.
    pub download_media: bool,
}

/// An item that could not be ingested.
#[derive(Debug)]
pub struct ItemFailure {
    pub url: String,
    pub date: String,
    pub error: GazetteError,
}

/// Result of an ingestion run.
#[derive(Debug)]
pub struct IngestResult {
    pub run_id: Uuid,
    /// Items returned by the feed.
    pub fetched: usize,
    /// Items the ledger had not seen before.
    pub new_items: usize,
    /// Items written to the index.
    pub ingested: usize,
    pub failures: Vec<ItemFailure>,
    pub elapsed: Duration,
}

/// Progress callback for reporting ingestion status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called before an item is rendered.
    fn item_started(&self, item: &WorkItem, current: usize, total: usize);
    /// Called when an item fails.
    fn item_failed(&self, item: &WorkItem, error: &GazetteError);
    /// Called when the run completes.
    fn done(&self, result: &IngestResult);
    /// Called when the run aborts before completing.
    fn aborted(&self, error: &GazetteError);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn item_started(&self, _item: &WorkItem, _current: usize, _total: usize) {}
    fn item_failed(&self, _item: &WorkItem, _error: &GazetteError) {}
    fn done(&self, _result: &IngestResult) {}
    fn aborted(&self, _error: &GazetteError) {}
}

/// Run one ingestion pass.
///
/// Both stores are loaded before the feed is fetched, so a store that cannot
/// be read aborts the run with the ledger untouched. The ledger is then
/// committed with the full fetched batch before any item is processed, so an
/// item that fails here is not retried by later runs. Everything that goes
/// wrong for a single item is recorded in [`IngestResult::failures`].
#[instrument(skip_all, fields(run_id = tracing::field::Empty))]
pub async fn run_ingest<F, R, M>(
    config: &IngestConfig,
    feed: &F,
    renderer: &R,
    media: &M,
    progress: &dyn ProgressReporter,
) -> Result<IngestResult>
where
    F: ItemFeed,
    R: Renderer,
    M: MediaFetcher,
{
    let run_id = Uuid::now_v7();
    Span::current().record("run_id", tracing::field::display(run_id));

    match run_stages(run_id, config, feed, renderer, media, progress).await {
        Ok(result) => {
            progress.done(&result);
            info!(
                fetched = result.fetched,
                new = result.new_items,
                ingested = result.ingested,
                failed = result.failures.len(),
                elapsed_ms = result.elapsed.as_millis() as u64,
                "ingest complete"
            );
            Ok(result)
        }
        Err(e) => {
            error!(error = %e, "ingest aborted");
            progress.aborted(&e);
            Err(e)
        }
    }
}

async fn run_stages<F, R, M>(
    run_id: Uuid,
    config: &IngestConfig,
    feed: &F,
    renderer: &R,
    media: &M,
    progress: &dyn ProgressReporter,
) -> Result<IngestResult>
where
    F: ItemFeed,
    R: Renderer,
    M: MediaFetcher,
{
    let start = Instant::now();

    progress.phase("Loading stores");
    let mut ledger = Ledger::load(&config.ledger_path)?;
    let mut index = ContentIndex::load(&config.index_path)?;

    progress.phase("Fetching feed");
    let items = feed.fetch_items().await?;
    let new_items = ledger.filter_new(&items);
    ledger.commit(&items)?;
    info!(fetched = items.len(), new = new_items.len(), "ledger updated");

    progress.phase("Ingesting items");
    let total = new_items.len();
    let mut ingested = 0;
    let mut failures = Vec::new();

    for (i, item) in new_items.iter().enumerate() {
        progress.item_started(item, i + 1, total);

        let outcome = match ingest_item(config, item, renderer, media).await {
            Ok(doc) => index.upsert(doc).map(|_| ()),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(()) => ingested += 1,
            Err(e) => {
                error!(url = %item.url, date = %item.date, error = %e, "item failed");
                progress.item_failed(item, &e);
                failures.push(ItemFailure {
                    url: item.url.clone(),
                    date: item.date.clone(),
                    error: e,
                });
            }
        }
    }

    Ok(IngestResult {
        run_id,
        fetched: items.len(),
        new_items: total,
        ingested,
        failures,
        elapsed: start.elapsed(),
    })
}

/// Render one item, store its media and standalone file, and build its index entry.
#[instrument(skip_all, fields(url = %item.url, date = %item.date))]
async fn ingest_item<R, M>(
    config: &IngestConfig,
    item: &WorkItem,
    renderer: &R,
    media: &M,
) -> Result<IndexedDocument>
where
    R: Renderer,
    M: MediaFetcher,
{
    validate_path_segment(&item.date)?;

    let fragment = renderer.render(&item.url, &config.selector).await?;
    let html = if config.download_media {
        localize_media(config, &item.date, fragment, media).await
    } else {
        fragment.html
    };

    let document = standalone_document(&item.title, &html);
    write_document(&config.source_dir, &item.date, &document).await?;

    Ok(IndexedDocument::new(
        item.date.clone(),
        item.title.clone(),
        plain_text(&html),
    ))
}

/// Download each media reference and point the fragment at the local copy.
///
/// File names are unique per document. A failed download keeps the original
/// reference.
async fn localize_media<M: MediaFetcher>(
    config: &IngestConfig,
    date: &str,
    fragment: Fragment,
    media: &M,
) -> String {
    let media_dir = config.source_dir.join(date).join("media");
    let mut html = fragment.html;
    let mut used = HashSet::new();

    for reference in &fragment.media {
        let local_ref = MediaReference {
            file_name: unique_file_name(&reference.file_name, &mut used),
            ..reference.clone()
        };

        match media.fetch(&local_ref, &media_dir).await {
            Ok(_) => {
                let local = media_href(&config.base_path, date, &local_ref.file_name);
                html = rewrite_reference(&html, &reference.origin, &local);
            }
            Err(e) => {
                warn!(media = %reference.url, error = %e, "media download failed, keeping origin");
            }
        }
    }

    html
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};
    use std::path::Path;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use url::Url;

    use super::*;

    struct StubFeed(Vec<WorkItem>);

    impl ItemFeed for StubFeed {
        async fn fetch_items(&self) -> Result<Vec<WorkItem>> {
            Ok(self.0.clone())
        }
    }

    struct FailingFeed;

    impl ItemFeed for FailingFeed {
        async fn fetch_items(&self) -> Result<Vec<WorkItem>> {
            Err(GazetteError::Fetch("http://feed.test: HTTP 503".into()))
        }
    }

    #[derive(Default)]
    struct StubRenderer {
        pages: HashMap<String, Fragment>,
        calls: AtomicUsize,
    }

    impl StubRenderer {
        fn with_page(mut self, url: &str, html: &str) -> Self {
            self.pages.insert(
                url.to_string(),
                Fragment {
                    html: html.to_string(),
                    media: vec![],
                },
            );
            self
        }

        fn with_fragment(mut self, url: &str, fragment: Fragment) -> Self {
            self.pages.insert(url.to_string(), fragment);
            self
        }
    }

    impl Renderer for StubRenderer {
        async fn render(&self, url: &str, selector: &str) -> Result<Fragment> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| GazetteError::render(url, format!("element not found: {selector}")))
        }
    }

    #[derive(Default)]
    struct StubMedia {
        failing: HashSet<String>,
    }

    impl MediaFetcher for StubMedia {
        async fn fetch(&self, media: &MediaReference, dir: &Path) -> Result<PathBuf> {
            if self.failing.contains(&media.file_name) {
                return Err(GazetteError::render(
                    media.url.as_str(),
                    "media download failed: HTTP 404",
                ));
            }
            std::fs::create_dir_all(dir).map_err(|e| GazetteError::io(dir, e))?;
            let path = dir.join(&media.file_name);
            std::fs::write(&path, media.url.as_str()).map_err(|e| GazetteError::io(&path, e))?;
            Ok(path)
        }
    }

    /// Records the terminal callback of a run.
    #[derive(Default)]
    struct RecordingProgress {
        events: Mutex<Vec<String>>,
    }

    impl RecordingProgress {
        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }

    impl ProgressReporter for RecordingProgress {
        fn phase(&self, _name: &str) {}
        fn item_started(&self, _item: &WorkItem, _current: usize, _total: usize) {}
        fn item_failed(&self, _item: &WorkItem, _error: &GazetteError) {}

        fn done(&self, result: &IngestResult) {
            self.events
                .lock()
                .unwrap()
                .push(format!("done {}", result.ingested));
        }

        fn aborted(&self, error: &GazetteError) {
            self.events.lock().unwrap().push(format!("aborted {error}"));
        }
    }

    fn item(url: &str, date: &str, title: &str) -> WorkItem {
        WorkItem {
            url: url.into(),
            date: date.into(),
            title: title.into(),
        }
    }

    fn config(root: &Path) -> IngestConfig {
        IngestConfig {
            ledger_path: root.join("url_dictionary.json"),
            index_path: root.join("search_index.json"),
            source_dir: root.join("output"),
            selector: ".cooked".into(),
            base_path: BasePath::new("news"),
            download_media: true,
        }
    }

    fn media_ref(src: &str, file_name: &str) -> MediaReference {
        MediaReference {
            origin: src.into(),
            url: Url::parse(src).unwrap(),
            file_name: file_name.into(),
        }
    }

    fn relative_ref(src: &str, base: &str) -> MediaReference {
        MediaReference {
            origin: src.into(),
            url: Url::parse(base).unwrap().join(src).unwrap(),
            file_name: src.rsplit('/').next().unwrap().into(),
        }
    }

    fn temp_root(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("gz-ingest-{tag}-{}", uuid::Uuid::now_v7()))
    }

    #[tokio::test]
    async fn two_item_feed_end_to_end() {
        let tmp = temp_root("e2e");
        let cfg = config(&tmp);
        let feed = StubFeed(vec![
            item("http://site.test/u1", "2024-01-02", "A"),
            item("http://site.test/u2", "2024-01-01", "B"),
        ]);
        let renderer = StubRenderer::default()
            .with_page(
                "http://site.test/u1",
                "<div class=\"cooked\"><p>Alpha news</p></div>",
            )
            .with_page(
                "http://site.test/u2",
                "<div class=\"cooked\"><p>Beta news</p></div>",
            );

        let result = run_ingest(&cfg, &feed, &renderer, &StubMedia::default(), &SilentProgress)
            .await
            .unwrap();

        assert_eq!(result.fetched, 2);
        assert_eq!(result.new_items, 2);
        assert_eq!(result.ingested, 2);
        assert!(result.failures.is_empty());

        let index = ContentIndex::read(&cfg.index_path).unwrap();
        let dates: Vec<&str> = index.documents().iter().map(|d| d.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-01-02", "2024-01-01"]);

        let page = index.page(1, 10).unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.data[0].title, "A");
        assert_eq!(page.data[0].content, "Alpha news");
        assert_eq!(page.data[0].url, "2024-01-02/2024-01-02.html");
        assert_eq!(page.data[1].title, "B");

        let doc =
            std::fs::read_to_string(cfg.source_dir.join("2024-01-02/2024-01-02.html")).unwrap();
        assert!(doc.contains("<title>A</title>"));
        assert!(doc.contains("<p>Alpha news</p>"));

        let second = run_ingest(&cfg, &feed, &renderer, &StubMedia::default(), &SilentProgress)
            .await
            .unwrap();
        assert_eq!(second.fetched, 2);
        assert_eq!(second.new_items, 0);
        assert_eq!(second.ingested, 0);
        assert_eq!(renderer.calls.load(Ordering::SeqCst), 2);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[tokio::test]
    async fn render_failure_is_recorded_and_loop_continues() {
        let tmp = temp_root("fail");
        let cfg = config(&tmp);
        let feed = StubFeed(vec![
            item("http://site.test/ok", "2024-03-02", "Ok"),
            item("http://site.test/missing", "2024-03-01", "Missing"),
        ]);
        let renderer =
            StubRenderer::default().with_page("http://site.test/ok", "<div>fine</div>");

        let result = run_ingest(&cfg, &feed, &renderer, &StubMedia::default(), &SilentProgress)
            .await
            .unwrap();

        assert_eq!(result.ingested, 1);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].url, "http://site.test/missing");
        assert_eq!(result.failures[0].date, "2024-03-01");
        assert!(matches!(result.failures[0].error, GazetteError::Render { .. }));

        // The failed item was committed and is not retried.
        let ledger = Ledger::load(&cfg.ledger_path).unwrap();
        assert!(ledger.contains("http://site.test/missing"));
        assert_eq!(ContentIndex::read(&cfg.index_path).unwrap().len(), 1);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[tokio::test]
    async fn unsafe_date_fails_only_that_item() {
        let tmp = temp_root("date");
        let cfg = config(&tmp);
        let feed = StubFeed(vec![
            item("http://site.test/good", "2024-04-02", "Good"),
            item("http://site.test/evil", "../escape", "Evil"),
        ]);
        let renderer = StubRenderer::default()
            .with_page("http://site.test/good", "<div>good</div>")
            .with_page("http://site.test/evil", "<div>evil</div>");

        let result = run_ingest(&cfg, &feed, &renderer, &StubMedia::default(), &SilentProgress)
            .await
            .unwrap();

        assert_eq!(result.ingested, 1);
        assert_eq!(result.failures.len(), 1);
        assert!(matches!(result.failures[0].error, GazetteError::Validation { .. }));
        assert!(!tmp.join("escape").exists());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[tokio::test]
    async fn media_is_localized_and_failed_downloads_keep_origin() {
        let tmp = temp_root("media");
        let cfg = config(&tmp);
        let feed = StubFeed(vec![item("http://site.test/m", "2024-05-01", "Media")]);
        let html = concat!(
            r#"<div><img src="https://cdn.test/pic.png?w=2&amp;h=3">"#,
            r#"<img src="https://cdn.test/gone.jpg"></div>"#,
        );
        let renderer = StubRenderer::default().with_fragment(
            "http://site.test/m",
            Fragment {
                html: html.into(),
                media: vec![
                    media_ref("https://cdn.test/pic.png?w=2&h=3", "pic.png"),
                    media_ref("https://cdn.test/gone.jpg", "gone.jpg"),
                ],
            },
        );
        let media = StubMedia {
            failing: HashSet::from(["gone.jpg".to_string()]),
        };

        let result = run_ingest(&cfg, &feed, &renderer, &media, &SilentProgress)
            .await
            .unwrap();
        assert_eq!(result.ingested, 1);
        assert!(result.failures.is_empty());

        let day = cfg.source_dir.join("2024-05-01");
        assert!(day.join("media/pic.png").is_file());
        let doc = std::fs::read_to_string(day.join("2024-05-01.html")).unwrap();
        assert!(doc.contains(r#"<img src="/news/2024-05-01/media/pic.png">"#));
        assert!(doc.contains(r#"<img src="https://cdn.test/gone.jpg">"#));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[tokio::test]
    async fn media_download_can_be_disabled() {
        let tmp = temp_root("nomedia");
        let mut cfg = config(&tmp);
        cfg.download_media = false;
        let feed = StubFeed(vec![item("http://site.test/m", "2024-05-02", "Media")]);
        let renderer = StubRenderer::default().with_fragment(
            "http://site.test/m",
            Fragment {
                html: r#"<img src="https://cdn.test/pic.png">"#.into(),
                media: vec![media_ref("https://cdn.test/pic.png", "pic.png")],
            },
        );

        run_ingest(&cfg, &feed, &renderer, &StubMedia::default(), &SilentProgress)
            .await
            .unwrap();

        let day = cfg.source_dir.join("2024-05-02");
        assert!(!day.join("media").exists());
        let doc = std::fs::read_to_string(day.join("2024-05-02.html")).unwrap();
        assert!(doc.contains("https://cdn.test/pic.png"));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[tokio::test]
    async fn duplicate_names_and_relative_origins_stay_distinct() {
        let tmp = temp_root("names");
        let cfg = config(&tmp);
        let feed = StubFeed(vec![item("http://site.test/d", "2024-05-03", "Dupes")]);
        let html = concat!(
            r#"<div><img src="https://cdn.test/1/image.png">"#,
            r#"<img src="https://cdn.test/2/image.png">"#,
            r#"<img src="https://cdn.test/x/a.png"><img src="a.png"></div>"#,
        );
        let renderer = StubRenderer::default().with_fragment(
            "http://site.test/d",
            Fragment {
                html: html.into(),
                media: vec![
                    media_ref("https://cdn.test/1/image.png", "image.png"),
                    media_ref("https://cdn.test/2/image.png", "image.png"),
                    media_ref("https://cdn.test/x/a.png", "a.png"),
                    relative_ref("a.png", "http://site.test/d"),
                ],
            },
        );

        let result = run_ingest(&cfg, &feed, &renderer, &StubMedia::default(), &SilentProgress)
            .await
            .unwrap();
        assert_eq!(result.ingested, 1);

        let day = cfg.source_dir.join("2024-05-03");
        let doc = std::fs::read_to_string(day.join("2024-05-03.html")).unwrap();
        assert!(doc.contains(concat!(
            r#"<img src="/news/2024-05-03/media/image.png">"#,
            r#"<img src="/news/2024-05-03/media/image-1.png">"#,
            r#"<img src="/news/2024-05-03/media/a.png">"#,
            r#"<img src="/news/2024-05-03/media/a-1.png">"#,
        )));
        assert!(!doc.contains("cdn.test"));

        let media = day.join("media");
        let read = |name: &str| std::fs::read_to_string(media.join(name)).unwrap();
        assert_eq!(read("image.png"), "https://cdn.test/1/image.png");
        assert_eq!(read("image-1.png"), "https://cdn.test/2/image.png");
        assert_eq!(read("a.png"), "https://cdn.test/x/a.png");
        assert_eq!(read("a-1.png"), "http://site.test/a.png");

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[tokio::test]
    async fn feed_failure_aborts_the_run() {
        let tmp = temp_root("feed");
        let cfg = config(&tmp);
        let progress = RecordingProgress::default();

        let err = run_ingest(
            &cfg,
            &FailingFeed,
            &StubRenderer::default(),
            &StubMedia::default(),
            &progress,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, GazetteError::Fetch(_)));
        let ledger: Vec<String> =
            serde_json::from_str(&std::fs::read_to_string(&cfg.ledger_path).unwrap()).unwrap();
        assert!(ledger.is_empty());
        assert_eq!(ContentIndex::read(&cfg.index_path).unwrap().len(), 0);
        assert_eq!(progress.events(), vec![format!("aborted {err}")]);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[tokio::test]
    async fn successful_run_reports_done() {
        let tmp = temp_root("done");
        let cfg = config(&tmp);
        let feed = StubFeed(vec![item("http://site.test/u1", "2024-07-01", "A")]);
        let renderer = StubRenderer::default().with_page("http://site.test/u1", "<div>a</div>");
        let progress = RecordingProgress::default();

        run_ingest(&cfg, &feed, &renderer, &StubMedia::default(), &progress)
            .await
            .unwrap();

        assert_eq!(progress.events(), vec!["done 1".to_string()]);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[tokio::test]
    async fn corrupt_index_aborts_before_the_ledger_commits() {
        let tmp = temp_root("corrupt");
        let cfg = config(&tmp);
        std::fs::create_dir_all(&tmp).unwrap();
        std::fs::write(&cfg.index_path, "{corrupt").unwrap();
        let feed = StubFeed(vec![item("http://site.test/u1", "2024-06-01", "A")]);
        let renderer = StubRenderer::default().with_page("http://site.test/u1", "<div>a</div>");
        let progress = RecordingProgress::default();

        let err = run_ingest(&cfg, &feed, &renderer, &StubMedia::default(), &progress)
            .await
            .unwrap_err();

        assert!(matches!(err, GazetteError::Storage { .. }));
        assert!(!Ledger::load(&cfg.ledger_path).unwrap().contains("http://site.test/u1"));
        assert_eq!(renderer.calls.load(Ordering::SeqCst), 0);
        assert_eq!(progress.events().len(), 1);
        assert!(progress.events()[0].starts_with("aborted"));

        std::fs::remove_file(&cfg.index_path).unwrap();
        let result = run_ingest(&cfg, &feed, &renderer, &StubMedia::default(), &SilentProgress)
            .await
            .unwrap();

        assert_eq!(result.new_items, 1);
        assert_eq!(result.ingested, 1);
        assert_eq!(ContentIndex::read(&cfg.index_path).unwrap().len(), 1);

        let _ = std::fs::remove_dir_all(&tmp);
    }
}
