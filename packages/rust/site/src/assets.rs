/// Shared stylesheet written as `styles.css` on every build.
pub(crate) const STYLES: &str = r#"body {
    font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
    max-width: 800px;
    margin: 0 auto;
    padding: 20px;
    color: #222;
    background: #fafafa;
}

.controls {
    display: flex;
    gap: 12px;
    align-items: center;
    margin-bottom: 20px;
}

.search-box {
    flex: 1;
    padding: 8px 12px;
    font-size: 16px;
    border: 1px solid #ccc;
    border-radius: 4px;
}

.per-page {
    padding: 6px;
    font-size: 14px;
}

.article {
    padding: 12px 0;
    border-bottom: 1px solid #eee;
}

.article a {
    font-size: 18px;
    color: #0366d6;
    text-decoration: none;
}

.article a:hover {
    text-decoration: underline;
}

.date {
    margin-top: 4px;
    font-size: 13px;
    color: #666;
}

.no-results {
    padding: 20px 0;
    color: #666;
}

.pagination {
    display: flex;
    gap: 16px;
    justify-content: center;
    align-items: center;
    margin-top: 24px;
}

.page-link {
    padding: 6px 12px;
    border: 1px solid #ccc;
    border-radius: 4px;
    color: #0366d6;
    text-decoration: none;
}

.page-link.disabled {
    color: #aaa;
    border-color: #eee;
}
"#;
