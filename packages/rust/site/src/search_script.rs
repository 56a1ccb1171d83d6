//! Client-side search bundle.
//!
//! The generated `search.js` embeds the whole collection and filters it in the
//! browser with the same rules as the content index search: whitespace
//! tokens, lower-cased, every token must appear in the title or the content.

use gazette_shared::{BasePath, IndexedDocument, Result};

use crate::site_error;

const SEARCH_LOGIC: &str = r#"
const articleList = document.getElementById('articleList');
const pagination = document.querySelector('.pagination');
const searchInput = document.getElementById('search');
const initialListing = articleList ? articleList.innerHTML : '';

function escapeHtml(value) {
    return String(value)
        .replace(/&/g, '&amp;')
        .replace(/</g, '&lt;')
        .replace(/>/g, '&gt;')
        .replace(/"/g, '&quot;')
        .replace(/'/g, '&#39;');
}

function searchArticles(query) {
    const tokens = query.toLowerCase().split(/\s+/).filter((t) => t.length > 0);
    if (tokens.length === 0) return articleData;
    return articleData.filter((article) => {
        const title = article.title.toLowerCase();
        const content = article.content.toLowerCase();
        return tokens.every((t) => title.includes(t) || content.includes(t));
    });
}

function renderArticle(article) {
    return '<div class="article">'
        + '<a href="' + escapeHtml(prefixPath + '/' + article.url) + '">'
        + escapeHtml(article.title) + '</a>'
        + '<div class="date">' + escapeHtml(article.date) + '</div>'
        + '</div>';
}

if (searchInput && articleList) {
    searchInput.addEventListener('input', (e) => {
        const query = e.target.value;
        if (query.trim() === '') {
            articleList.innerHTML = initialListing;
            if (pagination) pagination.style.display = '';
            return;
        }
        const results = searchArticles(query);
        articleList.innerHTML = results.length > 0
            ? results.map(renderArticle).join('')
            : '<div class="no-results">No matching articles</div>';
        if (pagination) pagination.style.display = 'none';
    });
}
"#;

/// Build the contents of `search.js`.
pub(crate) fn render(base: &BasePath, documents: &[IndexedDocument]) -> Result<String> {
    let data = serde_json::to_string(documents)
        .map_err(|e| site_error("search.js", format!("cannot serialize collection: {e}")))?;
    let prefix = serde_json::to_string(base.as_str())
        .map_err(|e| site_error("search.js", format!("cannot serialize base path: {e}")))?;

    Ok(format!(
        "const articleData = {data};\nconst prefixPath = {prefix};\n{SEARCH_LOGIC}"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embeds_collection_and_prefix() {
        let docs = vec![IndexedDocument::new("2024-01-02", "Quote \"this\"", "body text")];
        let js = render(&BasePath::new("/archive/"), &docs).unwrap();

        assert!(js.starts_with("const articleData = [{"));
        assert!(js.contains(r#""title":"Quote \"this\"""#));
        assert!(js.contains(r#""url":"2024-01-02/2024-01-02.html""#));
        assert!(js.contains(r#"const prefixPath = "/archive";"#));
        assert!(js.contains("initialListing"));
    }

    #[test]
    fn empty_collection_is_an_empty_array() {
        let js = render(&BasePath::default(), &[]).unwrap();
        assert!(js.starts_with("const articleData = [];\nconst prefixPath = \"\";"));
    }
}
