//! Element extraction from a fetched HTML document.

use std::collections::HashSet;
use std::sync::LazyLock;

use gazette_shared::{GazetteError, Result};
use percent_encoding::percent_decode_str;
use scraper::{Html, Selector};
use url::Url;

use crate::{Fragment, MediaReference};

/// Elements whose `src` is treated as downloadable media.
static MEDIA_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img, video, source").expect("valid selector"));

/// Pull the first element matching `selector` out of `html`.
///
/// Returns its outer HTML plus every media reference found beneath it, with
/// `src` values resolved against `page_url`.
pub fn extract_fragment(html: &str, page_url: &Url, selector: &str) -> Result<Fragment> {
    let target = Selector::parse(selector).map_err(|e| {
        GazetteError::render(page_url.as_str(), format!("invalid selector '{selector}': {e}"))
    })?;

    let doc = Html::parse_document(html);
    let element = doc.select(&target).next().ok_or_else(|| {
        GazetteError::render(page_url.as_str(), format!("element not found: {selector}"))
    })?;

    let mut origins = HashSet::new();
    let media = element
        .select(&MEDIA_SELECTOR)
        .filter_map(|el| el.value().attr("src"))
        .filter(|src| !src.trim().is_empty())
        .filter_map(|src| media_reference(src, page_url))
        .filter(|m| origins.insert(m.origin.clone()))
        .collect();

    Ok(Fragment {
        html: element.html(),
        media,
    })
}

/// Resolve `src` and derive its file name; `None` when no name can be derived.
fn media_reference(src: &str, page_url: &Url) -> Option<MediaReference> {
    let url = page_url.join(src).ok()?;
    let segment = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())?;
    let file_name = local_file_name(segment)?;

    Some(MediaReference {
        origin: src.to_string(),
        url,
        file_name,
    })
}

/// Decoded on-disk name for a URL path segment.
///
/// Separators that decoding could introduce become `_`; `.` and `..` are rejected.
fn local_file_name(segment: &str) -> Option<String> {
    let decoded = percent_decode_str(segment).decode_utf8_lossy();
    let name: String = decoded
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | '\0') { '_' } else { c })
        .collect();

    match name.as_str() {
        "" | "." | ".." => None,
        _ => Some(name),
    }
}
