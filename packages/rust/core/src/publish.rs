//! Standalone document output for one ingested item.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use gazette_shared::{BasePath, GazetteError, Result, document_path};
use maud::{DOCTYPE, PreEscaped, html};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

/// Characters escaped when a file name is placed in a URL path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Wrap a rendered fragment in a minimal HTML5 document titled `title`.
pub fn standalone_document(title: &str, fragment: &str) -> String {
    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
            }
            body {
                (PreEscaped(fragment))
            }
        }
    }
    .into_string()
}

/// Public URL of a downloaded media file: `<base>/<date>/media/<file>`.
///
/// The file name is percent-encoded; the server decodes it back to the on-disk name.
pub fn media_href(base: &BasePath, date: &str, file_name: &str) -> String {
    let encoded = utf8_percent_encode(file_name, PATH_SEGMENT);
    base.join(&format!("{date}/media/{encoded}"))
}

/// Point every `src` attribute whose value is exactly `origin` at `local`.
///
/// Serialized markup escapes attribute values, so both the raw and the
/// escaped spelling of `origin` are matched.
pub fn rewrite_reference(html: &str, origin: &str, local: &str) -> String {
    let replacement = format!("src=\"{}\"", escape_attribute(local));
    let raw = format!("src=\"{origin}\"");
    let escaped = format!("src=\"{}\"", escape_attribute(origin));

    let rewritten = html.replace(&raw, &replacement);
    if escaped == raw {
        rewritten
    } else {
        rewritten.replace(&escaped, &replacement)
    }
}

fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('\u{a0}', "&nbsp;")
}

/// Reserve `name` in `used`, suffixing the stem (`image-1.png`) when it is taken.
pub fn unique_file_name(name: &str, used: &mut HashSet<String>) -> String {
    if used.insert(name.to_string()) {
        return name.to_string();
    }

    let (stem, ext) = match name.rfind('.') {
        Some(i) if i > 0 => name.split_at(i),
        _ => (name, ""),
    };
    let mut n = 1;
    loop {
        let candidate = format!("{stem}-{n}{ext}");
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

/// Write `contents` to `<source_dir>/<date>/<date>.html`.
pub async fn write_document(source_dir: &Path, date: &str, contents: &str) -> Result<PathBuf> {
    let path = source_dir.join(document_path(date));
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| GazetteError::io(parent, e))?;
    }
    tokio::fs::write(&path, contents)
        .await
        .map_err(|e| GazetteError::io(&path, e))?;
    Ok(path)
}
