//! URL prefix applied to every link the site emits.

use std::fmt;

/// Normalized base path: either empty or `/seg[/seg...]` with no trailing slash.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BasePath(String);

impl BasePath {
    /// Normalize a user-supplied prefix (`"archive/"`, `"/archive"`, `""`...).
    pub fn new(raw: &str) -> Self {
        let segments: Vec<&str> = raw.split('/').filter(|s| !s.is_empty()).collect();
        if segments.is_empty() {
            Self(String::new())
        } else {
            Self(format!("/{}", segments.join("/")))
        }
    }

    /// The prefix itself (`""` or `/archive`).
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Join a site-relative path onto the prefix: `join("a/b.html")` → `/archive/a/b.html`.
    pub fn join(&self, relative: &str) -> String {
        format!("{}/{}", self.0, relative.trim_start_matches('/'))
    }

    /// The site root URL (`/` or `/archive/`).
    pub fn root(&self) -> String {
        format!("{}/", self.0)
    }
}

impl fmt::Display for BasePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
