//! Error types for Gazette.
//!
//! Library crates use [`GazetteError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all Gazette operations.
#[derive(Debug, thiserror::Error)]
pub enum GazetteError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Discovery feed unreachable or malformed.
    #[error("fetch error: {0}")]
    Fetch(String),

    /// Render capability failed or the target element was absent.
    #[error("render error for {url}: {message}")]
    Render { url: String, message: String },

    /// Durable store unreadable (other than absent) or unwritable.
    #[error("storage error at {path:?}: {message}")]
    Storage { path: PathBuf, message: String },

    /// File-system failure during static site generation.
    #[error("build error at {path:?}: {source}")]
    Build {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Filesystem I/O error outside the stores and the site build.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (bad page size, unsafe path segment, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Live query server failed to bind or stopped with an error.
    #[error("server error on {addr}: {source}")]
    Server {
        addr: String,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, GazetteError>;

impl GazetteError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a render error for `url`.
    pub fn render(url: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Render {
            url: url.into(),
            message: msg.into(),
        }
    }

    /// Create a storage error for the store at `path`.
    pub fn storage(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::Storage {
            path: path.into(),
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` raised while building the static site.
    pub fn build(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Build {
            path: path.into(),
            source,
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = GazetteError::config("missing feed endpoint");
        assert_eq!(err.to_string(), "config error: missing feed endpoint");

        let err = GazetteError::render("https://example.com/t/1", "element not found: .post");
        assert_eq!(
            err.to_string(),
            "render error for https://example.com/t/1: element not found: .post"
        );

        let err = GazetteError::storage("search_index.json", "invalid JSON");
        assert!(err.to_string().contains("search_index.json"));
        assert!(err.to_string().contains("invalid JSON"));
    }

    #[test]
    fn build_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = GazetteError::build("/tmp/site/index.html", io);
        assert!(err.to_string().contains("index.html"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
