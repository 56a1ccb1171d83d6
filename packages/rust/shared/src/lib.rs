//! Shared types, error model, and configuration for Gazette.
//!
//! This crate is the foundation depended on by all other Gazette crates.
//! It provides:
//! - [`GazetteError`]: the unified error type
//! - Domain types ([`WorkItem`], [`IndexedDocument`], [`PageView`]) and pagination
//! - Whole-file JSON persistence ([`json_file`])
//! - Configuration ([`AppConfig`], config loading)

pub mod base_path;
pub mod config;
pub mod error;
pub mod json_file;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use base_path::BasePath;
pub use config::{
    AppConfig, ConfigOverrides, FeedConfig, PathsConfig, RenderConfig, ServerConfig, SiteConfig,
    config_dir, config_file_path, init_config, load_config, load_config_from, validate_for_ingest,
};
pub use error::{GazetteError, Result};
pub use types::{
    FeedResponse, IndexedDocument, PageView, WorkItem, document_path, paginate, total_pages,
    validate_path_segment,
};
