//! Shared types, error model, and configuration for featuredoc.
//!
//! This crate is the foundation depended on by all other featuredoc crates.
//! It provides:
//! - [`FeatureDocError`]: the unified error type
//! - Domain types ([`PullRequestFacts`], [`InferredMetadata`], [`ContentBlock`], [`StoreSchema`])
//! - Configuration ([`AppConfig`], [`RunInputs`], [`RunConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, BlockMode, DocumentConfig, GitHubConfig, HttpConfig, NotionConfig, OpenAiConfig,
    RunConfig, RunInputs, config_dir, config_file_path, init_config, load_config,
    load_config_from,
};
pub use error::{FeatureDocError, Result};
pub use types::{
    ChangedFile, CommitSummary, ContentBlock, FieldKind, FileStatus, InferredMetadata, PageId,
    PullRequestFacts, PullRequestRef, StoreSchema, TASK_ID_SENTINEL,
};
