//! Error types for featuredoc.
//!
//! Library crates use [`FeatureDocError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for every stage of the feature-doc pipeline.
///
/// Every variant is fatal to the run: nothing is retried and nothing
/// degrades to a partial page.
#[derive(Debug, thiserror::Error)]
pub enum FeatureDocError {
    /// A required input is missing or malformed.
    #[error("config error: {message}")]
    Config { message: String },

    /// The source host answered a read with a non-success status.
    #[error("upstream fetch failed: GitHub {path} -> {status}\n{body}")]
    UpstreamFetch {
        path: String,
        status: u16,
        body: String,
    },

    /// Transport-level HTTP failure (connect, timeout, body read).
    #[error("network error: {0}")]
    Network(String),

    /// Response decoding error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// The language model returned nothing usable.
    #[error("generation error: {0}")]
    Generation(String),

    /// The destination database has no title-kind field.
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// Schema introspection against the store failed.
    #[error("store read error: {0}")]
    StoreRead(String),

    /// Page creation against the store failed.
    #[error("store write error: {0}")]
    StoreWrite(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, FeatureDocError>;

impl FeatureDocError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a schema mismatch error from any displayable message.
    pub fn schema_mismatch(msg: impl Into<String>) -> Self {
        Self::SchemaMismatch {
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
        let err = FeatureDocError::config("missing env NOTION_TOKEN");
        assert_eq!(err.to_string(), "config error: missing env NOTION_TOKEN");

        let err = FeatureDocError::schema_mismatch("no title property");
        assert!(err.to_string().contains("no title property"));
    }

    #[test]
    fn upstream_fetch_carries_status_and_body() {
        let err = FeatureDocError::UpstreamFetch {
            path: "/repos/acme/shop/pulls/7".into(),
            status: 404,
            body: r#"{"message":"Not Found"}"#.into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/repos/acme/shop/pulls/7 -> 404"));
        assert!(msg.contains("Not Found"));
    }
}
