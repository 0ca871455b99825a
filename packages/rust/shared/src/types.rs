//! Core domain types for the feature-doc pipeline.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{FeatureDocError, Result};

/// Literal stored when no task identifier is found in the PR text.
pub const TASK_ID_SENTINEL: &str = "N/A";

// ---------------------------------------------------------------------------
// PullRequestRef
// ---------------------------------------------------------------------------

/// Coordinates of one pull request on the source host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestRef {
    pub owner: String,
    pub repo: String,
    pub number: u64,
}

impl PullRequestRef {
    /// Build a reference from an `owner/repo` string and a PR number string.
    pub fn parse(repo_full: &str, number: &str) -> Result<Self> {
        let (owner, repo) = repo_full
            .trim()
            .split_once('/')
            .filter(|(o, r)| !o.is_empty() && !r.is_empty() && !r.contains('/'))
            .ok_or_else(|| {
                FeatureDocError::config(format!(
                    "REPO_FULL must look like `owner/repo`, got `{repo_full}`"
                ))
            })?;

        let number = number.trim().parse::<u64>().map_err(|_| {
            FeatureDocError::config(format!("PR_NUMBER must be a positive integer, got `{number}`"))
        })?;
        if number == 0 {
            return Err(FeatureDocError::config("PR_NUMBER must be a positive integer, got `0`"));
        }

        Ok(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
            number,
        })
    }
}

impl std::fmt::Display for PullRequestRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.number)
    }
}

// ---------------------------------------------------------------------------
// PullRequestFacts
// ---------------------------------------------------------------------------

/// Immutable snapshot of one merged pull request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestFacts {
    /// Repository owner (user or organisation).
    pub owner: String,
    /// Repository name; doubles as the project name.
    pub repo: String,
    pub number: u64,
    pub title: String,
    /// Author login handle.
    pub author: String,
    /// PR description, if the author wrote one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Canonical HTML URL of the PR.
    pub url: String,
    /// Label names in host order.
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub commits: Vec<CommitSummary>,
    #[serde(default)]
    pub files: Vec<ChangedFile>,
}

/// First line of a commit message plus its abbreviated hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitSummary {
    pub headline: String,
    pub short_sha: String,
}

/// One file touched by the PR.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedFile {
    pub path: String,
    pub status: FileStatus,
}

/// Change status as reported by the source host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Added,
    Modified,
    Removed,
    Renamed,
    Copied,
    Changed,
    Unchanged,
    #[serde(other)]
    Unknown,
}

impl FileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Modified => "modified",
            Self::Removed => "removed",
            Self::Renamed => "renamed",
            Self::Copied => "copied",
            Self::Changed => "changed",
            Self::Unchanged => "unchanged",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for FileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// InferredMetadata
// ---------------------------------------------------------------------------

/// Classification derived from [`PullRequestFacts`] and the run timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferredMetadata {
    /// Document title, e.g. `feature-2026-10-add-caching-layer-proj-42`.
    pub filename: String,
    /// Title-derived slug (first six tokens).
    pub slug: String,
    /// Ticket reference or [`TASK_ID_SENTINEL`].
    pub task_id: String,
    pub app_area: String,
    pub project: String,
    pub author: String,
    pub pr_url: String,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// ContentBlock
// ---------------------------------------------------------------------------

/// One structural unit of a generated document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentBlock {
    Heading { level: u8, text: String },
    Paragraph { text: String },
    BulletItem { text: String },
}

impl ContentBlock {
    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Self::Heading {
            level,
            text: text.into(),
        }
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::Paragraph { text: text.into() }
    }

    pub fn bullet(text: impl Into<String>) -> Self {
        Self::BulletItem { text: text.into() }
    }

    /// The block's text without any type marker.
    pub fn text(&self) -> &str {
        match self {
            Self::Heading { text, .. } | Self::Paragraph { text } | Self::BulletItem { text } => {
                text
            }
        }
    }
}

// ---------------------------------------------------------------------------
// StoreSchema
// ---------------------------------------------------------------------------

/// Kind of a destination database field, as reported by introspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Title,
    RichText,
    Url,
    Date,
    Select,
    MultiSelect,
    Number,
    Checkbox,
    People,
    #[serde(other)]
    Other,
}

/// Introspected shape of the destination database: field name to kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreSchema {
    pub fields: BTreeMap<String, FieldKind>,
}

impl StoreSchema {
    pub fn new(fields: impl IntoIterator<Item = (String, FieldKind)>) -> Self {
        Self {
            fields: fields.into_iter().collect(),
        }
    }

    /// Kind of the field with exactly this name, if present.
    pub fn kind_of(&self, name: &str) -> Option<FieldKind> {
        self.fields.get(name).copied()
    }

    /// Name of the title-kind field, located by kind rather than by name.
    pub fn title_field(&self) -> Option<&str> {
        self.fields
            .iter()
            .find(|(_, kind)| **kind == FieldKind::Title)
            .map(|(name, _)| name.as_str())
    }
}

// ---------------------------------------------------------------------------
// PageId
// ---------------------------------------------------------------------------

/// Identifier of a page created in the destination store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(pub Uuid);

impl PageId {
    /// Hyphen-free form used in page URLs.
    pub fn compact(&self) -> String {
        self.0.simple().to_string()
    }

    /// Human-usable page reference under the given base URL.
    pub fn url(&self, base: &str) -> String {
        format!("{}/{}", base.trim_end_matches('/'), self.compact())
    }
}

impl std::fmt::Display for PageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PageId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}
