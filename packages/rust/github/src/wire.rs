//! GitHub REST payloads, trimmed to the fields the pipeline reads.

use serde::Deserialize;

use featuredoc_shared::{ChangedFile, CommitSummary, FileStatus};

/// Length of the abbreviated commit hash shown in summaries.
const SHORT_SHA_LEN: usize = 7;

/// Login used when the PR author account no longer exists.
pub(crate) const UNKNOWN_AUTHOR: &str = "unknown";

/// `GET /repos/{owner}/{repo}/pulls/{number}`
#[derive(Debug, Deserialize)]
pub(crate) struct PullRecord {
    pub number: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    pub html_url: String,
    #[serde(default)]
    pub user: Option<UserRecord>,
    #[serde(default)]
    pub labels: Vec<LabelRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserRecord {
    pub login: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LabelRecord {
    pub name: String,
}

/// One element of `GET .../pulls/{number}/commits`.
#[derive(Debug, Deserialize)]
pub(crate) struct CommitRecord {
    pub sha: String,
    pub commit: CommitDetail,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommitDetail {
    #[serde(default)]
    pub message: String,
}

/// One element of `GET .../pulls/{number}/files`.
#[derive(Debug, Deserialize)]
pub(crate) struct FileRecord {
    pub filename: String,
    pub status: FileStatus,
}

impl PullRecord {
    pub(crate) fn author(&self) -> String {
        self.user
            .as_ref()
            .map(|u| u.login.clone())
            .filter(|login| !login.is_empty())
            .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string())
    }

    /// Body text as written, with blank descriptions treated as absent.
    pub(crate) fn body(&self) -> Option<String> {
        self.body.clone().filter(|b| !b.trim().is_empty())
    }
}

impl From<CommitRecord> for CommitSummary {
    fn from(record: CommitRecord) -> Self {
        let headline = record
            .commit
            .message
            .lines()
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();
        let short_sha = record.sha.chars().take(SHORT_SHA_LEN).collect();
        Self {
            headline,
            short_sha,
        }
    }
}

impl From<FileRecord> for ChangedFile {
    fn from(record: FileRecord) -> Self {
        Self {
            path: record.filename,
            status: record.status,
        }
    }
}
