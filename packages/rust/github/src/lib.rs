//! Pull-request fact aggregation against the GitHub REST API.
//!
//! Three sequential reads (PR detail, commits, changed files) are combined
//! into one [`PullRequestFacts`] snapshot. Any non-success status aborts the
//! whole aggregation with [`FeatureDocError::UpstreamFetch`]; no partial
//! snapshot is ever returned.

mod wire;

use std::time::Duration;

use featuredoc_shared::{
    ChangedFile, CommitSummary, FeatureDocError, PullRequestFacts, PullRequestRef, Result,
};
use reqwest::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};
use url::Url;

use wire::{CommitRecord, FileRecord, PullRecord};

/// Media type requested from the REST API.
const GITHUB_ACCEPT: &str = "application/vnd.github+json";

/// Pinned REST API version.
const GITHUB_API_VERSION: &str = "2022-11-28";

/// Largest page the list endpoints serve; only the first page is read.
const PER_PAGE: u32 = 100;

/// Default timeout in seconds for each read.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// User-Agent string for API requests (GitHub rejects requests without one).
const USER_AGENT: &str = concat!("featuredoc/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Connection settings for the GitHub client.
#[derive(Clone)]
pub struct GitHubOptions {
    /// REST root, e.g. `https://api.github.com`.
    pub api_base: String,
    /// Token sent as a bearer credential.
    pub token: String,
    /// Timeout for each HTTP request in seconds.
    pub timeout_secs: u64,
}

impl GitHubOptions {
    pub fn new(api_base: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            token: token.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Read-only GitHub client.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: Client,
    api_base: String,
}

impl GitHubClient {
    /// Build a client; fails on an unparsable base URL or bad token bytes.
    pub fn new(opts: &GitHubOptions) -> Result<Self> {
        Url::parse(&opts.api_base).map_err(|e| {
            FeatureDocError::config(format!("invalid GitHub API base {}: {e}", opts.api_base))
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));
        headers.insert(
            "x-github-api-version",
            HeaderValue::from_static(GITHUB_API_VERSION),
        );
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", opts.token))
            .map_err(|_| FeatureDocError::config("GITHUB_TOKEN contains invalid characters"))?;
        auth.set_sensitive(true);
        headers.insert(reqwest::header::AUTHORIZATION, auth);

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(Duration::from_secs(opts.timeout_secs))
            .build()
            .map_err(|e| FeatureDocError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base: opts.api_base.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch the PR record, its commits, and its changed files.
    ///
    /// Reads run one after another; the first failure ends the aggregation.
    #[instrument(skip(self), fields(pr = %pr))]
    pub async fn pull_request_facts(&self, pr: &PullRequestRef) -> Result<PullRequestFacts> {
        let base = format!("/repos/{}/{}/pulls/{}", pr.owner, pr.repo, pr.number);

        let record: PullRecord = self.get_json(&base).await?;
        let commits: Vec<CommitRecord> = self
            .get_json(&format!("{base}/commits?per_page={PER_PAGE}"))
            .await?;
        let files: Vec<FileRecord> = self
            .get_json(&format!("{base}/files?per_page={PER_PAGE}"))
            .await?;

        let author = record.author();
        let body = record.body();
        let facts = PullRequestFacts {
            owner: pr.owner.clone(),
            repo: pr.repo.clone(),
            number: record.number,
            title: record.title.trim().to_string(),
            author,
            body,
            url: record.html_url,
            labels: record.labels.into_iter().map(|l| l.name).collect(),
            commits: commits.into_iter().map(CommitSummary::from).collect(),
            files: files.into_iter().map(ChangedFile::from).collect(),
        };

        info!(
            title = %facts.title,
            commits = facts.commits.len(),
            files = facts.files.len(),
            labels = facts.labels.len(),
            "pull request facts aggregated"
        );

        Ok(facts)
    }

    /// GET `path` under the API root and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{path}", self.api_base);
        debug!(%path, "GitHub read");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FeatureDocError::Network(format!("GitHub {path}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FeatureDocError::UpstreamFetch {
                path: path.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        response.json::<T>().await.map_err(|e| {
            FeatureDocError::parse(format!("GitHub {path}: unexpected response body: {e}"))
        })
    }
}
