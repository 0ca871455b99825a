//! Notion knowledge-base store: schema introspection and page creation.
//!
//! - [`NotionClient`] talks to the REST API (one schema read, one page write)
//! - [`build_page_request`] maps metadata and blocks into a creation request
//! - [`OptionalField`] is the closed set of metadata fields written when the
//!   database defines them

mod blocks;
mod page;
mod properties;
mod schema;

use std::time::Duration;

use featuredoc_shared::{FeatureDocError, PageId, Result, StoreSchema};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, Response};
use serde::Deserialize;
use tracing::{info, instrument};
use url::Url;

pub use blocks::{render_block, render_blocks, rich_text};
pub use page::{MAX_CHILDREN_PER_REQUEST, PageParent, PageRequest, build_page_request};
pub use properties::{OptionalField, build_properties};

use schema::DatabaseRecord;

/// Default timeout in seconds for each request.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default `Notion-Version` header value.
const DEFAULT_NOTION_VERSION: &str = "2022-06-28";

/// User-Agent string for API requests.
const USER_AGENT: &str = concat!("featuredoc/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Connection settings for one destination database.
#[derive(Clone)]
pub struct NotionOptions {
    /// REST root, e.g. `https://api.notion.com`.
    pub api_base: String,
    /// Integration token.
    pub token: String,
    /// Value of the `Notion-Version` header.
    pub version: String,
    /// Destination database identifier.
    pub database_id: String,
    /// Timeout for each HTTP request in seconds.
    pub timeout_secs: u64,
}

impl NotionOptions {
    pub fn new(
        api_base: impl Into<String>,
        token: impl Into<String>,
        database_id: impl Into<String>,
    ) -> Self {
        Self {
            api_base: api_base.into(),
            token: token.into(),
            version: DEFAULT_NOTION_VERSION.into(),
            database_id: database_id.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CreatedPage {
    id: String,
}

/// Client bound to a single destination database.
#[derive(Debug, Clone)]
pub struct NotionClient {
    client: Client,
    api_base: Url,
    database_id: String,
}

impl NotionClient {
    pub fn new(opts: &NotionOptions) -> Result<Self> {
        let api_base = Url::parse(&opts.api_base).map_err(|e| {
            FeatureDocError::config(format!("invalid Notion API base {}: {e}", opts.api_base))
        })?;
        if api_base.cannot_be_a_base() {
            return Err(FeatureDocError::config(format!(
                "invalid Notion API base {}: not a base URL",
                opts.api_base
            )));
        }

        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", opts.token))
            .map_err(|_| FeatureDocError::config("NOTION_TOKEN contains invalid characters"))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            "notion-version",
            HeaderValue::from_str(&opts.version).map_err(|_| {
                FeatureDocError::config(format!("invalid Notion version `{}`", opts.version))
            })?,
        );

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(Duration::from_secs(opts.timeout_secs))
            .build()
            .map_err(|e| FeatureDocError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base,
            database_id: opts.database_id.clone(),
        })
    }

    pub fn database_id(&self) -> &str {
        &self.database_id
    }

    /// API URL for `segments`, each percent-encoded as one path segment.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.api_base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Read the destination database's field names and kinds.
    #[instrument(skip(self), fields(database = %self.database_id))]
    pub async fn retrieve_schema(&self) -> Result<StoreSchema> {
        let url = self.endpoint(&["v1", "databases", &self.database_id]);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FeatureDocError::Network(format!("Notion database read: {e}")))?;

        let response = check_status(response, FeatureDocError::StoreRead).await?;
        let record: DatabaseRecord = response.json().await.map_err(|e| {
            FeatureDocError::parse(format!("Notion database read: unexpected response body: {e}"))
        })?;

        let schema = StoreSchema::from(record);
        info!(fields = schema.fields.len(), "database schema retrieved");
        Ok(schema)
    }

    /// Submit a creation request and return the new page's identifier.
    #[instrument(skip_all, fields(database = %request.parent.database_id, blocks = request.children.len()))]
    pub async fn create_page(&self, request: &PageRequest) -> Result<PageId> {
        let url = self.endpoint(&["v1", "pages"]);

        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| FeatureDocError::StoreWrite(format!("Notion page create: {e}")))?;

        let response = check_status(response, FeatureDocError::StoreWrite).await?;
        let page: CreatedPage = response.json().await.map_err(|e| {
            FeatureDocError::parse(format!("Notion page create: unexpected response body: {e}"))
        })?;

        let id: PageId = page.id.parse().map_err(|e| {
            FeatureDocError::parse(format!("Notion returned a malformed page id `{}`: {e}", page.id))
        })?;

        info!(page = %id, "page created");
        Ok(id)
    }
}

/// Pass success responses through; turn anything else into `wrap(status + body)`.
async fn check_status(
    response: Response,
    wrap: fn(String) -> FeatureDocError,
) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let url = response.url().path().to_string();
    let body = response.text().await.unwrap_or_default();
    Err(wrap(format!("Notion {url} -> {status}\n{body}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use featuredoc_shared::{ContentBlock, FieldKind, InferredMetadata};
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fixture(name: &str) -> String {
        std::fs::read_to_string(format!("../../../fixtures/notion/{name}"))
            .expect("read notion fixture")
    }

    fn client_for(server: &MockServer) -> NotionClient {
        NotionClient::new(&NotionOptions::new(server.uri(), "secret_test", "db-1")).unwrap()
    }

    fn request() -> PageRequest {
        let meta = InferredMetadata {
            filename: "feature-2026-10-fix-login".into(),
            slug: "fix-login".into(),
            task_id: "AUTH-7".into(),
            app_area: "auth".into(),
            project: "shop".into(),
            author: "octocat".into(),
            pr_url: "https://github.com/acme/shop/pull/9".into(),
            created_at: Utc::now(),
        };
        let schema = StoreSchema::new([
            ("Name".to_string(), FieldKind::Title),
            ("Task ID".to_string(), FieldKind::RichText),
        ]);
        build_page_request("db-1", &meta, &schema, &[ContentBlock::paragraph("N/A")]).unwrap()
    }

    #[tokio::test]
    async fn test_retrieve_schema() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/databases/db-1"))
            .and(header("authorization", "Bearer secret_test"))
            .and(header("notion-version", "2022-06-28"))
            .respond_with(ResponseTemplate::new(200).set_body_string(fixture("database.json")))
            .mount(&server)
            .await;

        let schema = client_for(&server).retrieve_schema().await.unwrap();
        assert_eq!(schema.title_field(), Some("Name"));
        assert_eq!(schema.fields.len(), 8);
    }

    #[tokio::test]
    async fn test_database_id_stays_one_path_segment() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/databases/db%2F1%3Fx=y"))
            .respond_with(ResponseTemplate::new(200).set_body_string(fixture("database.json")))
            .expect(1)
            .mount(&server)
            .await;

        let client =
            NotionClient::new(&NotionOptions::new(server.uri(), "secret_test", "db/1?x=y")).unwrap();
        let schema = client.retrieve_schema().await.unwrap();
        assert_eq!(schema.title_field(), Some("Name"));
    }

    #[test]
    fn endpoint_keeps_base_path() {
        let client = NotionClient::new(&NotionOptions::new(
            "https://proxy.example.com/notion/",
            "secret_test",
            "db-1",
        ))
        .unwrap();
        assert_eq!(
            client.endpoint(&["v1", "pages"]).as_str(),
            "https://proxy.example.com/notion/v1/pages"
        );
    }

    #[tokio::test]
    async fn test_retrieve_schema_failure() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/databases/db-1"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_string(r#"{"object":"error","code":"object_not_found"}"#),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).retrieve_schema().await.unwrap_err();
        match err {
            FeatureDocError::StoreRead(msg) => {
                assert!(msg.contains("404"));
                assert!(msg.contains("object_not_found"));
            }
            other => panic!("expected StoreRead, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_page() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/pages"))
            .and(body_partial_json(serde_json::json!({
                "parent": { "database_id": "db-1" },
                "properties": { "Task ID": { "rich_text": [{ "text": { "content": "AUTH-7" } }] } }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_string(fixture("page.json")))
            .expect(1)
            .mount(&server)
            .await;

        let id = client_for(&server).create_page(&request()).await.unwrap();
        assert_eq!(id.compact(), "598337872cf94fdf8782e53db20768a5");
    }

    #[tokio::test]
    async fn test_create_page_rejected() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/pages"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_string(r#"{"object":"error","code":"validation_error"}"#),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).create_page(&request()).await.unwrap_err();
        assert!(matches!(err, FeatureDocError::StoreWrite(msg) if msg.contains("validation_error")));
    }
}
