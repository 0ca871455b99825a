//! Seams between the pipeline and its three remote collaborators.
//!
//! The pipeline only sees these traits, so tests can substitute in-memory
//! fakes for the PR host, the LLM, and the knowledge base.

use async_trait::async_trait;

use featuredoc_github::GitHubClient;
use featuredoc_notion::{NotionClient, PageRequest};
use featuredoc_shared::{PageId, PullRequestFacts, PullRequestRef, Result, StoreSchema};

use crate::narrative::OpenAiClient;
use crate::prompt::CompiledPrompt;

/// Source of PR facts.
#[async_trait]
pub trait SourceHost: Send + Sync {
    async fn pull_request_facts(&self, pr: &PullRequestRef) -> Result<PullRequestFacts>;
}

/// Turns a compiled prompt into document Markdown.
#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    async fn generate(&self, prompt: &CompiledPrompt) -> Result<String>;
}

/// Destination database for generated pages.
#[async_trait]
pub trait KnowledgeStore: Send + Sync {
    async fn retrieve_schema(&self) -> Result<StoreSchema>;
    async fn create_page(&self, request: &PageRequest) -> Result<PageId>;
}

#[async_trait]
impl SourceHost for GitHubClient {
    async fn pull_request_facts(&self, pr: &PullRequestRef) -> Result<PullRequestFacts> {
        GitHubClient::pull_request_facts(self, pr).await
    }
}

#[async_trait]
impl NarrativeGenerator for OpenAiClient {
    async fn generate(&self, prompt: &CompiledPrompt) -> Result<String> {
        self.complete(prompt).await
    }
}

#[async_trait]
impl KnowledgeStore for NotionClient {
    async fn retrieve_schema(&self) -> Result<StoreSchema> {
        NotionClient::retrieve_schema(self).await
    }

    async fn create_page(&self, request: &PageRequest) -> Result<PageId> {
        NotionClient::create_page(self, request).await
    }
}
