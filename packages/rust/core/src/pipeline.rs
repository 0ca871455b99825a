//! End-to-end `generate` pipeline: PR → facts → metadata → prompt → narrative
//! → blocks → page.
//!
//! The pipeline holds no state between runs. Each phase either yields its
//! output or aborts the run; nothing is written to the knowledge base unless
//! every earlier phase succeeded.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::{info, instrument};

use featuredoc_github::{GitHubClient, GitHubOptions};
use featuredoc_notion::{NotionClient, NotionOptions, build_page_request};
use featuredoc_shared::{
    AppConfig, BlockMode, FeatureDocError, InferredMetadata, PageId, Result, RunConfig,
};

use crate::collaborators::{KnowledgeStore, NarrativeGenerator, SourceHost};
use crate::metadata::infer_metadata;
use crate::narrative::{OpenAiClient, OpenAiOptions};
use crate::prompt::compile_prompt;

/// Tunables for one pipeline run, taken from the application config.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Leading token of the document title.
    pub title_prefix: String,
    /// How the narrative is split into blocks.
    pub block_mode: BlockMode,
    /// Base for the page link reported after creation.
    pub page_url_base: String,
}

impl From<&AppConfig> for PipelineOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            title_prefix: config.document.title_prefix.clone(),
            block_mode: config.document.block_mode,
            page_url_base: config.notion.page_url_base.clone(),
        }
    }
}

/// Result of one successful run.
#[derive(Debug)]
pub struct FeatureDocResult {
    /// Identifier of the created page.
    pub page_id: PageId,
    /// Browser link to the created page.
    pub page_url: String,
    /// Metadata the page was filed under.
    pub metadata: InferredMetadata,
    /// Number of content blocks written.
    pub block_count: usize,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when the pipeline completes.
    fn done(&self, result: &FeatureDocResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn done(&self, _result: &FeatureDocResult) {}
}

// ---------------------------------------------------------------------------
// Live collaborators
// ---------------------------------------------------------------------------

/// The production clients for GitHub, OpenAI, and Notion.
#[derive(Debug, Clone)]
pub struct LiveCollaborators {
    pub github: GitHubClient,
    pub openai: OpenAiClient,
    pub notion: NotionClient,
}

impl LiveCollaborators {
    /// Build all three clients from validated run inputs and file config.
    pub fn new(run: &RunConfig, config: &AppConfig) -> Result<Self> {
        let timeout_secs = config.http.timeout_secs;

        let mut github_opts = GitHubOptions::new(&config.github.api_base, &run.github_token);
        github_opts.timeout_secs = timeout_secs;

        let mut openai_opts = OpenAiOptions::from_config(&config.openai, &run.openai_api_key);
        openai_opts.timeout_secs = timeout_secs;

        let mut notion_opts = NotionOptions::new(
            &config.notion.api_base,
            &run.notion_token,
            &run.notion_database_id,
        );
        notion_opts.version = config.notion.version.clone();
        notion_opts.timeout_secs = timeout_secs;

        Ok(Self {
            github: GitHubClient::new(&github_opts)?,
            openai: OpenAiClient::new(&openai_opts)?,
            notion: NotionClient::new(&notion_opts)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Run the full `generate` pipeline for the PR named in `run`.
///
/// 1. Aggregate PR facts
/// 2. Infer metadata (stamped with `now`)
/// 3. Compile the prompt
/// 4. Generate the narrative
/// 5. Convert Markdown to blocks
/// 6. Read the destination schema
/// 7. Create the page
#[instrument(skip_all, fields(pr = %run.pull_request))]
pub async fn generate_feature_doc(
    run: &RunConfig,
    opts: &PipelineOptions,
    now: DateTime<Utc>,
    source: &dyn SourceHost,
    generator: &dyn NarrativeGenerator,
    store: &dyn KnowledgeStore,
    progress: &dyn ProgressReporter,
) -> Result<FeatureDocResult> {
    let start = Instant::now();
    info!(pr = %run.pull_request, "starting generate pipeline");

    // --- Phase 1: Facts ---
    progress.phase("Fetching pull request");
    let facts = source.pull_request_facts(&run.pull_request).await?;

    // --- Phase 2: Metadata ---
    progress.phase("Inferring metadata");
    let metadata = infer_metadata(&facts, now, &opts.title_prefix);

    // --- Phase 3: Prompt ---
    let prompt = compile_prompt(&facts, &metadata);

    // --- Phase 4: Narrative ---
    progress.phase("Generating narrative");
    let markdown = generator.generate(&prompt).await?;
    if markdown.trim().is_empty() {
        return Err(FeatureDocError::Generation("empty LLM response".into()));
    }

    // --- Phase 5: Blocks ---
    progress.phase("Converting to blocks");
    let blocks = featuredoc_markdown::convert(&markdown, opts.block_mode);
    info!(blocks = blocks.len(), mode = ?opts.block_mode, "narrative converted");
    if blocks.is_empty() {
        return Err(FeatureDocError::Generation(
            "LLM response produced no content blocks".into(),
        ));
    }

    // --- Phase 6: Schema ---
    progress.phase("Reading database schema");
    let schema = store.retrieve_schema().await?;

    // --- Phase 7: Page ---
    progress.phase("Creating page");
    let request = build_page_request(&run.notion_database_id, &metadata, &schema, &blocks)?;
    let page_id = store.create_page(&request).await?;

    let result = FeatureDocResult {
        page_url: page_id.url(&opts.page_url_base),
        page_id,
        metadata,
        block_count: blocks.len(),
        elapsed: start.elapsed(),
    };

    info!(
        page = %result.page_id,
        title = %result.metadata.filename,
        elapsed_ms = result.elapsed.as_millis() as u64,
        "generate pipeline complete"
    );

    progress.done(&result);
    Ok(result)
}
