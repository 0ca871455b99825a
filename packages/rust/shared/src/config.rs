//! Application configuration for featuredoc.
//!
//! Tunables live at `~/.featuredoc/featuredoc.toml` (or a `--config` path).
//! Credentials and the target PR never live in the file: they arrive as
//! [`RunInputs`] (CLI flags or environment) and are validated into a
//! [`RunConfig`] before any network call is made.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{FeatureDocError, Result};
use crate::types::PullRequestRef;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "featuredoc.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".featuredoc";

// ---------------------------------------------------------------------------
// Config structs (matching featuredoc.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub openai: OpenAiConfig,

    #[serde(default)]
    pub github: GitHubConfig,

    #[serde(default)]
    pub notion: NotionConfig,

    #[serde(default)]
    pub document: DocumentConfig,

    #[serde(default)]
    pub http: HttpConfig,
}

/// `[openai]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default = "default_openai_api_base")]
    pub api_base: String,

    /// Chat model used for the narrative.
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature; kept low so reruns read alike.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// System message sent ahead of the compiled prompt.
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_base: default_openai_api_base(),
            model: default_model(),
            temperature: default_temperature(),
            system_prompt: default_system_prompt(),
        }
    }
}

fn default_openai_api_base() -> String {
    "https://api.openai.com/v1".into()
}
fn default_model() -> String {
    "gpt-4o".into()
}
fn default_temperature() -> f32 {
    0.2
}
fn default_system_prompt() -> String {
    "You generate precise, audit-friendly engineering docs.".into()
}

/// `[github]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    #[serde(default = "default_github_api_base")]
    pub api_base: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base: default_github_api_base(),
        }
    }
}

fn default_github_api_base() -> String {
    "https://api.github.com".into()
}

/// `[notion]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotionConfig {
    #[serde(default = "default_notion_api_base")]
    pub api_base: String,

    /// Value of the `Notion-Version` header.
    #[serde(default = "default_notion_version")]
    pub version: String,

    /// Base for the human-usable page link printed after a run.
    #[serde(default = "default_page_url_base")]
    pub page_url_base: String,
}

impl Default for NotionConfig {
    fn default() -> Self {
        Self {
            api_base: default_notion_api_base(),
            version: default_notion_version(),
            page_url_base: default_page_url_base(),
        }
    }
}

fn default_notion_api_base() -> String {
    "https://api.notion.com".into()
}
fn default_notion_version() -> String {
    "2022-06-28".into()
}
fn default_page_url_base() -> String {
    "https://www.notion.so".into()
}

/// How model output is turned into content blocks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockMode {
    /// Line-classified headings, bullets, and paragraphs.
    #[default]
    Structured,
    /// Blank-line-delimited paragraphs only.
    Paragraphs,
}

/// `[document]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentConfig {
    /// Leading token of every document title.
    #[serde(default = "default_title_prefix")]
    pub title_prefix: String,

    #[serde(default)]
    pub block_mode: BlockMode,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            title_prefix: default_title_prefix(),
            block_mode: BlockMode::default(),
        }
    }
}

fn default_title_prefix() -> String {
    "feature".into()
}

/// `[http]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout in seconds, shared by all three collaborators.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    60
}

impl AppConfig {
    /// Reject values that would only fail later, mid-run.
    pub fn validate(&self) -> Result<()> {
        for (key, value) in [
            ("openai.api_base", &self.openai.api_base),
            ("github.api_base", &self.github.api_base),
            ("notion.api_base", &self.notion.api_base),
            ("notion.page_url_base", &self.notion.page_url_base),
        ] {
            Url::parse(value).map_err(|e| {
                FeatureDocError::config(format!("{key} is not a valid URL ({value}): {e}"))
            })?;
        }

        if !(0.0..=2.0).contains(&self.openai.temperature) {
            return Err(FeatureDocError::config(format!(
                "openai.temperature must be within 0.0..=2.0, got {}",
                self.openai.temperature
            )));
        }

        if self.document.title_prefix.trim().is_empty() {
            return Err(FeatureDocError::config("document.title_prefix must not be empty"));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Run inputs (per invocation, from flags or environment)
// ---------------------------------------------------------------------------

/// Raw per-run inputs as supplied by the caller; any may be absent.
#[derive(Debug, Clone, Default)]
pub struct RunInputs {
    pub openai_api_key: Option<String>,
    pub notion_token: Option<String>,
    pub notion_db_id: Option<String>,
    pub github_token: Option<String>,
    pub repo_full: Option<String>,
    pub pr_number: Option<String>,
}

/// Validated per-run configuration passed into the pipeline.
#[derive(Clone)]
pub struct RunConfig {
    pub openai_api_key: String,
    pub notion_token: String,
    pub notion_database_id: String,
    pub github_token: String,
    pub pull_request: PullRequestRef,
}

impl std::fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunConfig")
            .field("openai_api_key", &"<redacted>")
            .field("notion_token", &"<redacted>")
            .field("notion_database_id", &self.notion_database_id)
            .field("github_token", &"<redacted>")
            .field("pull_request", &self.pull_request)
            .finish()
    }
}

impl RunInputs {
    /// Check every required input is present and well-formed.
    ///
    /// All missing names are reported together, using their environment
    /// variable names.
    pub fn validate(self) -> Result<RunConfig> {
        let required = [
            ("OPENAI_API_KEY", &self.openai_api_key),
            ("NOTION_TOKEN", &self.notion_token),
            ("NOTION_DB_ID", &self.notion_db_id),
            ("GITHUB_TOKEN", &self.github_token),
            ("REPO_FULL", &self.repo_full),
            ("PR_NUMBER", &self.pr_number),
        ];

        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.as_deref().is_none_or(|v| v.trim().is_empty()))
            .map(|(name, _)| *name)
            .collect();

        if !missing.is_empty() {
            return Err(FeatureDocError::config(format!(
                "missing env {}",
                missing.join(", ")
            )));
        }

        let take = |value: Option<String>| value.unwrap_or_default().trim().to_string();
        let pull_request = PullRequestRef::parse(
            &take(self.repo_full),
            &take(self.pr_number),
        )?;

        Ok(RunConfig {
            openai_api_key: take(self.openai_api_key),
            notion_token: take(self.notion_token),
            notion_database_id: take(self.notion_db_id),
            github_token: take(self.github_token),
            pull_request,
        })
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.featuredoc/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| FeatureDocError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.featuredoc/featuredoc.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = match config_file_path() {
        Ok(path) => path,
        Err(e) => {
            tracing::debug!(error = %e, "no home directory, using default config");
            return Ok(AppConfig::default());
        }
    };

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| FeatureDocError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        FeatureDocError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    config.validate()?;
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| FeatureDocError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| FeatureDocError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| FeatureDocError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_inputs() -> RunInputs {
        RunInputs {
            openai_api_key: Some("sk-test".into()),
            notion_token: Some("secret_notion".into()),
            notion_db_id: Some("db123".into()),
            github_token: Some("ghp_test".into()),
            repo_full: Some("acme/shop".into()),
            pr_number: Some("17".into()),
        }
    }

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("gpt-4o"));
        assert!(toml_str.contains("2022-06-28"));
        assert!(toml_str.contains("structured"));
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let toml_str = r#"
[openai]
model = "gpt-4o-mini"

[document]
block_mode = "paragraphs"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.openai.model, "gpt-4o-mini");
        assert_eq!(config.openai.temperature, 0.2);
        assert_eq!(config.document.block_mode, BlockMode::Paragraphs);
        assert_eq!(config.document.title_prefix, "feature");
        assert_eq!(config.github.api_base, "https://api.github.com");
        config.validate().expect("valid");
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.notion.api_base = "not a url".into();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.openai.temperature = 3.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn run_inputs_validate() {
        let run = full_inputs().validate().expect("valid inputs");
        assert_eq!(run.pull_request.owner, "acme");
        assert_eq!(run.pull_request.number, 17);
        assert_eq!(run.notion_database_id, "db123");
    }

    #[test]
    fn run_inputs_report_every_missing_name() {
        let inputs = RunInputs {
            notion_token: None,
            pr_number: Some("   ".into()),
            ..full_inputs()
        };
        let err = inputs.validate().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("NOTION_TOKEN"));
        assert!(msg.contains("PR_NUMBER"));
        assert!(!msg.contains("GITHUB_TOKEN"));
        assert!(matches!(err, FeatureDocError::Config { .. }));
    }

    #[test]
    fn run_config_debug_redacts_secrets() {
        let run = full_inputs().validate().unwrap();
        let debug = format!("{run:?}");
        assert!(!debug.contains("sk-test"));
        assert!(!debug.contains("ghp_test"));
        assert!(debug.contains("db123"));
    }
}
