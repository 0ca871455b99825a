//! Narrative generation through the OpenAI chat-completions API.
//!
//! One stateless completion per run: system message plus the compiled
//! prompt, fixed temperature, first choice returned as Markdown.

use std::time::Duration;

use reqwest::Client;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use url::Url;

use featuredoc_shared::{FeatureDocError, OpenAiConfig, Result};

use crate::prompt::CompiledPrompt;

/// Default timeout in seconds for the completion call.
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// User-Agent string for API requests.
const USER_AGENT: &str = concat!("featuredoc/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Protocol types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Settings for the OpenAI client.
#[derive(Clone)]
pub struct OpenAiOptions {
    pub api_base: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub system_prompt: String,
    pub timeout_secs: u64,
}

impl OpenAiOptions {
    /// Combine file configuration with the run's API key.
    pub fn from_config(config: &OpenAiConfig, api_key: impl Into<String>) -> Self {
        Self {
            api_base: config.api_base.clone(),
            api_key: api_key.into(),
            model: config.model.clone(),
            temperature: config.temperature,
            system_prompt: config.system_prompt.clone(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Chat-completions client producing the document Markdown.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    api_base: String,
    model: String,
    temperature: f32,
    system_prompt: String,
}

impl OpenAiClient {
    pub fn new(opts: &OpenAiOptions) -> Result<Self> {
        Url::parse(&opts.api_base).map_err(|e| {
            FeatureDocError::config(format!("invalid OpenAI API base {}: {e}", opts.api_base))
        })?;

        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", opts.api_key))
            .map_err(|_| FeatureDocError::config("OPENAI_API_KEY contains invalid characters"))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(Duration::from_secs(opts.timeout_secs))
            .build()
            .map_err(|e| FeatureDocError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base: opts.api_base.trim_end_matches('/').to_string(),
            model: opts.model.clone(),
            temperature: opts.temperature,
            system_prompt: opts.system_prompt.clone(),
        })
    }

    /// Send `prompt` and return the trimmed completion text.
    ///
    /// An empty or missing completion is a [`FeatureDocError::Generation`].
    #[instrument(skip_all, fields(model = %self.model, prompt_len = prompt.as_str().len()))]
    pub async fn complete(&self, prompt: &CompiledPrompt) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &self.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: prompt.as_str(),
                },
            ],
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .json(&request)
            .send()
            .await
            .map_err(|e| FeatureDocError::Network(format!("OpenAI chat completion: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FeatureDocError::Generation(format!(
                "OpenAI chat completion -> {status}\n{body}"
            )));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            FeatureDocError::parse(format!("OpenAI chat completion: unexpected response body: {e}"))
        })?;

        if let Some(usage) = &parsed.usage {
            info!(
                tokens_in = usage.prompt_tokens,
                tokens_out = usage.completion_tokens,
                "completion received"
            );
        }

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .map(|content| content.trim().to_string())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(FeatureDocError::Generation("empty LLM response".into()));
        }

        Ok(text)
    }
}
