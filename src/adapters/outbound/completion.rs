use std::{cmp::max, sync::Arc, time::Duration};

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use rig::{
    client::CompletionClient as _,
    completion::Prompt,
    providers::{anthropic, gemini, openai, xai},
};
use serde::{Deserialize, Serialize};
use tokio::{sync::Semaphore, task::JoinSet};
use tracing::debug;

use crate::cli::LlmProvider;
use crate::config::UpstreamConfig;
use crate::core::error::{Error as CoreError, Result as CoreResult};
use crate::core::ports::{CompletionClient, CompletionRequest};

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Builds the completion adapter for the configured provider.
///
/// `openai` talks to the legacy completions endpoint, which can return several
/// samples per call. Every other provider goes through `rig` chat agents.
pub fn create_completion_client(
    config: &UpstreamConfig,
    api_key: String,
) -> Result<Arc<dyn CompletionClient>> {
    match config.provider {
        LlmProvider::Openai => Ok(Arc::new(OpenAiCompletionClient::new(api_key, config)?)),
        _ => Ok(Arc::new(RigCompletionClient::new(api_key, config)?)),
    }
}

/// [`CompletionClient`] for OpenAI-style `/v1/completions` endpoints.
#[derive(Clone)]
pub struct OpenAiCompletionClient {
    inner: Arc<OpenAiCompletionInner>,
}

struct OpenAiCompletionInner {
    endpoint: String,
    model: String,
    api_key: String,
    max_tokens: u32,
    timeout: Duration,
    http_client: reqwest::Client,
}

impl OpenAiCompletionClient {
    pub fn new(api_key: impl Into<String>, config: &UpstreamConfig) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(anyhow!("API key may not be empty"));
        }

        let model = config.model_or_default();
        if model.trim().is_empty() {
            return Err(anyhow!("Model identifier may not be empty"));
        }

        let base_url = config
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_OPENAI_BASE_URL);
        Ok(Self {
            inner: Arc::new(OpenAiCompletionInner {
                endpoint: completions_endpoint(base_url),
                model,
                api_key,
                max_tokens: config.max_tokens,
                timeout: config.timeout(),
                http_client: build_http_client()?,
            }),
        })
    }
}

impl std::fmt::Debug for OpenAiCompletionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompletionClient")
            .field("endpoint", &self.inner.endpoint)
            .field("model", &self.inner.model)
            .finish()
    }
}

#[derive(Serialize)]
struct CompletionsBody<'a> {
    model: &'a str,
    prompt: &'a str,
    n: usize,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct CompletionsResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    text: String,
}

#[async_trait]
impl CompletionClient for OpenAiCompletionClient {
    async fn complete(&self, request: &CompletionRequest) -> CoreResult<Vec<String>> {
        if request.samples == 0 {
            return Ok(Vec::new());
        }

        let body = CompletionsBody {
            model: &self.inner.model,
            prompt: &request.prompt,
            n: request.samples,
            temperature: request.temperature,
            max_tokens: self.inner.max_tokens,
        };

        let response = self
            .inner
            .http_client
            .post(&self.inner.endpoint)
            .bearer_auth(&self.inner.api_key)
            .json(&body)
            .timeout(self.inner.timeout)
            .send()
            .await
            .map_err(|err| transport_error(self.provider(), &err))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| transport_error(self.provider(), &err))?;

        if !status.is_success() {
            return Err(CoreError::Upstream {
                provider: self.provider().to_string(),
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: CompletionsResponse = serde_json::from_str(&text).map_err(|err| {
            CoreError::System(format!("Invalid completion payload from openai: {err}"))
        })?;
        debug!(
            model = %self.inner.model,
            requested = request.samples,
            received = parsed.choices.len(),
            "openai completion returned"
        );
        Ok(parsed.choices.into_iter().map(|choice| choice.text).collect())
    }

    fn provider(&self) -> &str {
        "openai"
    }
}

/// [`CompletionClient`] backed by `rig` chat agents. Each sample is a separate
/// prompt; samples run concurrently up to `max_concurrent`.
#[derive(Clone)]
pub struct RigCompletionClient {
    inner: Arc<RigCompletionInner>,
}

struct RigCompletionInner {
    provider: LlmProvider,
    model: String,
    api_key: String,
    max_tokens: u32,
    timeout: Duration,
    http_client: reqwest::Client,
    semaphore: Arc<Semaphore>,
}

impl RigCompletionClient {
    pub fn new(api_key: impl Into<String>, config: &UpstreamConfig) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(anyhow!("API key may not be empty"));
        }

        let model = config.model_or_default();
        if model.trim().is_empty() {
            return Err(anyhow!("Model identifier may not be empty"));
        }

        let limit = max(1, config.max_concurrent);
        Ok(Self {
            inner: Arc::new(RigCompletionInner {
                provider: config.provider,
                model,
                api_key,
                max_tokens: config.max_tokens,
                timeout: config.timeout(),
                http_client: build_http_client()?,
                semaphore: Arc::new(Semaphore::new(limit)),
            }),
        })
    }

    async fn sample(&self, prompt: &str, temperature: f64) -> Result<String> {
        let _permit = self
            .inner
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|err| anyhow!("Semaphore closed while waiting for LLM slot: {err}"))?;

        tokio::time::timeout(self.inner.timeout, self.prompt_once(prompt, temperature))
            .await
            .map_err(|_| {
                anyhow!(
                    "{} prompt timed out after {:?}",
                    self.inner.provider.as_str(),
                    self.inner.timeout
                )
            })?
    }

    async fn prompt_once(&self, prompt: &str, temperature: f64) -> Result<String> {
        let model = self.inner.model.as_str();
        let max_tokens = u64::from(self.inner.max_tokens);
        match self.inner.provider {
            LlmProvider::Openai | LlmProvider::OpenaiChat => {
                let client: openai::Client<reqwest::Client> =
                    openai::Client::<reqwest::Client>::builder()
                        .api_key(&self.inner.api_key)
                        .http_client(self.inner.http_client.clone())
                        .build()
                        .map_err(|err| anyhow!("Failed to create OpenAI client: {err}"))?;

                client
                    .agent(model)
                    .temperature(temperature)
                    .max_tokens(max_tokens)
                    .build()
                    .prompt(prompt)
                    .await
                    .map_err(|err| anyhow!("OpenAI prompt error: {err}"))
            }
            LlmProvider::Anthropic => {
                let client: anthropic::Client<reqwest::Client> =
                    anthropic::Client::<reqwest::Client>::builder()
                        .api_key(&self.inner.api_key)
                        .http_client(self.inner.http_client.clone())
                        .build()
                        .map_err(|err| anyhow!("Failed to create Anthropic client: {err}"))?;

                client
                    .agent(model)
                    .temperature(temperature)
                    .max_tokens(max_tokens)
                    .build()
                    .prompt(prompt)
                    .await
                    .map_err(|err| anyhow!("Anthropic prompt error: {err}"))
            }
            LlmProvider::Gemini => {
                let client: gemini::Client<reqwest::Client> =
                    gemini::Client::<reqwest::Client>::builder()
                        .api_key(&self.inner.api_key)
                        .http_client(self.inner.http_client.clone())
                        .build()
                        .map_err(|err| anyhow!("Failed to create Gemini client: {err}"))?;

                client
                    .agent(model)
                    .temperature(temperature)
                    .max_tokens(max_tokens)
                    .build()
                    .prompt(prompt)
                    .await
                    .map_err(|err| anyhow!("Gemini prompt error: {err}"))
            }
            LlmProvider::Grok => {
                let client: xai::Client<reqwest::Client> =
                    xai::Client::<reqwest::Client>::builder()
                        .api_key(&self.inner.api_key)
                        .http_client(self.inner.http_client.clone())
                        .build()
                        .map_err(|err| anyhow!("Failed to create xAI client: {err}"))?;

                client
                    .agent(model)
                    .temperature(temperature)
                    .max_tokens(max_tokens)
                    .build()
                    .prompt(prompt)
                    .await
                    .map_err(|err| anyhow!("xAI prompt error: {err}"))
            }
        }
    }
}

impl std::fmt::Debug for RigCompletionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RigCompletionClient")
            .field("provider", &self.inner.provider)
            .field("model", &self.inner.model)
            .finish()
    }
}

#[async_trait]
impl CompletionClient for RigCompletionClient {
    async fn complete(&self, request: &CompletionRequest) -> CoreResult<Vec<String>> {
        if request.samples == 0 {
            return Ok(Vec::new());
        }

        let temperature = f64::from(request.temperature);
        let mut join_set = JoinSet::new();
        for index in 0..request.samples {
            let prompt = request.prompt.clone();
            let client = self.clone();
            join_set.spawn(async move { (index, client.sample(&prompt, temperature).await) });
        }

        let mut outputs = Vec::with_capacity(request.samples);
        while let Some(joined) = join_set.join_next().await {
            let (index, result) = joined.map_err(|err| {
                CoreError::System(format!("LLM task panic or cancellation: {err}"))
            })?;
            let text = result.map_err(|err| CoreError::System(err.to_string()))?;
            outputs.push((index, text));
        }
        outputs.sort_by_key(|(index, _)| *index);

        Ok(outputs.into_iter().map(|(_, text)| text).collect())
    }

    fn provider(&self) -> &str {
        self.inner.provider.as_str()
    }
}

fn completions_endpoint(base_url: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if base.ends_with("/v1") {
        format!("{base}/completions")
    } else {
        format!("{base}/v1/completions")
    }
}

fn transport_error(provider: &str, err: &reqwest::Error) -> CoreError {
    if err.is_timeout() {
        CoreError::System(format!("{provider} request timed out: {err}"))
    } else {
        CoreError::System(format!("{provider} request failed: {err}"))
    }
}

fn build_http_client() -> Result<reqwest::Client> {
    // `reqwest::Client::default()` can consult OS-level proxy settings, which
    // has been observed to panic in sandboxed environments on macOS.
    // Opt in with `PETNAMER_ENABLE_SYSTEM_PROXY=1`.
    let mut builder = reqwest::Client::builder();
    if std::env::var_os("PETNAMER_ENABLE_SYSTEM_PROXY").is_none() {
        builder = builder.no_proxy();
    }
    builder
        .build()
        .map_err(|err| anyhow!("Failed to build HTTP client: {err}"))
}
