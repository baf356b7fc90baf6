use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use anyhow::{Context, Result, anyhow, ensure};
use serde::Deserialize;
use serde_json::json;

use crate::{
    adapters::templating::HandlebarsRenderer,
    application::prompt::DEFAULT_PROMPT_TEMPLATE,
    cli::LlmProvider,
    core::{
        config::{AccumulationPolicy, GenerationSettings},
        ports::PromptRenderer,
    },
};

/// Top-level configuration file. Every section and field is optional.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default, deny_unknown_fields)]
pub struct PetnamerConfig {
    pub generation: GenerationConfig,
    pub upstream: UpstreamConfig,
    pub prompt: PromptConfig,
}

impl PetnamerConfig {
    /// Loads `path` if given, otherwise returns validated defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_path(path),
            None => {
                let config = Self::default();
                config.validate()?;
                Ok(config)
            }
        }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let raw = fs::read_to_string(path_ref)
            .with_context(|| format!("Failed to read config file at {}", path_ref.display()))?;
        let mut config: Self = serde_yaml::from_str(&raw)
            .with_context(|| format!("Invalid configuration in {}", path_ref.display()))?;
        let base_dir = path_ref.parent().unwrap_or_else(|| Path::new("."));
        config
            .prompt
            .hydrate_template(base_dir)
            .with_context(|| format!("Failed to hydrate template for {}", path_ref.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml).context("Unable to parse config YAML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.generation
            .validate()
            .context("Section 'generation' failed validation")?;
        self.upstream
            .validate()
            .context("Section 'upstream' failed validation")?;
        self.prompt
            .validate()
            .context("Section 'prompt' failed validation")?;
        Ok(())
    }

    /// CLI flags take precedence over the file.
    pub fn apply_overrides(&mut self, provider: Option<LlmProvider>, model: Option<String>) {
        if let Some(provider) = provider
            && provider != self.upstream.provider
        {
            self.upstream.provider = provider;
            // A model picked for another provider would not resolve.
            self.upstream.model = None;
        }
        if let Some(model) = model {
            self.upstream.model = Some(model);
        }
    }

    pub fn generation_settings(&self) -> GenerationSettings {
        GenerationSettings {
            policy: AccumulationPolicy {
                target: self.generation.target_count,
                batch_limit: self.generation.batch_limit,
                max_attempts: self.generation.max_attempts,
                temperature: self.generation.temperature,
            },
            strict_validation: self.generation.strict_validation,
        }
    }
}

impl FromStr for PetnamerConfig {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_yaml_str(s)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationConfig {
    pub target_count: usize,
    pub batch_limit: usize,
    pub max_attempts: usize,
    pub temperature: f32,
    pub strict_validation: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        let policy = AccumulationPolicy::default();
        Self {
            target_count: policy.target,
            batch_limit: policy.batch_limit,
            max_attempts: policy.max_attempts,
            temperature: policy.temperature,
            strict_validation: true,
        }
    }
}

impl GenerationConfig {
    fn validate(&self) -> Result<()> {
        ensure!(self.target_count >= 1, "target_count must be at least 1");
        ensure!(self.batch_limit >= 1, "batch_limit must be at least 1");
        ensure!(self.max_attempts >= 1, "max_attempts must be at least 1");
        ensure!(
            (0.0..=2.0).contains(&self.temperature),
            "temperature must be between 0.0 and 2.0 (got {})",
            self.temperature
        );
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct UpstreamConfig {
    pub provider: LlmProvider,
    /// Falls back to the provider's default model.
    pub model: Option<String>,
    /// Only used by the `openai` completions adapter.
    pub base_url: Option<String>,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    pub max_concurrent: usize,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::Openai,
            model: None,
            base_url: None,
            max_tokens: 32,
            timeout_secs: 30,
            max_concurrent: 4,
        }
    }
}

impl UpstreamConfig {
    pub fn model_or_default(&self) -> String {
        self.model
            .clone()
            .unwrap_or_else(|| self.provider.default_model().to_string())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn validate(&self) -> Result<()> {
        ensure!(self.timeout_secs >= 1, "timeout_secs must be at least 1");
        ensure!(self.max_tokens >= 1, "max_tokens must be at least 1");
        if let Some(base_url) = &self.base_url {
            ensure!(
                base_url.starts_with("http://") || base_url.starts_with("https://"),
                "base_url must be an http(s) URL (got '{base_url}')"
            );
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default, deny_unknown_fields)]
pub struct PromptConfig {
    /// Inline Handlebars template; `{{animal}}` receives the capitalized subject.
    pub template: Option<String>,
    /// Template file, relative to the config file.
    pub template_path: Option<PathBuf>,
}

impl PromptConfig {
    fn hydrate_template(&mut self, base_dir: &Path) -> Result<()> {
        let Some(relative) = self.template_path.take() else {
            return Ok(());
        };
        if self.template.is_some() {
            return Err(anyhow!(
                "prompt.template and prompt.template_path are mutually exclusive"
            ));
        }
        let path = if relative.is_absolute() {
            relative
        } else {
            base_dir.join(relative)
        };
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read prompt template at {}", path.display()))?;
        self.template = Some(contents);
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            self.template_path.is_none(),
            "prompt.template_path is only supported when loading from a file"
        );
        let template = self.template.as_deref().unwrap_or(DEFAULT_PROMPT_TEMPLATE);
        ensure!(
            template.contains("{{animal}}"),
            "prompt template must reference {{{{animal}}}}"
        );
        HandlebarsRenderer::new()
            .render(template, &json!({ "animal": "Cat" }))
            .map_err(|err| anyhow!("{err}"))?;
        Ok(())
    }
}
