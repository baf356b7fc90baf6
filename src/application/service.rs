//! Application service implementation that provides the `NameService` trait.
//! This is the primary use-case port implementation that driving adapters consume.

use std::{collections::HashMap, sync::Arc, time::Instant};

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::{
    application::{accumulator::UniqueNameAccumulator, prompt::PromptBuilder},
    core::{
        config::GenerationSettings,
        domain::Subject,
        error::{Error, Result},
        ports::{
            CompletionClient, GenerateNamesRequest, GeneratedNames, NameService, PromptPreview,
            TelemetrySink,
        },
    },
};

/// Completion capability as resolved once at startup.
#[derive(Clone)]
pub enum CompletionBackend {
    Ready(Arc<dyn CompletionClient>),
    /// No credential was available; every generation request fails fast.
    NotConfigured,
}

impl CompletionBackend {
    pub fn is_ready(&self) -> bool {
        matches!(self, CompletionBackend::Ready(_))
    }
}

/// Application service that implements `NameService`.
pub struct AppService {
    backend: CompletionBackend,
    prompts: PromptBuilder,
    settings: GenerationSettings,
    telemetry: Arc<dyn TelemetrySink>,
}

impl AppService {
    pub fn new(
        backend: CompletionBackend,
        prompts: PromptBuilder,
        settings: GenerationSettings,
        telemetry: Arc<dyn TelemetrySink>,
    ) -> Self {
        Self {
            backend,
            prompts,
            settings,
            telemetry,
        }
    }

    fn target_for(&self, count: Option<usize>) -> Result<usize> {
        match count {
            Some(0) => Err(Error::InvalidInput(
                "Name count must be at least 1".to_string(),
            )),
            Some(count) => Ok(count),
            None => Ok(self.settings.policy.target.max(1)),
        }
    }

    async fn generate(&self, request: &GenerateNamesRequest) -> Result<GeneratedNames> {
        let client = match &self.backend {
            CompletionBackend::Ready(client) => client.clone(),
            CompletionBackend::NotConfigured => return Err(Error::ConfigMissing),
        };

        let subject = Subject::parse(request.animal.as_deref(), self.settings.strict_validation)?;
        let target = self.target_for(request.count)?;
        let prompt = self.prompts.build(&subject)?;

        let accumulator = UniqueNameAccumulator::new(client, self.settings.policy.clone());
        let accumulation = accumulator.accumulate(&prompt, target).await?;

        Ok(GeneratedNames {
            subject: subject.capitalized(),
            names: accumulation.names,
            upstream_calls: accumulation.attempts,
        })
    }

    fn report_failure(&self, request: &GenerateNamesRequest, err: &Error) {
        let animal = request.animal.as_deref().unwrap_or_default();
        match err {
            Error::InvalidInput(message) => {
                info!(animal, %message, "rejected generate request");
            }
            Error::ConfigMissing => {
                warn!("generate request refused: completion API key not configured");
            }
            Error::Upstream {
                provider,
                status,
                body,
            } => {
                error!(provider, status, body, "completion provider returned an error");
            }
            other => {
                error!(animal, error = %other, "error with completion request");
            }
        }

        let mut props = HashMap::new();
        props.insert("kind".to_string(), err.kind().to_string());
        self.telemetry.record_event("names_failed", props);
    }
}

#[async_trait]
impl NameService for AppService {
    async fn generate_names(&self, request: GenerateNamesRequest) -> Result<GeneratedNames> {
        let started = Instant::now();
        match self.generate(&request).await {
            Ok(generated) => {
                info!(
                    subject = %generated.subject,
                    names = generated.names.len(),
                    upstream_calls = generated.upstream_calls,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "generated names"
                );
                let mut props = HashMap::new();
                props.insert("subject".to_string(), generated.subject.clone());
                props.insert("names".to_string(), generated.names.len().to_string());
                props.insert(
                    "upstream_calls".to_string(),
                    generated.upstream_calls.to_string(),
                );
                self.telemetry.record_event("names_generated", props);
                Ok(generated)
            }
            Err(err) => {
                self.report_failure(&request, &err);
                Err(err)
            }
        }
    }

    fn preview_prompt(&self, animal: Option<&str>) -> Result<PromptPreview> {
        let subject = Subject::parse(animal, self.settings.strict_validation)?;
        let prompt = self.prompts.build(&subject)?;
        Ok(PromptPreview {
            subject: subject.capitalized(),
            prompt: prompt.into_string(),
        })
    }

    fn is_configured(&self) -> bool {
        self.backend.is_ready()
    }
}
