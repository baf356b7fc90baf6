pub mod inbound;

pub use inbound::*;

use std::collections::HashMap;

use async_trait::async_trait;

use crate::core::error::Result;

/// One call's worth of work for a completion provider.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub prompt: String,
    /// Number of independent completions to return.
    pub samples: usize,
    pub temperature: f32,
}

/// Abstraction over a text-completion provider.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Returns up to `request.samples` raw completions for the prompt.
    async fn complete(&self, request: &CompletionRequest) -> Result<Vec<String>>;

    /// Provider label used in logs.
    fn provider(&self) -> &str;
}

/// Abstraction for rendering prompt templates.
pub trait PromptRenderer: Send + Sync {
    /// Render a template with the given data.
    fn render(&self, template: &str, data: &serde_json::Value) -> Result<String>;
}

/// Abstraction for sending telemetry events.
pub trait TelemetrySink: Send + Sync {
    /// Record a generic event.
    fn record_event(&self, event_name: &str, properties: HashMap<String, String>);
}
