//! Inbound ports (use-case ports) define the application service interface that
//! driving adapters (CLI, HTTP server) consume.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::error::Result;

/// Request to generate superhero names for an animal.
#[derive(Debug, Clone, Default)]
pub struct GenerateNamesRequest {
    /// Raw subject as submitted; validation happens in the service.
    pub animal: Option<String>,
    /// Overrides the configured target count.
    pub count: Option<usize>,
}

impl GenerateNamesRequest {
    pub fn for_animal(animal: impl Into<String>) -> Self {
        Self {
            animal: Some(animal.into()),
            count: None,
        }
    }
}

/// Successful generation outcome.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneratedNames {
    pub subject: String,
    /// Unique names in first-seen order.
    pub names: Vec<String>,
    pub upstream_calls: usize,
}

/// Rendered prompt returned by dry runs.
#[derive(Debug, Clone, Serialize)]
pub struct PromptPreview {
    pub subject: String,
    pub prompt: String,
}

/// The primary application service trait that driving adapters consume.
#[async_trait]
pub trait NameService: Send + Sync {
    /// Validate the subject and collect unique names for it.
    async fn generate_names(&self, request: GenerateNamesRequest) -> Result<GeneratedNames>;

    /// Validate the subject and render the prompt without calling upstream.
    fn preview_prompt(&self, animal: Option<&str>) -> Result<PromptPreview>;

    /// Whether a completion credential was resolved at startup.
    fn is_configured(&self) -> bool;
}
