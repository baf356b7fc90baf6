pub mod accumulator;
pub mod prompt;
pub mod service;

pub use accumulator::{Accumulation, UniqueNameAccumulator};
pub use prompt::{DEFAULT_PROMPT_TEMPLATE, PromptBuilder};
pub use service::{AppService, CompletionBackend};
