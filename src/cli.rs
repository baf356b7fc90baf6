use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Deserialize;

/// Petnamer CLI definition.
#[derive(Debug, Parser)]
#[command(name = "petnamer")]
#[command(about = "Superhero name generator for pets", version)]
pub struct Cli {
    #[arg(short, long, global = true, help = "Verbose logs with timestamps")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub log_json: bool,

    #[arg(
        long,
        global = true,
        requires = "log_json",
        help = "Pretty-print JSON logs"
    )]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Serve the name form and the generate API over HTTP.
    Serve(ServeArgs),
    /// Generate names for one animal and print them.
    Generate(GenerateArgs),
}

/// Settings shared by every command that talks to a completion provider.
#[derive(Debug, Args, Clone, Default)]
pub struct UpstreamArgs {
    #[arg(long, help = "Path to an optional YAML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Completion provider API key (can also come from env vars)")]
    pub api_key: Option<String>,

    #[arg(
        long,
        value_enum,
        help = "Completion provider backend (overrides the config file)"
    )]
    pub llm_provider: Option<LlmProvider>,

    #[arg(long, help = "Model identifier (overrides the config file)")]
    pub llm_model: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub upstream: UpstreamArgs,

    #[arg(long, default_value = "127.0.0.1", help = "Address to bind")]
    pub bind: String,

    #[arg(long, default_value_t = 3000, help = "Port to listen on")]
    pub port: u16,
}

#[derive(Debug, Args, Clone)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub upstream: UpstreamArgs,

    #[arg(long, help = "Animal to name")]
    pub animal: String,

    #[arg(
        long,
        value_parser = clap::value_parser!(u16).range(1..=50),
        help = "Number of unique names (defaults to the configured target)"
    )]
    pub count: Option<u16>,

    #[arg(long, help = "Print the rendered prompt without calling the provider")]
    pub dry_run: bool,

    #[arg(long, help = "Print the result as JSON")]
    pub json: bool,
}

/// Supported completion providers.
#[derive(Debug, Clone, Copy, ValueEnum, Deserialize, PartialEq, Eq)]
#[value(rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum LlmProvider {
    /// OpenAI legacy completions endpoint (multiple samples per call).
    Openai,
    /// OpenAI chat models through rig.
    OpenaiChat,
    Anthropic,
    Gemini,
    Grok,
}

impl LlmProvider {
    pub fn env_var(self) -> &'static str {
        match self {
            LlmProvider::Openai | LlmProvider::OpenaiChat => "OPENAI_API_KEY",
            LlmProvider::Anthropic => "ANTHROPIC_API_KEY",
            LlmProvider::Gemini => "GEMINI_API_KEY",
            LlmProvider::Grok => "XAI_API_KEY",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LlmProvider::Openai => "openai",
            LlmProvider::OpenaiChat => "openai-chat",
            LlmProvider::Anthropic => "anthropic",
            LlmProvider::Gemini => "gemini",
            LlmProvider::Grok => "grok",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            LlmProvider::Openai => "gpt-3.5-turbo-instruct",
            LlmProvider::OpenaiChat => "gpt-4o-mini",
            LlmProvider::Anthropic => "claude-3-5-haiku-latest",
            LlmProvider::Gemini => "gemini-2.0-flash",
            LlmProvider::Grok => "grok-3-mini",
        }
    }
}
