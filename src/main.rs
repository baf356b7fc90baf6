mod tracing_setup;

use std::{net::SocketAddr, process::ExitCode, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use uuid::Uuid;

use petnamer::{
    adapters::{
        completion::create_completion_client,
        inbound::{
            cli::CliAdapter,
            server::{ServeOptions, ServerAdapter},
        },
        telemetry::TracingTelemetrySink,
        templating::HandlebarsRenderer,
    },
    application::{AppService, CompletionBackend, PromptBuilder},
    cli::{Cli, Commands, GenerateArgs, ServeArgs, UpstreamArgs},
    config::PetnamerConfig,
    core::ports::NameService,
    credentials::resolve_api_key,
};

use tracing_setup::JsonLogFormat;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let json_format = if cli.pretty {
        JsonLogFormat::Pretty
    } else {
        JsonLogFormat::Compact
    };
    let run_id = Uuid::new_v4().to_string();
    let _guard = tracing_setup::init(cli.verbose, cli.log_json, json_format, &run_id);

    let outcome = match cli.command {
        Commands::Serve(args) => serve_command(args).await,
        Commands::Generate(args) => generate_command(args).await,
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(run_id, "Command failed: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn serve_command(args: ServeArgs) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", args.bind, args.port)
        .parse()
        .context("Invalid bind/port combination for serve command")?;
    let (service, _) = build_service(&args.upstream)?;
    println!("Serving petnamer on http://{addr}");
    ServerAdapter::new(service, ServeOptions::default())
        .run(addr)
        .await
}

async fn generate_command(args: GenerateArgs) -> Result<()> {
    let (service, config) = build_service(&args.upstream)?;
    CliAdapter::new(service, config.upstream.provider.env_var())
        .generate_command(args)
        .await
}

/// Composition root: resolves configuration and the credential once, then
/// wires the adapters into the application service.
fn build_service(upstream: &UpstreamArgs) -> Result<(Arc<dyn NameService>, PetnamerConfig)> {
    let mut config = PetnamerConfig::load(upstream.config.as_deref())?;
    config.apply_overrides(upstream.llm_provider, upstream.llm_model.clone());

    let provider = config.upstream.provider;
    let backend = match resolve_api_key(upstream.api_key.clone(), provider) {
        Some(api_key) => {
            let client = create_completion_client(&config.upstream, api_key)?;
            info!(
                provider = provider.as_str(),
                model = %config.upstream.model_or_default(),
                "completion provider configured"
            );
            CompletionBackend::Ready(client)
        }
        None => {
            warn!(
                provider = provider.as_str(),
                env_var = provider.env_var(),
                "no API key found; generate requests will fail until one is configured"
            );
            CompletionBackend::NotConfigured
        }
    };

    let prompts = PromptBuilder::new(
        Arc::new(HandlebarsRenderer::new()),
        config.prompt.template.clone(),
    );
    let service: Arc<dyn NameService> = Arc::new(AppService::new(
        backend,
        prompts,
        config.generation_settings(),
        Arc::new(TracingTelemetrySink::new()),
    ));
    Ok((service, config))
}
