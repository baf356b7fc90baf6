//! CLI inbound adapter that translates command-line arguments into application service calls.

use std::sync::Arc;

use anyhow::{Result, anyhow};
use serde_json::json;

use crate::{
    cli::GenerateArgs,
    core::{
        error::Error as CoreError,
        ports::{GenerateNamesRequest, NameService},
    },
};

/// CLI adapter that consumes the `NameService` to execute one-shot commands.
pub struct CliAdapter {
    service: Arc<dyn NameService>,
    env_var: &'static str,
}

impl CliAdapter {
    /// `env_var` names the credential variable mentioned in error hints.
    pub fn new(service: Arc<dyn NameService>, env_var: &'static str) -> Self {
        Self { service, env_var }
    }

    pub async fn generate_command(&self, args: GenerateArgs) -> Result<()> {
        if args.dry_run {
            let preview = self
                .service
                .preview_prompt(Some(&args.animal))
                .map_err(|err| self.describe(err))?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&preview)?);
            } else {
                println!("[dry-run] prompt for '{}':", preview.subject);
                println!(
                    "--- Prompt Start ---\n{}\n--- Prompt End ---",
                    preview.prompt
                );
            }
            return Ok(());
        }

        let request = GenerateNamesRequest {
            animal: Some(args.animal.clone()),
            count: args.count.map(usize::from),
        };
        let generated = self
            .service
            .generate_names(request)
            .await
            .map_err(|err| self.describe(err))?;

        if args.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({ "result": generated.names }))?
            );
        } else {
            println!("Superhero names for {}:", generated.subject);
            for name in &generated.names {
                println!("- {name}");
            }
        }
        Ok(())
    }

    fn describe(&self, err: CoreError) -> anyhow::Error {
        match err {
            CoreError::ConfigMissing => anyhow!(
                "API key not configured: pass --api-key or set {}",
                self.env_var
            ),
            CoreError::InvalidInput(message) => anyhow!(message),
            other => anyhow!(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::UpstreamArgs;
    use crate::core::ports::{GeneratedNames, PromptPreview};
    use async_trait::async_trait;

    struct UnconfiguredService;

    #[async_trait]
    impl NameService for UnconfiguredService {
        async fn generate_names(
            &self,
            _request: GenerateNamesRequest,
        ) -> crate::core::Result<GeneratedNames> {
            Err(CoreError::ConfigMissing)
        }

        fn preview_prompt(&self, animal: Option<&str>) -> crate::core::Result<PromptPreview> {
            Ok(PromptPreview {
                subject: animal.unwrap_or_default().to_string(),
                prompt: "Animal: Cat\nName:".into(),
            })
        }

        fn is_configured(&self) -> bool {
            false
        }
    }

    fn args(dry_run: bool) -> GenerateArgs {
        GenerateArgs {
            upstream: UpstreamArgs::default(),
            animal: "cat".into(),
            count: None,
            dry_run,
            json: false,
        }
    }

    #[tokio::test]
    async fn missing_key_error_names_the_env_var() {
        let adapter = CliAdapter::new(Arc::new(UnconfiguredService), "OPENAI_API_KEY");
        let err = adapter.generate_command(args(false)).await.unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[tokio::test]
    async fn dry_run_does_not_need_a_key() {
        let adapter = CliAdapter::new(Arc::new(UnconfiguredService), "OPENAI_API_KEY");
        adapter.generate_command(args(true)).await.unwrap();
    }
}
