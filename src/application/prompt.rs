use std::sync::Arc;

use serde_json::json;

use crate::core::{
    domain::{Prompt, Subject},
    error::Result,
    ports::PromptRenderer,
};

/// Few-shot prompt used unless configuration supplies another template.
/// `{{animal}}` receives the capitalized subject.
pub const DEFAULT_PROMPT_TEMPLATE: &str = "Suggest a name for an animal that is a superhero.

Animal: Cat
Name: Captain Sharpclaw
Animal: Dog
Name: Ruff the Protector
Animal: {{animal}}
Name:";

/// Renders prompts for validated subjects.
#[derive(Clone)]
pub struct PromptBuilder {
    renderer: Arc<dyn PromptRenderer>,
    template: String,
}

impl PromptBuilder {
    pub fn new(renderer: Arc<dyn PromptRenderer>, template: Option<String>) -> Self {
        Self {
            renderer,
            template: template.unwrap_or_else(|| DEFAULT_PROMPT_TEMPLATE.to_string()),
        }
    }

    pub fn build(&self, subject: &Subject) -> Result<Prompt> {
        let data = json!({ "animal": subject.capitalized() });
        self.renderer.render(&self.template, &data).map(Prompt::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::templating::HandlebarsRenderer;

    fn builder() -> PromptBuilder {
        PromptBuilder::new(Arc::new(HandlebarsRenderer::new()), None)
    }

    fn subject(raw: &str) -> Subject {
        Subject::parse(Some(raw), true).unwrap()
    }

    #[test]
    fn build_is_deterministic_and_case_insensitive() {
        let builder = builder();
        let first = builder.build(&subject("cat")).unwrap();
        assert_eq!(first, builder.build(&subject("cat")).unwrap());
        assert_eq!(first, builder.build(&subject("CAT")).unwrap());
    }

    #[test]
    fn default_prompt_ends_with_subject_and_open_marker() {
        let prompt = builder().build(&subject("hORSE")).unwrap();
        assert!(prompt.as_str().starts_with("Suggest a name"));
        assert!(prompt.as_str().ends_with("Animal: Horse\nName:"));
    }

    #[test]
    fn custom_template_is_not_html_escaped() {
        let builder = PromptBuilder::new(
            Arc::new(HandlebarsRenderer::new()),
            Some("Hero for <{{animal}}> & friends".into()),
        );
        let subject = Subject::parse(Some("o'possum"), false).unwrap();
        let prompt = builder.build(&subject).unwrap();
        assert_eq!(prompt.as_str(), "Hero for <O'possum> & friends");
    }
}
