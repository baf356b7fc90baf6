use handlebars::{Handlebars, no_escape};
use serde_json::Value;
use std::sync::Arc;

use crate::core::error::Error as CoreError;
use crate::core::ports::PromptRenderer;

/// Prompt renderer backed by Handlebars. Output is plain text, so HTML
/// escaping is disabled.
#[derive(Clone)]
pub struct HandlebarsRenderer {
    engine: Arc<Handlebars<'static>>,
}

impl Default for HandlebarsRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl HandlebarsRenderer {
    pub fn new() -> Self {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        handlebars.register_escape_fn(no_escape);
        Self {
            engine: Arc::new(handlebars),
        }
    }
}

impl PromptRenderer for HandlebarsRenderer {
    fn render(&self, template: &str, data: &Value) -> crate::core::Result<String> {
        self.engine
            .render_template(template, data)
            .map_err(|e| CoreError::System(format!("Prompt template error: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strict_mode_reports_unknown_variables() {
        let renderer = HandlebarsRenderer::new();
        let err = renderer
            .render("Animal: {{creature}}", &json!({ "animal": "Cat" }))
            .unwrap_err();
        assert!(err.to_string().contains("Prompt template error"));
    }
}
