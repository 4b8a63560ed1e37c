//! Prompt composer: merges a log sentence with human context.
//!
//! Plain template merge. Inputs are neither validated nor escaped.

use handlebars::Handlebars;
use once_cell::sync::Lazy;
use serde_json::json;
use thiserror::Error;

pub const DEFAULT_TEMPLATE: &str = r#"Analyze the following server request.

**Human Context:** "{{human_context}}"

**Log Sentence:** "{{log_sentence}}"

Based on both the human context and the log sentence, what is the likely user intent and should we be concerned?"#;

const TEMPLATE_NAME: &str = "prompt";

static DEFAULT_COMPOSER: Lazy<PromptComposer> = Lazy::new(PromptComposer::default);

#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("invalid template: {0}")]
    Template(String),
    #[error("render failed: {0}")]
    Render(String),
}

/// Handlebars-backed composer with `{{human_context}}` and `{{log_sentence}}`.
pub struct PromptComposer {
    handlebars: Handlebars<'static>,
}

impl PromptComposer {
    pub fn with_template(template: &str) -> Result<Self, ComposeError> {
        let mut handlebars = Self::registry();
        handlebars
            .register_template_string(TEMPLATE_NAME, template)
            .map_err(|e| ComposeError::Template(e.to_string()))?;
        Ok(Self { handlebars })
    }

    pub fn compose(&self, log_sentence: &str, human_context: &str) -> Result<String, ComposeError> {
        let data = json!({
            "log_sentence": log_sentence,
            "human_context": human_context,
        });
        self.handlebars
            .render(TEMPLATE_NAME, &data)
            .map_err(|e| ComposeError::Render(e.to_string()))
    }

    fn registry() -> Handlebars<'static> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars
    }
}

impl Default for PromptComposer {
    fn default() -> Self {
        let mut handlebars = Self::registry();
        // The default template is a constant known to parse.
        let _ = handlebars.register_template_string(TEMPLATE_NAME, DEFAULT_TEMPLATE);
        Self { handlebars }
    }
}

/// Composes with [`DEFAULT_TEMPLATE`]
pub fn compose(log_sentence: &str, human_context: &str) -> Result<String, ComposeError> {
    DEFAULT_COMPOSER.compose(log_sentence, human_context)
}
