//! External text-generation capability
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;

/// Shape the caller expects back from the generator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseShape {
    /// Free-form text
    #[default]
    Text,
    /// A single JSON object
    Json,
}

/// One call to the generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Persona / instructions sent as the system message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// The user prompt
    pub prompt: String,
    pub shape: ResponseShape,
    /// Description of the expected output, passed along as a hint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape_hint: Option<String>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            system: None,
            prompt: prompt.into(),
            shape: ResponseShape::Text,
            shape_hint: None,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_shape_hint(mut self, hint: impl Into<String>) -> Self {
        self.shape_hint = Some(hint.into());
        self
    }

    /// Ask for a JSON object instead of free text
    pub fn json(mut self) -> Self {
        self.shape = ResponseShape::Json;
        self
    }
}

/// The sole external collaborator of every text-producing step.
///
/// Implementations must not retry, cache or rate-limit on their own; the
/// pipeline treats each call as a single attempt.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Provider name for logs
    fn name(&self) -> &str;

    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}
