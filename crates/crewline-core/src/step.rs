//! Step Trait: single contract for every pipeline step
use serde::{Deserialize, Serialize};

use crate::context::AccumulatedContext;
use crate::generate::GenerationRequest;

/// What a step's generated text means for the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Append the output and run the next step
    Continue(String),
    /// Append the output, then abort the run
    Halt { output: String, justification: String },
}

/// Contract of one pipeline step.
///
/// A step never talks to the generator itself: it builds the request from
/// the context it is given and interprets the text that comes back. The
/// runner owns the call, the timing and the context.
pub trait Step: Send + Sync {
    /// Unique id within the pipeline (ex: "research")
    fn id(&self) -> &str;

    /// Who performs the step, for reports
    fn role(&self) -> &str;

    /// Expected-output descriptor
    fn expected_output(&self) -> &str;

    /// Builds the generation request from everything produced so far
    fn request(&self, context: &AccumulatedContext) -> GenerationRequest;

    /// Interprets a non-empty generated text (default: plain output)
    fn interpret(&self, output: String) -> StepOutcome {
        StepOutcome::Continue(output)
    }
}

/// Persona that performs a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub role: String,
    pub goal: String,
    pub backstory: String,
    /// Targeted background material appended to the goal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knowledge: Option<String>,
}

impl Agent {
    pub fn new(
        role: impl Into<String>,
        goal: impl Into<String>,
        backstory: impl Into<String>,
    ) -> Self {
        Self {
            role: role.into(),
            goal: goal.into(),
            backstory: backstory.into(),
            knowledge: None,
        }
    }

    pub fn with_knowledge(mut self, knowledge: impl Into<String>) -> Self {
        self.knowledge = Some(knowledge.into());
        self
    }

    /// System message describing the persona
    pub fn system_prompt(&self) -> String {
        let mut prompt = format!(
            "You are {}.\n{}\n\nYour personal goal is: {}",
            self.role.trim(),
            self.backstory.trim(),
            self.goal.trim()
        );
        if let Some(knowledge) = self.knowledge.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
            prompt.push_str("\n\nBackground knowledge:\n");
            prompt.push_str(knowledge);
        }
        prompt
    }
}

/// Prompt of a step: its objective followed by the whole accumulated context.
pub fn step_prompt(objective: &str, context: &AccumulatedContext) -> String {
    if context.is_empty() {
        return objective.trim().to_string();
    }
    format!(
        "{}\n\nThis is the context you're working with:\n\n{}",
        objective.trim(),
        context.render()
    )
}

/// A text step performed by an [`Agent`].
#[derive(Debug, Clone)]
pub struct AgentStep {
    id: String,
    agent: Agent,
    objective: String,
    expected_output: String,
}

impl AgentStep {
    pub fn new(
        id: impl Into<String>,
        agent: Agent,
        objective: impl Into<String>,
        expected_output: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            agent,
            objective: objective.into(),
            expected_output: expected_output.into(),
        }
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    pub fn objective(&self) -> &str {
        &self.objective
    }
}

impl Step for AgentStep {
    fn id(&self) -> &str {
        &self.id
    }

    fn role(&self) -> &str {
        &self.agent.role
    }

    fn expected_output(&self) -> &str {
        &self.expected_output
    }

    fn request(&self, context: &AccumulatedContext) -> GenerationRequest {
        GenerationRequest::new(step_prompt(&self.objective, context))
            .with_system(self.agent.system_prompt())
            .with_shape_hint(self.expected_output.clone())
    }
}
