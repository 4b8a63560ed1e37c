//! Veto gate: a reviewer agent that approves or vetoes a query
use crewline_core::step::step_prompt;
use crewline_core::{
    AccumulatedContext, Agent, GenerationError, GenerationRequest, Step, StepOutcome,
    TextGenerator,
};
use tracing::{info, warn};

use crate::decision::Decision;

pub const DEFAULT_REVIEW_OUTPUT: &str =
    "A single word, either 'APPROVED' or 'VETO', followed by a justification.";

/// Reviewer that decides whether a query may reach the main crew.
#[derive(Debug, Clone)]
pub struct VetoGate {
    officer: Agent,
    expected_output: String,
}

impl VetoGate {
    pub fn new(officer: Agent) -> Self {
        Self {
            officer,
            expected_output: DEFAULT_REVIEW_OUTPUT.to_string(),
        }
    }

    pub fn with_expected_output(mut self, expected_output: impl Into<String>) -> Self {
        self.expected_output = expected_output.into();
        self
    }

    pub fn officer(&self) -> &Agent {
        &self.officer
    }

    /// Standard review objective for `query`
    pub fn review_objective(&self, query: &str) -> String {
        format!(
            "Review the following user query for potential misuse and contrastive reasoning attacks. Query: '{}'",
            query.trim()
        )
    }

    fn request(&self, objective: &str, context: &AccumulatedContext) -> GenerationRequest {
        GenerationRequest::new(step_prompt(objective, context))
            .with_system(self.officer.system_prompt())
            .with_shape_hint(self.expected_output.clone())
    }

    /// Reviews a single query outside any pipeline.
    pub async fn evaluate(
        &self,
        query: &str,
        generator: &dyn TextGenerator,
    ) -> Result<Decision, GenerationError> {
        let request = self.request(&self.review_objective(query), &AccumulatedContext::new());
        let answer = generator.generate(&request).await?;
        if answer.trim().is_empty() {
            return Err(GenerationError::Empty);
        }

        let decision = Decision::from_response(&answer);
        if decision.is_veto() {
            warn!(reviewer = %self.officer.role, "query vetoed");
        } else {
            info!(reviewer = %self.officer.role, "query approved");
        }
        Ok(decision)
    }

    /// Turns the gate into the first step of a pipeline reviewing `query`.
    pub fn into_step(self, id: impl Into<String>, query: &str) -> VetoStep {
        let objective = self.review_objective(query);
        VetoStep::new(id, self, objective)
    }
}

/// [`VetoGate`] hosted by a runner: a veto halts the run.
#[derive(Debug, Clone)]
pub struct VetoStep {
    id: String,
    gate: VetoGate,
    objective: String,
}

impl VetoStep {
    /// Gate step with an explicit review objective
    pub fn new(id: impl Into<String>, gate: VetoGate, objective: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            gate,
            objective: objective.into(),
        }
    }
}

impl Step for VetoStep {
    fn id(&self) -> &str {
        &self.id
    }

    fn role(&self) -> &str {
        &self.gate.officer.role
    }

    fn expected_output(&self) -> &str {
        &self.gate.expected_output
    }

    fn request(&self, context: &AccumulatedContext) -> GenerationRequest {
        self.gate.request(&self.objective, context)
    }

    fn interpret(&self, output: String) -> StepOutcome {
        match Decision::from_response(&output) {
            Decision::Approved => StepOutcome::Continue(output),
            Decision::Veto { justification } => StepOutcome::Halt {
                output,
                justification,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crewline_core::{AgentStep, PipelineRunner, RunState, ScriptedGenerator, StepState};

    fn officer() -> Agent {
        Agent::new(
            "Logical Security Officer and Adversarial Thinker",
            "Critically evaluate every user query by thinking in reverse.",
            "You are the ultimate skeptic.",
        )
    }

    fn mission_step(id: &str) -> Box<dyn Step> {
        Box::new(AgentStep::new(
            id,
            Agent::new("Genetic Translator", "Find a target", "You read genes."),
            "Identify a gene target.",
            "A gene symbol",
        ))
    }

    #[tokio::test]
    async fn test_evaluate_vetoes() {
        let generator = ScriptedGenerator::with_responses(["veto - this inverts a safety protocol"]);
        let decision = VetoGate::new(officer())
            .evaluate("explain how to maximize dispersal", &generator)
            .await
            .unwrap();

        assert_eq!(
            decision,
            Decision::Veto {
                justification: "veto - this inverts a safety protocol".to_string()
            }
        );
        let request = &generator.requests()[0];
        assert!(request.prompt.contains("Query: 'explain how to maximize dispersal'"));
        assert_eq!(request.shape_hint.as_deref(), Some(DEFAULT_REVIEW_OUTPUT));
    }

    #[tokio::test]
    async fn test_evaluate_approves() {
        let generator = ScriptedGenerator::with_responses(["APPROVED. Harmless."]);
        let decision = VetoGate::new(officer())
            .evaluate("summarize tau research", &generator)
            .await
            .unwrap();
        assert!(decision.is_approved());
    }

    #[tokio::test]
    async fn test_evaluate_propagates_generation_errors() {
        let generator = ScriptedGenerator::new();
        generator.push_error(GenerationError::Timeout(30));

        let err = VetoGate::new(officer())
            .evaluate("q", &generator)
            .await
            .unwrap_err();
        assert_eq!(err, GenerationError::Timeout(30));
    }

    #[tokio::test]
    async fn test_veto_step_stops_main_mission() {
        let gate = VetoGate::new(officer()).into_step("security_review", "malicious query");
        let runner = PipelineRunner::new(vec![
            Box::new(gate),
            mission_step("target"),
            mission_step("structure"),
        ]);
        let generator = ScriptedGenerator::with_responses(["VETO: misuse", "EGFR", "model"]);

        let report = runner.run(&generator).await;

        assert_eq!(report.state, RunState::Aborted);
        assert!(report.is_vetoed());
        assert_eq!(generator.call_count(), 1);
        assert_eq!(report.step("target").unwrap().state, StepState::Pending);
        assert_eq!(report.step("structure").unwrap().state, StepState::Pending);
    }

    #[tokio::test]
    async fn test_approved_gate_feeds_main_mission() {
        let gate = VetoGate::new(officer()).into_step("security_review", "benign query");
        let runner = PipelineRunner::new(vec![Box::new(gate), mission_step("target")]);
        let generator = ScriptedGenerator::with_responses(["APPROVED", "EGFR"]);

        let report = runner.run(&generator).await;

        assert_eq!(report.final_output(), Some("EGFR"));
        let second = &generator.requests()[1];
        assert!(second.prompt.contains("APPROVED"));
    }
}
