//! Structured proposal generator
use crewline_core::{Agent, GenerationError, GenerationRequest, TextGenerator};
use thiserror::Error;
use tracing::{info, warn};

use crate::proposal::{ProposalSet, ValidationError};

#[derive(Debug, Error)]
pub enum ProposalError {
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Asks an analyst agent for a fixed-shape JSON list of options.
#[derive(Debug, Clone)]
pub struct ProposalGenerator {
    analyst: Agent,
    option_count: usize,
}

impl Default for ProposalGenerator {
    fn default() -> Self {
        Self::new(
            Agent::new(
                "expert logistics analyst",
                "Analyze shipping disruptions and propose distinct, actionable solutions.",
                "You have rerouted thousands of critical shipments around weather, strikes and closures.",
            ),
            3,
        )
    }
}

impl ProposalGenerator {
    pub fn new(analyst: Agent, option_count: usize) -> Self {
        Self {
            analyst,
            option_count,
        }
    }

    pub fn option_count(&self) -> usize {
        self.option_count
    }

    pub fn request(&self, situation: &str) -> GenerationRequest {
        let instructions = format!(
            "{}\n\nPropose {} distinct, actionable solutions. For each solution provide a name, a strategy, \
             an estimated cost impact, an ETA impact in hours and a brief risk assessment. \
             Your entire response MUST be a single, valid JSON object with a key 'options' containing a list of these solutions.",
            self.analyst.system_prompt(),
            self.option_count
        );

        GenerationRequest::new(situation.trim())
            .with_system(instructions)
            .with_shape_hint(
                r#"{"options": [{"name": string, "strategy": string, "cost_impact": number, "eta_impact_hours": number, "risk": string}]}"#,
            )
            .json()
    }

    /// Single attempt; generation and shape errors are both returned.
    pub async fn propose(
        &self,
        situation: &str,
        generator: &dyn TextGenerator,
    ) -> Result<ProposalSet, ProposalError> {
        info!(analyst = %self.analyst.role, "analyzing situation");
        let answer = generator.generate(&self.request(situation)).await?;
        let proposals = ProposalSet::parse(&answer)?;

        if proposals.len() != self.option_count {
            warn!(
                expected = self.option_count,
                got = proposals.len(),
                "analyst returned a different number of options"
            );
        }
        info!(options = proposals.len(), "proposals generated");
        Ok(proposals)
    }

    /// Like [`propose`](Self::propose) but degrades any failure to an empty set.
    pub async fn propose_or_empty(
        &self,
        situation: &str,
        generator: &dyn TextGenerator,
    ) -> ProposalSet {
        match self.propose(situation, generator).await {
            Ok(proposals) => proposals,
            Err(err) => {
                warn!(error = %err, "proposal generation failed, continuing with no options");
                ProposalSet::empty()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crewline_core::{ResponseShape, ScriptedGenerator};

    const ONE: &str = r#"{"options": [{"name": "Hold", "strategy": "Wait", "cost_impact": 500, "eta_impact_hours": 48, "risk": "Late"}]}"#;

    #[test]
    fn test_request_asks_for_json() {
        let request = ProposalGenerator::default().request("Storm over Kansas");
        assert_eq!(request.shape, ResponseShape::Json);
        assert_eq!(request.prompt, "Storm over Kansas");
        assert!(request.system.unwrap().contains("Propose 3 distinct"));
    }

    #[tokio::test]
    async fn test_propose_parses_answer() {
        let generator = ScriptedGenerator::with_responses([ONE]);
        let proposals = ProposalGenerator::default()
            .propose("storm", &generator)
            .await
            .unwrap();
        assert_eq!(proposals.names(), vec!["Hold"]);
    }

    #[tokio::test]
    async fn test_malformed_answer_is_validation_error() {
        let generator = ScriptedGenerator::with_responses(["I suggest rerouting."]);
        let err = ProposalGenerator::default()
            .propose("storm", &generator)
            .await
            .unwrap_err();
        assert!(matches!(err, ProposalError::Validation(ValidationError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_failures_degrade_to_empty_set() {
        let generator = ScriptedGenerator::new();
        generator.push_error(GenerationError::Auth("bad key".to_string()));
        generator.push_text(r#"{"options": []}"#);

        let proposal_generator = ProposalGenerator::default();
        assert!(proposal_generator.propose_or_empty("storm", &generator).await.is_empty());
        assert!(proposal_generator.propose_or_empty("storm", &generator).await.is_empty());
        assert_eq!(generator.call_count(), 2);
    }
}
