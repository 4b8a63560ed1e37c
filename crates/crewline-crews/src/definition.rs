//! Crew file format and conversion into a runnable pipeline
use crewline_core::{Agent, AgentStep, PipelineRunner, Step};
use crewline_policy::{VetoGate, VetoStep, DEFAULT_REVIEW_OUTPUT};
use handlebars::Handlebars;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use thiserror::Error;

/// Input that carries the query reviewed by a crew's gate
pub const QUERY_INPUT: &str = "query";

/// Template variables of a crew
pub type Inputs = BTreeMap<String, String>;

static TEMPLATES: Lazy<Handlebars<'static>> = Lazy::new(|| {
    let mut handlebars = Handlebars::new();
    handlebars.set_strict_mode(true);
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars
});

#[derive(Debug, Error)]
pub enum CrewDefError {
    #[error("failed to read {path}: {reason}")]
    Read { path: String, reason: String },
    #[error("invalid crew file: {0}")]
    Parse(String),
    #[error("crew '{0}' has no steps")]
    NoSteps(String),
    #[error("step id '{0}' is used twice")]
    DuplicateStep(String),
    #[error("step '{step}' refers to unknown agent '{agent}'")]
    UnknownAgent { step: String, agent: String },
    #[error("step '{step}': {reason}")]
    Template { step: String, reason: String },
    #[error("crew '{0}' is defined twice")]
    DuplicateCrew(String),
    #[error("no crew named '{0}'")]
    UnknownCrew(String),
}

/// Persona of a crew member. `role`, `goal` and `backstory` are templates;
/// `knowledge` is used as written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentDef {
    pub role: String,
    pub goal: String,
    pub backstory: String,
    #[serde(default)]
    pub knowledge: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDef {
    pub id: String,
    pub agent: String,
    pub description: String,
    pub expected_output: String,
}

/// Review performed before the main steps; a veto aborts the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateDef {
    #[serde(default = "default_gate_id")]
    pub id: String,
    pub agent: String,
    /// Review objective; usually embeds `{{query}}`
    pub description: String,
    #[serde(default = "default_gate_output")]
    pub expected_output: String,
}

fn default_gate_id() -> String {
    "security_review".to_string()
}

fn default_gate_output() -> String {
    DEFAULT_REVIEW_OUTPUT.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewFile {
    pub version: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub inputs: Inputs,
    pub agents: BTreeMap<String, AgentDef>,
    #[serde(default)]
    pub gate: Option<GateDef>,
    pub steps: Vec<StepDef>,
}

impl CrewFile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CrewDefError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| CrewDefError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_yaml(&content)
    }

    /// Parses and validates a crew definition.
    pub fn from_yaml(yaml: &str) -> Result<Self, CrewDefError> {
        let crew: CrewFile =
            serde_yaml::from_str(yaml).map_err(|e| CrewDefError::Parse(e.to_string()))?;
        crew.validate()?;
        Ok(crew)
    }

    fn validate(&self) -> Result<(), CrewDefError> {
        if self.steps.is_empty() {
            return Err(CrewDefError::NoSteps(self.name.clone()));
        }

        let mut ids = HashSet::new();
        let gate = self.gate.iter().map(|g| (&g.id, &g.agent));
        let steps = self.steps.iter().map(|s| (&s.id, &s.agent));
        for (id, agent) in gate.chain(steps) {
            if !ids.insert(id.as_str()) {
                return Err(CrewDefError::DuplicateStep(id.clone()));
            }
            if !self.agents.contains_key(agent) {
                return Err(CrewDefError::UnknownAgent {
                    step: id.clone(),
                    agent: agent.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn is_gated(&self) -> bool {
        self.gate.is_some()
    }

    /// Crew inputs with `overrides` applied on top
    pub fn merged_inputs(&self, overrides: &Inputs) -> Inputs {
        let mut inputs = self.inputs.clone();
        inputs.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
        inputs
    }

    /// Renders every template and builds the runner: gate first, then steps.
    pub fn build(&self, overrides: &Inputs) -> Result<PipelineRunner, CrewDefError> {
        let inputs = self.merged_inputs(overrides);
        let mut steps: Vec<Box<dyn Step>> = Vec::with_capacity(self.steps.len() + 1);

        if let Some(gate) = &self.gate {
            if !inputs.contains_key(QUERY_INPUT) {
                return Err(CrewDefError::Template {
                    step: gate.id.clone(),
                    reason: format!("gated crews need a '{}' input", QUERY_INPUT),
                });
            }
            let officer = self.agent(&gate.id, &gate.agent, &inputs)?;
            let objective = render(&gate.id, &gate.description, &inputs)?;
            let review = VetoGate::new(officer).with_expected_output(gate.expected_output.clone());
            steps.push(Box::new(VetoStep::new(gate.id.clone(), review, objective)));
        }

        for step in &self.steps {
            let agent = self.agent(&step.id, &step.agent, &inputs)?;
            steps.push(Box::new(AgentStep::new(
                step.id.clone(),
                agent,
                render(&step.id, &step.description, &inputs)?,
                render(&step.id, &step.expected_output, &inputs)?,
            )));
        }

        Ok(PipelineRunner::new(steps))
    }

    fn agent(&self, step: &str, key: &str, inputs: &Inputs) -> Result<Agent, CrewDefError> {
        let def = self.agents.get(key).ok_or_else(|| CrewDefError::UnknownAgent {
            step: step.to_string(),
            agent: key.to_string(),
        })?;

        let mut agent = Agent::new(
            render(step, &def.role, inputs)?,
            render(step, &def.goal, inputs)?,
            render(step, &def.backstory, inputs)?,
        );
        if let Some(knowledge) = &def.knowledge {
            agent = agent.with_knowledge(knowledge.clone());
        }
        Ok(agent)
    }
}

fn render(step: &str, template: &str, inputs: &Inputs) -> Result<String, CrewDefError> {
    TEMPLATES
        .render_template(template, inputs)
        .map_err(|e| CrewDefError::Template {
            step: step.to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crewline_core::ScriptedGenerator;

    const TWO_STEPS: &str = r#"
version: "1.0"
name: agp-research
description: Research then report
inputs:
  topic: Agent Gateway Protocols
agents:
  researcher:
    role: Senior Research Analyst
    goal: Uncover trends in {{topic}}
    backstory: You find the signal in the noise.
  analyst:
    role: Principal Technology Strategist
    goal: Write clear reports
    backstory: You are a storyteller.
    knowledge: AGP connects agents across vendors.
steps:
  - id: research
    agent: researcher
    description: Research the latest advancements in '{{topic}}'.
    expected_output: A bullet-point list of findings.
  - id: report
    agent: analyst
    description: Write a 3-paragraph report on {{topic}}.
    expected_output: A markdown report.
"#;

    #[test]
    fn test_parse_crew() {
        let crew = CrewFile::from_yaml(TWO_STEPS).unwrap();
        assert_eq!(crew.name, "agp-research");
        assert_eq!(crew.steps.len(), 2);
        assert!(!crew.is_gated());
        assert!(crew.agents["analyst"].knowledge.is_some());
    }

    #[tokio::test]
    async fn test_build_renders_inputs() {
        let crew = CrewFile::from_yaml(TWO_STEPS).unwrap();
        let mut overrides = Inputs::new();
        overrides.insert("topic".to_string(), "A2A <protocol>".to_string());

        let runner = crew.build(&overrides).unwrap();
        assert_eq!(runner.pipeline_id(), "research→report");

        let generator = ScriptedGenerator::with_responses(["findings", "report"]);
        let report = runner.run(&generator).await;
        assert_eq!(report.final_output(), Some("report"));

        let requests = generator.requests();
        assert_eq!(
            requests[0].prompt,
            "Research the latest advancements in 'A2A <protocol>'."
        );
        assert!(requests[0].system.as_ref().unwrap().contains("Uncover trends in A2A <protocol>"));
        assert!(requests[1].system.as_ref().unwrap().contains("AGP connects agents"));
        assert!(requests[1].prompt.contains("findings"));
    }

    #[tokio::test]
    async fn test_backstory_renders_inputs() {
        let yaml = TWO_STEPS.replace(
            "backstory: You find the signal in the noise.",
            "backstory: You have followed {{topic}} since day one.",
        );
        let crew = CrewFile::from_yaml(&yaml).unwrap();
        let generator = ScriptedGenerator::with_responses(["findings", "report"]);
        crew.build(&Inputs::new()).unwrap().run(&generator).await;

        let system = generator.requests()[0].system.clone().unwrap();
        assert!(system.contains("You have followed Agent Gateway Protocols since day one."));
        assert!(!system.contains("{{topic}}"));
    }

    #[test]
    fn test_missing_input_fails_build() {
        let yaml = TWO_STEPS.replace("inputs:\n  topic: Agent Gateway Protocols\n", "");
        let crew = CrewFile::from_yaml(&yaml).unwrap();
        assert!(matches!(
            crew.build(&Inputs::new()),
            Err(CrewDefError::Template { .. })
        ));
    }

    #[test]
    fn test_unknown_agent_rejected() {
        let yaml = TWO_STEPS.replace("agent: analyst", "agent: writer");
        assert!(matches!(
            CrewFile::from_yaml(&yaml),
            Err(CrewDefError::UnknownAgent { step, agent }) if step == "report" && agent == "writer"
        ));
    }

    #[test]
    fn test_duplicate_step_rejected() {
        let yaml = TWO_STEPS.replace("id: report", "id: research");
        assert!(matches!(
            CrewFile::from_yaml(&yaml),
            Err(CrewDefError::DuplicateStep(id)) if id == "research"
        ));
    }

    #[test]
    fn test_no_steps_rejected() {
        let yaml = "version: \"1.0\"\nname: empty\nagents: {}\nsteps: []\n";
        assert!(matches!(CrewFile::from_yaml(yaml), Err(CrewDefError::NoSteps(_))));
    }

    #[test]
    fn test_gate_requires_query() {
        let yaml = format!(
            "{}gate:\n  agent: researcher\n  description: \"Review: '{{{{query}}}}'\"\n",
            TWO_STEPS
        );
        let crew = CrewFile::from_yaml(&yaml).unwrap();
        assert!(crew.is_gated());
        assert!(crew.build(&Inputs::new()).is_err());

        let mut overrides = Inputs::new();
        overrides.insert(QUERY_INPUT.to_string(), "is this safe?".to_string());
        let runner = crew.build(&overrides).unwrap();
        assert_eq!(runner.step_ids(), vec!["security_review", "research", "report"]);
    }
}
