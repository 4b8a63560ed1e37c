//! crewline crews: pipelines declared in YAML.
//!
//! A crew file names its agents, an optional veto gate and the ordered steps:
//!
//! ```yaml
//! version: "1.0"
//! name: agp-research
//! description: Research a topic and write a report
//! inputs:
//!   topic: Agent Gateway Protocols
//! agents:
//!   researcher:
//!     role: Senior Research Analyst
//!     goal: Uncover groundbreaking technologies in {{topic}}
//!     backstory: You are a master of the internet.
//! steps:
//!   - id: research
//!     agent: researcher
//!     description: Research {{topic}}.
//!     expected_output: A bullet-point list of findings.
//! ```
//!
//! Descriptions and goals are Handlebars templates rendered with the crew's
//! `inputs`, overridable per run.

pub mod definition;
pub mod registry;

pub use definition::{AgentDef, CrewDefError, CrewFile, GateDef, Inputs, StepDef, QUERY_INPUT};
pub use registry::CrewRegistry;
