//! crewline core: Step trait, Runner and Run Report
//!
//! A pipeline is an ordered list of steps. Each step turns the accumulated
//! context of the run into one generation request; the runner sends it to a
//! [`TextGenerator`], appends the answer and moves on. The first failure (or
//! a step that halts the run, such as a veto gate) aborts everything after it.
//!
//! ```text
//! objective + context ──▶ TextGenerator ──▶ output ──▶ context ──▶ next step
//! ```

pub mod context;
pub mod data_model;
pub mod error;
pub mod generate;
pub mod runner;
pub mod scripted;
pub mod step;

pub use context::{AccumulatedContext, ContextEntry};
pub use data_model::{AbortReason, RunReport, RunState, StepRecord, StepState};
pub use error::{CrewError, GenerationError};
pub use generate::{GenerationRequest, ResponseShape, TextGenerator};
pub use runner::PipelineRunner;
pub use scripted::ScriptedGenerator;
pub use step::{Agent, AgentStep, Step, StepOutcome};

/// Engine version reported in run reports
pub const CREWLINE_VERSION: &str = env!("CARGO_PKG_VERSION");
