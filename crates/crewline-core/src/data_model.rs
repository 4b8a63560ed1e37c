//! Data Model: step records, run states and the run report
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::context::AccumulatedContext;
use crate::error::CrewError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepState {
    Pending,
    Running,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunState {
    Idle,
    Running,
    Completed,
    Aborted,
}

/// Why a run ended in [`RunState::Aborted`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AbortReason {
    /// The generator failed or returned nothing
    StepFailed { step: String, cause: String },
    /// A gate step refused to let the run continue
    Vetoed { step: String, justification: String },
}

impl From<AbortReason> for CrewError {
    fn from(reason: AbortReason) -> Self {
        match reason {
            AbortReason::StepFailed { step, cause } => CrewError::StepFailed { step, cause },
            AbortReason::Vetoed { step, justification } => {
                CrewError::Vetoed { step, justification }
            }
        }
    }
}

/// Provenance of one step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    pub id: String,
    pub role: String,
    pub state: StepState,
    /// blake3 of the prompt sent
    pub in_hash: Option<String>,
    /// blake3 of the text received
    pub out_hash: Option<String>,
    pub latency_ms: u64,
    pub error: Option<String>,
}

impl StepRecord {
    pub(crate) fn pending(id: &str, role: &str) -> Self {
        Self {
            id: id.to_string(),
            role: role.to_string(),
            state: StepState::Pending,
            in_hash: None,
            out_hash: None,
            latency_ms: 0,
            error: None,
        }
    }
}

/// Everything a run produced, whatever state it ended in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: String,
    pub pipeline_id: String,
    pub engine: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub state: RunState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abort: Option<AbortReason>,
    pub steps: Vec<StepRecord>,
    pub context: AccumulatedContext,
}

impl RunReport {
    pub(crate) fn new(pipeline_id: &str, steps: Vec<StepRecord>) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            pipeline_id: pipeline_id.to_string(),
            engine: format!("crewline/{}", crate::CREWLINE_VERSION),
            started_at: Utc::now(),
            finished_at: None,
            state: RunState::Idle,
            abort: None,
            steps,
            context: AccumulatedContext::new(),
        }
    }

    pub(crate) fn finish(&mut self, abort: Option<AbortReason>) {
        self.state = if abort.is_some() {
            RunState::Aborted
        } else {
            RunState::Completed
        };
        self.abort = abort;
        self.finished_at = Some(Utc::now());
    }

    pub fn is_completed(&self) -> bool {
        self.state == RunState::Completed
    }

    pub fn is_vetoed(&self) -> bool {
        matches!(self.abort, Some(AbortReason::Vetoed { .. }))
    }

    /// Result of a completed run: the output of its last step.
    pub fn final_output(&self) -> Option<&str> {
        if !self.is_completed() {
            return None;
        }
        self.context.last().map(|e| e.output.as_str())
    }

    pub fn step(&self, id: &str) -> Option<&StepRecord> {
        self.steps.iter().find(|s| s.id == id)
    }

    /// Number of steps the generator was actually called for
    pub fn invoked_steps(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.state != StepState::Pending)
            .count()
    }

    pub fn into_result(self) -> Result<String, CrewError> {
        if let Some(reason) = self.abort {
            return Err(reason.into());
        }
        self.context
            .last()
            .map(|e| e.output.clone())
            .ok_or(CrewError::EmptyPipeline)
    }
}
