//! Unified Error Model
use thiserror::Error;

/// Failure of the external text-generation capability.
///
/// Never retried by the runner: the step that hit it is marked failed and
/// the run aborts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("AUTH/{0}")]
    Auth(String),

    #[error("RATE/{0}")]
    RateLimited(String),

    #[error("HTTP/{0}")]
    Transport(String),

    #[error("TIMEOUT/no response after {0}s")]
    Timeout(u64),

    #[error("API/{status}: {message}")]
    Api { status: u16, message: String },

    #[error("RESPONSE/{0}")]
    InvalidResponse(String),

    #[error("RESPONSE/empty completion")]
    Empty,

    #[error("SCRIPT/{0}")]
    Script(String),
}

/// Terminal outcome of a run that did not produce a result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CrewError {
    #[error("STEP/{step}: {cause}")]
    StepFailed { step: String, cause: String },

    #[error("VETO/{step}: {justification}")]
    Vetoed { step: String, justification: String },

    #[error("PIPELINE/no steps to run")]
    EmptyPipeline,
}

impl CrewError {
    pub fn is_veto(&self) -> bool {
        matches!(self, CrewError::Vetoed { .. })
    }
}
