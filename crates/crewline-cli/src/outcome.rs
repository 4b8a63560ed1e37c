//! How a command ended, and the matching process exit code
use std::process::ExitCode;

use crewline_core::{AbortReason, RunReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Run finished, including an operator rejection
    Completed,
    /// A step failed or no valid proposals came back
    Failed,
    /// Missing credential, bad crew file, bad arguments
    ConfigError,
    /// A gate step vetoed the request
    Vetoed,
}

impl Outcome {
    pub fn code(self) -> u8 {
        match self {
            Outcome::Completed => 0,
            Outcome::Failed => 1,
            Outcome::ConfigError => 2,
            Outcome::Vetoed => 3,
        }
    }

    pub fn of_report(report: &RunReport) -> Self {
        match &report.abort {
            None => Outcome::Completed,
            Some(AbortReason::StepFailed { .. }) => Outcome::Failed,
            Some(AbortReason::Vetoed { .. }) => Outcome::Vetoed,
        }
    }
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        ExitCode::from(outcome.code())
    }
}
