//! `crewline logistics`: AI proposals, human approval, execution
use std::io::{self, Cursor, Write};

use clap::Args;
use crewline_approval::{
    ConsoleOperator, ExecutionError, HumanApprovalGate, Notifier, Operator, ProposalGenerator,
    ProposalSet, Selection, TerminalExecutor,
};
use crewline_core::TextGenerator;
use tracing::{info, warn};

use super::banner;
use crate::outcome::Outcome;

#[derive(Debug, Clone, Args)]
pub struct LogisticsArgs {
    /// Description of the disruption
    #[arg(long)]
    pub situation: String,

    /// Answer the approval prompt up front: an option number or 'reject'
    #[arg(long)]
    pub choice: Option<String>,
}

/// Operator fed by `--choice` that still prints to stdout
pub fn preset_operator(choice: &str) -> impl Operator {
    ConsoleOperator::new(
        Cursor::new(format!("{}\n", choice.trim()).into_bytes()),
        io::stdout(),
    )
}

/// Prints each notification as it is sent.
pub struct ConsoleNotifier<W> {
    out: W,
}

impl<W: Write> ConsoleNotifier<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Notifier for ConsoleNotifier<W> {
    fn notify(&mut self, plan: &str, action: &str) -> Result<(), ExecutionError> {
        info!(plan, action, "notification sent");
        writeln!(self.out, "  -> {}", action).map_err(|e| ExecutionError::Notification {
            action: action.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Generates proposals, waits for the operator, executes what was approved.
pub async fn approve_and_execute(
    situation: &str,
    generator: &dyn TextGenerator,
    operator: &mut dyn Operator,
    notifier: &mut dyn Notifier,
) -> anyhow::Result<Outcome> {
    operator.show(&format!("Situation: {}", situation.trim()))?;
    let proposals = match ProposalGenerator::default().propose(situation, generator).await {
        Ok(proposals) => {
            operator.show(&format!(
                "  -> AI has generated {} viable proposals.",
                proposals.len()
            ))?;
            proposals
        }
        Err(err) => {
            warn!(error = %err, "proposal generation failed");
            operator.show(&format!("  -> ERROR: AI analysis failed: {}", err))?;
            ProposalSet::empty()
        }
    };

    match HumanApprovalGate::new().approve(&proposals, operator)? {
        Selection::Approved(plan) => {
            operator.show(&banner("EXECUTION CONFIRMED"))?;
            operator.show(&format!("Executing the human-approved plan: '{}'", plan.name()))?;
            TerminalExecutor::default().execute(&plan, notifier)?;
            operator.show("\nWorkflow complete.")?;
            Ok(Outcome::Completed)
        }
        Selection::Rejected => {
            operator.show(&banner("EXECUTION ABORTED"))?;
            operator.show("Human operator rejected all proposals. No action will be taken.")?;
            Ok(Outcome::Completed)
        }
        Selection::NoProposals => {
            operator.show(&banner("EXECUTION ABORTED"))?;
            operator.show("No valid proposals were generated. No action will be taken.")?;
            Ok(Outcome::Failed)
        }
    }
}
