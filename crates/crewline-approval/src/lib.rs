//! crewline approval: human-in-the-loop checkpoint before a final action.
//!
//! ```text
//! situation → ProposalGenerator → ProposalSet → HumanApprovalGate → Selection
//!                                                                      │
//!                          Approved(plan) → TerminalExecutor ◀─────────┤
//!                          Rejected / NoProposals → abort, no effects ◀┘
//! ```
//!
//! [`TerminalExecutor::execute`] only accepts an [`ApprovedPlan`], which only
//! the gate can produce, so a rejected run cannot reach it.

pub mod executor;
pub mod gate;
pub mod generator;
pub mod operator;
pub mod proposal;

pub use executor::{
    ExecutionError, ExecutionReceipt, Notifier, RecordingNotifier, TerminalExecutor,
    DEFAULT_ACTIONS,
};
pub use gate::{
    parse_choice, ApprovalError, ApprovedPlan, Choice, HumanApprovalGate, OperatorInputError,
    Selection, REJECT_KEYWORD,
};
pub use generator::{ProposalError, ProposalGenerator};
pub use operator::{ConsoleOperator, Operator, ScriptedOperator};
pub use proposal::{ProposalOption, ProposalSet, ValidationError};
