//! Human approval gate: blocks until an operator picks an option or rejects
use serde::Serialize;
use std::io;
use thiserror::Error;
use tracing::{info, warn};

use crate::operator::Operator;
use crate::proposal::{ProposalOption, ProposalSet};

/// Default keyword that rejects every option
pub const REJECT_KEYWORD: &str = "reject";

const RULE: &str = "==================================================";

/// Name of the option an operator approved.
///
/// Only [`HumanApprovalGate::approve`] creates one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApprovedPlan {
    name: String,
}

impl ApprovedPlan {
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Outcome of an approval checkpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Selection {
    Approved(ApprovedPlan),
    Rejected,
    /// Nothing to choose from; the operator was never asked
    NoProposals,
}

impl Selection {
    pub fn approved(&self) -> Option<&ApprovedPlan> {
        match self {
            Selection::Approved(plan) => Some(plan),
            _ => None,
        }
    }
}

/// A line that is neither an option number nor the rejection keyword.
/// Always recovered by asking again.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OperatorInputError {
    #[error("'{0}' is not a number")]
    NotANumber(String),
    #[error("{choice} is not between 1 and {max}")]
    OutOfRange { choice: usize, max: usize },
}

#[derive(Debug, Error)]
pub enum ApprovalError {
    #[error("operator input closed before a decision was made")]
    InputClosed,
    #[error("operator I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// A parsed operator answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    /// Zero-based option index
    Option(usize),
    Reject,
}

/// Parses a 1-based option number or `reject_keyword` (case-insensitive).
pub fn parse_choice(
    input: &str,
    option_count: usize,
    reject_keyword: &str,
) -> Result<Choice, OperatorInputError> {
    let input = input.trim();
    if input.eq_ignore_ascii_case(reject_keyword) {
        return Ok(Choice::Reject);
    }

    let choice: usize = input
        .parse()
        .map_err(|_| OperatorInputError::NotANumber(input.to_string()))?;
    if choice == 0 || choice > option_count {
        return Err(OperatorInputError::OutOfRange {
            choice,
            max: option_count,
        });
    }
    Ok(Choice::Option(choice - 1))
}

pub struct HumanApprovalGate {
    reject_keyword: String,
}

impl Default for HumanApprovalGate {
    fn default() -> Self {
        Self::new()
    }
}

impl HumanApprovalGate {
    pub fn new() -> Self {
        Self {
            reject_keyword: REJECT_KEYWORD.to_string(),
        }
    }

    /// Replaces the rejection keyword; a blank keyword keeps the current one.
    pub fn with_reject_keyword(mut self, keyword: impl Into<String>) -> Self {
        let keyword = keyword.into();
        if !keyword.trim().is_empty() {
            self.reject_keyword = keyword.trim().to_string();
        }
        self
    }

    /// Presents `proposals` and blocks until the operator decides.
    ///
    /// Invalid answers are reported and asked again, without limit. An empty
    /// set returns [`Selection::NoProposals`] without asking.
    pub fn approve(
        &self,
        proposals: &ProposalSet,
        operator: &mut dyn Operator,
    ) -> Result<Selection, ApprovalError> {
        operator.show(&format!(
            "\n{RULE}\nHUMAN-IN-THE-LOOP VALIDATION REQUIRED\n{RULE}"
        ))?;

        if proposals.is_empty() {
            warn!("no valid proposals to approve");
            operator.show("  -> AI failed to generate valid proposals.")?;
            return Ok(Selection::NoProposals);
        }

        operator.show(&render_proposals(proposals))?;

        let prompt = format!(
            "Please approve an option by number (1-{}) or type '{}' to abort: ",
            proposals.len(),
            self.reject_keyword
        );

        loop {
            let line = operator.ask(&prompt)?.ok_or(ApprovalError::InputClosed)?;

            match parse_choice(&line, proposals.len(), &self.reject_keyword) {
                Ok(Choice::Reject) => {
                    info!("operator rejected all proposals");
                    return Ok(Selection::Rejected);
                }
                Ok(Choice::Option(index)) => {
                    // parse_choice bounds the index by the set's length
                    let Some(option) = proposals.get(index) else {
                        continue;
                    };
                    info!(option = %option.name, "operator approved option");
                    return Ok(Selection::Approved(ApprovedPlan {
                        name: option.name.clone(),
                    }));
                }
                Err(err) => {
                    warn!(input = %line, error = %err, "invalid operator input");
                    operator.show(&format!("Invalid input: {}. Please try again.", err))?;
                }
            }
        }
    }
}

/// Text listing of every option, numbered from 1.
pub fn render_proposals(proposals: &ProposalSet) -> String {
    let mut out =
        String::from("\nThe AI has analyzed the situation and recommends the following options:\n");
    for (index, option) in proposals.options().iter().enumerate() {
        out.push_str(&render_option(index + 1, option));
    }
    out.push('\n');
    out.push_str(&"-".repeat(RULE.len()));
    out
}

fn render_option(number: usize, option: &ProposalOption) -> String {
    format!(
        "\n--- OPTION {}: {} ---\n  - Strategy: {}\n  - Estimated Cost Impact: ${}\n  - Estimated ETA Impact: {} hours\n  - Risk Assessment: {}\n",
        number,
        option.name,
        option.strategy,
        group_thousands(option.cost_impact),
        option.eta_impact_hours,
        option.risk
    )
}

/// `15000` → `15,000`, `-1234.5` → `-1,234.5`
fn group_thousands(value: f64) -> String {
    let text = if value.fract() == 0.0 {
        format!("{:.0}", value.abs())
    } else {
        format!("{}", value.abs())
    };
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };

    let mut grouped = String::new();
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }
    if value < 0.0 {
        grouped.insert(0, '-');
    }
    grouped
}
