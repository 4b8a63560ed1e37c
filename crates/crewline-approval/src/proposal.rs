//! Proposal sets returned by a constrained-output generation call
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("SCHEMA/malformed proposals: {0}")]
    Malformed(String),
    #[error("SCHEMA/no options")]
    Empty,
    #[error("SCHEMA/option {index} has a blank name")]
    BlankName { index: usize },
    #[error("SCHEMA/duplicate option name '{0}'")]
    DuplicateName(String),
    #[error("SCHEMA/option {index}: {field} is not a finite number")]
    NonFinite { index: usize, field: &'static str },
}

/// One candidate course of action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposalOption {
    pub name: String,
    pub strategy: String,
    /// Currency units
    pub cost_impact: f64,
    pub eta_impact_hours: f64,
    pub risk: String,
}

#[derive(Debug, Deserialize)]
struct RawProposals {
    options: Vec<ProposalOption>,
}

/// Ordered, validated options. Names are unique and non-blank.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProposalSet {
    options: Vec<ProposalOption>,
}

impl ProposalSet {
    /// The "no options" set handed on when generation or validation failed
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(options: Vec<ProposalOption>) -> Result<Self, ValidationError> {
        if options.is_empty() {
            return Err(ValidationError::Empty);
        }

        let mut seen = HashSet::new();
        for (index, option) in options.iter().enumerate() {
            if option.name.trim().is_empty() {
                return Err(ValidationError::BlankName { index });
            }
            if !seen.insert(option.name.as_str()) {
                return Err(ValidationError::DuplicateName(option.name.clone()));
            }
            if !option.cost_impact.is_finite() {
                return Err(ValidationError::NonFinite { index, field: "cost_impact" });
            }
            if !option.eta_impact_hours.is_finite() {
                return Err(ValidationError::NonFinite { index, field: "eta_impact_hours" });
            }
        }

        Ok(Self { options })
    }

    /// Parses `{"options": [...]}`, tolerating a surrounding Markdown fence.
    pub fn parse(text: &str) -> Result<Self, ValidationError> {
        let raw: RawProposals = serde_json::from_str(strip_code_fence(text))
            .map_err(|e| ValidationError::Malformed(e.to_string()))?;
        Self::new(raw.options)
    }

    pub fn options(&self) -> &[ProposalOption] {
        &self.options
    }

    pub fn get(&self, index: usize) -> Option<&ProposalOption> {
        self.options.get(index)
    }

    pub fn names(&self) -> Vec<&str> {
        self.options.iter().map(|o| o.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}
