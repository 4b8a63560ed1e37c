//! Decision type for gate steps

use serde::{Deserialize, Serialize};
use std::fmt;

/// Keyword that turns a gate answer into a veto.
pub const VETO_TOKEN: &str = "VETO";

/// Outcome of a gate review
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Approved,
    /// Always carries the reviewer's full answer
    Veto { justification: String },
}

impl Decision {
    /// Extracts a decision from a reviewer's answer.
    ///
    /// Any case-insensitive occurrence of `VETO` anywhere in the text is a
    /// veto, including negations such as "no veto needed". This is a plain
    /// substring test, not a classifier, and is a known weak point.
    pub fn from_response(text: &str) -> Self {
        if text.to_uppercase().contains(VETO_TOKEN) {
            Decision::Veto {
                justification: text.to_string(),
            }
        } else {
            Decision::Approved
        }
    }

    pub fn is_approved(&self) -> bool {
        matches!(self, Decision::Approved)
    }

    pub fn is_veto(&self) -> bool {
        matches!(self, Decision::Veto { .. })
    }

    pub fn justification(&self) -> Option<&str> {
        match self {
            Decision::Veto { justification } => Some(justification),
            Decision::Approved => None,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Decision::Approved => write!(f, "APPROVED"),
            Decision::Veto { justification } => write!(f, "VETO: {}", justification),
        }
    }
}
