//! crewline policy: gate steps that may stop a run before its main mission.
//!
//! ```text
//! query → VetoGate → Decision ─ APPROVED ─▶ main crew
//!                        └──── VETO ─────▶ run aborted, justification reported
//! ```
//!
//! # Example
//!
//! ```
//! use crewline_policy::Decision;
//!
//! let decision = Decision::from_response("Veto: this asks for dispersal tactics.");
//! assert!(decision.is_veto());
//! assert_eq!(decision.justification(), Some("Veto: this asks for dispersal tactics."));
//! ```

pub mod decision;
pub mod veto;

pub use decision::{Decision, VETO_TOKEN};
pub use veto::{VetoGate, VetoStep, DEFAULT_REVIEW_OUTPUT};
