//! Terminal executor: the simulated side effects of an approved plan
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::gate::ApprovedPlan;

/// Notifications sent, in order, once a plan is approved
pub const DEFAULT_ACTIONS: [&str; 3] = [
    "Rerouting instructions dispatched to driver.",
    "Notifying customer of potential delay.",
    "Updating logistics database with new ETA.",
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    #[error("EXEC/{action}: {reason}")]
    Notification { action: String, reason: String },
}

/// Receives each notification of an executed plan.
pub trait Notifier {
    fn notify(&mut self, plan: &str, action: &str) -> Result<(), ExecutionError>;
}

/// Notifier that remembers every (plan, action) pair
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    pub sent: Vec<(String, String)>,
}

impl Notifier for RecordingNotifier {
    fn notify(&mut self, plan: &str, action: &str) -> Result<(), ExecutionError> {
        self.sent.push((plan.to_string(), action.to_string()));
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ExecutionReceipt {
    pub plan: String,
    pub actions: Vec<String>,
    pub executed_at: DateTime<Utc>,
}

pub struct TerminalExecutor {
    actions: Vec<String>,
}

impl Default for TerminalExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_ACTIONS.iter().map(|a| a.to_string()).collect())
    }
}

impl TerminalExecutor {
    pub fn new(actions: Vec<String>) -> Self {
        Self { actions }
    }

    pub fn actions(&self) -> &[String] {
        &self.actions
    }

    /// Sends every notification in order; stops at the first failure.
    pub fn execute(
        &self,
        plan: &ApprovedPlan,
        notifier: &mut dyn Notifier,
    ) -> Result<ExecutionReceipt, ExecutionError> {
        info!(plan = plan.name(), "executing approved plan");
        for action in &self.actions {
            notifier.notify(plan.name(), action)?;
        }

        Ok(ExecutionReceipt {
            plan: plan.name().to_string(),
            actions: self.actions.clone(),
            executed_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::HumanApprovalGate;
    use crate::operator::ScriptedOperator;
    use crate::proposal::ProposalSet;

    fn approved(name: &str) -> ApprovedPlan {
        let json = format!(
            r#"{{"options": [{{"name": "{}", "strategy": "s", "cost_impact": 1, "eta_impact_hours": 1, "risk": "r"}}]}}"#,
            name
        );
        let proposals = ProposalSet::parse(&json).unwrap();
        let selection = HumanApprovalGate::new()
            .approve(&proposals, &mut ScriptedOperator::new(["1"]))
            .unwrap();
        selection.approved().unwrap().clone()
    }

    /// Fails on the second notification
    struct FlakyNotifier {
        calls: usize,
    }

    impl Notifier for FlakyNotifier {
        fn notify(&mut self, _plan: &str, action: &str) -> Result<(), ExecutionError> {
            self.calls += 1;
            if self.calls == 2 {
                return Err(ExecutionError::Notification {
                    action: action.to_string(),
                    reason: "customer gateway down".to_string(),
                });
            }
            Ok(())
        }
    }

    #[test]
    fn test_actions_run_in_order() {
        let mut notifier = RecordingNotifier::default();
        let receipt = TerminalExecutor::default()
            .execute(&approved("Southern Reroute"), &mut notifier)
            .unwrap();

        assert_eq!(receipt.plan, "Southern Reroute");
        let actions: Vec<&str> = notifier.sent.iter().map(|(_, a)| a.as_str()).collect();
        assert_eq!(actions, DEFAULT_ACTIONS.to_vec());
        assert!(notifier.sent.iter().all(|(plan, _)| plan == "Southern Reroute"));
    }

    #[test]
    fn test_failed_notification_stops_execution() {
        let mut notifier = FlakyNotifier { calls: 0 };
        let err = TerminalExecutor::default()
            .execute(&approved("Hold"), &mut notifier)
            .unwrap_err();

        assert_eq!(notifier.calls, 2);
        assert!(err.to_string().contains("customer gateway down"));
    }
}
