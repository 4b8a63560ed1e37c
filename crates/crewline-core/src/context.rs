//! Accumulated Context: the append-only record of a run's step outputs
use serde::{Deserialize, Serialize};

/// One produced step output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextEntry {
    pub step_id: String,
    pub role: String,
    pub output: String,
}

/// Outputs of every step that ran so far, in produced order.
///
/// Only the runner can append; everything else gets a shared view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccumulatedContext {
    entries: Vec<ContextEntry>,
}

impl AccumulatedContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn append(&mut self, entry: ContextEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[ContextEntry] {
        &self.entries
    }

    pub fn outputs(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.output.as_str())
    }

    pub fn last(&self) -> Option<&ContextEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Text form handed to the next step.
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|e| format!("## {} ({})\n{}", e.role, e.step_id, e.output.trim()))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, output: &str) -> ContextEntry {
        ContextEntry {
            step_id: id.to_string(),
            role: format!("role-{}", id),
            output: output.to_string(),
        }
    }

    #[test]
    fn test_empty_context_renders_nothing() {
        let ctx = AccumulatedContext::new();
        assert!(ctx.is_empty());
        assert_eq!(ctx.render(), "");
        assert!(ctx.last().is_none());
    }

    #[test]
    fn test_render_keeps_produced_order() {
        let mut ctx = AccumulatedContext::new();
        ctx.append(entry("a", "first\n"));
        ctx.append(entry("b", "second"));

        let rendered = ctx.render();
        assert_eq!(rendered, "## role-a (a)\nfirst\n\n## role-b (b)\nsecond");
        assert_eq!(ctx.outputs().collect::<Vec<_>>(), vec!["first\n", "second"]);
        assert_eq!(ctx.last().unwrap().step_id, "b");
    }
}
