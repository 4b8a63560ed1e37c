pub mod crews;
pub mod encode;
pub mod logistics;
pub mod run;

use std::io::{self, Write};

use crewline_core::{AbortReason, RunReport};

const RULE: &str = "##################################";

pub(crate) fn banner(title: &str) -> String {
    format!("\n{RULE}\n## {title}\n{RULE}\n")
}

/// How a finished run is printed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportView {
    /// Every step output with its role, not only the last
    pub transcript: bool,
    /// The whole run report as JSON
    pub json: bool,
}

/// Prints the result of a run, or which step stopped it and why.
pub fn print_report(
    report: &RunReport,
    title: &str,
    view: ReportView,
    out: &mut dyn Write,
) -> io::Result<()> {
    if view.json {
        serde_json::to_writer_pretty(&mut *out, report)?;
        return writeln!(out);
    }

    if view.transcript {
        writeln!(out, "{}", banner("Transcript"))?;
        for entry in report.context.entries() {
            writeln!(out, "--- {} ({}) ---\n{}\n", entry.role, entry.step_id, entry.output)?;
        }
    }

    match &report.abort {
        None => {
            writeln!(out, "{}", banner(title))?;
            writeln!(out, "{}", report.final_output().unwrap_or_default())
        }
        Some(AbortReason::Vetoed {
            step,
            justification,
        }) => {
            writeln!(out, "{}", banner(&format!("REQUEST VETOED BY {}", step)))?;
            writeln!(out, "Justification: {}", justification)
        }
        Some(AbortReason::StepFailed { step, cause }) => {
            writeln!(out, "{}", banner("RUN ABORTED"))?;
            writeln!(out, "Step '{}' failed: {}", step, cause)
        }
    }
}
