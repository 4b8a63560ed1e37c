//! Pipeline Runner: runs steps strictly in order and records their provenance
use std::fmt;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::context::ContextEntry;
use crate::data_model::{AbortReason, RunReport, RunState, StepRecord, StepState};
use crate::error::GenerationError;
use crate::generate::TextGenerator;
use crate::step::{Step, StepOutcome};

pub struct PipelineRunner {
    steps: Vec<Box<dyn Step>>,
    pipeline_id: String,
}

impl fmt::Debug for PipelineRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineRunner")
            .field("pipeline_id", &self.pipeline_id)
            .field("steps", &self.steps.len())
            .finish()
    }
}

impl PipelineRunner {
    pub fn new(steps: Vec<Box<dyn Step>>) -> Self {
        let pipeline_id = steps
            .iter()
            .map(|s| s.id())
            .collect::<Vec<_>>()
            .join("→");

        Self { steps, pipeline_id }
    }

    /// Runs every step once, in declaration order.
    ///
    /// The first generator failure, blank answer or halting step ends the
    /// run; the steps after it stay `Pending` and are never called.
    pub async fn run(&self, generator: &dyn TextGenerator) -> RunReport {
        let records = self
            .steps
            .iter()
            .map(|s| StepRecord::pending(s.id(), s.role()))
            .collect();
        let mut report = RunReport::new(&self.pipeline_id, records);
        report.state = RunState::Running;

        info!(
            run_id = %report.run_id,
            pipeline = %self.pipeline_id,
            generator = generator.name(),
            "run started"
        );

        for (index, step) in self.steps.iter().enumerate() {
            let request = step.request(&report.context);
            let record = &mut report.steps[index];
            record.state = StepState::Running;
            record.in_hash = Some(hash_text(&request.prompt));

            info!(step = step.id(), role = step.role(), "step running");
            debug!(step = step.id(), prompt = %request.prompt, "step prompt");

            let start = Instant::now();
            let result = generator
                .generate(&request)
                .await
                .and_then(|text| {
                    if text.trim().is_empty() {
                        Err(GenerationError::Empty)
                    } else {
                        Ok(text)
                    }
                });
            record.latency_ms = start.elapsed().as_millis() as u64;

            let text = match result {
                Ok(text) => text,
                Err(err) => {
                    warn!(step = step.id(), error = %err, "step failed, aborting run");
                    record.state = StepState::Failed;
                    record.error = Some(err.to_string());
                    report.finish(Some(AbortReason::StepFailed {
                        step: step.id().to_string(),
                        cause: err.to_string(),
                    }));
                    return report;
                }
            };

            record.out_hash = Some(hash_text(&text));
            record.state = StepState::Completed;
            info!(step = step.id(), latency_ms = record.latency_ms, "step completed");

            match step.interpret(text) {
                StepOutcome::Continue(output) => {
                    report.context.append(entry(&**step, output));
                }
                StepOutcome::Halt {
                    output,
                    justification,
                } => {
                    warn!(step = step.id(), "run halted by step");
                    report.context.append(entry(&**step, output));
                    report.finish(Some(AbortReason::Vetoed {
                        step: step.id().to_string(),
                        justification,
                    }));
                    return report;
                }
            }
        }

        report.finish(None);
        info!(run_id = %report.run_id, steps = self.steps.len(), "run completed");
        report
    }

    pub fn pipeline_id(&self) -> &str {
        &self.pipeline_id
    }

    pub fn step_ids(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.id()).collect()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

fn entry(step: &dyn Step, output: String) -> ContextEntry {
    ContextEntry {
        step_id: step.id().to_string(),
        role: step.role().to_string(),
        output,
    }
}

fn hash_text(text: &str) -> String {
    format!("blake3:{}", blake3::hash(text.as_bytes()))
}
