//! `crewline encode`: structured record to log sentence to prompt
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Args;
use crewline_core::{Agent, AgentStep, PipelineRunner, TextGenerator};
use crewline_sentence::{encode, FieldOrder, PromptComposer, Record};
use thiserror::Error;

use super::{banner, print_report, ReportView};
use crate::outcome::Outcome;

#[derive(Debug, Clone, Args)]
pub struct EncodeArgs {
    /// JSON object, inline or as a path to a file
    #[arg(long)]
    pub record: String,

    /// Comma-separated field order
    #[arg(long, default_value = "status,method,path,latency_ms,user_agent")]
    pub fields: FieldOrder,

    /// What a human observed about this request
    #[arg(long, default_value = "")]
    pub context: String,

    /// Handlebars template using {{human_context}} and {{log_sentence}}
    #[arg(long)]
    pub template: Option<PathBuf>,

    /// Send the prompt to the model and print its analysis
    #[arg(long)]
    pub analyze: bool,
}

/// Encoded sentence and the composed prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    pub sentence: String,
    pub prompt: String,
}

/// A record or template that could not be read or parsed
#[derive(Debug, Error)]
pub enum EncodeInputError {
    #[error("failed to read {path}: {reason}")]
    Read { path: String, reason: String },
    #[error("record is not valid JSON: {0}")]
    Json(String),
}

fn read_input(path: &Path) -> Result<String, EncodeInputError> {
    std::fs::read_to_string(path).map_err(|e| EncodeInputError::Read {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

pub fn load_record(source: &str) -> anyhow::Result<Record> {
    let text = if source.trim_start().starts_with('{') {
        source.to_string()
    } else {
        read_input(Path::new(source))?
    };
    let value: serde_json::Value =
        serde_json::from_str(&text).map_err(|e| EncodeInputError::Json(e.to_string()))?;
    Ok(Record::from_json(&value)?)
}

pub fn prepare(args: &EncodeArgs) -> anyhow::Result<Encoded> {
    let record = load_record(&args.record)?;
    let sentence = encode(&record, &args.fields);

    let composer = match &args.template {
        Some(path) => PromptComposer::with_template(&read_input(path)?)?,
        None => PromptComposer::default(),
    };
    let prompt = composer.compose(&sentence, &args.context)?;
    Ok(Encoded { sentence, prompt })
}

pub fn print_encoded(encoded: &Encoded, out: &mut dyn Write) -> std::io::Result<()> {
    writeln!(out, "--- Log Sentence ---\n{}\n", encoded.sentence)?;
    writeln!(out, "--- Prompt ---\n{}", encoded.prompt)
}

/// One-step pipeline that reads the composed prompt
pub fn analysis_pipeline(prompt: &str) -> PipelineRunner {
    let analyst = Agent::new(
        "Security Log Analyst",
        "Work out the likely intent behind a server request and whether it is a concern",
        "You have triaged years of access logs and know scripted traffic when you see it.",
    );
    PipelineRunner::new(vec![Box::new(AgentStep::new(
        "analysis",
        analyst,
        prompt,
        "The likely user intent and whether we should be concerned, in a short paragraph.",
    ))])
}

pub async fn analyze(
    encoded: &Encoded,
    generator: &dyn TextGenerator,
    out: &mut dyn Write,
) -> anyhow::Result<Outcome> {
    writeln!(out, "{}", banner("Analyzing"))?;
    let report = analysis_pipeline(&encoded.prompt).run(generator).await;
    print_report(&report, "Analysis", ReportView::default(), out)?;
    Ok(Outcome::of_report(&report))
}
