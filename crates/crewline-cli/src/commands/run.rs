//! `crewline run <crew>`
use std::io::Write;

use anyhow::Context;
use clap::Args;
use crewline_core::{PipelineRunner, TextGenerator};
use crewline_crews::{CrewRegistry, Inputs, QUERY_INPUT};
use tracing::info;

use super::{print_report, ReportView};
use crate::outcome::Outcome;
use crate::settings::Settings;

#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Crew name, as listed by `crewline crews`
    pub crew: String,

    /// Template input, repeatable
    #[arg(long = "input", value_name = "KEY=VALUE", value_parser = parse_input)]
    pub inputs: Vec<(String, String)>,

    /// Query reviewed by the crew's gate
    #[arg(long)]
    pub query: Option<String>,

    /// Print every step output, not only the final one
    #[arg(long)]
    pub transcript: bool,

    /// Print the run report as JSON
    #[arg(long, conflicts_with = "transcript")]
    pub json: bool,
}

impl RunArgs {
    pub fn overrides(&self) -> Inputs {
        let mut inputs: Inputs = self.inputs.iter().cloned().collect();
        if let Some(query) = &self.query {
            inputs.insert(QUERY_INPUT.to_string(), query.clone());
        }
        inputs
    }

    fn view(&self) -> ReportView {
        ReportView {
            transcript: self.transcript,
            json: self.json,
        }
    }
}

pub fn parse_input(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{}'", raw));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Loads the crew and renders its templates.
pub fn prepare(args: &RunArgs, settings: &Settings) -> anyhow::Result<PipelineRunner> {
    let registry = CrewRegistry::load_dir(&settings.crews_dir)
        .with_context(|| format!("loading crews from {}", settings.crews_dir.display()))?;
    let crew = registry.get(&args.crew)?;
    let runner = crew
        .build(&args.overrides())
        .with_context(|| format!("building crew '{}'", crew.name))?;
    Ok(runner)
}

pub async fn execute(
    runner: &PipelineRunner,
    generator: &dyn TextGenerator,
    args: &RunArgs,
    out: &mut dyn Write,
) -> anyhow::Result<Outcome> {
    info!(crew = %args.crew, steps = runner.len(), "kicking off crew");
    let report = runner.run(generator).await;
    print_report(&report, "Final Report", args.view(), out)?;
    Ok(Outcome::of_report(&report))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_input() {
        assert_eq!(
            parse_input("topic=A2A = agents").unwrap(),
            ("topic".to_string(), "A2A = agents".to_string())
        );
        assert!(parse_input("topic").is_err());
        assert!(parse_input(" =x").is_err());
    }

    #[test]
    fn test_query_becomes_input() {
        let args = RunArgs {
            crew: "secure-review".to_string(),
            inputs: vec![("topic".to_string(), "AGP".to_string())],
            query: Some("is this safe?".to_string()),
            transcript: false,
            json: false,
        };
        let inputs = args.overrides();
        assert_eq!(inputs["topic"], "AGP");
        assert_eq!(inputs[QUERY_INPUT], "is this safe?");
    }
}
