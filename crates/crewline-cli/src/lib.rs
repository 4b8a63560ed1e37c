//! The `crewline` command line.
//!
//! ```text
//! crewline crews                                   list bundled crews
//! crewline run agp-research --input topic=A2A      run a crew, print the final report
//! crewline run secure-review --query "..."         gate first, exit 3 on a veto
//! crewline encode --record log.json --analyze      record → log sentence → prompt → analysis
//! crewline logistics --situation "..."             proposals, human approval, execution
//! ```
//!
//! Exit codes: 0 completed (an operator rejection included), 1 a step failed
//! or no proposals came back, 2 configuration error, 3 vetoed.

pub mod commands;
pub mod logging;
pub mod outcome;
pub mod settings;

use std::io;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use crewline_approval::ConsoleOperator;
use crewline_crews::CrewDefError;
use crewline_llm::{ConfigError, OpenAiGenerator};
use crewline_sentence::{ComposeError, EncodeError, RecordError};
use tracing::info;

use commands::encode::{EncodeArgs, EncodeInputError};
use commands::logistics::{ConsoleNotifier, LogisticsArgs};
use commands::run::RunArgs;
use outcome::Outcome;
use settings::Settings;

#[derive(Debug, Parser)]
#[command(name = "crewline", version, about = "Sequential LLM crews with veto and human approval gates")]
pub struct Cli {
    #[command(flatten)]
    pub settings: Settings,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a crew from the crews directory
    Run(RunArgs),
    /// List the available crews
    Crews,
    /// Encode a JSON record as a log sentence and compose an analysis prompt
    Encode(EncodeArgs),
    /// Propose plans for a shipping disruption and ask an operator to approve one
    Logistics(LogisticsArgs),
}

/// Builds the generator once, before any step runs.
pub fn generator(settings: &Settings) -> anyhow::Result<OpenAiGenerator> {
    let config = settings.llm_config().context("generator configuration")?;
    info!(model = %config.model, base_url = %config.base_url, "generator configured");
    Ok(OpenAiGenerator::new(config)?)
}

pub async fn dispatch(cli: Cli) -> anyhow::Result<Outcome> {
    let settings = cli.settings;
    let mut stdout = io::stdout();

    match cli.command {
        Command::Crews => commands::crews::list(&settings, &mut stdout),
        Command::Run(args) => {
            let runner = commands::run::prepare(&args, &settings)?;
            let generator = generator(&settings)?;
            commands::run::execute(&runner, &generator, &args, &mut stdout).await
        }
        Command::Encode(args) => {
            let encoded = commands::encode::prepare(&args)?;
            commands::encode::print_encoded(&encoded, &mut stdout)?;
            if !args.analyze {
                return Ok(Outcome::Completed);
            }
            let generator = generator(&settings)?;
            commands::encode::analyze(&encoded, &generator, &mut stdout).await
        }
        Command::Logistics(args) => {
            let generator = generator(&settings)?;
            let mut notifier = ConsoleNotifier::new(io::stdout());
            match &args.choice {
                Some(choice) => {
                    let mut operator = commands::logistics::preset_operator(choice);
                    commands::logistics::approve_and_execute(
                        &args.situation,
                        &generator,
                        &mut operator,
                        &mut notifier,
                    )
                    .await
                }
                None => {
                    let mut operator = ConsoleOperator::stdio();
                    commands::logistics::approve_and_execute(
                        &args.situation,
                        &generator,
                        &mut operator,
                        &mut notifier,
                    )
                    .await
                }
            }
        }
    }
}

/// Exit code for an error that stopped a command before or during its run.
pub fn classify(err: &anyhow::Error) -> Outcome {
    let config = err.downcast_ref::<ConfigError>().is_some()
        || err.downcast_ref::<CrewDefError>().is_some()
        || err.downcast_ref::<RecordError>().is_some()
        || err.downcast_ref::<EncodeError>().is_some()
        || err.downcast_ref::<ComposeError>().is_some()
        || err.downcast_ref::<EncodeInputError>().is_some();
    if config {
        Outcome::ConfigError
    } else {
        Outcome::Failed
    }
}

pub async fn run(cli: Cli) -> ExitCode {
    logging::init_logging(cli.settings.verbose);

    let outcome = match dispatch(cli).await {
        Ok(outcome) => outcome,
        Err(err) => {
            eprintln!("error: {:#}", err);
            classify(&err)
        }
    };
    outcome.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crewline_llm::config::API_KEY_VAR;

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from([
            "crewline",
            "run",
            "agp-research",
            "--input",
            "topic=A2A",
            "--transcript",
            "--model",
            "gpt-4o",
        ])
        .unwrap();
        assert_eq!(cli.settings.model.as_deref(), Some("gpt-4o"));
        match cli.command {
            Command::Run(args) => {
                assert_eq!(args.crew, "agp-research");
                assert_eq!(args.inputs, vec![("topic".to_string(), "A2A".to_string())]);
                assert!(args.transcript);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_json_conflicts_with_transcript() {
        assert!(Cli::try_parse_from(["crewline", "run", "x", "--json", "--transcript"]).is_err());
    }

    #[test]
    fn test_config_errors_map_to_exit_2() {
        let err = anyhow::Error::from(ConfigError::MissingApiKey(API_KEY_VAR))
            .context("generator configuration");
        assert_eq!(classify(&err), Outcome::ConfigError);

        let err = anyhow::Error::from(CrewDefError::UnknownCrew("nope".to_string()));
        assert_eq!(classify(&err), Outcome::ConfigError);

        let err = anyhow::anyhow!("operator input closed");
        assert_eq!(classify(&err), Outcome::Failed);
    }
}
