//! Binary entrypoint for crewline.
use std::process::ExitCode;

use clap::Parser;
use crewline_cli::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    crewline_cli::run(Cli::parse()).await
}
