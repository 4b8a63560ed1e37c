//! `crewline crews`
use std::io::Write;

use anyhow::Context;
use crewline_crews::CrewRegistry;

use crate::outcome::Outcome;
use crate::settings::Settings;

pub fn list(settings: &Settings, out: &mut dyn Write) -> anyhow::Result<Outcome> {
    let registry = CrewRegistry::load_dir(&settings.crews_dir)
        .with_context(|| format!("loading crews from {}", settings.crews_dir.display()))?;

    for crew in registry.iter() {
        let gate = if crew.is_gated() { " [gated]" } else { "" };
        writeln!(
            out,
            "{:<24} {} steps{}  {}",
            crew.name,
            crew.steps.len(),
            gate,
            crew.description
        )?;
    }
    Ok(Outcome::Completed)
}
