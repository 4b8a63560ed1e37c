//! Options shared by every subcommand, folded over the environment
use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use crewline_llm::{ConfigError, LlmConfig};

#[derive(Debug, Clone, Args)]
pub struct Settings {
    /// Model name (overrides CREWLINE_MODEL)
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Base URL of an OpenAI-compatible API (overrides OPENAI_BASE_URL)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Request timeout in seconds (overrides CREWLINE_TIMEOUT_SECS)
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    /// Directory holding crew definition files
    #[arg(long, global = true, env = "CREWLINE_CREWS_DIR", default_value = "crews")]
    pub crews_dir: PathBuf,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Settings {
    /// Generator configuration: environment first, then command line overrides.
    pub fn llm_config(&self) -> Result<LlmConfig, ConfigError> {
        self.apply(LlmConfig::from_env()?)
    }

    pub fn apply(&self, mut config: LlmConfig) -> Result<LlmConfig, ConfigError> {
        if let Some(model) = &self.model {
            config = config.with_model(model.clone());
        }
        if let Some(base_url) = &self.base_url {
            config = config.with_base_url(base_url.clone());
        }
        if let Some(secs) = self.timeout_secs {
            if secs == 0 {
                return Err(ConfigError::InvalidTimeout {
                    var: "--timeout-secs",
                    value: secs.to_string(),
                });
            }
            config = config.with_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }
}
