//! crewline LLM: the network-backed [`TextGenerator`](crewline_core::TextGenerator).
//!
//! # Configuration
//!
//! - API key: `OPENAI_API_KEY` (required)
//! - Base URL: `OPENAI_BASE_URL`, defaults to the public OpenAI endpoint;
//!   any chat-completions compatible server works
//! - Model: `CREWLINE_MODEL`, defaults to `gpt-4-turbo`
//! - Timeout: `CREWLINE_TIMEOUT_SECS`, defaults to 60
//!
//! ```rust,ignore
//! use crewline_llm::{LlmConfig, OpenAiGenerator};
//!
//! let generator = OpenAiGenerator::new(LlmConfig::from_env()?)?;
//! let report = runner.run(&generator).await;
//! ```

pub mod config;
pub mod openai;

pub use config::{ConfigError, LlmConfig};
pub use openai::OpenAiGenerator;
