//! Typed configuration from environment variables.
//!
//! Loads once at startup, fails fast if required vars are missing.
//! Sensitive values wrapped in secrecy::SecretString to prevent log leaks.

pub mod run;
pub mod secrets;

pub use run::RunSettings;

use crate::error::{Error, Result};
use crate::llm::Provider;
use secrets::SecretString;
use std::path::PathBuf;

#[derive(Debug)]
pub struct Config {
    pub provider: Provider,
    pub api_key: SecretString,
    pub base_dir: PathBuf,
    pub otel_endpoint: Option<String>,
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// In local dev, call `dotenvy::dotenv().ok()` before this.
    /// The API key variable depends on `LLM_PROVIDER` (default `openai`).
    pub fn from_env() -> Result<Self> {
        let provider: Provider = match std::env::var("LLM_PROVIDER") {
            Ok(name) => name.parse()?,
            Err(_) => Provider::OpenAi,
        };

        Ok(Self {
            provider,
            api_key: SecretString::from(required_var(provider.api_key_var())?),
            base_dir: base_dir()?,
            otel_endpoint: std::env::var("OTEL_ENDPOINT").ok(),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn required_var(name: &str) -> Result<String> {
    std::env::var(name)
        .map_err(|_| Error::Config(format!("required environment variable {name} is not set")))
}

/// Input and output paths are resolved against `PWD`, falling back to the
/// process working directory when the shell did not export it.
fn base_dir() -> Result<PathBuf> {
    match std::env::var_os("PWD") {
        Some(pwd) if !pwd.is_empty() => Ok(PathBuf::from(pwd)),
        _ => Ok(std::env::current_dir()?),
    }
}
