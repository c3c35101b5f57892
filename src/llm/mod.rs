//! Completion service boundary.
//!
//! [`CompletionService`] is the seam the dispatcher calls through. The
//! production implementation, [`RigService`], talks to a hosted model via
//! rig-core; tests substitute in-process fakes.
//!
//! # Example
//! ```no_run
//! use codegen_eval::llm::{CompletionRequest, CompletionService, Provider, RigService};
//! use secrecy::SecretString;
//!
//! # async fn demo() -> codegen_eval::error::Result<()> {
//! let key = SecretString::from("sk-...");
//! let service = RigService::new(Provider::OpenAi, &key)?;
//! let text = service
//!     .complete(&CompletionRequest::new("gpt-4", "def add(a, b):"))
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod extract;
pub mod service;

pub use extract::extract_code;
pub use service::RigService;

use crate::config::secrets::{ExposeSecret, SecretString};
use crate::error::{Error, Result};
use std::future::Future;

/// Instruction sent as the system message with every prompt.
pub const SYSTEM_PROMPT: &str = "You are an intelligent programmer. You must complete the python function given to you by the user. And you must follow the format they present when giving your answer!";

/// Model used when the caller does not name one.
pub const DEFAULT_MODEL: &str = "gpt-4";

/// Hosted model provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    Anthropic,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
        }
    }

    /// Environment variable holding this provider's API key.
    pub fn api_key_var(&self) -> &'static str {
        match self {
            Provider::OpenAi => "OPENAI_API_KEY",
            Provider::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Provider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAi),
            "anthropic" => Ok(Provider::Anthropic),
            other => Err(Error::Config(format!("unknown LLM provider: {other}"))),
        }
    }
}

/// A single chat request: system instruction plus one user message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub model: String,
    pub system: String,
    pub prompt: String,
}

impl CompletionRequest {
    /// Request framed with [`SYSTEM_PROMPT`].
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system: SYSTEM_PROMPT.to_string(),
            prompt: prompt.into(),
        }
    }
}

/// Something that turns a chat request into raw response text.
///
/// One call is one attempt; retrying is the caller's job.
pub trait CompletionService: Send + Sync + 'static {
    fn complete(&self, request: &CompletionRequest)
    -> impl Future<Output = Result<String>> + Send;

    /// Provider name reported on telemetry spans.
    fn provider(&self) -> &str {
        "unknown"
    }
}

/// Create an OpenAI client from a secret API key.
///
/// # Errors
/// Returns an error if the underlying HTTP client cannot be constructed.
pub fn openai_client(
    api_key: &SecretString,
) -> Result<rig::providers::openai::Client> {
    rig::providers::openai::Client::new(api_key.expose_secret())
        .map_err(|e| Error::Service(format!("failed to build OpenAI client: {e}")))
}

/// Create an Anthropic client from a secret API key.
///
/// # Errors
/// Returns an error if the underlying HTTP client cannot be constructed.
pub fn anthropic_client(
    api_key: &SecretString,
) -> Result<rig::providers::anthropic::Client> {
    rig::providers::anthropic::Client::new(api_key.expose_secret())
        .map_err(|e| Error::Service(format!("failed to build Anthropic client: {e}")))
}
