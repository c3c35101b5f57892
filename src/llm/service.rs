//! rig-core backed completion service.

use super::{CompletionRequest, CompletionService, Provider, anthropic_client, openai_client};
use crate::config::secrets::SecretString;
use crate::error::{Error, Result};
use rig::client::CompletionClient;
use rig::completion::Prompt;

/// Anthropic rejects requests without an explicit output budget.
const ANTHROPIC_MAX_TOKENS: u64 = 4096;

enum Backend {
    OpenAi(rig::providers::openai::Client),
    Anthropic(rig::providers::anthropic::Client),
}

/// Sends each request as a one-shot agent prompt: the system instruction
/// becomes the agent preamble, the prompt the single user turn.
pub struct RigService {
    provider: Provider,
    backend: Backend,
}

impl RigService {
    pub fn new(provider: Provider, api_key: &SecretString) -> Result<Self> {
        let backend = match provider {
            Provider::OpenAi => Backend::OpenAi(openai_client(api_key)?),
            Provider::Anthropic => Backend::Anthropic(anthropic_client(api_key)?),
        };
        Ok(Self { provider, backend })
    }
}

impl CompletionService for RigService {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let response = match &self.backend {
            Backend::OpenAi(client) => {
                client
                    .agent(&request.model)
                    .preamble(&request.system)
                    .build()
                    .prompt(request.prompt.as_str())
                    .await
            }
            Backend::Anthropic(client) => {
                client
                    .agent(&request.model)
                    .preamble(&request.system)
                    .max_tokens(ANTHROPIC_MAX_TOKENS)
                    .build()
                    .prompt(request.prompt.as_str())
                    .await
            }
        };
        response.map_err(|e| Error::Service(e.to_string()))
    }

    fn provider(&self) -> &str {
        self.provider.as_str()
    }
}
