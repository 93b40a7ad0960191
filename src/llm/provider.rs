use anyhow::Result;
use async_openai::{Client, config::OpenAIConfig};
use async_trait::async_trait;

use super::response::{OutputFormat, request_single_text_response};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
    pub format: OutputFormat,
}

/// Abstraction over whichever LLM backend is configured.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, prompt: &Prompt) -> Result<String>;
}

/// Provider speaking the OpenAI responses API, built once per process.
pub struct OpenAiProvider {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiProvider {
    pub fn new(client: Client<OpenAIConfig>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    async fn complete(&self, prompt: &Prompt) -> Result<String> {
        request_single_text_response(
            &self.client,
            &self.model,
            &prompt.system,
            &prompt.user,
            prompt.format,
        )
        .await
    }
}
