pub mod client;
pub mod prompts;
pub mod provider;
pub mod response;
pub mod secrets;

pub use client::{initialize_client, missing_key_error, test_configured_api_key};
pub use provider::{CompletionProvider, OpenAiProvider, Prompt};
pub use response::OutputFormat;
pub use secrets::{API_KEY_ENV, ApiKey, ApiKeySource, KeyStore, endpoint_for, prompt_for_api_key};
