use anyhow::{Context, Result, anyhow};

use async_openai::{Client, config::OpenAIConfig};

use super::secrets::{API_KEY_ENV, ApiKeySource, KeyStore, endpoint_for};

pub fn missing_key_error() -> anyhow::Error {
    anyhow!(
        "No provider API key configured. Set {} or run `careerquiz llm --set <KEY>`.",
        API_KEY_ENV
    )
}

/// Validates whichever key is configured for `api_base` by listing the
/// provider's models.
pub async fn test_configured_api_key(
    store: &KeyStore,
    api_base: Option<&str>,
) -> Result<ApiKeySource> {
    let key = store
        .resolve(&endpoint_for(api_base), std::env::var(API_KEY_ENV).ok())?
        .ok_or_else(missing_key_error)?;
    let client = initialize_client(&key.value, api_base);
    healthcheck_client(&client).await?;
    Ok(key.source)
}

pub fn initialize_client(api_key: &str, api_base: Option<&str>) -> Client<OpenAIConfig> {
    let mut config = OpenAIConfig::new().with_api_key(api_key);
    if let Some(base) = api_base {
        config = config.with_api_base(base);
    }

    Client::with_config(config)
}

async fn healthcheck_client(client: &Client<OpenAIConfig>) -> Result<()> {
    client
        .models()
        .list()
        .await
        .context("Failed to validate API key with the provider")?;
    Ok(())
}
