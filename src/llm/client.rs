use anyhow::{Context, Result, anyhow, bail};
use async_openai::{Client, config::OpenAIConfig};

use super::secrets::{API_KEY_ENV, ApiKeySource, KeyStore, lookup_api_key, prompt_for_api_key};

/// Builds a client from the configured key, asking for one (and storing it)
/// when none is configured.
pub fn ensure_client(store: &KeyStore) -> Result<Client<OpenAIConfig>> {
    if let Some(found) = lookup_api_key(store)? {
        return Ok(initialize_client(&found.key));
    }

    let key = prompt_for_api_key()?;
    if key.is_empty() {
        bail!(
            "No API key provided. Set {} or run `flashmind llm --set <KEY>`.",
            API_KEY_ENV
        );
    }
    store.store(&key)?;
    Ok(initialize_client(&key))
}

pub async fn test_configured_api_key(store: &KeyStore) -> Result<ApiKeySource> {
    let found = lookup_api_key(store)?.ok_or_else(|| {
        anyhow!(
            "No OpenAI API key configured. Set {} or run `flashmind llm --set <KEY>`.",
            API_KEY_ENV
        )
    })?;
    let client = initialize_client(&found.key);
    client
        .models()
        .list()
        .await
        .context("Failed to validate API key with OpenAI")?;
    Ok(found.source)
}

fn initialize_client(api_key: &str) -> Client<OpenAIConfig> {
    let config = OpenAIConfig::new().with_api_key(api_key);
    Client::with_config(config)
}
