//! Runtime configuration for the server and the quiz runner.
//!
//! Values come from a `.env` file in the working directory, then the process
//! environment; CLI flags override both.

use anyhow::{Context, Result};

use crate::llm::{API_KEY_ENV, KeyStore, endpoint_for, missing_key_error};

pub const MODEL_ENV: &str = "CAREERQUIZ_MODEL";
pub const API_BASE_ENV: &str = "CAREERQUIZ_API_BASE";
pub const PORT_ENV: &str = "CAREERQUIZ_PORT";
pub const ORIGIN_ENV: &str = "CAREERQUIZ_ORIGIN";
pub const LANGUAGE_ENV: &str = "CAREERQUIZ_LANGUAGE";
pub const SERVER_ADDRESS_ENV: &str = "CAREERQUIZ_SERVER_ADDRESS";
pub const LOG_ENV: &str = "CAREERQUIZ_LOG";

pub const DEFAULT_MODEL: &str = "gpt-5-nano";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_ORIGIN: &str = "http://localhost:5173";
pub const DEFAULT_LANGUAGE: &str = "Ukrainian";
pub const DEFAULT_SERVER_ADDRESS: &str = "http://localhost:3000";

/// Loads `.env` if one exists. A missing file is not an error.
pub fn load_dotenv() {
    let _ = dotenv::dotenv();
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub api_key: String,
    pub model: String,
    pub api_base: Option<String>,
    pub port: u16,
    pub origin: String,
    pub language: String,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(&KeyStore::open()?, |name| std::env::var(name).ok())
    }

    /// The API key is resolved against the endpoint this config points at.
    fn from_lookup<F>(keys: &KeyStore, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let api_base = var(API_BASE_ENV);
        let api_key = keys
            .resolve(&endpoint_for(api_base.as_deref()), var(API_KEY_ENV))?
            .ok_or_else(missing_key_error)?
            .value;

        let port = match var(PORT_ENV) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("{PORT_ENV} must be a port number, got {raw:?}"))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            api_key,
            model: var(MODEL_ENV).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_base,
            port,
            origin: var(ORIGIN_ENV).unwrap_or_else(|| DEFAULT_ORIGIN.to_string()),
            language: var(LANGUAGE_ENV).unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    pub server_address: String,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let server_address = lookup(SERVER_ADDRESS_ENV)
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SERVER_ADDRESS.to_string());
        Self {
            server_address: server_address.trim_end_matches('/').to_string(),
        }
    }
}
