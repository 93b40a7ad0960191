//! Provider API keys. `CAREERQUIZ_API_KEY` wins; otherwise the key filed in
//! `auth.json` under the endpoint the server will talk to.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_openai::config::OPENAI_API_BASE;
use dialoguer::{Password, theme::ColorfulTheme};
use serde::{Deserialize, Serialize};

use crate::palette::Palette;
use crate::utils::{get_data_dir, strip_controls_and_escapes, trim_line};

pub const API_KEY_ENV: &str = "CAREERQUIZ_API_KEY";

const AUTH_FILE_NAME: &str = "auth.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiKeySource {
    Environment,
    AuthFile,
}

impl ApiKeySource {
    pub fn description(&self) -> &'static str {
        match self {
            ApiKeySource::Environment => "environment variable",
            ApiKeySource::AuthFile => "local auth file",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiKey {
    pub value: String,
    pub source: ApiKeySource,
}

/// On-disk shape: `{"endpoints": {"<api base>": "<key>"}}`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredKeys {
    #[serde(default)]
    endpoints: BTreeMap<String, String>,
}

/// The endpoint a key is filed under. No API base means the OpenAI default.
pub fn endpoint_for(api_base: Option<&str>) -> String {
    api_base
        .map(|base| base.trim().trim_end_matches('/'))
        .filter(|base| !base.is_empty())
        .unwrap_or(OPENAI_API_BASE)
        .to_string()
}

/// Keys stored per provider endpoint in a single JSON file.
#[derive(Debug, Clone)]
pub struct KeyStore {
    path: PathBuf,
}

impl KeyStore {
    /// `auth.json` in the platform data directory.
    pub fn open() -> Result<Self> {
        Ok(Self::at(get_data_dir()?.join(AUTH_FILE_NAME)))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, endpoint: &str) -> Result<Option<String>> {
        let mut keys = self.load()?;
        Ok(keys
            .endpoints
            .remove(endpoint)
            .and_then(|key| trim_line(&key).map(str::to_string)))
    }

    pub fn set(&self, endpoint: &str, api_key: &str) -> Result<()> {
        let key = trim_line(api_key).context("Cannot store an empty API key")?;
        let mut keys = self.load()?;
        keys.endpoints.insert(endpoint.to_string(), key.to_string());
        self.save(&keys)
    }

    /// Returns whether a key was filed for `endpoint`. The file goes away
    /// with its last key.
    pub fn remove(&self, endpoint: &str) -> Result<bool> {
        let mut keys = self.load()?;
        if keys.endpoints.remove(endpoint).is_none() {
            return Ok(false);
        }

        if keys.endpoints.is_empty() {
            fs::remove_file(&self.path).with_context(|| {
                format!("Failed to remove empty auth file at {}", self.path.display())
            })?;
        } else {
            self.save(&keys)?;
        }
        Ok(true)
    }

    /// A non-blank `env_value` wins over the stored key.
    pub fn resolve(&self, endpoint: &str, env_value: Option<String>) -> Result<Option<ApiKey>> {
        if let Some(value) = env_value.as_deref().and_then(trim_line) {
            return Ok(Some(ApiKey {
                value: value.to_string(),
                source: ApiKeySource::Environment,
            }));
        }

        Ok(self.get(endpoint)?.map(|value| ApiKey {
            value,
            source: ApiKeySource::AuthFile,
        }))
    }

    fn load(&self) -> Result<StoredKeys> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(StoredKeys::default()),
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("Failed to read auth file at {}", self.path.display())
                });
            }
        };

        if contents.trim().is_empty() {
            return Ok(StoredKeys::default());
        }
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse auth file at {}", self.path.display()))
    }

    fn save(&self, keys: &StoredKeys) -> Result<()> {
        let contents = serde_json::to_string_pretty(keys)?;
        fs::write(&self.path, format!("{contents}\n"))
            .with_context(|| format!("Failed to write auth file at {}", self.path.display()))
    }
}

pub fn prompt_for_api_key(endpoint: &str) -> Result<String> {
    println!(
        "{} for {endpoint}. The server uses it to reach the language model.",
        Palette::paint(Palette::SUCCESS, "Enter your provider API key")
    );
    let raw = Password::with_theme(&ColorfulTheme::default())
        .with_prompt("API Key")
        .allow_empty_password(true)
        .interact()
        .context("Failed to read API key")?;

    Ok(strip_controls_and_escapes(&raw))
}
