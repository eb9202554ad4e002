use std::collections::HashMap;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dialoguer::{Password, theme::ColorfulTheme};
use serde::{Deserialize, Serialize};

use crate::palette::Palette;
use crate::utils::{get_data_dir, strip_controls_and_escapes, trim_line};

pub const API_KEY_ENV: &str = "FLASHMIND_OPENAI_API_KEY";

const AUTH_FILE_NAME: &str = "auth.json";
const OPENAI_PROVIDER: &str = "openai";

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
    pub key: String,
    pub source: ApiKeySource,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct AuthFile {
    #[serde(flatten)]
    providers: HashMap<String, ProviderAuth>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ProviderAuth {
    key: String,
}

/// The JSON file holding stored provider keys.
#[derive(Debug, Clone)]
pub struct KeyStore {
    path: PathBuf,
}

impl KeyStore {
    pub fn open_default() -> Result<Self> {
        Ok(Self::at(get_data_dir()?.join(AUTH_FILE_NAME)))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn store(&self, api_key: &str) -> Result<()> {
        let trimmed = trim_line(api_key).context("Cannot store an empty API key")?;
        let mut auth = self.read()?.unwrap_or_default();
        auth.providers.insert(
            OPENAI_PROVIDER.to_string(),
            ProviderAuth {
                key: trimmed.to_string(),
            },
        );
        self.write(&auth)
    }

    /// Returns whether a key was removed. The file goes away once it holds
    /// no providers.
    pub fn clear(&self) -> Result<bool> {
        let Some(mut auth) = self.read()? else {
            return Ok(false);
        };
        if auth.providers.remove(OPENAI_PROVIDER).is_none() {
            return Ok(false);
        }
        if auth.providers.is_empty() {
            fs::remove_file(&self.path).with_context(|| {
                format!("Failed to remove empty auth file at {}", self.path.display())
            })?;
        } else {
            self.write(&auth)?;
        }
        Ok(true)
    }

    pub fn stored_key(&self) -> Result<Option<String>> {
        let Some(auth) = self.read()? else {
            return Ok(None);
        };
        Ok(auth
            .providers
            .get(OPENAI_PROVIDER)
            .map(|entry| entry.key.trim())
            .filter(|key| !key.is_empty())
            .map(str::to_string))
    }

    fn read(&self) -> Result<Option<AuthFile>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => parse_auth_contents(&contents, &self.path).map(Some),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err)
                .with_context(|| format!("Failed to read auth file at {}", self.path.display())),
        }
    }

    fn write(&self, auth: &AuthFile) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let contents = format!("{}\n", serde_json::to_string_pretty(auth)?);
        fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write auth file at {}", self.path.display()))
    }
}

fn parse_auth_contents(contents: &str, path: &Path) -> Result<AuthFile> {
    if contents.trim().is_empty() {
        return Ok(AuthFile::default());
    }
    serde_json::from_str(contents)
        .with_context(|| format!("Failed to parse auth file at {}", path.display()))
}

/// Environment first, then the auth file.
pub fn lookup_api_key(store: &KeyStore) -> Result<Option<ApiKey>> {
    lookup_with_env(env::var(API_KEY_ENV).ok(), store)
}

fn lookup_with_env(env_value: Option<String>, store: &KeyStore) -> Result<Option<ApiKey>> {
    if let Some(value) = env_value
        && !value.trim().is_empty()
    {
        return Ok(Some(ApiKey {
            key: value.trim().to_string(),
            source: ApiKeySource::Environment,
        }));
    }
    Ok(store.stored_key()?.map(|key| ApiKey {
        key,
        source: ApiKeySource::AuthFile,
    }))
}

pub fn prompt_for_api_key() -> Result<String> {
    println!(
        "\n{} (https://platform.openai.com/account/api-keys) to generate flashcards. It's stored locally for future use.",
        Palette::paint(Palette::SUCCESS, "Enter your OpenAI API key")
    );
    println!(
        "{}",
        Palette::dim(format!(
            "You can also set {API_KEY_ENV} instead. Leave blank to cancel."
        ))
    );
    let raw = Password::with_theme(&ColorfulTheme::default())
        .with_prompt("API Key")
        .allow_empty_password(true)
        .interact()
        .context("Failed to read API key")?;

    Ok(strip_controls_and_escapes(&raw))
}
