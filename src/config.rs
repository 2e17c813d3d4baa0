//! Startup configuration: `config.toml` plus environment overrides.
//!
//! Credentials come from the file or the environment, never from the binary.

use crate::completion::{self, CompletionClient, DemoClient, GeminiClient, OpenAiClient};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub const CONFIG_ENV: &str = "ARIA_CONFIG";
pub const PROVIDER_ENV: &str = "ARIA_PROVIDER";
pub const GEMINI_KEY_ENV: &str = "GEMINI_API_KEY";
pub const OPENAI_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("unknown provider '{0}' (expected gemini, openai or demo)")]
    UnknownProvider(String),
    #[error("provider {0} needs an API key; set it in config.toml or the environment")]
    MissingCredential(ProviderKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Gemini,
    OpenAi,
    Demo,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gemini => write!(f, "gemini"),
            Self::OpenAi => write!(f, "openai"),
            Self::Demo => write!(f, "demo"),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "openai" => Ok(Self::OpenAi),
            "demo" => Ok(Self::Demo),
            other => Err(ConfigError::UnknownProvider(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: completion::gemini::DEFAULT_MODEL.to_string(),
            base_url: completion::gemini::DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub system_prompt: Option<String>,
    pub max_tokens: u32,
    pub temperature: f64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: completion::openai::DEFAULT_MODEL.to_string(),
            base_url: completion::openai::DEFAULT_BASE_URL.to_string(),
            system_prompt: None,
            max_tokens: completion::openai::DEFAULT_MAX_TOKENS,
            temperature: completion::openai::DEFAULT_TEMPERATURE,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: 1000,
            max_delay_ms: 3000,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Gate the chat behind a sign-in form.
    pub required: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub provider: Option<ProviderKind>,
    pub gemini: GeminiConfig,
    pub openai: OpenAiConfig,
    pub demo: DemoConfig,
    pub auth: AuthConfig,
}

fn non_empty(value: Option<&String>) -> bool {
    value.is_some_and(|value| !value.trim().is_empty())
}

impl AppConfig {
    pub fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("dev", "aria", "aria")
    }

    pub fn default_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Loads from `$ARIA_CONFIG` or the platform config dir, then applies env overrides.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(Self::default_path(), |key| std::env::var(key).ok())
    }

    /// An explicit `$ARIA_CONFIG` must exist; the platform default may be absent.
    fn load_with(
        fallback: Option<PathBuf>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = match lookup(CONFIG_ENV) {
            Some(explicit) => Self::from_file(Path::new(&explicit))?,
            None => match fallback {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        config.apply_env(lookup)?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(provider) = lookup(PROVIDER_ENV).filter(|raw| !raw.trim().is_empty()) {
            self.provider = Some(provider.parse()?);
        }
        if let Some(key) = lookup(GEMINI_KEY_ENV).filter(|key| !key.trim().is_empty()) {
            self.gemini.api_key = Some(key);
        }
        if let Some(key) = lookup(OPENAI_KEY_ENV).filter(|key| !key.trim().is_empty()) {
            self.openai.api_key = Some(key);
        }
        Ok(())
    }

    /// The named provider, or the first keyed backend, or the demo backend.
    pub fn resolve_provider(&self) -> Result<ProviderKind, ConfigError> {
        let gemini_keyed = non_empty(self.gemini.api_key.as_ref());
        let openai_keyed = non_empty(self.openai.api_key.as_ref());

        match self.provider {
            Some(ProviderKind::Gemini) if !gemini_keyed => {
                Err(ConfigError::MissingCredential(ProviderKind::Gemini))
            }
            Some(ProviderKind::OpenAi) if !openai_keyed => {
                Err(ConfigError::MissingCredential(ProviderKind::OpenAi))
            }
            Some(kind) => Ok(kind),
            None if gemini_keyed => Ok(ProviderKind::Gemini),
            None if openai_keyed => Ok(ProviderKind::OpenAi),
            None => Ok(ProviderKind::Demo),
        }
    }

    pub fn completion_client(&self) -> Result<Arc<dyn CompletionClient>, ConfigError> {
        let client: Arc<dyn CompletionClient> = match self.resolve_provider()? {
            ProviderKind::Gemini => {
                let key = self.gemini.api_key.clone().unwrap_or_default();
                Arc::new(
                    GeminiClient::new(key, self.gemini.model.clone())
                        .with_base_url(self.gemini.base_url.clone()),
                )
            }
            ProviderKind::OpenAi => {
                let key = self.openai.api_key.clone().unwrap_or_default();
                Arc::new(
                    OpenAiClient::new(key, self.openai.model.clone())
                        .with_base_url(self.openai.base_url.clone())
                        .with_system_prompt(self.openai.system_prompt.clone())
                        .with_sampling(self.openai.max_tokens, self.openai.temperature),
                )
            }
            ProviderKind::Demo => Arc::new(DemoClient::new(
                Duration::from_millis(self.demo.min_delay_ms),
                Duration::from_millis(self.demo.max_delay_ms),
            )),
        };
        Ok(client)
    }
}
