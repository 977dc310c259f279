use std::env;
use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

const REDACT_PLACEHOLDER: &str = "****";
const DEFAULT_NAMESPACE: &str = "knowledge_base";
const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),
}

/// Connection settings for the hosted ZeroDB public API.
///
/// `username`/`password` are the service credentials exchanged for a bearer
/// token per request; `api_key` is the separate static key the seeder uses.
#[derive(Clone)]
pub struct ZeroDbConfig {
    pub base_url: String,
    pub project_id: String,
    pub username: String,
    pub password: String,
    pub api_key: Option<String>,
    pub namespace: String,
}

impl ZeroDbConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: trim_base_url(require("ZERODB_API_URL")?),
            project_id: require("ZERODB_PROJECT_ID")?,
            username: require("ZERODB_EMAIL")?,
            password: require("ZERODB_PASSWORD")?,
            api_key: optional("ZERODB_API_KEY"),
            namespace: optional("ZERODB_NAMESPACE")
                .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
        })
    }
}

impl fmt::Debug for ZeroDbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZeroDbConfig")
            .field("base_url", &self.base_url)
            .field("project_id", &self.project_id)
            .field("username", &self.username)
            .field("password", &REDACT_PLACEHOLDER)
            .field("api_key", &self.api_key.as_ref().map(|_| REDACT_PLACEHOLDER))
            .field("namespace", &self.namespace)
            .finish()
    }
}

/// Connection settings for the completion API (OpenAI-compatible).
#[derive(Clone)]
pub struct CompletionConfig {
    pub base_url: String,
    pub api_key: String,
    pub default_model: Option<String>,
}

impl CompletionConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: trim_base_url(require("META_BASE_URL")?),
            api_key: require("META_API_KEY")?,
            default_model: optional("META_MODEL"),
        })
    }
}

impl fmt::Debug for CompletionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &REDACT_PLACEHOLDER)
            .field("default_model", &self.default_model)
            .finish()
    }
}

/// Process-wide configuration, read from the environment once at startup and
/// passed explicitly into every component.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub log_dir: PathBuf,
    pub zerodb: ZeroDbConfig,
    pub completion: CompletionConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            port: env::var("PORT")
                .ok()
                .and_then(|val| val.parse::<u16>().ok())
                .unwrap_or(DEFAULT_PORT),
            log_dir: default_log_dir(),
            zerodb: ZeroDbConfig::from_env()?,
            completion: CompletionConfig::from_env()?,
        })
    }
}

pub fn default_log_dir() -> PathBuf {
    env::var("LOG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("logs"))
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    optional(name).ok_or(ConfigError::MissingVar(name))
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|val| !val.trim().is_empty())
}

fn trim_base_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
