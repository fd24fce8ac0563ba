//! # Application Configuration
//!
//! This module defines the configuration structure for `prodspec-server` and
//! the logic for loading it from layered sources: programmatic defaults, an
//! optional `config.yml` (with `${VAR}` substitution), plain environment
//! variables for top-level keys and `PRODSPEC_`-prefixed variables for nested
//! keys.

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use prodspec::constants::{
    DEFAULT_ANTHROPIC_VERSION, DEFAULT_DB_FILE, DEFAULT_MAX_TOKENS, DEFAULT_MODEL_ID,
    DEFAULT_TABLE_NAME,
};
use prodspec::prompts::PRODUCT_EXTRACTION_PROMPT;
use prodspec::HandlerConfig;
use regex::Regex;
use serde::Deserialize;
use std::env;
use std::fs;
use tracing::info;

/// A custom error type for configuration issues.
#[derive(Debug)]
pub enum ConfigError {
    /// Indicates an error from the underlying `config` crate.
    General(String),
    /// Indicates a required configuration file was not found.
    NotFound(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::General(msg) => write!(f, "Configuration error: {msg}"),
            ConfigError::NotFound(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::General(err.to_string())
    }
}

/// The root configuration structure, mapping directly to `config.yml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// The port for the server to listen on. Loaded from `PORT` env var.
    pub port: u16,
    /// The path to the SQLite record database. Loaded from `DB_URL` env var.
    pub db_url: String,
    /// Model, table and prompt used by the extraction handler.
    pub extraction: HandlerConfig,
    /// The inference endpoint.
    pub inference: InferenceConfig,
    /// Where source objects are read from.
    pub object_store: ObjectStoreConfig,
}

/// Connection details for the Messages-format inference endpoint.
#[derive(Debug, Deserialize, Clone)]
pub struct InferenceConfig {
    /// The endpoint URL. A `{model}` placeholder is replaced by the model id.
    pub api_url: String,
    /// Sent as `x-api-key`. Empty values are treated as absent.
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ObjectStoreKind {
    Http,
    Local,
}

/// Selects and configures the object store.
#[derive(Debug, Deserialize, Clone)]
pub struct ObjectStoreConfig {
    pub kind: ObjectStoreKind,
    /// Base URL for the `http` store, e.g. `http://localhost:9000`.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Bearer token for the `http` store.
    #[serde(default)]
    pub bearer_token: Option<String>,
    /// Root directory for the `local` store.
    #[serde(default)]
    pub root: Option<String>,
}

/// Treats `None` and `Some("")` alike, as `${VAR}` substitution of an unset
/// variable produces an empty string.
pub fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}

// Helper to read a file, substitute env vars, and return its content.
// Returns Ok(None) if the file does not exist, or an error if it fails to read.
fn read_and_substitute(path: &str) -> Result<Option<String>, ConfigError> {
    if !std::path::Path::new(path).exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .map_err(|e| ConfigError::General(format!("Failed to read config file '{path}': {e}")))?;

    let re = Regex::new(r"\$\{(?P<var>[A-Z0-9_]+)\}")
        .map_err(|e| ConfigError::General(e.to_string()))?;
    let expanded_content = re.replace_all(&content, |caps: &regex::Captures| {
        let var_name = &caps["var"];
        env::var(var_name).unwrap_or_default()
    });

    Ok(Some(expanded_content.to_string()))
}

/// Loads the application configuration from a file and environment variables.
///
/// - Top-level keys like `port` and `db_url` are overridden by `PORT` and `DB_URL`.
/// - Nested keys are overridden by `PRODSPEC_...` variables
///   (e.g., `PRODSPEC_INFERENCE__API_URL`, `PRODSPEC_EXTRACTION__TABLE_NAME`).
///
/// When `config_path_override` is given the file must exist; otherwise
/// `config.yml` next to this crate is used if present.
pub fn get_config(config_path_override: Option<&str>) -> Result<AppConfig, ConfigError> {
    let base_path = env!("CARGO_MANIFEST_DIR");
    let mut builder = ConfigBuilder::builder()
        // Layer 1: Programmatic defaults from the library.
        .set_default("port", 9090)?
        .set_default("db_url", DEFAULT_DB_FILE)?
        .set_default("extraction.model_id", DEFAULT_MODEL_ID)?
        .set_default("extraction.table_name", DEFAULT_TABLE_NAME)?
        .set_default("extraction.max_tokens", i64::from(DEFAULT_MAX_TOKENS))?
        .set_default("extraction.anthropic_version", DEFAULT_ANTHROPIC_VERSION)?
        .set_default("extraction.prompt", PRODUCT_EXTRACTION_PROMPT)?
        .set_default("object_store.kind", "local")?
        .set_default("object_store.root", "objects")?;

    // Layer 2: Main config file.
    let main_content = match config_path_override {
        Some(path) => Some(read_and_substitute(path)?.ok_or_else(|| {
            ConfigError::NotFound(format!("Config file not found at '{path}'."))
        })?),
        None => {
            let user_config_path = format!("{base_path}/config.yml");
            let content = read_and_substitute(&user_config_path)?;
            if content.is_some() {
                info!("Loading configuration from '{user_config_path}'.");
            }
            content
        }
    };
    if let Some(content) = main_content {
        builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
    }

    let settings = builder
        // Layer 3: Load environment variables for top-level keys like PORT.
        .add_source(Environment::default())
        // Layer 4: Load prefixed environment variables for deeper overrides.
        .add_source(
            Environment::with_prefix("PRODSPEC")
                .prefix_separator("_")
                .try_parsing(true)
                .separator("__"),
        )
        .build()?;

    let config: AppConfig = settings.try_deserialize()?;
    Ok(config)
}
