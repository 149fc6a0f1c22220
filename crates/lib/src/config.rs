//! # Application Configuration
//!
//! This module defines the configuration structure shared by the server and the
//! CLI, and the logic for loading it from a `config.yml` file and environment
//! variables. The resulting `AppConfig` is built once at startup and passed by
//! reference to every component.

use crate::{
    caller::FailurePolicy,
    prompts::{Institution, TemplateVariant},
    types::GenerationOptions,
};
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use regex::Regex;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use tracing::info;

/// The file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "config.yml";

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
    #[serde(default = "default_port")]
    pub port: u16,
    /// The HS256 secret used to validate identity-provider tokens.
    #[serde(default)]
    pub jwt_secret: Option<String>,
    #[serde(default)]
    pub institution: Institution,
    #[serde(default)]
    pub corpus: CorpusConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub rooms: RoomsConfig,
    #[serde(default)]
    pub failure_policy: FailurePolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            jwt_secret: None,
            institution: Institution::default(),
            corpus: CorpusConfig::default(),
            model: ModelConfig::default(),
            retrieval: RetrievalConfig::default(),
            history: HistoryConfig::default(),
            rooms: RoomsConfig::default(),
            failure_policy: FailurePolicy::default(),
        }
    }
}

fn default_port() -> u16 {
    9090
}

/// Where the pre-scraped corpus lives.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct CorpusConfig {
    pub path: Option<String>,
}

/// The language-model endpoint.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ModelConfig {
    /// The type of provider ("gemini" or "local").
    pub provider: String,
    /// The API URL. Optional for Gemini, where it is derived from the model name.
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub model_name: String,
    pub max_output_tokens: u32,
    pub temperature: f32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        let options = GenerationOptions::default();
        Self {
            provider: "gemini".to_string(),
            api_url: None,
            api_key: None,
            model_name: "gemini-1.5-flash".to_string(),
            max_output_tokens: options.max_output_tokens,
            temperature: options.temperature,
        }
    }
}

impl ModelConfig {
    pub fn generation_options(&self) -> GenerationOptions {
        GenerationOptions {
            max_output_tokens: self.max_output_tokens,
            temperature: self.temperature,
        }
    }
}

/// Which retrieval adapter feeds context into the non-restrictive templates.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RetrievalKind {
    #[default]
    None,
    Managed,
    Corpus,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RetrievalConfig {
    pub kind: RetrievalKind,
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub index_name: Option<String>,
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            kind: RetrievalKind::None,
            api_url: None,
            api_key: None,
            index_name: None,
            top_k: 3,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum HistoryBackend {
    #[default]
    Memory,
    Supabase,
}

/// The store backing the private room's transcripts.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HistoryConfig {
    pub backend: HistoryBackend,
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub table: String,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            backend: HistoryBackend::Memory,
            url: None,
            api_key: None,
            table: "chat_history".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct RoomConfig {
    pub variant: TemplateVariant,
    /// Upper bound on transcripts held in memory. Only the public room uses it.
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
    /// Turns kept per transcript held in memory.
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,
}

fn default_max_sessions() -> usize {
    1000
}

fn default_max_turns() -> usize {
    50
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct RoomsConfig {
    #[serde(default = "default_public_room")]
    pub public: RoomConfig,
    #[serde(default = "default_private_room")]
    pub private: RoomConfig,
}

impl Default for RoomsConfig {
    fn default() -> Self {
        Self {
            public: default_public_room(),
            private: default_private_room(),
        }
    }
}

fn default_public_room() -> RoomConfig {
    RoomConfig {
        variant: TemplateVariant::Restrictive,
        max_sessions: default_max_sessions(),
        max_turns: default_max_turns(),
    }
}

fn default_private_room() -> RoomConfig {
    RoomConfig {
        variant: TemplateVariant::UnrestrictedInternal,
        max_sessions: default_max_sessions(),
        max_turns: default_max_turns(),
    }
}

/// Returns the value if it is set and not blank. `${VAR}` substitution leaves
/// empty strings behind for unset variables.
pub fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

// Helper to read a file, substitute env vars, and return its content.
// Returns Ok(None) if the file does not exist, or an error if it fails to read.
fn read_and_substitute(path: &str) -> Result<Option<String>, ConfigError> {
    if !Path::new(path).exists() {
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
/// Layers, lowest priority first:
/// - Built-in defaults.
/// - The YAML file at `config_path_override`, or `config.yml` in the working
///   directory when present. `${VAR}` references are substituted from the environment.
/// - Top-level keys like `port` are overridden by `PORT`.
/// - Nested keys are overridden by `ASKPTI_...` variables (e.g., `ASKPTI_MODEL__API_KEY`).
pub fn get_config(config_path_override: Option<&str>) -> Result<AppConfig, ConfigError> {
    let mut builder = ConfigBuilder::builder();

    match config_path_override {
        Some(path) => {
            let content = read_and_substitute(path)?.ok_or_else(|| {
                ConfigError::NotFound(format!("Config file not found at '{path}'."))
            })?;
            info!("Loading configuration from '{path}'.");
            builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
        }
        None => {
            if let Some(content) = read_and_substitute(DEFAULT_CONFIG_FILE)? {
                info!("Loading configuration from '{DEFAULT_CONFIG_FILE}'.");
                builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
            } else {
                info!("'{DEFAULT_CONFIG_FILE}' not found. Using defaults and environment only.");
            }
        }
    }

    let settings = builder
        .add_source(Environment::default())
        .add_source(
            Environment::with_prefix("ASKPTI")
                .prefix_separator("_")
                .try_parsing(true)
                .separator("__"),
        )
        .build()?;

    let mut config: AppConfig = settings.try_deserialize()?;

    // The hosted model key is conventionally exported as GOOGLE_API_KEY.
    if present(&config.model.api_key).is_none() {
        if let Ok(key) = env::var("GOOGLE_API_KEY") {
            if !key.is_empty() {
                config.model.api_key = Some(key);
            }
        }
    }

    Ok(config)
}
