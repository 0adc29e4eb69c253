//! Application configuration for SoapBridge.
//!
//! User config lives at `~/.soapbridge/soapbridge.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SoapBridgeError};
use crate::types::TargetStack;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "soapbridge.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".soapbridge";

// ---------------------------------------------------------------------------
// Config structs (matching soapbridge.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Gemini settings.
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Reference-context retrieval settings.
    #[serde(default)]
    pub retrieval: RetrievalSettings,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Client stack generated code targets.
    #[serde(default)]
    pub target_stack: TargetStack,

    /// Free-form REST preferences passed to the design prompt.
    #[serde(default)]
    pub rest_preferences: String,
}

/// `[gemini]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Default model for both generation stages.
    #[serde(default = "default_model")]
    pub default_model: String,

    /// API root, overridable for proxies and tests.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            default_model: default_model(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".into()
}
fn default_model() -> String {
    "gemini-2.5-flash".into()
}
fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com".into()
}
fn default_timeout_secs() -> u64 {
    120
}

/// `[retrieval]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalSettings {
    /// Number of chunks kept in the context pack.
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Words per chunk window.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Words shared between consecutive windows.
    #[serde(default = "default_overlap")]
    pub overlap: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            chunk_size: default_chunk_size(),
            overlap: default_overlap(),
        }
    }
}

fn default_top_k() -> usize {
    6
}
fn default_chunk_size() -> usize {
    900
}
fn default_overlap() -> usize {
    120
}

// ---------------------------------------------------------------------------
// Retrieval config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime retrieval configuration, merged from config file and CLI flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrievalConfig {
    pub top_k: usize,
    pub chunk_size: usize,
    pub overlap: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for RetrievalConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            top_k: config.retrieval.top_k,
            chunk_size: config.retrieval.chunk_size,
            overlap: config.retrieval.overlap,
        }
    }
}

impl RetrievalConfig {
    /// Apply CLI overrides on top of file/default values.
    pub fn with_overrides(
        mut self,
        top_k: Option<usize>,
        chunk_size: Option<usize>,
        overlap: Option<usize>,
    ) -> Self {
        if let Some(k) = top_k {
            self.top_k = k;
        }
        if let Some(size) = chunk_size {
            self.chunk_size = size;
        }
        if let Some(o) = overlap {
            self.overlap = o;
        }
        self
    }

    /// Reject window settings the chunker would only accept by degrading.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(SoapBridgeError::validation("chunk_size must be at least 1"));
        }
        if self.overlap >= self.chunk_size {
            return Err(SoapBridgeError::validation(format!(
                "overlap ({}) must be smaller than chunk_size ({})",
                self.overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.soapbridge/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| SoapBridgeError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.soapbridge/soapbridge.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| SoapBridgeError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        SoapBridgeError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| SoapBridgeError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| SoapBridgeError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| SoapBridgeError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read the Gemini API key from the configured env var.
pub fn resolve_api_key(config: &AppConfig) -> Result<String> {
    let var_name = &config.gemini.api_key_env;
    match std::env::var(var_name) {
        Ok(val) if !val.trim().is_empty() => Ok(val),
        _ => Err(SoapBridgeError::config(format!(
            "Gemini API key not found. Set the {var_name} environment variable."
        ))),
    }
}
