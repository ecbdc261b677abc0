//! Configuration loading, validation, and management for sortinghat.
//!
//! Loads configuration from `~/.sortinghat/config.toml` with environment
//! variable overrides. Validates all settings once at startup; nothing else
//! in the workspace reads the environment ad hoc.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.sortinghat/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// The labeler's own DID — the issuer identity on every label.
    #[serde(default)]
    pub issuer_did: String,

    /// Hex-encoded 32-byte ed25519 signing key seed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signing_key: Option<String>,

    /// Record keys containing this marker signal a negation; any other key
    /// signals an assignment. External convention from the event source.
    #[serde(default = "default_revocation_marker")]
    pub revocation_marker: String,

    /// Label store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Gateway (HTTP surface) configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Network collaborator configuration (app view + PDS)
    #[serde(default)]
    pub network: NetworkConfig,

    /// Remote classifier configuration
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

fn default_revocation_marker() -> String {
    // The well-known opt-out rkey from the event source.
    "3l3izhv734g2o".into()
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("issuer_did", &self.issuer_did)
            .field("signing_key", &redact(&self.signing_key))
            .field("revocation_marker", &self.revocation_marker)
            .field("store", &self.store)
            .field("gateway", &self.gateway)
            .field("network", &self.network)
            .field("classifier", &self.classifier)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// SQLite database path. `sqlite::memory:` for an ephemeral store.
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

fn default_db_path() -> String {
    AppConfig::config_dir()
        .join("labels.db")
        .to_string_lossy()
        .into_owned()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 {
    4001
}
fn default_host() -> String {
    "127.0.0.1".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Public app view base URL (handle resolution, profile fetch).
    #[serde(default = "default_appview_url")]
    pub appview_url: String,

    /// PDS base URL (session + record writes for `register-labels`).
    #[serde(default = "default_pds_url")]
    pub pds_url: String,

    /// Account identifier for PDS login (register-labels only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,

    /// App password for PDS login (register-labels only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Square avatar raster size in pixels.
    #[serde(default = "default_avatar_size")]
    pub avatar_size: u32,
}

fn default_appview_url() -> String {
    "https://public.api.bsky.app".into()
}
fn default_pds_url() -> String {
    "https://bsky.social".into()
}
fn default_avatar_size() -> u32 {
    100
}

impl std::fmt::Debug for NetworkConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkConfig")
            .field("appview_url", &self.appview_url)
            .field("pds_url", &self.pds_url)
            .field("identifier", &self.identifier)
            .field("password", &redact(&self.password))
            .field("avatar_size", &self.avatar_size)
            .finish()
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            appview_url: default_appview_url(),
            pds_url: default_pds_url(),
            identifier: None,
            password: None,
            avatar_size: default_avatar_size(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// OpenAI-compatible API base URL.
    #[serde(default = "default_classifier_url")]
    pub api_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    /// Bounded timeout for the remote call; timeout is a transient failure.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_classifier_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_timeout_secs() -> u64 {
    60
}

impl std::fmt::Debug for ClassifierConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassifierConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            api_url: default_classifier_url(),
            api_key: None,
            model: default_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.sortinghat/config.toml).
    ///
    /// Environment variable overrides (highest priority):
    /// - `SORTINGHAT_DID` — issuer DID
    /// - `SORTINGHAT_SIGNING_KEY` — hex signing key seed
    /// - `SORTINGHAT_API_KEY` / `OPENAI_API_KEY` — classifier API key
    /// - `BSKY_IDENTIFIER` / `BSKY_PASSWORD` — PDS login
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        if let Ok(did) = std::env::var("SORTINGHAT_DID") {
            config.issuer_did = did;
        }
        if config.signing_key.is_none() {
            config.signing_key = std::env::var("SORTINGHAT_SIGNING_KEY").ok();
        }
        if config.classifier.api_key.is_none() {
            config.classifier.api_key = std::env::var("SORTINGHAT_API_KEY")
                .ok()
                .or_else(|| std::env::var("OPENAI_API_KEY").ok());
        }
        if config.network.identifier.is_none() {
            config.network.identifier = std::env::var("BSKY_IDENTIFIER").ok();
        }
        if config.network.password.is_none() {
            config.network.password = std::env::var("BSKY_PASSWORD").ok();
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path. Missing file = defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".sortinghat")
    }

    /// Validate the configuration. Called once at startup; signing-material
    /// problems are caught here rather than at first publish.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.issuer_did.is_empty() && !self.issuer_did.starts_with("did:") {
            return Err(ConfigError::ValidationError(format!(
                "issuer_did must be a DID, got {:?}",
                self.issuer_did
            )));
        }

        if let Some(key) = &self.signing_key {
            let bytes = hex::decode(key).map_err(|e| {
                ConfigError::ValidationError(format!("signing_key is not valid hex: {e}"))
            })?;
            if bytes.len() != 32 {
                return Err(ConfigError::ValidationError(format!(
                    "signing_key must be 32 bytes, got {}",
                    bytes.len()
                )));
            }
        }

        if self.revocation_marker.is_empty() {
            return Err(ConfigError::ValidationError(
                "revocation_marker must not be empty".into(),
            ));
        }

        if self.network.avatar_size == 0 {
            return Err(ConfigError::ValidationError(
                "avatar_size must be at least 1".into(),
            ));
        }

        Ok(())
    }

    /// The decoded signing key seed. Requires a validated config.
    pub fn signing_key_bytes(&self) -> Result<[u8; 32], ConfigError> {
        let key = self.signing_key.as_ref().ok_or_else(|| {
            ConfigError::ValidationError("signing_key is not configured".into())
        })?;
        let bytes = hex::decode(key).map_err(|e| {
            ConfigError::ValidationError(format!("signing_key is not valid hex: {e}"))
        })?;
        bytes
            .try_into()
            .map_err(|_| ConfigError::ValidationError("signing_key must be 32 bytes".into()))
    }

    /// Generate a default config TOML string (for first-run setup).
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            issuer_did: String::new(),
            signing_key: None,
            revocation_marker: default_revocation_marker(),
            store: StoreConfig::default(),
            gateway: GatewayConfig::default(),
            network: NetworkConfig::default(),
            classifier: ClassifierConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
