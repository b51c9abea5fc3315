//! Configuration management for the narrative deconstruction service.
//!
//! Settings come from the process environment. A `.env` file in the working
//! directory is loaded first when present; variables already set in the
//! process take precedence over the file.
//!
//! # Configuration Priority
//!
//! 1. Process environment variables
//! 2. `.env` file values
//! 3. Default values
//!
//! # Environment Variable Mapping
//!
//! ## Model Provider
//! - `AZURE_OPENAI_ENDPOINT` → provider.endpoint
//! - `AZURE_OPENAI_KEY` → provider.api_key
//! - `AZURE_OPENAI_DEPLOYMENT_NAME` → provider.deployment
//! - `AZURE_OPENAI_API_VERSION` → provider.api_version
//!
//! ## Access
//! - `USE_DUMMY_DATA` → access.use_dummy_data
//! - `API_ACCESS_KEY` → access.access_key
//!
//! ## Server
//! - `HOST` → server.host
//! - `PORT` → server.port
//! - `DEBUG` → server.debug
//!
//! ## Observability
//! - `LOG_LEVEL` → observability.log_level
//! - `LOG_FORMAT` → observability.log_format

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::error::{Error, Result};

/// Default Azure OpenAI API version.
pub const DEFAULT_API_VERSION: &str = "2024-02-01";

// ============================================================================
// Provider Configuration
// ============================================================================

/// Hosted model provider settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the Azure OpenAI resource
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Provider API key (never serialized)
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Deployment name used as the model identifier
    #[serde(default)]
    pub deployment: Option<String>,

    /// API version query parameter
    #[serde(default = "default_api_version")]
    pub api_version: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            deployment: None,
            api_version: default_api_version(),
        }
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("deployment", &self.deployment)
            .field("api_version", &self.api_version)
            .finish()
    }
}

impl ProviderConfig {
    /// Whether endpoint, key and deployment are all present.
    pub fn is_complete(&self) -> bool {
        self.endpoint.is_some() && self.api_key.is_some() && self.deployment.is_some()
    }
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

// ============================================================================
// Access Configuration
// ============================================================================

/// Demo mode and request gating.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct AccessConfig {
    /// Serve canned results instead of calling the model provider
    #[serde(default)]
    pub use_dummy_data: bool,

    /// Bearer secret required on analysis requests (never serialized)
    #[serde(default, skip_serializing)]
    pub access_key: Option<String>,
}

impl fmt::Debug for AccessConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessConfig")
            .field("use_dummy_data", &self.use_dummy_data)
            .field("access_key", &self.access_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

// ============================================================================
// Server Configuration
// ============================================================================

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Debug mode (raises the default log level)
    #[serde(default)]
    pub debug: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            debug: false,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

// ============================================================================
// Observability Configuration
// ============================================================================

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level", alias = "level")]
    pub log_level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format", alias = "format")]
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration, immutable once loaded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub access: AccessConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from `.env` (if present) and the process environment.
    pub fn load() -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => return Err(Error::Config(format!("Failed to read .env file: {e}"))),
        }

        Self::from_env()
    }

    /// Build configuration from the process environment only.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        config.apply_env_overrides(lookup)?;
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Empty values are treated as unset.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        // Provider
        if let Some(endpoint) = get("AZURE_OPENAI_ENDPOINT") {
            self.provider.endpoint = Some(endpoint);
        }
        if let Some(key) = get("AZURE_OPENAI_KEY") {
            self.provider.api_key = Some(key);
        }
        if let Some(deployment) = get("AZURE_OPENAI_DEPLOYMENT_NAME") {
            self.provider.deployment = Some(deployment);
        }
        if let Some(version) = get("AZURE_OPENAI_API_VERSION") {
            self.provider.api_version = version;
        }

        // Access
        if let Some(flag) = get("USE_DUMMY_DATA") {
            self.access.use_dummy_data = parse_bool("USE_DUMMY_DATA", &flag)?;
        }
        if let Some(key) = get("API_ACCESS_KEY") {
            self.access.access_key = Some(key);
        }

        // Server
        if let Some(host) = get("HOST") {
            self.server.host = host;
        }
        if let Some(port) = get("PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| Error::Config(format!("PORT must be a number, got '{port}'")))?;
        }
        if let Some(flag) = get("DEBUG") {
            self.server.debug = parse_bool("DEBUG", &flag)?;
        }

        // Observability
        match get("LOG_LEVEL") {
            Some(level) => self.observability.log_level = level.to_lowercase(),
            None if self.server.debug => self.observability.log_level = "debug".to_string(),
            None => {}
        }
        if let Some(format) = get("LOG_FORMAT") {
            self.observability.log_format = format.to_lowercase();
        }

        Ok(())
    }

    /// Whether analysis requests must carry the bearer access key.
    ///
    /// Demo mode never calls the provider, so it never requires the key.
    pub fn requires_api_key(&self) -> bool {
        self.access.access_key.is_some() && !self.access.use_dummy_data
    }

    /// Whether canned demo results are served.
    pub fn demo_mode(&self) -> bool {
        self.access.use_dummy_data
    }

    /// Socket address for the listener. `HOST` must be an IP literal.
    pub fn bind_address(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self.server.host.parse().map_err(|_| {
            Error::Config(format!(
                "HOST must be an IP address, got '{}'",
                self.server.host
            ))
        })?;
        Ok(SocketAddr::new(ip, self.server.port))
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(Error::Config(format!(
            "{name} must be a boolean (true/false), got '{other}'"
        ))),
    }
}
