//! Configuration validation.
//!
//! Checks that required provider settings are present and that
//! listener and logging values are usable before the server starts.

use thiserror::Error;

use crate::config::{Config, ObservabilityConfig, ProviderConfig, ServerConfig};

/// Recognised `tracing` levels.
const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Recognised log output formats.
const LOG_FORMATS: &[&str] = &["pretty", "json"];

/// Configuration validation error.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid port {port} for {field}: must be between 1 and 65535")]
    InvalidPort { port: u16, field: String },

    #[error("Missing required setting: {field}")]
    MissingField { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Multiple validation errors: {0:?}")]
    Multiple(Vec<ValidationError>),
}

impl ValidationError {
    /// The setting this error refers to (first one for `Multiple`).
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::InvalidPort { field, .. }
            | Self::MissingField { field }
            | Self::InvalidValue { field, .. } => Some(field),
            Self::Multiple(errors) => errors.first().and_then(Self::field),
        }
    }
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Trait for validatable configuration sections.
pub trait Validate {
    /// Validate this configuration section.
    fn validate(&self) -> ValidationResult<()>;
}

impl Config {
    /// Validate the entire configuration.
    ///
    /// Provider settings are only required when demo mode is off.
    pub fn validate(&self) -> ValidationResult<()> {
        let mut errors = Vec::new();

        if !self.access.use_dummy_data {
            if let Err(e) = self.provider.validate() {
                errors.push(e);
            }
        }

        if let Err(e) = self.server.validate() {
            errors.push(e);
        }

        if let Err(e) = self.observability.validate() {
            errors.push(e);
        }

        collect(errors)
    }
}

impl Validate for ProviderConfig {
    fn validate(&self) -> ValidationResult<()> {
        let mut errors = Vec::new();

        match &self.endpoint {
            None => errors.push(ValidationError::MissingField {
                field: "AZURE_OPENAI_ENDPOINT".into(),
            }),
            Some(endpoint) => match url::Url::parse(endpoint) {
                Ok(url) if matches!(url.scheme(), "http" | "https") => {}
                Ok(url) => errors.push(ValidationError::InvalidValue {
                    field: "AZURE_OPENAI_ENDPOINT".into(),
                    reason: format!("unsupported scheme '{}'", url.scheme()),
                }),
                Err(e) => errors.push(ValidationError::InvalidValue {
                    field: "AZURE_OPENAI_ENDPOINT".into(),
                    reason: e.to_string(),
                }),
            },
        }

        if self.api_key.is_none() {
            errors.push(ValidationError::MissingField {
                field: "AZURE_OPENAI_KEY".into(),
            });
        }

        if self.deployment.is_none() {
            errors.push(ValidationError::MissingField {
                field: "AZURE_OPENAI_DEPLOYMENT_NAME".into(),
            });
        }

        if self.api_version.trim().is_empty() {
            errors.push(ValidationError::MissingField {
                field: "AZURE_OPENAI_API_VERSION".into(),
            });
        }

        collect(errors)
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> ValidationResult<()> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort {
                port: self.port,
                field: "PORT".into(),
            });
        }

        if self.host.parse::<std::net::IpAddr>().is_err() {
            return Err(ValidationError::InvalidValue {
                field: "HOST".into(),
                reason: format!("'{}' is not an IP address", self.host),
            });
        }

        Ok(())
    }
}

impl Validate for ObservabilityConfig {
    fn validate(&self) -> ValidationResult<()> {
        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(ValidationError::InvalidValue {
                field: "LOG_LEVEL".into(),
                reason: format!("must be one of {}", LOG_LEVELS.join(", ")),
            });
        }

        if !LOG_FORMATS.contains(&self.log_format.as_str()) {
            return Err(ValidationError::InvalidValue {
                field: "LOG_FORMAT".into(),
                reason: format!("must be one of {}", LOG_FORMATS.join(", ")),
            });
        }

        Ok(())
    }
}

fn collect(mut errors: Vec<ValidationError>) -> ValidationResult<()> {
    if errors.is_empty() {
        Ok(())
    } else if errors.len() == 1 {
        Err(errors.remove(0))
    } else {
        Err(ValidationError::Multiple(errors))
    }
}
