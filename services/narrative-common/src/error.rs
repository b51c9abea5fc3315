//! Error types shared by the narrative services.

use thiserror::Error;

use crate::validation::ValidationError;

/// Result type alias using the shared error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Error raised while loading or checking startup configuration.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration was read but failed validation
    #[error("Invalid configuration: {0}")]
    Validation(#[from] ValidationError),
}

impl Error {
    /// Name of the offending setting, when known.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation(e) => e.field(),
            Self::Config(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_converts() {
        let err: Error = ValidationError::MissingField {
            field: "AZURE_OPENAI_ENDPOINT".into(),
        }
        .into();
        assert_eq!(err.field(), Some("AZURE_OPENAI_ENDPOINT"));
        assert!(err.to_string().contains("AZURE_OPENAI_ENDPOINT"));
    }

    #[test]
    fn test_config_error_has_no_field() {
        let err = Error::Config("bad .env".into());
        assert_eq!(err.field(), None);
        assert_eq!(err.to_string(), "Configuration error: bad .env");
    }
}
