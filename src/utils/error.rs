//! Error types for the lingo engine
//!
//! This module defines the domain-specific error types used throughout the crate.

use thiserror::Error;

/// Errors that can occur while fetching or parsing a translation dictionary
#[derive(Error, Debug)]
pub enum LoadError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status code other than 404
    #[error("Server responded with status {0}")]
    Status(u16),

    /// Translation asset does not exist
    #[error("Translation asset not found: {0}")]
    NotFound(String),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// Asset is valid JSON but not a translation dictionary
    #[error("Invalid dictionary format: {0}")]
    InvalidFormat(String),

    /// Asset is not valid JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid asset URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl LoadError {
    /// Whether retrying the same request may succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::Timeout | Self::Io(_)
        ) || matches!(self, Self::Status(code) if *code == 429 || *code >= 500)
    }
}

/// Errors raised while registering or parsing locales
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocaleError {
    /// Locale code registered twice
    #[error("Locale '{0}' is already registered")]
    Duplicate(String),

    /// Locale code is malformed
    #[error("Invalid locale code: '{0}'")]
    InvalidCode(String),
}

/// Errors raised by translation provider configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// A provider was registered before any current locale was established
    #[error("No current locale established; call define_preferred_language or set_current_language first")]
    NoCurrentLocale,

    /// Provider prefix is empty
    #[error("Provider prefix must not be empty")]
    EmptyPrefix,
}

/// Errors raised by locale persistence backends
#[derive(Error, Debug)]
pub enum StorageError {
    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored record could not be (de)serialized
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Backend cannot be reached
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_error_recoverable() {
        assert!(LoadError::Timeout.is_recoverable());
        assert!(LoadError::Status(503).is_recoverable());
        assert!(LoadError::Status(429).is_recoverable());
        assert!(!LoadError::Status(403).is_recoverable());
        assert!(!LoadError::NotFound("en.json".into()).is_recoverable());
        assert!(!LoadError::InvalidFormat("array".into()).is_recoverable());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            LocaleError::Duplicate("en".into()).to_string(),
            "Locale 'en' is already registered"
        );
        assert_eq!(
            ProviderError::EmptyPrefix.to_string(),
            "Provider prefix must not be empty"
        );
    }
}
