//! Unified error handling for the lingo crate
//!
//! This module provides a unified error type that consolidates all domain-specific
//! errors into a single `Error` enum, while maintaining the ability to use
//! domain-specific errors when needed.
//!
//! # Architecture
//!
//! - [`LingoErrorTrait`] - Common interface implemented by all error types
//! - [`ErrorCategory`] - Classification of errors for handling strategies
//! - [`Error`] - Unified error enum wrapping all domain-specific errors
//!
//! Translation lookups never return these errors: a key that cannot be
//! resolved renders as itself. Errors surface at setup time (locale and
//! provider configuration) and through load notifications.

use thiserror::Error;

// Re-export domain-specific errors for convenience
pub use crate::utils::error::{LoadError, LocaleError, ProviderError, StorageError};

/// Common trait for all lingo error types
pub trait LingoErrorTrait: std::error::Error {
    /// Check if this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Dictionary fetch or parse errors
    Load,
    /// Locale registration errors
    Locale,
    /// Provider and other configuration errors
    Config,
    /// Locale persistence errors
    Storage,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    /// Short human-readable label
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Locale => "locale",
            Self::Config => "config",
            Self::Storage => "storage",
            Self::Other => "other",
        }
    }
}

/// Unified error type for the lingo crate
#[derive(Error, Debug)]
pub enum Error {
    /// Dictionary loading errors
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// Locale registration errors
    #[error("Locale error: {0}")]
    Locale(#[from] LocaleError),

    /// Translation provider configuration errors
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Locale persistence errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{context}")]
    Other {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl LingoErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Load(e) => e.is_recoverable(),
            Self::Storage(StorageError::Io(_) | StorageError::Unavailable(_)) => true,
            Self::Storage(_) => false,
            Self::Locale(_) | Self::Provider(_) | Self::Config(_) => false,
            Self::Other { .. } => false,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Load(_) => ErrorCategory::Load,
            Self::Locale(_) => ErrorCategory::Locale,
            Self::Provider(_) | Self::Config(_) => ErrorCategory::Config,
            Self::Storage(_) => ErrorCategory::Storage,
            Self::Other { .. } => ErrorCategory::Other,
        }
    }
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a generic error with context
    pub fn other(context: impl Into<String>) -> Self {
        Self::Other {
            context: context.into(),
            source: None,
        }
    }

    /// Create a generic error with context and source
    pub fn with_source(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Other {
            context: context.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
