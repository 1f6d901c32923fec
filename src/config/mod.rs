//! Configuration management for lingo
//!
//! This module handles loading and validating configuration from environment
//! variables and TOML files.
//!
//! # Environment Variables
//!
//! - `LINGO_DEFAULT_LOCALE`: locale used when nothing is persisted (default `en`)
//! - `LINGO_LOCALES`: comma-separated available locales (default `en`)
//! - `LINGO_EXPIRY_DAYS`: persisted locale lifetime in days
//! - `LINGO_PROVIDER_PREFIX`: asset prefix (default `locale`)
//! - `LINGO_PROVIDER_VERSION`: cache-busting token
//! - `LINGO_BASE_URL`: load over HTTP from this URL instead of the filesystem
//! - `LINGO_ASSET_DIR`: asset root for filesystem loading (default `.`)
//! - `LINGO_REQUEST_TIMEOUT`: HTTP timeout in seconds (default 10)
//! - `LINGO_MAX_RETRIES`: HTTP retries per fetch (default 2)
//! - `LINGO_STATE_DIR`: where the selected locale is persisted
//! - `LINGO_LOG_LEVEL`, `LINGO_LOG_FORMAT`: logging

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::loader::{ProviderDescriptor, UrlStyle};
use crate::locale::Locale;
use crate::utils::retry::RetryConfig;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Locale selection
    pub localization: LocalizationConfig,

    /// Translation asset loading
    pub loader: LoaderConfig,

    /// Locale persistence
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Locale selection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalizationConfig {
    /// Locale used when nothing is persisted or negotiated
    pub default_locale: String,

    /// Available locales, in negotiation order
    pub locales: Vec<String>,

    /// Lifetime of the persisted locale in days
    #[serde(default)]
    pub expiry_days: Option<u32>,
}

/// Translation loading configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Translation providers, merged in order
    pub providers: Vec<ProviderDescriptor>,

    /// Base URL for HTTP loading; filesystem loading when absent
    #[serde(default)]
    pub base_url: Option<String>,

    /// Asset root for filesystem loading
    #[serde(default = "default_asset_dir")]
    pub asset_dir: PathBuf,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Retry policy for transient HTTP failures
    #[serde(default)]
    pub retry: RetryConfig,
}

/// Locale persistence configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding `locale.json`; in-memory when absent
    #[serde(default)]
    pub state_dir: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

fn default_asset_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_timeout_secs() -> u64 {
    10
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let default_locale =
            std::env::var("LINGO_DEFAULT_LOCALE").unwrap_or_else(|_| String::from("en"));

        let locales = std::env::var("LINGO_LOCALES")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_else(|_| vec![default_locale.clone()]);

        let expiry_days = std::env::var("LINGO_EXPIRY_DAYS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok());

        let prefix =
            std::env::var("LINGO_PROVIDER_PREFIX").unwrap_or_else(|_| String::from("locale"));
        let version = std::env::var("LINGO_PROVIDER_VERSION").ok();

        let base_url = std::env::var("LINGO_BASE_URL").ok();

        let asset_dir = std::env::var("LINGO_ASSET_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_asset_dir());

        let request_timeout_secs = std::env::var("LINGO_REQUEST_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or_else(default_timeout_secs);

        let max_retries = std::env::var("LINGO_MAX_RETRIES")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(RetryConfig::default().max_retries);

        let state_dir = std::env::var("LINGO_STATE_DIR").ok().map(PathBuf::from);

        let log_level = std::env::var("LINGO_LOG_LEVEL").unwrap_or_else(|_| String::from("info"));

        let log_format = std::env::var("LINGO_LOG_FORMAT").unwrap_or_else(|_| String::from("text"));

        Ok(Self {
            localization: LocalizationConfig {
                default_locale,
                locales,
                expiry_days,
            },
            loader: LoaderConfig {
                providers: vec![ProviderDescriptor {
                    prefix,
                    version,
                    style: UrlStyle::Hyphenated,
                }],
                base_url,
                asset_dir,
                request_timeout_secs,
                retry: RetryConfig::new(max_retries),
            },
            storage: StorageConfig { state_dir },
            logging: LoggingConfig {
                level: log_level,
                format: log_format,
            },
        })
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        Locale::parse(&self.localization.default_locale)
            .context("default_locale is not a valid locale code")?;

        if self.localization.locales.is_empty() {
            anyhow::bail!("at least one locale must be configured");
        }

        for code in &self.localization.locales {
            Locale::parse(code).with_context(|| format!("invalid locale in locales: {code}"))?;
        }

        if self.loader.providers.is_empty() {
            anyhow::bail!("at least one translation provider must be configured");
        }

        for provider in &self.loader.providers {
            provider.validate()?;
        }

        if self.loader.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than 0");
        }

        Ok(())
    }

    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.loader.request_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            localization: LocalizationConfig {
                default_locale: String::from("en"),
                locales: vec![String::from("en")],
                expiry_days: None,
            },
            loader: LoaderConfig {
                providers: vec![ProviderDescriptor {
                    prefix: String::from("locale"),
                    version: None,
                    style: UrlStyle::Hyphenated,
                }],
                base_url: None,
                asset_dir: default_asset_dir(),
                request_timeout_secs: default_timeout_secs(),
                retry: RetryConfig::default(),
            },
            storage: StorageConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
