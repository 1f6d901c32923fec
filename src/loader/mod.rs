//! Translation loaders
//!
//! A [`TranslationLoader`] fetches the dictionary of one locale for one
//! [`ProviderDescriptor`]. Each call produces exactly one outcome; the
//! catalog decides what to do with it.
//!
//! Implementations:
//!
//! - [`HttpLoader`] - fetches `{base_url}/{prefix}-{locale}.json?v={version}`
//! - [`FileLoader`] - reads `{root}/{prefix}-{locale}.json`

pub mod file;
pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::catalog::Dictionary;
use crate::locale::Locale;
use crate::utils::error::{LoadError, ProviderError};

pub use file::FileLoader;
pub use http::HttpLoader;

/// How the asset name is built from prefix and locale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrlStyle {
    /// `{prefix}-{locale}.json`
    #[default]
    Hyphenated,
    /// `{prefix}{locale}.json`
    Legacy,
}

/// Where a locale's translation asset lives
///
/// # Example
///
/// ```rust
/// use lingo::loader::ProviderDescriptor;
/// use lingo::locale::Locale;
///
/// let provider = ProviderDescriptor::new("assets/locale").unwrap();
/// let it = Locale::parse("it").unwrap();
/// assert_eq!(provider.asset_path(&it), "assets/locale-it.json");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
    /// Asset path prefix
    pub prefix: String,

    /// Cache-busting token appended to remote requests
    #[serde(default)]
    pub version: Option<String>,

    /// Asset naming style
    #[serde(default)]
    pub style: UrlStyle,
}

impl ProviderDescriptor {
    /// Provider with the default hyphenated naming and no version
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::EmptyPrefix` if the prefix is blank.
    pub fn new(prefix: impl Into<String>) -> Result<Self, ProviderError> {
        let prefix = prefix.into();
        if prefix.trim().is_empty() {
            return Err(ProviderError::EmptyPrefix);
        }
        Ok(Self {
            prefix,
            version: None,
            style: UrlStyle::Hyphenated,
        })
    }

    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    #[must_use]
    pub fn with_style(mut self, style: UrlStyle) -> Self {
        self.style = style;
        self
    }

    /// Check a descriptor built by hand or deserialized from config
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::EmptyPrefix` if the prefix is blank.
    pub fn validate(&self) -> Result<(), ProviderError> {
        if self.prefix.trim().is_empty() {
            return Err(ProviderError::EmptyPrefix);
        }
        Ok(())
    }

    /// Relative asset path for a locale
    pub fn asset_path(&self, locale: &Locale) -> String {
        match self.style {
            UrlStyle::Hyphenated => format!("{}-{}.json", self.prefix, locale),
            UrlStyle::Legacy => format!("{}{}.json", self.prefix, locale),
        }
    }
}

/// Fetches a dictionary for a locale
#[async_trait]
pub trait TranslationLoader: Send + Sync {
    /// Loader name for logs
    fn name(&self) -> &str;

    /// Fetch and parse the dictionary of `locale` described by `provider`
    async fn get(
        &self,
        locale: &Locale,
        provider: &ProviderDescriptor,
    ) -> Result<Dictionary, LoadError>;
}
