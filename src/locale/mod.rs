//! Locale identifiers and the registry of available locales
//!
//! A [`Locale`] is an immutable code such as `en`, `en-US` or `zh-Hant-TW`.
//! The [`LocaleRegistry`] keeps the locales an application declared as
//! available, in declaration order, which matters when negotiating against
//! the environment language.
//!
//! # Usage
//!
//! ```rust
//! use lingo::locale::{Locale, LocaleRegistry};
//!
//! let mut registry = LocaleRegistry::new();
//! registry.add(Locale::parse("en").unwrap()).unwrap();
//! registry.add(Locale::parse("it").unwrap()).unwrap();
//!
//! assert_eq!(registry.negotiate("it_IT").map(Locale::code), Some("it"));
//! ```

pub mod environment;
pub mod store;

use crate::utils::error::LocaleError;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use environment::{EnvLanguage, FixedLanguage, LanguageEnvironment};
pub use store::LocaleStore;

/// Language identifier, optionally with region or script/variant subtags
///
/// Equality is by code string. Codes are validated on construction but
/// otherwise kept verbatim, so `en-US` and `en_US` are distinct locales.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Locale(String);

impl Locale {
    /// Parse and validate a locale code
    ///
    /// # Errors
    ///
    /// Returns `LocaleError::InvalidCode` if the code is empty or contains
    /// anything other than ASCII alphanumeric segments joined by `-` or `_`.
    pub fn parse(code: &str) -> Result<Self, LocaleError> {
        let trimmed = code.trim();
        let valid = !trimmed.is_empty()
            && trimmed
                .split(['-', '_'])
                .all(|seg| !seg.is_empty() && seg.chars().all(|c| c.is_ascii_alphanumeric()));

        if valid {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(LocaleError::InvalidCode(code.to_string()))
        }
    }

    /// The full code string
    pub fn code(&self) -> &str {
        &self.0
    }

    /// Primary language subtag, lowercased (`en` for `en-US`)
    pub fn language(&self) -> String {
        self.0
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase()
    }

    /// Second subtag, if any (`US` for `en-US`)
    pub fn region(&self) -> Option<&str> {
        self.0.split(['-', '_']).nth(1)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Locale {
    type Error = LocaleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Locale> for String {
    fn from(locale: Locale) -> Self {
        locale.0
    }
}

impl std::str::FromStr for Locale {
    type Err = LocaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Ordered set of locales the application declared as available
#[derive(Debug, Clone, Default)]
pub struct LocaleRegistry {
    locales: Vec<Locale>,
}

impl LocaleRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a locale
    ///
    /// # Errors
    ///
    /// Returns `LocaleError::Duplicate` if the code is already registered.
    pub fn add(&mut self, locale: Locale) -> Result<(), LocaleError> {
        if self.contains(&locale) {
            return Err(LocaleError::Duplicate(locale.0));
        }
        self.locales.push(locale);
        Ok(())
    }

    /// Whether the locale is registered
    pub fn contains(&self, locale: &Locale) -> bool {
        self.locales.iter().any(|l| l == locale)
    }

    /// Registered locales in declaration order
    pub fn locales(&self) -> &[Locale] {
        &self.locales
    }

    pub fn len(&self) -> usize {
        self.locales.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locales.is_empty()
    }

    /// Pick the first registered locale matching an environment language
    ///
    /// An exact code match wins; otherwise the first locale whose primary
    /// language subtag equals the environment's is returned.
    pub fn negotiate(&self, language: &str) -> Option<&Locale> {
        let wanted = Locale::parse(language).ok()?;

        self.locales.iter().find(|l| **l == wanted).or_else(|| {
            let lang = wanted.language();
            self.locales.iter().find(|l| l.language() == lang)
        })
    }
}
