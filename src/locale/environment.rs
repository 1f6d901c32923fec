//! Environment language negotiation
//!
//! The environment language is a hint used by
//! [`LocaleStore::define_preferred_language`](super::LocaleStore::define_preferred_language)
//! when nothing is persisted yet.
//!
//! # Environment Variables
//!
//! - `LC_ALL`, `LC_MESSAGES`, `LANG`: checked in that order; the first set,
//!   non-empty value other than `C`/`POSIX` wins.

/// Source of the host's preferred language
pub trait LanguageEnvironment: Send + Sync {
    /// Two-letter language code of the environment, if known
    fn current_language(&self) -> Option<String>;
}

/// Reads the language from POSIX locale environment variables
#[derive(Debug, Clone, Default)]
pub struct EnvLanguage;

impl EnvLanguage {
    const VARS: [&'static str; 3] = ["LC_ALL", "LC_MESSAGES", "LANG"];
}

impl LanguageEnvironment for EnvLanguage {
    fn current_language(&self) -> Option<String> {
        Self::VARS
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find_map(|value| normalize_language(&value))
    }
}

/// Environment with a language known up front (or none)
#[derive(Debug, Clone, Default)]
pub struct FixedLanguage(Option<String>);

impl FixedLanguage {
    pub fn new(language: impl Into<String>) -> Self {
        Self(Some(language.into()))
    }

    /// Environment that never reports a language
    pub fn none() -> Self {
        Self(None)
    }
}

impl LanguageEnvironment for FixedLanguage {
    fn current_language(&self) -> Option<String> {
        self.0.as_deref().and_then(normalize_language)
    }
}

/// Reduce an environment locale value to its two-letter language
///
/// - it_IT.UTF-8, it-IT, it -> it
/// - C, POSIX, empty -> None
fn normalize_language(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() || value == "C" || value == "POSIX" || value.starts_with("C.") {
        return None;
    }

    let lang: String = value
        .chars()
        .take(2)
        .filter(char::is_ascii_alphabetic)
        .collect::<String>()
        .to_ascii_lowercase();

    (lang.len() == 2).then_some(lang)
}
