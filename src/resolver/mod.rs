//! Key resolution
//!
//! The [`Resolver`] turns `(locale, key, args)` into display text using the
//! catalog's last good dictionary for that locale.
//!
//! # Algorithm
//!
//! 1. No dictionary for the locale → the key itself.
//! 2. Look the key up (exact key, then dotted path); a miss → the key itself.
//! 3. A selection map is narrowed to one alternative ([`select`]); a plain
//!    key group → the key itself.
//! 4. Placeholders are interpolated ([`interpolate`]).
//!
//! Returning the key keeps missing translations visible in the UI instead of
//! rendering blanks.

pub mod interpolate;
pub mod select;

use std::fmt;
use std::sync::Arc;

use crate::catalog::{Entry, TranslationCatalog};
use crate::locale::Locale;

pub use interpolate::interpolate;
pub use select::select;

/// Value of a translation argument
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

macro_rules! impl_number_arg {
    ($($t:ty),*) => {
        $(impl From<$t> for ArgValue {
            fn from(n: $t) -> Self {
                Self::Number(n as f64)
            }
        })*
    };
}

impl_number_arg!(i8, i16, i32, i64, u8, u16, u32, u64, usize, isize, f32, f64);

impl From<&str> for ArgValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&String> for ArgValue {
    fn from(s: &String) -> Self {
        Self::Text(s.clone())
    }
}

/// Named translation arguments, in insertion order
///
/// # Example
///
/// ```rust
/// use lingo::resolver::Args;
///
/// let args = Args::new().with("name", "Ada").with("n", 3);
/// assert_eq!(args.get("n").map(|v| v.to_string()), Some("3".to_string()));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    values: Vec<(String, ArgValue)>,
    selector: Option<String>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an argument
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ArgValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Name the argument that drives plural/category selection
    #[must_use]
    pub fn select_by(mut self, name: impl Into<String>) -> Self {
        self.selector = Some(name.into());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ArgValue>) {
        let name = name.into();
        let value = value.into();
        match self.values.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.values.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn selector(&self) -> Option<&str> {
        self.selector.as_deref()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArgValue)> {
        self.values.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Parse a `name=value` pair; numeric values become numbers
    pub fn parse_pair(pair: &str) -> Option<(String, ArgValue)> {
        let (name, raw) = pair.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let value = raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map_or_else(|| ArgValue::Text(raw.to_string()), ArgValue::Number);
        Some((name.to_string(), value))
    }
}

impl<K: Into<String>, V: Into<ArgValue>> FromIterator<(K, V)> for Args {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut args = Self::new();
        for (k, v) in iter {
            args.insert(k, v);
        }
        args
    }
}

/// Computes display strings from the catalog
#[derive(Debug, Clone)]
pub struct Resolver {
    catalog: Arc<TranslationCatalog>,
}

impl Resolver {
    pub fn new(catalog: Arc<TranslationCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Arc<TranslationCatalog> {
        &self.catalog
    }

    /// Resolve `key` for `locale`; never fails, falling back to the key
    pub fn resolve(&self, locale: Option<&Locale>, key: &str, args: &Args) -> String {
        let Some(dictionary) = locale.and_then(|l| self.catalog.dictionary(l)) else {
            return key.to_string();
        };

        match dictionary.get(key) {
            Some(entry) => Self::render(entry, key, args),
            None => {
                tracing::trace!(key, "Missing translation, returning key");
                key.to_string()
            }
        }
    }

    /// Render an already looked-up entry
    pub fn render(entry: &Entry, key: &str, args: &Args) -> String {
        let template = match entry {
            Entry::Text(text) => Some(text.as_str()),
            Entry::Map(map) if select::is_selection_map(map, args) => select(map, args),
            Entry::Map(_) => None,
        };

        template.map_or_else(|| key.to_string(), |t| interpolate(t, args))
    }
}
