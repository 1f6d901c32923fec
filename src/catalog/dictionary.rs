//! Translation dictionaries
//!
//! A [`Dictionary`] is an explicit tree: every node is either a text leaf or
//! a map of named children. Dotted keys (`home.title`) are resolved by
//! walking the tree one segment at a time, so nested JSON assets and flat
//! assets with dotted keys behave the same.

use serde_json::Value;
use std::collections::BTreeMap;

use crate::utils::error::LoadError;

/// Separator used by dotted key paths
pub const PATH_SEPARATOR: char = '.';

/// A node of a translation dictionary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// Display text, possibly with `{placeholders}`
    Text(String),
    /// Nested group of entries, or a selection map (`=0`, `one`, `other`, ...)
    Map(BTreeMap<String, Entry>),
}

impl Entry {
    /// Text of a leaf, `None` for maps
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Map(_) => None,
        }
    }

    /// Children of a map, `None` for leaves
    pub fn as_map(&self) -> Option<&BTreeMap<String, Entry>> {
        match self {
            Self::Map(map) => Some(map),
            Self::Text(_) => None,
        }
    }

    fn from_json(path: &str, value: Value) -> Result<Self, LoadError> {
        match value {
            Value::String(s) => Ok(Self::Text(s)),
            Value::Number(n) => Ok(Self::Text(n.to_string())),
            Value::Bool(b) => Ok(Self::Text(b.to_string())),
            Value::Object(obj) => {
                let mut map = BTreeMap::new();
                for (key, child) in obj {
                    let child_path = if path.is_empty() {
                        key.clone()
                    } else {
                        format!("{path}{PATH_SEPARATOR}{key}")
                    };
                    map.insert(key, Self::from_json(&child_path, child)?);
                }
                Ok(Self::Map(map))
            }
            Value::Null => Err(LoadError::InvalidFormat(format!("null value at '{path}'"))),
            Value::Array(_) => Err(LoadError::InvalidFormat(format!("array value at '{path}'"))),
        }
    }

    fn to_json(&self) -> Value {
        match self {
            Self::Text(text) => Value::String(text.clone()),
            Self::Map(map) => Value::Object(
                map.iter()
                    .map(|(key, child)| (key.clone(), child.to_json()))
                    .collect(),
            ),
        }
    }

    fn collect_leaves<'a>(&'a self, prefix: &str, out: &mut Vec<(String, &'a str)>) {
        match self {
            Self::Text(text) => out.push((prefix.to_string(), text)),
            Self::Map(map) => {
                for (key, child) in map {
                    let path = if prefix.is_empty() {
                        key.clone()
                    } else {
                        format!("{prefix}{PATH_SEPARATOR}{key}")
                    };
                    child.collect_leaves(&path, out);
                }
            }
        }
    }
}

impl From<&str> for Entry {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Entry {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// Key to entry mapping for one locale
///
/// # Example
///
/// ```rust
/// use lingo::catalog::Dictionary;
///
/// let dict = Dictionary::from_json_str(r#"{"home": {"title": "Welcome"}}"#).unwrap();
/// assert_eq!(dict.get("home.title").and_then(|e| e.as_text()), Some("Welcome"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dictionary {
    root: BTreeMap<String, Entry>,
}

impl Dictionary {
    /// Create an empty dictionary
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a parsed JSON value, which must be an object
    ///
    /// # Errors
    ///
    /// Returns `LoadError::InvalidFormat` for non-object roots and for
    /// `null` or array values anywhere in the tree.
    pub fn from_json(value: Value) -> Result<Self, LoadError> {
        match Entry::from_json("", value)? {
            Entry::Map(root) => Ok(Self { root }),
            Entry::Text(_) => Err(LoadError::InvalidFormat(
                "dictionary root must be a JSON object".to_string(),
            )),
        }
    }

    /// Parse from JSON text
    ///
    /// # Errors
    ///
    /// Returns `LoadError::Json` for malformed JSON and
    /// `LoadError::InvalidFormat` for structurally invalid dictionaries.
    pub fn from_json_str(json: &str) -> Result<Self, LoadError> {
        Self::from_json(serde_json::from_str(json)?)
    }

    /// Serialize back to a JSON object
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.root
                .iter()
                .map(|(key, entry)| (key.clone(), entry.to_json()))
                .collect(),
        )
    }

    /// Insert or replace a top-level entry
    pub fn insert(&mut self, key: impl Into<String>, entry: impl Into<Entry>) {
        self.root.insert(key.into(), entry.into());
    }

    /// Builder-style [`insert`](Self::insert)
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, entry: impl Into<Entry>) -> Self {
        self.insert(key, entry);
        self
    }

    /// Resolve a key
    ///
    /// An exact top-level key wins (flat assets may contain dots in keys);
    /// otherwise the key is split on `.` and walked through nested maps.
    pub fn get(&self, key: &str) -> Option<&Entry> {
        if let Some(entry) = self.root.get(key) {
            return Some(entry);
        }
        if !key.contains(PATH_SEPARATOR) {
            return None;
        }

        let mut segments = key.split(PATH_SEPARATOR);
        let first = segments.next()?;
        segments.try_fold(self.root.get(first)?, |node, segment| {
            node.as_map()?.get(segment)
        })
    }

    /// Overlay another dictionary; entries of `other` win, maps merge recursively
    pub fn merge(&mut self, other: Dictionary) {
        merge_maps(&mut self.root, other.root);
    }

    /// All scalar leaves as `(dotted.path, text)` pairs, sorted by path
    pub fn flatten(&self) -> Vec<(String, &str)> {
        let mut out = Vec::new();
        for (key, entry) in &self.root {
            entry.collect_leaves(key, &mut out);
        }
        out
    }

    /// Flattened leaf paths, sorted
    pub fn keys(&self) -> Vec<String> {
        self.flatten().into_iter().map(|(path, _)| path).collect()
    }

    /// Number of scalar leaves
    pub fn len(&self) -> usize {
        self.flatten().len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }
}

impl<K: Into<String>, V: Into<Entry>> FromIterator<(K, V)> for Dictionary {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            root: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

fn merge_maps(base: &mut BTreeMap<String, Entry>, overlay: BTreeMap<String, Entry>) {
    for (key, incoming) in overlay {
        match incoming {
            Entry::Map(children) => {
                if let Some(Entry::Map(existing)) = base.get_mut(&key) {
                    merge_maps(existing, children);
                } else {
                    base.insert(key, Entry::Map(children));
                }
            }
            text => {
                base.insert(key, text);
            }
        }
    }
}
