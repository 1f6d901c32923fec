//! Plural and category selection
//!
//! A selection map is a dictionary node whose children are alternatives:
//!
//! ```json
//! { "=0": "no items", "=1": "one item", "other": "{n} items" }
//! { "male": "He replied", "female": "She replied", "other": "They replied" }
//! ```
//!
//! The selector argument picks one alternative. Candidates are tried in
//! order: `=<number>`, the exact category word, `zero`/`one` for 0 and 1,
//! then `other`.
//!
//! A map with an `=<value>` key is always a selection map. A map that only
//! has `other` among plain words is one only when a selector argument is
//! present; without arguments it is an ordinary key group, so `menu` with
//! children `file` and `other` resolves to the key `menu`.

use std::collections::BTreeMap;

use super::{ArgValue, Args};
use crate::catalog::Entry;

/// Arguments consulted, in order, when no explicit selector is set
const DEFAULT_SELECTORS: [&str; 2] = ["count", "n"];

/// Key used when nothing more specific matches
pub const OTHER: &str = "other";

/// Whether a map node is used as a selection map for `args` rather than a
/// key group
pub fn is_selection_map(map: &BTreeMap<String, Entry>, args: &Args) -> bool {
    if map.is_empty() || !map.values().all(|e| e.as_text().is_some()) {
        return false;
    }

    map.keys().any(|k| k.starts_with('='))
        || (map.contains_key(OTHER) && selector(args).is_some())
}

/// The argument that drives selection
fn selector<'a>(args: &'a Args) -> Option<&'a ArgValue> {
    if let Some(name) = args.selector() {
        return args.get(name);
    }

    DEFAULT_SELECTORS
        .iter()
        .find_map(|name| args.get(name))
        .or_else(|| args.iter().next().map(|(_, value)| value))
}

/// Pick the alternative for `args`, `None` if nothing (not even `other`) fits
pub fn select<'m>(map: &'m BTreeMap<String, Entry>, args: &Args) -> Option<&'m str> {
    let text = |key: &str| map.get(key).and_then(Entry::as_text);

    let chosen = match selector(args) {
        Some(ArgValue::Number(n)) => {
            let exact = text(&format!("={}", ArgValue::Number(*n)));
            let category = if *n == 0.0 {
                text("zero")
            } else if *n == 1.0 {
                text("one")
            } else {
                None
            };
            exact.or(category)
        }
        Some(ArgValue::Text(word)) => text(&format!("={word}")).or_else(|| text(word)),
        None => None,
    };

    chosen.or_else(|| text(OTHER))
}
