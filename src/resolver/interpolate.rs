//! Placeholder interpolation
//!
//! Replaces `{name}` and `{{ name }}` tokens in a single pass. Tokens with no
//! matching argument are left exactly as written; substituted values are
//! never re-scanned.

use regex::{Captures, Regex};
use std::sync::OnceLock;

use super::Args;

fn placeholder_re() -> &'static Regex {
    static PLACEHOLDER_RE: OnceLock<Regex> = OnceLock::new();

    PLACEHOLDER_RE.get_or_init(|| {
        Regex::new(r"\{\{\s*([A-Za-z0-9_.\-]+)\s*\}\}|\{([A-Za-z0-9_.\-]+)\}")
            .expect("Invalid regex pattern")
    })
}

/// Substitute placeholders in `template` with values from `args`
pub fn interpolate(template: &str, args: &Args) -> String {
    if args.is_empty() || !template.contains('{') {
        return template.to_string();
    }

    placeholder_re()
        .replace_all(template, |caps: &Captures<'_>| {
            let name = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str())
                .unwrap_or_default();

            match args.get(name) {
                Some(value) => value.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}
