//! Common utilities and helper functions
//!
//! This module provides shared utilities used across the crate.

pub mod error;
pub mod retry;

/// Truncate text to a maximum number of characters, for log fields
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{truncated}...")
    }
}
