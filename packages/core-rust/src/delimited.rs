//! Naive comma-delimited list parsing for configuration values.
//!
//! This is not a CSV parser: there is no quoting and no escaping, so every
//! comma is a separator. Settings passed through here must never need an
//! embedded comma.

use std::sync::OnceLock;

use regex::Regex;

/// Comma with any amount of surrounding whitespace.
fn separator() -> &'static Regex {
    static SEPARATOR: OnceLock<Regex> = OnceLock::new();
    SEPARATOR.get_or_init(|| Regex::new(r"\s*,\s*").expect("separator pattern is valid"))
}

/// Splits a raw setting into an ordered list of trimmed tokens.
///
/// Absent, empty, and whitespace-only input all yield an empty list. Empty
/// tokens between adjacent commas, and at the start, are kept, so `"a,,b"`
/// gives three tokens. Trailing empty tokens are dropped: `"a,b,"` gives two.
#[must_use]
pub fn parse_delimited_list(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Vec::new();
    };

    let mut tokens: Vec<String> = separator().split(raw).map(str::to_string).collect();
    while tokens.last().is_some_and(String::is_empty) {
        tokens.pop();
    }
    tokens
}
