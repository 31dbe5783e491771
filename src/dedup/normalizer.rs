//! Content normalization for stable comparison.
//!
//! Canonical text is what gets hashed and scored, so two captures of the
//! same content must normalize byte-identically even when they differ in
//! casing, whitespace, or embedded timestamps.

use regex::Regex;
use std::sync::LazyLock;

static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}").expect("static regex: date pattern"));

static TIME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{2}:\d{2}:\d{2}").expect("static regex: time pattern"));

/// Canonicalizes raw text for comparison.
///
/// Steps, in order:
/// 1. Strip `YYYY-MM-DD` date-like and `HH:MM:SS` time-like substrings,
///    repeating until a fixed point (a removal can splice two halves of a
///    new match together)
/// 2. Lowercase
/// 3. Collapse whitespace runs to single spaces and trim the edges
///
/// Pure and deterministic, and idempotent:
/// `normalize(normalize(x)) == normalize(x)`.
///
/// # Example
///
/// ```rust
/// use knowsync::normalize;
///
/// assert_eq!(normalize("  Standup   notes 2024-03-01  "), "standup notes");
/// assert_eq!(normalize(""), "");
/// ```
#[must_use]
pub fn normalize(text: &str) -> String {
    let mut stripped = text.to_string();
    loop {
        let pass = DATE_PATTERN.replace_all(&stripped, "");
        let pass = TIME_PATTERN.replace_all(&pass, "").into_owned();
        if pass == stripped {
            break;
        }
        stripped = pass;
    }

    stripped
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
