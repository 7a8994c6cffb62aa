//! Whitespace normalization of raw page text.

use regex::Regex;
use std::sync::OnceLock;

fn blank_lines_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\n\s*)+\n").expect("blank lines regex"))
}

fn horizontal_ws_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[ \t]+").expect("horizontal whitespace regex"))
}

/// Collapses blank-line runs into one newline and space/tab runs into one
/// space. Case, punctuation and every other character are left alone.
pub fn normalize(raw: &str) -> String {
    let text = blank_lines_re().replace_all(raw, "\n");
    horizontal_ws_re().replace_all(&text, " ").into_owned()
}
