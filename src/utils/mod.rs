//! Common utilities and helper functions
//!
//! This module provides shared utilities used across the application.

pub mod error;

use regex::Regex;
use std::sync::OnceLock;

/// Normalize whitespace in text
pub fn normalize_whitespace(text: &str) -> String {
    static WHITESPACE_RE: OnceLock<Regex> = OnceLock::new();

    let re = WHITESPACE_RE.get_or_init(|| Regex::new(r"\s+").expect("Invalid regex pattern"));

    re.replace_all(text.trim(), " ").to_string()
}

/// Remove every whitespace character, including full-width spaces
pub fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Parse the leading integer of a string, ignoring any trailing text
///
/// `"800元"` parses as 800; `"免費"` and `""` do not parse.
pub fn parse_leading_int(text: &str) -> Option<i64> {
    static LEADING_INT_RE: OnceLock<Regex> = OnceLock::new();

    let re = LEADING_INT_RE
        .get_or_init(|| Regex::new(r"^[+-]?\d+").expect("Invalid regex pattern"));

    re.find(text.trim())
        .and_then(|m| m.as_str().parse::<i64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  hello   world  "), "hello world");
        assert_eq!(normalize_whitespace("hello\n\nworld"), "hello world");
    }

    #[test]
    fn test_strip_whitespace() {
        assert_eq!(strip_whitespace(" 01月05日 ~\n01月20日 "), "01月05日~01月20日");
        assert_eq!(strip_whitespace("已\u{3000}截止"), "已截止");
    }

    #[test]
    fn test_parse_leading_int() {
        assert_eq!(parse_leading_int("800"), Some(800));
        assert_eq!(parse_leading_int(" 1200元 "), Some(1200));
        assert_eq!(parse_leading_int("3000人"), Some(3000));
        assert_eq!(parse_leading_int("免費"), None);
        assert_eq!(parse_leading_int(""), None);
    }
}
