//! Directive attribute parsing.
//!
//! Parses the inside of `{#id .class key="value" flag}`.

use std::collections::BTreeMap;

/// Parse an attributes string (without braces) into a map.
///
/// - `#id` sets `id` (last one wins)
/// - `.class` is appended to `class`, space-separated
/// - `key="value"`, `key='value'` and `key=value` set `key`
/// - a bare `key` sets `key` to the empty string
pub(crate) fn parse_attributes(attrs_str: &str) -> BTreeMap<String, String> {
    let mut attrs = BTreeMap::new();
    let mut classes: Vec<&str> = Vec::new();
    let mut remaining = attrs_str.trim();

    while !remaining.is_empty() {
        if let Some(rest) = remaining.strip_prefix('#') {
            let end = shorthand_end(rest);
            if end > 0 {
                attrs.insert("id".to_owned(), rest[..end].to_owned());
            }
            remaining = &rest[end..];
        } else if let Some(rest) = remaining.strip_prefix('.') {
            let end = shorthand_end(rest);
            if end > 0 {
                classes.push(&rest[..end]);
            }
            remaining = &rest[end..];
        } else if let Some((key, value, rest)) = parse_key_value(remaining) {
            attrs.insert(key.to_owned(), value.to_owned());
            remaining = rest;
        } else {
            // Skip unrecognized character
            let skip = remaining.chars().next().map_or(1, char::len_utf8);
            remaining = &remaining[skip..];
        }
        remaining = remaining.trim_start();
    }

    if !classes.is_empty() {
        attrs.insert("class".to_owned(), classes.join(" "));
    }

    attrs
}

/// End of an `#id` or `.class` shorthand token.
fn shorthand_end(s: &str) -> usize {
    s.find(|c: char| c.is_whitespace() || c == '.' || c == '#')
        .unwrap_or(s.len())
}

/// Parse a key-value pair or a bare key from the start of `s`.
///
/// Returns `(key, value, rest)`.
fn parse_key_value(s: &str) -> Option<(&str, &str, &str)> {
    let key_end = s
        .find(|c: char| c.is_whitespace() || c == '=' || c == '"' || c == '\'')
        .unwrap_or(s.len());
    let key = &s[..key_end];

    if key.is_empty() || key.starts_with('#') || key.starts_with('.') {
        return None;
    }

    let after_key = s[key_end..].trim_start();
    let Some(after_eq) = after_key.strip_prefix('=') else {
        // Bare key: `{hidden}`
        return Some((key, "", &s[key_end..]));
    };
    let after_eq = after_eq.trim_start();

    if let Some(stripped) = after_eq.strip_prefix('"') {
        let end_quote = stripped.find('"')?;
        Some((key, &stripped[..end_quote], &stripped[end_quote + 1..]))
    } else if let Some(stripped) = after_eq.strip_prefix('\'') {
        let end_quote = stripped.find('\'')?;
        Some((key, &stripped[..end_quote], &stripped[end_quote + 1..]))
    } else {
        let end = after_eq.find(char::is_whitespace).unwrap_or(after_eq.len());
        Some((key, &after_eq[..end], &after_eq[end..]))
    }
}
