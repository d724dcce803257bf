//! Block-level directive line recognition.
//!
//! A directive line holds nothing but the directive:
//!
//! - `::name[label]{attrs}` is a leaf directive
//! - `:::name[label]{attrs}` opens a container (three or more colons)
//! - a line of three or more colons closes a container

use super::attrs::parse_attributes;
use super::indent_columns;
use crate::Directive;

/// A line recognized as directive syntax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum BlockLine {
    Leaf(Directive),
    ContainerOpen { directive: Directive, colons: usize },
    ContainerClose { colons: usize },
}

/// Recognize a directive line.
///
/// Returns `None` for anything that should be treated as ordinary markdown.
pub(crate) fn parse_block_line(line: &str) -> Option<BlockLine> {
    // Four columns of indentation is an indented code block.
    if indent_columns(line) > 3 {
        return None;
    }

    let trimmed = line.trim();
    if !trimmed.starts_with("::") {
        return None;
    }

    let colons = trimmed.chars().take_while(|&c| c == ':').count();
    let mut rest = &trimmed[colons..];

    if colons >= 3 {
        if rest.is_empty() {
            return Some(BlockLine::ContainerClose { colons });
        }
        rest = rest.trim_start();
    }

    let name_end = rest
        .find(|c: char| c == '[' || c == '{' || c.is_whitespace())
        .unwrap_or(rest.len());
    let name = &rest[..name_end];
    if !is_valid_directive_name(name) {
        return None;
    }

    let mut pos = name_end;
    let (label, consumed) = take_delimited(&rest[pos..], '[', ']')?;
    pos += consumed;
    let (attrs_str, consumed) = take_delimited(&rest[pos..], '{', '}')?;
    pos += consumed;

    // Anything after the directive makes this a plain paragraph line.
    if !rest[pos..].trim().is_empty() {
        return None;
    }

    let directive = Directive {
        name: name.to_owned(),
        label: label.to_owned(),
        attributes: parse_attributes(attrs_str),
        line: 1,
    };

    Some(if colons == 2 {
        BlockLine::Leaf(directive)
    } else {
        BlockLine::ContainerOpen { directive, colons }
    })
}

/// Check if a name is a valid directive name.
///
/// Names start with a letter and contain only alphanumerics, hyphens and underscores.
fn is_valid_directive_name(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_alphabetic)
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
}

/// Take a balanced `open ... close` group from the start of `s`.
///
/// Returns `(inner, bytes_consumed)`: `("", 0)` when `s` does not start with
/// `open`, and `None` when the group is never closed.
fn take_delimited(s: &str, open: char, close: char) -> Option<(&str, usize)> {
    if !s.starts_with(open) {
        return Some(("", 0));
    }

    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                return Some((&s[open.len_utf8()..i], i + close.len_utf8()));
            }
        }
    }

    None
}
