//! Directive syntax recognition.
//!
//! Container directives are found by scanning lines before markdown parsing.
//! Leaf directives are recognized afterwards, on the source lines of
//! paragraphs the markdown parser produced.

mod attrs;
mod fence;
mod line;

pub(crate) use fence::FenceTracker;
pub(crate) use line::{BlockLine, parse_block_line};

/// Width of `text` in columns, with tabs advancing to the next multiple of four.
pub(crate) fn column_width(text: &str) -> usize {
    text.chars()
        .fold(0, |col, c| if c == '\t' { col + 4 - col % 4 } else { col + 1 })
}

/// Columns of leading spaces and tabs.
pub(crate) fn indent_columns(line: &str) -> usize {
    let rest = line.trim_start_matches([' ', '\t']);
    column_width(&line[..line.len() - rest.len()])
}
