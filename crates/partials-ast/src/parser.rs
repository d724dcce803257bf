//! Markdown parser producing a [`Node`] tree with directive nodes.

use pulldown_cmark::{BrokenLink, CowStr, Options, Parser, RefDefs};

use crate::builder::TreeBuilder;
use crate::syntax::{BlockLine, FenceTracker, parse_block_line};
use crate::{Directive, Node};

/// Markdown parser with directive support.
///
/// Parsing happens in two layers:
///
/// 1. Lines are scanned for container directives (outside fenced code). A
///    container becomes a `containerDirective` node whose body is parsed
///    recursively.
/// 2. Everything else is parsed with pulldown-cmark. A paragraph line that
///    holds nothing but a leaf directive becomes a `leafDirective` node where
///    it stands, so directives keep their place inside list items and
///    blockquotes.
///
/// Link reference definitions apply to the whole document, including the
/// bodies of containers.
///
/// The parser holds no per-document state, so one instance can be shared by
/// any number of threads.
///
/// # Example
///
/// ```
/// use partials_ast::MarkdownParser;
///
/// let tree = MarkdownParser::new().parse("# Intro\n::include{file=setup.md}\n## Next");
/// let types: Vec<&str> = tree.children.iter().map(|n| n.node_type()).collect();
/// assert_eq!(types, vec!["heading", "leafDirective", "heading"]);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct MarkdownParser {
    options: Options,
}

impl Default for MarkdownParser {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownParser {
    /// Create a parser with GitHub Flavored Markdown extensions enabled
    /// (tables, strikethrough, task lists, footnotes).
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(
            Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_FOOTNOTES
                | Options::ENABLE_GFM,
        )
    }

    /// Create a parser for plain `CommonMark`.
    #[must_use]
    pub fn commonmark() -> Self {
        Self::with_options(Options::empty())
    }

    /// Create a parser with explicit pulldown-cmark options.
    #[must_use]
    pub fn with_options(options: Options) -> Self {
        Self { options }
    }

    /// Options passed to pulldown-cmark.
    #[must_use]
    pub fn options(&self) -> Options {
        self.options
    }

    /// Parse markdown into a `root` node.
    #[must_use]
    pub fn parse(&self, markdown: &str) -> Node {
        let document = Parser::new_ext(markdown, self.options);
        let links = document.reference_definitions();

        let mut root = Node::root(Vec::new());
        self.parse_blocks(markdown, 1, links, &mut root.children);
        root
    }

    /// Parse `input`, whose first line is `first_line` in the original text,
    /// appending the resulting nodes to `out`.
    fn parse_blocks(
        &self,
        input: &str,
        first_line: usize,
        links: &RefDefs<'_>,
        out: &mut Vec<Node>,
    ) {
        let lines: Vec<&str> = input.lines().collect();
        let mut fence = FenceTracker::new();
        let mut pending = String::new();
        let mut pending_line = first_line;
        let mut idx = 0;

        while idx < lines.len() {
            let line = lines[idx];

            if !fence.is_literal(line)
                && let Some(BlockLine::ContainerOpen { directive, colons }) = parse_block_line(line)
            {
                let line_num = first_line + idx;
                self.flush(&mut pending, pending_line, links, out);
                let (body_end, closed) = find_container_end(&lines, idx + 1, colons);
                let body = lines[idx + 1..body_end].join("\n");
                out.push(self.container(directive.at_line(line_num), &body, line_num + 1, links));
                idx = if closed { body_end + 1 } else { body_end };
                pending_line = first_line + idx;
                continue;
            }

            // Leaf directives and stray closing fences go to pulldown-cmark.
            push_line(&mut pending, line);
            idx += 1;
        }

        self.flush(&mut pending, pending_line, links, out);
    }

    fn container(
        &self,
        directive: Directive,
        body: &str,
        first_line: usize,
        links: &RefDefs<'_>,
    ) -> Node {
        let mut children = Vec::new();
        self.parse_blocks(body, first_line, links, &mut children);
        Node::container_directive(directive, children)
    }

    /// Parse accumulated markdown starting at `first_line` and append its nodes.
    fn flush(
        &self,
        pending: &mut String,
        first_line: usize,
        links: &RefDefs<'_>,
        out: &mut Vec<Node>,
    ) {
        if !pending.trim().is_empty() {
            let parser = Parser::new_with_broken_link_callback(
                pending.as_str(),
                self.options,
                Some(document_links(links)),
            );
            let builder = TreeBuilder::new(pending.as_str(), first_line);
            out.extend(builder.build(parser.into_offset_iter()));
        }
        pending.clear();
    }
}

fn push_line(pending: &mut String, line: &str) {
    pending.push_str(line);
    pending.push('\n');
}

/// Resolve references whose definition lives elsewhere in the document.
fn document_links<'input>(
    links: &RefDefs<'_>,
) -> impl FnMut(BrokenLink<'input>) -> Option<(CowStr<'input>, CowStr<'input>)> {
    move |link| {
        let def = links.get(&link.reference)?;
        let url = def.dest.clone().into_string();
        let title = def.title.clone().map(CowStr::into_string).unwrap_or_default();
        Some((url.into(), title.into()))
    }
}

/// Find the line that closes a container opened just before `start`.
///
/// Nested containers are matched first. Returns `(end, closed)` where `end`
/// is the index of the closing line, or `lines.len()` when the container runs
/// to the end of the input.
fn find_container_end(lines: &[&str], start: usize, colons: usize) -> (usize, bool) {
    let mut fence = FenceTracker::new();
    let mut open: Vec<usize> = Vec::new();

    for (offset, line) in lines[start..].iter().enumerate() {
        if fence.is_literal(line) {
            continue;
        }
        match parse_block_line(line) {
            Some(BlockLine::ContainerOpen { colons: inner, .. }) => open.push(inner),
            Some(BlockLine::ContainerClose { colons: count }) => match open.last() {
                Some(&inner) if count >= inner => {
                    open.pop();
                }
                Some(_) => {}
                None if count >= colons => return (start + offset, true),
                None => {}
            },
            _ => {}
        }
    }

    (lines.len(), false)
}
