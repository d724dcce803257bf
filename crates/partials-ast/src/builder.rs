//! Tree construction from pulldown-cmark events.
//!
//! Leaf directives are recognized here rather than before parsing. The inline
//! content of each paragraph (and of each tight list item) is split into its
//! source lines; a line whose source text is a complete directive becomes a
//! `leafDirective` node in place, and the remaining lines stay paragraphs.

use std::mem;
use std::ops::Range;

use pulldown_cmark::{CodeBlockKind, CowStr, Event, HeadingLevel, Tag, TagEnd};

use crate::syntax::{BlockLine, column_width, parse_block_line};
use crate::{Directive, Node, NodeKind};

/// An event with its byte range in the parsed source.
type Spanned<'s> = (Event<'s>, Range<usize>);

/// Builds nodes from a pulldown-cmark offset event stream.
///
/// Adjacent text (including soft breaks) is merged into a single text node so
/// that equal markdown always produces equal trees.
pub(crate) struct TreeBuilder<'s> {
    source: &'s str,
    /// Line number of the first line of `source`.
    first_line: usize,
    stack: Vec<Node>,
    /// Buffered inline events of the open paragraph or tight list item.
    inline: Vec<Spanned<'s>>,
}

/// One source line of inline content.
struct Line<'s> {
    events: Vec<Spanned<'s>>,
    /// The soft or hard break that ended the line.
    end: Option<Spanned<'s>>,
}

/// A run of inline lines, or a line that turned out to be a directive.
enum Segment<'s> {
    Inline(Vec<Spanned<'s>>),
    Directive(Directive),
}

impl<'s> TreeBuilder<'s> {
    pub(crate) fn new(source: &'s str, first_line: usize) -> Self {
        Self {
            source,
            first_line,
            stack: vec![Node::new(NodeKind::Root)],
            inline: Vec::new(),
        }
    }

    /// Consume the events and return the top-level nodes.
    pub(crate) fn build(mut self, events: impl Iterator<Item = Spanned<'s>>) -> Vec<Node> {
        for (event, range) in events {
            if self.collects_inline() && is_inline(&event) {
                self.inline.push((event, range));
            } else if matches!(event, Event::End(TagEnd::Paragraph)) {
                self.close_paragraph();
            } else {
                self.flush_inline();
                self.event(event);
            }
        }
        self.flush_inline();
        while self.stack.len() > 1 {
            self.close();
        }
        self.stack.pop().map(|root| root.children).unwrap_or_default()
    }

    fn collects_inline(&self) -> bool {
        matches!(
            self.stack.last().map(|node| &node.kind),
            Some(NodeKind::Paragraph | NodeKind::ListItem { .. })
        )
    }

    /// Close the open paragraph, splitting out any directive lines.
    fn close_paragraph(&mut self) {
        let segments = self.take_segments();
        if segments.iter().all(|s| matches!(s, Segment::Inline(_))) {
            for segment in segments {
                self.emit(segment);
            }
            self.close();
            return;
        }

        // The paragraph is replaced by its pieces.
        self.stack.pop();
        for segment in segments {
            if let Segment::Inline(_) = segment {
                self.stack.push(Node::new(NodeKind::Paragraph));
                self.emit(segment);
                self.close();
            } else {
                self.emit(segment);
            }
        }
    }

    /// Emit buffered inline content of a tight list item.
    fn flush_inline(&mut self) {
        if self.inline.is_empty() {
            return;
        }
        for segment in self.take_segments() {
            self.emit(segment);
        }
    }

    fn emit(&mut self, segment: Segment<'s>) {
        match segment {
            Segment::Inline(events) => {
                for (event, _) in events {
                    self.event(event);
                }
            }
            Segment::Directive(directive) => self.append(Node::leaf_directive(directive)),
        }
    }

    fn take_segments(&mut self) -> Vec<Segment<'s>> {
        let mut events = mem::take(&mut self.inline);

        // Task markers belong to the enclosing item, not to a line.
        let markers = events
            .iter()
            .take_while(|(event, _)| matches!(event, Event::TaskListMarker(_)))
            .count();
        for (event, _) in events.drain(..markers) {
            self.event(event);
        }

        let lines = split_lines(events);
        let first_column = lines
            .first()
            .and_then(|line| line.events.first())
            .map(|(_, range)| self.column(range.start));

        let mut segments = Vec::new();
        let mut pending_break = None;
        for line in lines {
            if let Some(directive) = self.directive_line(&line.events, first_column) {
                pending_break = None;
                segments.push(Segment::Directive(directive));
                continue;
            }
            if let Some(Segment::Inline(events)) = segments.last_mut() {
                events.extend(pending_break.take());
                events.extend(line.events);
            } else {
                segments.push(Segment::Inline(line.events));
            }
            pending_break = line.end;
        }
        segments
    }

    /// Recognize a line whose source text is exactly one leaf directive.
    ///
    /// Continuation lines indented four or more columns past the first line
    /// are paragraph text.
    fn directive_line(
        &self,
        events: &[Spanned<'s>],
        first_column: Option<usize>,
    ) -> Option<Directive> {
        let start = events.iter().map(|(_, range)| range.start).min()?;
        let end = events.iter().map(|(_, range)| range.end).max()?;
        let text = self.source.get(start..end)?;
        if text.contains('\n') {
            return None;
        }
        if let Some(first) = first_column
            && self.column(start) > first + 3
        {
            return None;
        }
        match parse_block_line(text)? {
            BlockLine::Leaf(directive) => Some(directive.at_line(self.line_at(start))),
            BlockLine::ContainerOpen { .. } | BlockLine::ContainerClose { .. } => None,
        }
    }

    /// Column of a byte offset within its line.
    fn column(&self, offset: usize) -> usize {
        let before = self.source.get(..offset).unwrap_or_default();
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        column_width(before.get(line_start..).unwrap_or_default())
    }

    fn line_at(&self, offset: usize) -> usize {
        let before = self.source.get(..offset).unwrap_or_default();
        self.first_line + before.bytes().filter(|&b| b == b'\n').count()
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => {
                if !is_ignored_end(&tag) {
                    self.close();
                }
            }
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.push(NodeKind::InlineCode {
                value: code.into_string(),
            }),
            // Math is not enabled; if it ever shows up keep it literal.
            Event::InlineMath(math) | Event::DisplayMath(math) => self.push(NodeKind::InlineCode {
                value: math.into_string(),
            }),
            Event::Html(html) => self.html(html),
            Event::InlineHtml(html) => self.push(NodeKind::Html {
                value: html.into_string(),
            }),
            Event::SoftBreak => self.text("\n"),
            Event::HardBreak => self.push(NodeKind::Break),
            Event::Rule => self.push(NodeKind::ThematicBreak),
            Event::TaskListMarker(checked) => self.mark_task(checked),
            Event::FootnoteReference(label) => self.push(NodeKind::FootnoteReference {
                label: label.into_string(),
            }),
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        let kind = match tag {
            Tag::Paragraph => NodeKind::Paragraph,
            Tag::Heading { level, .. } => NodeKind::Heading {
                depth: heading_level_to_num(level),
            },
            Tag::BlockQuote(_) => NodeKind::Blockquote,
            Tag::CodeBlock(kind) => NodeKind::Code {
                lang: match kind {
                    CodeBlockKind::Fenced(info) => {
                        info.split_whitespace().next().map(str::to_owned)
                    }
                    CodeBlockKind::Indented => None,
                },
                value: String::new(),
            },
            Tag::HtmlBlock => NodeKind::Html {
                value: String::new(),
            },
            Tag::List(start) => NodeKind::List {
                ordered: start.is_some(),
                start,
            },
            Tag::Item => NodeKind::ListItem { checked: None },
            Tag::FootnoteDefinition(label) => NodeKind::FootnoteDefinition {
                label: label.into_string(),
            },
            Tag::Table(_) => NodeKind::Table,
            Tag::TableHead | Tag::TableRow => NodeKind::TableRow,
            Tag::TableCell => NodeKind::TableCell,
            Tag::Emphasis => NodeKind::Emphasis,
            Tag::Strong => NodeKind::Strong,
            Tag::Strikethrough => NodeKind::Delete,
            Tag::Link {
                dest_url, title, ..
            } => NodeKind::Link {
                url: dest_url.into_string(),
                title: non_empty(title),
            },
            Tag::Image {
                dest_url, title, ..
            } => NodeKind::Image {
                url: dest_url.into_string(),
                title: non_empty(title),
            },
            // Not enabled by the parser options; content flows into the parent.
            Tag::DefinitionList
            | Tag::DefinitionListTitle
            | Tag::DefinitionListDefinition
            | Tag::MetadataBlock(_)
            | Tag::Superscript
            | Tag::Subscript => return,
        };
        self.stack.push(Node::new(kind));
    }

    /// Pop the innermost open node and attach it to its parent.
    fn close(&mut self) {
        if self.stack.len() < 2 {
            return;
        }
        let Some(mut node) = self.stack.pop() else {
            return;
        };
        if let NodeKind::Code { value, .. } | NodeKind::Html { value } = &mut node.kind
            && value.ends_with('\n')
        {
            value.pop();
        }
        self.append(node);
    }

    fn push(&mut self, kind: NodeKind) {
        self.append(Node::new(kind));
    }

    fn append(&mut self, node: Node) {
        if let Some(parent) = self.stack.last_mut() {
            parent.children.push(node);
        }
    }

    fn text(&mut self, text: &str) {
        let Some(current) = self.stack.last_mut() else {
            return;
        };

        // Code block content accumulates into the block's value.
        if let NodeKind::Code { value, .. } = &mut current.kind {
            value.push_str(text);
            return;
        }

        if let Some(Node {
            kind: NodeKind::Text { value },
            ..
        }) = current.children.last_mut()
        {
            value.push_str(text);
        } else {
            current.children.push(Node::text(text));
        }
    }

    fn html(&mut self, html: CowStr<'_>) {
        if let Some(Node {
            kind: NodeKind::Html { value },
            ..
        }) = self.stack.last_mut()
        {
            value.push_str(&html);
        } else {
            self.push(NodeKind::Html {
                value: html.into_string(),
            });
        }
    }

    fn mark_task(&mut self, is_checked: bool) {
        let item = self
            .stack
            .iter_mut()
            .rev()
            .find(|node| matches!(node.kind, NodeKind::ListItem { .. }));
        if let Some(Node {
            kind: NodeKind::ListItem { checked },
            ..
        }) = item
        {
            *checked = Some(is_checked);
        }
    }
}

/// Split inline events into source lines at top-level breaks.
fn split_lines(events: Vec<Spanned<'_>>) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    let mut current = Vec::new();
    let mut depth = 0usize;

    for (event, range) in events {
        match event {
            Event::Start(_) => depth += 1,
            Event::End(_) => depth = depth.saturating_sub(1),
            _ => {}
        }
        if depth == 0 && matches!(event, Event::SoftBreak | Event::HardBreak) {
            lines.push(Line {
                events: mem::take(&mut current),
                end: Some((event, range)),
            });
        } else {
            current.push((event, range));
        }
    }

    lines.push(Line {
        events: current,
        end: None,
    });
    lines
}

fn is_inline(event: &Event<'_>) -> bool {
    match event {
        Event::Start(tag) => matches!(
            tag,
            Tag::Emphasis
                | Tag::Strong
                | Tag::Strikethrough
                | Tag::Superscript
                | Tag::Subscript
                | Tag::Link { .. }
                | Tag::Image { .. }
        ),
        Event::End(tag) => matches!(
            tag,
            TagEnd::Emphasis
                | TagEnd::Strong
                | TagEnd::Strikethrough
                | TagEnd::Superscript
                | TagEnd::Subscript
                | TagEnd::Link
                | TagEnd::Image
        ),
        Event::Text(_)
        | Event::Code(_)
        | Event::InlineMath(_)
        | Event::DisplayMath(_)
        | Event::InlineHtml(_)
        | Event::FootnoteReference(_)
        | Event::SoftBreak
        | Event::HardBreak
        | Event::TaskListMarker(_) => true,
        Event::Html(_) | Event::Rule => false,
    }
}

fn is_ignored_end(tag: &TagEnd) -> bool {
    matches!(
        tag,
        TagEnd::DefinitionList
            | TagEnd::DefinitionListTitle
            | TagEnd::DefinitionListDefinition
            | TagEnd::MetadataBlock(_)
            | TagEnd::Superscript
            | TagEnd::Subscript
    )
}

fn non_empty(s: CowStr<'_>) -> Option<String> {
    (!s.is_empty()).then(|| s.into_string())
}

/// Convert heading level enum to number (1-6).
fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
