//! Document tree types.
//!
//! The tree mirrors the mdast vocabulary: every [`Node`] has a semantic
//! [`NodeKind`] and an ordered list of children. Directive nodes carry a
//! [`Directive`] with the directive name, optional label and attributes.

use std::collections::BTreeMap;
use std::fmt;

#[cfg(feature = "serde")]
use serde::Serialize;

/// Directive flavor, by the syntax that produced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DirectiveKind {
    /// `::name[label]{attrs}` on a line of its own.
    Leaf,
    /// `:::name[label]{attrs}` followed by a markdown body and a closing `:::`.
    Container,
}

impl DirectiveKind {
    /// Node type string used for this directive flavor.
    #[must_use]
    pub fn node_type(self) -> &'static str {
        match self {
            Self::Leaf => "leafDirective",
            Self::Container => "containerDirective",
        }
    }
}

impl fmt::Display for DirectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.node_type())
    }
}

/// A directive invocation as written in the source.
///
/// # Example
///
/// ```
/// use partials_ast::Directive;
///
/// let directive = Directive::new("include").with_attribute("file", "partials/setup.md");
/// assert_eq!(directive.attribute("file"), Some("partials/setup.md"));
/// assert_eq!(directive.attribute("missing"), None);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Directive {
    /// Directive identifier, e.g. `include`.
    pub name: String,
    /// Content from brackets: `[label]` (empty if not provided).
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "String::is_empty"))]
    pub label: String,
    /// Attributes from braces. `#id` is stored as `id`, `.class` as `class`.
    pub attributes: BTreeMap<String, String>,
    /// 1-based line within the text this node was parsed from.
    pub line: usize,
}

impl Directive {
    /// Create a directive with no label or attributes.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            line: 1,
            ..Self::default()
        }
    }

    /// Add an attribute.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Set the source line.
    #[must_use]
    pub fn at_line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }

    /// Get an attribute value by key.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Reconstruct the `name[label]{attrs}` part of the directive syntax.
    ///
    /// Used in diagnostics to point at the offending directive.
    ///
    /// ```
    /// use partials_ast::Directive;
    ///
    /// let directive = Directive::new("include").with_attribute("file", "a.md");
    /// assert_eq!(directive.to_syntax(), r#"include{file="a.md"}"#);
    /// ```
    #[must_use]
    pub fn to_syntax(&self) -> String {
        let mut result = self.name.clone();

        if !self.label.is_empty() {
            result.push('[');
            result.push_str(&self.label);
            result.push(']');
        }

        if !self.attributes.is_empty() {
            let attrs: Vec<String> = self
                .attributes
                .iter()
                .map(|(key, value)| format!(r#"{key}="{}""#, value.replace('"', r#"\""#)))
                .collect();
            result.push('{');
            result.push_str(&attrs.join(" "));
            result.push('}');
        }

        result
    }
}

/// Semantic category of a node.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "camelCase"))]
pub enum NodeKind {
    Root,
    Paragraph,
    Heading {
        depth: u8,
    },
    ThematicBreak,
    Blockquote,
    List {
        ordered: bool,
        #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
        start: Option<u64>,
    },
    ListItem {
        #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
        checked: Option<bool>,
    },
    Code {
        #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
        lang: Option<String>,
        value: String,
    },
    Html {
        value: String,
    },
    Table,
    TableRow,
    TableCell,
    FootnoteDefinition {
        label: String,
    },
    Text {
        value: String,
    },
    Emphasis,
    Strong,
    Delete,
    InlineCode {
        value: String,
    },
    Break,
    Link {
        url: String,
        #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
        title: Option<String>,
    },
    Image {
        url: String,
        #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
        title: Option<String>,
    },
    FootnoteReference {
        label: String,
    },
    LeafDirective(Directive),
    ContainerDirective(Directive),
}

impl NodeKind {
    /// The mdast type string for this kind (e.g. `"heading"`, `"leafDirective"`).
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Paragraph => "paragraph",
            Self::Heading { .. } => "heading",
            Self::ThematicBreak => "thematicBreak",
            Self::Blockquote => "blockquote",
            Self::List { .. } => "list",
            Self::ListItem { .. } => "listItem",
            Self::Code { .. } => "code",
            Self::Html { .. } => "html",
            Self::Table => "table",
            Self::TableRow => "tableRow",
            Self::TableCell => "tableCell",
            Self::FootnoteDefinition { .. } => "footnoteDefinition",
            Self::Text { .. } => "text",
            Self::Emphasis => "emphasis",
            Self::Strong => "strong",
            Self::Delete => "delete",
            Self::InlineCode { .. } => "inlineCode",
            Self::Break => "break",
            Self::Link { .. } => "link",
            Self::Image { .. } => "image",
            Self::FootnoteReference { .. } => "footnoteReference",
            Self::LeafDirective(_) => DirectiveKind::Leaf.node_type(),
            Self::ContainerDirective(_) => DirectiveKind::Container.node_type(),
        }
    }
}

/// A node in the document tree.
///
/// Equality is structural: two nodes are equal when their kinds, payloads and
/// children are equal.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Node {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub kind: NodeKind,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Vec::is_empty"))]
    pub children: Vec<Node>,
}

impl Node {
    /// Create a node without children.
    #[must_use]
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
        }
    }

    /// Create a node with children.
    #[must_use]
    pub fn with_children(kind: NodeKind, children: Vec<Node>) -> Self {
        Self { kind, children }
    }

    /// Create a document root.
    #[must_use]
    pub fn root(children: Vec<Node>) -> Self {
        Self::with_children(NodeKind::Root, children)
    }

    /// Create a text node.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::new(NodeKind::Text {
            value: value.into(),
        })
    }

    /// Create a leaf directive node.
    #[must_use]
    pub fn leaf_directive(directive: Directive) -> Self {
        Self::new(NodeKind::LeafDirective(directive))
    }

    /// Create a container directive node with its body.
    #[must_use]
    pub fn container_directive(directive: Directive, children: Vec<Node>) -> Self {
        Self::with_children(NodeKind::ContainerDirective(directive), children)
    }

    /// The mdast type string of this node.
    #[must_use]
    pub fn node_type(&self) -> &'static str {
        self.kind.type_name()
    }

    /// The directive carried by this node, if it is a directive node.
    #[must_use]
    pub fn directive(&self) -> Option<(DirectiveKind, &Directive)> {
        match &self.kind {
            NodeKind::LeafDirective(d) => Some((DirectiveKind::Leaf, d)),
            NodeKind::ContainerDirective(d) => Some((DirectiveKind::Container, d)),
            _ => None,
        }
    }

    /// Directive name, for directive nodes.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.directive().map(|(_, d)| d.name.as_str())
    }

    /// Visit this node and all descendants in document order (pre-order).
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Node)) {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            visit(node);
            stack.extend(node.children.iter().rev());
        }
    }

    /// All directives in this subtree, in document order.
    #[must_use]
    pub fn directives(&self) -> Vec<(DirectiveKind, &Directive)> {
        let mut found = Vec::new();
        self.walk(&mut |node| {
            if let Some(directive) = node.directive() {
                found.push(directive);
            }
        });
        found
    }

    /// Concatenated text of all text-bearing descendants.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        self.walk(&mut |node| match &node.kind {
            NodeKind::Text { value }
            | NodeKind::InlineCode { value }
            | NodeKind::Code { value, .. } => text.push_str(value),
            _ => {}
        });
        text
    }
}
