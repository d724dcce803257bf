//! Markdown document tree with directive nodes.
//!
//! This crate turns markdown text into an mdast-style [`Node`] tree. On top of
//! the markdown grammar handled by pulldown-cmark it recognizes block
//! directives:
//!
//! - **Leaf** `::name[label]{attrs}` becomes a `leafDirective` node
//! - **Container** `:::name[label]{attrs}` ... `:::` becomes a
//!   `containerDirective` node whose children are the parsed body
//!
//! Directives are never interpreted here; resolving them is the job of the
//! `partials-directives` crate.
//!
//! # Example
//!
//! ```
//! use partials_ast::{DirectiveKind, MarkdownParser};
//!
//! let tree = MarkdownParser::new().parse("::include{file=/shared/setup.md}");
//! let (kind, directive) = tree.children[0].directive().unwrap();
//!
//! assert_eq!(kind, DirectiveKind::Leaf);
//! assert_eq!(directive.name, "include");
//! assert_eq!(directive.attribute("file"), Some("/shared/setup.md"));
//! ```

mod builder;
mod node;
mod parser;
mod syntax;

pub use node::{Directive, DirectiveKind, Node, NodeKind};
pub use parser::MarkdownParser;
