//! Directive resolution for markdown document trees.
//!
//! A [`Registry`] maps `(directive kind, name)` pairs to handlers. A
//! [`Resolver`] walks a tree produced by [`partials_ast::MarkdownParser`],
//! hands each directive to its handler and splices the parsed result back in
//! place of the directive node.
//!
//! # Handler outcomes
//!
//! - Markdown output is parsed and replaces the directive. Directives in the
//!   new content are resolved as well, up to [`ResolverConfig::max_depth`]
//!   levels of nesting.
//! - [`DirectiveOutput::Included`] is markdown read from a file. Diagnostics
//!   for directives inside it name that file.
//! - [`DirectiveOutput::Remove`] drops the directive.
//! - [`DirectiveOutput::Skip`] leaves it in place.
//! - An error drops the directive and records a [`Diagnostic`].
//!
//! Directives without a handler are left in the tree untouched.
//!
//! # Example
//!
//! ```
//! use partials_ast::DirectiveKind;
//! use partials_directives::{DirectiveOutput, Registry, Resolver, Severity};
//!
//! let mut registry = Registry::builtin();
//! registry.register_fn(DirectiveKind::Leaf, "product", |_, _| {
//!     Ok(DirectiveOutput::markdown("**Partials**"))
//! });
//! let resolver = Resolver::new(&registry);
//!
//! let document = resolver.resolve_str("::product\n::include").unwrap();
//!
//! assert_eq!(document.tree.text_content(), "Partials");
//! assert_eq!(document.resolution.diagnostics[0].severity, Severity::Warning);
//! ```

mod batch;
mod context;
mod diagnostic;
mod error;
mod handler;
mod include;
mod output;
mod registry;
mod resolver;

pub use batch::{DocumentReport, discover_documents, resolve_all};
pub use context::{DirectiveContext, ReadFileFn};
pub use diagnostic::{Diagnostic, Severity};
pub use error::{DirectiveError, ResolveError};
pub use handler::{DirectiveHandler, FnHandler};
pub use include::IncludeDirective;
pub use output::DirectiveOutput;
pub use registry::Registry;
pub use resolver::{DEFAULT_MAX_DEPTH, Resolution, ResolvedDocument, Resolver, ResolverConfig};
