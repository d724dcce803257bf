//! Directive resolution over a document tree.
//!
//! The resolver walks the tree depth-first in document order. Each directive
//! with a registered handler is replaced by whatever the handler returns:
//! markdown is parsed by the document's parser and spliced in place of the
//! directive, so directives inside the inserted fragment are resolved too.
//!
//! Traversal uses an explicit stack of frames instead of recursion. A frame
//! owns the detached child list of one node together with the origin of every
//! child: its inclusion depth and the file it was parsed from. Splicing is a
//! plain `Vec::splice`, and the depth guard and diagnostics travel with the
//! nodes they describe.

use std::io;
use std::iter;
use std::mem;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use partials_ast::{MarkdownParser, Node};

use crate::{
    Diagnostic, DirectiveContext, DirectiveOutput, ReadFileFn, Registry, ResolveError, Severity,
};

/// Default maximum inclusion depth.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Configuration for the resolver.
pub struct ResolverConfig {
    /// Base directory that `file` attributes resolve against.
    pub content_root: PathBuf,
    /// Path of the document being resolved (if known).
    pub source_path: Option<PathBuf>,
    /// Callback to read files.
    ///
    /// Default: `std::fs::read_to_string`
    pub read_file: Option<Box<ReadFileFn>>,
    /// Maximum inclusion depth. A directive with a handler at this depth
    /// aborts the document before its handler runs.
    ///
    /// Default: 10
    pub max_depth: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ResolverConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            content_root: PathBuf::from("."),
            source_path: None,
            read_file: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Set the content root.
    #[must_use]
    pub fn with_content_root(mut self, content_root: impl Into<PathBuf>) -> Self {
        self.content_root = content_root.into();
        self
    }

    /// Set the source document path.
    #[must_use]
    pub fn with_source_path(mut self, source_path: impl Into<PathBuf>) -> Self {
        self.source_path = Some(source_path.into());
        self
    }

    /// Set the file reading callback.
    #[must_use]
    pub fn with_read_file<F>(mut self, read_file: F) -> Self
    where
        F: Fn(&Path) -> io::Result<String> + Send + Sync + 'static,
    {
        self.read_file = Some(Box::new(read_file));
        self
    }

    /// Set the maximum inclusion depth.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    fn reader(&self) -> &ReadFileFn {
        match &self.read_file {
            Some(read_file) => read_file.as_ref(),
            None => &default_read_file,
        }
    }
}

/// Default file reading function.
fn default_read_file(path: &Path) -> io::Result<String> {
    std::fs::read_to_string(path)
}

/// Outcome of resolving one document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Problems with individual directives, in document order.
    pub diagnostics: Vec<Diagnostic>,
    /// Number of directives replaced by parsed markdown.
    pub expanded: usize,
    /// Number of directives removed (by the handler or after a failure).
    pub removed: usize,
}

impl Resolution {
    /// Check if any error diagnostic was recorded.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    /// Number of error diagnostics.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    /// Number of warning diagnostics.
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }
}

/// A parsed and resolved document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedDocument {
    /// Resolved tree.
    pub tree: Node,
    /// Diagnostics and counters.
    pub resolution: Resolution,
}

/// Resolves directives in document trees.
///
/// The resolver only reads its registry, so a single resolver can process
/// many documents concurrently.
///
/// # Example
///
/// ```
/// use partials_directives::{Registry, Resolver, ResolverConfig};
///
/// let registry = Registry::builtin();
/// let config = ResolverConfig::new()
///     .with_content_root("/content")
///     .with_read_file(|_| Ok("## Shared\n\nShared text.".to_owned()));
/// let resolver = Resolver::with_config(&registry, config);
///
/// let document = resolver.resolve_str("# Intro\n::include{file=shared.md}").unwrap();
/// let types: Vec<&str> = document.tree.children.iter().map(|n| n.node_type()).collect();
///
/// assert_eq!(types, vec!["heading", "heading", "paragraph"]);
/// assert_eq!(document.resolution.expanded, 1);
/// ```
pub struct Resolver<'r> {
    registry: &'r Registry,
    parser: MarkdownParser,
    config: ResolverConfig,
}

impl<'r> Resolver<'r> {
    /// Create a resolver with default configuration.
    #[must_use]
    pub fn new(registry: &'r Registry) -> Self {
        Self::with_config(registry, ResolverConfig::default())
    }

    /// Create a resolver with custom configuration.
    #[must_use]
    pub fn with_config(registry: &'r Registry, config: ResolverConfig) -> Self {
        Self {
            registry,
            parser: MarkdownParser::new(),
            config,
        }
    }

    /// Use a different parser for documents and handler output.
    #[must_use]
    pub fn with_parser(mut self, parser: MarkdownParser) -> Self {
        self.parser = parser;
        self
    }

    /// Resolver configuration.
    #[must_use]
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Parser used for documents and handler output.
    #[must_use]
    pub fn parser(&self) -> &MarkdownParser {
        &self.parser
    }

    /// Resolve every directive in `tree` in place.
    ///
    /// Handler failures are reported in [`Resolution::diagnostics`] and never
    /// abort the document. Exceeding the inclusion depth does: the tree is
    /// left partially resolved and [`ResolveError::RecursionLimitExceeded`]
    /// is returned.
    pub fn resolve(&self, tree: &mut Node) -> Result<Resolution, ResolveError> {
        self.run(tree, self.config.source_path.as_deref())
    }

    /// Parse `markdown` and resolve it.
    pub fn resolve_str(&self, markdown: &str) -> Result<ResolvedDocument, ResolveError> {
        let mut tree = self.parser.parse(markdown);
        let resolution = self.resolve(&mut tree)?;
        Ok(ResolvedDocument { tree, resolution })
    }

    /// Read the document at `path` and resolve it.
    pub fn resolve_file(&self, path: &Path) -> Result<ResolvedDocument, ResolveError> {
        let markdown = (self.config.reader())(path).map_err(|source| ResolveError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut tree = self.parser.parse(&markdown);
        let resolution = self.run(&mut tree, Some(path))?;
        Ok(ResolvedDocument { tree, resolution })
    }

    fn run(&self, tree: &mut Node, source: Option<&Path>) -> Result<Resolution, ResolveError> {
        let mut resolution = Resolution::default();
        let origin = Origin {
            depth: 0,
            source: source.map(Rc::from),
        };
        let mut stack = vec![Frame::new(
            mem::take(&mut tree.children),
            &origin,
            tree.node_type(),
        )];

        while let Some(frame) = stack.last_mut() {
            let index = frame.index;
            if index == frame.children.len() {
                close_frame(&mut stack, tree);
                continue;
            }

            let origin = &frame.origins[index];
            let node = &frame.children[index];
            let step = self.visit(node, index, frame.parent_type, origin, &mut resolution);

            match step {
                Ok(Step::Continue) if frame.children[index].children.is_empty() => {
                    frame.index += 1;
                }
                Ok(Step::Continue) => {
                    let origin = frame.origins[index].clone();
                    let node = &mut frame.children[index];
                    let parent_type = node.node_type();
                    let children = mem::take(&mut node.children);
                    stack.push(Frame::new(children, &origin, parent_type));
                }
                Ok(Step::Remove) => {
                    frame.children.remove(index);
                    frame.origins.remove(index);
                    resolution.removed += 1;
                }
                Ok(Step::Splice(nodes, origin)) => {
                    let count = nodes.len();
                    frame.children.splice(index..=index, nodes);
                    frame
                        .origins
                        .splice(index..=index, iter::repeat_n(origin, count));
                    resolution.expanded += 1;
                }
                Err(err) => {
                    while !stack.is_empty() {
                        close_frame(&mut stack, tree);
                    }
                    return Err(err);
                }
            }
        }

        Ok(resolution)
    }

    /// Dispatch one node to its handler, if it is a directive that has one.
    fn visit(
        &self,
        node: &Node,
        index: usize,
        parent_type: &'static str,
        origin: &Origin,
        resolution: &mut Resolution,
    ) -> Result<Step, ResolveError> {
        let Some((kind, directive)) = node.directive() else {
            return Ok(Step::Continue);
        };
        let Some(handler) = self.registry.lookup(kind, &directive.name) else {
            tracing::debug!(
                kind = %kind,
                name = %directive.name,
                line = directive.line,
                "No handler for directive, leaving it in place"
            );
            return Ok(Step::Continue);
        };

        if origin.depth >= self.config.max_depth {
            return Err(ResolveError::RecursionLimitExceeded {
                limit: self.config.max_depth,
                directive: directive.to_syntax(),
                file: origin.source.as_deref().map(Path::to_path_buf),
                line: directive.line,
            });
        }

        tracing::debug!(
            kind = %kind,
            name = %directive.name,
            line = directive.line,
            depth = origin.depth,
            "Processing directive"
        );

        let ctx = DirectiveContext {
            index,
            parent_type,
            depth: origin.depth,
            children: &node.children,
            parser: &self.parser,
            content_root: &self.config.content_root,
            source_path: origin.source.as_deref(),
            read_file: self.config.reader(),
        };

        match handler.process(directive, &ctx) {
            Ok(DirectiveOutput::Markdown(markdown)) => {
                let nodes = self.parser.parse(&markdown).children;
                Ok(Step::Splice(nodes, origin.nested(origin.source.clone())))
            }
            Ok(DirectiveOutput::Included { path, markdown }) => {
                let nodes = self.parser.parse(&markdown).children;
                Ok(Step::Splice(nodes, origin.nested(Some(Rc::from(path)))))
            }
            Ok(DirectiveOutput::Remove) => Ok(Step::Remove),
            Ok(DirectiveOutput::Skip) => Ok(Step::Continue),
            Err(err) => {
                let source = origin.source.as_deref();
                let diagnostic = Diagnostic::from_error(&err, kind, directive, source);
                diagnostic.emit();
                resolution.diagnostics.push(diagnostic);
                Ok(Step::Remove)
            }
        }
    }
}

/// What to do with the node under the cursor.
enum Step {
    /// Keep the node and visit its children.
    Continue,
    /// Drop the node.
    Remove,
    /// Replace the node with these nodes and visit them next.
    Splice(Vec<Node>, Origin),
}

/// Where a node came from.
#[derive(Clone)]
struct Origin {
    /// Inclusion depth: 0 for the document's own nodes.
    depth: usize,
    /// File the node was parsed from.
    source: Option<Rc<Path>>,
}

impl Origin {
    /// Origin of nodes produced by a directive with this origin.
    fn nested(&self, source: Option<Rc<Path>>) -> Self {
        Self {
            depth: self.depth + 1,
            source,
        }
    }
}

/// Detached child list of one node being traversed.
struct Frame {
    children: Vec<Node>,
    /// Origin of each child.
    origins: Vec<Origin>,
    parent_type: &'static str,
    index: usize,
}

impl Frame {
    fn new(children: Vec<Node>, origin: &Origin, parent_type: &'static str) -> Self {
        let origins = vec![origin.clone(); children.len()];
        Self {
            children,
            origins,
            parent_type,
            index: 0,
        }
    }
}

/// Pop the innermost frame and give its children back to their owner.
fn close_frame(stack: &mut Vec<Frame>, tree: &mut Node) {
    let Some(done) = stack.pop() else {
        return;
    };
    match stack.last_mut() {
        Some(parent) => {
            parent.children[parent.index].children = done.children;
            parent.index += 1;
        }
        None => tree.children = done.children,
    }
}
