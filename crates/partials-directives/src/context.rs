//! Directive processing context.
//!
//! Gives handlers their position in the tree, the parser, and file access
//! rooted at the content directory.

use std::io;
use std::path::{Component, Path, PathBuf};

use partials_ast::{MarkdownParser, Node};

use crate::DirectiveError;

/// Type alias for the file reading callback.
pub type ReadFileFn = dyn Fn(&Path) -> io::Result<String> + Send + Sync;

/// Context provided to a directive handler.
///
/// # Example
///
/// ```
/// use std::path::Path;
/// use partials_ast::MarkdownParser;
/// use partials_directives::DirectiveContext;
///
/// let parser = MarkdownParser::new();
/// let ctx = DirectiveContext {
///     index: 0,
///     parent_type: "root",
///     depth: 0,
///     children: &[],
///     parser: &parser,
///     content_root: Path::new("/site/content"),
///     source_path: None,
///     read_file: &|path| std::fs::read_to_string(path),
/// };
///
/// let resolved = ctx.resolve_path("/partials/intro.md").unwrap();
/// assert_eq!(resolved, Path::new("/site/content/partials/intro.md"));
/// ```
pub struct DirectiveContext<'a> {
    /// Index of the directive node within its parent's children.
    pub index: usize,
    /// Node type of the parent (`"root"` for top-level directives).
    pub parent_type: &'static str,
    /// Inclusion depth of the directive node (0 for the document's own nodes).
    pub depth: usize,
    /// Children of the directive node (the body of a container directive).
    pub children: &'a [Node],
    /// Parser used for the document, and for any markdown the handler returns.
    pub parser: &'a MarkdownParser,
    /// Base directory that file references resolve against.
    pub content_root: &'a Path,
    /// File containing the directive, if known: the document being resolved
    /// or the included file the directive came from.
    pub source_path: Option<&'a Path>,
    /// Callback to read a file.
    pub read_file: &'a ReadFileFn,
}

impl DirectiveContext<'_> {
    /// Resolve a path against the content root.
    ///
    /// The path is always treated as relative to the root: a leading
    /// separator does not make it absolute. `.` components are dropped and
    /// `..` removes the previous component; climbing above the root fails
    /// with [`DirectiveError::PathOutsideRoot`].
    pub fn resolve_path(&self, file: &str) -> Result<PathBuf, DirectiveError> {
        let mut parts = Vec::new();

        for component in Path::new(file).components() {
            match component {
                Component::Normal(part) => parts.push(part),
                Component::ParentDir => {
                    if parts.pop().is_none() {
                        return Err(DirectiveError::PathOutsideRoot {
                            path: file.to_owned(),
                        });
                    }
                }
                Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
            }
        }

        let mut resolved = self.content_root.to_path_buf();
        resolved.extend(parts);
        Ok(resolved)
    }

    /// Read a file using the context's `read_file` callback.
    pub fn read(&self, path: &Path) -> io::Result<String> {
        (self.read_file)(path)
    }

    /// Parse markdown with the document's parser.
    #[must_use]
    pub fn parse(&self, markdown: &str) -> Node {
        self.parser.parse(markdown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_ctx<R>(root: &str, f: impl FnOnce(&DirectiveContext<'_>) -> R) -> R {
        let parser = MarkdownParser::new();
        let ctx = DirectiveContext {
            index: 0,
            parent_type: "root",
            depth: 0,
            children: &[],
            parser: &parser,
            content_root: Path::new(root),
            source_path: None,
            read_file: &|_| Ok("file content".to_owned()),
        };
        f(&ctx)
    }

    #[test]
    fn test_resolve_relative_path() {
        let resolved = with_ctx("/content", |ctx| ctx.resolve_path("example").unwrap());
        assert_eq!(resolved, PathBuf::from("/content/example"));
    }

    #[test]
    fn test_leading_separator_is_root_relative() {
        let (absolute, relative) = with_ctx("/content", |ctx| {
            (
                ctx.resolve_path("/a/b").unwrap(),
                ctx.resolve_path("a/b").unwrap(),
            )
        });

        assert_eq!(absolute, PathBuf::from("/content/a/b"));
        assert_eq!(absolute, relative);
    }

    #[test]
    fn test_dot_components() {
        let resolved = with_ctx("/content", |ctx| ctx.resolve_path("./a/./x/../b.md").unwrap());
        assert_eq!(resolved, PathBuf::from("/content/a/b.md"));
    }

    #[test]
    fn test_parent_escape_rejected() {
        let err = with_ctx("/content", |ctx| ctx.resolve_path("../secret.txt").unwrap_err());
        assert!(
            matches!(err, DirectiveError::PathOutsideRoot { ref path } if path == "../secret.txt")
        );

        let err = with_ctx("/content", |ctx| ctx.resolve_path("/a/../../etc/passwd").unwrap_err());
        assert!(matches!(err, DirectiveError::PathOutsideRoot { .. }));
    }

    #[test]
    fn test_relative_content_root() {
        let resolved = with_ctx("content", |ctx| ctx.resolve_path("/guides/setup.md").unwrap());
        assert_eq!(resolved, PathBuf::from("content/guides/setup.md"));
    }

    #[test]
    fn test_read_file() {
        let result = with_ctx(".", |ctx| ctx.read(Path::new("test.md")).unwrap());
        assert_eq!(result, "file content");
    }

    #[test]
    fn test_read_file_error() {
        let parser = MarkdownParser::new();
        let ctx = DirectiveContext {
            index: 0,
            parent_type: "root",
            depth: 0,
            children: &[],
            parser: &parser,
            content_root: Path::new("."),
            source_path: None,
            read_file: &|_| Err(io::Error::new(io::ErrorKind::NotFound, "not found")),
        };

        assert!(ctx.read(Path::new("missing.md")).is_err());
    }

    #[test]
    fn test_parse_uses_document_parser() {
        let tree = with_ctx(".", |ctx| ctx.parse("# Title"));
        assert_eq!(tree.children[0].node_type(), "heading");
    }
}
