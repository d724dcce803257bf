//! Directive output types.

use std::path::PathBuf;

/// Output from a directive handler.
///
/// - [`Markdown`](Self::Markdown): parsed by the document's parser and spliced
///   in place of the directive; nested directives in it are resolved too
/// - [`Included`](Self::Included): like `Markdown`, for text read from a
///   file; problems with directives inside it are reported against that file
/// - [`Remove`](Self::Remove): the directive contributes nothing
/// - [`Skip`](Self::Skip): the handler declines; the directive stays in the tree
///
/// # Example
///
/// ```
/// use partials_directives::DirectiveOutput;
///
/// let output = DirectiveOutput::markdown("# Included\n\nSome text.");
/// assert!(matches!(output, DirectiveOutput::Markdown(_)));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DirectiveOutput {
    /// Markdown to parse and splice in place of the directive.
    Markdown(String),
    /// Markdown read from `path`, spliced like [`Markdown`](Self::Markdown).
    Included {
        /// File the markdown was read from.
        path: PathBuf,
        /// File contents.
        markdown: String,
    },
    /// Remove the directive without replacement.
    Remove,
    /// Leave the directive unchanged.
    Skip,
}

impl DirectiveOutput {
    /// Create a markdown output.
    #[must_use]
    pub fn markdown(s: impl Into<String>) -> Self {
        Self::Markdown(s.into())
    }

    /// Create an output for markdown read from `path`.
    #[must_use]
    pub fn included(path: impl Into<PathBuf>, markdown: impl Into<String>) -> Self {
        Self::Included {
            path: path.into(),
            markdown: markdown.into(),
        }
    }
}
