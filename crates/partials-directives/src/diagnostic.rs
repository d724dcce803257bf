//! Structured diagnostics emitted while resolving directives.

use std::fmt;
use std::path::{Path, PathBuf};

use partials_ast::{Directive, DirectiveKind};

use crate::DirectiveError;

/// Diagnostic severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => f.write_str("warning"),
            Self::Error => f.write_str("error"),
        }
    }
}

/// A problem with one directive.
///
/// Diagnostics are reported, never acted upon: the directive that produced
/// one has already been removed from the tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// How serious the problem is.
    pub severity: Severity,
    /// Short category, e.g. `missing-attribute`.
    pub code: &'static str,
    /// Human-readable description including the underlying cause.
    pub message: String,
    /// Directive syntax, e.g. `::include{file="a.md"}`.
    pub directive: String,
    /// File that contains the directive: the document, or the included file
    /// the directive came from. `None` for documents parsed from a string.
    pub source: Option<PathBuf>,
    /// Line of the directive within `source`.
    pub line: usize,
}

impl Diagnostic {
    pub(crate) fn from_error(
        err: &DirectiveError,
        kind: DirectiveKind,
        directive: &Directive,
        source: Option<&Path>,
    ) -> Self {
        let colons = match kind {
            DirectiveKind::Leaf => "::",
            DirectiveKind::Container => ":::",
        };
        Self {
            severity: err.severity(),
            code: err.code(),
            message: err.to_string(),
            directive: format!("{colons}{}", directive.to_syntax()),
            source: source.map(Path::to_path_buf),
            line: directive.line,
        }
    }

    /// Emit this diagnostic as a tracing event.
    pub(crate) fn emit(&self) {
        let source = self
            .source
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        match self.severity {
            Severity::Warning => tracing::warn!(
                code = self.code,
                directive = %self.directive,
                line = self.line,
                source = %source,
                "{}",
                self.message
            ),
            Severity::Error => tracing::error!(
                code = self.code,
                directive = %self.directive,
                line = self.line,
                source = %source,
                "{}",
                self.message
            ),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source {
            write!(f, "{}: ", source.display())?;
        }
        write!(
            f,
            "{}[{}] line {}: {} ({})",
            self.severity, self.code, self.line, self.message, self.directive
        )
    }
}
