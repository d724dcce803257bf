//! Error types for directive handlers and document resolution.

use std::io;
use std::path::{Path, PathBuf};

use crate::diagnostic::Severity;

/// Failure of a single directive.
///
/// Handler errors never abort a document: the resolver turns them into a
/// [`Diagnostic`](crate::Diagnostic) and removes the directive node.
#[derive(Debug, thiserror::Error)]
pub enum DirectiveError {
    /// A required attribute is absent or empty.
    #[error(
        "\"::{directive}\" directive without a \"{attribute}\" attribute, expected \"::{directive}{{{attribute}=...}}\""
    )]
    MissingAttribute {
        /// Directive name.
        directive: String,
        /// Name of the missing attribute.
        attribute: &'static str,
    },
    /// A referenced file could not be read.
    #[error("Failed to read file: {file} ({}): {source}", path.display())]
    ResourceUnavailable {
        /// Path as written in the directive.
        file: String,
        /// Path after resolution against the content root.
        path: PathBuf,
        /// Underlying read failure.
        #[source]
        source: io::Error,
    },
    /// A referenced path climbs above the content root.
    #[error("Path \"{path}\" escapes the content root")]
    PathOutsideRoot {
        /// Path as written in the directive.
        path: String,
    },
    /// Any other handler-specific failure.
    #[error("{0}")]
    Handler(String),
}

impl DirectiveError {
    /// Severity of the diagnostic this error produces.
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            Self::MissingAttribute { .. } => Severity::Warning,
            Self::ResourceUnavailable { .. } | Self::PathOutsideRoot { .. } | Self::Handler(_) => {
                Severity::Error
            }
        }
    }

    /// Short machine-readable category.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingAttribute { .. } => "missing-attribute",
            Self::ResourceUnavailable { .. } => "resource-unavailable",
            Self::PathOutsideRoot { .. } => "path-outside-root",
            Self::Handler(_) => "handler-failed",
        }
    }
}

/// Failure that aborts resolution of one document.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// Directive expansion nested deeper than the configured limit.
    #[error(
        "Directive recursion limit ({limit}) exceeded at \"::{directive}\" on line {line}{}; check for files that include each other",
        in_file(.file.as_deref())
    )]
    RecursionLimitExceeded {
        /// Configured maximum depth.
        limit: usize,
        /// Directive syntax that would have exceeded the limit.
        directive: String,
        /// File containing that directive, if known.
        file: Option<PathBuf>,
        /// Line of that directive within `file`.
        line: usize,
    },
    /// The document itself could not be read.
    #[error("Failed to read document {}: {source}", path.display())]
    Io {
        /// Document path.
        path: PathBuf,
        /// Underlying read failure.
        #[source]
        source: io::Error,
    },
}

fn in_file(file: Option<&Path>) -> String {
    file.map(|path| format!(" of {}", path.display())).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_attribute_message() {
        let err = DirectiveError::MissingAttribute {
            directive: "include".to_owned(),
            attribute: "file",
        };
        let message = err.to_string();

        assert!(message.contains(r#""file" attribute"#));
        assert!(message.contains("::include{file=...}"));
        assert_eq!(err.severity(), Severity::Warning);
        assert_eq!(err.code(), "missing-attribute");
    }

    #[test]
    fn test_resource_unavailable_message() {
        let err = DirectiveError::ResourceUnavailable {
            file: "invalid".to_owned(),
            path: PathBuf::from("/content/invalid"),
            source: io::Error::new(io::ErrorKind::NotFound, "No such file or directory"),
        };
        let message = err.to_string();

        assert!(message.contains("Failed to read file: invalid"));
        assert!(message.contains("/content/invalid"));
        assert!(message.contains("No such file or directory"));
        assert_eq!(err.severity(), Severity::Error);
    }

    #[test]
    fn test_recursion_limit_message() {
        let err = ResolveError::RecursionLimitExceeded {
            limit: 3,
            directive: r#"include{file="a.md"}"#.to_owned(),
            file: None,
            line: 7,
        };
        let message = err.to_string();

        assert!(message.contains("limit (3)"));
        assert!(message.contains("line 7;"));
    }

    #[test]
    fn test_recursion_limit_names_file() {
        let err = ResolveError::RecursionLimitExceeded {
            limit: 3,
            directive: r#"include{file="a.md"}"#.to_owned(),
            file: Some(PathBuf::from("/content/a.md")),
            line: 1,
        };

        assert!(err.to_string().contains("line 1 of /content/a.md;"));
    }
}
