//! Built-in `::include` directive.

use partials_ast::{Directive, DirectiveKind};

use crate::{DirectiveContext, DirectiveError, DirectiveHandler, DirectiveOutput};

/// Inlines a markdown file from the content root.
///
/// ```markdown
/// ::include{file=/shared/prerequisites.md}
/// ```
///
/// The `file` attribute is resolved against the content root; a leading
/// separator is root-relative, and `..` may not climb above the root. The
/// file's contents are returned verbatim, together with the resolved path,
/// and parsed as part of the document, so included files can include others.
#[derive(Clone, Copy, Debug, Default)]
pub struct IncludeDirective;

impl DirectiveHandler for IncludeDirective {
    fn kind(&self) -> DirectiveKind {
        DirectiveKind::Leaf
    }

    fn name(&self) -> &'static str {
        "include"
    }

    fn process(
        &self,
        directive: &Directive,
        ctx: &DirectiveContext<'_>,
    ) -> Result<DirectiveOutput, DirectiveError> {
        let file = directive
            .attribute("file")
            .map(str::trim)
            .filter(|file| !file.is_empty())
            .ok_or_else(|| DirectiveError::MissingAttribute {
                directive: self.name().to_owned(),
                attribute: "file",
            })?;

        let path = ctx.resolve_path(file)?;
        let contents = match ctx.read(&path) {
            Ok(contents) => contents,
            Err(source) => {
                return Err(DirectiveError::ResourceUnavailable {
                    file: file.to_owned(),
                    path,
                    source,
                });
            }
        };

        Ok(DirectiveOutput::included(path, contents))
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, Mutex};

    use partials_ast::MarkdownParser;

    use super::*;

    fn include(
        directive: &Directive,
        read_file: &crate::ReadFileFn,
    ) -> Result<DirectiveOutput, DirectiveError> {
        let parser = MarkdownParser::new();
        let ctx = DirectiveContext {
            index: 0,
            parent_type: "root",
            depth: 0,
            children: &[],
            parser: &parser,
            content_root: Path::new("/content"),
            source_path: None,
            read_file,
        };
        IncludeDirective.process(directive, &ctx)
    }

    #[test]
    fn test_include_success() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&seen);
        let read_file = move |path: &Path| {
            recorded.lock().unwrap().push(path.to_path_buf());
            Ok("# Included\n\nSome content.".to_owned())
        };
        let directive = Directive::new("include").with_attribute("file", "partials/intro.md");

        let output = include(&directive, &read_file).unwrap();

        assert_eq!(
            output,
            DirectiveOutput::included("/content/partials/intro.md", "# Included\n\nSome content.")
        );
        assert_eq!(
            *seen.lock().unwrap(),
            vec![PathBuf::from("/content/partials/intro.md")]
        );
    }

    #[test]
    fn test_include_returns_contents_verbatim() {
        let directive = Directive::new("include").with_attribute("file", "a.md");
        let output =
            include(&directive, &|_| Ok("  keep\n\n  whitespace  \n".to_owned())).unwrap();
        assert_eq!(
            output,
            DirectiveOutput::included("/content/a.md", "  keep\n\n  whitespace  \n")
        );
    }

    #[test]
    fn test_include_missing_file_attribute() {
        let err = include(&Directive::new("include"), &|_| Ok(String::new())).unwrap_err();

        assert!(matches!(
            err,
            DirectiveError::MissingAttribute { ref directive, attribute: "file" } if directive == "include"
        ));
    }

    #[test]
    fn test_include_empty_file_attribute() {
        let directive = Directive::new("include").with_attribute("file", "  ");
        let err = include(&directive, &|_| Ok(String::new())).unwrap_err();
        assert!(matches!(err, DirectiveError::MissingAttribute { .. }));
    }

    #[test]
    fn test_include_read_failure() {
        let directive = Directive::new("include").with_attribute("file", "invalid");
        let err = include(&directive, &|_| {
            Err(io::Error::new(io::ErrorKind::NotFound, "No such file or directory"))
        })
        .unwrap_err();

        match err {
            DirectiveError::ResourceUnavailable { file, path, source } => {
                assert_eq!(file, "invalid");
                assert_eq!(path, PathBuf::from("/content/invalid"));
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("expected ResourceUnavailable, got {other:?}"),
        }
    }

    #[test]
    fn test_include_outside_root() {
        let directive = Directive::new("include").with_attribute("file", "../../etc/passwd");
        let err = include(&directive, &|_| Ok("secret".to_owned())).unwrap_err();
        assert!(matches!(err, DirectiveError::PathOutsideRoot { .. }));
    }

    #[test]
    fn test_include_reads_real_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("shared")).unwrap();
        std::fs::write(dir.path().join("shared/setup.md"), "Run `npm install`.").unwrap();

        let parser = MarkdownParser::new();
        let ctx = DirectiveContext {
            index: 0,
            parent_type: "root",
            depth: 0,
            children: &[],
            parser: &parser,
            content_root: dir.path(),
            source_path: None,
            read_file: &|path| std::fs::read_to_string(path),
        };
        let directive = Directive::new("include").with_attribute("file", "/shared/setup.md");

        let output = IncludeDirective.process(&directive, &ctx).unwrap();

        assert_eq!(
            output,
            DirectiveOutput::included(dir.path().join("shared/setup.md"), "Run `npm install`.")
        );
    }
}
