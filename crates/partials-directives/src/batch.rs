//! Resolving many documents at once.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::{ResolveError, ResolvedDocument, Resolver};

/// Result of resolving one document in a batch.
#[derive(Debug)]
pub struct DocumentReport {
    /// Document path.
    pub path: PathBuf,
    /// Resolved document, or the error that aborted it.
    pub outcome: Result<ResolvedDocument, ResolveError>,
}

impl DocumentReport {
    /// Check if the document was aborted or produced error diagnostics.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        match &self.outcome {
            Ok(document) => document.resolution.has_errors(),
            Err(_) => true,
        }
    }
}

/// Resolve documents in parallel.
///
/// Each document gets its own tree; the resolver and its registry are shared.
/// Reports are returned in the order of `paths`.
pub fn resolve_all(resolver: &Resolver<'_>, paths: &[PathBuf]) -> Vec<DocumentReport> {
    let reports: Vec<DocumentReport> = paths
        .par_iter()
        .map(|path| resolve_one(resolver, path))
        .collect();

    let failed = reports.iter().filter(|r| r.is_failure()).count();
    tracing::info!(documents = reports.len(), failed, "Resolved documents");

    reports
}

fn resolve_one(resolver: &Resolver<'_>, path: &Path) -> DocumentReport {
    let outcome = resolver.resolve_file(path);
    if let Err(e) = &outcome {
        tracing::error!(path = %path.display(), error = %e, "Failed to resolve document");
    }
    DocumentReport {
        path: path.to_path_buf(),
        outcome,
    }
}

/// Find markdown documents under `root`.
///
/// Hidden files and directories are skipped. Paths are sorted.
pub fn discover_documents(root: &Path) -> io::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    scan_directory(root, &mut paths)?;
    paths.sort();
    Ok(paths)
}

fn scan_directory(dir: &Path, paths: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }

        let path = entry.path();
        if entry.file_type()?.is_dir() {
            scan_directory(&path, paths)?;
        } else if path.extension().is_some_and(|e| e == "md") {
            paths.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{Registry, ResolverConfig};

    fn write(root: &Path, path: &str, content: &str) {
        let path = root.join(path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_discover_documents() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "index.md", "# Home");
        write(dir.path(), "guides/setup.md", "# Setup");
        write(dir.path(), "guides/notes.txt", "not markdown");
        write(dir.path(), ".hidden/secret.md", "# Hidden");
        write(dir.path(), "guides/.draft.md", "# Draft");

        let paths = discover_documents(dir.path()).unwrap();

        assert_eq!(
            paths,
            vec![
                dir.path().join("guides/setup.md"),
                dir.path().join("index.md"),
            ]
        );
    }

    #[test]
    fn test_discover_documents_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover_documents(&dir.path().join("missing")).is_err());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "partials/note.md", "> Shared note.");
        write(dir.path(), "partials/nested.md", "Before\n\n::include{file=/partials/note.md}");
        for i in 0..16 {
            let content = format!(
                "# Doc {i}\n::include{{file=partials/nested.md}}\n::include{{file=missing{i}.md}}"
            );
            write(dir.path(), &format!("doc{i:02}.md"), &content);
        }
        let registry = Registry::builtin();
        let resolver = Resolver::with_config(
            &registry,
            ResolverConfig::new().with_content_root(dir.path()),
        );
        let paths = discover_documents(dir.path()).unwrap();

        let reports = resolve_all(&resolver, &paths);

        assert_eq!(reports.len(), paths.len());
        for (report, path) in reports.iter().zip(&paths) {
            assert_eq!(&report.path, path);
            let sequential = resolver.resolve_file(path).unwrap();
            let parallel = report.outcome.as_ref().unwrap();
            assert_eq!(parallel, &sequential);
        }
    }

    #[test]
    fn test_report_failures() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "ok.md", "# Fine");
        write(dir.path(), "broken.md", "::include{file=nope.md}");
        let registry = Registry::builtin();
        let resolver = Resolver::with_config(
            &registry,
            ResolverConfig::new().with_content_root(dir.path()),
        );
        let paths = vec![
            dir.path().join("ok.md"),
            dir.path().join("broken.md"),
            dir.path().join("absent.md"),
        ];

        let reports = resolve_all(&resolver, &paths);

        let failures: Vec<bool> = reports.iter().map(DocumentReport::is_failure).collect();
        assert_eq!(failures, vec![false, true, true]);
        assert!(matches!(reports[2].outcome, Err(ResolveError::Io { .. })));
    }
}
