//! `partials check` command implementation.

use std::path::PathBuf;

use clap::Args;
use partials_directives::{DocumentReport, Registry, Resolver, discover_documents, resolve_all};

use super::{ResolveOptions, resolver_config};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the check command.
#[derive(Args)]
pub(crate) struct CheckArgs {
    /// Documents to check (default: every markdown file under the content root).
    paths: Vec<PathBuf>,

    #[command(flatten)]
    pub options: ResolveOptions,
}

impl CheckArgs {
    /// Execute the check command.
    ///
    /// Fails when any document is aborted or has error diagnostics.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.options.load_config()?;
        let content_root = &config.content_resolved.root;

        let paths = if self.paths.is_empty() {
            discover_documents(content_root)?
        } else {
            self.paths
        };

        output.info(&format!(
            "Checking {} document(s) in {}",
            paths.len(),
            content_root.display()
        ));

        let registry = Registry::builtin();
        let resolver = Resolver::with_config(&registry, resolver_config(&config));
        let reports = resolve_all(&resolver, &paths);

        let summary = Summary::from_reports(&reports);
        for report in reports.iter().filter(|r| r.is_failure()) {
            output.error(&format!("FAILED {}", report.path.display()));
        }

        if summary.failed > 0 {
            return Err(CliError::CheckFailed {
                failed: summary.failed,
                total: summary.total,
            });
        }

        let message = format!(
            "Checked {} document(s): {} include(s) expanded, {} warning(s)",
            summary.total, summary.expanded, summary.warnings
        );
        if summary.warnings > 0 {
            output.warning(&message);
        } else {
            output.success(&message);
        }
        Ok(())
    }
}

/// Totals over a batch of reports.
#[derive(Debug, Default, PartialEq, Eq)]
struct Summary {
    total: usize,
    failed: usize,
    expanded: usize,
    warnings: usize,
}

impl Summary {
    fn from_reports(reports: &[DocumentReport]) -> Self {
        let mut summary = Self {
            total: reports.len(),
            ..Self::default()
        };
        for report in reports {
            if report.is_failure() {
                summary.failed += 1;
            }
            if let Ok(document) = &report.outcome {
                summary.expanded += document.resolution.expanded;
                summary.warnings += document.resolution.warning_count();
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use partials_directives::ResolverConfig;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_summary_from_reports() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("part.md"), "Shared").unwrap();
        fs::write(dir.path().join("a.md"), "::include{file=part.md}\n::include").unwrap();
        fs::write(dir.path().join("b.md"), "::include{file=missing.md}").unwrap();
        let registry = Registry::builtin();
        let resolver = Resolver::with_config(
            &registry,
            ResolverConfig::new().with_content_root(dir.path()),
        );
        let paths = vec![
            dir.path().join("a.md"),
            dir.path().join("b.md"),
            dir.path().join("part.md"),
        ];

        let summary = Summary::from_reports(&resolve_all(&resolver, &paths));

        assert_eq!(
            summary,
            Summary {
                total: 3,
                failed: 1,
                expanded: 1,
                warnings: 1,
            }
        );
    }
}
