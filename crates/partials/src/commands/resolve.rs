//! `partials resolve` command implementation.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Args;
use partials_directives::{Registry, Resolver};

use super::{ResolveOptions, resolver_config};
use crate::error::CliError;

/// Arguments for the resolve command.
#[derive(Args)]
pub(crate) struct ResolveArgs {
    /// Markdown document to resolve.
    file: PathBuf,

    #[command(flatten)]
    pub options: ResolveOptions,
}

impl ResolveArgs {
    /// Execute the resolve command.
    ///
    /// Prints the resolved tree as JSON to stdout. Diagnostics are logged to
    /// stderr and do not fail the command; an aborted document does.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let config = self.options.load_config()?;
        let registry = Registry::builtin();
        let resolver = Resolver::with_config(&registry, resolver_config(&config));

        let document = resolver.resolve_file(&self.file)?;

        let mut stdout = io::stdout().lock();
        serde_json::to_writer_pretty(&mut stdout, &document.tree)?;
        writeln!(stdout)?;
        Ok(())
    }
}
