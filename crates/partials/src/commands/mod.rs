//! CLI command implementations.

pub(crate) mod check;
pub(crate) mod resolve;

pub(crate) use check::CheckArgs;
pub(crate) use resolve::ResolveArgs;

use std::path::PathBuf;

use clap::Args;
use partials_config::{CliSettings, Config, ConfigError};
use partials_directives::ResolverConfig;

/// Options shared by every command that resolves documents.
#[derive(Args)]
pub(crate) struct ResolveOptions {
    /// Path to configuration file (default: auto-discover partials.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Content root that include paths resolve against (overrides config).
    #[arg(short = 'r', long, env = "PARTIALS_CONTENT_ROOT")]
    content_root: Option<PathBuf>,

    /// Maximum inclusion depth (overrides config).
    #[arg(long)]
    max_depth: Option<usize>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl ResolveOptions {
    /// Load configuration with command-line overrides applied.
    fn load_config(&self) -> Result<Config, ConfigError> {
        let cli_settings = CliSettings {
            content_root: self.content_root.clone(),
            max_depth: self.max_depth,
        };
        Config::load(self.config.as_deref(), Some(&cli_settings))
    }
}

/// Resolver settings taken from the loaded configuration.
fn resolver_config(config: &Config) -> ResolverConfig {
    ResolverConfig::new()
        .with_content_root(config.content_resolved.root.clone())
        .with_max_depth(config.directives.max_depth)
}
