use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use crate::commands::build_command;

/// Clean-build a TypeScript package into a distributable target directory
#[derive(Parser, Debug)]
#[command(name = "tsdist")]
#[command(version, about, long_about = None)]
#[command(after_help = "ENVIRONMENT:\n    RUST_LOG=debug    Enable debug logging")]
pub struct Cli {
    /// Project root containing package.json (defaults to the current directory)
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Config file to use instead of <root>/.tsdist.json
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Capture compiler output without echoing it
    #[arg(short, long)]
    pub quiet: bool,

    /// Rewrite source path prefixes to dist prefixes in the written manifest
    #[arg(long)]
    pub rewrite_paths: bool,

    /// Print the compile command and output locations without building
    #[arg(short, long)]
    pub dry_run: bool,
}

impl Cli {
    /// Execute the build
    pub fn execute(self) -> Result<()> {
        build_command(
            self.root.as_deref(),
            self.config.as_deref(),
            self.quiet,
            self.rewrite_paths,
            self.dry_run,
        )
    }
}
