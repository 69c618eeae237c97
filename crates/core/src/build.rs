//! Clean build of a package into its output directory

use crate::{
    config::BuildConfig,
    error::Result,
    manifest::{DistManifest, PathRewrite},
    process::{ShellCommand, ShellCommandResult},
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum BuildOutcome {
    Built {
        manifest_path: PathBuf,
        compile: ShellCommandResult,
    },
    /// The compiler exited non-zero; nothing was written after it ran
    CompileFailed(ShellCommandResult),
}

impl BuildOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(self, BuildOutcome::Built { .. })
    }

    pub fn compile_result(&self) -> &ShellCommandResult {
        match self {
            BuildOutcome::Built { compile, .. } => compile,
            BuildOutcome::CompileFailed(compile) => compile,
        }
    }
}

pub struct DistBuilder {
    root: PathBuf,
    config: BuildConfig,
}

impl DistBuilder {
    pub fn new(root: impl Into<PathBuf>, config: BuildConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    /// Builder for `root` using the config file found there, if any.
    pub fn from_root(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let config = BuildConfig::load_for_root(&root)?;
        Ok(Self::new(root, config))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    pub fn output_path(&self) -> PathBuf {
        self.config.output_path(&self.root)
    }

    pub fn dist_path(&self) -> PathBuf {
        self.config.dist_path(&self.root)
    }

    pub fn output_manifest_path(&self) -> PathBuf {
        self.config.output_manifest_path(&self.root)
    }

    pub fn compile_command(&self) -> String {
        self.config.compile_command_for(&self.dist_path())
    }

    /// Run every step in order, stopping after a failed compile.
    pub fn run(&self) -> Result<BuildOutcome> {
        self.clean_output()?;

        let compile = self.compile()?;
        if !compile.succeeded() {
            warn!("Compiler exited with {}, skipping manifest", compile.exit_code());
            return Ok(BuildOutcome::CompileFailed(compile));
        }

        let manifest_path = self.write_manifest()?;
        Ok(BuildOutcome::Built {
            manifest_path,
            compile,
        })
    }

    /// Remove the output location, whether it is a directory or a file.
    /// A symlink is removed itself, never its target.
    pub fn clean_output(&self) -> Result<()> {
        self.config.validate_output_dir(&self.root)?;

        let output = self.output_path();
        let metadata = match fs::symlink_metadata(&output) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Nothing to clean at {}", output.display());
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        info!("Cleaning {}", output.display());
        if metadata.is_dir() {
            fs::remove_dir_all(&output)?;
        } else {
            fs::remove_file(&output)?;
        }
        Ok(())
    }

    pub fn compile(&self) -> Result<ShellCommandResult> {
        let command = self.compile_command();
        info!("Compiling: {}", command);

        ShellCommand::new(command)
            .with_shell(&self.config.shell)
            .with_working_dir(&self.root)
            .quiet(self.config.quiet)
            .run()
    }

    /// Trim the source manifest and write it into the output location.
    /// Nothing is written when a required field is missing.
    pub fn write_manifest(&self) -> Result<PathBuf> {
        let source = self.config.manifest_path(&self.root);
        let manifest = DistManifest::load(&source)?;

        let rewrite = self.config.rewrite_paths.then(|| PathRewrite {
            from: self.config.source_prefix.as_str(),
            to: self.config.dist_prefix.as_str(),
        });

        let target = self.output_manifest_path();
        info!("Writing {}", target.display());
        manifest.write_to(&target, rewrite)?;
        Ok(target)
    }
}
