use anyhow::{Context, Result};
use std::env;
use std::path::Path;
use tracing::{debug, info};
use tsdist_core::{BuildConfig, BuildOutcome, DistBuilder};

pub fn build_command(
    root: Option<&Path>,
    config_path: Option<&Path>,
    quiet: bool,
    rewrite_paths: bool,
    dry_run: bool,
) -> Result<()> {
    let root = match root {
        Some(root) => root.to_path_buf(),
        None => env::current_dir().context("Failed to determine the current directory")?,
    };

    let mut config = match config_path {
        Some(path) => BuildConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => BuildConfig::load_for_root(&root)?,
    };

    // Flags only ever switch these on
    config.quiet |= quiet;
    config.rewrite_paths |= rewrite_paths;

    debug!("Building {} with {:?}", root.display(), config);
    let builder = DistBuilder::new(root, config);

    if dry_run {
        print_plan(&builder);
        return Ok(());
    }

    let outcome = builder
        .run()
        .with_context(|| format!("Build failed in {}", builder.root().display()))?;

    match outcome {
        BuildOutcome::Built { manifest_path, .. } => {
            info!("Build finished: {}", manifest_path.display());
            Ok(())
        }
        BuildOutcome::CompileFailed(result) => {
            eprintln!("❌ `{}` failed with exit code {}", result.command(), result.exit_code());
            std::process::exit(1);
        }
    }
}

fn print_plan(builder: &DistBuilder) {
    let config = builder.config();

    println!("{}", builder.compile_command());
    println!("Working directory: {}", builder.root().display());
    println!("Shell: {}", config.shell);
    println!("Clean: {}", builder.output_path().display());
    println!("Compile into: {}", builder.dist_path().display());
    println!(
        "Manifest: {} -> {}",
        config.manifest_path(builder.root()).display(),
        builder.output_manifest_path().display()
    );
    if config.rewrite_paths {
        println!("Rewrite: {} -> {}", config.source_prefix, config.dist_prefix);
    }
}
