//! tsdist - clean-build a TypeScript package into a distributable directory
//!
//! This crate provides functionality to:
//! - Run shell commands while draining stdout and stderr concurrently
//! - Trim a `package.json` down to the fields a published build needs
//! - Orchestrate clean, compile and manifest steps into one build
pub mod build;
pub mod config;
pub mod error;
pub mod manifest;
pub mod process;

// Re-export commonly used types
pub use build::{BuildOutcome, DistBuilder};
pub use config::BuildConfig;
pub use error::{Error, Result};
pub use manifest::DistManifest;
pub use process::{ShellCommand, ShellCommandResult, run_cmd};
