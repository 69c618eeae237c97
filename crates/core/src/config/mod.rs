//! Configuration management for tsdist

mod settings;

// Re-export main types
pub use settings::{BuildConfig, CONFIG_FILE_NAMES, OUT_DIR_PLACEHOLDER};
