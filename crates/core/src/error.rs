use std::io;
use std::path::PathBuf;

/// Errors that can occur during tsdist operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("Manifest is missing required field `{0}`")]
    ManifestFieldMissing(String),

    #[error("Manifest {} is not a JSON object", .0.display())]
    ManifestNotObject(PathBuf),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type alias for tsdist operations
pub type Result<T> = std::result::Result<T, Error>;
