// error_handling.rs - Crate-level errors for configuration and scene input

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("Vertex buffer of {len} bytes is not a whole number of f32x3 positions")]
    VertexBufferLength { len: usize },

    #[error("Invalid mesh: {reason}")]
    InvalidMesh { reason: String },
}

pub type Result<T> = std::result::Result<T, RigError>;

/// Read a whole file, tagging failures with the path.
pub fn read_to_string(path: impl Into<PathBuf>) -> Result<String> {
    let path = path.into();
    std::fs::read_to_string(&path).map_err(|source| RigError::Io { path, source })
}
