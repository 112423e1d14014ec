//! Error types for channel configuration generation.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for configuration generation.
pub type ChannelConfigResult<T> = Result<T, ChannelConfigError>;

/// Errors that can occur while resolving classes or assembling a configuration.
///
/// Every variant is fatal to a run: no output is produced once one is raised.
#[derive(Debug, Error)]
pub enum ChannelConfigError {
    /// Neither an input artifact nor an explicit class count was supplied.
    #[error("must specify either an input file or a class count")]
    Configuration,

    /// The input artifact kind is not recognized.
    #[error("unsupported input format for {}: {extension:?}", path.display())]
    UnsupportedFormat {
        path: PathBuf,
        extension: Option<String>,
    },

    /// No classes were resolved.
    #[error("configuration has no channels")]
    EmptyConfiguration,

    /// A recognized artifact is missing a required field.
    #[error("malformed input {}: {message}", path.display())]
    MalformedInput { path: PathBuf, message: String },

    /// A class type label outside the known set.
    #[error("invalid class type: {value:?} (expected STRUCTURE, BOUNDARY or BACKGROUND)")]
    InvalidClassType { value: String },

    /// Model weight files need the `hdf5` feature.
    #[error("cannot read model weights {}: built without the `hdf5` feature", path.display())]
    WeightsUnavailable { path: PathBuf },

    /// Reading the HDF5 container failed.
    #[error("hdf5 error in {}: {message}", path.display())]
    Hdf5 { path: PathBuf, message: String },

    /// I/O error with the file it happened on.
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ChannelConfigError {
    /// Wrap an I/O error with the path it concerns.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Build a malformed-input error.
    pub fn malformed(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::MalformedInput {
            path: path.into(),
            message: message.into(),
        }
    }
}
