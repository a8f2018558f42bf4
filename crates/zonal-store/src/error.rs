//! Store errors.

use std::path::PathBuf;

/// Failures while loading or saving a persistent JSON document.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("i/o failure on {path}: {source}")]
    Io {
        /// Path of the backing document.
        path: PathBuf,
        /// Underlying i/o error.
        #[source]
        source: std::io::Error,
    },

    /// The backing file exists but is not a parsable document.
    ///
    /// Fatal for the load: this layer never silently regenerates a
    /// default over corrupt state.
    #[error("store document {path} is corrupt: {source}")]
    Corrupt {
        /// Path of the backing document.
        path: PathBuf,
        /// Parse error reported by the codec.
        #[source]
        source: serde_json::Error,
    },

    /// The in-memory document could not be encoded for writing.
    #[error("failed to encode store document {path}: {source}")]
    Encode {
        /// Path of the backing document.
        path: PathBuf,
        /// Encode error reported by the codec.
        #[source]
        source: serde_json::Error,
    },
}
