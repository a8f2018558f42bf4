//! # Zonal Store - persistent JSON document stores
//!
//! A [`PersistentStore`] is a lazily-loaded, explicitly-saved cache over a
//! single JSON document on disk. The replication layer keeps its actions
//! and action-tracking documents in two of these; the notification list is
//! a third.
//!
//! Concurrency contract: single writer, in-process. There is no file
//! locking; one logical store must never be shared across processes.

mod error;

pub use error::StoreError;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Lazily-loaded cache over one JSON document.
///
/// The document is read from disk on first [`load`](Self::load) only and
/// held in memory afterwards; [`save`](Self::save) writes the cached
/// document back. A store that was never loaded is never written.
#[derive(Debug)]
pub struct PersistentStore<T> {
    path: PathBuf,
    cache: Option<T>,
}

impl<T> PersistentStore<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    /// Create a store backed by `path`. Nothing is read until first load.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: None,
        }
    }

    /// Path of the backing document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the document has been loaded into memory.
    pub fn is_loaded(&self) -> bool {
        self.cache.is_some()
    }

    /// Get the in-memory document, reading it from disk on first access.
    ///
    /// A missing backing file yields the empty default document. An
    /// unparsable file is fatal for the load and surfaces as
    /// [`StoreError::Corrupt`].
    pub fn load(&mut self) -> Result<&mut T, StoreError> {
        if self.cache.is_none() {
            let document = self.read_document()?;
            self.cache = Some(document);
        }
        // Populated just above; the closure never runs.
        Ok(self.cache.get_or_insert_with(T::default))
    }

    /// Write the in-memory document back, if it was ever loaded.
    pub fn save(&self) -> Result<(), StoreError> {
        let Some(document) = &self.cache else {
            tracing::trace!(path = %self.path.display(), "store never loaded, skipping save");
            return Ok(());
        };

        let bytes = serde_json::to_vec_pretty(document).map_err(|source| StoreError::Encode {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, bytes).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }

    fn read_document(&self) -> Result<T, StoreError> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "no backing document, starting empty");
            return Ok(T::default());
        }

        let bytes = fs::read(&self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        serde_json::from_slice(&bytes).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }
}
