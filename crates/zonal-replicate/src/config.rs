//! Replicator configuration.

use std::path::{Path, PathBuf};

/// Where a replicator keeps its persisted state.
#[derive(Debug, Clone)]
pub struct ReplicatorConfig {
    /// Zone data directory holding the store documents.
    pub data_dir: PathBuf,
}

impl ReplicatorConfig {
    /// Configuration rooted at `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Path of the actions document.
    pub fn actions_path(&self) -> PathBuf {
        self.data_dir.join("actions_db.json")
    }

    /// Path of the action-tracking document.
    pub fn tracking_path(&self) -> PathBuf {
        self.data_dir.join("action_tracking_db.json")
    }

    /// The configured data directory.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
