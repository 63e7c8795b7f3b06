//! Session storage configuration

use serde::Deserialize;
use std::path::PathBuf;

/// Where sessions are kept. Without a directory they live in memory and
/// are lost on exit.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub directory: Option<PathBuf>,
}

impl StorageConfig {
    pub fn is_persistent(&self) -> bool {
        self.directory.is_some()
    }
}
