use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Object storage backend for uploaded archives.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum StorageConfig {
    /// In-memory store, used by tests and dry runs.
    Memory,
    /// Directory on the local filesystem standing in for the output bucket.
    Fs {
        /// Root directory archives are written under.
        root: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_backend_is_tag_selected() {
        let memory: StorageConfig = serde_json::from_str(r#"{"type": "memory"}"#).unwrap();
        assert!(matches!(memory, StorageConfig::Memory));

        let fs: StorageConfig =
            serde_json::from_str(r#"{"type": "fs", "root": "/tmp/out"}"#).unwrap();
        assert!(matches!(fs, StorageConfig::Fs { .. }));
    }
}
