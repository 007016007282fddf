use std::path::PathBuf;

use tracing::debug;

use crate::error::HwpcResult;
use crate::storage::ObjectStore;

/// An [`ObjectStore`] backed by a directory on the local filesystem.
///
/// Keys map directly to file names under the root directory, which stands in for the
/// output bucket of a run.
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }
}

impl ObjectStore for FsObjectStore {
    async fn upload(&self, key: &str, bytes: Vec<u8>) -> HwpcResult<()> {
        tokio::fs::create_dir_all(&self.root).await?;

        let path = self.root.join(key);
        tokio::fs::write(&path, bytes).await?;

        debug!(key, path = %path.display(), "stored archive");

        Ok(())
    }

    async fn download(&self, key: &str) -> HwpcResult<Vec<u8>> {
        let path = self.root.join(key);
        let bytes = tokio::fs::read(&path).await?;

        Ok(bytes)
    }
}
