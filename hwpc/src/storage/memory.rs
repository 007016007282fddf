use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::bail;
use crate::error::{ErrorKind, HwpcResult};
use crate::storage::ObjectStore;

#[derive(Debug, Default)]
struct Inner {
    objects: HashMap<String, Vec<u8>>,
    fail_uploads: bool,
}

/// An in-memory [`ObjectStore`] used for testing.
///
/// Stores objects in a shared map and can be told to fail uploads, which lets tests
/// exercise the abort path of a run.
#[derive(Debug, Clone, Default)]
pub struct MemoryObjectStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent upload fail with [`ErrorKind::UploadFailed`].
    pub async fn set_fail_uploads(&self, fail: bool) {
        self.inner.lock().await.fail_uploads = fail;
    }

    /// Returns the number of stored objects.
    pub async fn object_count(&self) -> usize {
        self.inner.lock().await.objects.len()
    }

    /// Returns the stored keys in sorted order.
    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.inner.lock().await.objects.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Returns a copy of the object stored under `key`, if any.
    pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.inner.lock().await.objects.get(key).cloned()
    }
}

impl ObjectStore for MemoryObjectStore {
    async fn upload(&self, key: &str, bytes: Vec<u8>) -> HwpcResult<()> {
        let mut inner = self.inner.lock().await;

        if inner.fail_uploads {
            bail!(
                ErrorKind::UploadFailed,
                "Memory store is configured to fail uploads",
                key
            );
        }

        inner.objects.insert(key.to_owned(), bytes);

        Ok(())
    }

    async fn download(&self, key: &str) -> HwpcResult<Vec<u8>> {
        let inner = self.inner.lock().await;

        match inner.objects.get(key) {
            Some(bytes) => Ok(bytes.clone()),
            None => bail!(ErrorKind::DownloadFailed, "Object not found", key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn uploads_are_visible_to_other_handles() {
        let store = MemoryObjectStore::new();
        let other = store.clone();

        store.upload("run.zip", vec![1, 2, 3]).await.unwrap();

        assert_eq!(other.object_count().await, 1);
        assert_eq!(other.download("run.zip").await.unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn failing_store_rejects_uploads() {
        let store = MemoryObjectStore::new();
        store.set_fail_uploads(true).await;

        let result = store.upload("run.zip", vec![]).await;

        assert_eq!(result.unwrap_err().kind(), ErrorKind::UploadFailed);
        assert_eq!(store.object_count().await, 0);
    }

    #[tokio::test]
    async fn missing_object_fails_download() {
        let store = MemoryObjectStore::new();

        let result = store.download("absent.zip").await;

        assert_eq!(result.unwrap_err().kind(), ErrorKind::DownloadFailed);
    }
}
