use crate::error::HwpcResult;

/// Destination for finished result archives.
///
/// Implementations must be cheap to clone; a run uploads its archives sequentially but
/// tests inspect the store from other handles.
pub trait ObjectStore {
    /// Stores `bytes` under `key`, replacing any previous object.
    fn upload(&self, key: &str, bytes: Vec<u8>) -> impl Future<Output = HwpcResult<()>> + Send;

    /// Retrieves the object stored under `key`.
    fn download(&self, key: &str) -> impl Future<Output = HwpcResult<Vec<u8>>> + Send;
}
