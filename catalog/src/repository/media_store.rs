use async_trait::async_trait;
use std::sync::Arc;
use tablestore::{Store, StoreError};

/// Binary asset persistence. Implementations must persist the blob and
/// return a publicly resolvable URL before any record insert references it.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Stores `bytes` under a name derived from `suggested_name` and
    /// returns the public URL of the stored object.
    ///
    /// # Errors
    /// Returns a `StoreError` when the blob could not be persisted; callers
    /// surface this as an upload failure and must not insert the record.
    async fn store(&self, bytes: Vec<u8>, suggested_name: &str) -> Result<String, StoreError>;
}

/// Media store backed by one bucket of the hosted store's object storage.
pub struct BucketMediaStore {
    store: Arc<Store>,
    bucket: String,
}

impl BucketMediaStore {
    #[must_use]
    pub fn new(store: Arc<Store>, bucket: String) -> Self {
        BucketMediaStore { store, bucket }
    }
}

#[async_trait]
impl MediaStore for BucketMediaStore {
    async fn store(&self, bytes: Vec<u8>, suggested_name: &str) -> Result<String, StoreError> {
        self.store
            .store_object(&self.bucket, suggested_name, bytes)
            .await
    }
}
