//! Row-level contract against the remote tabular store.
//!
//! This is the boundary every controller mutation crosses. Rows travel as
//! untyped JSON; the controller owns the mapping to its resource type. The
//! store is authoritative: nothing here caches, retries or reorders.
use async_trait::async_trait;
use serde_json::Value;
use tablestore::query::{Filter, Order};
use tablestore::{Store, StoreError};

#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetches all rows of `table` matching `filter`.
    ///
    /// # Errors
    /// Returns a `StoreError` if the request fails or the store rejects it.
    async fn select(
        &self,
        table: &str,
        filter: &Filter,
        order: Option<&Order>,
    ) -> Result<Vec<Value>, StoreError>;

    /// Inserts `row` and returns the stored representation.
    ///
    /// # Errors
    /// Returns a `StoreError` if the request fails or the store rejects it.
    async fn insert(&self, table: &str, row: &Value) -> Result<Value, StoreError>;

    /// Applies a partial update to the row identified by `id`.
    ///
    /// # Errors
    /// Returns `StoreError::RowNotFound` when `id` does not exist at write
    /// time; other `StoreError` values for transport and store failures.
    async fn update(&self, table: &str, id: &str, partial: &Value) -> Result<Value, StoreError>;

    /// Deletes the row identified by `id`.
    ///
    /// # Errors
    /// Returns a `StoreError` if the request fails or the store rejects it.
    async fn delete(&self, table: &str, id: &str) -> Result<(), StoreError>;

    /// Live count of the rows matching `filter`. Quota checks rely on this
    /// being a fresh query, never a cached-list length.
    ///
    /// # Errors
    /// Returns a `StoreError` if the request fails or the store rejects it.
    async fn count(&self, table: &str, filter: &Filter) -> Result<u64, StoreError>;

    /// Invokes a stored procedure, e.g. the counter increments.
    ///
    /// # Errors
    /// Returns a `StoreError` if the request fails or the store rejects it.
    async fn rpc(&self, function: &str, args: &Value) -> Result<(), StoreError>;
}

#[async_trait]
impl RemoteStore for Store {
    async fn select(
        &self,
        table: &str,
        filter: &Filter,
        order: Option<&Order>,
    ) -> Result<Vec<Value>, StoreError> {
        Store::select(self, table, filter, order).await
    }

    async fn insert(&self, table: &str, row: &Value) -> Result<Value, StoreError> {
        Store::insert(self, table, row).await
    }

    async fn update(&self, table: &str, id: &str, partial: &Value) -> Result<Value, StoreError> {
        Store::update(self, table, id, partial).await
    }

    async fn delete(&self, table: &str, id: &str) -> Result<(), StoreError> {
        Store::delete_row(self, table, id).await
    }

    async fn count(&self, table: &str, filter: &Filter) -> Result<u64, StoreError> {
        Store::count(self, table, filter).await
    }

    async fn rpc(&self, function: &str, args: &Value) -> Result<(), StoreError> {
        Store::rpc(self, function, args).await.map(|_| ())
    }
}
