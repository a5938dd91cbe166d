//! In-memory stand-ins for the remote store and the media store.
//!
//! `FakeStore` keeps rows per table and records every entry point it
//! serves, so tests can assert not only on outcomes but on which queries
//! were actually issued (e.g. that a quota check performed a live count).
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use catalog::repository::media_store::MediaStore;
use catalog::repository::remote_store::RemoteStore;
use tablestore::query::{Filter, Order};
use tablestore::StoreError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Select { table: String },
    Insert { table: String },
    Update { table: String, id: String },
    Delete { table: String, id: String },
    Count { table: String, query: String },
    Rpc { function: String },
}

#[derive(Default)]
pub struct FakeStore {
    tables: Mutex<HashMap<String, Vec<Value>>>,
    calls: Mutex<Vec<StoreCall>>,
    next_id: AtomicU64,
    unreachable: Mutex<bool>,
}

impl FakeStore {
    pub fn new() -> Self {
        FakeStore::default()
    }

    /// Appends rows to a table, bypassing the recorded call log. Usable
    /// after construction to make the controller's cached list stale.
    pub fn seed(&self, table: &str, rows: Vec<Value>) {
        self.tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .extend(rows);
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count_queries(&self) -> Vec<StoreCall> {
        self.calls()
            .into_iter()
            .filter(|call| matches!(call, StoreCall::Count { .. }))
            .collect()
    }

    /// All subsequent requests fail, as if the store were unreachable.
    pub fn make_unreachable(&self) {
        *self.unreachable.lock().unwrap() = true;
    }

    fn check_reachable(&self) -> Result<(), StoreError> {
        if *self.unreachable.lock().unwrap() {
            Err(StoreError::Unauthorized)
        } else {
            Ok(())
        }
    }

    fn record(&self, call: StoreCall) {
        self.calls.lock().unwrap().push(call);
    }
}

fn matches_filter(row: &Value, filter: &Filter) -> bool {
    filter.terms().iter().all(|(column, value)| match row.get(column) {
        Some(Value::String(s)) => s == value,
        Some(Value::Bool(b)) => b.to_string() == *value,
        Some(Value::Number(n)) => n.to_string() == *value,
        _ => false,
    })
}

#[async_trait]
impl RemoteStore for FakeStore {
    async fn select(
        &self,
        table: &str,
        filter: &Filter,
        _order: Option<&Order>,
    ) -> Result<Vec<Value>, StoreError> {
        self.check_reachable()?;
        self.record(StoreCall::Select {
            table: table.to_string(),
        });
        // Ordering is deliberately ignored: rows come back as seeded, so
        // tests can verify the controller's own sort.
        Ok(self
            .rows(table)
            .into_iter()
            .filter(|row| matches_filter(row, filter))
            .collect())
    }

    async fn insert(&self, table: &str, row: &Value) -> Result<Value, StoreError> {
        self.check_reachable()?;
        self.record(StoreCall::Insert {
            table: table.to_string(),
        });
        let mut stored = row.clone();
        let object = stored
            .as_object_mut()
            .ok_or_else(|| StoreError::MissingRepresentation(table.to_string()))?;
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        let stamp = format!("2025-06-01T{:02}:00:00Z", n % 24);
        object
            .entry("id")
            .or_insert_with(|| json!(format!("row-{n}")));
        object.entry("created_at").or_insert_with(|| json!(stamp));
        object.entry("updated_at").or_insert_with(|| json!(stamp));
        self.tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .push(stored.clone());
        Ok(stored)
    }

    async fn update(&self, table: &str, id: &str, partial: &Value) -> Result<Value, StoreError> {
        self.check_reachable()?;
        self.record(StoreCall::Update {
            table: table.to_string(),
            id: id.to_string(),
        });
        let mut tables = self.tables.lock().unwrap();
        let rows = tables.entry(table.to_string()).or_default();
        let Some(row) = rows.iter_mut().find(|row| row["id"] == id) else {
            return Err(StoreError::RowNotFound(table.to_string(), id.to_string()));
        };
        if let (Some(target), Some(changes)) = (row.as_object_mut(), partial.as_object()) {
            for (key, value) in changes {
                target.insert(key.clone(), value.clone());
            }
        }
        Ok(row.clone())
    }

    async fn delete(&self, table: &str, id: &str) -> Result<(), StoreError> {
        self.check_reachable()?;
        self.record(StoreCall::Delete {
            table: table.to_string(),
            id: id.to_string(),
        });
        self.tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .retain(|row| row["id"] != id);
        Ok(())
    }

    async fn count(&self, table: &str, filter: &Filter) -> Result<u64, StoreError> {
        self.check_reachable()?;
        self.record(StoreCall::Count {
            table: table.to_string(),
            query: filter.to_query(),
        });
        Ok(self
            .rows(table)
            .iter()
            .filter(|row| matches_filter(row, filter))
            .count() as u64)
    }

    async fn rpc(&self, function: &str, args: &Value) -> Result<(), StoreError> {
        self.check_reachable()?;
        self.record(StoreCall::Rpc {
            function: function.to_string(),
        });
        let column = match function {
            "increment_view_count" => "view_count",
            "increment_share_count" => "share_count",
            _ => return Ok(()),
        };
        let id = args["blog_id"].as_str().unwrap_or_default().to_string();
        let mut tables = self.tables.lock().unwrap();
        if let Some(row) = tables
            .entry("blogs".to_string())
            .or_default()
            .iter_mut()
            .find(|row| row["id"] == id.as_str())
        {
            let current = row[column].as_i64().unwrap_or(0);
            row[column] = json!(current + 1);
        }
        Ok(())
    }
}

/// Media store that either hands back a canned public URL or refuses.
#[derive(Default)]
pub struct FakeMedia {
    fail: bool,
    stored: Mutex<Vec<String>>,
}

impl FakeMedia {
    pub fn new() -> Self {
        FakeMedia::default()
    }

    pub fn failing() -> Self {
        FakeMedia {
            fail: true,
            stored: Mutex::new(Vec::new()),
        }
    }

    pub fn stored_names(&self) -> Vec<String> {
        self.stored.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaStore for FakeMedia {
    async fn store(&self, _bytes: Vec<u8>, suggested_name: &str) -> Result<String, StoreError> {
        if self.fail {
            return Err(StoreError::Unauthorized);
        }
        self.stored.lock().unwrap().push(suggested_name.to_string());
        Ok(format!(
            "http://localhost:54321/storage/v1/object/public/blog-images/{suggested_name}"
        ))
    }
}
