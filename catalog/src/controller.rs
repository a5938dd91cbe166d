//! The resource controller: single source of truth, within one session, for
//! one resource type's list and the operations that mutate it.
//!
//! The remote store is the system of record; the controller's list is a
//! cache, fully replaced by `load` or patched entry-by-entry depending on
//! the configured [`RefreshPolicy`]. One controller instance owns its list
//! exclusively (`&mut self` on every mutation) and never serializes
//! unrelated in-flight requests; two concurrent toggles on the same id race
//! with last-write-wins semantics at the store, which is a documented
//! limitation rather than something masked here. Operations cannot be
//! cancelled once issued; a caller that goes away must simply drop the
//! eventual result.
use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tablestore::query::{Filter, Order};

use crate::config::FlagQuota;
use crate::error::CatalogError;
use crate::partition::{partition, CategoryPartition, CategorySet};
use crate::repository::media_store::MediaStore;
use crate::repository::remote_store::RemoteStore;
use crate::types::{BlogPost, Counter, Draft, Resource, TableDescriptor};

const RATINGS_TABLE: &str = "ratings";

/// What happens to the in-memory list after a successful mutation.
///
/// `ReloadAll` refetches the complete list (the trade-off the admin screens
/// historically made on every mutation); `PatchLocal` splices the mutated
/// entry into the cache and accepts staleness until the next `load`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshPolicy {
    #[default]
    ReloadAll,
    PatchLocal,
}

pub struct ResourceController<R: Resource> {
    store: Arc<dyn RemoteStore>,
    media: Arc<dyn MediaStore>,
    table: TableDescriptor,
    categories: CategorySet,
    quotas: HashMap<String, usize>,
    refresh: RefreshPolicy,
    items: Vec<R>,
}

impl<R: Resource> ResourceController<R> {
    /// Creates a controller for `R`'s table with injected collaborators.
    ///
    /// The table descriptor is resolved once here from the resource kind;
    /// no operation ever picks a table name at call time.
    pub fn new(
        store: Arc<dyn RemoteStore>,
        media: Arc<dyn MediaStore>,
        categories: CategorySet,
        quotas: &[FlagQuota],
        refresh: RefreshPolicy,
    ) -> Self {
        ResourceController {
            store,
            media,
            table: R::KIND.descriptor(),
            categories,
            quotas: quotas
                .iter()
                .map(|quota| (quota.flag.clone(), quota.per_category_limit))
                .collect(),
            refresh,
            items: Vec::new(),
        }
    }

    #[must_use]
    pub fn descriptor(&self) -> TableDescriptor {
        self.table
    }

    /// The cached list, newest first. Empty until the first `load`.
    #[must_use]
    pub fn items(&self) -> &[R] {
        &self.items
    }

    /// Groups the cached list by category for display and quota scoping.
    #[must_use]
    pub fn partitions(&self) -> Vec<CategoryPartition<'_, R>> {
        partition(&self.items, &self.categories)
    }

    /// Replaces the in-memory list with a fresh fetch, newest first.
    ///
    /// The store is asked to sort by `created_at` descending, and the rows
    /// are re-sorted locally so an unordered response still yields the
    /// newest-first convention.
    ///
    /// # Errors
    ///
    /// `Transport` on request failure, `UnknownCategory`/`Validation` for a
    /// filter the table cannot express. The list is unchanged on failure.
    pub async fn load(&mut self, category: Option<&str>) -> Result<&[R], CatalogError> {
        if let Some(key) = category {
            if !self.table.has_category {
                return Err(CatalogError::Validation(format!(
                    "rows of '{}' are not categorised",
                    self.table.table
                )));
            }
            if !self.categories.contains(key) {
                return Err(CatalogError::UnknownCategory(key.to_string()));
            }
        }
        self.refresh_list(category).await?;
        Ok(&self.items)
    }

    /// Submits a new resource.
    ///
    /// A draft carrying binary image data has the image persisted FIRST;
    /// only once the media store has returned a public URL is the record
    /// inserted. A failed upload surfaces as `UploadFailure` and inserts
    /// nothing.
    ///
    /// # Errors
    ///
    /// `Validation`/`UnknownCategory` for a malformed draft,
    /// `UploadFailure` when image persistence fails, `Transport` for store
    /// failures.
    pub async fn create<D: Draft>(&mut self, mut draft: D) -> Result<R, CatalogError> {
        draft.validate()?;
        if self.table.has_category {
            let category = draft
                .category()
                .ok_or_else(|| CatalogError::Validation("a category is required".to_string()))?;
            if !self.categories.contains(category) {
                return Err(CatalogError::UnknownCategory(category.to_string()));
            }
            if let Some(sub) = draft.subcategory() {
                if !self.categories.allows(category, sub) {
                    return Err(CatalogError::Validation(format!(
                        "subcategory '{sub}' is not listed under {category}"
                    )));
                }
            }
        }

        if let Some(image) = draft.take_image() {
            let url = self
                .media
                .store(image.bytes, &image.file_name)
                .await
                .map_err(|e| CatalogError::UploadFailure(e.to_string()))?;
            info!("stored image for new {} row at {url}", self.table.table);
            draft.attach_image_url(url);
        }

        let row = serde_json::to_value(&draft)
            .map_err(|e| CatalogError::Validation(format!("draft does not serialize: {e}")))?;
        let inserted = self.store.insert(self.table.table, &row).await?;
        let resource = decode_row::<R>(inserted)?;
        debug!("created {} row {}", self.table.table, resource.id());

        match self.refresh {
            RefreshPolicy::ReloadAll => self.refresh_list(None).await?,
            RefreshPolicy::PatchLocal => self.items.insert(0, resource.clone()),
        }
        Ok(resource)
    }

    /// Applies a partial update to the resource identified by `id`.
    ///
    /// # Errors
    ///
    /// `NotFound` when `id` is absent from the store at write time
    /// (detected from the store's response, not pre-checked locally);
    /// `Validation` for a non-object payload; `Transport` otherwise. The
    /// in-memory list is unchanged on failure.
    pub async fn update(&mut self, id: &str, patch: &Value) -> Result<R, CatalogError> {
        if !patch.is_object() {
            return Err(CatalogError::Validation(
                "an update payload must be a JSON object".to_string(),
            ));
        }
        let updated = self.store.update(self.table.table, id, patch).await?;
        let resource = decode_row::<R>(updated)?;
        self.apply_patch(resource.clone()).await?;
        Ok(resource)
    }

    /// Removes the resource from the store, then from the in-memory list.
    ///
    /// The two steps are not transactional: a caller listing between them
    /// may still observe the deleted row. Deleting an id the store no
    /// longer has is not an error.
    ///
    /// # Errors
    ///
    /// `Transport` when the store request fails; the list is then unchanged.
    pub async fn delete(&mut self, id: &str) -> Result<(), CatalogError> {
        self.store.delete(self.table.table, id).await?;
        self.items.retain(|item| item.id() != id);
        if self.refresh == RefreshPolicy::ReloadAll {
            self.refresh_list(None).await?;
        }
        Ok(())
    }

    /// Negates a boolean flag on the resource identified by `id`.
    ///
    /// A false→true transition of a quota-carrying flag first counts the
    /// rows of the same category already carrying the flag, with a live
    /// query against the store rather than the possibly stale cached list,
    /// and fails with `QuotaExceeded` before any write when the cap is
    /// reached. true→false transitions never consult the quota.
    ///
    /// # Errors
    ///
    /// `UnsupportedFlag` for a flag this kind does not carry, `NotFound`
    /// when `id` is not in the cached list, `QuotaExceeded` as above,
    /// `Transport` for store failures.
    pub async fn toggle_flag(&mut self, id: &str, flag: &str) -> Result<R, CatalogError> {
        if !self.table.supports_flag(flag) {
            return Err(CatalogError::UnsupportedFlag {
                table: self.table.table.to_string(),
                flag: flag.to_string(),
            });
        }
        let current_item = self
            .items
            .iter()
            .find(|item| item.id() == id)
            .ok_or_else(|| CatalogError::NotFound {
                table: self.table.table.to_string(),
                id: id.to_string(),
            })?;
        let current = current_item.flag(flag).unwrap_or(false);

        if !current {
            if let Some(&limit) = self.quotas.get(flag) {
                let category = current_item
                    .category()
                    .ok_or_else(|| {
                        CatalogError::Validation(format!(
                            "rows of '{}' have no category to scope the '{flag}' quota",
                            self.table.table
                        ))
                    })?
                    .to_string();
                let in_use = self
                    .store
                    .count(
                        self.table.table,
                        &Filter::new().eq("category", category.clone()).eq(flag, "true"),
                    )
                    .await?;
                debug!("quota check for ({category}, {flag}): {in_use}/{limit}");
                if in_use as usize >= limit {
                    return Err(CatalogError::QuotaExceeded {
                        flag: flag.to_string(),
                        category,
                        limit,
                    });
                }
            }
        }

        let mut patch = Map::new();
        patch.insert(flag.to_string(), Value::Bool(!current));
        let updated = self
            .store
            .update(self.table.table, id, &Value::Object(patch))
            .await?;
        let resource = decode_row::<R>(updated)?;
        self.apply_patch(resource.clone()).await?;
        Ok(resource)
    }

    async fn refresh_list(&mut self, category: Option<&str>) -> Result<(), CatalogError> {
        let mut filter = Filter::new();
        if let Some(key) = category {
            filter = filter.eq("category", key);
        }
        let rows = self
            .store
            .select(self.table.table, &filter, Some(&Order::desc("created_at")))
            .await?;
        debug!("{}: fetched {} rows", self.table.table, rows.len());

        let mut items = rows
            .into_iter()
            .map(decode_row::<R>)
            .collect::<Result<Vec<_>, _>>()?;
        items.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        self.items = items;
        Ok(())
    }

    async fn apply_patch(&mut self, resource: R) -> Result<(), CatalogError> {
        match self.refresh {
            RefreshPolicy::ReloadAll => self.refresh_list(None).await,
            RefreshPolicy::PatchLocal => {
                if let Some(entry) = self
                    .items
                    .iter_mut()
                    .find(|item| item.id() == resource.id())
                {
                    *entry = resource;
                }
                Ok(())
            }
        }
    }
}

impl ResourceController<BlogPost> {
    /// Records a view or share on a post via the store's counter functions.
    ///
    /// # Errors
    ///
    /// `Transport` when the function invocation fails.
    pub async fn increment_counter(
        &mut self,
        id: &str,
        counter: Counter,
    ) -> Result<(), CatalogError> {
        let function = match counter {
            Counter::View => "increment_view_count",
            Counter::Share => "increment_share_count",
        };
        self.store.rpc(function, &json!({ "blog_id": id })).await?;
        Ok(())
    }

    /// Stores a reader rating for a post. The post's `average_rating` is
    /// maintained server-side and observed on the next reload.
    ///
    /// # Errors
    ///
    /// `Validation` for a rating outside 1..=5, `Transport` for store
    /// failures.
    pub async fn submit_rating(&mut self, blog_id: &str, rating: u8) -> Result<(), CatalogError> {
        if !(1..=5).contains(&rating) {
            return Err(CatalogError::Validation(format!(
                "a rating must be between 1 and 5, got {rating}"
            )));
        }
        self.store
            .insert(RATINGS_TABLE, &json!({ "blog_id": blog_id, "rating": rating }))
            .await?;
        Ok(())
    }
}

fn decode_row<R: Resource>(row: Value) -> Result<R, CatalogError> {
    serde_json::from_value(row)
        .map_err(|e| CatalogError::Transport(format!("store returned a malformed row: {e}")))
}
