//! Admin-side runtime for a content catalog: blog posts plus two product
//! tables (mobile phones, laptops), all persisted in a hosted tabular store.
//!
//! Each resource type is managed by a [`controller::ResourceController`]
//! holding the in-memory list and enforcing quota and uniqueness rules
//! before any write. The store and media collaborators are injected, never
//! ambient, so tests substitute fakes.
use std::sync::Arc;

use serde_json::Value;

use config::AppConfiguration;
use controller::ResourceController;
use error::CatalogError;
use partition::CategorySet;
use repository::media_store::{BucketMediaStore, MediaStore};
use repository::remote_store::RemoteStore;
use tablestore::Store;
use types::{
    BlogPost, Counter, Laptop, MobileProduct, NewBlogPost, NewProduct, ResourceKind,
};

pub mod config;
pub mod controller;
pub mod error;
pub mod partition;
pub mod repository;
pub mod types;

pub struct CatalogRuntime {
    config: AppConfiguration,
    blogs: ResourceController<BlogPost>,
    mobiles: ResourceController<MobileProduct>,
    laptops: ResourceController<Laptop>,
}

/// One admin action, as issued by a UI event handler.
pub enum Operation {
    LoadBlogs { category: Option<String> },
    PublishBlog(NewBlogPost),
    ReviseBlog { id: String, patch: Value },
    DeleteBlog { id: String },
    ToggleBlogFlag { id: String, flag: String },
    RecordView { id: String },
    RecordShare { id: String },
    RateBlog { id: String, rating: u8 },
    LoadProducts { kind: ResourceKind },
    PublishProduct { kind: ResourceKind, draft: NewProduct },
    ReviseProduct { kind: ResourceKind, id: String, patch: Value },
    DeleteProduct { kind: ResourceKind, id: String },
}

/// Outcome of a successful operation, for the caller to notify and render.
pub enum OperationResult {
    BlogList(Vec<BlogPost>),
    BlogSaved(BlogPost),
    MobileList(Vec<MobileProduct>),
    MobileSaved(MobileProduct),
    LaptopList(Vec<Laptop>),
    LaptopSaved(Laptop),
    Deleted(String),
    Recorded,
}

impl CatalogRuntime {
    /// Creates a runtime from the on-disk configuration, connecting the
    /// controllers to the configured store instance.
    ///
    /// # Errors
    ///
    /// - Returns an error if the configuration fails to load.
    /// - Returns an error if the store client cannot be created from it.
    pub fn new() -> Result<Self, CatalogError> {
        CatalogRuntimeBuilder::new().build()
    }

    #[must_use]
    pub fn configuration(&self) -> &AppConfiguration {
        &self.config
    }

    #[must_use]
    pub fn blogs(&self) -> &ResourceController<BlogPost> {
        &self.blogs
    }

    pub fn blogs_mut(&mut self) -> &mut ResourceController<BlogPost> {
        &mut self.blogs
    }

    #[must_use]
    pub fn mobiles(&self) -> &ResourceController<MobileProduct> {
        &self.mobiles
    }

    pub fn mobiles_mut(&mut self) -> &mut ResourceController<MobileProduct> {
        &mut self.mobiles
    }

    #[must_use]
    pub fn laptops(&self) -> &ResourceController<Laptop> {
        &self.laptops
    }

    pub fn laptops_mut(&mut self) -> &mut ResourceController<Laptop> {
        &mut self.laptops
    }

    /// Executes the specified `Operation` and returns the result.
    ///
    /// This is the mutation feedback channel: every failure arrives as a
    /// typed `CatalogError`, nothing is thrown past this boundary, and the
    /// caller decides how to notify and whether to re-load.
    ///
    /// # Errors
    ///
    /// Any `CatalogError` produced by the underlying controller operation.
    pub async fn execute(&mut self, operation: Operation) -> Result<OperationResult, CatalogError> {
        match operation {
            Operation::LoadBlogs { category } => {
                let list = self.blogs.load(category.as_deref()).await?.to_vec();
                Ok(OperationResult::BlogList(list))
            }
            Operation::PublishBlog(draft) => {
                Ok(OperationResult::BlogSaved(self.blogs.create(draft).await?))
            }
            Operation::ReviseBlog { id, patch } => Ok(OperationResult::BlogSaved(
                self.blogs.update(&id, &patch).await?,
            )),
            Operation::DeleteBlog { id } => {
                self.blogs.delete(&id).await?;
                Ok(OperationResult::Deleted(id))
            }
            Operation::ToggleBlogFlag { id, flag } => Ok(OperationResult::BlogSaved(
                self.blogs.toggle_flag(&id, &flag).await?,
            )),
            Operation::RecordView { id } => {
                self.blogs.increment_counter(&id, Counter::View).await?;
                Ok(OperationResult::Recorded)
            }
            Operation::RecordShare { id } => {
                self.blogs.increment_counter(&id, Counter::Share).await?;
                Ok(OperationResult::Recorded)
            }
            Operation::RateBlog { id, rating } => {
                self.blogs.submit_rating(&id, rating).await?;
                Ok(OperationResult::Recorded)
            }
            Operation::LoadProducts { kind } => match kind {
                ResourceKind::Mobile => {
                    let list = self.mobiles.load(None).await?.to_vec();
                    Ok(OperationResult::MobileList(list))
                }
                ResourceKind::Laptop => {
                    let list = self.laptops.load(None).await?.to_vec();
                    Ok(OperationResult::LaptopList(list))
                }
                ResourceKind::Blog => Err(not_a_product()),
            },
            Operation::PublishProduct { kind, draft } => match kind {
                ResourceKind::Mobile => Ok(OperationResult::MobileSaved(
                    self.mobiles.create(draft).await?,
                )),
                ResourceKind::Laptop => Ok(OperationResult::LaptopSaved(
                    self.laptops.create(draft).await?,
                )),
                ResourceKind::Blog => Err(not_a_product()),
            },
            Operation::ReviseProduct { kind, id, patch } => match kind {
                ResourceKind::Mobile => Ok(OperationResult::MobileSaved(
                    self.mobiles.update(&id, &patch).await?,
                )),
                ResourceKind::Laptop => Ok(OperationResult::LaptopSaved(
                    self.laptops.update(&id, &patch).await?,
                )),
                ResourceKind::Blog => Err(not_a_product()),
            },
            Operation::DeleteProduct { kind, id } => {
                match kind {
                    ResourceKind::Mobile => self.mobiles.delete(&id).await?,
                    ResourceKind::Laptop => self.laptops.delete(&id).await?,
                    ResourceKind::Blog => return Err(not_a_product()),
                }
                Ok(OperationResult::Deleted(id))
            }
        }
    }
}

fn not_a_product() -> CatalogError {
    CatalogError::Validation("blog posts are not managed as products".to_string())
}

/// Assembles a [`CatalogRuntime`], optionally substituting the store and
/// media collaborators. Tests inject fakes here; production wiring creates
/// one shared client from the configuration.
#[derive(Default)]
pub struct CatalogRuntimeBuilder {
    config: Option<AppConfiguration>,
    store: Option<Arc<dyn RemoteStore>>,
    media: Option<Arc<dyn MediaStore>>,
}

impl CatalogRuntimeBuilder {
    #[must_use]
    pub fn new() -> Self {
        CatalogRuntimeBuilder::default()
    }

    #[must_use]
    pub fn with_configuration(mut self, config: AppConfiguration) -> Self {
        self.config = Some(config);
        self
    }

    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn RemoteStore>) -> Self {
        self.store = Some(store);
        self
    }

    #[must_use]
    pub fn with_media(mut self, media: Arc<dyn MediaStore>) -> Self {
        self.media = Some(media);
        self
    }

    /// # Errors
    ///
    /// Configuration loading or store-client construction errors.
    pub fn build(self) -> Result<CatalogRuntime, CatalogError> {
        let config = match self.config {
            Some(config) => config,
            None => config::load()?,
        };

        let (store, media) = match (self.store, self.media) {
            (Some(store), Some(media)) => (store, media),
            (store_opt, media_opt) => {
                let client = Arc::new(Store::from(&config.store)?);
                let store: Arc<dyn RemoteStore> = match store_opt {
                    Some(store) => store,
                    None => client.clone(),
                };
                let media: Arc<dyn MediaStore> = match media_opt {
                    Some(media) => media,
                    None => Arc::new(BucketMediaStore::new(
                        client,
                        config.catalog.image_bucket.clone(),
                    )),
                };
                (store, media)
            }
        };

        let categories = CategorySet::new(config.catalog.categories.clone());
        let quotas = config.catalog.quotas.clone();
        let refresh = config.catalog.refresh;

        Ok(CatalogRuntime {
            blogs: ResourceController::new(
                store.clone(),
                media.clone(),
                categories,
                &quotas,
                refresh,
            ),
            mobiles: ResourceController::new(
                store.clone(),
                media.clone(),
                CategorySet::default(),
                &quotas,
                refresh,
            ),
            laptops: ResourceController::new(store, media, CategorySet::default(), &quotas, refresh),
            config,
        })
    }
}
