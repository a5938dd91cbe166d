use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::CatalogError;

/// The closed set of resource kinds managed by the admin surface.
///
/// Each kind resolves to a fixed table descriptor once, at controller
/// construction; no table name is ever chosen per call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Blog,
    Mobile,
    Laptop,
}

/// Boolean flag columns carried by blog rows. Product rows carry none.
pub const BLOG_FLAGS: &[&str] = &[
    "featured",
    "featured_in_category",
    "popular",
    "popular_in_tech",
    "popular_in_games",
    "popular_in_entertainment",
    "popular_in_stocks",
    "popular_in_gadgets",
];

/// Static description of the table backing a resource kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TableDescriptor {
    pub kind: ResourceKind,
    pub table: &'static str,
    pub has_category: bool,
    pub flags: &'static [&'static str],
}

impl TableDescriptor {
    #[must_use]
    pub fn supports_flag(&self, flag: &str) -> bool {
        self.flags.contains(&flag)
    }
}

impl ResourceKind {
    #[must_use]
    pub fn descriptor(self) -> TableDescriptor {
        match self {
            ResourceKind::Blog => TableDescriptor {
                kind: self,
                table: "blogs",
                has_category: true,
                flags: BLOG_FLAGS,
            },
            ResourceKind::Mobile => TableDescriptor {
                kind: self,
                table: "mobile_products",
                has_category: false,
                flags: &[],
            },
            ResourceKind::Laptop => TableDescriptor {
                kind: self,
                table: "laptops",
                has_category: false,
                flags: &[],
            },
        }
    }
}

/// A persisted record managed by a `ResourceController`.
///
/// The remote store is authoritative for identity: `id` is server-assigned
/// and immutable, and `created_at` drives the newest-first display order.
pub trait Resource: Clone + Serialize + DeserializeOwned + Send + Sync {
    const KIND: ResourceKind;

    fn id(&self) -> &str;

    /// Category key for partitioning and quota scoping; `None` for kinds
    /// whose table has no category column.
    fn category(&self) -> Option<&str>;

    fn created_at(&self) -> DateTime<Utc>;

    /// Current value of a boolean flag; `None` when this kind does not
    /// carry the flag at all. A null column reads as `false`.
    fn flag(&self, flag: &str) -> Option<bool>;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BlogPost {
    pub id: String,
    pub title: String,
    /// Rich-text document as produced by the editor widget. Treated as an
    /// opaque string; never parsed on this side.
    pub content: String,
    pub category: String,
    #[serde(default)]
    pub subcategory: Option<String>,
    pub author: String,
    pub slug: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub featured: Option<bool>,
    #[serde(default)]
    pub featured_in_category: Option<bool>,
    #[serde(default)]
    pub popular: Option<bool>,
    #[serde(default)]
    pub popular_in_tech: Option<bool>,
    #[serde(default)]
    pub popular_in_games: Option<bool>,
    #[serde(default)]
    pub popular_in_entertainment: Option<bool>,
    #[serde(default)]
    pub popular_in_stocks: Option<bool>,
    #[serde(default)]
    pub popular_in_gadgets: Option<bool>,
    #[serde(default)]
    pub view_count: Option<i64>,
    #[serde(default)]
    pub share_count: Option<i64>,
    #[serde(default)]
    pub average_rating: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Resource for BlogPost {
    const KIND: ResourceKind = ResourceKind::Blog;

    fn id(&self) -> &str {
        &self.id
    }

    fn category(&self) -> Option<&str> {
        Some(&self.category)
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn flag(&self, flag: &str) -> Option<bool> {
        let value = match flag {
            "featured" => self.featured,
            "featured_in_category" => self.featured_in_category,
            "popular" => self.popular,
            "popular_in_tech" => self.popular_in_tech,
            "popular_in_games" => self.popular_in_games,
            "popular_in_entertainment" => self.popular_in_entertainment,
            "popular_in_stocks" => self.popular_in_stocks,
            "popular_in_gadgets" => self.popular_in_gadgets,
            _ => return None,
        };
        Some(value.unwrap_or(false))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MobileProduct {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub brand: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub image_url: Option<String>,
    pub display_specs: String,
    pub processor: String,
    #[serde(default)]
    pub ram: Option<String>,
    #[serde(default)]
    pub storage: Option<String>,
    pub battery: String,
    pub camera: String,
    #[serde(default)]
    pub os: Option<String>,
    #[serde(default)]
    pub chipset: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub resolution: Option<String>,
    #[serde(default)]
    pub screen_size: Option<String>,
    #[serde(default)]
    pub charging_specs: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Resource for MobileProduct {
    const KIND: ResourceKind = ResourceKind::Mobile;

    fn id(&self) -> &str {
        &self.id
    }

    fn category(&self) -> Option<&str> {
        None
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn flag(&self, _flag: &str) -> Option<bool> {
        None
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Laptop {
    pub id: String,
    pub name: String,
    pub brand: String,
    pub price: f64,
    #[serde(default)]
    pub image_url: Option<String>,
    pub display_specs: String,
    pub processor: String,
    pub ram: String,
    pub storage: String,
    pub battery: String,
    #[serde(default)]
    pub graphics: Option<String>,
    #[serde(default)]
    pub ports: Option<String>,
    #[serde(default)]
    pub os: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub model_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Resource for Laptop {
    const KIND: ResourceKind = ResourceKind::Laptop;

    fn id(&self) -> &str {
        &self.id
    }

    fn category(&self) -> Option<&str> {
        None
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn flag(&self, _flag: &str) -> Option<bool> {
        None
    }
}

/// Binary image payload attached to a draft before submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// A record under construction, as submitted by a form.
///
/// Drafts serialize to the insert row; any attached image is persisted via
/// the media store BEFORE the insert, and its public URL takes the place of
/// the binary payload.
pub trait Draft: Serialize + Send {
    /// Shape-level validation of the submitted fields.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Validation` describing the first problem found.
    fn validate(&self) -> Result<(), CatalogError>;

    fn category(&self) -> Option<&str> {
        None
    }

    fn subcategory(&self) -> Option<&str> {
        None
    }

    /// Takes the binary image out of the draft, leaving it image-less.
    fn take_image(&mut self) -> Option<ImageUpload>;

    fn attach_image_url(&mut self, url: String);
}

#[derive(Debug, Clone, Serialize)]
pub struct NewBlogPost {
    pub title: String,
    pub content: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    pub author: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip)]
    pub image: Option<ImageUpload>,
}

impl NewBlogPost {
    /// Builds a draft post with the slug derived from the title.
    #[must_use]
    pub fn new<S: Into<String>>(
        title: S,
        content: S,
        category: S,
        subcategory: Option<String>,
        author: S,
    ) -> Self {
        let title = title.into();
        let slug = slugify(&title);
        NewBlogPost {
            title,
            content: content.into(),
            category: category.into(),
            subcategory,
            author: author.into(),
            slug,
            image_url: None,
            image: None,
        }
    }

    #[must_use]
    pub fn with_image(mut self, file_name: String, bytes: Vec<u8>) -> Self {
        self.image = Some(ImageUpload { file_name, bytes });
        self
    }
}

impl Draft for NewBlogPost {
    fn validate(&self) -> Result<(), CatalogError> {
        if self.title.trim().is_empty() {
            return Err(CatalogError::Validation("a title is required".to_string()));
        }
        if self.content.trim().is_empty() {
            return Err(CatalogError::Validation(
                "the post body must not be empty".to_string(),
            ));
        }
        if self.author.trim().is_empty() {
            return Err(CatalogError::Validation("an author is required".to_string()));
        }
        if self.slug.is_empty() {
            return Err(CatalogError::Validation(format!(
                "no slug could be derived from the title '{}'",
                self.title
            )));
        }
        Ok(())
    }

    fn category(&self) -> Option<&str> {
        Some(&self.category)
    }

    fn subcategory(&self) -> Option<&str> {
        self.subcategory.as_deref()
    }

    fn take_image(&mut self) -> Option<ImageUpload> {
        self.image.take()
    }

    fn attach_image_url(&mut self, url: String) {
        self.image_url = Some(url);
    }
}

/// Draft for either product table; the mobile/laptop split is decided by
/// the controller it is submitted to, never by a table name in the draft.
#[derive(Debug, Clone, Serialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    pub price: f64,
    pub display_specs: String,
    pub processor: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ram: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<String>,
    pub battery: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub camera: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chipset: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graphics: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ports: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screen_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charging_specs: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip)]
    pub image: Option<ImageUpload>,
}

impl NewProduct {
    /// Builds a draft with the fields both product tables require; the
    /// remaining specification columns start empty.
    #[must_use]
    pub fn new<S: Into<String>>(
        name: S,
        price: f64,
        display_specs: S,
        processor: S,
        battery: S,
    ) -> Self {
        NewProduct {
            name: name.into(),
            brand: None,
            price,
            display_specs: display_specs.into(),
            processor: processor.into(),
            ram: None,
            storage: None,
            battery: battery.into(),
            camera: None,
            os: None,
            color: None,
            model_name: None,
            chipset: None,
            graphics: None,
            ports: None,
            resolution: None,
            screen_size: None,
            charging_specs: None,
            image_url: None,
            image: None,
        }
    }

    #[must_use]
    pub fn with_image(mut self, file_name: String, bytes: Vec<u8>) -> Self {
        self.image = Some(ImageUpload { file_name, bytes });
        self
    }
}

impl Draft for NewProduct {
    fn validate(&self) -> Result<(), CatalogError> {
        if self.name.trim().is_empty() {
            return Err(CatalogError::Validation("a name is required".to_string()));
        }
        if self.price <= 0.0 {
            return Err(CatalogError::Validation(format!(
                "price must be positive, got {}",
                self.price
            )));
        }
        Ok(())
    }

    fn take_image(&mut self) -> Option<ImageUpload> {
        self.image.take()
    }

    fn attach_image_url(&mut self, url: String) {
        self.image_url = Some(url);
    }
}

/// Counters tracked on blog rows and incremented server-side.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Counter {
    View,
    Share,
}

lazy_static! {
    static ref NON_SLUG: Regex = Regex::new("[^a-z0-9]+").expect("slug pattern");
}

/// Derives a URL slug from a post title: lowercased, with every run of
/// non-alphanumeric characters collapsed into a single hyphen.
#[must_use]
pub fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase();
    NON_SLUG
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}
