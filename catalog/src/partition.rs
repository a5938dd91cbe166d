//! Grouping of a flat resource list into per-category views.
//!
//! The category set is closed and configuration-driven; partitioning always
//! yields one entry per configured category, in configuration order, so that
//! callers render an empty section rather than omitting it.
use crate::config::CategorySpec;
use crate::types::Resource;

/// The fixed, ordered set of known categories with their subcategories.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CategorySet {
    specs: Vec<CategorySpec>,
}

impl CategorySet {
    #[must_use]
    pub fn new(specs: Vec<CategorySpec>) -> Self {
        CategorySet { specs }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.specs.iter().map(|spec| spec.key.as_str())
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.specs.iter().any(|spec| spec.key == key)
    }

    /// Whether `subcategory` is listed under `category`.
    #[must_use]
    pub fn allows(&self, category: &str, subcategory: &str) -> bool {
        self.specs
            .iter()
            .find(|spec| spec.key == category)
            .is_some_and(|spec| spec.subcategories.iter().any(|s| s == subcategory))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

/// One category's slice of a resource list. Non-owning; recomputed on every
/// list change, never mutated independently.
#[derive(Debug)]
pub struct CategoryPartition<'a, R> {
    pub category: &'a str,
    pub items: Vec<&'a R>,
}

/// Groups `list` by category, preserving the list's relative order inside
/// each partition and the category set's order across partitions.
/// Categories with no matching resources still appear, empty.
#[must_use]
pub fn partition<'a, R: Resource>(
    list: &'a [R],
    categories: &'a CategorySet,
) -> Vec<CategoryPartition<'a, R>> {
    categories
        .keys()
        .map(|key| CategoryPartition {
            category: key,
            items: list
                .iter()
                .filter(|resource| resource.category() == Some(key))
                .collect(),
        })
        .collect()
}
