use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::CatalogError;

/// Where a product card's "see where we catch it" action points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcingLink {
    pub location: String,
    /// Product name to highlight in the location's tooltip.
    pub product: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Product {
    pub name: String,
    pub description: String,
    pub details: Vec<String>,
    pub icon: String,
    #[serde(default)]
    pub is_image: bool,
    #[serde(default)]
    pub stamp: Option<String>,
    #[serde(default)]
    pub logo_overlay: Option<String>,
    #[serde(default)]
    pub logo_overlay_left: Option<String>,
    #[serde(default)]
    pub sourcing: Option<SourcingLink>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Category {
    pub key: String,
    pub label: String,
    pub products: Vec<Product>,
}

/// Products grouped by category key, in catalog order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductCatalog {
    categories: Vec<Category>,
}

impl ProductCatalog {
    pub fn new(categories: Vec<Category>) -> Result<Self, CatalogError> {
        let mut seen = BTreeSet::new();
        for c in &categories {
            if !seen.insert(c.key.as_str()) {
                return Err(CatalogError::DuplicateCategory(c.key.clone()));
            }
        }
        Ok(Self { categories })
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.key.as_str())
    }

    pub fn category(&self, key: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.key == key)
    }

    /// Products for `key`; an unknown key yields an empty slice.
    pub fn products(&self, key: &str) -> &[Product] {
        self.category(key).map(|c| c.products.as_slice()).unwrap_or(&[])
    }

    pub fn all(&self) -> impl Iterator<Item = &Product> {
        self.categories.iter().flat_map(|c| c.products.iter())
    }

    pub fn find_product(&self, name: &str) -> Option<&Product> {
        self.all().find(|p| p.name == name)
    }
}
