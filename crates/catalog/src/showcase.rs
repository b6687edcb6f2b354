use serde::{Deserialize, Serialize};

use crate::CatalogError;

/// One slide of the mega showcase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShowcaseItem {
    pub name: String,
    /// Short label for the nav button.
    pub label: String,
    pub description: String,
    pub image: String,
    pub features: Vec<String>,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShowcaseCategory {
    pub key: String,
    pub icon: String,
    pub items: Vec<ShowcaseItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShowcaseCatalog {
    categories: Vec<ShowcaseCategory>,
}

impl ShowcaseCatalog {
    pub fn new(categories: Vec<ShowcaseCategory>) -> Result<Self, CatalogError> {
        for (i, c) in categories.iter().enumerate() {
            if categories[..i].iter().any(|o| o.key == c.key) {
                return Err(CatalogError::DuplicateCategory(c.key.clone()));
            }
        }
        Ok(Self { categories })
    }

    pub fn first_key(&self) -> Option<&str> {
        self.categories.first().map(|c| c.key.as_str())
    }

    pub fn category(&self, key: &str) -> Option<&ShowcaseCategory> {
        self.categories.iter().find(|c| c.key == key)
    }

    pub fn items(&self, key: &str) -> &[ShowcaseItem] {
        self.category(key).map(|c| c.items.as_slice()).unwrap_or(&[])
    }
}
