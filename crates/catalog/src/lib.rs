//! Static catalogs behind the sourcing site: products per category, sourcing
//! locations, showcase items and trace records.
//!
//! Everything is loaded once at startup and is read-only afterwards.

pub mod locations;
pub mod products;
pub mod showcase;
pub mod trace;

pub use locations::*;
pub use products::*;
pub use showcase::*;
pub use trace::*;

use serde::Deserialize;

/// The built-in data set shipped with the site.
pub const BUILTIN_JSON: &str = include_str!("../data/site.json");

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog data is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate category key: {0}")]
    DuplicateCategory(String),
    #[error("duplicate sourcing location: {0}")]
    DuplicateLocation(String),
    #[error("location {0} has out-of-range coordinates")]
    InvalidCoordinates(String),
    #[error("product {product} links to unknown location {location}")]
    UnknownSourcingLocation { product: String, location: String },
    #[error("duplicate trace code: {0}")]
    DuplicateCode(String),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSiteData {
    categories: Vec<Category>,
    locations: Vec<SourcingLocation>,
    #[serde(default)]
    showcase: Vec<ShowcaseCategory>,
    #[serde(default)]
    lots: Vec<LotRecord>,
    #[serde(default)]
    shipments: Vec<Shipment>,
}

/// All catalogs, validated against each other.
#[derive(Debug, Clone)]
pub struct SiteData {
    pub products: ProductCatalog,
    pub locations: LocationCatalog,
    pub showcase: ShowcaseCatalog,
    pub trace: TraceCatalog,
}

impl SiteData {
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json_str(BUILTIN_JSON)
    }

    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let raw: RawSiteData = serde_json::from_str(json)?;
        let products = ProductCatalog::new(raw.categories)?;
        let locations = LocationCatalog::new(raw.locations)?;

        for product in products.all() {
            if let Some(link) = &product.sourcing
                && locations.get(&link.location).is_none()
            {
                return Err(CatalogError::UnknownSourcingLocation {
                    product: product.name.clone(),
                    location: link.location.clone(),
                });
            }
        }

        let showcase = ShowcaseCatalog::new(raw.showcase)?;
        let trace = TraceCatalog::new(raw.lots, raw.shipments)?;
        tracing::debug!(
            categories = products.len(),
            locations = locations.len(),
            "catalogs loaded"
        );

        Ok(Self {
            products,
            locations,
            showcase,
            trace,
        })
    }
}
