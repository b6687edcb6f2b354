use std::collections::BTreeSet;

use foundation::LatLng;
use serde::{Deserialize, Serialize};

use crate::CatalogError;

/// A pin on the sourcing map. Identity is `name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourcingLocation {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub products: Vec<String>,
    pub supplier: String,
    pub shipments: String,
    pub description: String,
    pub flag: String,
}

impl SourcingLocation {
    pub fn position(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }

    pub fn supplies(&self, product: &str) -> bool {
        self.products.iter().any(|p| p == product)
    }
}

/// Sourcing locations keyed by unique name, in catalog order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationCatalog {
    locations: Vec<SourcingLocation>,
}

impl LocationCatalog {
    pub fn new(locations: Vec<SourcingLocation>) -> Result<Self, CatalogError> {
        let mut seen = BTreeSet::new();
        for loc in &locations {
            if !seen.insert(loc.name.as_str()) {
                return Err(CatalogError::DuplicateLocation(loc.name.clone()));
            }
            if !loc.position().is_valid() {
                return Err(CatalogError::InvalidCoordinates(loc.name.clone()));
            }
        }
        Ok(Self { locations })
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&SourcingLocation> {
        self.locations.iter().find(|l| l.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourcingLocation> {
        self.locations.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::{LocationCatalog, SourcingLocation};
    use crate::{CatalogError, SiteData};
    use foundation::LatLng;

    fn loc(name: &str, lat: f64, lng: f64) -> SourcingLocation {
        SourcingLocation {
            name: name.into(),
            lat,
            lng,
            products: vec!["Tilapia".into()],
            supplier: String::new(),
            shipments: String::new(),
            description: String::new(),
            flag: String::new(),
        }
    }

    #[test]
    fn looks_up_by_name() {
        let data = SiteData::builtin().unwrap();
        let ecuador = data.locations.get("Ecuador").unwrap();
        assert_eq!(ecuador.position(), LatLng::new(-1.8312, -78.1834));
        assert!(ecuador.supplies("White Shrimp"));
        assert!(data.locations.get("NoSuchPlace").is_none());
    }

    #[test]
    fn names_must_be_unique() {
        let err = LocationCatalog::new(vec![loc("China", 35.0, 104.0), loc("China", 1.0, 1.0)])
            .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateLocation(n) if n == "China"));
    }

    #[test]
    fn coordinates_must_be_in_range() {
        let err = LocationCatalog::new(vec![loc("Nowhere", 120.0, 0.0)]).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidCoordinates(_)));
    }
}
