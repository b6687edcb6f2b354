use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::CatalogError;

/// Lot codes are matched trimmed and upper-cased.
pub fn normalize_code(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Chain-of-custody record for one lot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LotRecord {
    pub code: String,
    pub product: String,
    pub origin: String,
    pub vessel: String,
    pub catch_date: String,
    pub processed: String,
    pub shipped: String,
    pub arrived: String,
    pub supplier: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShipmentStatus {
    Processing,
    InTransit,
    Delivered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepStatus {
    Completed,
    InProgress,
    Pending,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JourneyStep {
    pub title: String,
    pub location: String,
    pub status: StepStatus,
    /// Ordered label/value pairs shown under the step.
    pub details: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Shipment {
    pub code: String,
    pub product: String,
    pub status: ShipmentStatus,
    pub steps: Vec<JourneyStep>,
}

impl Shipment {
    /// Index of the step currently in progress, if any.
    pub fn active_step(&self) -> Option<usize> {
        self.steps
            .iter()
            .position(|s| s.status == StepStatus::InProgress)
    }
}

/// Lots and shipments keyed by normalized code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceCatalog {
    lots: BTreeMap<String, LotRecord>,
    shipments: BTreeMap<String, Shipment>,
}

impl TraceCatalog {
    pub fn new(lots: Vec<LotRecord>, shipments: Vec<Shipment>) -> Result<Self, CatalogError> {
        let mut out = Self::default();
        for lot in lots {
            let key = normalize_code(&lot.code);
            if out.lots.insert(key.clone(), lot).is_some() {
                return Err(CatalogError::DuplicateCode(key));
            }
        }
        for shipment in shipments {
            let key = normalize_code(&shipment.code);
            if out.shipments.insert(key.clone(), shipment).is_some() {
                return Err(CatalogError::DuplicateCode(key));
            }
        }
        Ok(out)
    }

    pub fn lot(&self, code: &str) -> Option<&LotRecord> {
        self.lots.get(&normalize_code(code))
    }

    pub fn shipment(&self, code: &str) -> Option<&Shipment> {
        self.shipments.get(&normalize_code(code))
    }

    pub fn lot_codes(&self) -> impl Iterator<Item = &str> {
        self.lots.keys().map(String::as_str)
    }

    pub fn shipment_codes(&self) -> impl Iterator<Item = &str> {
        self.shipments.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::{ShipmentStatus, StepStatus, normalize_code};
    use crate::SiteData;
    use pretty_assertions::assert_eq;

    #[test]
    fn codes_are_normalized() {
        assert_eq!(normalize_code("  cs2024-001 "), "CS2024-001");
        let data = SiteData::builtin().unwrap();
        let lot = data.trace.lot(" vm2024-002").unwrap();
        assert_eq!(lot.code, "VM2024-002");
        assert!(data.trace.lot("XX0000-000").is_none());
    }

    #[test]
    fn shipment_steps_parse() {
        let data = SiteData::builtin().unwrap();
        let s = data.trace.shipment("pcf-2024-0456").unwrap();
        assert_eq!(s.status, ShipmentStatus::InTransit);
        assert_eq!(s.steps[0].status, StepStatus::Completed);
        assert_eq!(s.active_step(), Some(2));
        assert_eq!(
            s.steps[0].details[2],
            ("vessel".to_string(), "Pacific Dream".to_string())
        );
    }
}
