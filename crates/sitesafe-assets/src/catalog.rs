//! Equipment catalog: the category keys used in asset counts.
//!
//! The dashboard's settings panel addresses asset categories by camel-case
//! keys (`"dumpTrucks"`, `"towerCranes"`, ...). The catalog maps each key
//! to its [`AssetType`] and fixes the order in which the factory creates
//! assets.

use std::collections::BTreeMap;

use sitesafe_types::{AssetCounts, AssetType, SiteSection};

/// One category of the equipment catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Key used in [`AssetCounts`].
    pub key: &'static str,
    /// Asset type created for this key.
    pub asset_type: AssetType,
}

const fn entry(key: &'static str, asset_type: AssetType) -> CatalogEntry {
    CatalogEntry { key, asset_type }
}

/// Every category, in the order assets are generated.
pub const CATALOG: [CatalogEntry; 15] = [
    entry("workers", AssetType::Worker),
    entry("excavators", AssetType::Excavator),
    entry("dozer", AssetType::Dozer),
    entry("loaders", AssetType::Loader),
    entry("dumpTrucks", AssetType::DumpTruck),
    entry("forklifts", AssetType::Forklift),
    entry("mixerTrucks", AssetType::MixerTruck),
    entry("towerCranes", AssetType::TowerCrane),
    entry("mobileCranes", AssetType::MobileCrane),
    entry("liftHoists", AssetType::LiftHoist),
    entry("pumpCars", AssetType::PumpCar),
    entry("asphaltFinishers", AssetType::AsphaltFinisher),
    entry("rollers", AssetType::Roller),
    entry("pileDrivers", AssetType::PileDriver),
    entry("drillRigs", AssetType::DrillRig),
];

/// Worker counts for the first three sections of the default site.
const DEFAULT_WORKERS: [u32; 3] = [3, 5, 6];

/// Look up the asset type for a category key.
pub fn asset_type_for_key(key: &str) -> Option<AssetType> {
    CATALOG.iter().find(|e| e.key == key).map(|e| e.asset_type)
}

/// Whether `key` names a catalog category.
pub fn is_known_key(key: &str) -> bool {
    asset_type_for_key(key).is_some()
}

/// Default per-section counts: one of every piece of equipment, plus
/// 3, 5 and 6 workers in the first three sections (none in later ones).
pub fn default_counts(sections: &[SiteSection]) -> AssetCounts {
    sections
        .iter()
        .enumerate()
        .map(|(index, section)| {
            let workers = DEFAULT_WORKERS.get(index).copied().unwrap_or(0);
            let counts: BTreeMap<String, u32> = CATALOG
                .iter()
                .map(|e| {
                    let n = if e.asset_type.is_worker() { workers } else { 1 };
                    (e.key.to_string(), n)
                })
                .collect();
            (section.name.clone(), counts)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use sitesafe_types::LatLon;

    use super::*;

    fn section(name: &str) -> SiteSection {
        SiteSection {
            name: name.to_string(),
            center: LatLon::new(37.545, 127.215),
            zoom: 18,
        }
    }

    #[test]
    fn catalog_covers_every_asset_type_once() {
        let types: Vec<AssetType> = CATALOG.iter().map(|e| e.asset_type).collect();
        assert_eq!(types, AssetType::ALL.to_vec());
    }

    #[test]
    fn keys_resolve_to_types() {
        assert_eq!(asset_type_for_key("dumpTrucks"), Some(AssetType::DumpTruck));
        assert_eq!(asset_type_for_key("dozer"), Some(AssetType::Dozer));
        assert_eq!(asset_type_for_key("cranes"), None);
        assert!(!is_known_key(""));
    }

    #[test]
    fn default_counts_follow_section_order() {
        let sections = vec![section("A"), section("B"), section("C"), section("D")];
        let counts = default_counts(&sections);
        let workers: Vec<u32> = sections
            .iter()
            .map(|s| counts.get(&s.name).and_then(|c| c.get("workers")).copied().unwrap_or(99))
            .collect();
        assert_eq!(workers, vec![3, 5, 6, 0]);
        let a = counts.get("A").cloned().unwrap_or_default();
        assert_eq!(a.len(), CATALOG.len());
        assert_eq!(a.get("towerCranes"), Some(&1));
    }
}
