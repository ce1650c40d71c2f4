//! Ingestion of the new-unit dump.
//!
//! The dump mixes two row schemas at arbitrary depth (see
//! [`dvhc_model::raw::collect_unit_rows`]). Rows for the same unit may repeat,
//! sometimes with the predecessor text only on one copy; duplicates are merged
//! before matching.

use std::collections::{BTreeMap, HashMap};

use dvhc_model::raw::{pad_code, UnitRecord, PROVINCE_CODE_WIDTH, WARD_CODE_WIDTH};
use dvhc_model::types::{NewWard, ProvinceRef, UnitType, WardRef, WardStats};

use crate::normalize::{normalize_province_name, normalize_vietnamese, parse_unit_type, split_unit_prefix};
use crate::province_merge::ProvinceMergeMap;

/// A new ward-level unit ready for matching.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUnit {
    pub province: ProvinceRef,
    pub ward: NewWard,
    pub stats: WardStats,
    /// Raw predecessor text, if any copy of the unit carried one.
    pub predecessors: Option<String>,
}

impl NewUnit {
    pub fn ward_ref(&self) -> WardRef {
        WardRef {
            code: self.ward.code.clone(),
            unit_type: self.ward.unit_type,
            name: self.ward.name.clone(),
        }
    }

    fn absorb(&mut self, other: NewUnit) {
        if self.predecessors.is_none() {
            self.predecessors = other.predecessors;
        }
        if self.ward.district_code.is_none() {
            self.ward.district_code = other.ward.district_code;
        }
        let stats = &mut self.stats;
        stats.area_km2 = stats.area_km2.take().or(other.stats.area_km2);
        stats.population = stats.population.take().or(other.stats.population);
        stats.admin_center = stats.admin_center.take().or(other.stats.admin_center);
    }
}

type RecoveryKey = (String, UnitType, String);

/// Deduplicated new units in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct UnitCatalog {
    units: Vec<NewUnit>,
    /// Rows dropped because their type or province could not be determined.
    pub skipped: usize,
    /// Units whose predecessor text came from a differently coded duplicate.
    pub recovered: usize,
}

impl UnitCatalog {
    /// Merges raw records into units, resolving each record's new province
    /// against the merger data.
    pub fn ingest(records: Vec<UnitRecord>, merge: &ProvinceMergeMap) -> Self {
        let mut catalog = Self::default();
        let mut positions: HashMap<(String, String), usize> = HashMap::new();
        let mut texts: HashMap<RecoveryKey, String> = HashMap::new();

        for record in records {
            let Some(unit) = to_unit(record, merge) else {
                catalog.skipped += 1;
                continue;
            };

            if let Some(text) = &unit.predecessors {
                texts
                    .entry(recovery_key(&unit))
                    .or_insert_with(|| text.clone());
            }

            let key = (unit.province.code.clone(), unit.ward.code.clone());
            match positions.get(&key) {
                Some(&position) => catalog.units[position].absorb(unit),
                None => {
                    positions.insert(key, catalog.units.len());
                    catalog.units.push(unit);
                }
            }
        }

        for unit in catalog.units.iter_mut().filter(|u| u.predecessors.is_none()) {
            if let Some(text) = texts.get(&recovery_key(unit)) {
                unit.predecessors = Some(text.clone());
                catalog.recovered += 1;
            }
        }

        tracing::info!(
            "New units: {} ingested, {} with predecessor text, {} rows skipped",
            catalog.units.len(),
            catalog.units.iter().filter(|u| u.predecessors.is_some()).count(),
            catalog.skipped
        );
        catalog
    }

    pub fn units(&self) -> &[NewUnit] {
        &self.units
    }

    /// Ward catalog per new province, sorted by normalized name then code.
    pub fn new_wards(&self) -> BTreeMap<String, Vec<NewWard>> {
        let mut grouped: BTreeMap<String, Vec<NewWard>> = BTreeMap::new();
        for unit in &self.units {
            grouped
                .entry(unit.province.code.clone())
                .or_default()
                .push(unit.ward.clone());
        }
        for wards in grouped.values_mut() {
            wards.sort_by_cached_key(|w| (normalize_vietnamese(&w.name), w.code.clone()));
        }
        grouped
    }

    /// Raw predecessor text per new province and ward code.
    pub fn sources(&self) -> BTreeMap<String, BTreeMap<String, String>> {
        let mut grouped: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
        for unit in &self.units {
            if let Some(text) = &unit.predecessors {
                grouped
                    .entry(unit.province.code.clone())
                    .or_default()
                    .insert(unit.ward.code.clone(), text.clone());
            }
        }
        grouped
    }
}

fn recovery_key(unit: &NewUnit) -> RecoveryKey {
    (
        normalize_province_name(&unit.province.name),
        unit.ward.unit_type,
        normalize_vietnamese(&unit.ward.name),
    )
}

fn resolve_province(record: &UnitRecord, merge: &ProvinceMergeMap) -> Option<ProvinceRef> {
    if let Some(found) = record
        .province_name
        .as_deref()
        .and_then(|name| merge.new_province_by_name(name))
    {
        return Some(found.clone());
    }

    let code = pad_code(record.province_code.as_deref()?, PROVINCE_CODE_WIDTH);
    match merge.new_province(&code) {
        Some(province) => Some(ProvinceRef {
            code: province.code.clone(),
            name: province.name.clone(),
        }),
        None => Some(ProvinceRef {
            name: record.province_name.clone().unwrap_or_else(|| code.clone()),
            code,
        }),
    }
}

fn to_unit(record: UnitRecord, merge: &ProvinceMergeMap) -> Option<NewUnit> {
    let Some(province) = resolve_province(&record, merge) else {
        tracing::debug!("Skipping unit {} without a province reference", record.code);
        return None;
    };

    let (prefix_type, bare_name) = split_unit_prefix(&record.name);
    let labelled = record.unit_type.as_deref().and_then(parse_unit_type);
    let Some(unit_type) = labelled.or(prefix_type) else {
        tracing::warn!(
            "Skipping unit {} '{}': unknown type {:?}",
            record.code,
            record.name,
            record.unit_type
        );
        return None;
    };
    let name = if prefix_type == Some(unit_type) {
        bare_name
    } else {
        record.name.trim()
    };

    let district_code = record
        .tree_path
        .as_deref()
        .and_then(|path| path.split('.').next())
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string);

    Some(NewUnit {
        ward: NewWard {
            code: pad_code(&record.code, WARD_CODE_WIDTH),
            unit_type,
            name: name.to_string(),
            district_code,
        },
        province,
        stats: record.stats,
        predecessors: record.predecessors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dvhc_model::raw::ProvinceMergeRecord;
    use dvhc_model::types::OldProvince;

    fn merge_map() -> ProvinceMergeMap {
        let records = vec![ProvinceMergeRecord {
            code: Some("79".to_string()),
            name: Some("Thành phố Hồ Chí Minh".to_string()),
            ..Default::default()
        }];
        let old = vec![OldProvince {
            code: "01".to_string(),
            name: "Thành phố Hồ Chí Minh".to_string(),
            name_key: "thanh pho ho chi minh".to_string(),
        }];
        ProvinceMergeMap::resolve(&records, &old).unwrap()
    }

    fn record(code: &str, name: &str, label: Option<&str>, text: Option<&str>) -> UnitRecord {
        UnitRecord {
            province_code: Some("79".to_string()),
            province_name: Some("Thành phố Hồ Chí Minh".to_string()),
            code: code.to_string(),
            unit_type: label.map(str::to_string),
            name: name.to_string(),
            predecessors: text.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_ingest_resolves_province_alias() {
        let mut alias = record("00900", "Bình Khánh", Some("xã"), None);
        alias.province_name = Some("TP HCM".to_string());
        alias.province_code = None;
        let catalog = UnitCatalog::ingest(vec![alias], &merge_map());

        assert_eq!(catalog.units().len(), 1);
        assert_eq!(catalog.units()[0].province.code, "79");
        assert_eq!(catalog.units()[0].province.name, "Thành phố Hồ Chí Minh");
    }

    #[test]
    fn test_ingest_unknown_province_keeps_source_identity() {
        let mut stray = record("01000", "Phúc Xá", Some("phường"), None);
        stray.province_code = Some("1".to_string());
        stray.province_name = Some("Thành phố Hà Nội".to_string());
        let catalog = UnitCatalog::ingest(vec![stray], &merge_map());

        let province = &catalog.units()[0].province;
        assert_eq!(province.code, "01");
        assert_eq!(province.name, "Thành phố Hà Nội");
    }

    #[test]
    fn test_ingest_merges_duplicates() {
        let first = record("00700", "Thạnh An", Some("xã"), None);
        let mut second = record("00700", "Thạnh An", Some("Xã"), Some("Xã Thạnh An (huyện Cần Giờ)"));
        second.tree_path = Some("760.00700".to_string());
        let catalog = UnitCatalog::ingest(vec![first, second], &merge_map());

        assert_eq!(catalog.units().len(), 1);
        let unit = &catalog.units()[0];
        assert_eq!(unit.predecessors.as_deref(), Some("Xã Thạnh An (huyện Cần Giờ)"));
        assert_eq!(unit.ward.district_code.as_deref(), Some("760"));
        assert_eq!(catalog.recovered, 0);
    }

    #[test]
    fn test_ingest_recovers_text_by_name() {
        let bare = record("00700", "Thạnh An", Some("xã"), None);
        let recoded = record("00701", "Thạnh An", Some("xã"), Some("Xã Thạnh An"));
        let catalog = UnitCatalog::ingest(vec![bare, recoded], &merge_map());

        assert_eq!(catalog.units().len(), 2);
        assert_eq!(catalog.units()[0].predecessors.as_deref(), Some("Xã Thạnh An"));
        assert_eq!(catalog.recovered, 1);
    }

    #[test]
    fn test_ingest_type_from_name_prefix() {
        let catalog = UnitCatalog::ingest(
            vec![record("00100", "Phường Sài Gòn", None, None)],
            &merge_map(),
        );
        let ward = &catalog.units()[0].ward;
        assert_eq!(ward.unit_type, UnitType::Ward);
        assert_eq!(ward.name, "Sài Gòn");
    }

    #[test]
    fn test_ingest_skips_unknown_type() {
        let catalog = UnitCatalog::ingest(
            vec![record("00100", "Sài Gòn", Some("quận"), None)],
            &merge_map(),
        );
        assert!(catalog.units().is_empty());
        assert_eq!(catalog.skipped, 1);
    }

    #[test]
    fn test_new_wards_sorted_by_name() {
        let catalog = UnitCatalog::ingest(
            vec![
                record("00300", "Cần Giờ", Some("xã"), None),
                record("00100", "Sài Gòn", Some("phường"), Some("Phường Bến Nghé")),
                record("00200", "Bình Khánh", Some("xã"), None),
            ],
            &merge_map(),
        );
        let wards = catalog.new_wards();
        let names: Vec<&str> = wards["79"].iter().map(|w| w.name.as_str()).collect();
        assert_eq!(names, vec!["Bình Khánh", "Cần Giờ", "Sài Gòn"]);

        let sources = catalog.sources();
        assert_eq!(sources["79"].len(), 1);
        assert_eq!(sources["79"]["00100"], "Phường Bến Nghé");
    }
}
