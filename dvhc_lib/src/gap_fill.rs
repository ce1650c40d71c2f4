//! Identity backfill for old wards no predecessor text mentioned.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use dvhc_model::types::{MappingEntry, OldWard, ProvinceRef, UnitType, WardRef};

use crate::catalog::OldCatalog;
use crate::matching::Relations;
use crate::normalize::split_unit_prefix;
use crate::province_merge::ProvinceMergeMap;

/// Identity entry for an unmatched old ward: same code and name (without
/// its type word) under the province its old province merged into.
pub fn identity_entry(ward: &OldWard, successor: &ProvinceRef) -> MappingEntry {
    let (unit_type, name) = split_unit_prefix(&ward.name);
    MappingEntry {
        province_new: successor.clone(),
        province_stats: None,
        ward_new: WardRef {
            code: ward.code.clone(),
            unit_type: unit_type.unwrap_or(UnitType::Commune),
            name: name.to_string(),
        },
        ward_stats: None,
        note: String::new(),
        match_score: None,
    }
}

/// Fills every vacant slot of one old province. Existing entries are never
/// touched, so calling this again changes nothing. Returns the number of
/// entries added.
pub fn fill_province(
    forward: &mut BTreeMap<String, MappingEntry>,
    wards: &[OldWard],
    successor: &ProvinceRef,
) -> usize {
    let mut filled = 0;
    for ward in wards {
        if let Entry::Vacant(slot) = forward.entry(ward.key.clone()) {
            slot.insert(identity_entry(ward, successor));
            filled += 1;
        }
    }
    filled
}

/// Fills the given old provinces.
pub fn fill_provinces<'c>(
    relations: &mut Relations,
    catalog: &OldCatalog,
    merge: &ProvinceMergeMap,
    codes: impl IntoIterator<Item = &'c str>,
) -> usize {
    let mut filled = 0;
    for code in codes {
        let Some(province) = catalog.province(code) else {
            continue;
        };
        let successor = merge.successor_of(province);
        filled += fill_province(relations.forward_mut(code), catalog.wards_of(code), &successor);
    }
    filled
}

/// Final sweep over every old province in the catalog. Afterwards each old
/// ward has exactly one forward entry.
pub fn fill_gaps(relations: &mut Relations, catalog: &OldCatalog, merge: &ProvinceMergeMap) -> usize {
    let filled = fill_provinces(
        relations,
        catalog,
        merge,
        catalog.provinces.iter().map(|p| p.code.as_str()),
    );
    tracing::info!("Gap filler added {} identity entries", filled);
    filled
}
