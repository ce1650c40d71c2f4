//! Matching of predecessor fragments to old wards.
//!
//! For every new unit, each [`SourceFragment`] is looked up among the old
//! wards of the provinces the unit's new province absorbed. A trailing
//! district qualifier is authoritative: when it names no district of a
//! province, that province contributes no candidates at all. Candidates are
//! scored with [`MatchWeights`] and the best score per old ward wins.

use std::collections::{BTreeMap, HashMap, HashSet};

use dvhc_model::raw::CatalogRow;
use dvhc_model::types::{
    MappingEntry, OldDistrict, OldWard, ProvinceStats, ReverseEntry, UnitType, WardIndexEntry,
    PARTIAL_NOTE,
};
use serde::{Deserialize, Serialize};

use crate::catalog::{CompleteRow, OldCatalog};
use crate::normalize::{infer_unit_type, normalize_vietnamese, strip_admin_prefix, strip_district_prefix};
use crate::sources::SourceFragment;
use crate::units::NewUnit;

/// Points awarded per matching signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchWeights {
    /// The fragment's district qualifier matched the candidate's district.
    pub parent_match: u32,
    /// The fragment named a ward (as opposed to "phần còn lại").
    pub named_fragment: u32,
    /// Old and new unit types agree (phường→phường, xã→xã).
    pub type_agreement: u32,
}

impl Default for MatchWeights {
    fn default() -> Self {
        Self {
            parent_match: 2,
            named_fragment: 1,
            type_agreement: 1,
        }
    }
}

/// Lookup structures over one old province's catalog.
#[derive(Debug, Clone)]
pub struct OldProvinceIndex {
    code: String,
    name: Option<String>,
    wards: Vec<OldWard>,
    wards_by_name: HashMap<String, Vec<usize>>,
    wards_by_district: HashMap<String, Vec<usize>>,
    districts_by_name: HashMap<String, Vec<String>>,
    districts_by_bare_name: HashMap<String, Vec<String>>,
    district_names: HashMap<String, String>,
}

impl OldProvinceIndex {
    pub fn new(
        code: &str,
        name: Option<&str>,
        districts: &[OldDistrict],
        wards: &[OldWard],
    ) -> Self {
        let mut index = Self {
            code: code.to_string(),
            name: name.map(str::to_string),
            wards: wards.to_vec(),
            wards_by_name: HashMap::new(),
            wards_by_district: HashMap::new(),
            districts_by_name: HashMap::new(),
            districts_by_bare_name: HashMap::new(),
            district_names: HashMap::new(),
        };

        for (position, ward) in index.wards.iter().enumerate() {
            index
                .wards_by_name
                .entry(strip_admin_prefix(&ward.name))
                .or_default()
                .push(position);
            index
                .wards_by_district
                .entry(ward.district_key.clone())
                .or_default()
                .push(position);
        }
        for district in districts {
            index
                .districts_by_name
                .entry(normalize_vietnamese(&district.name))
                .or_default()
                .push(district.key.clone());
            index
                .districts_by_bare_name
                .entry(strip_district_prefix(&district.name))
                .or_default()
                .push(district.key.clone());
            index
                .district_names
                .insert(district.key.clone(), district.name.clone());
        }
        index
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn wards(&self) -> &[OldWard] {
        &self.wards
    }

    /// Wards whose prefix-stripped name key equals `name_key`.
    pub fn wards_named(&self, name_key: &str) -> Vec<&OldWard> {
        self.positions(self.wards_by_name.get(name_key))
    }

    /// Every ward of the given districts, in catalog order.
    pub fn wards_in(&self, district_keys: &[String]) -> Vec<&OldWard> {
        let mut positions: Vec<usize> = district_keys
            .iter()
            .filter_map(|key| self.wards_by_district.get(key))
            .flatten()
            .copied()
            .collect();
        positions.sort_unstable();
        positions.dedup();
        positions.iter().map(|&p| &self.wards[p]).collect()
    }

    /// Districts a qualifier refers to. The full normalized name is tried
    /// first ("huyện Cần Giờ" = "Huyện Cần Giờ"); failing that, both sides
    /// are compared without their district-level prefix.
    pub fn districts_matching(&self, qualifier: &str) -> Vec<String> {
        if let Some(keys) = self.districts_by_name.get(&normalize_vietnamese(qualifier)) {
            return keys.clone();
        }
        let bare = strip_district_prefix(qualifier);
        if bare.is_empty() {
            return Vec::new();
        }
        self.districts_by_bare_name
            .get(&bare)
            .cloned()
            .unwrap_or_default()
    }

    pub fn district_name(&self, district_key: &str) -> Option<&str> {
        self.district_names.get(district_key).map(String::as_str)
    }

    fn positions(&self, positions: Option<&Vec<usize>>) -> Vec<&OldWard> {
        positions
            .map(|list| list.iter().map(|&p| &self.wards[p]).collect())
            .unwrap_or_default()
    }
}

/// Per-province indexes for every old province.
#[derive(Debug, Clone, Default)]
pub struct OldIndexes {
    by_province: BTreeMap<String, OldProvinceIndex>,
}

impl OldIndexes {
    pub fn from_catalog(catalog: &OldCatalog) -> Self {
        let mut indexes = Self::default();
        for province in &catalog.provinces {
            indexes.insert(OldProvinceIndex::new(
                &province.code,
                Some(&province.name),
                catalog.districts_of(&province.code),
                catalog.wards_of(&province.code),
            ));
        }
        indexes
    }

    pub fn insert(&mut self, index: OldProvinceIndex) {
        self.by_province.insert(index.code.clone(), index);
    }

    pub fn get(&self, code: &str) -> Option<&OldProvinceIndex> {
        self.by_province.get(code)
    }

    pub fn len(&self) -> usize {
        self.by_province.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_province.is_empty()
    }
}

/// Last-resort candidate source, keyed by province code and prefix-stripped
/// ward name. Built from the raw tabular rows, independently of the catalog.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryIndex {
    by_province: HashMap<String, HashMap<String, Vec<OldWard>>>,
}

impl DiscoveryIndex {
    pub fn from_rows(rows: &[CatalogRow]) -> Self {
        let mut index = Self::default();
        for row in rows.iter().filter_map(CompleteRow::from_row) {
            index.add(&row.province_code, row.to_ward());
        }
        index
    }

    /// Rebuilds the index from an emitted `ward-index.json`.
    pub fn from_ward_index(entries: &BTreeMap<String, Vec<WardIndexEntry>>) -> Self {
        let mut index = Self::default();
        for entry in entries.values().flatten() {
            let code = entry
                .ward_key
                .rsplit('-')
                .next()
                .unwrap_or_default()
                .to_string();
            let ward = OldWard {
                key: entry.ward_key.clone(),
                code,
                district_key: entry.district_key.clone(),
                name: entry.name.clone(),
                name_key: normalize_vietnamese(&entry.name),
            };
            index.add(&entry.province_code, ward);
        }
        index
    }

    fn add(&mut self, province_code: &str, ward: OldWard) {
        let bucket = self
            .by_province
            .entry(province_code.to_string())
            .or_default()
            .entry(strip_admin_prefix(&ward.name))
            .or_default();
        if !bucket.iter().any(|w| w.key == ward.key) {
            bucket.push(ward);
        }
    }

    pub fn lookup(&self, province_code: &str, name_key: &str) -> &[OldWard] {
        self.by_province
            .get(province_code)
            .and_then(|names| names.get(name_key))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Candidate old wards for one fragment within one old province.
#[derive(Debug, Clone, Default)]
pub struct Candidates<'a> {
    pub wards: Vec<&'a OldWard>,
    pub parent_matched: bool,
}

/// One old ward resolved for a new unit.
#[derive(Debug, Clone)]
pub struct Resolution<'a> {
    pub province: &'a OldProvinceIndex,
    pub ward: &'a OldWard,
    pub score: u32,
    pub partial: bool,
}

impl Resolution<'_> {
    pub fn note(&self) -> &'static str {
        if self.partial {
            PARTIAL_NOTE
        } else {
            ""
        }
    }

    pub fn reverse_entry(&self) -> ReverseEntry {
        ReverseEntry {
            old_key: self.ward.key.clone(),
            old_ward_code: self.ward.code.clone(),
            old_ward_type: infer_unit_type(&self.ward.name),
            old_name: self.ward.name.clone(),
            old_district_key: self.ward.district_key.clone(),
            old_district_name: self
                .province
                .district_name(&self.ward.district_key)
                .map(str::to_string),
            old_province_code: self.province.code.clone(),
            old_province_name: self.province.name.clone(),
            note: self.note().to_string(),
        }
    }
}

/// Resolves fragments to scored old wards. Shared by the batch build and by
/// the lookup client's reverse fallback.
#[derive(Debug, Clone, Copy)]
pub struct MatchingEngine<'a> {
    indexes: &'a OldIndexes,
    discovery: &'a DiscoveryIndex,
    weights: MatchWeights,
}

impl<'a> MatchingEngine<'a> {
    pub fn new(indexes: &'a OldIndexes, discovery: &'a DiscoveryIndex, weights: MatchWeights) -> Self {
        Self {
            indexes,
            discovery,
            weights,
        }
    }

    /// Candidate wards for `fragment` within one old province.
    pub fn candidates(&self, fragment: &SourceFragment, index: &'a OldProvinceIndex) -> Candidates<'a> {
        let name_key = strip_admin_prefix(&fragment.name);
        let districts = fragment
            .parent_district_name
            .as_deref()
            .map(|qualifier| index.districts_matching(qualifier));

        let mut wards = index.wards_named(&name_key);
        let mut parent_matched = false;

        if let Some(keys) = &districts {
            wards.retain(|w| keys.contains(&w.district_key));
            parent_matched = !wards.is_empty();

            if wards.is_empty() && fragment.is_partial && !keys.is_empty() {
                wards = index.wards_in(keys);
                parent_matched = true;
            }
        }

        if wards.is_empty() {
            wards = self
                .discovery
                .lookup(&index.code, &name_key)
                .iter()
                .filter(|w| districts.as_ref().map_or(true, |keys| keys.contains(&w.district_key)))
                .collect();
            parent_matched = districts.is_some() && !wards.is_empty();
        }

        Candidates {
            wards,
            parent_matched,
        }
    }

    pub fn score(
        &self,
        fragment: &SourceFragment,
        parent_matched: bool,
        ward: &OldWard,
        unit_type: Option<UnitType>,
    ) -> u32 {
        let mut score = 0;
        if parent_matched {
            score += self.weights.parent_match;
        }
        if !fragment.is_partial {
            score += self.weights.named_fragment;
        }
        let agrees = infer_unit_type(&ward.name)
            .zip(unit_type)
            .is_some_and(|(old, new)| old.agrees_with(new));
        if agrees {
            score += self.weights.type_agreement;
        }
        score
    }

    /// Resolves all fragments of one new unit against its allowed old
    /// provinces. An old ward is resolved at most once per unit; allowed
    /// codes without an index are skipped.
    pub fn resolve(
        &self,
        fragments: &[SourceFragment],
        unit_type: Option<UnitType>,
        allowed_old_codes: &[String],
    ) -> Vec<Resolution<'a>> {
        let mut assigned: HashSet<&'a str> = HashSet::new();
        let mut resolutions = Vec::new();

        for fragment in fragments {
            for code in allowed_old_codes {
                let Some(index) = self.indexes.get(code) else {
                    continue;
                };
                let candidates = self.candidates(fragment, index);
                for ward in candidates.wards {
                    if !assigned.insert(ward.key.as_str()) {
                        continue;
                    }
                    resolutions.push(Resolution {
                        province: index,
                        ward,
                        score: self.score(fragment, candidates.parent_matched, ward, unit_type),
                        partial: fragment.is_partial,
                    });
                }
            }
        }
        resolutions
    }
}

/// The accumulated old→new and new→old relations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Relations {
    /// Old province code → old ward key → best entry.
    pub forward: BTreeMap<String, BTreeMap<String, MappingEntry>>,
    /// New province code → new ward code → contributing old wards.
    pub reverse: BTreeMap<String, BTreeMap<String, Vec<ReverseEntry>>>,
}

impl Relations {
    /// Offers an entry for an old ward. It replaces the current one only when
    /// its score is strictly higher; identity entries are always replaced by
    /// scored ones. Returns whether the entry was taken.
    pub fn offer(&mut self, old_province_code: &str, old_key: &str, entry: MappingEntry) -> bool {
        let slot = self.forward.entry(old_province_code.to_string()).or_default();
        let replaces = match (slot.get(old_key), entry.match_score) {
            (None, _) => true,
            (Some(current), Some(score)) => current.match_score.map_or(true, |best| score > best),
            (Some(_), None) => false,
        };
        if replaces {
            slot.insert(old_key.to_string(), entry);
        }
        replaces
    }

    pub fn push_reverse(&mut self, new_province_code: &str, new_ward_code: &str, entry: ReverseEntry) {
        self.reverse
            .entry(new_province_code.to_string())
            .or_default()
            .entry(new_ward_code.to_string())
            .or_default()
            .push(entry);
    }

    /// Records every resolution of one new unit in both directions.
    pub fn record_unit(
        &mut self,
        unit: &NewUnit,
        province_stats: Option<&ProvinceStats>,
        resolutions: &[Resolution<'_>],
    ) {
        for resolution in resolutions {
            let entry = MappingEntry {
                province_new: unit.province.clone(),
                province_stats: province_stats.cloned(),
                ward_new: unit.ward_ref(),
                ward_stats: (!unit.stats.is_empty()).then(|| unit.stats.clone()),
                note: resolution.note().to_string(),
                match_score: Some(resolution.score),
            };
            self.offer(resolution.province.code(), &resolution.ward.key, entry);
            self.push_reverse(&unit.province.code, &unit.ward.code, resolution.reverse_entry());
        }
    }

    /// Forward entries of one old province, created empty on first use.
    pub fn forward_mut(&mut self, old_province_code: &str) -> &mut BTreeMap<String, MappingEntry> {
        self.forward.entry(old_province_code.to_string()).or_default()
    }

    pub fn mapped_count(&self) -> usize {
        self.forward.values().map(BTreeMap::len).sum()
    }

    pub fn identity_count(&self) -> usize {
        self.forward
            .values()
            .flat_map(BTreeMap::values)
            .filter(|entry| entry.is_identity())
            .count()
    }

    pub fn reverse_count(&self) -> usize {
        self.reverse
            .values()
            .flat_map(BTreeMap::values)
            .map(Vec::len)
            .sum()
    }
}
