//! Old↔new province correspondence from the per-new-province merger records.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use dvhc_model::raw::{pad_code, ProvinceMergeRecord, PROVINCE_CODE_WIDTH};
use dvhc_model::types::{NewProvince, OldProvince, ProvinceRef, ProvinceStats};
use regex::Regex;

use crate::normalize::normalize_province_name;

/// Splits an absorbed-provinces list on commas and on the words "và"/"and".
const PREDECESSOR_SEPARATOR: &str = r"(?i)\s*,\s*|\s+(?:và|and)\s+";

/// Resolved province correspondence.
///
/// Built once per run from the merger records and the old province catalog.
#[derive(Debug, Clone, Default)]
pub struct ProvinceMergeMap {
    provinces: Vec<NewProvince>,
    new_by_key: HashMap<String, ProvinceRef>,
    old_key_to_new: HashMap<String, ProvinceRef>,
    old_code_by_key: HashMap<String, String>,
    new_to_old_codes: BTreeMap<String, BTreeSet<String>>,
    unresolved: Vec<String>,
}

impl ProvinceMergeMap {
    /// Resolves every merger record against the old province catalog.
    ///
    /// Absorbed names that match no old province stay in the name map but add
    /// no code to the new province's scope; they are reported by
    /// [`Self::unresolved`].
    pub fn resolve(
        records: &[ProvinceMergeRecord],
        old_provinces: &[OldProvince],
    ) -> Result<Self, regex::Error> {
        let separator = Regex::new(PREDECESSOR_SEPARATOR)?;
        let mut map = Self {
            old_code_by_key: old_provinces
                .iter()
                .map(|p| (normalize_province_name(&p.name), p.code.clone()))
                .collect(),
            ..Self::default()
        };
        let mut provinces: BTreeMap<String, NewProvince> = BTreeMap::new();

        for record in records {
            let (Some(code), Some(name)) = (record.code.as_deref(), record.name.as_deref()) else {
                tracing::debug!("Skipping province record without code or name");
                continue;
            };
            let code = pad_code(code, PROVINCE_CODE_WIDTH);
            let province = ProvinceRef {
                code: code.clone(),
                name: name.to_string(),
            };
            let new_key = normalize_province_name(name);

            map.new_by_key.insert(new_key.clone(), province.clone());
            map.old_key_to_new
                .entry(new_key.clone())
                .or_insert_with(|| province.clone());
            let scope = map.new_to_old_codes.entry(code.clone()).or_default();
            if let Some(old_code) = map.old_code_by_key.get(&new_key) {
                scope.insert(old_code.clone());
            }

            let predecessors = record.predecessors.as_deref().unwrap_or_default();
            for part in separator.split(predecessors) {
                let old_key = normalize_province_name(part);
                if old_key.is_empty() {
                    continue;
                }
                map.old_key_to_new.insert(old_key.clone(), province.clone());
                match map.old_code_by_key.get(&old_key) {
                    Some(old_code) => {
                        scope.insert(old_code.clone());
                    }
                    None => {
                        tracing::warn!(
                            "Province '{}' absorbed into {} matches no old province",
                            part.trim(),
                            code
                        );
                        map.unresolved.push(part.trim().to_string());
                    }
                }
            }

            provinces.entry(code.clone()).or_insert_with(|| NewProvince {
                code,
                name: name.to_string(),
                stats: record.stats(),
            });
        }

        map.provinces = provinces.into_values().collect();
        tracing::info!(
            "Province merge: {} new provinces, {} old names mapped, {} unresolved",
            map.provinces.len(),
            map.old_key_to_new.len(),
            map.unresolved.len()
        );
        Ok(map)
    }

    /// New provinces sorted by code.
    pub fn provinces(&self) -> &[NewProvince] {
        &self.provinces
    }

    pub fn new_province(&self, code: &str) -> Option<&NewProvince> {
        self.provinces.iter().find(|p| p.code == code)
    }

    pub fn stats_of(&self, code: &str) -> Option<&ProvinceStats> {
        self.new_province(code)
            .map(|p| &p.stats)
            .filter(|stats| !stats.is_empty())
    }

    /// Looks a new province up by any spelling of its name.
    pub fn new_province_by_name(&self, name: &str) -> Option<&ProvinceRef> {
        self.new_by_key.get(&normalize_province_name(name))
    }

    /// New province an old province merged into, or the old province itself
    /// when no merger mentions it.
    pub fn successor_of(&self, old: &OldProvince) -> ProvinceRef {
        self.old_key_to_new
            .get(&normalize_province_name(&old.name))
            .cloned()
            .unwrap_or_else(|| ProvinceRef {
                code: old.code.clone(),
                name: old.name.clone(),
            })
    }

    /// Old province codes a new province may draw wards from.
    ///
    /// Falls back to the old province sharing the new province's name when the
    /// merger records give no scope at all.
    pub fn allowed_old_codes(&self, new_code: &str, new_name: &str) -> Vec<String> {
        match self.new_to_old_codes.get(new_code) {
            Some(codes) if !codes.is_empty() => codes.iter().cloned().collect(),
            _ => self
                .old_code_by_key
                .get(&normalize_province_name(new_name))
                .cloned()
                .into_iter()
                .collect(),
        }
    }

    /// New province code → old province codes, for `new-to-old-provs.json`.
    pub fn new_to_old_codes(&self) -> BTreeMap<String, Vec<String>> {
        self.new_to_old_codes
            .iter()
            .map(|(code, olds)| (code.clone(), olds.iter().cloned().collect()))
            .collect()
    }

    /// Absorbed province names that matched no old province.
    pub fn unresolved(&self) -> &[String] {
        &self.unresolved
    }
}
