//! Serialization of the generated lookup tables.
//!
//! Every file is compact JSON. Maps are `BTreeMap`s so repeated builds over
//! the same input produce byte-identical output, apart from the timestamp in
//! `build-summary.json`.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use dvhc_model::types::{
    DistrictIndexEntry, MappingEntry, NewProvince, NewWard, OldDistrict, OldProvince, OldWard,
    ReverseEntry, WardIndexEntry,
};
use serde::{Deserialize, Serialize};

use crate::catalog::OldCatalog;
use crate::error::PipelineError;
use crate::normalize::normalize_vietnamese;

pub const PROVINCES_OLD_FILE: &str = "provincesOld.json";
pub const PROVINCES_NEW_FILE: &str = "provincesNew.json";
pub const NEW_TO_OLD_FILE: &str = "new-to-old-provs.json";
pub const WARD_INDEX_FILE: &str = "ward-index.json";
pub const DISTRICT_INDEX_FILE: &str = "district-index.json";
pub const SUMMARY_FILE: &str = "build-summary.json";

pub fn districts_old_file(old_province_code: &str) -> String {
    format!("districtsOld-{}.json", old_province_code)
}

pub fn wards_old_file(old_province_code: &str) -> String {
    format!("wardsOld-{}.json", old_province_code)
}

pub fn mapping_file(old_province_code: &str) -> String {
    format!("mapping-{}.json", old_province_code)
}

pub fn reverse_file(new_province_code: &str) -> String {
    format!("rev-{}.json", new_province_code)
}

pub fn new_wards_file(new_province_code: &str) -> String {
    format!("new-wards-{}.json", new_province_code)
}

pub fn new_sources_file(new_province_code: &str) -> String {
    format!("new-sources-{}.json", new_province_code)
}

/// Counts recorded alongside the tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildSummary {
    pub generated_at: DateTime<Utc>,
    pub old_provinces: usize,
    pub old_districts: usize,
    pub old_wards: usize,
    pub new_provinces: usize,
    pub new_wards: usize,
    pub matched_old_wards: usize,
    pub identity_old_wards: usize,
    pub reverse_entries: usize,
    pub unresolved_province_names: Vec<String>,
}

/// Old catalogs plus the two country-wide discovery indexes.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogTables {
    pub provinces_old: Vec<OldProvince>,
    pub districts_old: BTreeMap<String, Vec<OldDistrict>>,
    pub wards_old: BTreeMap<String, Vec<OldWard>>,
    pub ward_index: BTreeMap<String, Vec<WardIndexEntry>>,
    pub district_index: BTreeMap<String, Vec<DistrictIndexEntry>>,
}

impl CatalogTables {
    pub fn from_catalog(catalog: &OldCatalog) -> Self {
        Self {
            provinces_old: catalog.provinces.clone(),
            districts_old: catalog.districts.clone(),
            wards_old: catalog.wards.clone(),
            ward_index: ward_index(catalog),
            district_index: district_index(catalog),
        }
    }

    /// Writes `provincesOld.json`, the per-province district and ward files
    /// and both discovery indexes. Returns the number of files written.
    pub fn write_to_dir(&self, dir: &Path) -> Result<usize, PipelineError> {
        create_dir(dir)?;
        let mut written = 0;
        write_json(dir, PROVINCES_OLD_FILE, &self.provinces_old)?;
        written += 1;
        for province in &self.provinces_old {
            let empty_districts = Vec::new();
            let empty_wards = Vec::new();
            write_json(
                dir,
                &districts_old_file(&province.code),
                self.districts_old.get(&province.code).unwrap_or(&empty_districts),
            )?;
            write_json(
                dir,
                &wards_old_file(&province.code),
                self.wards_old.get(&province.code).unwrap_or(&empty_wards),
            )?;
            written += 2;
        }
        write_json(dir, WARD_INDEX_FILE, &self.ward_index)?;
        write_json(dir, DISTRICT_INDEX_FILE, &self.district_index)?;
        Ok(written + 2)
    }
}

/// Everything one build produces.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupTables {
    pub catalog: CatalogTables,
    pub provinces_new: Vec<NewProvince>,
    pub new_wards: BTreeMap<String, Vec<NewWard>>,
    /// Old province code → old ward key → one-element list.
    pub mappings: BTreeMap<String, BTreeMap<String, Vec<MappingEntry>>>,
    /// New province code → new ward code → contributing old wards.
    pub reverse: BTreeMap<String, BTreeMap<String, Vec<ReverseEntry>>>,
    pub new_sources: BTreeMap<String, BTreeMap<String, String>>,
    pub new_to_old_provinces: BTreeMap<String, Vec<String>>,
    pub summary: BuildSummary,
}

impl LookupTables {
    /// Writes the full file set into `dir`, creating it if needed. Returns
    /// the number of files written.
    pub fn write_to_dir(&self, dir: &Path) -> Result<usize, PipelineError> {
        let mut written = self.catalog.write_to_dir(dir)?;

        write_json(dir, PROVINCES_NEW_FILE, &self.provinces_new)?;
        write_json(dir, NEW_TO_OLD_FILE, &self.new_to_old_provinces)?;
        written += 2;

        for (code, mapping) in &self.mappings {
            write_json(dir, &mapping_file(code), mapping)?;
            written += 1;
        }
        for (code, entries) in &self.reverse {
            write_json(dir, &reverse_file(code), entries)?;
            written += 1;
        }
        for (code, wards) in &self.new_wards {
            write_json(dir, &new_wards_file(code), wards)?;
            written += 1;
        }
        for (code, sources) in &self.new_sources {
            write_json(dir, &new_sources_file(code), sources)?;
            written += 1;
        }

        write_json(dir, SUMMARY_FILE, &self.summary)?;
        written += 1;
        tracing::info!("Wrote {} files to {}", written, dir.display());
        Ok(written)
    }
}

/// Ward discovery index keyed by the full normalized ward name.
pub fn ward_index(catalog: &OldCatalog) -> BTreeMap<String, Vec<WardIndexEntry>> {
    let mut index: BTreeMap<String, Vec<WardIndexEntry>> = BTreeMap::new();
    for (province_code, wards) in &catalog.wards {
        for ward in wards {
            index
                .entry(normalize_vietnamese(&ward.name))
                .or_default()
                .push(WardIndexEntry {
                    province_code: province_code.clone(),
                    ward_key: ward.key.clone(),
                    district_key: ward.district_key.clone(),
                    name: ward.name.clone(),
                });
        }
    }
    index
}

/// District discovery index keyed by the full normalized district name.
pub fn district_index(catalog: &OldCatalog) -> BTreeMap<String, Vec<DistrictIndexEntry>> {
    let mut index: BTreeMap<String, Vec<DistrictIndexEntry>> = BTreeMap::new();
    for districts in catalog.districts.values() {
        for district in districts {
            index
                .entry(district.name_key.clone())
                .or_default()
                .push(DistrictIndexEntry {
                    province_code: district.province_code.clone(),
                    district_key: district.key.clone(),
                    name: district.name.clone(),
                });
        }
    }
    index
}

fn create_dir(dir: &Path) -> Result<(), PipelineError> {
    std::fs::create_dir_all(dir).map_err(|source| PipelineError::Write {
        path: dir.to_path_buf(),
        source,
    })
}

fn write_json<T: Serialize + ?Sized>(dir: &Path, name: &str, value: &T) -> Result<(), PipelineError> {
    let path = dir.join(name);
    let bytes = serde_json::to_vec(value).map_err(|source| PipelineError::Json {
        path: path.clone(),
        source,
    })?;
    std::fs::write(&path, bytes).map_err(|source| PipelineError::Write {
        path: path.clone(),
        source,
    })?;
    tracing::debug!("Wrote {}", path.display());
    Ok(())
}
