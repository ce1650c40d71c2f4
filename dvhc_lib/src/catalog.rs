//! Pre-merger catalogs built from the tabular export.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use dvhc_model::raw::{
    pad_code, CatalogDocument, CatalogRow, DISTRICT_CODE_WIDTH, PROVINCE_CODE_WIDTH,
    WARD_CODE_WIDTH,
};
use dvhc_model::types::{OldDistrict, OldProvince, OldWard};

use crate::error::PipelineError;
use crate::normalize::normalize_vietnamese;

/// Where the tabular catalog comes from. The format is decided once, from the
/// file extension, and each variant has its own row adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    /// JSON export, either `{"data": [...]}` or a bare array of rows.
    Json(PathBuf),
    /// CSV with the same column headers as the JSON export.
    Csv(PathBuf),
}

impl CatalogSource {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if is_csv {
            Self::Csv(path)
        } else {
            Self::Json(path)
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Json(path) | Self::Csv(path) => path,
        }
    }

    /// Reads every row of the source. Rows are not validated here.
    pub fn load_rows(&self) -> Result<Vec<CatalogRow>, PipelineError> {
        match self {
            Self::Json(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| PipelineError::Read {
                    path: path.clone(),
                    source,
                })?;
                let document: CatalogDocument =
                    serde_json::from_str(&text).map_err(|source| PipelineError::Json {
                        path: path.clone(),
                        source,
                    })?;
                Ok(document.into_rows())
            }
            Self::Csv(path) => {
                let mut reader = csv::ReaderBuilder::new()
                    .trim(csv::Trim::All)
                    .from_path(path)
                    .map_err(|source| PipelineError::Csv {
                        path: path.clone(),
                        source,
                    })?;
                reader
                    .deserialize::<CatalogRow>()
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|source| PipelineError::Csv {
                        path: path.clone(),
                        source,
                    })
            }
        }
    }
}

/// A catalog row with every field present and codes canonicalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CompleteRow<'a> {
    pub province_code: String,
    pub province_name: &'a str,
    pub district_code: String,
    pub district_name: &'a str,
    pub ward_code: String,
    pub ward_name: &'a str,
}

impl<'a> CompleteRow<'a> {
    /// `None` when any of the six fields is missing.
    pub fn from_row(row: &'a CatalogRow) -> Option<Self> {
        Some(Self {
            province_code: pad_code(row.province_code.as_deref()?, PROVINCE_CODE_WIDTH),
            province_name: row.province_name.as_deref()?,
            district_code: pad_code(row.district_code.as_deref()?, DISTRICT_CODE_WIDTH),
            district_name: row.district_name.as_deref()?,
            ward_code: pad_code(row.ward_code.as_deref()?, WARD_CODE_WIDTH),
            ward_name: row.ward_name.as_deref()?,
        })
    }

    pub fn district_key(&self) -> String {
        OldDistrict::key_for(&self.province_code, &self.district_code)
    }

    pub fn ward_key(&self) -> String {
        format!("{}-{}", self.district_key(), self.ward_code)
    }

    pub fn to_ward(&self) -> OldWard {
        OldWard {
            key: self.ward_key(),
            code: self.ward_code.clone(),
            district_key: self.district_key(),
            name: self.ward_name.to_string(),
            name_key: normalize_vietnamese(self.ward_name),
        }
    }
}

/// The three pre-merger catalogs. Districts and wards are grouped by old
/// province code; every collection is sorted by code.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OldCatalog {
    pub provinces: Vec<OldProvince>,
    pub districts: BTreeMap<String, Vec<OldDistrict>>,
    pub wards: BTreeMap<String, Vec<OldWard>>,
    /// Rows dropped for missing fields.
    pub skipped_rows: usize,
}

impl OldCatalog {
    pub fn province(&self, code: &str) -> Option<&OldProvince> {
        self.provinces.iter().find(|p| p.code == code)
    }

    pub fn districts_of(&self, province_code: &str) -> &[OldDistrict] {
        self.districts
            .get(province_code)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn wards_of(&self, province_code: &str) -> &[OldWard] {
        self.wards
            .get(province_code)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn district_count(&self) -> usize {
        self.districts.values().map(Vec::len).sum()
    }

    pub fn ward_count(&self) -> usize {
        self.wards.values().map(Vec::len).sum()
    }
}

/// Builds deduplicated old catalogs from raw rows. Incomplete rows are
/// skipped; the first row seen for a key wins.
pub fn build_catalog(rows: &[CatalogRow]) -> OldCatalog {
    let mut provinces: BTreeMap<String, OldProvince> = BTreeMap::new();
    let mut districts: BTreeMap<String, BTreeMap<String, OldDistrict>> = BTreeMap::new();
    let mut wards: BTreeMap<String, Vec<OldWard>> = BTreeMap::new();
    let mut seen_wards: HashSet<String> = HashSet::new();
    let mut skipped_rows = 0;

    for (position, row) in rows.iter().enumerate() {
        let Some(row) = CompleteRow::from_row(row) else {
            tracing::debug!("Skipping incomplete catalog row {}", position);
            skipped_rows += 1;
            continue;
        };

        provinces
            .entry(row.province_code.clone())
            .or_insert_with(|| OldProvince {
                code: row.province_code.clone(),
                name: row.province_name.to_string(),
                name_key: normalize_vietnamese(row.province_name),
            });

        districts
            .entry(row.province_code.clone())
            .or_default()
            .entry(row.district_code.clone())
            .or_insert_with(|| OldDistrict {
                key: row.district_key(),
                code: row.district_code.clone(),
                province_code: row.province_code.clone(),
                name: row.district_name.to_string(),
                name_key: normalize_vietnamese(row.district_name),
            });

        let ward = row.to_ward();
        if seen_wards.insert(ward.key.clone()) {
            wards.entry(row.province_code.clone()).or_default().push(ward);
        }
    }

    for list in wards.values_mut() {
        list.sort_by(|a, b| a.code.cmp(&b.code).then_with(|| a.key.cmp(&b.key)));
    }

    let catalog = OldCatalog {
        provinces: provinces.into_values().collect(),
        districts: districts
            .into_iter()
            .map(|(code, by_code)| (code, by_code.into_values().collect()))
            .collect(),
        wards,
        skipped_rows,
    };

    tracing::info!(
        "Old catalog: {} provinces, {} districts, {} wards ({} rows skipped)",
        catalog.provinces.len(),
        catalog.district_count(),
        catalog.ward_count(),
        catalog.skipped_rows
    );
    catalog
}
