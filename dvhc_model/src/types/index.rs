//! Entries of the country-wide discovery indexes.

use serde::{Deserialize, Serialize};

/// Row of `ward-index.json`, keyed there by the ward's normalized name.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WardIndexEntry {
    pub province_code: String,
    pub ward_key: String,
    pub district_key: String,
    pub name: String,
}

/// Row of `district-index.json`, keyed there by the district's normalized name.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DistrictIndexEntry {
    pub province_code: String,
    pub district_key: String,
    pub name: String,
}
