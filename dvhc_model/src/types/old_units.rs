//! Pre-merger units: provinces, districts and wards as catalogued before the merger.

use serde::{Deserialize, Serialize};

/// A province as it existed before the merger.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OldProvince {
    /// Two-digit national province code (e.g. "01").
    pub code: String,

    /// Display name including its type prefix (e.g. "Tỉnh Long An").
    pub name: String,

    /// Normalized comparison key of `name`.
    pub name_key: String,
}

/// A district (quận/huyện/thị xã/thành phố) belonging to one old province.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OldDistrict {
    /// `<provinceCode>-<districtCode>`, unique across the country.
    pub key: String,

    pub code: String,

    pub province_code: String,

    pub name: String,

    pub name_key: String,
}

/// A ward, commune or township belonging to one old district.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OldWard {
    /// `<districtKey>-<wardCode>`, unique across the country.
    pub key: String,

    pub code: String,

    pub district_key: String,

    pub name: String,

    pub name_key: String,
}

impl OldWard {
    /// Province code encoded as the first segment of the ward key.
    pub fn province_code(&self) -> &str {
        self.key.split('-').next().unwrap_or_default()
    }
}

impl OldDistrict {
    /// Builds the composite key shared by districts and their wards.
    pub fn key_for(province_code: &str, district_code: &str) -> String {
        format!("{}-{}", province_code, district_code)
    }
}
