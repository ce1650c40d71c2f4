//! Records of the old→new and new→old relations.

use serde::{Deserialize, Serialize};

use super::{ProvinceStats, UnitType, WardStats};

/// Note attached to entries that came from a remainder ("phần còn lại") fragment.
pub const PARTIAL_NOTE: &str = "phần còn lại";

/// Minimal reference to a new province.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProvinceRef {
    pub code: String,
    pub name: String,
}

/// Minimal reference to a new ward.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct WardRef {
    pub code: String,

    #[serde(rename = "type")]
    pub unit_type: UnitType,

    pub name: String,
}

/// Where one old ward ended up after the merger.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MappingEntry {
    pub province_new: ProvinceRef,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub province_stats: Option<ProvinceStats>,

    pub ward_new: WardRef,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ward_stats: Option<WardStats>,

    /// Empty, or [`PARTIAL_NOTE`] when the match came from a remainder fragment.
    #[serde(default)]
    pub note: String,

    /// Score of the winning match. `None` for synthesized identity entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_score: Option<u32>,
}

impl MappingEntry {
    /// True when the entry was synthesized by the gap filler rather than matched.
    pub fn is_identity(&self) -> bool {
        self.match_score.is_none()
    }
}

/// One old ward that fed into a new ward.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReverseEntry {
    pub old_key: String,

    pub old_ward_code: String,

    pub old_ward_type: Option<UnitType>,

    pub old_name: String,

    pub old_district_key: String,

    pub old_district_name: Option<String>,

    pub old_province_code: String,

    pub old_province_name: Option<String>,

    #[serde(default)]
    pub note: String,
}
