//! Post-merger units. Districts no longer exist in the new scheme, so a new
//! ward hangs directly off its new province.

use serde::{Deserialize, Serialize};

/// Administrative type of a ward-level unit.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitType {
    #[serde(rename = "phường")]
    Ward,
    #[serde(rename = "xã")]
    Commune,
    #[serde(rename = "thị trấn")]
    Township,
    #[serde(rename = "đặc khu")]
    SpecialZone,
}

impl UnitType {
    /// Resolves a diacritic-free, lowercase type token such as `"phuong"` or
    /// `"thi tran"`.
    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim() {
            "phuong" => Some(Self::Ward),
            "xa" => Some(Self::Commune),
            "thi tran" => Some(Self::Township),
            "dac khu" => Some(Self::SpecialZone),
            _ => None,
        }
    }

    /// Diacritic-free token used as a name prefix (`"thi tran"` for townships).
    pub fn key(self) -> &'static str {
        match self {
            Self::Ward => "phuong",
            Self::Commune => "xa",
            Self::Township => "thi tran",
            Self::SpecialZone => "dac khu",
        }
    }

    /// Vietnamese label as written in source data and emitted tables.
    pub fn label(self) -> &'static str {
        match self {
            Self::Ward => "phường",
            Self::Commune => "xã",
            Self::Township => "thị trấn",
            Self::SpecialZone => "đặc khu",
        }
    }

    /// Whether an old unit of type `self` continues as a new unit of type
    /// `other`. Only ward-to-ward and commune-to-commune count.
    pub fn agrees_with(self, other: Self) -> bool {
        matches!(
            (self, other),
            (Self::Ward, Self::Ward) | (Self::Commune, Self::Commune)
        )
    }
}

impl std::fmt::Display for UnitType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Published statistics for a new province. Values are passed through as
/// found in the source, which mixes numbers and locale-formatted strings.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProvinceStats {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_km2: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub population: Option<serde_json::Value>,

    /// Seat of the provincial administration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_center: Option<serde_json::Value>,

    /// Free-text composition summary (e.g. "96 ĐVHC (14 phường, 82 xã)").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composition_note: Option<serde_json::Value>,
}

impl ProvinceStats {
    pub fn is_empty(&self) -> bool {
        self.area_km2.is_none()
            && self.population.is_none()
            && self.admin_center.is_none()
            && self.composition_note.is_none()
    }
}

/// Published statistics for a new ward.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WardStats {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_km2: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub population: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_center: Option<serde_json::Value>,
}

impl WardStats {
    pub fn is_empty(&self) -> bool {
        self.area_km2.is_none() && self.population.is_none() && self.admin_center.is_none()
    }
}

/// A province after the merger.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewProvince {
    pub code: String,

    pub name: String,

    #[serde(flatten)]
    pub stats: ProvinceStats,
}

/// A ward-level unit after the merger.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewWard {
    pub code: String,

    #[serde(rename = "type")]
    pub unit_type: UnitType,

    pub name: String,

    /// Grouping hint carried over from the source tree path. Not a district entity.
    pub district_code: Option<String>,
}
