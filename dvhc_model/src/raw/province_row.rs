//! Per-new-province merger metadata.

use serde::Deserialize;

use super::code::lenient_text;
use crate::types::ProvinceStats;

/// One record of the province merge dump.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct ProvinceMergeRecord {
    /// New province code.
    #[serde(rename = "mahc", default, deserialize_with = "lenient_text")]
    pub code: Option<String>,

    /// New province name.
    #[serde(rename = "tentinh", default, deserialize_with = "lenient_text")]
    pub name: Option<String>,

    /// Old provinces absorbed, e.g. "tỉnh Long An và tỉnh Tây Ninh".
    #[serde(rename = "truocsapnhap", default, deserialize_with = "lenient_text")]
    pub predecessors: Option<String>,

    #[serde(rename = "dientichkm2", default)]
    pub area_km2: Option<serde_json::Value>,

    #[serde(rename = "dansonguoi", default)]
    pub population: Option<serde_json::Value>,

    #[serde(rename = "trungtamhc", default)]
    pub admin_center: Option<serde_json::Value>,

    #[serde(rename = "con", default)]
    pub composition_note: Option<serde_json::Value>,
}

impl ProvinceMergeRecord {
    pub fn stats(&self) -> ProvinceStats {
        ProvinceStats {
            area_km2: self.area_km2.clone().filter(|v| !v.is_null()),
            population: self.population.clone().filter(|v| !v.is_null()),
            admin_center: self.admin_center.clone().filter(|v| !v.is_null()),
            composition_note: self.composition_note.clone().filter(|v| !v.is_null()),
        }
    }
}
