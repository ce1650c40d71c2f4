//! Rows of the pre-merger catalog export (one row per old ward).

use serde::Deserialize;

use super::code::lenient_text;

/// One spreadsheet row. Column headers are the Vietnamese ones used by the
/// national statistics export; the same headers are accepted from CSV.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogRow {
    #[serde(rename = "Mã TP", default, deserialize_with = "lenient_text")]
    pub province_code: Option<String>,

    #[serde(rename = "Tỉnh Thành Phố", default, deserialize_with = "lenient_text")]
    pub province_name: Option<String>,

    #[serde(rename = "Mã QH", default, deserialize_with = "lenient_text")]
    pub district_code: Option<String>,

    #[serde(rename = "Quận Huyện", default, deserialize_with = "lenient_text")]
    pub district_name: Option<String>,

    #[serde(rename = "Mã PX", default, deserialize_with = "lenient_text")]
    pub ward_code: Option<String>,

    #[serde(rename = "Phường Xã", default, deserialize_with = "lenient_text")]
    pub ward_name: Option<String>,
}

/// The JSON export either wraps its rows in `{"data": [...]}` or is a bare array.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum CatalogDocument {
    Wrapped { data: Vec<CatalogRow> },
    Bare(Vec<CatalogRow>),
}

impl CatalogDocument {
    pub fn into_rows(self) -> Vec<CatalogRow> {
        match self {
            Self::Wrapped { data } => data,
            Self::Bare(rows) => rows,
        }
    }
}
