//! Rows of the post-merger unit dump.
//!
//! The dump nests rows at arbitrary depth and uses two schemas: named fields
//! (`ma`, `tenhc`, ...) and positional string keys (`"2"`, `"5"`, ...).

use serde::Deserialize;
use serde_json::{Map, Value};

use super::code::lenient_text;
use crate::types::WardStats;

/// Row with named fields.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct NamedUnitRow {
    #[serde(default, deserialize_with = "lenient_text")]
    pub matinh: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub ma: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub tentinh: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub loai: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub tenhc: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub truocsapnhap: Option<String>,

    /// Tree path such as "760.26734"; the first segment groups units by old district.
    #[serde(default, deserialize_with = "lenient_text")]
    pub cay: Option<String>,

    #[serde(default)]
    pub dientichkm2: Option<Value>,

    #[serde(default)]
    pub dansonguoi: Option<Value>,

    #[serde(default)]
    pub trungtamhc: Option<Value>,
}

/// Row keyed by column position.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct PositionalUnitRow {
    #[serde(rename = "1", default, deserialize_with = "lenient_text")]
    pub province_code: Option<String>,

    #[serde(rename = "2", default, deserialize_with = "lenient_text")]
    pub code: Option<String>,

    #[serde(rename = "3", default, deserialize_with = "lenient_text")]
    pub province_name: Option<String>,

    #[serde(rename = "4", default, deserialize_with = "lenient_text")]
    pub unit_type: Option<String>,

    #[serde(rename = "5", default, deserialize_with = "lenient_text")]
    pub name: Option<String>,

    #[serde(rename = "12", default, deserialize_with = "lenient_text")]
    pub predecessors: Option<String>,
}

/// A unit row in either schema.
#[derive(Debug, Clone)]
pub enum RawUnitRow {
    Named(NamedUnitRow),
    Positional(PositionalUnitRow),
}

/// Schema-independent view of one new unit as it appears in the dump.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnitRecord {
    pub province_code: Option<String>,
    pub province_name: Option<String>,
    pub code: String,
    /// Type label as written in the source ("phường", "Xã", ...).
    pub unit_type: Option<String>,
    pub name: String,
    pub predecessors: Option<String>,
    pub tree_path: Option<String>,
    pub stats: WardStats,
}

fn non_null(value: Option<Value>) -> Option<Value> {
    value.filter(|v| !v.is_null())
}

impl RawUnitRow {
    /// Classifies a JSON object as a unit row. An object qualifies when it has
    /// a unit code, a unit name and some province reference in one schema.
    pub fn detect(object: &Map<String, Value>) -> Option<Self> {
        let has = |key: &str| object.get(key).is_some_and(|v| !v.is_null());
        let value = Value::Object(object.clone());

        if has("ma") && has("tenhc") && (has("tentinh") || has("matinh")) {
            return NamedUnitRow::deserialize(&value).ok().map(Self::Named);
        }
        if has("2") && has("5") && (has("3") || has("1")) {
            return PositionalUnitRow::deserialize(&value).ok().map(Self::Positional);
        }
        None
    }

    /// Adapts the row into a [`UnitRecord`]. Rows without a code or name yield `None`.
    pub fn into_record(self) -> Option<UnitRecord> {
        match self {
            Self::Named(row) => Some(UnitRecord {
                province_code: row.matinh,
                province_name: row.tentinh,
                code: row.ma?,
                unit_type: row.loai,
                name: row.tenhc?,
                predecessors: row.truocsapnhap,
                tree_path: row.cay,
                stats: WardStats {
                    area_km2: non_null(row.dientichkm2),
                    population: non_null(row.dansonguoi),
                    admin_center: non_null(row.trungtamhc),
                },
            }),
            Self::Positional(row) => Some(UnitRecord {
                province_code: row.province_code,
                province_name: row.province_name,
                code: row.code?,
                unit_type: row.unit_type,
                name: row.name?,
                predecessors: row.predecessors,
                tree_path: None,
                stats: WardStats::default(),
            }),
        }
    }
}

/// Walks an arbitrarily nested document and returns every unit row in
/// document order.
pub fn collect_unit_rows(document: &Value) -> Vec<RawUnitRow> {
    let mut rows = Vec::new();
    walk(document, &mut rows);
    rows
}

fn walk(node: &Value, rows: &mut Vec<RawUnitRow>) {
    match node {
        Value::Array(items) => {
            for item in items {
                walk(item, rows);
            }
        }
        Value::Object(object) => {
            if let Some(row) = RawUnitRow::detect(object) {
                rows.push(row);
            }
            for child in object.values() {
                walk(child, rows);
            }
        }
        _ => {}
    }
}
