//! The batch build: catalogs and province merges first, then unit matching,
//! then the gap filler.

use std::path::Path;

use chrono::Utc;
use dvhc_model::raw::{collect_unit_rows, CatalogRow, ProvinceMergeRecord, RawUnitRow, UnitRecord};
use serde::de::DeserializeOwned;

use crate::catalog::{build_catalog, CatalogSource, OldCatalog};
use crate::config::InputPaths;
use crate::emit::{BuildSummary, CatalogTables, LookupTables};
use crate::error::PipelineError;
use crate::gap_fill::{fill_gaps, fill_provinces};
use crate::matching::{DiscoveryIndex, MatchWeights, MatchingEngine, OldIndexes, Relations};
use crate::province_merge::ProvinceMergeMap;
use crate::sources::FragmentParser;
use crate::units::{NewUnit, UnitCatalog};

/// Parsed source documents.
#[derive(Debug, Clone, Default)]
pub struct PipelineInputs {
    pub catalog_rows: Vec<CatalogRow>,
    pub merge_records: Vec<ProvinceMergeRecord>,
    pub unit_records: Vec<UnitRecord>,
}

impl PipelineInputs {
    /// Reads all three inputs. Any unreadable or malformed file is fatal.
    pub fn load(paths: &InputPaths) -> Result<Self, PipelineError> {
        let catalog_rows = CatalogSource::from_path(&paths.catalog).load_rows()?;
        let merge_records: Vec<ProvinceMergeRecord> = read_json(&paths.provinces)?;
        let units: serde_json::Value = read_json(&paths.units)?;
        let unit_records = unit_records(&units);

        tracing::info!(
            "Loaded {} catalog rows, {} province records, {} unit rows",
            catalog_rows.len(),
            merge_records.len(),
            unit_records.len()
        );
        Ok(Self {
            catalog_rows,
            merge_records,
            unit_records,
        })
    }
}

/// Every unit record of a new-unit dump, in document order.
pub fn unit_records(document: &serde_json::Value) -> Vec<UnitRecord> {
    collect_unit_rows(document)
        .into_iter()
        .filter_map(RawUnitRow::into_record)
        .collect()
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, PipelineError> {
    let text = std::fs::read_to_string(path).map_err(|source| PipelineError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| PipelineError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Catalogs and indexes prepared for matching.
///
/// Callers that want progress reporting drive [`Self::match_unit`]
/// themselves; [`run`] does the whole build in one call.
pub struct BuildContext {
    catalog: OldCatalog,
    merge: ProvinceMergeMap,
    units: UnitCatalog,
    indexes: OldIndexes,
    discovery: DiscoveryIndex,
    parser: FragmentParser,
    weights: MatchWeights,
}

impl BuildContext {
    pub fn prepare(inputs: PipelineInputs, weights: MatchWeights) -> Result<Self, PipelineError> {
        let catalog = build_catalog(&inputs.catalog_rows);
        let merge = ProvinceMergeMap::resolve(&inputs.merge_records, &catalog.provinces)?;
        let units = UnitCatalog::ingest(inputs.unit_records, &merge);
        let indexes = OldIndexes::from_catalog(&catalog);
        let discovery = DiscoveryIndex::from_rows(&inputs.catalog_rows);

        Ok(Self {
            catalog,
            merge,
            units,
            indexes,
            discovery,
            parser: FragmentParser::new()?,
            weights,
        })
    }

    pub fn units(&self) -> &[NewUnit] {
        self.units.units()
    }

    pub fn catalog(&self) -> &OldCatalog {
        &self.catalog
    }

    pub fn merge(&self) -> &ProvinceMergeMap {
        &self.merge
    }

    /// Matches one unit's predecessor text and records the result. Returns
    /// the number of old wards resolved; units without text resolve none.
    pub fn match_unit(&self, unit: &NewUnit, relations: &mut Relations) -> usize {
        let Some(text) = unit.predecessors.as_deref() else {
            return 0;
        };
        let fragments = self.parser.parse(text);
        let allowed = self
            .merge
            .allowed_old_codes(&unit.province.code, &unit.province.name);
        if allowed.is_empty() {
            tracing::debug!(
                "Unit {} of province {} has no old province scope",
                unit.ward.code,
                unit.province.code
            );
        }

        let engine = MatchingEngine::new(&self.indexes, &self.discovery, self.weights);
        let resolutions = engine.resolve(&fragments, Some(unit.ward.unit_type), &allowed);
        relations.record_unit(unit, self.merge.stats_of(&unit.province.code), &resolutions);
        resolutions.len()
    }

    /// Backfills identity entries and assembles the tables.
    pub fn finish(self, mut relations: Relations) -> LookupTables {
        let touched: Vec<String> = relations.forward.keys().cloned().collect();
        fill_provinces(
            &mut relations,
            &self.catalog,
            &self.merge,
            touched.iter().map(String::as_str),
        );
        fill_gaps(&mut relations, &self.catalog, &self.merge);

        for province in self.merge.provinces() {
            relations.reverse.entry(province.code.clone()).or_default();
        }

        let new_wards = self.units.new_wards();
        let summary = BuildSummary {
            generated_at: Utc::now(),
            old_provinces: self.catalog.provinces.len(),
            old_districts: self.catalog.district_count(),
            old_wards: self.catalog.ward_count(),
            new_provinces: self.merge.provinces().len(),
            new_wards: new_wards.values().map(Vec::len).sum(),
            matched_old_wards: relations.mapped_count() - relations.identity_count(),
            identity_old_wards: relations.identity_count(),
            reverse_entries: relations.reverse_count(),
            unresolved_province_names: self.merge.unresolved().to_vec(),
        };
        tracing::info!(
            "Resolved {} old wards by text, {} by identity",
            summary.matched_old_wards,
            summary.identity_old_wards
        );

        LookupTables {
            catalog: CatalogTables::from_catalog(&self.catalog),
            provinces_new: self.merge.provinces().to_vec(),
            new_wards,
            mappings: relations
                .forward
                .into_iter()
                .map(|(code, entries)| {
                    let lists = entries
                        .into_iter()
                        .map(|(key, entry)| (key, vec![entry]))
                        .collect();
                    (code, lists)
                })
                .collect(),
            reverse: relations.reverse,
            new_sources: self.units.sources(),
            new_to_old_provinces: self.merge.new_to_old_codes(),
            summary,
        }
    }
}

/// Runs the whole build over loaded inputs.
pub fn run(inputs: PipelineInputs, weights: MatchWeights) -> Result<LookupTables, PipelineError> {
    let context = BuildContext::prepare(inputs, weights)?;
    let mut relations = Relations::default();
    for unit in context.units() {
        context.match_unit(unit, &mut relations);
    }
    Ok(context.finish(relations))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unit_records_from_nested_dump() {
        let dump = json!({"data": {"79": [
            {"matinh": 79, "ma": "00100", "tentinh": "TP HCM", "loai": "phường", "tenhc": "Sài Gòn"},
            {"ma": "00200"}
        ]}});
        let records = unit_records(&dump);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].code, "00100");
    }

    #[test]
    fn test_load_missing_input_is_fatal() {
        let paths = InputPaths {
            catalog: "/nonexistent/excelData.json".into(),
            ..InputPaths::default()
        };
        let err = PipelineInputs::load(&paths).unwrap_err();
        assert!(matches!(err, PipelineError::Read { .. }));
    }

    #[test]
    fn test_load_malformed_input_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = dir.path().join("excelData.json");
        let provinces = dir.path().join("rawProvinceData.json");
        std::fs::write(&catalog, "[]").unwrap();
        std::fs::write(&provinces, "{not json").unwrap();
        let paths = InputPaths {
            catalog,
            provinces,
            units: dir.path().join("rawApiData.json"),
        };
        let err = PipelineInputs::load(&paths).unwrap_err();
        assert!(matches!(err, PipelineError::Json { .. }));
    }

    #[test]
    fn test_run_on_empty_inputs() {
        let tables = run(PipelineInputs::default(), MatchWeights::default()).unwrap();
        assert!(tables.mappings.is_empty());
        assert_eq!(tables.summary.old_wards, 0);
    }
}
