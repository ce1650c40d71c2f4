//! Read side of the generated tables.
//!
//! [`LookupClient`] answers forward (old ward → new ward) and reverse (new
//! ward → old wards) queries from a directory of emitted files. A missing
//! or unreadable file means "no data", never an error. When a reverse entry
//! was not precomputed, it is recomputed from the emitted catalogs with the
//! same [`MatchingEngine`] the build uses.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use dvhc_model::types::{
    MappingEntry, NewProvince, NewWard, OldDistrict, OldProvince, OldWard, ReverseEntry,
    WardIndexEntry,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::cache::DocumentCache;
use crate::emit::{
    districts_old_file, mapping_file, new_sources_file, new_wards_file, reverse_file,
    wards_old_file, NEW_TO_OLD_FILE, PROVINCES_NEW_FILE, PROVINCES_OLD_FILE, WARD_INDEX_FILE,
};
use crate::error::PipelineError;
use crate::matching::{DiscoveryIndex, MatchWeights, MatchingEngine, OldIndexes, OldProvinceIndex, Resolution};
use crate::normalize::normalize_province_name;
use crate::sources::FragmentParser;

/// Where a reverse answer came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReverseSource {
    Precomputed,
    Recomputed,
    NoData,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReverseLookup {
    pub entries: Vec<ReverseEntry>,
    pub source: ReverseSource,
}

/// Query client over an emitted data directory. Parsed documents are cached
/// for the life of the client.
pub struct LookupClient {
    data_dir: PathBuf,
    cache: DocumentCache,
    parser: FragmentParser,
    weights: MatchWeights,
}

impl LookupClient {
    pub fn new(data_dir: impl Into<PathBuf>, weights: MatchWeights) -> Result<Self, PipelineError> {
        Ok(Self {
            data_dir: data_dir.into(),
            cache: DocumentCache::new(),
            parser: FragmentParser::new()?,
            weights,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Where an old ward went, by its `<province>-<district>-<ward>` key.
    pub fn forward(&self, old_ward_key: &str) -> Option<MappingEntry> {
        let province_code = old_ward_key.split('-').next().filter(|c| !c.is_empty())?;
        let mut mapping: BTreeMap<String, Vec<MappingEntry>> =
            self.document(&mapping_file(province_code))?;
        mapping.remove(old_ward_key)?.into_iter().next()
    }

    /// Which old wards formed a new ward.
    pub fn reverse(&self, new_province_code: &str, new_ward_code: &str) -> ReverseLookup {
        let precomputed = self
            .document::<BTreeMap<String, Vec<ReverseEntry>>>(&reverse_file(new_province_code))
            .and_then(|mut table| table.remove(new_ward_code))
            .filter(|entries| !entries.is_empty());
        if let Some(entries) = precomputed {
            return ReverseLookup {
                entries,
                source: ReverseSource::Precomputed,
            };
        }

        let entries = self.recompute_reverse(new_province_code, new_ward_code);
        let source = if entries.is_empty() {
            ReverseSource::NoData
        } else {
            ReverseSource::Recomputed
        };
        ReverseLookup { entries, source }
    }

    /// Resolves a new ward's predecessor text against the emitted old
    /// catalogs and discovery index.
    pub fn recompute_reverse(&self, new_province_code: &str, new_ward_code: &str) -> Vec<ReverseEntry> {
        let text = self
            .document::<BTreeMap<String, String>>(&new_sources_file(new_province_code))
            .and_then(|mut sources| sources.remove(new_ward_code));
        let Some(text) = text else {
            return Vec::new();
        };

        let old_provinces: Vec<OldProvince> = self.document(PROVINCES_OLD_FILE).unwrap_or_default();
        let allowed = self.allowed_old_codes(new_province_code, &old_provinces);

        let mut indexes = OldIndexes::default();
        for code in &allowed {
            let districts: Vec<OldDistrict> = self.document(&districts_old_file(code)).unwrap_or_default();
            let wards: Vec<OldWard> = self.document(&wards_old_file(code)).unwrap_or_default();
            let name = old_provinces
                .iter()
                .find(|p| &p.code == code)
                .map(|p| p.name.as_str());
            indexes.insert(OldProvinceIndex::new(code, name, &districts, &wards));
        }

        let ward_index: BTreeMap<String, Vec<WardIndexEntry>> =
            self.document(WARD_INDEX_FILE).unwrap_or_default();
        let discovery = DiscoveryIndex::from_ward_index(&ward_index);

        let unit_type = self
            .document::<Vec<NewWard>>(&new_wards_file(new_province_code))
            .and_then(|wards| wards.into_iter().find(|w| w.code == new_ward_code))
            .map(|w| w.unit_type);

        let engine = MatchingEngine::new(&indexes, &discovery, self.weights);
        engine
            .resolve(&self.parser.parse(&text), unit_type, &allowed)
            .iter()
            .map(Resolution::reverse_entry)
            .collect()
    }

    /// Old province scope of a new province, falling back to the old
    /// province of the same name.
    fn allowed_old_codes(&self, new_province_code: &str, old_provinces: &[OldProvince]) -> Vec<String> {
        let scopes: BTreeMap<String, Vec<String>> = self.document(NEW_TO_OLD_FILE).unwrap_or_default();
        if let Some(codes) = scopes.get(new_province_code).filter(|codes| !codes.is_empty()) {
            return codes.clone();
        }

        let new_provinces: Vec<NewProvince> = self.document(PROVINCES_NEW_FILE).unwrap_or_default();
        let Some(new_name) = new_provinces
            .iter()
            .find(|p| p.code == new_province_code)
            .map(|p| normalize_province_name(&p.name))
        else {
            return Vec::new();
        };
        old_provinces
            .iter()
            .filter(|p| normalize_province_name(&p.name) == new_name)
            .map(|p| p.code.clone())
            .collect()
    }

    fn document<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        let value = self.cache.get_or_load(name, || self.read(name))?;
        match T::deserialize(value.as_ref()) {
            Ok(document) => Some(document),
            Err(err) => {
                tracing::warn!("Ignoring {}: unexpected shape: {}", name, err);
                None
            }
        }
    }

    fn read(&self, name: &str) -> Option<serde_json::Value> {
        let path = self.data_dir.join(name);
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) => {
                tracing::debug!("No data in {}: {}", path.display(), err);
                return None;
            }
        };
        match serde_json::from_str(&text) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!("Ignoring unparsable {}: {}", path.display(), err);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_directory_is_no_data() {
        let client = LookupClient::new("/nonexistent/data", MatchWeights::default()).unwrap();
        assert!(client.forward("01-001-00001").is_none());
        let reverse = client.reverse("79", "00100");
        assert_eq!(reverse.source, ReverseSource::NoData);
        assert!(reverse.entries.is_empty());
    }

    #[test]
    fn test_malformed_key_is_no_data() {
        let client = LookupClient::new("/nonexistent/data", MatchWeights::default()).unwrap();
        assert!(client.forward("").is_none());
    }

    #[test]
    fn test_unparsable_document_is_no_data() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("mapping-01.json"), "{\"01-001-00001\": [").unwrap();
        let client = LookupClient::new(dir.path(), MatchWeights::default()).unwrap();
        assert!(client.forward("01-001-00001").is_none());
    }

    #[test]
    fn test_wrong_shape_is_no_data() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("mapping-01.json"), "[1, 2, 3]").unwrap();
        let client = LookupClient::new(dir.path(), MatchWeights::default()).unwrap();
        assert!(client.forward("01-001-00001").is_none());
    }
}
