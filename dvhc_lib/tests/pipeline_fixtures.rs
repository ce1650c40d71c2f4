//! End-to-end build over the JSON fixtures shared with `dvhc_model`.

use std::path::PathBuf;

use dvhc_lib::config::InputPaths;
use dvhc_lib::types::{MappingEntry, ReverseEntry, UnitType, PARTIAL_NOTE};
use dvhc_lib::{run, LookupTables, MatchWeights, PipelineInputs};

fn fixture_paths() -> InputPaths {
    let base = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../dvhc_model/tests/fixtures");
    InputPaths::default().relative_to(&base)
}

fn build_with(weights: MatchWeights) -> LookupTables {
    let inputs = PipelineInputs::load(&fixture_paths()).expect("load fixtures");
    run(inputs, weights).expect("run pipeline")
}

fn build() -> LookupTables {
    build_with(MatchWeights::default())
}

fn forward<'t>(tables: &'t LookupTables, old_key: &str) -> &'t MappingEntry {
    let province = old_key.split('-').next().unwrap();
    let list = &tables.mappings[province][old_key];
    assert_eq!(list.len(), 1, "{} should map to exactly one entry", old_key);
    &list[0]
}

fn reverse_keys<'t>(tables: &'t LookupTables, province: &str, ward: &str) -> Vec<&'t str> {
    tables.reverse[province][ward]
        .iter()
        .map(|e: &ReverseEntry| e.old_key.as_str())
        .collect()
}

#[test]
fn test_documented_example() {
    let tables = build();
    let entry = forward(&tables, "01-001-00001");

    assert_eq!(entry.province_new.code, "79");
    assert_eq!(entry.province_new.name, "Thành phố Hồ Chí Minh");
    assert_eq!(entry.ward_new.code, "00100");
    assert_eq!(entry.ward_new.unit_type, UnitType::Ward);
    assert_eq!(entry.ward_new.name, "Sài Gòn");
    assert_eq!(entry.note, "");
    assert_eq!(entry.match_score, Some(4));
    assert!(entry.province_stats.is_some());
    assert!(entry.ward_stats.is_some());
}

#[test]
fn test_every_old_ward_mapped() {
    let tables = build();
    for (province, wards) in &tables.catalog.wards_old {
        let mapping = &tables.mappings[province];
        assert_eq!(mapping.len(), wards.len(), "province {}", province);
        for ward in wards {
            assert_eq!(mapping[&ward.key].len(), 1, "ward {}", ward.key);
        }
    }
    assert_eq!(tables.mappings.len(), tables.catalog.provinces_old.len());
}

#[test]
fn test_summary_counts() {
    let summary = build().summary;
    assert_eq!(summary.old_provinces, 4);
    assert_eq!(summary.old_districts, 9);
    assert_eq!(summary.old_wards, 17);
    assert_eq!(summary.new_provinces, 2);
    assert_eq!(summary.new_wards, 10);
    assert_eq!(summary.matched_old_wards, 14);
    assert_eq!(summary.identity_old_wards, 3);
    assert_eq!(summary.unresolved_province_names, vec!["tỉnh Bà Rịa - Vũng Tàu"]);
}

#[test]
fn test_province_scopes() {
    let tables = build();
    assert_eq!(tables.new_to_old_provinces["79"], vec!["01", "02"]);
    assert_eq!(tables.new_to_old_provinces["80"], vec!["03", "04"]);
}

#[test]
fn test_qualifier_is_authoritative() {
    let tables = build();
    // "Phường 4 (Quận 3)" must not claim the homonym in Quận 5.
    assert_eq!(forward(&tables, "01-002-00011").ward_new.code, "00200");
    assert!(forward(&tables, "01-003-00021").is_identity());
    // Qualifier naming a district that does not exist resolves nothing.
    assert!(!tables.reverse["79"].contains_key("00600"));
}

#[test]
fn test_qualifier_keeps_match_in_province() {
    let tables = build();
    // "Xã Long Hòa (huyện Cần Giờ)" exists in provinces 01, 02 and 03.
    assert_eq!(reverse_keys(&tables, "79", "00300")[1], "01-004-00031");
    assert_eq!(forward(&tables, "03-020-00500").ward_new.code, "00850");
    assert_eq!(forward(&tables, "02-011-00411").ward_new.code, "00500");
}

#[test]
fn test_remainder_expands_to_district() {
    let tables = build();
    assert_eq!(
        reverse_keys(&tables, "79", "00300"),
        vec!["01-004-00030", "01-004-00031", "01-004-00032"]
    );
    let notes: Vec<&str> = tables.reverse["79"]["00300"].iter().map(|e| e.note.as_str()).collect();
    assert_eq!(notes, vec!["", "", PARTIAL_NOTE]);
}

#[test]
fn test_higher_score_replaces_remainder_match() {
    let tables = build();
    let entry = forward(&tables, "01-004-00032");
    assert_eq!(entry.ward_new.code, "00700");
    assert_eq!(entry.match_score, Some(4));
    assert_eq!(entry.note, "");
}

#[test]
fn test_reverse_appends_every_candidate() {
    let tables = build();
    assert_eq!(
        reverse_keys(&tables, "79", "00500"),
        vec!["02-011-00410", "01-004-00031", "02-011-00411"]
    );
    // 00031 was offered to 00500 with a lower score and stays with 00300.
    assert_eq!(forward(&tables, "01-004-00031").ward_new.code, "00300");
}

#[test]
fn test_tie_keeps_first_assignment() {
    let tables = build_with(MatchWeights {
        parent_match: 0,
        named_fragment: 1,
        type_agreement: 1,
    });
    let entry = forward(&tables, "01-004-00031");
    assert_eq!(entry.match_score, Some(2));
    assert_eq!(entry.ward_new.code, "00300");
}

#[test]
fn test_identity_entries() {
    let tables = build();
    let long_huu = forward(&tables, "03-021-00510");
    assert!(long_huu.is_identity());
    assert_eq!(long_huu.province_new.code, "80");
    assert_eq!(long_huu.province_new.name, "Tỉnh Tây Ninh");
    assert_eq!(long_huu.ward_new.code, "00510");
    assert_eq!(long_huu.ward_new.unit_type, UnitType::Commune);
    assert_eq!(long_huu.ward_new.name, "Long Hựu");

    let vo_thi_sau = forward(&tables, "01-002-00010");
    assert_eq!(vo_thi_sau.province_new.code, "79");
    assert_eq!(vo_thi_sau.ward_new.unit_type, UnitType::Ward);
    assert_eq!(vo_thi_sau.ward_new.name, "Võ Thị Sáu");
}

#[test]
fn test_new_ward_catalog_and_sources() {
    let tables = build();
    assert_eq!(tables.new_wards["79"].len(), 8);
    assert_eq!(tables.new_wards["80"].len(), 2);
    assert!(tables.new_wards["79"].iter().any(|w| w.code == "00900"));

    let sources = &tables.new_sources["79"];
    assert_eq!(sources["00700"], "Xã Thạnh An (huyện Cần Giờ)");
    assert!(!sources.contains_key("00900"));

    let positional = tables.new_wards["80"].iter().find(|w| w.code == "00850").unwrap();
    assert_eq!(positional.unit_type, UnitType::Commune);
    assert_eq!(positional.name, "Cần Giuộc");
}

#[test]
fn test_build_is_deterministic() {
    let first = build();
    let second = build();
    assert_eq!(first.mappings, second.mappings);
    assert_eq!(first.reverse, second.reverse);
    assert_eq!(first.new_wards, second.new_wards);
    assert_eq!(first.catalog, second.catalog);
}

#[test]
fn test_write_full_file_set() {
    let dir = tempfile::tempdir().unwrap();
    let written = build().write_to_dir(dir.path()).unwrap();
    assert_eq!(written, 24);

    for name in [
        "provincesOld.json",
        "districtsOld-01.json",
        "wardsOld-04.json",
        "provincesNew.json",
        "new-wards-80.json",
        "mapping-03.json",
        "rev-79.json",
        "new-sources-79.json",
        "new-to-old-provs.json",
        "ward-index.json",
        "district-index.json",
        "build-summary.json",
    ] {
        assert!(dir.path().join(name).exists(), "missing {}", name);
    }

    let mapping: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("mapping-01.json")).unwrap())
            .unwrap();
    let entry = &mapping["01-001-00001"][0];
    assert_eq!(entry["provinceNew"]["code"], "79");
    assert_eq!(entry["wardNew"]["type"], "phường");
    assert_eq!(entry["wardNew"]["name"], "Sài Gòn");
    assert_eq!(entry["note"], "");
}
