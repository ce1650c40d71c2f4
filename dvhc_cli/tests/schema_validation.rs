//! Validates the files written by a fixture build against the JSON Schemas
//! under `schema/`.

use serde_json::Value;
use std::path::{Path, PathBuf};

use dvhc_lib::config::InputPaths;
use dvhc_lib::{run, MatchWeights, PipelineInputs};

fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("CLI crate should be inside workspace")
        .to_path_buf()
}

fn load_schema(name: &str) -> Value {
    let path = workspace_root().join("schema").join(name);
    let text = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("read schema {}: {}", path.display(), e));
    serde_json::from_str(&text).expect("schema is valid JSON")
}

/// Builds the fixture tables into a fresh directory.
fn build_output() -> tempfile::TempDir {
    let base = workspace_root().join("dvhc_model/tests/fixtures");
    let inputs = PipelineInputs::load(&InputPaths::default().relative_to(&base))
        .expect("load fixtures");
    let tables = run(inputs, MatchWeights::default()).expect("run pipeline");
    let dir = tempfile::tempdir().expect("create temp dir");
    tables.write_to_dir(dir.path()).expect("write tables");
    dir
}

fn load_output(dir: &Path, name: &str) -> Value {
    let path = dir.join(name);
    let text = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("read output {}: {}", path.display(), e));
    serde_json::from_str(&text).expect("output is valid JSON")
}

fn assert_valid(schema_name: &str, data: &Value) {
    let schema = load_schema(schema_name);
    let validator = jsonschema::draft202012::new(&schema)
        .unwrap_or_else(|e| panic!("{schema_name} compiles: {e}"));
    if let Err(e) = validator.validate(data) {
        panic!("{schema_name} rejected output: {e}");
    }
}

// ---------------------------------------------------------------------------
// Positive validation: generated tables conform to their schemas
// ---------------------------------------------------------------------------

#[test]
fn test_mapping_files_conform_to_schema() {
    let dir = build_output();
    for code in ["01", "02", "03", "04"] {
        let data = load_output(dir.path(), &format!("mapping-{code}.json"));
        assert_valid("mapping.schema.json", &data);
    }
}

#[test]
fn test_reverse_files_conform_to_schema() {
    let dir = build_output();
    for code in ["79", "80"] {
        let data = load_output(dir.path(), &format!("rev-{code}.json"));
        assert_valid("reverse.schema.json", &data);
    }
}

#[test]
fn test_old_ward_files_conform_to_schema() {
    let dir = build_output();
    for code in ["01", "02", "03", "04"] {
        let data = load_output(dir.path(), &format!("wardsOld-{code}.json"));
        assert_valid("old-ward.schema.json", &data);
    }
}

#[test]
fn test_new_ward_files_conform_to_schema() {
    let dir = build_output();
    for code in ["79", "80"] {
        let data = load_output(dir.path(), &format!("new-wards-{code}.json"));
        assert_valid("new-ward.schema.json", &data);
    }
}

#[test]
fn test_build_summary_conforms_to_schema() {
    let dir = build_output();
    let data = load_output(dir.path(), "build-summary.json");
    assert_valid("build-summary.schema.json", &data);
}

// ---------------------------------------------------------------------------
// Negative validation: schemas reject invalid data
// ---------------------------------------------------------------------------

#[test]
fn test_mapping_schema_rejects_missing_ward_new() {
    let dir = build_output();
    let mut data = load_output(dir.path(), "mapping-01.json");
    data["01-001-00001"][0]
        .as_object_mut()
        .unwrap()
        .remove("wardNew");

    let schema = load_schema("mapping.schema.json");
    let validator = jsonschema::draft202012::new(&schema).unwrap();
    assert!(!validator.is_valid(&data), "entry without wardNew must be rejected");
}

#[test]
fn test_mapping_schema_rejects_two_entries_per_ward() {
    let dir = build_output();
    let mut data = load_output(dir.path(), "mapping-01.json");
    let entry = data["01-001-00001"][0].clone();
    data["01-001-00001"].as_array_mut().unwrap().push(entry);

    let schema = load_schema("mapping.schema.json");
    let validator = jsonschema::draft202012::new(&schema).unwrap();
    assert!(!validator.is_valid(&data), "an old ward maps to exactly one entry");
}

#[test]
fn test_reverse_schema_rejects_unknown_note() {
    let dir = build_output();
    let mut data = load_output(dir.path(), "rev-79.json");
    data["00100"][0]["note"] = Value::String("merged".to_string());

    let schema = load_schema("reverse.schema.json");
    let validator = jsonschema::draft202012::new(&schema).unwrap();
    assert!(!validator.is_valid(&data));
}

#[test]
fn test_old_ward_schema_rejects_unpadded_code() {
    let dir = build_output();
    let mut data = load_output(dir.path(), "wardsOld-02.json");
    data[0]["code"] = Value::String("400".to_string());

    let schema = load_schema("old-ward.schema.json");
    let validator = jsonschema::draft202012::new(&schema).unwrap();
    assert!(!validator.is_valid(&data), "ward codes are padded to five digits");
}

#[test]
fn test_new_ward_schema_rejects_unknown_type() {
    let dir = build_output();
    let mut data = load_output(dir.path(), "new-wards-79.json");
    data[0]["type"] = Value::String("quận".to_string());

    let schema = load_schema("new-ward.schema.json");
    let validator = jsonschema::draft202012::new(&schema).unwrap();
    assert!(!validator.is_valid(&data));
}
