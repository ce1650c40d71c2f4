use std::io::Write;

use anyhow::{bail, Result};
use dvhc_lib::types::{MappingEntry, ReverseEntry};
use dvhc_lib::{BuildSummary, OldCatalog};
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
    Markdown,
}

impl OutputFormat {
    pub fn parse(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "markdown" | "md" => Ok(Self::Markdown),
            other => bail!("unknown output format '{}' (expected table, json, csv or markdown)", other),
        }
    }
}

#[derive(Tabled, Serialize)]
struct MappingRow {
    #[tabled(rename = "Old Ward")]
    #[serde(rename = "Old Ward")]
    old_key: String,
    #[tabled(rename = "New Province")]
    #[serde(rename = "New Province")]
    province: String,
    #[tabled(rename = "New Ward")]
    #[serde(rename = "New Ward")]
    ward: String,
    #[tabled(rename = "Type")]
    #[serde(rename = "Type")]
    unit_type: String,
    #[tabled(rename = "Note")]
    #[serde(rename = "Note")]
    note: String,
    #[tabled(rename = "Score")]
    #[serde(rename = "Score")]
    score: String,
}

#[derive(Tabled, Serialize)]
struct ReverseRow {
    #[tabled(rename = "Old Key")]
    #[serde(rename = "Old Key")]
    old_key: String,
    #[tabled(rename = "Old Ward")]
    #[serde(rename = "Old Ward")]
    name: String,
    #[tabled(rename = "Type")]
    #[serde(rename = "Type")]
    unit_type: String,
    #[tabled(rename = "District")]
    #[serde(rename = "District")]
    district: String,
    #[tabled(rename = "Province")]
    #[serde(rename = "Province")]
    province: String,
    #[tabled(rename = "Note")]
    #[serde(rename = "Note")]
    note: String,
}

#[derive(Tabled, Serialize)]
struct SummaryRow {
    #[tabled(rename = "Metric")]
    #[serde(rename = "Metric")]
    metric: &'static str,
    #[tabled(rename = "Value")]
    #[serde(rename = "Value")]
    value: String,
}

#[derive(Tabled, Serialize)]
struct ProvinceRow {
    #[tabled(rename = "Code")]
    #[serde(rename = "Code")]
    code: String,
    #[tabled(rename = "Province")]
    #[serde(rename = "Province")]
    name: String,
    #[tabled(rename = "Districts")]
    #[serde(rename = "Districts")]
    districts: usize,
    #[tabled(rename = "Wards")]
    #[serde(rename = "Wards")]
    wards: usize,
}

// -- Row builders --

fn build_mapping_rows(old_key: &str, entries: &[MappingEntry]) -> Vec<MappingRow> {
    entries
        .iter()
        .map(|e| MappingRow {
            old_key: old_key.to_string(),
            province: format!("{} ({})", e.province_new.name, e.province_new.code),
            ward: format!("{} ({})", e.ward_new.name, e.ward_new.code),
            unit_type: e.ward_new.unit_type.to_string(),
            note: e.note.clone(),
            score: format_score(e.match_score),
        })
        .collect()
}

fn build_reverse_rows(entries: &[ReverseEntry]) -> Vec<ReverseRow> {
    entries
        .iter()
        .map(|e| ReverseRow {
            old_key: e.old_key.clone(),
            name: e.old_name.clone(),
            unit_type: e.old_ward_type.map(|t| t.to_string()).unwrap_or_default(),
            district: e
                .old_district_name
                .clone()
                .unwrap_or_else(|| e.old_district_key.clone()),
            province: e
                .old_province_name
                .clone()
                .unwrap_or_else(|| e.old_province_code.clone()),
            note: e.note.clone(),
        })
        .collect()
}

fn build_summary_rows(summary: &BuildSummary) -> Vec<SummaryRow> {
    let count = |metric, value: usize| SummaryRow {
        metric,
        value: value.to_string(),
    };
    vec![
        SummaryRow {
            metric: "Generated",
            value: summary.generated_at.to_rfc3339(),
        },
        count("Old provinces", summary.old_provinces),
        count("Old districts", summary.old_districts),
        count("Old wards", summary.old_wards),
        count("New provinces", summary.new_provinces),
        count("New wards", summary.new_wards),
        count("Matched old wards", summary.matched_old_wards),
        count("Identity old wards", summary.identity_old_wards),
        count("Reverse entries", summary.reverse_entries),
        SummaryRow {
            metric: "Unresolved provinces",
            value: summary.unresolved_province_names.join("; "),
        },
    ]
}

fn build_province_rows(catalog: &OldCatalog) -> Vec<ProvinceRow> {
    catalog
        .provinces
        .iter()
        .map(|p| ProvinceRow {
            code: p.code.clone(),
            name: p.name.clone(),
            districts: catalog.districts_of(&p.code).len(),
            wards: catalog.wards_of(&p.code).len(),
        })
        .collect()
}

// -- Table output --

pub fn print_mappings_table(old_key: &str, entries: &[MappingEntry]) {
    println!("{}", Table::new(build_mapping_rows(old_key, entries)));
}

pub fn print_reverse_table(entries: &[ReverseEntry]) {
    println!("{}", Table::new(build_reverse_rows(entries)));
}

pub fn print_summary_table(summary: &BuildSummary) {
    println!("{}", Table::new(build_summary_rows(summary)));
}

pub fn print_provinces_table(catalog: &OldCatalog) {
    println!("{}", Table::new(build_province_rows(catalog)));
}

// -- Markdown output --

pub fn print_mappings_markdown(old_key: &str, entries: &[MappingEntry]) {
    let mut table = Table::new(build_mapping_rows(old_key, entries));
    table.with(Style::markdown());
    println!("{}", table);
}

pub fn print_reverse_markdown(entries: &[ReverseEntry]) {
    let mut table = Table::new(build_reverse_rows(entries));
    table.with(Style::markdown());
    println!("{}", table);
}

pub fn print_summary_markdown(summary: &BuildSummary) {
    let mut table = Table::new(build_summary_rows(summary));
    table.with(Style::markdown());
    println!("{}", table);
}

pub fn print_provinces_markdown(catalog: &OldCatalog) {
    let mut table = Table::new(build_province_rows(catalog));
    table.with(Style::markdown());
    println!("{}", table);
}

// -- CSV output --

fn write_csv<R: Serialize, W: Write>(rows: Vec<R>, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn print_mappings_csv(old_key: &str, entries: &[MappingEntry]) -> Result<()> {
    write_csv(build_mapping_rows(old_key, entries), std::io::stdout())
}

pub fn print_reverse_csv(entries: &[ReverseEntry]) -> Result<()> {
    write_csv(build_reverse_rows(entries), std::io::stdout())
}

pub fn print_summary_csv(summary: &BuildSummary) -> Result<()> {
    write_csv(build_summary_rows(summary), std::io::stdout())
}

pub fn print_provinces_csv(catalog: &OldCatalog) -> Result<()> {
    write_csv(build_province_rows(catalog), std::io::stdout())
}

// -- JSON output --

pub fn print_json<T: serde::Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}

fn format_score(score: Option<u32>) -> String {
    match score {
        Some(score) => score.to_string(),
        None => "identity".to_string(),
    }
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
