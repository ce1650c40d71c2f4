use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use dvhc_lib::{build_catalog, CatalogSource, CatalogTables};

use crate::output::{
    print_json, print_provinces_csv, print_provinces_markdown, print_provinces_table, OutputFormat,
};

#[derive(Args)]
pub struct CatalogArgs {
    /// Pre-merger catalog export (.json or .csv)
    #[arg(long, default_value = "excelData.json")]
    pub input: PathBuf,

    /// Directory to write the catalogs into
    #[arg(long, default_value = "web/data")]
    pub output_dir: PathBuf,
}

pub fn run(args: &CatalogArgs, format: &OutputFormat) -> Result<()> {
    let rows = CatalogSource::from_path(&args.input).load_rows()?;
    let catalog = build_catalog(&rows);
    let written = CatalogTables::from_catalog(&catalog).write_to_dir(&args.output_dir)?;
    eprintln!("Wrote {} files to {}", written, args.output_dir.display());

    match format {
        OutputFormat::Table => print_provinces_table(&catalog),
        OutputFormat::Json => print_json(&catalog.provinces),
        OutputFormat::Csv => print_provinces_csv(&catalog)?,
        OutputFormat::Markdown => print_provinces_markdown(&catalog),
    }
    Ok(())
}
