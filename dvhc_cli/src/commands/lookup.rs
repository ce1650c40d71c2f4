use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};
use dvhc_lib::{LookupClient, PipelineConfig, ReverseSource};

use crate::output::{
    print_json, print_mappings_csv, print_mappings_markdown, print_mappings_table,
    print_reverse_csv, print_reverse_markdown, print_reverse_table, OutputFormat,
};

#[derive(Args)]
pub struct LookupArgs {
    #[command(subcommand)]
    pub target: LookupTarget,
}

#[derive(Subcommand)]
pub enum LookupTarget {
    /// Where an old ward went, by key (e.g. 01-001-00001)
    Old {
        old_ward_key: String,

        /// Directory holding the generated tables
        #[arg(long, default_value = "web/data")]
        data_dir: PathBuf,
    },
    /// Which old wards formed a new ward
    New {
        new_province_code: String,

        new_ward_code: String,

        /// Directory holding the generated tables
        #[arg(long, default_value = "web/data")]
        data_dir: PathBuf,
    },
}

pub fn run(args: &LookupArgs, format: &OutputFormat) -> Result<()> {
    let weights = PipelineConfig::discover(None)?.scoring;

    match &args.target {
        LookupTarget::Old {
            old_ward_key,
            data_dir,
        } => {
            let client = LookupClient::new(data_dir, weights)?;
            let Some(entry) = client.forward(old_ward_key) else {
                eprintln!("No data for {}", old_ward_key);
                return Ok(());
            };
            let entries = [entry];
            match format {
                OutputFormat::Table => print_mappings_table(old_ward_key, &entries),
                OutputFormat::Json => print_json(&entries),
                OutputFormat::Csv => print_mappings_csv(old_ward_key, &entries)?,
                OutputFormat::Markdown => print_mappings_markdown(old_ward_key, &entries),
            }
        }
        LookupTarget::New {
            new_province_code,
            new_ward_code,
            data_dir,
        } => {
            let client = LookupClient::new(data_dir, weights)?;
            let lookup = client.reverse(new_province_code, new_ward_code);
            match lookup.source {
                ReverseSource::NoData => {
                    eprintln!("No data for {}/{}", new_province_code, new_ward_code);
                    return Ok(());
                }
                ReverseSource::Recomputed => {
                    tracing::info!("Recomputed from predecessor text");
                }
                ReverseSource::Precomputed => {}
            }
            match format {
                OutputFormat::Table => print_reverse_table(&lookup.entries),
                OutputFormat::Json => print_json(&lookup.entries),
                OutputFormat::Csv => print_reverse_csv(&lookup.entries)?,
                OutputFormat::Markdown => print_reverse_markdown(&lookup.entries),
            }
        }
    }
    Ok(())
}
