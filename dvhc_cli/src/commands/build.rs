use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use dvhc_lib::{BuildContext, PipelineConfig, PipelineInputs, Relations};
use indicatif::{ProgressBar, ProgressStyle};

use crate::output::{
    print_json, print_summary_csv, print_summary_markdown, print_summary_table, OutputFormat,
};

#[derive(Args)]
pub struct BuildArgs {
    /// Config file (falls back to $DVHC_CONFIG, then built-in defaults)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory to write the tables into
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Pre-merger catalog export (.json or .csv)
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// New-unit dump
    #[arg(long)]
    pub units: Option<PathBuf>,

    /// Per-new-province merger records
    #[arg(long)]
    pub provinces: Option<PathBuf>,
}

/// Config file values overridden by whatever was given on the command line.
fn resolve_config(args: &BuildArgs) -> Result<PipelineConfig> {
    let mut config = PipelineConfig::discover(args.config.as_deref())?;
    if let Some(dir) = &args.output_dir {
        config.output.dir = dir.clone();
    }
    if let Some(path) = &args.catalog {
        config.inputs.catalog = path.clone();
    }
    if let Some(path) = &args.units {
        config.inputs.units = path.clone();
    }
    if let Some(path) = &args.provinces {
        config.inputs.provinces = path.clone();
    }
    Ok(config)
}

pub fn run(args: &BuildArgs, format: &OutputFormat) -> Result<()> {
    let config = resolve_config(args)?;
    let inputs = PipelineInputs::load(&config.inputs)?;
    let context = BuildContext::prepare(inputs, config.scoring)?;

    let pb = ProgressBar::new(context.units().len() as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "[{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} ({eta}) {msg}",
        )?,
    );
    pb.set_message("matching units...");

    let mut relations = Relations::default();
    let mut resolved = 0;
    for unit in context.units() {
        resolved += context.match_unit(unit, &mut relations);
        pb.inc(1);
    }
    pb.finish_with_message(format!("{} old wards resolved", resolved));

    let tables = context.finish(relations);
    let written = tables
        .write_to_dir(&config.output.dir)
        .with_context(|| format!("writing tables to {}", config.output.dir.display()))?;
    eprintln!("Wrote {} files to {}", written, config.output.dir.display());

    match format {
        OutputFormat::Table => print_summary_table(&tables.summary),
        OutputFormat::Json => print_json(&tables.summary),
        OutputFormat::Csv => print_summary_csv(&tables.summary)?,
        OutputFormat::Markdown => print_summary_markdown(&tables.summary),
    }
    Ok(())
}
