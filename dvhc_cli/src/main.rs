mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "dvhc")]
#[command(about = "Map Vietnamese administrative units across the provincial merger")]
struct Cli {
    /// Output format: table, json, csv, markdown
    #[arg(long, default_value = "table", global = true)]
    output: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build every lookup table from the source documents
    Build(commands::build::BuildArgs),
    /// Build only the pre-merger catalogs and discovery indexes
    Catalog(commands::catalog::CatalogArgs),
    /// Query generated tables
    Lookup(commands::lookup::LookupArgs),
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("dvhc=info".parse()?),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let format = OutputFormat::parse(&cli.output)?;

    match &cli.command {
        Commands::Build(args) => commands::build::run(args, &format)?,
        Commands::Catalog(args) => commands::catalog::run(args, &format)?,
        Commands::Lookup(args) => commands::lookup::run(args, &format)?,
    }

    Ok(())
}
