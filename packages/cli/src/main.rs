#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for resolving and downloading census survey tables.
//!
//! Run without a subcommand for an interactive menu.

mod args;
mod config;
mod interactive;
mod pipeline;

use std::path::PathBuf;

use census_query_geography_models::GeoValue;
use census_query_models::{GeoRequest, LabelMode};
use census_query_table::aliases::AliasRegistry;
use census_query_table_models::{ColumnSpec, TableRef};
use clap::{Args, Parser, Subcommand};

use crate::args::{parse_column, parse_geo, parse_label_mode, table_refs};
use crate::config::{Settings, SourceArgs};

#[derive(Parser)]
#[command(
    name = "census_query",
    about = "Resolve and download census survey tables"
)]
struct Cli {
    /// TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Tables and geography of one request.
#[derive(Args)]
struct QueryArgs {
    /// Table alias, e.g. "pop" (repeatable; defaults apply if no tables or
    /// columns are given)
    #[arg(long = "table")]
    tables: Vec<String>,

    /// Literal column as `ID=LABEL` (repeatable)
    #[arg(long = "column", value_parser = parse_column)]
    columns: Vec<ColumnSpec>,

    /// Geography as `LEVEL=VALUE`, e.g. `state=Colorado`, `county=059`,
    /// `block_group=*` (repeatable)
    #[arg(long = "geo", value_parser = parse_geo, required = true)]
    geography: Vec<(String, GeoValue)>,

    #[command(flatten)]
    source: SourceArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a request and print the plan as JSON
    Plan {
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Resolve a request, download the data, and write labeled CSV
    Fetch {
        #[command(flatten)]
        query: QueryArgs,
        /// How columns are labeled (rename, header-row)
        #[arg(long, value_parser = parse_label_mode)]
        label_mode: Option<LabelMode>,
        /// Output file (stdout if omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// List table aliases
    Tables,
    /// List geographic hierarchies
    Hierarchies {
        #[command(flatten)]
        source: SourceArgs,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    let Some(command) = cli.command else {
        let settings = Settings::load(config_path, &SourceArgs::default(), None)?;
        return interactive::run(settings).await;
    };

    match command {
        Commands::Tables => pipeline::print_tables(&AliasRegistry::builtin()),
        Commands::Hierarchies { source } => {
            let settings = Settings::load(config_path, &source, None)?;
            let catalog = pipeline::load_hierarchies(settings.hierarchies.as_deref())?;
            pipeline::print_hierarchies(&catalog);
        }
        Commands::Plan { query } => {
            let settings = Settings::load(config_path, &query.source, None)?;
            let (tables, geography) = request(query);
            let client = census_query_client::build_client()?;

            let plan = pipeline::plan(&settings, &client, &tables, &geography).await?;
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        Commands::Fetch {
            query,
            label_mode,
            output,
        } => {
            let settings = Settings::load(config_path, &query.source, label_mode)?;
            let (tables, geography) = request(query);
            let client = census_query_client::build_client()?;

            let plan = pipeline::plan(&settings, &client, &tables, &geography).await?;
            pipeline::fetch(&settings, &client, &plan, output.as_deref()).await?;
        }
    }

    Ok(())
}

fn request(query: QueryArgs) -> (Vec<TableRef>, GeoRequest) {
    let aliases = AliasRegistry::builtin();
    let tables = table_refs(&query.tables, query.columns, aliases.defaults());
    let geography = query.geography.into_iter().collect();
    (tables, geography)
}
