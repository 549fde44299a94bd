//! Loading reference data and running a query end to end.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use census_query::assemble::{ResultAssembler, write_csv};
use census_query::resolver::QueryResolver;
use census_query_client::data::fetch_data;
use census_query_client::metadata::fetch_metadata_source;
use census_query_geography::GeoError;
use census_query_geography::hierarchy::HierarchyCatalog;
use census_query_geography::registry::CodeRegistry;
use census_query_geography_models::{COUNTY, GeoValue};
use census_query_models::{GeoRequest, QueryPlan};
use census_query_table::aliases::AliasRegistry;
use census_query_table::catalog::TableCatalog;
use census_query_table::metadata::StaticMetadataSource;
use census_query_table_models::TableRef;

use crate::config::Settings;

/// Loads the code registry for the configured year.
///
/// Without a geocode sheet only state names resolve.
///
/// # Errors
///
/// Returns [`GeoError`] if the sheet cannot be read.
pub fn load_registry(settings: &Settings) -> Result<CodeRegistry, GeoError> {
    match &settings.geocodes {
        Some(path) => CodeRegistry::from_csv_path(settings.year, path),
        None => {
            log::warn!("No geocode sheet configured; county names will not resolve");
            Ok(CodeRegistry::builtin_states(settings.year))
        }
    }
}

/// Rejects a county given by name when no geocode sheet is configured.
///
/// The built-in registry only knows states, so such a name could never
/// resolve.
///
/// # Errors
///
/// Returns a message naming the county and the missing `--geocodes` sheet.
pub fn check_county_names(settings: &Settings, geography: &GeoRequest) -> Result<(), String> {
    match geography.get(COUNTY) {
        Some(GeoValue::Name(name)) if settings.geocodes.is_none() => Err(format!(
            "County name '{name}' needs a geocode sheet for {}; pass --geocodes \
             (or set `geocodes` in the config file) or give the county code",
            settings.year
        )),
        _ => Ok(()),
    }
}

/// Loads the hierarchy catalog from a file, or the built-in one.
///
/// # Errors
///
/// Returns [`GeoError`] if the file cannot be read.
pub fn load_hierarchies(path: Option<&Path>) -> Result<HierarchyCatalog, GeoError> {
    path.map_or_else(|| Ok(HierarchyCatalog::builtin()), HierarchyCatalog::from_csv_path)
}

/// Gathers field metadata for the requested aliases, from offline files
/// when configured and from the data service otherwise.
///
/// Unknown aliases are skipped here; resolution reports them.
async fn load_metadata(
    settings: &Settings,
    client: &reqwest::Client,
    aliases: &AliasRegistry,
    tables: &[TableRef],
) -> Result<StaticMetadataSource, Box<dyn std::error::Error>> {
    if !settings.metadata.is_empty() {
        let mut source = StaticMetadataSource::new();
        for path in &settings.metadata {
            source.load_groups_file(settings.survey, settings.year, path)?;
        }
        return Ok(source);
    }

    let base_tables: Vec<&str> = tables
        .iter()
        .filter_map(|table| match table {
            TableRef::Alias(alias) => aliases.base_table(alias),
            TableRef::Literal(_) => None,
        })
        .collect();

    Ok(fetch_metadata_source(
        client,
        &settings.client,
        settings.survey,
        settings.year,
        &base_tables,
    )
    .await?)
}

/// Loads everything a resolver needs for the given tables.
///
/// # Errors
///
/// Returns an error if any reference data cannot be loaded.
pub async fn build_resolver(
    settings: &Settings,
    client: &reqwest::Client,
    tables: &[TableRef],
) -> Result<QueryResolver, Box<dyn std::error::Error>> {
    let aliases = AliasRegistry::builtin();
    let source = load_metadata(settings, client, &aliases, tables).await?;
    let catalog = TableCatalog::with_aliases(settings.survey, settings.year, aliases, source);

    Ok(QueryResolver::new(
        load_registry(settings)?,
        catalog,
        load_hierarchies(settings.hierarchies.as_deref())?,
    ))
}

/// Resolves a request into a plan.
///
/// # Errors
///
/// Returns an error if reference data cannot be loaded or the request
/// does not resolve.
pub async fn plan(
    settings: &Settings,
    client: &reqwest::Client,
    tables: &[TableRef],
    geography: &GeoRequest,
) -> Result<QueryPlan, Box<dyn std::error::Error>> {
    check_county_names(settings, geography)?;
    let resolver = build_resolver(settings, client, tables).await?;
    Ok(resolver.resolve(tables, geography)?)
}

/// Downloads a plan's data, labels it, and writes CSV to `output` or
/// stdout.
///
/// # Errors
///
/// Returns an error if the download, labeling, or write fails.
pub async fn fetch(
    settings: &Settings,
    client: &reqwest::Client,
    plan: &QueryPlan,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let raw = fetch_data(client, &settings.client, settings.survey, settings.year, plan).await?;
    let rows = raw.rows.len();
    let table = ResultAssembler::new(settings.label_mode).label(raw, &plan.columns)?;

    if let Some(path) = output {
        write_csv(&table, BufWriter::new(File::create(path)?))?;
        log::info!("Wrote {rows} rows to {}", path.display());
    } else {
        write_csv(&table, std::io::stdout().lock())?;
    }

    Ok(())
}

/// Prints the table alias list.
pub fn print_tables(aliases: &AliasRegistry) {
    println!("{:<10} {:<8} DESCRIPTION", "ALIAS", "TABLE");
    println!("{}", "-".repeat(60));
    for alias in aliases.iter() {
        let marker = if aliases.defaults().contains(&alias.name) {
            " (default)"
        } else {
            ""
        };
        println!(
            "{:<10} {:<8} {}{marker}",
            alias.name, alias.table, alias.description
        );
    }
}

/// Prints the hierarchy definitions.
pub fn print_hierarchies(catalog: &HierarchyCatalog) {
    println!("{:<28} LEVELS", "NAME");
    println!("{}", "-".repeat(60));
    for definition in catalog.definitions() {
        println!("{:<28} {}", definition.name, definition.levels.join(" > "));
    }
}
