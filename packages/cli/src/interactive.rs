//! Interactive prompts for building a query without memorizing flags.

use std::path::PathBuf;

use census_query_geography_models::GeoValue;
use census_query_models::{GeoRequest, LabelMode};
use census_query_table::aliases::AliasRegistry;
use census_query_table_models::TableRef;
use dialoguer::{Input, MultiSelect, Select};

use crate::config::Settings;
use crate::pipeline;

/// Top-level actions in the interactive menu.
enum Action {
    Fetch,
    Plan,
    ListTables,
    ListHierarchies,
}

impl Action {
    const ALL: &[Self] = &[Self::Fetch, Self::Plan, Self::ListTables, Self::ListHierarchies];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Fetch => "Fetch data",
            Self::Plan => "Show query plan",
            Self::ListTables => "List table aliases",
            Self::ListHierarchies => "List geographic hierarchies",
        }
    }
}

/// Runs the interactive menu.
///
/// # Errors
///
/// Returns an error if a prompt fails or the selected operation fails.
pub async fn run(mut settings: Settings) -> Result<(), Box<dyn std::error::Error>> {
    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match Action::ALL[idx] {
        Action::ListTables => pipeline::print_tables(&AliasRegistry::builtin()),
        Action::ListHierarchies => {
            let catalog = pipeline::load_hierarchies(settings.hierarchies.as_deref())?;
            pipeline::print_hierarchies(&catalog);
        }
        Action::Plan => {
            let (tables, geography) = prompt_request(&settings)?;
            let client = census_query_client::build_client()?;
            let plan = pipeline::plan(&settings, &client, &tables, &geography).await?;
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        Action::Fetch => {
            let (tables, geography) = prompt_request(&settings)?;
            settings.label_mode = prompt_label_mode(settings.label_mode)?;
            let output = prompt_output()?;

            let client = census_query_client::build_client()?;
            let plan = pipeline::plan(&settings, &client, &tables, &geography).await?;
            pipeline::fetch(&settings, &client, &plan, output.as_deref()).await?;
        }
    }

    Ok(())
}

/// Prompts for tables, a hierarchy, and a value for each of its levels.
fn prompt_request(
    settings: &Settings,
) -> Result<(Vec<TableRef>, GeoRequest), Box<dyn std::error::Error>> {
    let aliases = AliasRegistry::builtin();
    let entries: Vec<_> = aliases.iter().collect();
    let labels: Vec<String> = entries
        .iter()
        .map(|a| format!("{} ({}) {}", a.name, a.table, a.description))
        .collect();
    let checked: Vec<bool> = entries
        .iter()
        .map(|a| aliases.defaults().contains(&a.name))
        .collect();

    let selected = MultiSelect::new()
        .with_prompt("Select tables (space=toggle, enter=confirm)")
        .items(&labels)
        .defaults(&checked)
        .interact()?;

    let tables: Vec<TableRef> = selected
        .iter()
        .map(|&i| TableRef::alias(entries[i].name.as_str()))
        .collect();

    let catalog = pipeline::load_hierarchies(settings.hierarchies.as_deref())?;
    let definitions = catalog.definitions();
    let hierarchy_labels: Vec<String> = definitions
        .iter()
        .map(|d| format!("{} ({})", d.name, d.levels.join(" > ")))
        .collect();

    let idx = Select::new()
        .with_prompt("Geographic hierarchy")
        .items(&hierarchy_labels)
        .default(0)
        .max_length(20)
        .interact()?;

    let mut geography = GeoRequest::new();
    for level in &definitions[idx].levels {
        let raw: String = Input::new()
            .with_prompt(format!("{level} (name, code, or *)"))
            .default("*".to_string())
            .interact_text()?;
        geography.insert(level.as_str(), GeoValue::classify(&raw));
    }

    Ok((tables, geography))
}

fn prompt_label_mode(current: LabelMode) -> Result<LabelMode, Box<dyn std::error::Error>> {
    let modes = [LabelMode::Rename, LabelMode::HeaderRow];
    let labels = ["Replace identifiers with labels", "Keep identifiers, add a label row"];
    let default = modes.iter().position(|m| *m == current).unwrap_or(0);

    let idx = Select::new()
        .with_prompt("Column labels")
        .items(&labels)
        .default(default)
        .interact()?;

    Ok(modes[idx])
}

fn prompt_output() -> Result<Option<PathBuf>, Box<dyn std::error::Error>> {
    let raw: String = Input::new()
        .with_prompt("Output CSV path (empty for stdout)")
        .allow_empty(true)
        .interact_text()?;

    let trimmed = raw.trim();
    Ok((!trimmed.is_empty()).then(|| PathBuf::from(trimmed)))
}
