//! Field metadata sources for table expansion.
//!
//! The catalog never talks to the network itself. It asks a
//! [`TableMetadataSource`] for the variables of a base table; the CLI
//! fills a [`StaticMetadataSource`] either from the data service's
//! `groups/<table>.json` documents on disk or by downloading them first.

use std::collections::BTreeMap;
use std::path::Path;

use census_query_table_models::{FieldMetadata, Survey};
use serde::Deserialize;

use crate::TableError;

/// Variable metadata for one base table, keyed by column identifier.
pub type TableFields = BTreeMap<String, FieldMetadata>;

/// Supplies field metadata for base tables.
pub trait TableMetadataSource: Send + Sync {
    /// Returns every variable of `table` for the given survey and year.
    ///
    /// # Errors
    ///
    /// Returns [`TableError`] if the table is not available.
    fn table_fields(
        &self,
        survey: Survey,
        year: u16,
        table: &str,
    ) -> Result<TableFields, TableError>;
}

/// Shape of the data service's `groups/<table>.json` document.
#[derive(Debug, Deserialize)]
struct GroupDocument {
    variables: TableFields,
}

/// Parses a `groups/<table>.json` document into table fields.
///
/// Variables of other tables that the document may list (`NAME`,
/// `GEO_ID`) are dropped.
///
/// # Errors
///
/// Returns [`TableError::Json`] if the document is malformed.
pub fn parse_groups_document(table: &str, json: &str) -> Result<TableFields, TableError> {
    let document: GroupDocument = serde_json::from_str(json)?;
    let prefix = format!("{table}_");

    Ok(document
        .variables
        .into_iter()
        .filter(|(id, _)| id.starts_with(&prefix))
        .collect())
}

/// In-memory metadata keyed by `(survey, year, table)`.
#[derive(Debug, Clone, Default)]
pub struct StaticMetadataSource {
    tables: BTreeMap<(Survey, u16, String), TableFields>,
}

impl StaticMetadataSource {
    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) the fields of one table.
    pub fn insert(
        &mut self,
        survey: Survey,
        year: u16,
        table: impl Into<String>,
        fields: TableFields,
    ) {
        self.tables.insert((survey, year, table.into()), fields);
    }

    /// Builder form of [`Self::insert`].
    #[must_use]
    pub fn with_table(
        mut self,
        survey: Survey,
        year: u16,
        table: impl Into<String>,
        fields: TableFields,
    ) -> Self {
        self.insert(survey, year, table, fields);
        self
    }

    /// Adds a table from a `groups/<table>.json` document.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::Json`] if the document is malformed.
    pub fn insert_groups_json(
        &mut self,
        survey: Survey,
        year: u16,
        table: &str,
        json: &str,
    ) -> Result<(), TableError> {
        let fields = parse_groups_document(table, json)?;
        log::debug!("Loaded {} variables for table {table}", fields.len());
        self.insert(survey, year, table, fields);
        Ok(())
    }

    /// Adds a table from a groups document on disk. The table identifier
    /// is the file stem (`B01003.json` -> `B01003`).
    ///
    /// # Errors
    ///
    /// Returns [`TableError`] if the file cannot be read or parsed.
    pub fn load_groups_file(
        &mut self,
        survey: Survey,
        year: u16,
        path: &Path,
    ) -> Result<String, TableError> {
        let table = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        let json = std::fs::read_to_string(path)?;
        self.insert_groups_json(survey, year, &table, &json)?;
        log::info!("Loaded metadata for table {table} from {}", path.display());
        Ok(table)
    }

    /// Whether metadata for a table is present.
    #[must_use]
    pub fn contains(&self, survey: Survey, year: u16, table: &str) -> bool {
        self.tables
            .contains_key(&(survey, year, table.to_string()))
    }

    /// Number of tables held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whether no tables are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl TableMetadataSource for StaticMetadataSource {
    fn table_fields(
        &self,
        survey: Survey,
        year: u16,
        table: &str,
    ) -> Result<TableFields, TableError> {
        self.tables
            .get(&(survey, year, table.to_string()))
            .cloned()
            .ok_or_else(|| TableError::MissingMetadata {
                table: table.to_string(),
                survey: survey.to_string(),
                year,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GROUP_JSON: &str = r#"{
        "variables": {
            "B01003_001E": {
                "label": "Estimate!!Total",
                "concept": "TOTAL POPULATION",
                "predicateType": "int",
                "group": "B01003",
                "limit": 0
            },
            "B01003_001M": {
                "label": "Margin of Error!!Total",
                "concept": "TOTAL POPULATION",
                "group": "B01003"
            },
            "NAME": {
                "label": "Geographic Area Name",
                "predicateType": "string",
                "group": "N/A"
            }
        }
    }"#;

    #[test]
    fn parses_groups_document() {
        let fields = parse_groups_document("B01003", GROUP_JSON).unwrap();
        assert_eq!(
            fields.keys().collect::<Vec<_>>(),
            vec!["B01003_001E", "B01003_001M"]
        );
        assert_eq!(fields["B01003_001E"].concept, "TOTAL POPULATION");
        assert_eq!(fields["B01003_001E"].label, "Estimate!!Total");
    }

    #[test]
    fn rejects_malformed_document() {
        assert!(matches!(
            parse_groups_document("B01003", r#"{"vars": {}}"#),
            Err(TableError::Json(_))
        ));
    }

    #[test]
    fn static_source_is_keyed_by_survey_and_year() {
        let mut source = StaticMetadataSource::new();
        source
            .insert_groups_json(Survey::Acs5, 2018, "B01003", GROUP_JSON)
            .unwrap();

        assert!(source.contains(Survey::Acs5, 2018, "B01003"));
        assert_eq!(
            source.table_fields(Survey::Acs5, 2018, "B01003").unwrap().len(),
            2
        );
        assert!(matches!(
            source.table_fields(Survey::Acs1, 2018, "B01003"),
            Err(TableError::MissingMetadata { .. })
        ));
        assert!(matches!(
            source.table_fields(Survey::Acs5, 2019, "B01003"),
            Err(TableError::MissingMetadata { .. })
        ));
    }
}
