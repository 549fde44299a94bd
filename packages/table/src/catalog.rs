//! Expansion of table aliases into labeled estimate/margin columns.

use std::fmt;

use census_query_table_models::{
    ColumnLabels, Survey, TableRef, estimate_label, margin_id, margin_label,
};

use crate::TableError;
use crate::aliases::AliasRegistry;
use crate::metadata::TableMetadataSource;

/// Alias registry plus a metadata source for one survey and year.
pub struct TableCatalog {
    survey: Survey,
    year: u16,
    aliases: AliasRegistry,
    source: Box<dyn TableMetadataSource>,
}

impl fmt::Debug for TableCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableCatalog")
            .field("survey", &self.survey)
            .field("year", &self.year)
            .field("aliases", &self.aliases)
            .finish_non_exhaustive()
    }
}

impl TableCatalog {
    /// Creates a catalog over the built-in aliases.
    #[must_use]
    pub fn new(survey: Survey, year: u16, source: impl TableMetadataSource + 'static) -> Self {
        Self::with_aliases(survey, year, AliasRegistry::builtin(), source)
    }

    /// Creates a catalog over a custom alias registry.
    #[must_use]
    pub fn with_aliases(
        survey: Survey,
        year: u16,
        aliases: AliasRegistry,
        source: impl TableMetadataSource + 'static,
    ) -> Self {
        Self {
            survey,
            year,
            aliases,
            source: Box::new(source),
        }
    }

    /// Survey this catalog expands against.
    #[must_use]
    pub const fn survey(&self) -> Survey {
        self.survey
    }

    /// Survey year this catalog expands against.
    #[must_use]
    pub const fn year(&self) -> u16 {
        self.year
    }

    /// The alias registry.
    #[must_use]
    pub const fn aliases(&self) -> &AliasRegistry {
        &self.aliases
    }

    /// Base table identifier for an alias.
    #[must_use]
    pub fn base_table(&self, alias: &str) -> Option<&str> {
        self.aliases.base_table(alias)
    }

    /// The default table list, for callers that ask for nothing specific.
    #[must_use]
    pub fn default_tables(&self) -> Vec<TableRef> {
        self.aliases
            .defaults()
            .iter()
            .map(|alias| TableRef::alias(alias.as_str()))
            .collect()
    }

    /// Expands one table reference.
    ///
    /// Literals are returned unchanged. Aliases become every estimate
    /// column of the base table, each immediately followed by its
    /// margin-of-error column.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::UnknownTable`] for an unrecognized alias, or
    /// any error from the metadata source.
    pub fn expand(&self, table: &TableRef) -> Result<ColumnLabels, TableError> {
        match table {
            TableRef::Literal(labels) => Ok(labels.clone()),
            TableRef::Alias(alias) => self.expand_alias(alias),
        }
    }

    fn expand_alias(&self, alias: &str) -> Result<ColumnLabels, TableError> {
        let base = self
            .base_table(alias)
            .ok_or_else(|| TableError::UnknownTable {
                alias: alias.to_string(),
            })?;

        let fields = self.source.table_fields(self.survey, self.year, base)?;

        let mut labels = ColumnLabels::new();
        for (id, field) in &fields {
            // Margins and annotation variables are derived or dropped.
            let Some(margin) = margin_id(id) else {
                continue;
            };
            let label = estimate_label(field);
            let moe_label = margin_label(&label);
            labels.insert(id.as_str(), label);
            labels.insert(margin, moe_label);
        }

        log::debug!(
            "Expanded alias '{alias}' ({base}, {} {}) into {} columns",
            self.survey,
            self.year,
            labels.len()
        );

        Ok(labels)
    }

    /// Expands a list of table references into one merged set.
    ///
    /// Columns keep first-seen order; when two entries produce the same
    /// identifier the later label wins.
    ///
    /// # Errors
    ///
    /// Returns the first [`TableError`] hit; no partial result is returned.
    pub fn expand_many(&self, tables: &[TableRef]) -> Result<ColumnLabels, TableError> {
        let mut merged = ColumnLabels::new();
        for table in tables {
            merged.merge(self.expand(table)?);
        }
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use census_query_table_models::{FieldMetadata, MARGIN_SUFFIX};

    use super::*;
    use crate::metadata::{StaticMetadataSource, TableFields};

    fn field(concept: &str, label: &str) -> FieldMetadata {
        FieldMetadata {
            label: label.to_string(),
            concept: concept.to_string(),
        }
    }

    fn fields(entries: &[(&str, FieldMetadata)]) -> TableFields {
        entries
            .iter()
            .map(|(id, f)| ((*id).to_string(), f.clone()))
            .collect::<BTreeMap<_, _>>()
    }

    fn catalog() -> TableCatalog {
        let pop = "TOTAL POPULATION";
        let income = "HOUSEHOLD INCOME IN THE PAST 12 MONTHS";
        let source = StaticMetadataSource::new()
            .with_table(
                Survey::Acs5,
                2018,
                "B01003",
                fields(&[
                    ("B01003_001E", field(pop, "Estimate!!Total")),
                    ("B01003_001M", field(pop, "Margin of Error!!Total")),
                    ("B01003_001EA", field(pop, "Annotation of Estimate!!Total")),
                ]),
            )
            .with_table(
                Survey::Acs5,
                2018,
                "B19001",
                fields(&[
                    ("B19001_001E", field(income, "Estimate!!Total")),
                    ("B19001_002E", field(income, "Estimate!!Total!!Less than $10,000")),
                    ("B19001_003E", field(income, "Estimate!!Total!!$10,000 to $14,999")),
                ]),
            );
        TableCatalog::new(Survey::Acs5, 2018, source)
    }

    #[test]
    fn expands_alias_into_pairs() {
        let labels = catalog().expand(&TableRef::alias("pop")).unwrap();
        assert_eq!(
            labels.ids().collect::<Vec<_>>(),
            vec!["B01003_001E", "B01003_001M"]
        );
        assert_eq!(
            labels.get("B01003_001E"),
            Some("TOTAL POPULATION!!Estimate!!Total")
        );
        assert_eq!(
            labels.get("B01003_001M"),
            Some("MOE!!TOTAL POPULATION!!Estimate!!Total")
        );
    }

    #[test]
    fn every_estimate_has_a_margin_sibling() {
        let catalog = catalog();
        for alias in ["pop", "HI"] {
            let labels = catalog.expand(&TableRef::alias(alias)).unwrap();
            assert_eq!(labels.len() % 2, 0, "{alias} expanded to an odd count");

            let ids: Vec<&str> = labels.ids().collect();
            for pair in ids.chunks(2) {
                let margin = margin_id(pair[0]).unwrap();
                assert_eq!(pair[1], margin, "estimate not followed by its margin");
                assert!(pair[1].ends_with(MARGIN_SUFFIX));
            }
        }
    }

    #[test]
    fn literals_pass_through() {
        let literal: ColumnLabels = [("B01003_001E", "Population!!Test")].into_iter().collect();
        let labels = catalog().expand(&TableRef::Literal(literal.clone())).unwrap();
        assert_eq!(labels, literal);
    }

    #[test]
    fn unknown_alias_fails() {
        let err = catalog().expand(&TableRef::alias("not_a_table")).unwrap_err();
        assert!(matches!(err, TableError::UnknownTable { ref alias } if alias == "not_a_table"));
    }

    #[test]
    fn alias_without_metadata_fails() {
        let err = catalog().expand(&TableRef::alias("age")).unwrap_err();
        assert!(matches!(err, TableError::MissingMetadata { ref table, .. } if table == "B01001"));
    }

    #[test]
    fn expand_many_merges_in_order_with_later_labels_winning() {
        let literal: ColumnLabels = [("B01003_001E", "Population!!Test")].into_iter().collect();
        let labels = catalog()
            .expand_many(&[TableRef::alias("pop"), TableRef::alias("HI"), literal.into()])
            .unwrap();

        assert_eq!(labels.len(), 8);
        assert_eq!(labels.ids().next(), Some("B01003_001E"));
        assert_eq!(labels.get("B01003_001E"), Some("Population!!Test"));
        assert_eq!(
            labels.get("B01003_001M"),
            Some("MOE!!TOTAL POPULATION!!Estimate!!Total")
        );
    }

    #[test]
    fn expand_many_is_idempotent() {
        let catalog = catalog();
        let tables = [TableRef::alias("pop"), TableRef::alias("HI")];
        let first = catalog.expand_many(&tables).unwrap();
        let second = catalog.expand_many(&tables).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_list_expands_to_nothing() {
        assert!(catalog().expand_many(&[]).unwrap().is_empty());
    }

    #[test]
    fn default_tables_are_aliases() {
        assert_eq!(
            catalog().default_tables(),
            vec![
                TableRef::alias("pop"),
                TableRef::alias("age"),
                TableRef::alias("med_HI")
            ]
        );
    }
}
