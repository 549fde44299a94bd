//! Turns table references and geography arguments into a [`QueryPlan`].

use std::collections::BTreeMap;

use census_query_geography::GeoError;
use census_query_geography::hierarchy::HierarchyCatalog;
use census_query_geography::registry::CodeRegistry;
use census_query_geography_models::query::GeoQuery;
use census_query_geography_models::{COUNTY, GeoValue, STATE};
use census_query_models::{GeoRequest, QueryPlan};
use census_query_table::catalog::TableCatalog;
use census_query_table_models::TableRef;

use crate::QueryError;

/// Owns the reference data for one survey year and resolves requests
/// against it.
#[derive(Debug)]
pub struct QueryResolver {
    registry: CodeRegistry,
    tables: TableCatalog,
    hierarchies: HierarchyCatalog,
}

impl QueryResolver {
    /// Composes a resolver from its three catalogs.
    #[must_use]
    pub const fn new(
        registry: CodeRegistry,
        tables: TableCatalog,
        hierarchies: HierarchyCatalog,
    ) -> Self {
        Self {
            registry,
            tables,
            hierarchies,
        }
    }

    /// The code registry.
    #[must_use]
    pub const fn registry(&self) -> &CodeRegistry {
        &self.registry
    }

    /// The table catalog.
    #[must_use]
    pub const fn tables(&self) -> &TableCatalog {
        &self.tables
    }

    /// The hierarchy catalog.
    #[must_use]
    pub const fn hierarchies(&self) -> &HierarchyCatalog {
        &self.hierarchies
    }

    /// Resolves a request into a plan.
    ///
    /// Tables are expanded before any geography is looked at, so a bad
    /// alias fails without touching the registry. Names are resolved to
    /// codes (state before county), the supplied level set is matched to
    /// exactly one hierarchy, and the predicates are emitted in that
    /// hierarchy's order. An empty table list is valid.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError`] wrapping the first table or geography error;
    /// no partial plan is returned.
    pub fn resolve(
        &self,
        tables: &[TableRef],
        geography: &GeoRequest,
    ) -> Result<QueryPlan, QueryError> {
        let columns = self.tables.expand_many(tables)?;
        let resolved = self.resolve_values(geography)?;
        let hierarchy = self.hierarchies.match_levels(geography.levels())?;

        let geography = GeoQuery::from_resolved(
            hierarchy
                .levels
                .iter()
                .filter_map(|level| resolved.get(level.as_str()).map(|v| (level.as_str(), v))),
        );

        log::info!(
            "Resolved {} columns over hierarchy '{}': {:?}",
            columns.len(),
            hierarchy.name,
            geography.pairs().collect::<Vec<_>>()
        );

        Ok(QueryPlan {
            hierarchy: hierarchy.name.clone(),
            columns,
            geography,
        })
    }

    /// Replaces every name in the request with its code. Codes and the
    /// wildcard pass through.
    fn resolve_values<'a>(
        &self,
        request: &'a GeoRequest,
    ) -> Result<BTreeMap<&'a str, GeoValue>, GeoError> {
        let state_code = match request.get(STATE) {
            Some(GeoValue::Name(name)) => Some(self.registry.resolve_state(name)?.to_string()),
            Some(GeoValue::Code(code)) => Some(code.clone()),
            Some(GeoValue::Wildcard) | None => None,
        };

        let mut resolved = BTreeMap::new();
        for (level, value) in request.iter() {
            let value = match value {
                GeoValue::Name(name) => {
                    let code = self.resolve_name(level, name, state_code.as_deref())?;
                    log::debug!("Resolved {level} '{name}' -> {code}");
                    GeoValue::Code(code)
                }
                other => other.clone(),
            };
            resolved.insert(level, value);
        }

        Ok(resolved)
    }

    fn resolve_name(
        &self,
        level: &str,
        name: &str,
        state_code: Option<&str>,
    ) -> Result<String, GeoError> {
        match (level, state_code) {
            (STATE, Some(code)) => Ok(code.to_string()),
            (COUNTY, Some(state)) => self.registry.resolve_county(state, name).map(str::to_string),
            // Only states and counties are indexed, and a county name means
            // nothing without a concrete state.
            _ => Err(GeoError::UnknownGeography {
                level: level.to_string(),
                value: name.to_string(),
                year: self.registry.year(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use census_query_geography::registry::ReferenceEntry;
    use census_query_geography_models::{BLOCK_GROUP, CENSUS_TRACT, HierarchyDefinition};
    use census_query_table::TableError;
    use census_query_table::metadata::StaticMetadataSource;
    use census_query_table_models::{ColumnLabels, FieldMetadata, Survey};

    use super::*;

    fn tables() -> TableCatalog {
        let fields = BTreeMap::from([
            (
                "B01003_001E".to_string(),
                FieldMetadata {
                    label: "Estimate!!Total".to_string(),
                    concept: "TOTAL POPULATION".to_string(),
                },
            ),
            (
                "B01003_001M".to_string(),
                FieldMetadata {
                    label: "Margin of Error!!Total".to_string(),
                    concept: "TOTAL POPULATION".to_string(),
                },
            ),
        ]);
        let source = StaticMetadataSource::new().with_table(Survey::Acs5, 2018, "B01003", fields);
        TableCatalog::new(Survey::Acs5, 2018, source)
    }

    fn registry() -> CodeRegistry {
        CodeRegistry::from_entries(
            2018,
            [
                ReferenceEntry::state("08", "Colorado"),
                ReferenceEntry::county("08", "001", "Adams County"),
                ReferenceEntry::county("08", "059", "Jefferson County"),
                ReferenceEntry::state("29", "Missouri"),
                ReferenceEntry::county("29", "099", "Jefferson County"),
            ],
        )
    }

    fn resolver() -> QueryResolver {
        QueryResolver::new(registry(), tables(), HierarchyCatalog::builtin())
    }

    fn pop() -> Vec<TableRef> {
        vec![TableRef::alias("pop")]
    }

    #[test]
    fn resolves_state_and_county_names() {
        let request = GeoRequest::new()
            .with(STATE, GeoValue::name("Colorado"))
            .with(COUNTY, GeoValue::name("Jefferson County"));

        let plan = resolver().resolve(&pop(), &request).unwrap();

        assert_eq!(plan.hierarchy, COUNTY);
        assert_eq!(
            plan.geography.pairs().collect::<Vec<_>>(),
            vec![("state", "08"), ("county", "059")]
        );
        assert_eq!(
            plan.column_ids().collect::<Vec<_>>(),
            vec!["B01003_001E", "B01003_001M"]
        );
        assert_eq!(
            plan.columns.get("B01003_001E"),
            Some("TOTAL POPULATION!!Estimate!!Total")
        );
        assert_eq!(
            plan.columns.get("B01003_001M"),
            Some("MOE!!TOTAL POPULATION!!Estimate!!Total")
        );
    }

    #[test]
    fn renames_levels_and_keeps_codes_and_wildcards() {
        let request = GeoRequest::new()
            .with(STATE, GeoValue::name("Colorado"))
            .with(COUNTY, GeoValue::name("Jefferson County"))
            .with(CENSUS_TRACT, GeoValue::code("011724"))
            .with(BLOCK_GROUP, GeoValue::Wildcard);

        let plan = resolver().resolve(&pop(), &request).unwrap();

        assert_eq!(
            plan.geography.pairs().collect::<Vec<_>>(),
            vec![
                ("state", "08"),
                ("county", "059"),
                ("tract", "011724"),
                ("block group", "*"),
            ]
        );
    }

    #[test]
    fn unknown_alias_fails_before_geography() {
        // The state is unknown too; only the table error may surface.
        let request = GeoRequest::new().with(STATE, GeoValue::name("Atlantis"));
        let err = resolver()
            .resolve(&[TableRef::alias("not_a_table")], &request)
            .unwrap_err();

        assert!(matches!(
            err,
            QueryError::Table(TableError::UnknownTable { ref alias }) if alias == "not_a_table"
        ));
    }

    #[test]
    fn empty_tables_with_single_level_hierarchy() {
        let resolver = QueryResolver::new(
            registry(),
            tables(),
            HierarchyCatalog::from_definitions([HierarchyDefinition::new("all_states", [STATE])]),
        );
        let request = GeoRequest::new().with(STATE, GeoValue::Wildcard);

        let plan = resolver.resolve(&[], &request).unwrap();

        assert!(plan.columns.is_empty());
        assert_eq!(plan.hierarchy, "all_states");
        assert_eq!(
            plan.geography.pairs().collect::<Vec<_>>(),
            vec![("state", "*")]
        );
    }

    #[test]
    fn county_names_are_scoped_to_their_state() {
        let request = GeoRequest::new()
            .with(STATE, GeoValue::code("29"))
            .with(COUNTY, GeoValue::name("Jefferson County"));

        let plan = resolver().resolve(&pop(), &request).unwrap();
        assert_eq!(
            plan.geography.pairs().collect::<Vec<_>>(),
            vec![("state", "29"), ("county", "099")]
        );
    }

    #[test]
    fn unknown_place_name_fails() {
        let request = GeoRequest::new()
            .with(STATE, GeoValue::name("Colorado"))
            .with(COUNTY, GeoValue::name("Gotham County"));

        let err = resolver().resolve(&pop(), &request).unwrap_err();
        assert!(matches!(
            err,
            QueryError::Geography(GeoError::UnknownGeography { ref level, ref value, .. })
                if level == COUNTY && value == "Gotham County"
        ));
    }

    #[test]
    fn county_name_under_wildcard_state_fails() {
        let request = GeoRequest::new()
            .with(STATE, GeoValue::Wildcard)
            .with(COUNTY, GeoValue::name("Jefferson County"));

        assert!(matches!(
            resolver().resolve(&pop(), &request),
            Err(QueryError::Geography(GeoError::UnknownGeography { .. }))
        ));
    }

    #[test]
    fn tract_without_county_has_no_hierarchy() {
        let request = GeoRequest::new()
            .with(STATE, GeoValue::code("08"))
            .with(CENSUS_TRACT, GeoValue::Wildcard);

        assert!(matches!(
            resolver().resolve(&pop(), &request),
            Err(QueryError::Geography(GeoError::NoMatchingHierarchy { .. }))
        ));
    }

    #[test]
    fn literal_columns_pass_through() {
        let literal: ColumnLabels = [("B01003_001E", "Population!!Test")].into_iter().collect();
        let request = GeoRequest::new().with(STATE, GeoValue::Wildcard);

        let plan = resolver().resolve(&[literal.clone().into()], &request).unwrap();
        assert_eq!(plan.columns, literal);
        assert_eq!(plan.hierarchy, STATE);
    }

    #[test]
    fn resolution_is_repeatable() {
        let resolver = resolver();
        let request = GeoRequest::new()
            .with(STATE, GeoValue::name("Colorado"))
            .with(COUNTY, GeoValue::Wildcard);

        let first = resolver.resolve(&pop(), &request).unwrap();
        let second = resolver.resolve(&pop(), &request).unwrap();
        assert_eq!(first, second);
    }
}
