//! Catalog of the geographic hierarchies the data service accepts.
//!
//! Each row of the hierarchy reference is a hyphen-joined chain of level
//! names (`State-County-Census Tract`). Rows are split, lower-cased and
//! made identifier-safe (`census_tract`), then keyed by their finest
//! level. A query's level set must equal exactly one definition's level
//! set; subsets and supersets never match.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use census_query_geography_models::{BLOCK, BLOCK_GROUP, COUNTY, HierarchyDefinition};

use crate::GeoError;

/// Hierarchy reference embedded at compile time.
const BUILTIN_HIERARCHIES: &str = include_str!("../data/geo_hierarchies.csv");

const NAME_COLUMN: &str = "name";

/// Name of the derived county-only hierarchy.
pub const ALL_COUNTIES: &str = "all_counties";

/// Ordered hierarchy definitions, looked up by name or by level set.
#[derive(Debug, Clone, Default)]
pub struct HierarchyCatalog {
    definitions: Vec<HierarchyDefinition>,
}

impl HierarchyCatalog {
    /// Returns the catalog built from the embedded hierarchy reference.
    ///
    /// # Panics
    ///
    /// Panics if the embedded CSV is malformed. It is a compile-time
    /// constant, so a failure here is a development error.
    #[must_use]
    pub fn builtin() -> Self {
        Self::from_csv_reader(BUILTIN_HIERARCHIES.as_bytes())
            .unwrap_or_else(|e| panic!("Failed to parse built-in geo_hierarchies.csv: {e}"))
    }

    /// Loads a catalog from a delimited hierarchy reference with a `name`
    /// column, then adds the derived `block` and `all_counties`
    /// definitions.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError`] if the CSV is malformed or has no `name`
    /// column.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, GeoError> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

        let name_idx = reader
            .headers()?
            .iter()
            .position(|h| h.trim() == NAME_COLUMN)
            .ok_or_else(|| GeoError::MissingColumn {
                column: NAME_COLUMN.to_string(),
            })?;

        let mut catalog = Self::default();

        for result in reader.records() {
            let record = result?;
            let raw = record.get(name_idx).unwrap_or("");

            let Some(levels) = parse_level_chain(raw) else {
                log::warn!("Skipping empty hierarchy row: {raw:?}");
                continue;
            };

            if let Some(finest) = levels.last().cloned() {
                catalog.insert(HierarchyDefinition::new(finest, levels));
            }
        }

        catalog.derive_composites();

        log::info!("Loaded {} geographic hierarchies", catalog.len());

        Ok(catalog)
    }

    /// Loads a catalog from a hierarchy reference file on disk.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError`] if the file cannot be read or parsed.
    pub fn from_csv_path(path: &Path) -> Result<Self, GeoError> {
        log::info!("Loading geographic hierarchies from {}", path.display());
        let file = File::open(path)?;
        Self::from_csv_reader(file)
    }

    /// Builds a catalog from explicit definitions, with no derivation.
    ///
    /// A definition whose name repeats an earlier one replaces it.
    #[must_use]
    pub fn from_definitions<I>(definitions: I) -> Self
    where
        I: IntoIterator<Item = HierarchyDefinition>,
    {
        let mut catalog = Self::default();
        for definition in definitions {
            catalog.insert(definition);
        }
        catalog
    }

    fn insert(&mut self, definition: HierarchyDefinition) {
        if let Some(existing) = self
            .definitions
            .iter_mut()
            .find(|d| d.name == definition.name)
        {
            log::debug!(
                "Hierarchy '{}' redefined: {:?} -> {:?}",
                definition.name,
                existing.levels,
                definition.levels
            );
            *existing = definition;
        } else {
            self.definitions.push(definition);
        }
    }

    /// `block` extends the `block_group` chain; `all_counties` covers a
    /// bare county level when nothing else does.
    fn derive_composites(&mut self) {
        if let Some(block_group) = self.get(BLOCK_GROUP) {
            let mut levels = block_group.levels.clone();
            levels.push(BLOCK.to_string());
            self.insert(HierarchyDefinition::new(BLOCK, levels));
        }

        let county_only = BTreeSet::from([COUNTY]);
        if !self.definitions.iter().any(|d| d.matches(&county_only)) {
            self.insert(HierarchyDefinition::new(ALL_COUNTIES, [COUNTY]));
        }
    }

    /// Selects the single definition whose level set equals `levels`.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::NoMatchingHierarchy`] if no definition matches
    /// and [`GeoError::AmbiguousHierarchy`] if more than one does.
    pub fn match_levels<'a, I>(&self, levels: I) -> Result<&HierarchyDefinition, GeoError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let wanted: BTreeSet<&str> = levels.into_iter().collect();
        let matched: Vec<&HierarchyDefinition> = self
            .definitions
            .iter()
            .filter(|d| d.matches(&wanted))
            .collect();

        match matched.as_slice() {
            [definition] => Ok(*definition),
            [] => Err(GeoError::NoMatchingHierarchy {
                levels: wanted.iter().map(ToString::to_string).collect(),
            }),
            many => Err(GeoError::AmbiguousHierarchy {
                levels: wanted.iter().map(ToString::to_string).collect(),
                candidates: many.iter().map(|d| d.name.clone()).collect(),
            }),
        }
    }

    /// Looks up a definition by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&HierarchyDefinition> {
        self.definitions.iter().find(|d| d.name == name)
    }

    /// All definitions, in load order.
    #[must_use]
    pub fn definitions(&self) -> &[HierarchyDefinition] {
        &self.definitions
    }

    /// Number of definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether the catalog has no definitions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// Splits `State-County-Census Tract` into
/// `["state", "county", "census_tract"]`.
fn parse_level_chain(raw: &str) -> Option<Vec<String>> {
    let levels: Vec<String> = raw
        .split('-')
        .map(|level| level.trim().to_lowercase().replace(' ', "_"))
        .filter(|level| !level.is_empty())
        .collect();

    (!levels.is_empty()).then_some(levels)
}
