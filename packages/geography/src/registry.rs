//! Bidirectional name <-> FIPS code lookups for states and counties.
//!
//! Built from the Census Bureau "all geocodes" sheet for one reference
//! year (exported to CSV). State entries are keyed by name; county entries
//! by `(state code, county name)`. Codes map to themselves, so callers may
//! pass either a name or an already-resolved code.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use census_query_geography_models::{COUNTY, STATE, SummaryLevel, fips};

use crate::GeoError;

const SUMMARY_LEVEL_COLUMN: &str = "Summary Level";
const STATE_CODE_COLUMN: &str = "State Code (FIPS)";
const COUNTY_CODE_COLUMN: &str = "County Code (FIPS)";
const AREA_NAME_COLUMN: &str = "Area Name (including legal/statistical area description)";

/// One state or county row of the reference sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceEntry {
    /// Whether this row describes a state or a county.
    pub summary_level: SummaryLevel,
    /// Two-digit state FIPS code.
    pub state_code: String,
    /// Three-digit county FIPS code (`"000"` for states).
    pub county_code: String,
    /// Area name (e.g. "Colorado", "Jefferson County").
    pub name: String,
}

impl ReferenceEntry {
    /// Creates a state row.
    #[must_use]
    pub fn state(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            summary_level: SummaryLevel::State,
            state_code: code.into(),
            county_code: "000".to_string(),
            name: name.into(),
        }
    }

    /// Creates a county row.
    #[must_use]
    pub fn county(
        state_code: impl Into<String>,
        county_code: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            summary_level: SummaryLevel::County,
            state_code: state_code.into(),
            county_code: county_code.into(),
            name: name.into(),
        }
    }
}

/// Column positions located in the sheet's header row.
#[derive(Debug, Clone, Copy)]
struct SheetColumns {
    summary_level: usize,
    state_code: usize,
    county_code: usize,
    area_name: usize,
}

impl SheetColumns {
    fn from_header(header: &csv::StringRecord) -> Result<Self, GeoError> {
        let find = |column: &str| {
            header
                .iter()
                .position(|h| h.trim() == column)
                .ok_or_else(|| GeoError::MissingColumn {
                    column: column.to_string(),
                })
        };

        Ok(Self {
            summary_level: find(SUMMARY_LEVEL_COLUMN)?,
            state_code: find(STATE_CODE_COLUMN)?,
            county_code: find(COUNTY_CODE_COLUMN)?,
            area_name: find(AREA_NAME_COLUMN)?,
        })
    }
}

/// State and county code lookups for a single reference year.
#[derive(Debug, Clone, Default)]
pub struct CodeRegistry {
    year: u16,
    /// State name -> code.
    state_codes: BTreeMap<String, String>,
    /// State code -> name.
    state_names: BTreeMap<String, String>,
    /// `(state code, county name)` -> county code.
    county_codes: BTreeMap<(String, String), String>,
    /// `(state code, county code)` -> county name.
    county_names: BTreeMap<(String, String), String>,
}

impl CodeRegistry {
    /// Builds a registry from in-memory reference rows.
    ///
    /// When two rows share a name within the same scope, the later row
    /// wins.
    #[must_use]
    pub fn from_entries<I>(year: u16, entries: I) -> Self
    where
        I: IntoIterator<Item = ReferenceEntry>,
    {
        let mut registry = Self {
            year,
            ..Self::default()
        };

        for entry in entries {
            registry.insert(entry);
        }

        log::info!(
            "Loaded {} states and {} counties for reference year {year}",
            registry.state_names.len(),
            registry.county_names.len()
        );

        registry
    }

    /// Builds a states-only registry from the built-in FIPS table.
    #[must_use]
    pub fn builtin_states(year: u16) -> Self {
        Self::from_entries(
            year,
            fips::STATES
                .iter()
                .map(|(code, name)| ReferenceEntry::state(*code, *name)),
        )
    }

    /// Loads a registry from the geocode sheet in CSV form.
    ///
    /// Any preamble lines before the header row (the row whose first cell
    /// is `Summary Level`) are skipped, as are rows at summary levels
    /// other than state and county.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError`] if the CSV is malformed or the header row or
    /// one of its required columns is missing.
    pub fn from_csv_reader<R: Read>(year: u16, reader: R) -> Result<Self, GeoError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut columns: Option<SheetColumns> = None;
        let mut entries = Vec::new();
        let mut skipped = 0u64;

        for result in reader.records() {
            let record = result?;

            let Some(cols) = columns else {
                if record.get(0).map(str::trim) == Some(SUMMARY_LEVEL_COLUMN) {
                    columns = Some(SheetColumns::from_header(&record)?);
                }
                continue;
            };

            let cell = |i: usize| record.get(i).unwrap_or("").trim().to_string();

            let Ok(summary_level) = cell(cols.summary_level).parse::<SummaryLevel>() else {
                skipped += 1;
                continue;
            };

            entries.push(ReferenceEntry {
                summary_level,
                state_code: cell(cols.state_code),
                county_code: cell(cols.county_code),
                name: cell(cols.area_name),
            });
        }

        if columns.is_none() {
            return Err(GeoError::MissingColumn {
                column: SUMMARY_LEVEL_COLUMN.to_string(),
            });
        }

        log::debug!("Skipped {skipped} geocode rows at other summary levels");

        Ok(Self::from_entries(year, entries))
    }

    /// Loads a registry from a geocode sheet CSV file on disk.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError`] if the file cannot be read or parsed.
    pub fn from_csv_path(year: u16, path: &Path) -> Result<Self, GeoError> {
        log::info!("Loading geocode sheet from {}", path.display());
        let file = File::open(path)?;
        Self::from_csv_reader(year, file)
    }

    fn insert(&mut self, entry: ReferenceEntry) {
        match entry.summary_level {
            SummaryLevel::State => {
                if let Some(previous) = self
                    .state_codes
                    .insert(entry.name.clone(), entry.state_code.clone())
                    && previous != entry.state_code
                {
                    log::warn!(
                        "State '{}' listed with codes {previous} and {}; keeping {}",
                        entry.name,
                        entry.state_code,
                        entry.state_code
                    );
                }
                self.state_names.insert(entry.state_code, entry.name);
            }
            SummaryLevel::County => {
                if let Some(previous) = self.county_codes.insert(
                    (entry.state_code.clone(), entry.name.clone()),
                    entry.county_code.clone(),
                ) && previous != entry.county_code
                {
                    log::warn!(
                        "County '{}' in state {} listed with codes {previous} and {}; keeping {}",
                        entry.name,
                        entry.state_code,
                        entry.county_code,
                        entry.county_code
                    );
                }
                self.county_names
                    .insert((entry.state_code, entry.county_code), entry.name);
            }
        }
    }

    /// Reference year this registry was loaded for.
    #[must_use]
    pub const fn year(&self) -> u16 {
        self.year
    }

    /// Resolves a state name, or passes through a known state code.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::UnknownGeography`] if the input is neither a
    /// known state name nor a known state code.
    pub fn resolve_state(&self, name_or_code: &str) -> Result<&str, GeoError> {
        if let Some(code) = self.state_codes.get(name_or_code) {
            return Ok(code.as_str());
        }

        self.state_names
            .get_key_value(name_or_code)
            .map(|(code, _)| code.as_str())
            .ok_or_else(|| self.unknown(STATE, name_or_code))
    }

    /// Resolves a county name within a state, or passes through a known
    /// county code for that state.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::UnknownGeography`] if the input is neither a
    /// county name nor a county code known for `state_code`.
    pub fn resolve_county(&self, state_code: &str, name_or_code: &str) -> Result<&str, GeoError> {
        let key = (state_code.to_string(), name_or_code.to_string());

        if let Some(code) = self.county_codes.get(&key) {
            return Ok(code.as_str());
        }

        self.county_names
            .get_key_value(&key)
            .map(|((_, code), _)| code.as_str())
            .ok_or_else(|| self.unknown(COUNTY, name_or_code))
    }

    /// Returns the name of a state code.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::UnknownGeography`] if the code is not loaded.
    pub fn name_for_state(&self, code: &str) -> Result<&str, GeoError> {
        self.state_names
            .get(code)
            .map(String::as_str)
            .ok_or_else(|| self.unknown(STATE, code))
    }

    /// Returns the name of a county code within a state.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::UnknownGeography`] if the pair is not loaded.
    pub fn name_for_county(&self, state_code: &str, code: &str) -> Result<&str, GeoError> {
        self.county_names
            .get(&(state_code.to_string(), code.to_string()))
            .map(String::as_str)
            .ok_or_else(|| self.unknown(COUNTY, code))
    }

    /// All `(code, name)` state pairs, ordered by code.
    pub fn states(&self) -> impl Iterator<Item = (&str, &str)> {
        self.state_names
            .iter()
            .map(|(code, name)| (code.as_str(), name.as_str()))
    }

    /// All `(county code, name)` pairs within a state, ordered by code.
    pub fn counties<'a>(&'a self, state_code: &'a str) -> impl Iterator<Item = (&'a str, &'a str)> {
        self.county_names
            .iter()
            .filter(move |((state, _), _)| state == state_code)
            .map(|((_, code), name)| (code.as_str(), name.as_str()))
    }

    fn unknown(&self, level: &str, value: &str) -> GeoError {
        GeoError::UnknownGeography {
            level: level.to_string(),
            value: value.to_string(),
            year: self.year,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHEET: &str = "\
Table 1. Annual Estimates,,,,,,
Geographic Codes,,,,,,
,,,,,,
Source: U.S. Census Bureau,,,,,,
Summary Level,State Code (FIPS),County Code (FIPS),County Subdivision Code (FIPS),Place Code (FIPS),Consolidtated City Code (FIPS),Area Name (including legal/statistical area description)
010,00,000,00000,00000,00000,United States
040,08,000,00000,00000,00000,Colorado
050,08,001,00000,00000,00000,Adams County
050,08,059,00000,00000,00000,Jefferson County
061,08,059,91007,00000,00000,Golden CCD
040,29,000,00000,00000,00000,Missouri
050,29,099,00000,00000,00000,Jefferson County
";

    fn registry() -> CodeRegistry {
        CodeRegistry::from_csv_reader(2018, SHEET.as_bytes()).unwrap()
    }

    #[test]
    fn loads_states_and_counties_from_sheet() {
        let registry = registry();
        assert_eq!(registry.year(), 2018);
        assert_eq!(
            registry.states().collect::<Vec<_>>(),
            vec![("08", "Colorado"), ("29", "Missouri")]
        );
        assert_eq!(
            registry.counties("08").collect::<Vec<_>>(),
            vec![("001", "Adams County"), ("059", "Jefferson County")]
        );
    }

    #[test]
    fn resolves_names_to_codes() {
        let registry = registry();
        assert_eq!(registry.resolve_state("Colorado").unwrap(), "08");
        assert_eq!(
            registry.resolve_county("08", "Jefferson County").unwrap(),
            "059"
        );
        assert_eq!(
            registry.resolve_county("29", "Jefferson County").unwrap(),
            "099"
        );
    }

    #[test]
    fn codes_are_fixed_points() {
        let registry = registry();
        for (code, name) in registry.states().collect::<Vec<_>>() {
            assert_eq!(registry.resolve_state(code).unwrap(), code);
            assert_eq!(registry.resolve_state(name).unwrap(), code);
            for (county, county_name) in registry.counties(code) {
                assert_eq!(registry.resolve_county(code, county).unwrap(), county);
                assert_eq!(registry.resolve_county(code, county_name).unwrap(), county);
            }
        }
    }

    #[test]
    fn county_codes_are_scoped_to_state() {
        let registry = registry();
        assert!(registry.resolve_county("29", "059").is_err());
    }

    #[test]
    fn unknown_names_fail() {
        let registry = registry();
        let err = registry.resolve_state("Atlantis").unwrap_err();
        assert!(matches!(
            err,
            GeoError::UnknownGeography { ref level, ref value, year: 2018 }
                if level == "state" && value == "Atlantis"
        ));
        assert!(matches!(
            registry.resolve_county("08", "Golden CCD"),
            Err(GeoError::UnknownGeography { .. })
        ));
    }

    #[test]
    fn reverse_lookups() {
        let registry = registry();
        assert_eq!(registry.name_for_state("08").unwrap(), "Colorado");
        assert_eq!(
            registry.name_for_county("08", "059").unwrap(),
            "Jefferson County"
        );
        assert!(registry.name_for_state("99").is_err());
        assert!(registry.name_for_county("08", "999").is_err());
    }

    #[test]
    fn missing_header_row_is_an_error() {
        let result = CodeRegistry::from_csv_reader(2018, "040,08,000,Colorado\n".as_bytes());
        assert!(matches!(result, Err(GeoError::MissingColumn { .. })));
    }

    #[test]
    fn missing_name_column_is_an_error() {
        let sheet = "Summary Level,State Code (FIPS),County Code (FIPS)\n040,08,000\n";
        let result = CodeRegistry::from_csv_reader(2018, sheet.as_bytes());
        assert!(matches!(
            result,
            Err(GeoError::MissingColumn { ref column }) if column == AREA_NAME_COLUMN
        ));
    }

    #[test]
    fn builtin_states_cover_fips_table() {
        let registry = CodeRegistry::builtin_states(2018);
        assert_eq!(registry.states().count(), fips::STATES.len());
        assert_eq!(registry.resolve_state("Colorado").unwrap(), "08");
        assert_eq!(registry.counties("08").count(), 0);
    }

    #[test]
    fn later_entries_win() {
        let registry = CodeRegistry::from_entries(
            2018,
            [
                ReferenceEntry::county("08", "059", "Jefferson County"),
                ReferenceEntry::county("08", "060", "Jefferson County"),
            ],
        );
        assert_eq!(
            registry.resolve_county("08", "Jefferson County").unwrap(),
            "060"
        );
    }
}
