//! Built-in state FIPS table.
//!
//! Covers the 50 US states, DC, and Puerto Rico as they appear in the
//! Census Bureau geocode sheets. Used to seed a states-only code registry
//! when no reference sheet is available.

/// `(FIPS code, area name)` for every state-level entity, ordered by code.
pub const STATES: &[(&str, &str)] = &[
    ("01", "Alabama"),
    ("02", "Alaska"),
    ("04", "Arizona"),
    ("05", "Arkansas"),
    ("06", "California"),
    ("08", "Colorado"),
    ("09", "Connecticut"),
    ("10", "Delaware"),
    ("11", "District of Columbia"),
    ("12", "Florida"),
    ("13", "Georgia"),
    ("15", "Hawaii"),
    ("16", "Idaho"),
    ("17", "Illinois"),
    ("18", "Indiana"),
    ("19", "Iowa"),
    ("20", "Kansas"),
    ("21", "Kentucky"),
    ("22", "Louisiana"),
    ("23", "Maine"),
    ("24", "Maryland"),
    ("25", "Massachusetts"),
    ("26", "Michigan"),
    ("27", "Minnesota"),
    ("28", "Mississippi"),
    ("29", "Missouri"),
    ("30", "Montana"),
    ("31", "Nebraska"),
    ("32", "Nevada"),
    ("33", "New Hampshire"),
    ("34", "New Jersey"),
    ("35", "New Mexico"),
    ("36", "New York"),
    ("37", "North Carolina"),
    ("38", "North Dakota"),
    ("39", "Ohio"),
    ("40", "Oklahoma"),
    ("41", "Oregon"),
    ("42", "Pennsylvania"),
    ("44", "Rhode Island"),
    ("45", "South Carolina"),
    ("46", "South Dakota"),
    ("47", "Tennessee"),
    ("48", "Texas"),
    ("49", "Utah"),
    ("50", "Vermont"),
    ("51", "Virginia"),
    ("53", "Washington"),
    ("54", "West Virginia"),
    ("55", "Wisconsin"),
    ("56", "Wyoming"),
    ("72", "Puerto Rico"),
];

/// Maps a two-digit FIPS code to the state name.
#[must_use]
pub fn state_name(code: &str) -> Option<&'static str> {
    STATES
        .iter()
        .find_map(|(fips, name)| (*fips == code).then_some(*name))
}

/// Maps an exact state name to its two-digit FIPS code.
#[must_use]
pub fn state_code(name: &str) -> Option<&'static str> {
    STATES
        .iter()
        .find_map(|(fips, state)| (*state == name).then_some(*fips))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_count() {
        assert_eq!(STATES.len(), 52);
    }

    #[test]
    fn codes_are_sorted_and_unique() {
        for pair in STATES.windows(2) {
            assert!(pair[0].0 < pair[1].0, "{} !< {}", pair[0].0, pair[1].0);
        }
    }

    #[test]
    fn name_roundtrip() {
        for (code, name) in STATES {
            assert_eq!(state_code(name), Some(*code), "roundtrip failed for {name}");
            assert_eq!(state_name(code), Some(*name), "roundtrip failed for {code}");
        }
    }

    #[test]
    fn unknown_entries() {
        assert_eq!(state_name("99"), None);
        assert_eq!(state_code("Atlantis"), None);
        assert_eq!(state_code("colorado"), None);
    }
}
