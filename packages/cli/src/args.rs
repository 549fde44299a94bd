//! Value parsers for command-line arguments.

use census_query_geography_models::GeoValue;
use census_query_models::LabelMode;
use census_query_table::TableError;
use census_query_table_models::{ColumnLabels, ColumnSpec, Survey, TableRef};

/// Prefix forcing a geography value to be treated as a name.
const NAME_PREFIX: &str = "name:";
/// Prefix forcing a geography value to be treated as a code.
const CODE_PREFIX: &str = "code:";

/// Parses `LEVEL=VALUE`.
///
/// The level is lower-cased with spaces and dashes turned into
/// underscores (`"Census Tract"` -> `census_tract`). The value is `*` for
/// the wildcard, all digits for a code, and a name otherwise; `name:` and
/// `code:` prefixes override that guess.
///
/// # Errors
///
/// Returns a message if either side is missing.
pub fn parse_geo(raw: &str) -> Result<(String, GeoValue), String> {
    let (level, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected LEVEL=VALUE, got '{raw}'"))?;

    let level = level.trim().to_lowercase().replace([' ', '-'], "_");
    if level.is_empty() {
        return Err(format!("missing level in '{raw}'"));
    }

    let value = value.trim();
    let value = if let Some(name) = value.strip_prefix(NAME_PREFIX) {
        GeoValue::name(name.trim())
    } else if let Some(code) = value.strip_prefix(CODE_PREFIX) {
        GeoValue::code(code.trim())
    } else {
        GeoValue::classify(value)
    };

    if value.as_str().is_empty() {
        return Err(format!("missing value for level '{level}'"));
    }

    Ok((level, value))
}

/// Parses a literal `ID=LABEL` column.
///
/// # Errors
///
/// Returns a message if the pair is malformed.
pub fn parse_column(raw: &str) -> Result<ColumnSpec, String> {
    ColumnSpec::parse_pair(raw).ok_or_else(|| {
        TableError::InvalidColumn {
            input: raw.to_string(),
        }
        .to_string()
    })
}

/// Parses a survey name (`acs5`, `sf1`, ...).
///
/// # Errors
///
/// Returns a message naming the unknown survey.
pub fn parse_survey(raw: &str) -> Result<Survey, String> {
    raw.trim()
        .to_lowercase()
        .parse()
        .map_err(|_| format!("unknown survey '{raw}'"))
}

/// Parses a label mode (`rename` or `header-row`).
///
/// # Errors
///
/// Returns a message naming the unknown mode.
pub fn parse_label_mode(raw: &str) -> Result<LabelMode, String> {
    raw.trim()
        .parse()
        .map_err(|_| format!("unknown label mode '{raw}', expected rename or header-row"))
}

/// Builds the table list: aliases in order, then one literal holding every
/// `--column`. With neither, `defaults` are used.
#[must_use]
pub fn table_refs(
    aliases: &[String],
    columns: Vec<ColumnSpec>,
    defaults: &[String],
) -> Vec<TableRef> {
    if aliases.is_empty() && columns.is_empty() {
        log::info!("No tables given; using defaults: {}", defaults.join(", "));
        return defaults.iter().map(|a| TableRef::alias(a.as_str())).collect();
    }

    let mut tables: Vec<TableRef> = aliases.iter().map(|a| TableRef::alias(a.as_str())).collect();
    if !columns.is_empty() {
        tables.push(TableRef::Literal(columns.into_iter().collect::<ColumnLabels>()));
    }
    tables
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_geo_values() {
        assert_eq!(
            parse_geo("state=Colorado").unwrap(),
            ("state".to_string(), GeoValue::name("Colorado"))
        );
        assert_eq!(
            parse_geo("county=059").unwrap(),
            ("county".to_string(), GeoValue::code("059"))
        );
        assert_eq!(
            parse_geo("Block Group=*").unwrap(),
            ("block_group".to_string(), GeoValue::Wildcard)
        );
        assert_eq!(
            parse_geo("census-tract = 011724").unwrap(),
            ("census_tract".to_string(), GeoValue::code("011724"))
        );
    }

    #[test]
    fn prefixes_force_the_variant() {
        assert_eq!(
            parse_geo("place=name:1000 Oaks").unwrap().1,
            GeoValue::name("1000 Oaks")
        );
        assert_eq!(parse_geo("place=name:123").unwrap().1, GeoValue::name("123"));
        assert_eq!(parse_geo("state=code:08").unwrap().1, GeoValue::code("08"));
    }

    #[test]
    fn rejects_malformed_geo() {
        assert!(parse_geo("Colorado").is_err());
        assert!(parse_geo("=Colorado").is_err());
        assert!(parse_geo("state=").is_err());
        assert!(parse_geo("state=name:").is_err());
    }

    #[test]
    fn parses_columns_and_enums() {
        assert_eq!(
            parse_column("B01003_001E=Population").unwrap(),
            ColumnSpec::new("B01003_001E", "Population")
        );
        assert!(parse_column("B01003_001E").is_err());
        assert_eq!(parse_survey("ACS1").unwrap(), Survey::Acs1);
        assert!(parse_survey("acs9").is_err());
        assert_eq!(parse_label_mode("header-row").unwrap(), LabelMode::HeaderRow);
        assert!(parse_label_mode("sideways").is_err());
    }

    #[test]
    fn builds_table_list() {
        let defaults = vec!["pop".to_string(), "age".to_string()];

        assert_eq!(
            table_refs(&[], Vec::new(), &defaults),
            vec![TableRef::alias("pop"), TableRef::alias("age")]
        );

        let tables = table_refs(
            &["HI".to_string()],
            vec![ColumnSpec::new("B01003_001E", "Population")],
            &defaults,
        );
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0], TableRef::alias("HI"));
        assert!(matches!(&tables[1], TableRef::Literal(labels) if labels.len() == 1));
    }
}
