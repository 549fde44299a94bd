//! CLI configuration.
//!
//! Settings come from three layers: command-line flags, an optional TOML
//! file passed with `--config`, and built-in defaults, in that order of
//! precedence. The API key is read from the file or from
//! `CENSUS_API_KEY`, the environment winning.

use std::path::{Path, PathBuf};

use census_query_client::ClientConfig;
use census_query_models::LabelMode;
use census_query_table_models::Survey;
use clap::Args;
use serde::Deserialize;

use crate::args::parse_survey;

/// Survey used when none is configured.
pub const DEFAULT_SURVEY: Survey = Survey::Acs5;
/// Survey year used when none is configured.
pub const DEFAULT_YEAR: u16 = 2018;

/// Contents of the optional TOML config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// Survey product (`acs5`, ...).
    pub survey: Option<Survey>,
    /// Survey year.
    pub year: Option<u16>,
    /// Data service base URL.
    pub base_url: Option<String>,
    /// Data service API key.
    pub api_key: Option<String>,
    /// Geocode sheet (CSV) path.
    pub geocodes: Option<PathBuf>,
    /// Hierarchy reference (CSV) path.
    pub hierarchies: Option<PathBuf>,
    /// Offline `groups/<table>.json` metadata files.
    pub metadata: Vec<PathBuf>,
    /// Output label mode.
    pub label_mode: Option<LabelMode>,
}

impl CliConfig {
    /// Parses a config file's contents.
    ///
    /// # Errors
    ///
    /// Returns [`toml::de::Error`] if the TOML is malformed or has unknown
    /// keys.
    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Reads and parses a config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        log::info!("Loading config from {}", path.display());
        let contents = std::fs::read_to_string(path)?;
        Ok(Self::from_toml_str(&contents)?)
    }
}

/// Flags selecting the survey and reference data.
#[derive(Debug, Clone, Default, Args)]
pub struct SourceArgs {
    /// Survey product (acs1, acs3, acs5, acsse, sf1)
    #[arg(long, value_parser = parse_survey)]
    pub survey: Option<Survey>,
    /// Survey year
    #[arg(long)]
    pub year: Option<u16>,
    /// Data service base URL
    #[arg(long)]
    pub base_url: Option<String>,
    /// All-geocodes sheet exported to CSV (enables county names)
    #[arg(long)]
    pub geocodes: Option<PathBuf>,
    /// Hierarchy reference CSV (defaults to the built-in list)
    #[arg(long)]
    pub hierarchies: Option<PathBuf>,
    /// Offline `groups/<table>.json` metadata file (repeatable); skips the
    /// metadata download
    #[arg(long)]
    pub metadata: Vec<PathBuf>,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Survey product.
    pub survey: Survey,
    /// Survey year; also the geocode reference year.
    pub year: u16,
    /// Data service endpoint and key.
    pub client: ClientConfig,
    /// Geocode sheet path, if any.
    pub geocodes: Option<PathBuf>,
    /// Hierarchy reference path, if any.
    pub hierarchies: Option<PathBuf>,
    /// Offline metadata files.
    pub metadata: Vec<PathBuf>,
    /// Output label mode.
    pub label_mode: LabelMode,
}

impl Settings {
    /// Layers flags over the config file over defaults.
    #[must_use]
    pub fn resolve(
        config: CliConfig,
        args: &SourceArgs,
        label_mode: Option<LabelMode>,
        env_api_key: Option<String>,
    ) -> Self {
        let defaults = ClientConfig::default();

        Self {
            survey: args.survey.or(config.survey).unwrap_or(DEFAULT_SURVEY),
            year: args.year.or(config.year).unwrap_or(DEFAULT_YEAR),
            client: ClientConfig {
                base_url: args
                    .base_url
                    .clone()
                    .or(config.base_url)
                    .unwrap_or(defaults.base_url),
                api_key: env_api_key.filter(|k| !k.is_empty()).or(config.api_key),
            },
            geocodes: args.geocodes.clone().or(config.geocodes),
            hierarchies: args.hierarchies.clone().or(config.hierarchies),
            metadata: if args.metadata.is_empty() {
                config.metadata
            } else {
                args.metadata.clone()
            },
            label_mode: label_mode.or(config.label_mode).unwrap_or_default(),
        }
    }

    /// Settings from an optional config file, flags, and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be loaded.
    pub fn load(
        config_path: Option<&Path>,
        args: &SourceArgs,
        label_mode: Option<LabelMode>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let config = match config_path {
            Some(path) => CliConfig::load(path)?,
            None => CliConfig::default(),
        };
        let env_api_key = std::env::var(census_query_client::API_KEY_ENV).ok();
        Ok(Self::resolve(config, args, label_mode, env_api_key))
    }
}

#[cfg(test)]
mod tests {
    use census_query_client::DEFAULT_BASE_URL;

    use super::*;

    const CONFIG: &str = r#"
survey = "acs1"
year = 2019
api_key = "from-file"
geocodes = "all-geocodes-v2019.csv"
metadata = ["B01003.json"]
label_mode = "header-row"
"#;

    #[test]
    fn defaults_apply_without_config_or_flags() {
        let settings = Settings::resolve(CliConfig::default(), &SourceArgs::default(), None, None);

        assert_eq!(settings.survey, Survey::Acs5);
        assert_eq!(settings.year, 2018);
        assert_eq!(settings.client.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.client.api_key, None);
        assert_eq!(settings.label_mode, LabelMode::Rename);
        assert!(settings.metadata.is_empty());
    }

    #[test]
    fn config_file_overrides_defaults() {
        let config = CliConfig::from_toml_str(CONFIG).unwrap();
        let settings = Settings::resolve(config, &SourceArgs::default(), None, None);

        assert_eq!(settings.survey, Survey::Acs1);
        assert_eq!(settings.year, 2019);
        assert_eq!(settings.client.api_key.as_deref(), Some("from-file"));
        assert_eq!(
            settings.geocodes,
            Some(PathBuf::from("all-geocodes-v2019.csv"))
        );
        assert_eq!(settings.metadata, vec![PathBuf::from("B01003.json")]);
        assert_eq!(settings.label_mode, LabelMode::HeaderRow);
    }

    #[test]
    fn flags_override_config_file() {
        let config = CliConfig::from_toml_str(CONFIG).unwrap();
        let args = SourceArgs {
            survey: Some(Survey::Acs5),
            year: Some(2017),
            metadata: vec![PathBuf::from("B19013.json")],
            ..SourceArgs::default()
        };
        let settings = Settings::resolve(
            config,
            &args,
            Some(LabelMode::Rename),
            Some("from-env".to_string()),
        );

        assert_eq!(settings.survey, Survey::Acs5);
        assert_eq!(settings.year, 2017);
        assert_eq!(settings.metadata, vec![PathBuf::from("B19013.json")]);
        assert_eq!(settings.label_mode, LabelMode::Rename);
        assert_eq!(settings.client.api_key.as_deref(), Some("from-env"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(CliConfig::from_toml_str("surveys = \"acs5\"").is_err());
    }
}
