//! Table alias registry, loaded from embedded TOML.
//!
//! `data/tables.toml` is baked into the binary at compile time via
//! [`include_str!`]. Adding an alias means adding an `[[alias]]` entry
//! there; aliases are matched case-sensitively (`HI` and `med_HI` are
//! distinct).

use serde::Deserialize;

use crate::TableError;

/// Alias definitions embedded at compile time.
const BUILTIN_ALIASES: &str = include_str!("../data/tables.toml");

/// Number of built-in aliases. Enforced by a test.
#[cfg(test)]
const EXPECTED_ALIAS_COUNT: usize = 5;

/// A short semantic name for one base statistical table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TableAlias {
    /// Alias as typed by callers (e.g. `"pop"`).
    pub name: String,
    /// Base table identifier (e.g. `"B01003"`).
    pub table: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
struct AliasFile {
    #[serde(default)]
    default: Vec<String>,
    #[serde(default, rename = "alias")]
    aliases: Vec<TableAlias>,
}

/// Alias -> base table lookups plus the default alias list.
#[derive(Debug, Clone, Default)]
pub struct AliasRegistry {
    aliases: Vec<TableAlias>,
    defaults: Vec<String>,
}

impl AliasRegistry {
    /// Returns the registry parsed from the embedded `tables.toml`.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML is malformed. It is a compile-time
    /// constant, so a failure here is a development error.
    #[must_use]
    pub fn builtin() -> Self {
        Self::from_toml_str(BUILTIN_ALIASES)
            .unwrap_or_else(|e| panic!("Failed to parse built-in tables.toml: {e}"))
    }

    /// Parses alias definitions from TOML.
    ///
    /// An alias defined twice keeps the later table.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::Config`] on malformed TOML and
    /// [`TableError::UnknownTable`] if the `default` list names an alias
    /// that is not defined.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, TableError> {
        let file: AliasFile = toml::de::from_str(toml_str)?;

        let mut registry = Self::default();
        for alias in file.aliases {
            if let Some(existing) = registry.aliases.iter_mut().find(|a| a.name == alias.name) {
                log::warn!(
                    "Table alias '{}' defined twice ({} and {}); keeping {}",
                    alias.name,
                    existing.table,
                    alias.table,
                    alias.table
                );
                *existing = alias;
            } else {
                registry.aliases.push(alias);
            }
        }

        if let Some(unknown) = file.default.iter().find(|name| registry.get(name).is_none()) {
            return Err(TableError::UnknownTable {
                alias: unknown.clone(),
            });
        }
        registry.defaults = file.default;

        Ok(registry)
    }

    /// Looks up an alias.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TableAlias> {
        self.aliases.iter().find(|a| a.name == name)
    }

    /// Returns the base table identifier for an alias.
    #[must_use]
    pub fn base_table(&self, name: &str) -> Option<&str> {
        self.get(name).map(|a| a.table.as_str())
    }

    /// Aliases used when a caller asks for no tables at all.
    #[must_use]
    pub fn defaults(&self) -> &[String] {
        &self.defaults
    }

    /// All aliases, in definition order.
    pub fn iter(&self) -> impl Iterator<Item = &TableAlias> {
        self.aliases.iter()
    }

    /// Number of aliases.
    #[must_use]
    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    /// Whether no aliases are defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}
