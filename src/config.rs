//! Run configuration, loaded from an optional TOML file.
//!
//! Every field has a default, so an empty file (or no file at all) gives the
//! standard cleaning run. CLI flags are applied on top of the loaded value.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{CleanError, Result};

/// How phrase identifiers are generated.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum IdScheme {
    /// Zero-padded monotonic counter.
    #[default]
    Counter,
    /// Hex SHA-256 over the phrase ordinal and its token texts.
    Hash,
}

impl FromStr for IdScheme {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "counter" => Ok(IdScheme::Counter),
            "hash" => Ok(IdScheme::Hash),
            other => Err(format!("unknown id scheme '{other}' (expected counter or hash)")),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct CleanConfig {
    pub grouping: GroupingConfig,
    pub labels: LabelConfig,
    pub filters: FilterConfig,
    pub io: IoConfig,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct GroupingConfig {
    /// Regex a position marker must match to open a new phrase.
    pub start_pattern: String,
    pub id_scheme: IdScheme,
    /// Digits used by the counter scheme.
    pub id_width: usize,
    /// Require `I<n>` continuation markers to count up by one.
    pub check_sequence: bool,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            start_pattern: "^I1$".to_string(),
            id_scheme: IdScheme::Counter,
            id_width: 6,
            check_sequence: true,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct LabelConfig {
    /// Legacy category folded into QTY.
    pub legacy_index_label: String,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            legacy_index_label: "INDEX".to_string(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct FilterConfig {
    pub url_markers: Vec<String>,
    pub quantity_symbol: char,
    /// Open/close token pairs handled by the bracket matcher.
    pub brackets: Vec<(String, String)>,
    pub alternative_marker: String,
    /// Extra abbreviation entries; these override the built-in table.
    pub abbreviations: BTreeMap<String, String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            url_markers: vec!["http".to_string(), "www.".to_string()],
            quantity_symbol: '$',
            brackets: vec![("(".to_string(), ")".to_string())],
            alternative_marker: "or".to_string(),
            abbreviations: BTreeMap::new(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct IoConfig {
    pub input_delimiter: char,
    pub output_delimiter: char,
    pub output_header: bool,
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            input_delimiter: '\t',
            output_delimiter: ',',
            output_header: true,
        }
    }
}

impl IoConfig {
    pub fn input_delimiter_byte(&self) -> Result<u8> {
        delimiter_byte(self.input_delimiter)
    }

    pub fn output_delimiter_byte(&self) -> Result<u8> {
        delimiter_byte(self.output_delimiter)
    }
}

fn delimiter_byte(c: char) -> Result<u8> {
    if c.is_ascii() {
        Ok(c as u8)
    } else {
        Err(CleanError::Config(format!(
            "delimiter '{c}' must be a single ASCII character"
        )))
    }
}

impl CleanConfig {
    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.grouping.id_width == 0 || self.grouping.id_width > 20 {
            return Err(CleanError::Config(format!(
                "grouping.id_width must be between 1 and 20, got {}",
                self.grouping.id_width
            )));
        }
        if self.filters.alternative_marker.trim().is_empty() {
            return Err(CleanError::Config(
                "filters.alternative_marker cannot be empty".into(),
            ));
        }
        for (open, close) in &self.filters.brackets {
            if open.is_empty() || close.is_empty() || open == close {
                return Err(CleanError::Config(format!(
                    "invalid bracket pair ['{open}', '{close}']"
                )));
            }
        }
        if self.filters.url_markers.iter().any(|m| m.is_empty()) {
            return Err(CleanError::Config(
                "filters.url_markers cannot contain an empty marker".into(),
            ));
        }
        self.io.input_delimiter_byte()?;
        self.io.output_delimiter_byte()?;
        Ok(())
    }
}

/// Parse and validate a config from TOML text.
pub fn parse_config(contents: &str, path: &Path) -> Result<CleanConfig> {
    let config: CleanConfig =
        toml::from_str(contents).map_err(|source| CleanError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
    config.validate()?;
    Ok(config)
}

pub fn load_config_from_file(path: &Path) -> Result<CleanConfig> {
    let contents = fs::read_to_string(path).map_err(|e| CleanError::io(path, e))?;
    parse_config(&contents, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("", Path::new("empty.toml")).unwrap();
        assert_eq!(config.grouping.start_pattern, "^I1$");
        assert_eq!(config.grouping.id_scheme, IdScheme::Counter);
        assert_eq!(config.filters.quantity_symbol, '$');
        assert_eq!(config.io.input_delimiter, '\t');
    }

    #[test]
    fn test_partial_config_overrides() {
        let toml = r#"
            [grouping]
            id_scheme = "hash"

            [filters]
            brackets = [["(", ")"], ["[", "]"]]

            [filters.abbreviations]
            "c." = "cup"

            [io]
            output_delimiter = "\t"
        "#;
        let config = parse_config(toml, Path::new("cfg.toml")).unwrap();
        assert_eq!(config.grouping.id_scheme, IdScheme::Hash);
        assert_eq!(config.grouping.id_width, 6);
        assert_eq!(config.filters.brackets.len(), 2);
        assert_eq!(config.filters.abbreviations.get("c.").map(String::as_str), Some("cup"));
        assert_eq!(config.io.output_delimiter_byte().unwrap(), b'\t');
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = parse_config("[grouping]\nid_width = 0\n", Path::new("bad.toml")).unwrap_err();
        assert!(matches!(err, CleanError::Config(_)));

        let err = parse_config("[grouping\n", Path::new("broken.toml")).unwrap_err();
        assert!(matches!(err, CleanError::ConfigParse { .. }));
    }

    #[test]
    fn test_id_scheme_from_str() {
        assert_eq!("HASH".parse::<IdScheme>().unwrap(), IdScheme::Hash);
        assert!("uuid".parse::<IdScheme>().is_err());
    }
}
