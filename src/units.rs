//! Unit abbreviation table.
//!
//! Maps abbreviated unit spellings (and their dotted forms) to the full unit
//! word. Lookups are case-insensitive; a miss is never an error.

use std::collections::{BTreeMap, HashMap};

use lazy_static::lazy_static;
use tracing::warn;

const BUILTIN_ABBREVIATIONS: &[(&str, &str)] = &[
    ("tsp", "teaspoon"),
    ("tsp.", "teaspoon"),
    ("tbsp", "tablespoon"),
    ("tbsp.", "tablespoon"),
    ("tbs", "tablespoon"),
    ("tbs.", "tablespoon"),
    ("tbl", "tablespoon"),
    ("tbl.", "tablespoon"),
    ("oz", "ounce"),
    ("oz.", "ounce"),
    ("lb", "pound"),
    ("lb.", "pound"),
    ("lbs", "pound"),
    ("lbs.", "pound"),
    ("ml", "milliliter"),
    ("ml.", "milliliter"),
    ("g", "gram"),
    ("g.", "gram"),
    ("gr", "gram"),
    ("gr.", "gram"),
];

lazy_static! {
    static ref DEFAULT_TABLE: AbbreviationTable = AbbreviationTable::builtin();
}

/// Shared built-in table, for callers without a run configuration.
pub fn default_table() -> &'static AbbreviationTable {
    &DEFAULT_TABLE
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbbreviationTable {
    entries: HashMap<String, String>,
}

impl Default for AbbreviationTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl AbbreviationTable {
    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN_ABBREVIATIONS
                .iter()
                .map(|(abbr, full)| (abbr.to_string(), full.to_string()))
                .collect(),
        }
    }

    /// Built-in table plus `extra`, where `extra` wins on conflicts.
    pub fn with_overrides(extra: &BTreeMap<String, String>) -> Self {
        let mut table = Self::builtin();
        for (abbr, full) in extra {
            let key = abbr.to_lowercase();
            if let Some(builtin) = table.entries.insert(key.clone(), full.clone()) {
                if builtin != *full {
                    warn!(
                        abbreviation = %key,
                        %builtin,
                        replacement = %full,
                        "overriding built-in abbreviation"
                    );
                }
            }
        }
        table
    }

    pub fn lookup(&self, text: &str) -> Option<&str> {
        self.entries.get(&text.to_lowercase()).map(String::as_str)
    }

    pub fn is_unit_keyword(&self, text: &str) -> bool {
        self.lookup(text).is_some()
    }

    /// Full-word expansion of `text`, or `text` itself on a miss.
    pub fn expand<'a>(&'a self, text: &'a str) -> &'a str {
        self.lookup(text).unwrap_or(text)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
