//! Label normalization.
//!
//! Raw labels come from a BIO-style export (`B-NAME`, `I-QTY`) and may use the
//! legacy `INDEX` category. Both rewrites are pure functions of one label.

use crate::config::LabelConfig;
use crate::error::{CleanError, Result};
use crate::token::{Label, Phrase, RawPhrase, RawRow, TokenRow};

/// Remove boundary-tag prefixes (`X-`). Repeats until none is left.
pub fn strip_scheme_prefix(label: &str) -> &str {
    let mut rest = label;
    loop {
        let mut chars = rest.chars();
        match (chars.next(), chars.next()) {
            (Some(_), Some('-')) => rest = chars.as_str(),
            _ => return rest,
        }
    }
}

/// Fold the legacy index category into `QTY`.
pub fn fold_legacy_label<'a>(label: &'a str, legacy: &str) -> &'a str {
    if label == legacy {
        Label::Qty.as_str()
    } else {
        label
    }
}

#[derive(Debug, Clone)]
pub struct LabelNormalizer {
    legacy_index_label: String,
}

impl Default for LabelNormalizer {
    fn default() -> Self {
        Self::new(&LabelConfig::default())
    }
}

impl LabelNormalizer {
    pub fn new(config: &LabelConfig) -> Self {
        Self {
            legacy_index_label: config.legacy_index_label.clone(),
        }
    }

    pub fn normalize_str<'a>(&self, label: &'a str) -> &'a str {
        fold_legacy_label(strip_scheme_prefix(label), &self.legacy_index_label)
    }

    pub fn normalize(&self, label: &str) -> Option<Label> {
        Label::parse(self.normalize_str(label))
    }

    fn normalize_row(&self, row: RawRow) -> Result<TokenRow> {
        let label = self
            .normalize(&row.label)
            .ok_or_else(|| CleanError::UnknownLabel {
                line: row.line,
                label: row.label.clone(),
            })?;
        Ok(TokenRow {
            line: row.line,
            text: row.text,
            position_marker: row.position_marker,
            features: row.features,
            label,
        })
    }

    pub fn normalize_phrase(&self, phrase: RawPhrase) -> Result<Phrase> {
        let rows = phrase
            .rows
            .into_iter()
            .map(|row| self.normalize_row(row))
            .collect::<Result<Vec<_>>>()?;
        Ok(Phrase::new(phrase.id, rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_prefix() {
        assert_eq!(strip_scheme_prefix("B-NAME"), "NAME");
        assert_eq!(strip_scheme_prefix("I-QTY"), "QTY");
        assert_eq!(strip_scheme_prefix("NAME"), "NAME");
        assert_eq!(strip_scheme_prefix("-"), "-");
        assert_eq!(strip_scheme_prefix(""), "");
    }

    #[test]
    fn test_index_folds_to_qty() {
        let n = LabelNormalizer::default();
        assert_eq!(n.normalize("B-INDEX"), Some(Label::Qty));
        assert_eq!(n.normalize("INDEX"), Some(Label::Qty));
        assert_eq!(n.normalize("I-COMMENT"), Some(Label::Comment));
        assert_eq!(n.normalize("B-FOO"), None);
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let n = LabelNormalizer::default();
        for raw in ["B-NAME", "I-INDEX", "INDEX", "OTHER", "B-I-UNIT", "X", "", "QTY"] {
            let once = n.normalize_str(raw);
            let twice = n.normalize_str(once);
            assert_eq!(once, twice, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn test_unknown_label_reports_line() {
        let n = LabelNormalizer::default();
        let phrase = RawPhrase {
            id: "000001".into(),
            rows: vec![RawRow::new(7, "x", "I1", "B-WHAT")],
        };
        let err = n.normalize_phrase(phrase).unwrap_err();
        assert!(matches!(err, CleanError::UnknownLabel { line: 7, .. }));
    }
}
