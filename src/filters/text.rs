//! Row-scoped filters: each row is rewritten, relabeled or removed on its own.

use std::sync::Arc;

use crate::filters::{
    FILTER_ABBREVIATION, FILTER_EXPLODE, FILTER_HYPHEN_SPACE, FILTER_PERIOD, FILTER_QTY_SYMBOL,
    FILTER_UNIT_KEYWORD, FILTER_URL, PhraseFilter, filter_map_rows,
};
use crate::token::{Label, Phrase, TokenRow};
use crate::units::AbbreviationTable;

/// Removes rows whose text contains a URL marker.
#[derive(Debug, Clone)]
pub struct UrlRemoval {
    markers: Vec<String>,
}

impl UrlRemoval {
    pub fn new(markers: Vec<String>) -> Self {
        Self { markers }
    }

    fn is_url(&self, text: &str) -> bool {
        self.markers.iter().any(|m| text.contains(m.as_str()))
    }
}

impl PhraseFilter for UrlRemoval {
    fn name(&self) -> &'static str {
        FILTER_URL
    }

    fn apply(&self, phrase: Phrase) -> Option<Phrase> {
        filter_map_rows(phrase, |row| (!self.is_url(&row.text)).then_some(row))
    }
}

/// Replaces the upstream quantity marker with a space so the token boundary
/// survives until explosion.
#[derive(Debug, Clone, Copy)]
pub struct QuantitySymbolStrip {
    symbol: char,
}

impl QuantitySymbolStrip {
    pub fn new(symbol: char) -> Self {
        Self { symbol }
    }
}

impl PhraseFilter for QuantitySymbolStrip {
    fn name(&self) -> &'static str {
        FILTER_QTY_SYMBOL
    }

    fn apply(&self, phrase: Phrase) -> Option<Phrase> {
        filter_map_rows(phrase, |mut row| {
            if row.text.contains(self.symbol) {
                row.text = row.text.replace(self.symbol, " ");
            }
            Some(row)
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HyphenToSpace;

impl PhraseFilter for HyphenToSpace {
    fn name(&self) -> &'static str {
        FILTER_HYPHEN_SPACE
    }

    fn apply(&self, phrase: Phrase) -> Option<Phrase> {
        filter_map_rows(phrase, |mut row| {
            if row.text.contains('-') {
                row.text = row.text.replace('-', " ");
            }
            Some(row)
        })
    }
}

/// Splits multi-word text into one row per word. Whitespace-only text
/// produces no rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenExplosion;

impl TokenExplosion {
    fn explode(row: TokenRow) -> Vec<TokenRow> {
        let words: Vec<&str> = row.text.split_whitespace().collect();
        if words.len() == 1 && words[0] == row.text {
            return vec![row];
        }
        words
            .into_iter()
            .map(|word| TokenRow {
                text: word.to_string(),
                ..row.clone()
            })
            .collect()
    }
}

impl PhraseFilter for TokenExplosion {
    fn name(&self) -> &'static str {
        FILTER_EXPLODE
    }

    fn apply(&self, phrase: Phrase) -> Option<Phrase> {
        let Phrase { id, rows } = phrase;
        let rows: Vec<TokenRow> = rows.into_iter().flat_map(Self::explode).collect();
        if rows.is_empty() {
            None
        } else {
            Some(Phrase { id, rows })
        }
    }
}

/// Dotted OTHER tokens become COMMENT; a lone period is always OTHER.
#[derive(Debug, Clone, Copy, Default)]
pub struct PeriodReclass;

impl PhraseFilter for PeriodReclass {
    fn name(&self) -> &'static str {
        FILTER_PERIOD
    }

    fn apply(&self, phrase: Phrase) -> Option<Phrase> {
        filter_map_rows(phrase, |mut row| {
            if row.text == "." {
                row.label = Label::Other;
            } else if row.label == Label::Other && row.text.contains('.') {
                row.label = Label::Comment;
            }
            Some(row)
        })
    }
}

#[derive(Debug, Clone)]
pub struct UnitKeywordRelabel {
    table: Arc<AbbreviationTable>,
}

impl UnitKeywordRelabel {
    pub fn new(table: Arc<AbbreviationTable>) -> Self {
        Self { table }
    }
}

impl PhraseFilter for UnitKeywordRelabel {
    fn name(&self) -> &'static str {
        FILTER_UNIT_KEYWORD
    }

    fn apply(&self, phrase: Phrase) -> Option<Phrase> {
        filter_map_rows(phrase, |mut row| {
            if self.table.is_unit_keyword(&row.text) {
                row.label = Label::Unit;
            }
            Some(row)
        })
    }
}

#[derive(Debug, Clone)]
pub struct AbbreviationExpansion {
    table: Arc<AbbreviationTable>,
}

impl AbbreviationExpansion {
    pub fn new(table: Arc<AbbreviationTable>) -> Self {
        Self { table }
    }
}

impl PhraseFilter for AbbreviationExpansion {
    fn name(&self) -> &'static str {
        FILTER_ABBREVIATION
    }

    fn apply(&self, phrase: Phrase) -> Option<Phrase> {
        filter_map_rows(phrase, |mut row| {
            if let Some(full) = self.table.lookup(&row.text) {
                row.text = full.to_string();
            }
            Some(row)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::test_support::{phrase, texts};
    use crate::token::Label::*;

    #[test]
    fn test_url_rows_removed() {
        let filter = UrlRemoval::new(vec!["http".into(), "www.".into()]);
        let out = filter
            .apply(phrase(&[
                ("salt", Name),
                ("http://example.com/salt", Other),
                ("www.salt.org", Other),
            ]))
            .unwrap();
        assert_eq!(texts(&out), vec!["salt"]);

        let only_url = phrase(&[("https://x.y", Other)]);
        assert!(filter.apply(only_url).is_none());
    }

    #[test]
    fn test_quantity_symbol_becomes_space() {
        let out = QuantitySymbolStrip::new('$')
            .apply(phrase(&[("1$1/2", Qty), ("cups", Unit)]))
            .unwrap();
        assert_eq!(texts(&out), vec!["1 1/2", "cups"]);
    }

    #[test]
    fn test_hyphen_to_space() {
        let out = HyphenToSpace
            .apply(phrase(&[("extra-virgin", Other), ("-", Other)]))
            .unwrap();
        assert_eq!(texts(&out), vec!["extra virgin", " "]);
    }

    #[test]
    fn test_explosion_duplicates_fields() {
        let out = TokenExplosion
            .apply(phrase(&[(" 1 1/2", Qty), ("extra virgin", Other), (" ", Other), ("oil", Name)]))
            .unwrap();
        assert_eq!(texts(&out), vec!["1", "1/2", "extra", "virgin", "oil"]);
        assert_eq!(out.labels(), vec![Qty, Qty, Other, Other, Name]);

        assert!(TokenExplosion.apply(phrase(&[("  ", Other)])).is_none());
    }

    #[test]
    fn test_period_reclass() {
        let out = PeriodReclass
            .apply(phrase(&[
                ("approx.", Other),
                (".", Comment),
                ("tsp.", Unit),
                ("salt", Name),
            ]))
            .unwrap();
        assert_eq!(out.labels(), vec![Comment, Other, Unit, Name]);
    }

    #[test]
    fn test_abbreviation_relabel_and_expand() {
        let table = Arc::new(AbbreviationTable::builtin());
        let relabel = UnitKeywordRelabel::new(Arc::clone(&table));
        let expand = AbbreviationExpansion::new(table);

        let p = phrase(&[("1", Qty), ("tsp.", Comment), ("Salt", Name)]);
        let out = expand.apply(relabel.apply(p).unwrap()).unwrap();
        assert_eq!(texts(&out), vec!["1", "teaspoon", "Salt"]);
        assert_eq!(out.labels(), vec![Qty, Unit, Name]);
    }
}
