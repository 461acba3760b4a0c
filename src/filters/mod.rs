//! Noise filters applied to each phrase after label normalization.
//!
//! Every filter takes an owned phrase and returns the phrase to keep (possibly
//! with rows rewritten, relabeled or removed) or `None` to drop it. Filters
//! never reorder rows or move them between phrases. The chain order matters:
//! later filters assume the earlier ones already ran.

mod structure;
mod text;

use std::sync::Arc;

pub use structure::{
    AlternativeComment, AmbiguousHyphenDigit, BracketSpans, HyphenatedQuantity, NameGuard,
};
pub use text::{
    AbbreviationExpansion, HyphenToSpace, PeriodReclass, QuantitySymbolStrip, TokenExplosion,
    UnitKeywordRelabel, UrlRemoval,
};

use crate::config::FilterConfig;
use crate::token::{Phrase, TokenRow};
use crate::units::AbbreviationTable;

pub const FILTER_URL: &str = "url_removal";
pub const FILTER_QTY_SYMBOL: &str = "quantity_symbol";
pub const FILTER_HYPHEN_QTY: &str = "hyphenated_quantity";
pub const FILTER_BRACKETS: &str = "bracket_spans";
pub const FILTER_OR: &str = "alternative_comment";
pub const FILTER_HYPHEN_DIGIT: &str = "ambiguous_hyphen_digit";
pub const FILTER_HYPHEN_SPACE: &str = "hyphen_to_space";
pub const FILTER_EXPLODE: &str = "token_explosion";
pub const FILTER_PERIOD: &str = "period_reclass";
pub const FILTER_UNIT_KEYWORD: &str = "unit_keyword";
pub const FILTER_ABBREVIATION: &str = "abbreviation_expansion";
pub const FILTER_NAME_GUARD: &str = "name_guard";

/// A phrase-level transform in the cleaning chain.
pub trait PhraseFilter: Send + Sync {
    /// Stable stage name used in reports and logs.
    fn name(&self) -> &'static str;

    fn apply(&self, phrase: Phrase) -> Option<Phrase>;
}

/// Rebuild a phrase from a per-row transform. A phrase left without rows is
/// dropped.
pub(crate) fn filter_map_rows<F>(phrase: Phrase, f: F) -> Option<Phrase>
where
    F: FnMut(TokenRow) -> Option<TokenRow>,
{
    let Phrase { id, rows } = phrase;
    let rows: Vec<TokenRow> = rows.into_iter().filter_map(f).collect();
    if rows.is_empty() {
        None
    } else {
        Some(Phrase { id, rows })
    }
}

/// The standard chain, in the order it must run.
pub fn standard_chain(config: &FilterConfig) -> Vec<Box<dyn PhraseFilter>> {
    let table = Arc::new(AbbreviationTable::with_overrides(&config.abbreviations));
    vec![
        Box::new(UrlRemoval::new(config.url_markers.clone())),
        Box::new(QuantitySymbolStrip::new(config.quantity_symbol)),
        Box::new(HyphenatedQuantity),
        Box::new(BracketSpans::new(config.brackets.clone())),
        Box::new(AlternativeComment::new(config.alternative_marker.clone())),
        Box::new(AmbiguousHyphenDigit),
        Box::new(HyphenToSpace),
        Box::new(TokenExplosion),
        Box::new(PeriodReclass),
        Box::new(UnitKeywordRelabel::new(Arc::clone(&table))),
        Box::new(AbbreviationExpansion::new(table)),
        Box::new(NameGuard),
    ]
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_chain_order() {
        let names: Vec<&str> = standard_chain(&FilterConfig::default())
            .iter()
            .map(|f| f.name())
            .collect();
        assert_eq!(
            names,
            vec![
                FILTER_URL,
                FILTER_QTY_SYMBOL,
                FILTER_HYPHEN_QTY,
                FILTER_BRACKETS,
                FILTER_OR,
                FILTER_HYPHEN_DIGIT,
                FILTER_HYPHEN_SPACE,
                FILTER_EXPLODE,
                FILTER_PERIOD,
                FILTER_UNIT_KEYWORD,
                FILTER_ABBREVIATION,
                FILTER_NAME_GUARD,
            ]
        );
    }
}
