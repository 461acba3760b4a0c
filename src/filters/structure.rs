//! Phrase-scoped filters: each decides on the whole phrase at once.

use crate::filters::{
    FILTER_BRACKETS, FILTER_HYPHEN_DIGIT, FILTER_HYPHEN_QTY, FILTER_NAME_GUARD, FILTER_OR,
    PhraseFilter,
};
use crate::token::{Label, Phrase};

/// Drops phrases whose QTY or UNIT tokens contain a hyphen ("1-pound").
/// A lone "-" is exempt.
#[derive(Debug, Clone, Copy, Default)]
pub struct HyphenatedQuantity;

impl PhraseFilter for HyphenatedQuantity {
    fn name(&self) -> &'static str {
        FILTER_HYPHEN_QTY
    }

    fn apply(&self, phrase: Phrase) -> Option<Phrase> {
        let ambiguous = phrase.rows.iter().any(|row| {
            matches!(row.label, Label::Qty | Label::Unit)
                && row.text.contains('-')
                && row.text != "-"
        });
        if ambiguous { None } else { Some(phrase) }
    }
}

/// Comments out bracketed spans, dropping phrases whose brackets do not
/// balance.
#[derive(Debug, Clone)]
pub struct BracketSpans {
    pairs: Vec<(String, String)>,
}

impl BracketSpans {
    pub fn new(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }

    fn open_kind(&self, text: &str) -> Option<usize> {
        self.pairs.iter().position(|(open, _)| open == text)
    }

    fn close_kind(&self, text: &str) -> Option<usize> {
        self.pairs.iter().position(|(_, close)| close == text)
    }

    /// Inclusive (open, close) positions of every matched pair, or `None` if
    /// the phrase is unbalanced.
    pub fn spans(&self, phrase: &Phrase) -> Option<Vec<(usize, usize)>> {
        let mut stack: Vec<(usize, usize)> = Vec::new();
        let mut spans = Vec::new();
        for (pos, row) in phrase.rows.iter().enumerate() {
            if let Some(kind) = self.open_kind(&row.text) {
                stack.push((kind, pos));
            } else if let Some(kind) = self.close_kind(&row.text) {
                match stack.pop() {
                    Some((open_kind, start)) if open_kind == kind => spans.push((start, pos)),
                    _ => return None,
                }
            }
        }
        if stack.is_empty() { Some(spans) } else { None }
    }
}

impl PhraseFilter for BracketSpans {
    fn name(&self) -> &'static str {
        FILTER_BRACKETS
    }

    fn apply(&self, mut phrase: Phrase) -> Option<Phrase> {
        let spans = self.spans(&phrase)?;
        for (start, end) in spans {
            for row in &mut phrase.rows[start..=end] {
                row.label = Label::Comment;
            }
        }
        Some(phrase)
    }
}

/// Comments out an alternative ingredient introduced by "or" after the head
/// noun: "beef or chicken stock" keeps "beef" and comments the rest.
///
/// Only the first NAME token is considered. Phrases without a NAME are
/// dropped.
#[derive(Debug, Clone)]
pub struct AlternativeComment {
    marker: String,
}

impl AlternativeComment {
    pub fn new(marker: String) -> Self {
        Self { marker }
    }
}

impl PhraseFilter for AlternativeComment {
    fn name(&self) -> &'static str {
        FILTER_OR
    }

    fn apply(&self, mut phrase: Phrase) -> Option<Phrase> {
        let first_name = phrase.first_name()?;
        let alternative = phrase
            .rows
            .iter()
            .skip(first_name + 1)
            .position(|row| row.text == self.marker)
            .map(|offset| first_name + 1 + offset);

        if let Some(start) = alternative {
            for row in &mut phrase.rows[start..] {
                row.label = Label::Comment;
            }
        }
        Some(phrase)
    }
}

/// Drops phrases with an OTHER token mixing digits and hyphens, which the
/// hyphenated-quantity filter missed because of the label.
#[derive(Debug, Clone, Copy, Default)]
pub struct AmbiguousHyphenDigit;

impl PhraseFilter for AmbiguousHyphenDigit {
    fn name(&self) -> &'static str {
        FILTER_HYPHEN_DIGIT
    }

    fn apply(&self, phrase: Phrase) -> Option<Phrase> {
        let ambiguous = phrase.rows.iter().any(|row| {
            row.label == Label::Other
                && row.text.contains('-')
                && row.text.chars().any(|c| c.is_ascii_digit())
        });
        if ambiguous { None } else { Some(phrase) }
    }
}

/// Final invariant: a kept phrase has at least one NAME token.
#[derive(Debug, Clone, Copy, Default)]
pub struct NameGuard;

impl PhraseFilter for NameGuard {
    fn name(&self) -> &'static str {
        FILTER_NAME_GUARD
    }

    fn apply(&self, phrase: Phrase) -> Option<Phrase> {
        if phrase.has_name() { Some(phrase) } else { None }
    }
}
