//! Row and phrase types that flow through the cleaning pipeline.

use std::fmt;

use serde::Serialize;

/// Canonical token label after normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Label {
    Name,
    Qty,
    Unit,
    Comment,
    Other,
}

impl Label {
    pub const ALL: [Label; 5] = [
        Label::Name,
        Label::Qty,
        Label::Unit,
        Label::Comment,
        Label::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Label::Name => "NAME",
            Label::Qty => "QTY",
            Label::Unit => "UNIT",
            Label::Comment => "COMMENT",
            Label::Other => "OTHER",
        }
    }

    /// Parse an already-normalized label. Matching is exact.
    pub fn parse(s: &str) -> Option<Label> {
        Label::ALL.into_iter().find(|label| label.as_str() == s)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upstream feature columns carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Features {
    pub token_length: String,
    pub capitalization: String,
    pub bracket_flag: String,
}

/// One input row exactly as read, before grouping or normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// 1-based line in the source file.
    pub line: usize,
    pub text: String,
    pub position_marker: String,
    pub features: Features,
    pub label: String,
}

impl RawRow {
    /// Convenience constructor with empty feature columns.
    pub fn new(line: usize, text: &str, position_marker: &str, label: &str) -> Self {
        RawRow {
            line,
            text: text.to_string(),
            position_marker: position_marker.to_string(),
            features: Features::default(),
            label: label.to_string(),
        }
    }
}

/// A contiguous run of raw rows sharing a phrase id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPhrase {
    pub id: String,
    pub rows: Vec<RawRow>,
}

/// A row after label normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRow {
    pub line: usize,
    pub text: String,
    pub position_marker: String,
    pub features: Features,
    pub label: Label,
}

impl TokenRow {
    pub fn new(text: &str, label: Label) -> Self {
        TokenRow {
            line: 0,
            text: text.to_string(),
            position_marker: String::new(),
            features: Features::default(),
            label,
        }
    }
}

/// An ingredient phrase: ordered token rows that share one id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phrase {
    pub id: String,
    pub rows: Vec<TokenRow>,
}

impl Phrase {
    pub fn new(id: impl Into<String>, rows: Vec<TokenRow>) -> Self {
        Phrase {
            id: id.into(),
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first_name(&self) -> Option<usize> {
        self.rows.iter().position(|row| row.label == Label::Name)
    }

    pub fn has_name(&self) -> bool {
        self.first_name().is_some()
    }

    pub fn labels(&self) -> Vec<Label> {
        self.rows.iter().map(|row| row.label).collect()
    }
}

/// Final output row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanRow {
    pub phrase_id: String,
    pub text: String,
    pub label: Label,
}

/// Flatten phrases into output rows, preserving order.
pub fn flatten(phrases: Vec<Phrase>) -> Vec<CleanRow> {
    phrases
        .into_iter()
        .flat_map(|phrase| {
            let id = phrase.id;
            phrase.rows.into_iter().map(move |row| CleanRow {
                phrase_id: id.clone(),
                text: row.text,
                label: row.label,
            })
        })
        .collect()
}
