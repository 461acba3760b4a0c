//! Phrase reconstruction from a flat token stream.
//!
//! Rows arrive ungrouped; a row whose position marker matches the start
//! pattern opens a new phrase and every following row belongs to it until
//! the next start marker. Grouping is a fold over the rows with an explicit
//! accumulator, so the same input always yields the same boundaries.

use lazy_static::lazy_static;
use regex::Regex;
use sha2::{Digest, Sha256};

use crate::config::{GroupingConfig, IdScheme};
use crate::error::{CleanError, Result};
use crate::token::{RawPhrase, RawRow};

lazy_static! {
    // Token-index markers as emitted by the feature extractor: I1, I2, ...
    static ref INDEX_MARKER: Regex = Regex::new(r"^I(\d+)$").unwrap();
}

/// Numeric token index encoded in a position marker, if it has one.
pub fn marker_index(marker: &str) -> Option<u32> {
    INDEX_MARKER
        .captures(marker)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

#[derive(Debug, Clone)]
pub struct PhraseGrouper {
    start: Regex,
    scheme: IdScheme,
    width: usize,
    check_sequence: bool,
}

#[derive(Default)]
struct GroupState {
    closed: Vec<Vec<RawRow>>,
    open: Vec<RawRow>,
    last_index: Option<u32>,
}

impl PhraseGrouper {
    pub fn new(config: &GroupingConfig) -> Result<Self> {
        let start = Regex::new(&config.start_pattern).map_err(|source| {
            CleanError::InvalidPattern {
                pattern: config.start_pattern.clone(),
                source,
            }
        })?;
        Ok(Self {
            start,
            scheme: config.id_scheme,
            width: config.id_width,
            check_sequence: config.check_sequence,
        })
    }

    pub fn is_start(&self, marker: &str) -> bool {
        self.start.is_match(marker)
    }

    /// Group rows into phrases and assign each phrase its id.
    ///
    /// Fails if the stream does not open with a start marker, or (with
    /// sequence checking) if a continuation marker skips or repeats an index.
    pub fn group(&self, rows: Vec<RawRow>) -> Result<Vec<RawPhrase>> {
        let state = rows
            .into_iter()
            .try_fold(GroupState::default(), |state, row| self.step(state, row))?;

        let GroupState {
            mut closed, open, ..
        } = state;
        if !open.is_empty() {
            closed.push(open);
        }

        Ok(closed
            .into_iter()
            .enumerate()
            .map(|(ordinal, rows)| RawPhrase {
                id: self.phrase_id(ordinal, &rows),
                rows,
            })
            .collect())
    }

    fn step(&self, mut state: GroupState, row: RawRow) -> Result<GroupState> {
        if self.is_start(&row.position_marker) {
            if !state.open.is_empty() {
                let finished = std::mem::take(&mut state.open);
                state.closed.push(finished);
            }
            state.last_index = marker_index(&row.position_marker);
            state.open.push(row);
            return Ok(state);
        }

        if state.open.is_empty() {
            return Err(CleanError::MalformedStream {
                line: row.line,
                marker: row.position_marker,
                reason: "stream does not begin with a phrase-start marker".into(),
            });
        }

        if self.check_sequence {
            let index = marker_index(&row.position_marker);
            if let (Some(prev), Some(current)) = (state.last_index, index) {
                if current != prev.saturating_add(1) {
                    return Err(CleanError::MalformedStream {
                        line: row.line,
                        marker: row.position_marker,
                        reason: format!("token index I{current} does not follow I{prev}"),
                    });
                }
            }
            state.last_index = index;
        }

        state.open.push(row);
        Ok(state)
    }

    fn phrase_id(&self, ordinal: usize, rows: &[RawRow]) -> String {
        match self.scheme {
            IdScheme::Counter => format!("{:0width$}", ordinal + 1, width = self.width),
            IdScheme::Hash => {
                let mut hasher = Sha256::new();
                hasher.update((ordinal as u64 + 1).to_le_bytes());
                for row in rows {
                    hasher.update(row.text.as_bytes());
                    hasher.update([0x1f]);
                }
                hex::encode(hasher.finalize())
            }
        }
    }
}
