//! Cleaning pipeline for tagged-ingredient training data.
//!
//! Takes the token-per-line export of an ingredient phrase tagger corpus,
//! rebuilds the phrases, normalizes labels, filters annotation noise, and
//! produces a `phrase_id, text, label` table ready for sequence-tagger
//! training.

pub mod config;
pub mod error;
pub mod filters;
pub mod grouper;
pub mod io;
pub mod normalize;
pub mod pipeline;
pub mod runner;
pub mod token;
pub mod units;

#[cfg(feature = "python")]
mod python;

pub use config::{CleanConfig, IdScheme, load_config_from_file};
pub use error::{CleanError, Result};
pub use filters::PhraseFilter;
pub use grouper::PhraseGrouper;
pub use normalize::LabelNormalizer;
pub use pipeline::{CleanOutput, Pipeline, PipelineReport, StageStats};
pub use runner::{BatchOutcome, clean_file, clean_files_batch};
pub use token::{CleanRow, Label, Phrase, RawRow, TokenRow};
pub use units::AbbreviationTable;
