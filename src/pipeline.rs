//! Pipeline runner: grouping, label normalization, then the filter chain.
//!
//! The chain is a strict left-to-right fold. Each stage takes ownership of the
//! previous stage's full phrase table and builds a new one, so no stage can
//! observe another's partial state. Per-stage row and phrase counts are kept
//! in a [`PipelineReport`].

use std::fmt;

use serde::Serialize;
use tracing::{debug, info, info_span};

use crate::config::CleanConfig;
use crate::error::Result;
use crate::filters::{PhraseFilter, standard_chain};
use crate::grouper::PhraseGrouper;
use crate::normalize::LabelNormalizer;
use crate::token::{CleanRow, Phrase, RawPhrase, RawRow, flatten};

pub const STAGE_GROUP: &str = "grouping";
pub const STAGE_NORMALIZE: &str = "label_normalize";

/// Counts for one stage of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageStats {
    pub stage: &'static str,
    pub rows_in: usize,
    pub rows_out: usize,
    pub phrases_in: usize,
    pub phrases_out: usize,
    pub phrases_dropped: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineReport {
    pub stages: Vec<StageStats>,
}

impl PipelineReport {
    pub fn stage(&self, name: &str) -> Option<&StageStats> {
        self.stages.iter().find(|s| s.stage == name)
    }

    pub fn rows_in(&self) -> usize {
        self.stages.first().map_or(0, |s| s.rows_in)
    }

    pub fn rows_out(&self) -> usize {
        self.stages.last().map_or(0, |s| s.rows_out)
    }

    pub fn phrases_out(&self) -> usize {
        self.stages.last().map_or(0, |s| s.phrases_out)
    }

    pub fn phrases_dropped(&self) -> usize {
        self.stages.iter().map(|s| s.phrases_dropped).sum()
    }

    fn record(&mut self, stats: StageStats) {
        info!(
            stage = stats.stage,
            rows_in = stats.rows_in,
            rows_out = stats.rows_out,
            phrases_out = stats.phrases_out,
            dropped = stats.phrases_dropped,
            "stage complete"
        );
        self.stages.push(stats);
    }
}

impl fmt::Display for PipelineReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<24} {:>10} {:>10} {:>10} {:>10}",
            "stage", "rows_in", "rows_out", "phrases", "dropped"
        )?;
        for s in &self.stages {
            writeln!(
                f,
                "{:<24} {:>10} {:>10} {:>10} {:>10}",
                s.stage, s.rows_in, s.rows_out, s.phrases_out, s.phrases_dropped
            )?;
        }
        Ok(())
    }
}

/// Cleaned rows plus the statistics of the run that produced them.
#[derive(Debug, Clone)]
pub struct CleanOutput {
    pub rows: Vec<CleanRow>,
    pub report: PipelineReport,
}

pub struct Pipeline {
    grouper: PhraseGrouper,
    normalizer: LabelNormalizer,
    filters: Vec<Box<dyn PhraseFilter>>,
}

fn count_rows<T>(phrases: &[T], len: impl Fn(&T) -> usize) -> usize {
    phrases.iter().map(len).sum()
}

impl Pipeline {
    pub fn new(
        grouper: PhraseGrouper,
        normalizer: LabelNormalizer,
        filters: Vec<Box<dyn PhraseFilter>>,
    ) -> Self {
        Self {
            grouper,
            normalizer,
            filters,
        }
    }

    /// The standard run described by `config`.
    pub fn from_config(config: &CleanConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(
            PhraseGrouper::new(&config.grouping)?,
            LabelNormalizer::new(&config.labels),
            standard_chain(&config.filters),
        ))
    }

    pub fn filter_names(&self) -> Vec<&'static str> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    pub fn group(&self, rows: Vec<RawRow>) -> Result<Vec<RawPhrase>> {
        self.grouper.group(rows)
    }

    /// Group rows and start a report with the grouping stage.
    pub fn group_with_report(&self, rows: Vec<RawRow>) -> Result<(Vec<RawPhrase>, PipelineReport)> {
        let rows_in = rows.len();
        let phrases = self.group(rows)?;
        let mut report = PipelineReport::default();
        report.record(StageStats {
            stage: STAGE_GROUP,
            rows_in,
            rows_out: count_rows(&phrases, |p: &RawPhrase| p.rows.len()),
            phrases_in: 0,
            phrases_out: phrases.len(),
            phrases_dropped: 0,
        });
        Ok((phrases, report))
    }

    /// Group, normalize and filter a full token stream.
    pub fn run(&self, rows: Vec<RawRow>) -> Result<CleanOutput> {
        let (phrases, report) = self.group_with_report(rows)?;
        self.clean_grouped(phrases, report)
    }

    /// Normalize and filter phrases that were already grouped.
    pub fn clean_grouped(
        &self,
        phrases: Vec<RawPhrase>,
        mut report: PipelineReport,
    ) -> Result<CleanOutput> {
        let _span = info_span!("clean_run", phrases = phrases.len()).entered();

        let phrases_in = phrases.len();
        let rows_in = count_rows(&phrases, |p: &RawPhrase| p.rows.len());
        let normalized = phrases
            .into_iter()
            .map(|p| self.normalizer.normalize_phrase(p))
            .collect::<Result<Vec<_>>>()?;
        report.record(StageStats {
            stage: STAGE_NORMALIZE,
            rows_in,
            rows_out: count_rows(&normalized, Phrase::len),
            phrases_in,
            phrases_out: normalized.len(),
            phrases_dropped: 0,
        });

        let cleaned = self.filters.iter().fold(normalized, |phrases, filter| {
            let (kept, stats) = apply_filter(filter.as_ref(), phrases);
            report.record(stats);
            kept
        });

        Ok(CleanOutput {
            rows: flatten(cleaned),
            report,
        })
    }
}

fn apply_filter(filter: &dyn PhraseFilter, phrases: Vec<Phrase>) -> (Vec<Phrase>, StageStats) {
    let phrases_in = phrases.len();
    let rows_in = count_rows(&phrases, Phrase::len);

    let kept: Vec<Phrase> = phrases
        .into_iter()
        .filter_map(|phrase| {
            let id = phrase.id.clone();
            let out = filter.apply(phrase);
            if out.is_none() {
                debug!(filter = filter.name(), phrase_id = %id, "dropped phrase");
            }
            out
        })
        .collect();

    let stats = StageStats {
        stage: filter.name(),
        rows_in,
        rows_out: count_rows(&kept, Phrase::len),
        phrases_in,
        phrases_out: kept.len(),
        phrases_dropped: phrases_in - kept.len(),
    };
    (kept, stats)
}
