//! File-level runs: read, clean, write.
//!
//! A run computes everything in memory before writing, so structural errors
//! leave no output behind. Batch runs process independent files in parallel;
//! each file is still a single sequential pass.

use std::collections::HashMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{error, info};

use crate::config::CleanConfig;
use crate::error::{CleanError, Result};
use crate::io::{read_rows_from_path, stage_clean, stage_grouped};
use crate::pipeline::{Pipeline, PipelineReport};

pub const CLEANED_SUFFIX: &str = ".cleaned.csv";

/// Clean one file with a freshly built pipeline.
pub fn clean_file(
    input: &Path,
    output: &Path,
    grouped_output: Option<&Path>,
    config: &CleanConfig,
) -> Result<PipelineReport> {
    let pipeline = Pipeline::from_config(config)?;
    clean_file_with(&pipeline, input, output, grouped_output, config)
}

pub fn clean_file_with(
    pipeline: &Pipeline,
    input: &Path,
    output: &Path,
    grouped_output: Option<&Path>,
    config: &CleanConfig,
) -> Result<PipelineReport> {
    info!(input = %input.display(), "reading token rows");
    let rows = read_rows_from_path(input, &config.io)?;
    let (phrases, report) = pipeline.group_with_report(rows)?;
    let grouped = grouped_output.map(|path| (path, phrases.clone()));
    let cleaned = pipeline.clean_grouped(phrases, report)?;

    // Both outputs are staged before either is moved into place; an error
    // before the last commit leaves neither behind.
    let staged_grouped = grouped
        .as_ref()
        .map(|(path, phrases)| stage_grouped(path, phrases, &config.io))
        .transpose()?;
    stage_clean(output, &cleaned.rows, &config.io)?.commit()?;
    if let Some(staged) = staged_grouped {
        let path = staged.dest().to_path_buf();
        if let Err(e) = staged.commit() {
            let _ = fs::remove_file(output);
            return Err(e);
        }
        info!(output = %path.display(), "wrote grouped table");
    }
    info!(
        output = %output.display(),
        rows = cleaned.rows.len(),
        phrases = cleaned.report.phrases_out(),
        "wrote cleaned dataset"
    );
    Ok(cleaned.report)
}

/// Output path for `input` inside `output_dir`: the input stem plus
/// [`CLEANED_SUFFIX`].
pub fn batch_output_path(output_dir: &Path, input: &Path) -> PathBuf {
    let mut name: OsString = input
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| OsString::from("dataset"));
    name.push(CLEANED_SUFFIX);
    output_dir.join(name)
}

#[derive(Debug)]
pub struct BatchOutcome {
    pub input: PathBuf,
    pub output: PathBuf,
    pub result: Result<PipelineReport>,
}

impl BatchOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Reject a batch where two inputs would write the same output file.
fn check_distinct_outputs(jobs: &[(PathBuf, PathBuf)]) -> Result<()> {
    let mut seen: HashMap<&Path, &Path> = HashMap::new();
    for (input, output) in jobs {
        if let Some(first) = seen.insert(output.as_path(), input.as_path()) {
            return Err(CleanError::Config(format!(
                "inputs {} and {} both map to {}",
                first.display(),
                input.display(),
                output.display()
            )));
        }
    }
    Ok(())
}

/// Clean several files in parallel. A failing file does not stop the others;
/// only setup errors (bad config, clashing output names, unusable output
/// directory) fail the batch.
pub fn clean_files_batch(
    inputs: &[PathBuf],
    output_dir: &Path,
    config: &CleanConfig,
) -> Result<Vec<BatchOutcome>> {
    let jobs: Vec<(PathBuf, PathBuf)> = inputs
        .iter()
        .map(|input| (input.clone(), batch_output_path(output_dir, input)))
        .collect();
    check_distinct_outputs(&jobs)?;
    let pipeline = Pipeline::from_config(config)?;
    fs::create_dir_all(output_dir).map_err(|e| CleanError::io(output_dir, e))?;

    let outcomes: Vec<BatchOutcome> = jobs
        .into_par_iter()
        .map(|(input, output)| {
            let result = clean_file_with(&pipeline, &input, &output, None, config);
            if let Err(e) = &result {
                error!(input = %input.display(), "cleaning failed: {e}");
            }
            BatchOutcome {
                input,
                output,
                result,
            }
        })
        .collect();

    let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
    info!(files = outcomes.len(), failed, "batch complete");
    Ok(outcomes)
}
