//! Python bindings, for driving the cleaner from notebooks and scripts.

use std::path::{Path, PathBuf};

use pyo3::exceptions::{PyIOError, PyValueError};
use pyo3::prelude::*;

use crate::config::CleanConfig;
use crate::error::CleanError;
use crate::normalize::LabelNormalizer;
use crate::runner;
use crate::units;

impl From<CleanError> for PyErr {
    fn from(err: CleanError) -> PyErr {
        match err {
            CleanError::Io { .. } | CleanError::Csv { .. } => PyIOError::new_err(err.to_string()),
            other => PyValueError::new_err(other.to_string()),
        }
    }
}

fn config_from(path: Option<String>) -> PyResult<CleanConfig> {
    match path {
        Some(p) => Ok(crate::config::load_config_from_file(Path::new(&p))?),
        None => Ok(CleanConfig::default()),
    }
}

/// Clean a single token file, reading and writing entirely in Rust.
/// Returns: (rows_in, rows_out, phrases_out)
#[pyfunction]
#[pyo3(signature = (input_path, output_path, config_path=None))]
fn clean_file_to_file(
    input_path: String,
    output_path: String,
    config_path: Option<String>,
) -> PyResult<(usize, usize, usize)> {
    let config = config_from(config_path)?;
    let report = runner::clean_file(
        Path::new(&input_path),
        Path::new(&output_path),
        None,
        &config,
    )?;
    Ok((report.rows_in(), report.rows_out(), report.phrases_out()))
}

/// Clean many files in parallel.
/// Returns: list of (input_path, output_path, error_or_None)
#[pyfunction]
#[pyo3(signature = (input_paths, output_dir, config_path=None))]
fn clean_files_batch(
    input_paths: Vec<String>,
    output_dir: String,
    config_path: Option<String>,
) -> PyResult<Vec<(String, String, Option<String>)>> {
    let config = config_from(config_path)?;
    let inputs: Vec<PathBuf> = input_paths.into_iter().map(PathBuf::from).collect();
    let outcomes = runner::clean_files_batch(&inputs, Path::new(&output_dir), &config)?;
    Ok(outcomes
        .into_iter()
        .map(|o| {
            (
                o.input.display().to_string(),
                o.output.display().to_string(),
                o.result.err().map(|e| e.to_string()),
            )
        })
        .collect())
}

/// Canonical label for a raw label, e.g. "B-INDEX" -> "QTY".
#[pyfunction]
fn normalize_label(label: String) -> PyResult<String> {
    LabelNormalizer::default()
        .normalize(&label)
        .map(|l| l.as_str().to_string())
        .ok_or_else(|| PyValueError::new_err(format!("unknown label '{label}'")))
}

/// Full unit word for an abbreviation; other text is returned unchanged.
#[pyfunction]
fn expand_abbreviation(text: String) -> String {
    units::default_table().expand(&text).to_string()
}

#[pymodule]
fn ingredient_tagger_clean(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(clean_file_to_file, m)?)?;
    m.add_function(wrap_pyfunction!(clean_files_batch, m)?)?;
    m.add_function(wrap_pyfunction!(normalize_label, m)?)?;
    m.add_function(wrap_pyfunction!(expand_abbreviation, m)?)?;
    Ok(())
}
