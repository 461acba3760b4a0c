//! Delimited-file reading and writing.
//!
//! Input is the six-column token export with no header. Output files are
//! written to a sibling temporary file and renamed into place, so a failed
//! write never leaves a partial file at the destination.

use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Terminator, WriterBuilder};
use serde::Serialize;

use crate::config::IoConfig;
use crate::error::{CleanError, Result};
use crate::token::{CleanRow, Features, RawPhrase, RawRow};

pub const INPUT_COLUMNS: usize = 6;

/// Read raw token rows from any reader. `source` names the input in errors.
pub fn read_rows<R: Read>(reader: R, delimiter: u8, source: &Path) -> Result<Vec<RawRow>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .flexible(true)
        .quoting(false)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(|e| CleanError::csv(source, e))?;
        let line = record
            .position()
            .map_or(index + 1, |pos| pos.line() as usize);
        if record.len() != INPUT_COLUMNS {
            return Err(CleanError::MalformedRow {
                line,
                expected: INPUT_COLUMNS,
                found: record.len(),
            });
        }
        rows.push(RawRow {
            line,
            text: record[0].to_string(),
            position_marker: record[1].to_string(),
            features: Features {
                token_length: record[2].to_string(),
                capitalization: record[3].to_string(),
                bracket_flag: record[4].to_string(),
            },
            label: record[5].to_string(),
        });
    }
    Ok(rows)
}

pub fn read_rows_from_path(path: &Path, config: &IoConfig) -> Result<Vec<RawRow>> {
    let file = File::open(path).map_err(|e| CleanError::io(path, e))?;
    read_rows(file, config.input_delimiter_byte()?, path)
}

pub fn write_clean<W: Write>(
    writer: W,
    rows: &[CleanRow],
    delimiter: u8,
    header: bool,
) -> csv::Result<()> {
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .has_headers(header)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(writer);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct GroupedRecord<'a> {
    text: &'a str,
    position_marker: &'a str,
    token_length: &'a str,
    capitalization: &'a str,
    bracket_flag: &'a str,
    label: &'a str,
    phrase_id: &'a str,
}

/// Write the grouped table: every input column plus its phrase id.
pub fn write_grouped<W: Write>(
    writer: W,
    phrases: &[RawPhrase],
    delimiter: u8,
    header: bool,
) -> csv::Result<()> {
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .has_headers(header)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(writer);
    for phrase in phrases {
        for row in &phrase.rows {
            writer.serialize(GroupedRecord {
                text: &row.text,
                position_marker: &row.position_marker,
                token_length: &row.features.token_length,
                capitalization: &row.features.capitalization,
                bracket_flag: &row.features.bracket_flag,
                label: &row.label,
                phrase_id: &phrase.id,
            })?;
        }
    }
    writer.flush()?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// An output written to its temporary sibling but not yet moved into place.
///
/// Dropping it without [`StagedFile::commit`] removes the temporary file, so
/// several outputs can be staged and only committed once all of them succeed.
#[derive(Debug)]
pub struct StagedFile {
    tmp: PathBuf,
    dest: PathBuf,
    committed: bool,
}

impl StagedFile {
    pub fn dest(&self) -> &Path {
        &self.dest
    }

    /// Rename the temporary file onto its destination.
    pub fn commit(mut self) -> Result<()> {
        fs::rename(&self.tmp, &self.dest).map_err(|e| CleanError::io(&self.dest, e))?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if !self.committed {
            let _ = fs::remove_file(&self.tmp);
        }
    }
}

/// Write through `write` into a temporary sibling of `path`.
fn stage<F>(path: &Path, write: F) -> Result<StagedFile>
where
    F: FnOnce(BufWriter<File>) -> csv::Result<()>,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| CleanError::io(parent, e))?;
    }
    let tmp = temp_path(path);
    let file = File::create(&tmp).map_err(|e| CleanError::io(&tmp, e))?;
    let staged = StagedFile {
        tmp,
        dest: path.to_path_buf(),
        committed: false,
    };
    write(BufWriter::new(file)).map_err(|e| CleanError::csv(path, e))?;
    Ok(staged)
}

pub fn stage_clean(path: &Path, rows: &[CleanRow], config: &IoConfig) -> Result<StagedFile> {
    let delimiter = config.output_delimiter_byte()?;
    stage(path, |w| write_clean(w, rows, delimiter, config.output_header))
}

pub fn stage_grouped(path: &Path, phrases: &[RawPhrase], config: &IoConfig) -> Result<StagedFile> {
    let delimiter = config.output_delimiter_byte()?;
    stage(path, |w| write_grouped(w, phrases, delimiter, config.output_header))
}
