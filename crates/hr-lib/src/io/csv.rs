use super::LoadError;
use crate::signal::Recording;
use ::csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

pub const TIME_COLUMN: &str = "time";
pub const ECG_COLUMN: &str = "ecg";

/// Load a recording from a CSV file with `time` and `ecg` columns.
pub fn read_ecg_csv(path: &Path) -> Result<Recording, LoadError> {
    let file = File::open(path)?;
    read_ecg_csv_from_reader(file)
}

/// Load a recording from any CSV source. The header row must name a `time`
/// and an `ecg` column (case-insensitive, any order); other columns are ignored.
pub fn read_ecg_csv_from_reader<R: Read>(reader: R) -> Result<Recording, LoadError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);
    let headers = reader.headers()?.clone();
    let time_idx = locate_column(&headers, TIME_COLUMN)?;
    let ecg_idx = locate_column(&headers, ECG_COLUMN)?;

    let mut time = Vec::new();
    let mut ecg = Vec::new();
    for result in reader.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        time.push(parse_cell(&record, time_idx, TIME_COLUMN, line)?);
        ecg.push(parse_cell(&record, ecg_idx, ECG_COLUMN, line)?);
    }
    if ecg.is_empty() {
        return Err(LoadError::Empty);
    }
    Recording::new(time, ecg)
}

/// Write a recording as a two-column `time,ecg` CSV file.
pub fn write_ecg_csv(path: &Path, recording: &Recording) -> Result<(), LoadError> {
    let file = File::create(path)?;
    write_ecg_csv_to_writer(file, recording)
}

pub fn write_ecg_csv_to_writer<W: Write>(writer: W, recording: &Recording) -> Result<(), LoadError> {
    let mut writer = WriterBuilder::new().from_writer(writer);
    writer.write_record([TIME_COLUMN, ECG_COLUMN])?;
    for (t, v) in recording.time.iter().zip(&recording.ecg) {
        writer.write_record([t.to_string(), v.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

fn locate_column(headers: &StringRecord, name: &'static str) -> Result<usize, LoadError> {
    headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case(name))
        .ok_or(LoadError::MissingColumn(name))
}

fn parse_cell(
    record: &StringRecord,
    idx: usize,
    column: &'static str,
    line: u64,
) -> Result<f64, LoadError> {
    let raw = record.get(idx).unwrap_or_default();
    raw.parse::<f64>().map_err(|_| LoadError::Parse {
        line,
        column,
        value: raw.to_string(),
    })
}
