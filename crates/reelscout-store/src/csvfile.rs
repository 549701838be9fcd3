//! RFC-4180 read/write helpers shared by the session log and master merger.
//! Header order is "whatever the file already had, widened by any known
//! column the file doesn't yet carry" so an older file reopened by a newer
//! build gains columns without reshuffling the ones it already has.

use crate::columns::{Row, KNOWN_COLUMNS};
use reelscout_core::error::{Error, Result};
use std::io::ErrorKind as IoErrorKind;
use std::path::Path;

/// Read every row of `path` into memory along with the header order found on
/// disk. Returns an empty header/row set if the file doesn't exist yet.
pub fn read_rows(path: &Path) -> Result<(Vec<String>, Vec<Row>)> {
    let file = match std::fs::File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == IoErrorKind::NotFound => return Ok((Vec::new(), Vec::new())),
        Err(e) => return Err(Error::invalid_response(format!("opening {path:?}: {e}"))),
    };
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(file);
    let header: Vec<String> = reader
        .headers()
        .map_err(|e| Error::invalid_response(format!("reading header of {path:?}: {e}")))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record =
            record.map_err(|e| Error::invalid_response(format!("reading row of {path:?}: {e}")))?;
        let mut row = Row::new();
        for (i, column) in header.iter().enumerate() {
            row.insert(column.clone(), record.get(i).unwrap_or("").to_string());
        }
        rows.push(row);
    }
    Ok((header, rows))
}

/// Widen `existing_header` with any [`KNOWN_COLUMNS`] entry it is missing,
/// preserving the existing order and appending new ones at the end.
#[must_use]
pub fn widen_header(existing_header: &[String]) -> Vec<String> {
    let mut header: Vec<String> = existing_header.to_vec();
    for column in KNOWN_COLUMNS {
        if !header.iter().any(|h| h == column) {
            header.push((*column).to_string());
        }
    }
    header
}

/// Write `rows` to `path` as RFC-4180 CSV under `header`, atomically (via a
/// temp file renamed into place) so a crash mid-write never corrupts the
/// existing file.
pub fn write_rows(path: &Path, header: &[String], rows: &[Row]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| Error::invalid_response(format!("creating {parent:?}: {e}")))?;
    }
    let tmp_path = path.with_extension("csv.tmp");
    {
        let file = std::fs::File::create(&tmp_path)
            .map_err(|e| Error::invalid_response(format!("creating {tmp_path:?}: {e}")))?;
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        writer
            .write_record(header)
            .map_err(|e| Error::invalid_response(format!("writing header to {tmp_path:?}: {e}")))?;
        for row in rows {
            let record: Vec<&str> = header
                .iter()
                .map(|column| row.get(column).map(String::as_str).unwrap_or(""))
                .collect();
            writer
                .write_record(&record)
                .map_err(|e| Error::invalid_response(format!("writing row to {tmp_path:?}: {e}")))?;
        }
        writer
            .flush()
            .map_err(|e| Error::invalid_response(format!("flushing {tmp_path:?}: {e}")))?;
    }
    std::fs::rename(&tmp_path, path)
        .map_err(|e| Error::invalid_response(format!("renaming {tmp_path:?} to {path:?}: {e}")))?;
    Ok(())
}
