use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use log::{debug, warn};

use crate::types::{AppError, AppResult, Table};

/// Field delimiter of the timing files.
pub const PERF_DELIMITER: u8 = b';';
/// Field delimiter of the fault-injection result files.
pub const FI_DELIMITER: u8 = b',';

/// Reads one delimited text file with a header row.
pub fn load_table(path: &Path, delimiter: u8) -> AppResult<Table> {
    if !path.is_file() {
        return Err(AppError::MissingFile(path.to_path_buf()));
    }
    let csv_err = |source| AppError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(csv_err)?;

    let columns = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(|h| h.to_string())
        .collect::<Vec<_>>();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_err)?;
        rows.push(record.iter().map(|c| c.to_string()).collect());
    }

    debug!(
        "Loaded {} rows x {} columns from {}",
        rows.len(),
        columns.len(),
        path.display()
    );
    Ok(Table::new(path, columns, rows))
}

/// Expands `pattern` and reads every matching file, sorted by path.
///
/// A plain path is accepted as a pattern that matches itself. No match at
/// all is reported as a missing file.
pub fn load_tables(pattern: &str, delimiter: u8) -> AppResult<Vec<Table>> {
    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in glob::glob(pattern)? {
        match entry {
            Ok(path) if path.is_file() => paths.push(path),
            Ok(_) => {}
            Err(e) => {
                warn!("Skipping unreadable glob entry: {}", e);
            }
        }
    }
    paths.sort();

    if paths.is_empty() {
        return Err(AppError::MissingFile(PathBuf::from(pattern)));
    }

    paths.iter().map(|p| load_table(p, delimiter)).collect()
}

/// Like `load_tables`, but returns the row-wise union of all matches.
pub fn load_concat(pattern: &str, delimiter: u8) -> AppResult<Table> {
    let tables = load_tables(pattern, delimiter)?;
    let mut iter = tables.into_iter();
    let first = iter
        .next()
        .ok_or_else(|| AppError::MissingFile(PathBuf::from(pattern)))?;
    iter.try_fold(first, |acc, t| acc.concat(&t))
}
