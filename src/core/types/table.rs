use std::path::PathBuf;

use crate::types::{AppError, AppResult};

/// A delimited text file held as header plus string cells.
///
/// Cells stay untyped until a column is requested; a missing or
/// non-numeric column surfaces as `SchemaMismatch` at that point.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub source: PathBuf,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(source: impl Into<PathBuf>, columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            source: source.into(),
            columns,
            rows,
        }
    }

    pub fn source_name(&self) -> String {
        self.source.to_string_lossy().to_string()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.trim() == name)
    }

    pub fn column_index(&self, name: &str) -> AppResult<usize> {
        self.columns
            .iter()
            .position(|c| c.trim() == name)
            .ok_or_else(|| AppError::schema(self.source_name(), name, "column not present"))
    }

    pub fn str_column(&self, name: &str) -> AppResult<Vec<String>> {
        let idx = self.column_index(name)?;
        self.rows
            .iter()
            .map(|row| {
                row.get(idx)
                    .map(|cell| cell.trim().to_string())
                    .ok_or_else(|| AppError::schema(self.source_name(), name, "short row"))
            })
            .collect()
    }

    pub fn f64_column(&self, name: &str) -> AppResult<Vec<f64>> {
        self.parsed_column(name, "expected a number")
    }

    pub fn i64_column(&self, name: &str) -> AppResult<Vec<i64>> {
        self.parsed_column(name, "expected an integer count")
    }

    fn parsed_column<T: std::str::FromStr>(&self, name: &str, expected: &str) -> AppResult<Vec<T>> {
        self.str_column(name)?
            .into_iter()
            .enumerate()
            .map(|(i, cell)| {
                cell.parse::<T>().map_err(|_| {
                    AppError::schema(
                        self.source_name(),
                        name,
                        format!("{expected} in row {}, got '{cell}'", i + 1),
                    )
                })
            })
            .collect()
    }

    /// Row-wise union. Columns of `other` are matched by name, so the
    /// column order of the two tables may differ.
    pub fn concat(mut self, other: &Table) -> AppResult<Table> {
        if self.columns.is_empty() {
            return Ok(other.clone());
        }
        let mapping = self
            .columns
            .iter()
            .map(|c| other.column_index(c.trim()))
            .collect::<AppResult<Vec<_>>>()?;
        for row in &other.rows {
            let mapped = mapping
                .iter()
                .map(|&i| row.get(i).cloned().unwrap_or_default())
                .collect();
            self.rows.push(mapped);
        }
        Ok(self)
    }
}
