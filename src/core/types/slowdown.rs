use std::collections::HashMap;
use std::io;

use serde::Serialize;

use crate::types::{AppResult, WordWidth};

/// Slowdown per operation tag, one column per encoded scheme.
///
/// Row order is the baseline file's tag order. A cell is `None` when the
/// scheme's file did not report that tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlowdownTable {
    pub width: Option<WordWidth>,
    pub columns: Vec<String>,
    pub tags: Vec<String>,
    pub cells: Vec<Vec<Option<f64>>>,
}

impl SlowdownTable {
    pub fn new(width: Option<WordWidth>, tags: Vec<String>) -> Self {
        let cells = vec![Vec::new(); tags.len()];
        Self {
            width,
            columns: Vec::new(),
            tags,
            cells,
        }
    }

    /// Appends a column, placing each ratio on the row of its tag. Rows
    /// without a ratio get an empty cell; ratios for unknown tags are dropped.
    pub fn push_ratios(&mut self, name: impl Into<String>, ratios: &[(String, f64)]) {
        let index: HashMap<&str, f64> = ratios.iter().map(|(t, v)| (t.as_str(), *v)).collect();
        self.columns.push(name.into());
        for (tag, row) in self.tags.iter().zip(self.cells.iter_mut()) {
            row.push(index.get(tag.as_str()).copied());
        }
    }

    pub fn row_count(&self) -> usize {
        self.tags.len()
    }

    pub fn get(&self, tag: &str, column: &str) -> Option<f64> {
        let row = self.tags.iter().position(|t| t == tag)?;
        let col = self.columns.iter().position(|c| c == column)?;
        self.cells[row][col]
    }

    pub fn column_values(&self, col: usize) -> Vec<Option<f64>> {
        self.cells.iter().map(|row| row[col]).collect()
    }

    /// Arithmetic mean of the present cells of each column.
    pub fn column_means(&self) -> Vec<(String, Option<f64>)> {
        self.columns
            .iter()
            .enumerate()
            .map(|(col, name)| {
                let present: Vec<f64> = self.column_values(col).into_iter().flatten().collect();
                let mean = if present.is_empty() {
                    None
                } else {
                    Some(present.iter().sum::<f64>() / present.len() as f64)
                };
                (name.clone(), mean)
            })
            .collect()
    }

    /// Writes `TAGS,<col>...` with empty fields for missing cells.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> AppResult<()> {
        let mut w = csv::Writer::from_writer(writer);
        let mut header = vec!["TAGS".to_string()];
        header.extend(self.columns.iter().cloned());
        w.write_record(&header).map_err(io::Error::from)?;
        for (tag, row) in self.tags.iter().zip(&self.cells) {
            let mut record = vec![tag.clone()];
            record.extend(
                row.iter()
                    .map(|v| v.map(|v| v.to_string()).unwrap_or_default()),
            );
            w.write_record(&record).map_err(io::Error::from)?;
        }
        w.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratios_land_on_their_tag_rows() {
        let mut table = SlowdownTable::new(None, vec!["A".to_string(), "B".to_string()]);
        table.push_ratios("AN 32", &[("B".to_string(), 2.0), ("C".to_string(), 9.0)]);
        assert_eq!(table.cells, vec![vec![None], vec![Some(2.0)]]);
        assert_eq!(table.get("B", "AN 32"), Some(2.0));
    }

    #[test]
    fn csv_leaves_missing_cells_empty() {
        let mut table = SlowdownTable::new(None, vec!["A".to_string(), "B".to_string()]);
        table.push_ratios("Slowdown", &[("A".to_string(), 1.5)]);
        let mut out = Vec::new();
        table.write_csv(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "TAGS,Slowdown\nA,1.5\nB,\n");
    }
}
