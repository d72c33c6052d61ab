use std::fmt;

use serde::Serialize;
use strum::{Display, EnumIter, EnumString};

use crate::types::{AppResult, Table};

/// Arithmetic encodings measured by the harness. `None` is the unencoded baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, Serialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum Scheme {
    None,
    An,
    OnesComplement,
    TwosComplement,
    Residue,
}

impl Scheme {
    /// Encoded schemes in chart column order.
    pub const ENCODED: [Scheme; 4] = [
        Scheme::An,
        Scheme::OnesComplement,
        Scheme::TwosComplement,
        Scheme::Residue,
    ];

    /// The harness reports an absolute time for the residue scheme and a
    /// difference to the baseline for every other encoding.
    pub fn ratio_formula(&self) -> RatioFormula {
        match self {
            Scheme::Residue => RatioFormula::Direct,
            _ => RatioFormula::Additive,
        }
    }

    /// Legend label, e.g. `1's comp. 32`.
    pub fn label(&self, width: WordWidth) -> String {
        let name = match self {
            Scheme::None => "Native",
            Scheme::An => "AN",
            Scheme::OnesComplement => "1's comp.",
            Scheme::TwosComplement => "2's comp",
            Scheme::Residue => "Res.",
        };
        format!("{name} {}", width.bits())
    }

    /// Name of the CSV the harness writes for this scheme, e.g. `perf_AN_32BIT.csv`.
    pub fn file_name(&self, width: WordWidth) -> String {
        format!("perf_{self}_{}BIT.csv", width.bits())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, Serialize)]
pub enum WordWidth {
    W32,
    W64,
}

impl WordWidth {
    pub fn bits(&self) -> u32 {
        match self {
            WordWidth::W32 => 32,
            WordWidth::W64 => 64,
        }
    }
}

impl fmt::Display for WordWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatioFormula {
    /// `measured / baseline`
    Direct,
    /// `(measured + baseline) / baseline`
    Additive,
}

impl RatioFormula {
    pub fn apply(&self, measured: f64, baseline: f64) -> f64 {
        match self {
            RatioFormula::Direct => measured / baseline,
            RatioFormula::Additive => (measured + baseline) / baseline,
        }
    }
}

/// One row of a per-operation timing file. Only the tag and the median take
/// part in ratio computation; the other statistics are kept when present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceRecord {
    pub tag: String,
    pub median: f64,
    pub max: Option<f64>,
    pub min: Option<f64>,
    pub count: Option<f64>,
    pub avg: Option<f64>,
}

impl PerformanceRecord {
    pub fn from_table(table: &Table) -> AppResult<Vec<PerformanceRecord>> {
        let tags = table.str_column("TAGS")?;
        let median = table.f64_column("MEDIAN")?;
        let optional = |name: &str| -> AppResult<Option<Vec<f64>>> {
            if table.has_column(name) {
                table.f64_column(name).map(Some)
            } else {
                Ok(None)
            }
        };
        let max = optional("MAX")?;
        let min = optional("MIN")?;
        let count = optional("COUNT")?;
        let avg = optional("AVG")?;
        let at = |col: &Option<Vec<f64>>, i: usize| col.as_ref().map(|v| v[i]);

        Ok((0..tags.len())
            .map(|i| PerformanceRecord {
                tag: tags[i].clone(),
                median: median[i],
                max: at(&max, i),
                min: at(&min, i),
                count: at(&count, i),
                avg: at(&avg, i),
            })
            .collect())
    }
}
