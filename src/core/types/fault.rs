use std::io;

use serde::Serialize;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::types::{AppResult, Table};

/// Semantic outcome classes of a fault-injection run, in legend order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter, EnumString, Serialize,
)]
pub enum FaultCategory {
    Masked,
    #[strum(serialize = "AC-Detected")]
    AcDetected,
    #[strum(serialize = "OS-Detected")]
    OsDetected,
    Hang,
    #[strum(serialize = "SDC")]
    Sdc,
}

impl FaultCategory {
    pub const COUNT: usize = 5;

    /// Maps a raw harness counter to its category. `Masked` has no raw
    /// counter; it is derived from TOTAL, ANSUC and ANFAIL.
    pub fn from_raw(raw: &str) -> Option<FaultCategory> {
        match raw {
            "HANGED" => Some(FaultCategory::Hang),
            "ANUNEXP" => Some(FaultCategory::Sdc),
            "ANCRASH" => Some(FaultCategory::AcDetected),
            "OSCRASH" => Some(FaultCategory::OsDetected),
            _ => None,
        }
    }

    /// Input column a category's count is read from.
    pub fn raw_column(&self) -> &'static str {
        match self {
            FaultCategory::Masked => "TOTAL",
            FaultCategory::AcDetected => "ANCRASH",
            FaultCategory::OsDetected => "OSCRASH",
            FaultCategory::Hang => "HANGED",
            FaultCategory::Sdc => "ANUNEXP",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn labels() -> Vec<String> {
        FaultCategory::iter().map(|c| c.to_string()).collect()
    }
}

/// Raw counters the harness emits for one program run.
pub const RAW_COUNTERS: [&str; 4] = ["ANCRASH", "OSCRASH", "HANGED", "ANUNEXP"];

/// One row of a campaign result file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FaultOutcomeRecord {
    pub prog: String,
    pub total: i64,
    pub ansuc: i64,
    pub anfail: i64,
    pub ancrash: i64,
    pub oscrash: i64,
    pub hanged: i64,
    pub anunexp: i64,
}

impl FaultOutcomeRecord {
    pub fn from_table(table: &Table) -> AppResult<Vec<FaultOutcomeRecord>> {
        let prog = table.str_column("PROG")?;
        let total = table.i64_column("TOTAL")?;
        let ansuc = table.i64_column("ANSUC")?;
        let anfail = table.i64_column("ANFAIL")?;
        let ancrash = table.i64_column("ANCRASH")?;
        let oscrash = table.i64_column("OSCRASH")?;
        let hanged = table.i64_column("HANGED")?;
        let anunexp = table.i64_column("ANUNEXP")?;

        Ok((0..prog.len())
            .map(|i| FaultOutcomeRecord {
                prog: prog[i].clone(),
                total: total[i],
                ansuc: ansuc[i],
                anfail: anfail[i],
                ancrash: ancrash[i],
                oscrash: oscrash[i],
                hanged: hanged[i],
                anunexp: anunexp[i],
            })
            .collect())
    }

    /// `None` when the counters do not fit an `i64` difference.
    pub fn masked(&self) -> Option<i64> {
        self.total.checked_sub(self.ansuc)?.checked_sub(self.anfail)
    }

    pub fn raw(&self, counter: &str) -> Option<i64> {
        match counter {
            "ANCRASH" => Some(self.ancrash),
            "OSCRASH" => Some(self.oscrash),
            "HANGED" => Some(self.hanged),
            "ANUNEXP" => Some(self.anunexp),
            _ => None,
        }
    }

    /// Category counts of this single run.
    pub fn categories(&self) -> Option<[i64; FaultCategory::COUNT]> {
        let mut counts = [0; FaultCategory::COUNT];
        counts[FaultCategory::Masked.index()] = self.masked()?;
        for counter in RAW_COUNTERS {
            if let (Some(category), Some(value)) = (FaultCategory::from_raw(counter), self.raw(counter)) {
                counts[category.index()] = value;
            }
        }
        Some(counts)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FaultSummaryRow {
    pub program: String,
    pub counts: [i64; FaultCategory::COUNT],
}

impl FaultSummaryRow {
    pub fn count(&self, category: FaultCategory) -> i64 {
        self.counts[category.index()]
    }

    pub fn sum(&self) -> i64 {
        self.counts.iter().fold(0i64, |acc, c| acc.saturating_add(*c))
    }
}

/// Summed category counts, one row per program.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FaultSummaryTable {
    pub rows: Vec<FaultSummaryRow>,
}

impl FaultSummaryTable {
    pub fn row(&self, program: &str) -> Option<&FaultSummaryRow> {
        self.rows.iter().find(|r| r.program == program)
    }

    pub fn programs(&self) -> Vec<String> {
        self.rows.iter().map(|r| r.program.clone()).collect()
    }

    pub fn write_csv<W: io::Write>(&self, writer: W) -> AppResult<()> {
        let mut w = csv::Writer::from_writer(writer);
        let mut header = vec!["PROG".to_string()];
        header.extend(FaultCategory::labels());
        w.write_record(&header).map_err(io::Error::from)?;
        for row in &self.rows {
            let mut record = vec![row.program.clone()];
            record.extend(row.counts.iter().map(|c| c.to_string()));
            w.write_record(&record).map_err(io::Error::from)?;
        }
        w.flush()?;
        Ok(())
    }
}
