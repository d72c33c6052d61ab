use std::collections::BTreeMap;

use log::debug;
use strum::IntoEnumIterator;

use crate::types::{
    AppError, AppResult, FaultCategory, FaultOutcomeRecord, FaultSummaryRow, FaultSummaryTable, Table,
};

/// Sums per-run outcome counters into one category row per program.
///
/// `Masked` is derived per run before summing. Groups are ordered by raw
/// program identity, then renamed through `display_names`; identities
/// without an entry keep their raw name.
pub fn aggregate(
    tables: &[Table],
    display_names: &BTreeMap<String, String>,
) -> AppResult<FaultSummaryTable> {
    let mut groups: BTreeMap<String, [i64; FaultCategory::COUNT]> = BTreeMap::new();

    for table in tables {
        let records = FaultOutcomeRecord::from_table(table)?;
        debug!("{}: {} runs", table.source_name(), records.len());
        for record in records {
            let overflow = |column: &str| {
                AppError::schema(
                    table.source_name(),
                    column,
                    format!("counters of program '{}' overflow", record.prog),
                )
            };
            let counts = record.categories().ok_or_else(|| overflow("TOTAL"))?;
            let sums = groups.entry(record.prog.clone()).or_insert([0; FaultCategory::COUNT]);
            for (category, (sum, count)) in FaultCategory::iter().zip(sums.iter_mut().zip(counts)) {
                *sum = sum
                    .checked_add(count)
                    .ok_or_else(|| overflow(category.raw_column()))?;
            }
        }
    }

    let rows = groups
        .into_iter()
        .map(|(program, counts)| FaultSummaryRow {
            program: display_name(&program, display_names),
            counts,
        })
        .collect();

    Ok(FaultSummaryTable { rows })
}

/// Display name for a raw program identity. Names that are already display
/// names map to themselves.
pub fn display_name(program: &str, display_names: &BTreeMap<String, String>) -> String {
    display_names
        .get(program)
        .cloned()
        .unwrap_or_else(|| program.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const HEADER: &str = "PROG,TOTAL,ANSUC,ANFAIL,ANCRASH,OSCRASH,HANGED,ANUNEXP,NONDIAG";

    fn table(rows: &[&str]) -> Table {
        let columns = HEADER.split(',').map(String::from).collect();
        let rows = rows
            .iter()
            .map(|r| r.split(',').map(String::from).collect())
            .collect();
        Table::new("run.txt", columns, rows)
    }

    fn names() -> BTreeMap<String, String> {
        BTreeMap::from([
            ("val-mul".to_string(), "Native".to_string()),
            ("val-mul-enc".to_string(), "AC".to_string()),
        ])
    }

    #[test]
    fn single_run_scenario() {
        let t = table(&["val-mul,100,80,5,3,2,4,6,0"]);
        let summary = aggregate(&[t], &names()).unwrap();
        assert_eq!(summary.rows.len(), 1);
        let native = summary.row("Native").unwrap();
        assert_eq!(native.counts, [15, 3, 2, 4, 6]);
        assert_eq!(native.sum(), 30);
    }

    #[test]
    fn runs_are_summed_across_tables() {
        let a = table(&["val-mul-enc,10,5,1,1,1,1,1,0", "val-mul,10,2,0,2,2,2,2,0"]);
        let b = table(&["val-mul-enc,20,10,2,3,3,1,1,0"]);
        let summary = aggregate(&[a, b], &names()).unwrap();

        assert_eq!(summary.programs(), vec!["Native", "AC"]);
        assert_eq!(summary.row("AC").unwrap().counts, [12, 4, 4, 2, 2]);
        assert_eq!(summary.row("Native").unwrap().counts, [8, 2, 2, 2, 2]);
    }

    #[test]
    fn masked_sum_matches_summed_totals() {
        let a = table(&["p,50,20,5,1,2,3,4,0", "p,70,30,10,0,0,0,0,0"]);
        let summary = aggregate(&[a], &names()).unwrap();
        let row = summary.row("p").unwrap();
        assert_eq!(row.count(FaultCategory::Masked), (50 + 70) - (20 + 30) - (5 + 10));
    }

    #[test]
    fn counter_overflow_is_schema_error() {
        let t = table(&[
            "p,9223372036854775807,0,0,0,0,0,0,0",
            "p,9223372036854775807,0,0,0,0,0,0,0",
        ]);
        let err = aggregate(&[t], &names()).unwrap_err();
        assert!(matches!(
            err,
            AppError::SchemaMismatch { ref reason, .. } if reason.contains("'p'")
        ));
    }

    #[test]
    fn unknown_programs_pass_through() {
        assert_eq!(display_name("val-add", &names()), "val-add");
        assert_eq!(display_name("val-mul", &names()), "Native");
        assert_eq!(display_name("Native", &names()), "Native");
    }

    #[test]
    fn missing_counter_column_is_schema_error() {
        let t = Table::new(
            "bad.txt",
            vec!["PROG".into(), "TOTAL".into()],
            vec![vec!["p".into(), "1".into()]],
        );
        assert!(aggregate(&[t], &names()).is_err());
    }
}
