use std::path::Path;

use log::{debug, info};

use crate::core::analysis::loader::{PERF_DELIMITER, load_table};
use crate::core::analysis::ratio::{MedianSet, compute_ratios, short_tag};
use crate::types::{
    AppResult, PerformanceRecord, RatioFormula, Scheme, SlowdownTable, WordWidth,
};

/// Plain and encoded timings of the matrix multiplication validation run.
pub const VALIDATION_PLAIN: &str = "mul100.csv";
pub const VALIDATION_ENCODED: &str = "mul100-enc.csv";

fn load_records(dir: &Path, file_name: &str) -> AppResult<Vec<PerformanceRecord>> {
    let table = load_table(&dir.join(file_name), PERF_DELIMITER)?;
    PerformanceRecord::from_table(&table)
}

/// Builds the slowdown table of every encoded scheme for one word width.
pub fn slowdown_table(dir: &Path, width: WordWidth) -> AppResult<SlowdownTable> {
    let baseline_file = Scheme::None.file_name(width);
    let baseline = load_records(dir, &baseline_file)?;
    let baseline_set = MedianSet::new(&baseline_file, &baseline);

    let order: Vec<String> = baseline.iter().map(|r| r.tag.clone()).collect();
    let mut table = SlowdownTable::new(Some(width), order);

    for scheme in Scheme::ENCODED {
        let file = scheme.file_name(width);
        let measured = load_records(dir, &file)?;
        let ratios = compute_ratios(
            &MedianSet::new(&file, &measured),
            &baseline_set,
            scheme.ratio_formula(),
        )?;
        debug!("{}: {} ratios", file, ratios.len());
        table.push_ratios(scheme.label(width), &ratios);
    }

    table.tags = table.tags.iter().map(|t| short_tag(t)).collect();
    Ok(table)
}

/// Slowdown of the encoded matrix multiplication against the plain one.
pub fn validation_slowdown(dir: &Path) -> AppResult<SlowdownTable> {
    let plain = load_records(dir, VALIDATION_PLAIN)?;
    let encoded = load_records(dir, VALIDATION_ENCODED)?;

    let ratios = compute_ratios(
        &MedianSet::new(VALIDATION_ENCODED, &encoded),
        &MedianSet::new(VALIDATION_PLAIN, &plain),
        RatioFormula::Direct,
    )?;

    let order: Vec<String> = ratios.iter().map(|(t, _)| t.clone()).collect();
    let mut table = SlowdownTable::new(None, order);
    table.push_ratios("Slowdown", &ratios);
    table.tags = table.tags.iter().map(|t| short_tag(t)).collect();
    Ok(table)
}

/// Logs the leading rows and the per-column means.
pub fn log_summary(title: &str, table: &SlowdownTable) {
    info!("{title}: {} operations", table.row_count());
    info!("  {:<12} | {}", "TAGS", table.columns.join(" | "));
    for (tag, row) in table.tags.iter().zip(&table.cells).take(5) {
        let cells: Vec<String> = row
            .iter()
            .map(|v| v.map(|v| format!("{v:.3}")).unwrap_or_else(|| "-".to_string()))
            .collect();
        info!("  {:<12} | {}", tag, cells.join(" | "));
    }
    for (column, mean) in table.column_means() {
        match mean {
            Some(mean) => info!("  mean {column}: {mean:.3}"),
            None => info!("  mean {column}: N/A"),
        }
    }
}
