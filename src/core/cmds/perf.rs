use std::path::{Path, PathBuf};

use log::info;

use crate::core::analysis::perf::{log_summary, slowdown_table};
use crate::core::chart::{
    BarMode, BarTable, Chart, ChartRenderer, ChartStyleConfig, Layout, LegendMode, Orientation,
    Panel, TickLabels,
};
use crate::core::cli::PerfArgs;
use crate::core::cmds::{OutputSettings, write_csv_file};
use crate::types::config::config;
use crate::types::{AppError, AppResult, SlowdownTable, WordWidth};

pub const CHART_BASENAME: &str = "perf";

#[derive(Debug)]
pub struct PerfOutputs {
    pub table32: SlowdownTable,
    pub table64: SlowdownTable,
    pub csv: Vec<PathBuf>,
    pub charts: Vec<PathBuf>,
}

fn csv_name(width: WordWidth) -> String {
    format!("out{}.csv", width.bits())
}

/// Two stacked panels, 32-bit on top, grouped bars on a log2 axis.
pub fn perf_chart(
    table32: &SlowdownTable,
    table64: &SlowdownTable,
    style: &ChartStyleConfig,
) -> AppResult<Chart> {
    let panel = |table: &SlowdownTable, bottom: bool| Panel {
        log2_y: true,
        y_label: Some("Slowdown".to_string()),
        x_label: bottom.then(|| "Operations".to_string()),
        x_ticks: if bottom {
            TickLabels::Vertical
        } else {
            TickLabels::Hidden
        },
        ..Panel::new(BarTable::from(table), BarMode::Grouped)
    };

    ChartRenderer::new(style.clone()).render(
        Layout {
            orientation: Orientation::Stacked,
            legend: LegendMode::PerPanel,
            legend_columns: None,
        },
        vec![panel(table32, false), panel(table64, true)],
    )
}

/// Runs the performance pipeline on `dir`; every output lands in `dir`.
pub fn run(dir: &Path, settings: &OutputSettings) -> AppResult<PerfOutputs> {
    if !dir.is_dir() {
        return Err(AppError::MissingFile(dir.to_path_buf()));
    }

    let table32 = slowdown_table(dir, WordWidth::W32)?;
    log_summary("32-bit", &table32);
    let table64 = slowdown_table(dir, WordWidth::W64)?;
    log_summary("64-bit", &table64);

    let mut csv = Vec::new();
    for (width, table) in [(WordWidth::W32, &table32), (WordWidth::W64, &table64)] {
        let path = dir.join(csv_name(width));
        write_csv_file(&path, |file| table.write_csv(file))?;
        csv.push(path);
    }

    let chart = perf_chart(&table32, &table64, &settings.style)?;
    let charts = settings
        .exporter
        .export(&chart, &dir.join(CHART_BASENAME), &settings.formats)?;

    Ok(PerfOutputs {
        table32,
        table64,
        csv,
        charts,
    })
}

pub fn execute_perf(args: PerfArgs) -> AppResult<()> {
    info!("Computing slowdowns in {}", args.dir.display());
    let settings = OutputSettings::from_config(config())?;
    run(&args.dir, &settings)?;
    Ok(())
}
