use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::info;

use crate::core::analysis::faults::aggregate;
use crate::core::analysis::loader::{FI_DELIMITER, load_concat};
use crate::core::chart::{
    BarMode, BarTable, Chart, ChartRenderer, ChartStyleConfig, Layout, LegendMode, Orientation,
    Panel, TickLabels,
};
use crate::core::cli::FiArgs;
use crate::core::cmds::{OutputSettings, write_csv_file};
use crate::types::config::{FiConfig, config};
use crate::types::{AppResult, FaultCategory, FaultSummaryTable};

pub const CHART_BASENAME: &str = "fi";

/// Where campaign results live and how programs are named.
#[derive(Debug, Clone)]
pub struct Campaigns {
    pub results_dir: String,
    pub names: Vec<String>,
    pub display_names: BTreeMap<String, String>,
}

impl Campaigns {
    pub fn from_config(cfg: &FiConfig) -> Self {
        Self {
            results_dir: cfg.results_dir().to_string(),
            names: cfg.campaigns(),
            display_names: cfg.display_names(),
        }
    }

    fn pattern(&self, root: &Path, campaign: &str) -> String {
        root.join(&self.results_dir)
            .join(campaign)
            .join("*.txt")
            .to_string_lossy()
            .into_owned()
    }
}

impl Default for Campaigns {
    fn default() -> Self {
        Self::from_config(&FiConfig::default())
    }
}

#[derive(Debug)]
pub struct FiOutputs {
    pub summaries: Vec<(String, FaultSummaryTable)>,
    pub csv: Vec<PathBuf>,
    pub charts: Vec<PathBuf>,
}

fn panel_title(campaign: &str) -> String {
    match campaign {
        "perm" => "Permanent fault inj.".to_string(),
        "trans" => "Transient fault inj.".to_string(),
        other => other.to_string(),
    }
}

/// Side-by-side stacked bars under one shared five-column legend.
pub fn fi_chart(
    summaries: &[(String, FaultSummaryTable)],
    style: &ChartStyleConfig,
) -> AppResult<Chart> {
    let panels = summaries
        .iter()
        .enumerate()
        .map(|(i, (campaign, summary))| Panel {
            title: Some(panel_title(campaign)),
            x_ticks: TickLabels::Horizontal,
            y_ticks: i == 0,
            ..Panel::new(BarTable::from(summary), BarMode::Stacked)
        })
        .collect();

    ChartRenderer::new(style.clone()).render(
        Layout {
            orientation: Orientation::SideBySide,
            legend: LegendMode::Shared,
            legend_columns: Some(FaultCategory::COUNT),
        },
        panels,
    )
}

/// Aggregates every campaign under `root`. Summary CSVs go to `root`, the
/// chart to `chart_dir`.
pub fn run(
    root: &Path,
    chart_dir: &Path,
    campaigns: &Campaigns,
    settings: &OutputSettings,
) -> AppResult<FiOutputs> {
    let mut summaries = Vec::with_capacity(campaigns.names.len());
    let mut csv = Vec::with_capacity(campaigns.names.len());

    for campaign in &campaigns.names {
        let runs = load_concat(&campaigns.pattern(root, campaign), FI_DELIMITER)?;
        info!("{campaign}: {} runs", runs.len());
        let summary = aggregate(std::slice::from_ref(&runs), &campaigns.display_names)?;
        for row in &summary.rows {
            info!(
                "  {:<8} {}",
                row.program,
                row.counts
                    .iter()
                    .map(|c| format!("{c:>6}"))
                    .collect::<Vec<_>>()
                    .join(" ")
            );
        }

        let path = root.join(format!("fi-{campaign}.csv"));
        write_csv_file(&path, |file| summary.write_csv(file))?;
        csv.push(path);
        summaries.push((campaign.clone(), summary));
    }

    let chart = fi_chart(&summaries, &settings.style)?;
    let charts = settings
        .exporter
        .export(&chart, &chart_dir.join(CHART_BASENAME), &settings.formats)?;

    Ok(FiOutputs {
        summaries,
        csv,
        charts,
    })
}

pub fn execute_fi(args: FiArgs) -> AppResult<()> {
    let cwd = std::env::current_dir()?;
    let root = args.root.unwrap_or_else(|| cwd.clone());
    info!("Aggregating fault injection results in {}", root.display());

    let cfg = config();
    let settings = OutputSettings::from_config(cfg)?;
    run(&root, &cwd, &Campaigns::from_config(&cfg.fi()), &settings)?;
    Ok(())
}
