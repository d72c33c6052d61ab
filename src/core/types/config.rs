use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::types::{AppError, AppResult};

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct LogConfig {
    pub level: Option<String>,
    pub color: Option<bool>, // None = auto-detect (semantic)
}

impl LogConfig {
    pub fn level(&self) -> &str {
        self.level.as_deref().unwrap_or("info")
    }

    pub fn color(&self) -> Option<bool> {
        self.color // None has semantic meaning (auto-detect)
    }

    pub fn to_effective(&self) -> Self {
        Self {
            level: Some(self.level().to_string()),
            color: self.color,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ExportConfig {
    pub formats: Option<Vec<String>>,
    pub width_cm: Option<f64>,
    pub height_cm: Option<f64>,
    pub dpi: Option<u32>,
}

impl ExportConfig {
    pub fn formats(&self) -> Vec<String> {
        self.formats
            .clone()
            .unwrap_or_else(|| vec!["png".into(), "pdf".into(), "eps".into()])
    }

    pub fn width_cm(&self) -> f64 {
        self.width_cm.unwrap_or(12.5)
    }

    pub fn height_cm(&self) -> f64 {
        self.height_cm.unwrap_or(8.0)
    }

    pub fn dpi(&self) -> u32 {
        self.dpi.unwrap_or(500)
    }

    pub fn to_effective(&self) -> Self {
        Self {
            formats: Some(self.formats()),
            width_cm: Some(self.width_cm()),
            height_cm: Some(self.height_cm()),
            dpi: Some(self.dpi()),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct StyleConfig {
    pub font_family: Option<String>,
    pub font_size_pt: Option<f64>,
    pub legend_font_size_pt: Option<f64>,
    pub line_width_pt: Option<f64>,
    pub edge_width_pt: Option<f64>,
    pub bar_width: Option<f64>,
    pub palette: Option<Vec<String>>, // "#rrggbb"
}

impl StyleConfig {
    pub fn to_effective(&self) -> Self {
        self.clone()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct FiConfig {
    pub results_dir: Option<String>,
    pub campaigns: Option<Vec<String>>,
    pub display_names: Option<BTreeMap<String, String>>,
}

impl FiConfig {
    pub fn results_dir(&self) -> &str {
        self.results_dir.as_deref().unwrap_or("faultsim-res")
    }

    pub fn campaigns(&self) -> Vec<String> {
        self.campaigns
            .clone()
            .unwrap_or_else(|| vec!["perm".into(), "trans".into()])
    }

    pub fn display_names(&self) -> BTreeMap<String, String> {
        self.display_names.clone().unwrap_or_else(|| {
            BTreeMap::from([
                ("val-mul".to_string(), "Native".to_string()),
                ("val-mul-enc".to_string(), "AC".to_string()),
            ])
        })
    }

    pub fn to_effective(&self) -> Self {
        Self {
            results_dir: Some(self.results_dir().to_string()),
            campaigns: Some(self.campaigns()),
            display_names: Some(self.display_names()),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    // Nested sections
    pub log: Option<LogConfig>,
    pub export: Option<ExportConfig>,
    pub style: Option<StyleConfig>,
    pub fi: Option<FiConfig>,
}

impl Config {
    pub fn log(&self) -> LogConfig {
        self.log.clone().unwrap_or_default()
    }

    pub fn export(&self) -> ExportConfig {
        self.export.clone().unwrap_or_default()
    }

    pub fn style(&self) -> StyleConfig {
        self.style.clone().unwrap_or_default()
    }

    pub fn fi(&self) -> FiConfig {
        self.fi.clone().unwrap_or_default()
    }

    pub fn to_effective(&self) -> Self {
        Self {
            log: Some(self.log().to_effective()),
            export: Some(self.export().to_effective()),
            style: Some(self.style().to_effective()),
            fi: Some(self.fi().to_effective()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_color: Option<String>, // "on" | "off"
}

pub const CONFIG_FILENAME: &str = "acplot.toml";

static CONFIG: OnceCell<Config> = OnceCell::new();

pub fn config() -> &'static Config {
    CONFIG.get_or_init(|| {
        let mut cfg = Config::default();
        if let Some(path) = find_nearest_config_file()
            && let Ok(file_cfg) = read_config_file(&path)
        {
            apply_file_config(&mut cfg, &file_cfg);
        }
        cfg
    })
}

pub fn init_with_overrides(overrides: &CliOverrides) -> AppResult<()> {
    let mut cfg = Config::default();

    // 1) Config file: explicit path, else walk up from cwd
    let path = match &overrides.config {
        Some(path) if !path.exists() => return Err(AppError::MissingFile(path.clone())),
        Some(path) => Some(path.clone()),
        None => find_nearest_config_file(),
    };
    if let Some(path) = path {
        let file_cfg = read_config_file(&path)?;
        apply_file_config(&mut cfg, &file_cfg);
    }

    // 2) CLI arguments (highest priority). Only override if user specified.
    apply_cli_overrides(&mut cfg, overrides);

    let _ = CONFIG.set(cfg);
    Ok(())
}

pub fn read_config_file(path: &Path) -> AppResult<Config> {
    let contents = fs::read_to_string(path)?;
    toml::from_str::<Config>(&contents)
        .map_err(|e| AppError::Config(format!("{}: {e}", path.display())))
}

fn apply_file_config(cfg: &mut Config, file: &Config) {
    // Merge log section
    if let Some(file_log) = &file.log {
        let mut log = cfg.log.clone().unwrap_or_default();
        if file_log.level.is_some() {
            log.level = file_log.level.clone();
        }
        if file_log.color.is_some() {
            log.color = file_log.color;
        }
        cfg.log = Some(log);
    }

    // Merge export section
    if let Some(file_export) = &file.export {
        let mut export = cfg.export.clone().unwrap_or_default();
        if file_export.formats.is_some() {
            export.formats = file_export.formats.clone();
        }
        if file_export.width_cm.is_some() {
            export.width_cm = file_export.width_cm;
        }
        if file_export.height_cm.is_some() {
            export.height_cm = file_export.height_cm;
        }
        if file_export.dpi.is_some() {
            export.dpi = file_export.dpi;
        }
        cfg.export = Some(export);
    }

    // Style fields replace one by one
    if let Some(file_style) = &file.style {
        let mut style = cfg.style.clone().unwrap_or_default();
        if file_style.font_family.is_some() {
            style.font_family = file_style.font_family.clone();
        }
        if file_style.font_size_pt.is_some() {
            style.font_size_pt = file_style.font_size_pt;
        }
        if file_style.legend_font_size_pt.is_some() {
            style.legend_font_size_pt = file_style.legend_font_size_pt;
        }
        if file_style.line_width_pt.is_some() {
            style.line_width_pt = file_style.line_width_pt;
        }
        if file_style.edge_width_pt.is_some() {
            style.edge_width_pt = file_style.edge_width_pt;
        }
        if file_style.bar_width.is_some() {
            style.bar_width = file_style.bar_width;
        }
        if file_style.palette.is_some() {
            style.palette = file_style.palette.clone();
        }
        cfg.style = Some(style);
    }

    // Merge fi section; display names extend the defaults
    if let Some(file_fi) = &file.fi {
        let mut fi = cfg.fi.clone().unwrap_or_default();
        if file_fi.results_dir.is_some() {
            fi.results_dir = file_fi.results_dir.clone();
        }
        if file_fi.campaigns.is_some() {
            fi.campaigns = file_fi.campaigns.clone();
        }
        if let Some(names) = &file_fi.display_names {
            let mut merged = fi.display_names();
            merged.extend(names.clone());
            fi.display_names = Some(merged);
        }
        cfg.fi = Some(fi);
    }
}

fn apply_cli_overrides(cfg: &mut Config, overrides: &CliOverrides) {
    // Log overrides
    let mut log = cfg.log.clone().unwrap_or_default();
    if let Some(level) = &overrides.log_level
        && !level.trim().is_empty()
    {
        log.level = Some(level.trim().to_string());
    }
    if let Some(color_str) = &overrides.log_color {
        match color_str.to_lowercase().as_str() {
            "on" => log.color = Some(true),
            "off" => log.color = Some(false),
            _ => {}
        }
    }
    if overrides.log_level.is_some() || overrides.log_color.is_some() {
        cfg.log = Some(log);
    }
}

fn find_nearest_config_file() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    for dir in cwd.ancestors() {
        let candidate = dir.join(CONFIG_FILENAME);
        if candidate.exists() {
            return Some(candidate);
        }
    }
    None
}

pub fn colors_enabled() -> bool {
    match config().log().color() {
        Some(force) => force,
        None => console::colors_enabled(),
    }
}
