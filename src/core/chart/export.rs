use std::ffi::OsString;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info};
use plotters::prelude::*;
use strum::{Display, EnumString};

use crate::core::chart::render::{Chart, render_err};
use crate::core::chart::style::PixelScale;
use crate::core::chart::vector::{PageEncoder, VectorBackend};
use crate::types::config::ExportConfig;
use crate::types::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ExportFormat {
    Png,
    Pdf,
    Eps,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Eps => "eps",
        }
    }

    pub fn parse_list(names: &[String]) -> AppResult<Vec<ExportFormat>> {
        names
            .iter()
            .map(|name| {
                name.trim().parse::<ExportFormat>().map_err(|_| {
                    AppError::Config(format!("unknown export format '{name}' (png, pdf, eps)"))
                })
            })
            .collect()
    }
}

/// Physical output size shared by every format.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Exporter {
    pub width_cm: f64,
    pub height_cm: f64,
    pub dpi: u32,
}

impl Default for Exporter {
    fn default() -> Self {
        Self {
            width_cm: 12.5,
            height_cm: 8.0,
            dpi: 500,
        }
    }
}

/// `base` plus `.ext`, keeping any dots already in the file name.
pub fn with_format(base: &Path, format: ExportFormat) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(".");
    name.push(format.extension());
    PathBuf::from(name)
}

impl Exporter {
    pub fn from_config(cfg: &ExportConfig) -> AppResult<Self> {
        let exporter = Self {
            width_cm: cfg.width_cm(),
            height_cm: cfg.height_cm(),
            dpi: cfg.dpi(),
        };
        if exporter.width_cm <= 0.0 || exporter.height_cm <= 0.0 || exporter.dpi == 0 {
            return Err(AppError::Config(
                "export size and dpi must be positive".into(),
            ));
        }
        Ok(exporter)
    }

    pub fn size_px(&self) -> (u32, u32) {
        let px = |cm: f64| (cm / 2.54 * self.dpi as f64).round().max(1.0) as u32;
        (px(self.width_cm), px(self.height_cm))
    }

    pub fn scale(&self) -> PixelScale {
        PixelScale { dpi: self.dpi }
    }

    /// Writes one file per format next to `base`. Files written before a
    /// failing format stay on disk.
    pub fn export(
        &self,
        chart: &Chart,
        base: &Path,
        formats: &[ExportFormat],
    ) -> AppResult<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(formats.len());
        for format in formats {
            let path = with_format(base, *format);
            match format {
                ExportFormat::Png => self.write_png(chart, &path)?,
                ExportFormat::Pdf | ExportFormat::Eps => {
                    let bytes = self.render_vector(chart, *format)?;
                    fs::write(&path, bytes).map_err(|e| AppError::filesystem(&path, e))?;
                }
            }
            info!("Wrote {}", path.display());
            written.push(path);
        }
        Ok(written)
    }

    /// Renders a vector format into memory.
    pub fn render_vector(&self, chart: &Chart, format: ExportFormat) -> AppResult<Vec<u8>> {
        let size = self.size_px();
        let mut bytes = Vec::new();
        match format {
            ExportFormat::Pdf => {
                self.draw_vector(chart, VectorBackend::pdf(&mut bytes, size, self.dpi))?
            }
            ExportFormat::Eps => {
                self.draw_vector(chart, VectorBackend::eps(&mut bytes, size, self.dpi))?
            }
            ExportFormat::Png => {
                return Err(AppError::Render("png is not a vector format".into()));
            }
        }
        debug!("{format}: {} bytes", bytes.len());
        Ok(bytes)
    }

    fn draw_vector<E: PageEncoder>(
        &self,
        chart: &Chart,
        backend: VectorBackend<'_, E>,
    ) -> AppResult<()> {
        let root = backend.into_drawing_area();
        chart.draw(&root, self.scale())?;
        root.present().map_err(render_err)
    }

    fn write_png(&self, chart: &Chart, path: &Path) -> AppResult<()> {
        // Surface an unwritable destination before any drawing happens
        File::create(path).map_err(|e| AppError::filesystem(path, e))?;

        let root = BitMapBackend::new(path, self.size_px()).into_drawing_area();
        chart.draw(&root, self.scale())?;
        root.present()
            .map_err(|e| AppError::filesystem(path, io::Error::other(e.to_string())))
    }
}
