use std::fs::File;
use std::path::Path;

use log::info;

use crate::core::chart::{ChartStyleConfig, ExportFormat, Exporter};
use crate::types::config::Config;
use crate::types::{AppError, AppResult};

pub mod fi;
pub mod init;
pub mod perf;
pub mod print;
pub mod validate;

pub use fi::execute_fi;
pub use init::execute_init;
pub use perf::execute_perf;
pub use print::execute_print;
pub use validate::execute_validate;

/// Everything a pipeline needs to turn tables into figures.
#[derive(Debug, Clone)]
pub struct OutputSettings {
    pub style: ChartStyleConfig,
    pub exporter: Exporter,
    pub formats: Vec<ExportFormat>,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            style: ChartStyleConfig::default(),
            exporter: Exporter::default(),
            formats: vec![ExportFormat::Png, ExportFormat::Pdf, ExportFormat::Eps],
        }
    }
}

impl OutputSettings {
    pub fn from_config(cfg: &Config) -> AppResult<Self> {
        let export = cfg.export();
        Ok(Self {
            style: ChartStyleConfig::from_config(&cfg.style())?,
            exporter: Exporter::from_config(&export)?,
            formats: ExportFormat::parse_list(&export.formats())?,
        })
    }
}

/// Creates `path` and hands the file to `write`.
pub(crate) fn write_csv_file(
    path: &Path,
    write: impl FnOnce(File) -> AppResult<()>,
) -> AppResult<()> {
    let file = File::create(path).map_err(|e| AppError::filesystem(path, e))?;
    write(file)?;
    info!("Wrote {}", path.display());
    Ok(())
}
