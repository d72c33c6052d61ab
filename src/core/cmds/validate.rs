use std::path::{Path, PathBuf};

use log::info;

use crate::core::analysis::perf::{log_summary, validation_slowdown};
use crate::core::cli::ValidateArgs;
use crate::core::cmds::write_csv_file;
use crate::types::{AppResult, SlowdownTable};

pub const OUTPUT_CSV: &str = "mul100-slowdown.csv";

/// Computes and stores the validation slowdown of `dir`.
pub fn run(dir: &Path) -> AppResult<(SlowdownTable, PathBuf)> {
    let table = validation_slowdown(dir)?;
    log_summary("Matrix multiplication", &table);
    let path = dir.join(OUTPUT_CSV);
    write_csv_file(&path, |file| table.write_csv(file))?;
    Ok((table, path))
}

pub fn execute_validate(args: ValidateArgs) -> AppResult<()> {
    let dir = match args.dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    info!("Validating encoded multiplication in {}", dir.display());
    run(&dir)?;
    Ok(())
}
