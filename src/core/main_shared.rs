use std::env;
use std::path::PathBuf;

use clap::Parser;
use log::{LevelFilter, debug, error};

use crate::core::cli::{Args, Commands, PrintArgs};
use crate::core::cmds;
use crate::core::logging::init_logging;
use crate::types::config::{CliOverrides, init_with_overrides};
use crate::types::{AppError, AppResult};

pub fn run_main() -> AppResult<()> {
    let args = Args::parse();

    // Handle global arguments
    if let Some(cwd_arg) = args.cwd.as_ref() {
        let cwd = PathBuf::from(cwd_arg)
            .canonicalize()
            .map_err(|e| AppError::filesystem(cwd_arg, e))?;
        env::set_current_dir(&cwd).map_err(|e| AppError::filesystem(&cwd, e))?;
    }

    // Build CLI overrides for config precedence
    let cli_overrides = CliOverrides {
        config: args.config.clone(),
        log_level: args.log_level.clone(),
        log_color: args.log_color.clone(),
    };

    // Logging comes up even when the config is broken so the failure is reported
    let loaded = init_with_overrides(&cli_overrides);
    init_logging()?;
    loaded?;
    debug!("Current working directory: {}", env::current_dir()?.display());

    match args.command {
        Commands::Init => cmds::execute_init(),
        Commands::Perf(perf_args) => cmds::execute_perf(perf_args),
        Commands::Fi(fi_args) => cmds::execute_fi(fi_args),
        Commands::Validate(validate_args) => cmds::execute_validate(validate_args),
        Commands::Print {
            command: PrintArgs::Config(print_args),
        } => cmds::execute_print(cmds::print::PrintCommand::Config(print_args.format)),
    }
}

/// Reports a failed run through the logger, or stderr if none was installed.
pub fn report_error(err: &AppError) {
    if log::max_level() == LevelFilter::Off {
        eprintln!("error: {err}");
    } else {
        error!("{err}");
    }
}
