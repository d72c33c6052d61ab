use console::style;
use log::{Level, LevelFilter};

use crate::types::config::{colors_enabled, config};
use crate::types::{AppError, AppResult};

fn level_label(level: Level) -> String {
    let name = level.to_string().to_lowercase();
    let styled = match level {
        Level::Error => style(name).red().bold(),
        Level::Warn => style(name).yellow().bold(),
        Level::Info => style(name).green(),
        Level::Debug => style(name).blue(),
        Level::Trace => style(name).dim(),
    };
    format!("{}:", styled.for_stderr())
}

pub fn parse_level(level: &str) -> AppResult<LevelFilter> {
    level
        .trim()
        .parse::<LevelFilter>()
        .map_err(|_| AppError::Config(format!("unknown log level '{level}'")))
}

/// Installs the stderr logger. Info lines carry no prefix so command output
/// reads as plain text.
pub fn init_logging() -> AppResult<()> {
    let level = parse_level(config().log().level())?;
    console::set_colors_enabled_stderr(colors_enabled());

    fern::Dispatch::new()
        .format(|out, message, record| {
            if record.level() == Level::Info {
                out.finish(format_args!("{message}"))
            } else {
                out.finish(format_args!("{} {message}", level_label(record.level())))
            }
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()
        .map_err(|e| AppError::Custom(format!("failed to install logger: {e}")))
}
