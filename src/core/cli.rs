use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// All relative paths will be interpreted relative to this directory.
    #[arg(long, global = true)]
    pub cwd: Option<String>,

    /// Configuration file to use instead of the nearest acplot.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Logging level (overrides config). One of: trace, debug, info, warn, error
    #[arg(long = "log.level", global = true)]
    pub log_level: Option<String>,

    /// Logging color control: "on" to force colors, "off" to disable; omit for auto
    #[arg(long = "log.color", global = true)]
    pub log_color: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write an example acplot.toml into the current directory
    Init,

    /// Slowdown of every encoded scheme against the unencoded baseline
    Perf(PerfArgs),

    /// Aggregate fault-injection campaigns into outcome categories
    Fi(FiArgs),

    /// Slowdown of the encoded matrix multiplication against the plain one
    Validate(ValidateArgs),

    /// Print various information
    Print {
        #[command(subcommand)]
        command: PrintArgs,
    },
}

/// Arguments for the perf command
#[derive(Parser, Debug)]
pub struct PerfArgs {
    /// Directory holding perf_<SCHEME>_<32|64>BIT.csv; outputs are written here too
    #[arg(value_name = "DIR")]
    pub dir: PathBuf,
}

/// Arguments for the fi command
#[derive(Parser, Debug)]
pub struct FiArgs {
    /// Directory containing the fault simulation results directory.
    /// Defaults to the current directory.
    #[arg(value_name = "ROOT")]
    pub root: Option<PathBuf>,
}

/// Arguments for the validate command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Directory holding mul100.csv and mul100-enc.csv.
    /// Defaults to the current directory.
    #[arg(value_name = "DIR")]
    pub dir: Option<PathBuf>,
}

/// Arguments for the print command
#[derive(Subcommand, Debug)]
pub enum PrintArgs {
    /// Print the effective global configuration
    Config(PrintConfigArgs),
}

/// Arguments for the print config subcommand
#[derive(Parser, Debug)]
pub struct PrintConfigArgs {
    /// Output format: "table" (default) or "json"
    #[arg(long, default_value = "table")]
    pub format: String,
}
