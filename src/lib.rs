pub mod core;

// Re-export key items for easy importing in this crate
pub use core::types;

// Re-export key items for easy importing in other crates
pub use core::analysis::{faults, loader, perf, ratio};
pub use core::chart::{ChartRenderer, ChartStyleConfig, ExportFormat, Exporter};
pub use core::cmds::OutputSettings;
pub use core::main_shared::{report_error, run_main};
