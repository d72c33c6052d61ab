pub mod analysis;
pub mod chart;
pub mod cli;
pub mod cmds;
pub mod logging;
pub mod main_shared;
pub mod types;
