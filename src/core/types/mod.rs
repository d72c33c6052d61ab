pub mod config;
mod error;
mod fault;
mod perf;
mod slowdown;
mod table;

pub use error::*;
pub use fault::*;
pub use perf::*;
pub use slowdown::*;
pub use table::*;
