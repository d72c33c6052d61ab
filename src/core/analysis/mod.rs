pub mod faults;
pub mod loader;
pub mod perf;
pub mod ratio;
