pub mod export;
pub mod render;
pub mod style;
pub mod vector;

pub use export::{ExportFormat, Exporter};
pub use render::{
    BarMode, BarTable, Chart, ChartRenderer, Layout, LegendMode, Orientation, Panel, TickLabels,
};
pub use style::{ChartStyleConfig, PixelScale};
