use plotters::coord::Shift;
use plotters::coord::ranged1d::ValueFormatter;
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::core::chart::style::{ChartStyleConfig, PixelScale};
use crate::types::{AppError, AppResult, FaultCategory, FaultSummaryTable, SlowdownTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarMode {
    Grouped,
    Stacked,
}

/// How panels share the figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    SideBySide,
    Stacked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegendMode {
    /// One legend across the top of the figure, taken from the first panel.
    Shared,
    /// A legend above every panel.
    PerPanel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickLabels {
    Hidden,
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub values: Vec<Option<f64>>,
}

/// Categories along x, one series per legend entry.
#[derive(Debug, Clone, PartialEq)]
pub struct BarTable {
    pub categories: Vec<String>,
    pub series: Vec<Series>,
}

impl BarTable {
    pub fn labels(&self) -> Vec<String> {
        self.series.iter().map(|s| s.label.clone()).collect()
    }

    fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.series
            .iter()
            .flat_map(|s| s.values.iter().flatten().copied())
            .filter(|v| v.is_finite())
    }

    fn stack_sums(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.categories.len()).map(|i| {
            self.series
                .iter()
                .filter_map(|s| s.values[i])
                .filter(|v| v.is_finite() && *v > 0.0)
                .sum()
        })
    }
}

impl From<&SlowdownTable> for BarTable {
    fn from(table: &SlowdownTable) -> Self {
        BarTable {
            categories: table.tags.clone(),
            series: table
                .columns
                .iter()
                .enumerate()
                .map(|(col, label)| Series {
                    label: label.clone(),
                    values: table.column_values(col),
                })
                .collect(),
        }
    }
}

impl From<&FaultSummaryTable> for BarTable {
    fn from(table: &FaultSummaryTable) -> Self {
        BarTable {
            categories: table.programs(),
            series: FaultCategory::labels()
                .into_iter()
                .enumerate()
                .map(|(idx, label)| Series {
                    label,
                    values: table
                        .rows
                        .iter()
                        .map(|row| Some(row.counts[idx] as f64))
                        .collect(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub data: BarTable,
    pub title: Option<String>,
    pub mode: BarMode,
    /// Base-2 logarithmic y axis.
    pub log2_y: bool,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub x_ticks: TickLabels,
    pub y_ticks: bool,
}

impl Panel {
    pub fn new(data: BarTable, mode: BarMode) -> Self {
        Self {
            data,
            title: None,
            mode,
            log2_y: false,
            x_label: None,
            y_label: None,
            x_ticks: TickLabels::Horizontal,
            y_ticks: true,
        }
    }

    /// Y range of the panel; the lower bound is where bars start.
    fn y_bounds(&self) -> (f64, f64) {
        let max = match self.mode {
            BarMode::Grouped => self.data.values().fold(f64::MIN, f64::max),
            BarMode::Stacked => self.data.stack_sums().fold(f64::MIN, f64::max),
        };
        if self.log2_y {
            let min = self
                .data
                .values()
                .filter(|v| *v > 0.0)
                .fold(f64::MAX, f64::min);
            if min == f64::MAX {
                return (1.0, 2.0);
            }
            let lo = min.log2().floor().exp2();
            let hi = max.log2().ceil().exp2();
            (lo, if hi > lo { hi } else { lo * 2.0 })
        } else if max > 0.0 {
            (0.0, max * 1.05)
        } else {
            (0.0, 1.0)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub orientation: Orientation,
    pub legend: LegendMode,
    /// Legend entries per row; `None` puts every entry on one row.
    pub legend_columns: Option<usize>,
}

/// A validated figure of one or two panels, ready to be drawn on any backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    layout: Layout,
    panels: Vec<Panel>,
    style: ChartStyleConfig,
}

pub struct ChartRenderer {
    style: ChartStyleConfig,
}

impl ChartRenderer {
    pub fn new(style: ChartStyleConfig) -> Self {
        Self { style }
    }

    pub fn render(&self, layout: Layout, panels: Vec<Panel>) -> AppResult<Chart> {
        if panels.is_empty() || panels.len() > 2 {
            return Err(AppError::Render(format!(
                "a chart has one or two panels, got {}",
                panels.len()
            )));
        }
        for panel in &panels {
            if panel.data.categories.is_empty() {
                return Err(AppError::Render("panel has no categories".into()));
            }
            if let Some(series) = panel
                .data
                .series
                .iter()
                .find(|s| s.values.len() != panel.data.categories.len())
            {
                return Err(AppError::Render(format!(
                    "series '{}' has {} values for {} categories",
                    series.label,
                    series.values.len(),
                    panel.data.categories.len()
                )));
            }
        }
        Ok(Chart {
            layout,
            panels,
            style: self.style.clone(),
        })
    }
}

pub(crate) fn render_err<E: std::fmt::Display>(e: E) -> AppError {
    AppError::Render(e.to_string())
}

fn font(style: &ChartStyleConfig, px: f64) -> FontDesc<'_> {
    (style.font_family.as_str(), px).into_font()
}

/// Tick text for plain-number axes: integers without decimals.
pub fn format_tick(v: f64) -> String {
    if (v - v.round()).abs() < 1e-9 {
        format!("{:.0}", v)
    } else {
        let s = format!("{:.3}", v);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

impl Chart {
    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn style(&self) -> &ChartStyleConfig {
        &self.style
    }

    pub fn draw<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
        scale: PixelScale,
    ) -> AppResult<()> {
        root.fill(&WHITE).map_err(render_err)?;

        let legend_h = |entries: usize| -> i32 {
            let columns = self.layout.legend_columns.unwrap_or(entries).max(1);
            let rows = entries.div_ceil(columns).max(1) as f64;
            (scale.px(self.style.legend_font_size_pt) * (1.6 * rows + 0.6)).round() as i32
        };

        let body = match self.layout.legend {
            LegendMode::Shared => {
                let labels = self.panels[0].data.labels();
                let (top, body) = root.split_vertically(legend_h(labels.len()));
                self.draw_legend(&top, &labels, scale)?;
                body
            }
            LegendMode::PerPanel => root.clone(),
        };

        let areas = match self.layout.orientation {
            Orientation::SideBySide => body.split_evenly((1, self.panels.len())),
            Orientation::Stacked => body.split_evenly((self.panels.len(), 1)),
        };

        for (panel, area) in self.panels.iter().zip(areas) {
            let area = match self.layout.legend {
                LegendMode::PerPanel => {
                    let labels = panel.data.labels();
                    let (top, rest) = area.split_vertically(legend_h(labels.len()));
                    self.draw_legend(&top, &labels, scale)?;
                    rest
                }
                LegendMode::Shared => area,
            };
            self.draw_panel(&area, panel, scale)?;
        }
        Ok(())
    }

    fn draw_legend<DB: DrawingBackend>(
        &self,
        area: &DrawingArea<DB, Shift>,
        labels: &[String],
        scale: PixelScale,
    ) -> AppResult<()> {
        if labels.is_empty() {
            return Ok(());
        }
        let (w, h) = area.dim_in_pixel();
        let (w, h) = (w as i32, h as i32);
        let font_px = scale.px(self.style.legend_font_size_pt);
        let pad = scale.px_i32(1.5);
        let frame = BLACK.stroke_width(scale.stroke(self.style.line_width_pt));
        let edge = BLACK.stroke_width(scale.stroke(self.style.edge_width_pt));

        area.draw(&Rectangle::new([(pad, pad), (w - pad, h - pad)], frame))
            .map_err(render_err)?;

        let columns = self.layout.legend_columns.unwrap_or(labels.len()).max(1);
        let rows = labels.len().div_ceil(columns) as i32;
        let col_w = (w - 2 * pad) / columns as i32;
        let row_h = (h - 2 * pad) / rows.max(1);
        let swatch_w = (font_px * 1.6).round() as i32;
        let swatch_h = (font_px * 0.7).round() as i32;
        let text_style = font(&self.style, font_px)
            .color(&BLACK)
            .pos(Pos::new(HPos::Left, VPos::Center));

        for (i, label) in labels.iter().enumerate() {
            let col = (i % columns) as i32;
            let row = (i / columns) as i32;
            let x = 2 * pad + col * col_w;
            let yc = pad + row * row_h + row_h / 2;
            let corners = [(x, yc - swatch_h / 2), (x + swatch_w, yc + swatch_h / 2)];
            area.draw(&Rectangle::new(corners, self.style.color(i).filled()))
                .map_err(render_err)?;
            area.draw(&Rectangle::new(corners, edge)).map_err(render_err)?;
            area.draw(&Text::new(label.clone(), (x + swatch_w + pad, yc), text_style.clone()))
                .map_err(render_err)?;
        }
        Ok(())
    }

    fn draw_panel<DB: DrawingBackend>(
        &self,
        area: &DrawingArea<DB, Shift>,
        panel: &Panel,
        scale: PixelScale,
    ) -> AppResult<()> {
        let font_px = scale.px(self.style.font_size_pt);
        let longest = panel
            .data
            .categories
            .iter()
            .map(|c| c.chars().count())
            .max()
            .unwrap_or(0) as f64;

        let mut x_area = match panel.x_ticks {
            TickLabels::Hidden => font_px * 0.3,
            TickLabels::Horizontal => font_px * 1.6,
            TickLabels::Vertical => font_px * (0.6 * longest + 1.0),
        };
        if panel.x_label.is_some() {
            x_area += font_px * 1.4;
        }
        let mut y_area = if panel.y_ticks { font_px * 3.0 } else { font_px * 0.3 };
        if panel.y_label.is_some() {
            y_area += font_px * 1.4;
        }

        let mut builder = ChartBuilder::on(area);
        builder
            .margin(scale.px_i32(2.0))
            .x_label_area_size(x_area.round() as i32)
            .y_label_area_size(y_area.round() as i32);
        if let Some(title) = &panel.title {
            builder.caption(title, font(&self.style, font_px).style(FontStyle::Bold));
        }

        let n = panel.data.categories.len() as f64;
        let x_range = -0.5..(n - 0.5);
        let (lo, hi) = panel.y_bounds();
        if panel.log2_y {
            let mut chart = builder
                .build_cartesian_2d(x_range, (lo..hi).log_scale().base(2.0))
                .map_err(render_err)?;
            self.draw_bars(&mut chart, panel, scale, lo)
        } else {
            let mut chart = builder
                .build_cartesian_2d(x_range, lo..hi)
                .map_err(render_err)?;
            self.draw_bars(&mut chart, panel, scale, lo)
        }
    }

    fn draw_bars<DB, Y>(
        &self,
        chart: &mut ChartContext<'_, DB, Cartesian2d<RangedCoordf64, Y>>,
        panel: &Panel,
        scale: PixelScale,
        floor: f64,
    ) -> AppResult<()>
    where
        DB: DrawingBackend,
        Y: Ranged<ValueType = f64> + ValueFormatter<f64>,
    {
        let font_px = scale.px(self.style.font_size_pt);
        let label_font = font(&self.style, font_px);
        let categories = &panel.data.categories;

        let category_label = |x: &f64| -> String {
            let idx = x.round();
            if (x - idx).abs() > 1e-6 || idx < 0.0 {
                return String::new();
            }
            categories.get(idx as usize).cloned().unwrap_or_default()
        };
        let blank = |_: &f64| String::new();
        let y_tick = |y: &f64| format_tick(*y);

        let x_fmt: &dyn Fn(&f64) -> String = match panel.x_ticks {
            TickLabels::Hidden => &blank,
            _ => &category_label,
        };
        let y_fmt: &dyn Fn(&f64) -> String = if panel.y_ticks { &y_tick } else { &blank };
        let x_label_style = match panel.x_ticks {
            TickLabels::Vertical => label_font.clone().transform(FontTransform::Rotate90),
            _ => label_font.clone(),
        };

        let mut mesh = chart.configure_mesh();
        mesh.disable_x_mesh()
            .disable_y_mesh()
            .axis_style(BLACK.stroke_width(scale.stroke(self.style.line_width_pt)))
            .x_labels(categories.len())
            .x_label_formatter(x_fmt)
            .y_label_formatter(y_fmt)
            .x_label_style(x_label_style)
            .y_label_style(label_font.clone())
            .axis_desc_style(label_font.clone());
        if let Some(x_label) = &panel.x_label {
            mesh.x_desc(x_label.as_str());
        }
        if let Some(y_label) = &panel.y_label {
            mesh.y_desc(y_label.as_str());
        }
        mesh.draw().map_err(render_err)?;

        let bars = layout_bars(panel, self.style.bar_width, floor);
        let edge = BLACK.stroke_width(scale.stroke(self.style.edge_width_pt));

        chart
            .draw_series(bars.iter().map(|b| {
                Rectangle::new(
                    [(b.x0, b.y0), (b.x1, b.y1)],
                    self.style.color(b.series).filled(),
                )
            }))
            .map_err(render_err)?;
        chart
            .draw_series(
                bars.iter()
                    .map(|b| Rectangle::new([(b.x0, b.y0), (b.x1, b.y1)], edge)),
            )
            .map_err(render_err)?;
        Ok(())
    }
}

/// One bar in data coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Bar {
    series: usize,
    x0: f64,
    x1: f64,
    y0: f64,
    y1: f64,
}

fn layout_bars(panel: &Panel, slot: f64, floor: f64) -> Vec<Bar> {
    let series = &panel.data.series;
    let mut bars = Vec::new();
    match panel.mode {
        BarMode::Grouped => {
            let w = slot / series.len().max(1) as f64;
            for (j, s) in series.iter().enumerate() {
                for (i, value) in s.values.iter().enumerate() {
                    let Some(v) = value.filter(|v| v.is_finite()) else {
                        continue;
                    };
                    if v <= floor && panel.log2_y {
                        continue;
                    }
                    let x0 = i as f64 - slot / 2.0 + j as f64 * w;
                    bars.push(Bar {
                        series: j,
                        x0,
                        x1: x0 + w,
                        y0: floor,
                        y1: v,
                    });
                }
            }
        }
        BarMode::Stacked => {
            for i in 0..panel.data.categories.len() {
                let mut base = floor;
                for (j, s) in series.iter().enumerate() {
                    let Some(v) = s.values[i].filter(|v| v.is_finite()) else {
                        continue;
                    };
                    if v <= 0.0 {
                        continue;
                    }
                    bars.push(Bar {
                        series: j,
                        x0: i as f64 - slot / 2.0,
                        x1: i as f64 + slot / 2.0,
                        y0: base,
                        y1: base + v,
                    });
                    base += v;
                }
            }
        }
    }
    bars
}
