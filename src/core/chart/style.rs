use plotters::style::RGBColor;

use crate::types::config::StyleConfig;
use crate::types::{AppError, AppResult};

/// Fixed five-colour cycle; series `i` always gets `PALETTE[i % 5]`.
pub const PALETTE: [RGBColor; 5] = [
    RGBColor(0, 114, 189),
    RGBColor(217, 83, 25),
    RGBColor(237, 177, 32),
    RGBColor(126, 47, 142),
    RGBColor(119, 172, 48),
];

/// Immutable styling passed into every render call.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartStyleConfig {
    pub font_family: String,
    pub font_size_pt: f64,
    pub legend_font_size_pt: f64,
    /// Spines and legend frame.
    pub line_width_pt: f64,
    /// Bar outlines.
    pub edge_width_pt: f64,
    /// Fraction of a category slot covered by its bars.
    pub bar_width: f64,
    pub palette: Vec<RGBColor>,
}

impl Default for ChartStyleConfig {
    fn default() -> Self {
        Self {
            font_family: "Times New Roman".to_string(),
            font_size_pt: 8.0,
            legend_font_size_pt: 8.0,
            line_width_pt: 0.6,
            edge_width_pt: 0.6,
            bar_width: 0.9,
            palette: PALETTE.to_vec(),
        }
    }
}

impl ChartStyleConfig {
    pub fn from_config(cfg: &StyleConfig) -> AppResult<Self> {
        let defaults = Self::default();
        let palette = match &cfg.palette {
            Some(list) if list.is_empty() => {
                return Err(AppError::Config("style.palette must not be empty".into()));
            }
            Some(list) => list
                .iter()
                .map(|hex| parse_hex_color(hex))
                .collect::<AppResult<Vec<_>>>()?,
            None => defaults.palette,
        };
        let font_size_pt = cfg.font_size_pt.unwrap_or(defaults.font_size_pt);
        Ok(Self {
            font_family: cfg.font_family.clone().unwrap_or(defaults.font_family),
            font_size_pt,
            legend_font_size_pt: cfg.legend_font_size_pt.unwrap_or(font_size_pt),
            line_width_pt: cfg.line_width_pt.unwrap_or(defaults.line_width_pt),
            edge_width_pt: cfg.edge_width_pt.unwrap_or(defaults.edge_width_pt),
            bar_width: cfg.bar_width.unwrap_or(defaults.bar_width).clamp(0.05, 1.0),
            palette,
        })
    }

    /// Colour of the `index`-th series.
    pub fn color(&self, index: usize) -> RGBColor {
        self.palette[index % self.palette.len()]
    }
}

/// Converts typographic points to device pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelScale {
    pub dpi: u32,
}

impl PixelScale {
    pub fn px(&self, pt: f64) -> f64 {
        pt * self.dpi as f64 / 72.0
    }

    /// Stroke width in whole pixels, never thinner than one.
    pub fn stroke(&self, pt: f64) -> u32 {
        self.px(pt).round().max(1.0) as u32
    }

    pub fn px_i32(&self, pt: f64) -> i32 {
        self.px(pt).round() as i32
    }
}

fn parse_hex_color(hex: &str) -> AppResult<RGBColor> {
    let digits = hex.trim().trim_start_matches('#');
    let bad = || AppError::Config(format!("invalid palette colour '{hex}'"));
    if digits.len() != 6 || !digits.is_ascii() {
        return Err(bad());
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| bad());
    Ok(RGBColor(channel(0)?, channel(2)?, channel(4)?))
}
