use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};
use crate::render::Color;

pub const POINTS_PER_INCH: f64 = 72.0;

/// Visual configuration of a composed figure.
///
/// Sizes are in inches and points so the same figure renders at any DPI.
/// This type is serializable so hosts can keep chart styling in their config
/// files; every field falls back to its default when omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigureStyle {
    #[serde(default = "default_width_in")]
    pub width_in: f64,
    #[serde(default = "default_height_in")]
    pub height_in: f64,
    #[serde(default = "default_font_pt")]
    pub tick_font_pt: f64,
    #[serde(default = "default_font_pt")]
    pub label_font_pt: f64,
    #[serde(default = "default_font_pt")]
    pub legend_font_pt: f64,
    #[serde(default = "default_line_width_pt")]
    pub line_width_pt: f64,
    #[serde(default = "default_marker_radius_pt")]
    pub marker_radius_pt: f64,
    #[serde(default = "default_bar_width_years")]
    pub bar_width_years: f64,
    #[serde(default = "default_bar_alpha")]
    pub bar_alpha: f64,
    #[serde(default = "default_axis_line_width_pt")]
    pub axis_line_width_pt: f64,
    #[serde(default = "default_tick_length_pt")]
    pub tick_length_pt: f64,
    #[serde(default = "default_tick_pad_pt")]
    pub tick_pad_pt: f64,
    #[serde(default = "default_label_pad_pt")]
    pub label_pad_pt: f64,
    #[serde(default = "default_layout_pad_pt")]
    pub layout_pad_pt: f64,
    #[serde(default = "default_max_value_ticks")]
    pub max_value_ticks: usize,
    #[serde(default = "default_max_year_ticks")]
    pub max_year_ticks: usize,
    #[serde(default = "default_show_legend")]
    pub show_legend: bool,
    #[serde(default = "default_background")]
    pub background: Color,
    #[serde(default = "default_foreground")]
    pub foreground: Color,
    #[serde(default = "default_palette")]
    pub palette: Vec<Color>,
}

impl Default for FigureStyle {
    fn default() -> Self {
        Self {
            width_in: default_width_in(),
            height_in: default_height_in(),
            tick_font_pt: default_font_pt(),
            label_font_pt: default_font_pt(),
            legend_font_pt: default_font_pt(),
            line_width_pt: default_line_width_pt(),
            marker_radius_pt: default_marker_radius_pt(),
            bar_width_years: default_bar_width_years(),
            bar_alpha: default_bar_alpha(),
            axis_line_width_pt: default_axis_line_width_pt(),
            tick_length_pt: default_tick_length_pt(),
            tick_pad_pt: default_tick_pad_pt(),
            label_pad_pt: default_label_pad_pt(),
            layout_pad_pt: default_layout_pad_pt(),
            max_value_ticks: default_max_value_ticks(),
            max_year_ticks: default_max_year_ticks(),
            show_legend: default_show_legend(),
            background: default_background(),
            foreground: default_foreground(),
            palette: default_palette(),
        }
    }
}

impl FigureStyle {
    /// Sets the figure size in inches.
    #[must_use]
    pub fn with_size_in(mut self, width_in: f64, height_in: f64) -> Self {
        self.width_in = width_in;
        self.height_in = height_in;
        self
    }

    #[must_use]
    pub fn with_legend(mut self, show_legend: bool) -> Self {
        self.show_legend = show_legend;
        self
    }

    #[must_use]
    pub fn width_pt(&self) -> f64 {
        self.width_in * POINTS_PER_INCH
    }

    #[must_use]
    pub fn height_pt(&self) -> f64 {
        self.height_in * POINTS_PER_INCH
    }

    /// Series color for a draw index, cycling through the palette.
    #[must_use]
    pub fn series_color(&self, draw_index: usize) -> Color {
        self.palette
            .get(draw_index % self.palette.len().max(1))
            .copied()
            .unwrap_or(Color::BLACK)
    }

    pub fn validate(&self) -> ChartResult<()> {
        for (name, value) in [
            ("width_in", self.width_in),
            ("height_in", self.height_in),
            ("tick_font_pt", self.tick_font_pt),
            ("label_font_pt", self.label_font_pt),
            ("legend_font_pt", self.legend_font_pt),
            ("line_width_pt", self.line_width_pt),
            ("marker_radius_pt", self.marker_radius_pt),
            ("bar_width_years", self.bar_width_years),
            ("axis_line_width_pt", self.axis_line_width_pt),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ChartError::InvalidData(format!(
                    "figure style `{name}` must be finite and > 0"
                )));
            }
        }
        for (name, value) in [
            ("tick_length_pt", self.tick_length_pt),
            ("tick_pad_pt", self.tick_pad_pt),
            ("label_pad_pt", self.label_pad_pt),
            ("layout_pad_pt", self.layout_pad_pt),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ChartError::InvalidData(format!(
                    "figure style `{name}` must be finite and >= 0"
                )));
            }
        }
        if !self.bar_alpha.is_finite() || !(0.0..=1.0).contains(&self.bar_alpha) {
            return Err(ChartError::InvalidData(
                "figure style `bar_alpha` must be in [0, 1]".to_owned(),
            ));
        }
        if self.max_value_ticks < 2 || self.max_year_ticks < 1 {
            return Err(ChartError::InvalidData(
                "figure style tick limits are too small".to_owned(),
            ));
        }
        if self.palette.is_empty() {
            return Err(ChartError::InvalidData(
                "figure style palette must not be empty".to_owned(),
            ));
        }
        self.background.validate()?;
        self.foreground.validate()?;
        for color in &self.palette {
            color.validate()?;
        }
        Ok(())
    }
}

fn default_width_in() -> f64 {
    10.0
}

fn default_height_in() -> f64 {
    6.0
}

fn default_font_pt() -> f64 {
    10.0
}

fn default_line_width_pt() -> f64 {
    1.5
}

fn default_marker_radius_pt() -> f64 {
    3.0
}

fn default_bar_width_years() -> f64 {
    0.8
}

fn default_bar_alpha() -> f64 {
    0.5
}

fn default_axis_line_width_pt() -> f64 {
    0.8
}

fn default_tick_length_pt() -> f64 {
    3.5
}

fn default_tick_pad_pt() -> f64 {
    3.5
}

fn default_label_pad_pt() -> f64 {
    4.0
}

fn default_layout_pad_pt() -> f64 {
    10.8
}

fn default_max_value_ticks() -> usize {
    8
}

fn default_max_year_ticks() -> usize {
    12
}

fn default_show_legend() -> bool {
    true
}

fn default_background() -> Color {
    Color::WHITE
}

fn default_foreground() -> Color {
    Color::BLACK
}

fn default_palette() -> Vec<Color> {
    vec![
        Color::from_rgb8(0x1f, 0x77, 0xb4),
        Color::from_rgb8(0xff, 0x7f, 0x0e),
        Color::from_rgb8(0x2c, 0xa0, 0x2c),
        Color::from_rgb8(0xd6, 0x27, 0x28),
        Color::from_rgb8(0x94, 0x67, 0xbd),
        Color::from_rgb8(0x8c, 0x56, 0x4b),
        Color::from_rgb8(0xe3, 0x77, 0xc2),
        Color::from_rgb8(0x7f, 0x7f, 0x7f),
        Color::from_rgb8(0xbc, 0xbd, 0x22),
        Color::from_rgb8(0x17, 0xbe, 0xcf),
    ]
}
