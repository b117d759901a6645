use serde::{Deserialize, Serialize};

use crate::core::PlotArea;
use crate::error::{ChartError, ChartResult};
use crate::figure::{Axis, FigureStyle};

/// Smallest plot extent, in points, a tight layout may leave.
const MIN_PLOT_EXTENT_PT: f64 = 24.0;

/// Tight layout of a figure, in points from the top-left corner.
///
/// Margins are sized from the actual tick labels and axis labels so nothing
/// overlaps and no label is clipped at the figure edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FigureLayout {
    pub figure_width_pt: f64,
    pub figure_height_pt: f64,
    pub plot: PlotArea,
    pub left_tick_label_width_pt: f64,
    pub right_tick_label_width_pt: f64,
}

impl FigureLayout {
    pub(crate) fn tight(
        style: &FigureStyle,
        left: &Axis,
        right: Option<&Axis>,
        has_x_label: bool,
    ) -> ChartResult<Self> {
        let figure_width_pt = style.width_pt();
        let figure_height_pt = style.height_pt();
        let tick_reach = style.tick_length_pt + style.tick_pad_pt;
        let label_band = style.label_font_pt + style.label_pad_pt;

        let left_tick_label_width_pt = widest_tick_label(left, style.tick_font_pt);
        let mut left_margin = style.layout_pad_pt + tick_reach + left_tick_label_width_pt;
        if left.y_label.is_some() {
            left_margin += label_band;
        }

        let right_tick_label_width_pt =
            right.map_or(0.0, |axis| widest_tick_label(axis, style.tick_font_pt));
        let right_margin = match right {
            Some(axis) => {
                let mut margin = style.layout_pad_pt + tick_reach + right_tick_label_width_pt;
                if axis.y_label.is_some() {
                    margin += label_band;
                }
                margin
            }
            // The last year label may hang past the plot edge by half its width.
            None => style.layout_pad_pt + estimate_text_width_pt("0000", style.tick_font_pt) * 0.5,
        };

        // Top tick labels are centered on the top edge and overhang by half a line.
        let top_margin = style.layout_pad_pt + style.tick_font_pt * 0.5;
        let mut bottom_margin = style.layout_pad_pt + tick_reach + style.tick_font_pt;
        if has_x_label {
            bottom_margin += label_band;
        }

        let plot_width = figure_width_pt - left_margin - right_margin;
        let plot_height = figure_height_pt - top_margin - bottom_margin;
        if plot_width < MIN_PLOT_EXTENT_PT || plot_height < MIN_PLOT_EXTENT_PT {
            return Err(ChartError::InvalidData(format!(
                "figure {figure_width_pt}x{figure_height_pt}pt is too small for its labels"
            )));
        }

        Ok(Self {
            figure_width_pt,
            figure_height_pt,
            plot: PlotArea::new(left_margin, top_margin, plot_width, plot_height)?,
            left_tick_label_width_pt,
            right_tick_label_width_pt,
        })
    }
}

/// Deterministic, backend-independent width estimate for a label.
#[must_use]
pub fn estimate_text_width_pt(text: &str, font_size_pt: f64) -> f64 {
    let units = text.chars().fold(0.0, |acc, ch| {
        acc + match ch {
            '0'..='9' => 0.62,
            '.' | ',' => 0.34,
            '-' | '+' | '%' => 0.42,
            ' ' => 0.33,
            _ => 0.58,
        }
    });
    units * font_size_pt
}

fn widest_tick_label(axis: &Axis, font_size_pt: f64) -> f64 {
    axis.ticks
        .iter()
        .map(|tick| estimate_text_width_pt(&tick.label, font_size_pt))
        .fold(0.0, f64::max)
}
