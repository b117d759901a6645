use crate::core::{DataPoint, PlotArea, ValueScale, YearScale};
use crate::error::{ChartError, ChartResult};
use serde::{Deserialize, Serialize};

/// Deterministic bar geometry in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BarGeometry {
    pub year: i32,
    pub x_left: f64,
    pub x_right: f64,
    pub y_top: f64,
    pub y_bottom: f64,
}

impl BarGeometry {
    #[must_use]
    pub fn height(self) -> f64 {
        self.y_bottom - self.y_top
    }
}

/// Projects yearly samples into bars rising from the zero baseline.
///
/// Each bar is `bar_width_years` wide, centered on its year. Samples without a
/// value produce a zero-height bar at the baseline.
pub fn project_bars(
    points: &[DataPoint],
    year_scale: YearScale,
    value_scale: ValueScale,
    plot: PlotArea,
    bar_width_years: f64,
) -> ChartResult<Vec<BarGeometry>> {
    if !bar_width_years.is_finite() || bar_width_years <= 0.0 {
        return Err(ChartError::InvalidData(
            "bar width must be finite and > 0".to_owned(),
        ));
    }
    if points.is_empty() {
        return Ok(Vec::new());
    }

    let baseline_y = value_scale.value_to_pixel(0.0, plot)?;
    let half_width = year_scale.years_to_pixels(bar_width_years, plot)? * 0.5;

    let mut bars = Vec::with_capacity(points.len());
    for point in points {
        let x_center = year_scale.year_to_pixel(f64::from(point.year), plot)?;
        let y_value = match point.value.filter(|value| value.is_finite()) {
            Some(value) => value_scale.value_to_pixel(value, plot)?,
            None => baseline_y,
        };
        bars.push(BarGeometry {
            year: point.year,
            x_left: x_center - half_width,
            x_right: x_center + half_width,
            y_top: y_value.min(baseline_y),
            y_bottom: y_value.max(baseline_y),
        });
    }

    Ok(bars)
}
