use crate::core::{LinearScale, PlotArea};
use crate::error::{ChartError, ChartResult};
use serde::{Deserialize, Serialize};

const YEAR_STEP_LADDER: [i32; 4] = [1, 2, 5, 10];

/// Tuning controls for fitting the shared year axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearScaleTuning {
    /// Extra space on each side of the outermost year, in years.
    pub half_extent: f64,
    /// Margin added on both sides as a share of the fitted span.
    pub margin_ratio: f64,
}

impl Default for YearScaleTuning {
    fn default() -> Self {
        Self {
            half_extent: 0.0,
            margin_ratio: 0.05,
        }
    }
}

impl YearScaleTuning {
    fn validate(self) -> ChartResult<Self> {
        if !self.half_extent.is_finite()
            || !self.margin_ratio.is_finite()
            || self.half_extent < 0.0
            || self.margin_ratio < 0.0
        {
            return Err(ChartError::InvalidData(
                "year scale tuning must be finite and >= 0".to_owned(),
            ));
        }
        Ok(self)
    }
}

/// Shared X axis model. Both Y axes of a figure map years through the same
/// instance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearScale {
    domain_start: f64,
    domain_end: f64,
}

impl YearScale {
    pub fn new(domain_start: f64, domain_end: f64) -> ChartResult<Self> {
        let linear = LinearScale::new(domain_start, domain_end)?;
        let (start, end) = linear.domain();
        Ok(Self {
            domain_start: start.min(end),
            domain_end: start.max(end),
        })
    }

    /// Fits the domain around `years`. An empty input yields `[0, 1]`.
    pub fn from_years(years: &[i32], tuning: YearScaleTuning) -> ChartResult<Self> {
        let tuning = tuning.validate()?;
        let (Some(min), Some(max)) = (years.iter().min(), years.iter().max()) else {
            return Self::new(0.0, 1.0);
        };

        let mut start = f64::from(*min) - tuning.half_extent;
        let mut end = f64::from(*max) + tuning.half_extent;
        if end - start <= 0.0 {
            start -= 0.5;
            end += 0.5;
        }
        let margin = (end - start) * tuning.margin_ratio;
        Self::new(start - margin, end + margin)
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        (self.domain_start, self.domain_end)
    }

    pub fn year_to_pixel(self, year: f64, plot: PlotArea) -> ChartResult<f64> {
        plot.validate()?;
        LinearScale::new(self.domain_start, self.domain_end)?.domain_to_pixel(
            year,
            plot.left,
            plot.right(),
        )
    }

    /// Converts a width in years to pixels.
    pub fn years_to_pixels(self, years: f64, plot: PlotArea) -> ChartResult<f64> {
        plot.validate()?;
        if !years.is_finite() || years < 0.0 {
            return Err(ChartError::InvalidData(
                "year width must be finite and >= 0".to_owned(),
            ));
        }
        Ok(years / (self.domain_end - self.domain_start) * plot.width)
    }

    /// Returns whole-year ticks inside the domain with at most `max_ticks`
    /// entries, aligned to a multiple of the chosen step.
    #[must_use]
    pub fn ticks(self, max_ticks: usize) -> Vec<i32> {
        let first = self.domain_start.ceil();
        let last = self.domain_end.floor();
        if last < first || max_ticks == 0 {
            return Vec::new();
        }
        let (first, last) = (first as i32, last as i32);
        let span = i64::from(last) - i64::from(first);

        let mut magnitude = 1_i64;
        loop {
            for base in YEAR_STEP_LADDER {
                let step = i64::from(base) * magnitude;
                if span / step + 1 <= max_ticks as i64 {
                    let step = step as i32;
                    let start = first.div_euclid(step) * step;
                    let start = if start < first { start + step } else { start };
                    return (0..)
                        .map(|index| start + index * step)
                        .take_while(|year| *year <= last)
                        .collect();
                }
            }
            magnitude *= 10;
        }
    }
}
