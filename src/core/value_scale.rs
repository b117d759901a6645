use crate::core::{LinearScale, PlotArea};
use crate::error::{ChartError, ChartResult};
use serde::{Deserialize, Serialize};

const TICK_LADDER: [f64; 5] = [1.0, 2.0, 2.5, 5.0, 10.0];

/// Tick steps at or above this magnitude are labelled in scientific notation.
pub const SCIENTIFIC_STEP_ABOVE: f64 = 1e12;
/// Tick steps below this magnitude are labelled in scientific notation.
pub const SCIENTIFIC_STEP_BELOW: f64 = 1e-6;
/// Tick values at or above this magnitude are labelled in scientific notation.
pub const SCIENTIFIC_VALUE_ABOVE: f64 = 1e15;

const MAX_MANTISSA_DECIMALS: usize = 6;

/// Tuning controls for value-domain autoscaling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueScaleTuning {
    pub padding_ratio: f64,
    pub min_span_absolute: f64,
}

impl Default for ValueScaleTuning {
    fn default() -> Self {
        Self {
            padding_ratio: 0.05,
            min_span_absolute: 0.000_001,
        }
    }
}

impl ValueScaleTuning {
    fn validate(self) -> ChartResult<Self> {
        if !self.padding_ratio.is_finite() || self.padding_ratio < 0.0 {
            return Err(ChartError::InvalidData(
                "value scale padding ratio must be finite and >= 0".to_owned(),
            ));
        }
        if !self.min_span_absolute.is_finite() || self.min_span_absolute <= 0.0 {
            return Err(ChartError::InvalidData(
                "value scale min span must be finite and > 0".to_owned(),
            ));
        }
        Ok(self)
    }
}

/// Y axis model mapped to an upward-growing pixel axis inside a plot area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueScale {
    domain_min: f64,
    domain_max: f64,
}

impl ValueScale {
    pub fn new(domain_min: f64, domain_max: f64) -> ChartResult<Self> {
        let linear = LinearScale::new(domain_min, domain_max)?;
        let (start, end) = linear.domain();
        Ok(Self {
            domain_min: start.min(end),
            domain_max: start.max(end),
        })
    }

    /// Fits a domain around `values` with default tuning.
    ///
    /// Non-finite values are ignored. An empty input yields `[0, 1]`.
    pub fn from_values<I>(values: I, include_zero: bool) -> ChartResult<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        Self::from_values_tuned(values, include_zero, ValueScaleTuning::default())
    }

    /// Fits a domain around `values` using explicit tuning.
    ///
    /// When `include_zero` is set the zero baseline is part of the data range
    /// and no padding is added beyond it, so bars start flush with the axis.
    pub fn from_values_tuned<I>(
        values: I,
        include_zero: bool,
        tuning: ValueScaleTuning,
    ) -> ChartResult<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let tuning = tuning.validate()?;

        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for value in values.into_iter().filter(|value| value.is_finite()) {
            min = min.min(value);
            max = max.max(value);
        }
        if include_zero {
            min = min.min(0.0);
            max = max.max(0.0);
        }
        if !min.is_finite() || !max.is_finite() {
            return Self::new(0.0, 1.0);
        }

        if half_span(min, max) * 2.0 < tuning.min_span_absolute {
            let center = min;
            let delta = if center.abs() > 0.0 {
                center.abs() * 0.05
            } else {
                1.0
            };
            min = center - delta;
            max = center + delta;
            if include_zero && center == 0.0 {
                min = 0.0;
            }
        }

        let padding = half_span(min, max) * (2.0 * tuning.padding_ratio);
        let pinned_low = include_zero && min == 0.0;
        let pinned_high = include_zero && max == 0.0;
        let lower = if pinned_low { min } else { (min - padding).max(-f64::MAX) };
        let upper = if pinned_high { max } else { (max + padding).min(f64::MAX) };

        Self::new(lower, upper)
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        (self.domain_min, self.domain_max)
    }

    pub fn value_to_pixel(self, value: f64, plot: PlotArea) -> ChartResult<f64> {
        plot.validate()?;
        LinearScale::new(self.domain_min, self.domain_max)?.domain_to_pixel(
            value,
            plot.bottom(),
            plot.top,
        )
    }

    /// Returns the tick step chosen for at most `max_ticks` ticks.
    #[must_use]
    pub fn tick_step(self, max_ticks: usize) -> f64 {
        nice_step(
            (half_span(self.domain_min, self.domain_max) * 2.0).min(f64::MAX),
            max_ticks.max(2),
        )
    }

    /// Returns round tick values inside the domain, ascending.
    #[must_use]
    pub fn ticks(self, max_ticks: usize) -> Vec<f64> {
        let step = self.tick_step(max_ticks);
        let first = (self.domain_min / step).ceil();
        let last = (self.domain_max / step).floor();
        if !first.is_finite() || !last.is_finite() || last < first {
            return Vec::new();
        }

        let count = ((last - first) as usize + 1).min(max_ticks.max(2) * 2);
        (0..count)
            .map(|index| normalize_zero((first + index as f64) * step))
            .collect()
    }
}

/// Picks a 1-2-2.5-5 ladder step so `span` holds at most `target` intervals.
#[must_use]
pub fn nice_step(span: f64, target: usize) -> f64 {
    if !span.is_finite() || span <= 0.0 {
        return 1.0;
    }
    let intervals = target.saturating_sub(1).max(1) as f64;
    let raw = span / intervals;
    let magnitude = 10_f64.powf(raw.log10().floor());
    for multiplier in TICK_LADDER {
        let candidate = magnitude * multiplier;
        if !candidate.is_finite() {
            break;
        }
        if candidate >= raw * (1.0 - 1e-9) {
            return candidate;
        }
    }
    magnitude
}

/// Formats a tick value with just enough decimals for `step`.
///
/// Very large or very small magnitudes switch to scientific notation
/// (`2.5e60`) so labels stay short enough to lay out.
#[must_use]
pub fn format_tick_value(value: f64, step: f64) -> String {
    let value = normalize_zero(value);
    let step_is_extreme = step.is_finite()
        && step > 0.0
        && !(SCIENTIFIC_STEP_BELOW..SCIENTIFIC_STEP_ABOVE).contains(&step);
    if value != 0.0 && (step_is_extreme || value.abs() >= SCIENTIFIC_VALUE_ABOVE) {
        return format_scientific(value, step);
    }

    let decimals = if step.is_finite() && step > 0.0 && step < 1.0 {
        let mut decimals = (-step.log10()).ceil() as usize;
        if (step * 10_f64.powi(decimals as i32)).fract() > 1e-6 {
            decimals += 1;
        }
        decimals.min(10)
    } else {
        0
    };
    format!("{:.*}", decimals, value)
}

fn format_scientific(value: f64, step: f64) -> String {
    let value_exponent = value.abs().log10().floor();
    let decimals = if step.is_finite() && step > 0.0 {
        let step_exponent = step.log10().floor();
        let mut decimals = (value_exponent - step_exponent).max(0.0) as usize;
        if (step / 10_f64.powf(step_exponent)).fract() > 1e-6 {
            decimals += 1;
        }
        decimals
    } else {
        0
    };
    let text = format!("{:.*e}", decimals.min(MAX_MANTISSA_DECIMALS), value);
    match text.split_once('e') {
        Some((mantissa, exponent)) if mantissa.contains('.') => {
            let mantissa = mantissa.trim_end_matches('0').trim_end_matches('.');
            format!("{mantissa}e{exponent}")
        }
        _ => text,
    }
}

/// Half the distance between `min` and `max`, finite for any finite inputs.
fn half_span(min: f64, max: f64) -> f64 {
    max * 0.5 - min * 0.5
}

fn normalize_zero(value: f64) -> f64 {
    if value == 0.0 { 0.0 } else { value }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn autoscale_pins_zero_for_positive_bars() {
        let scale = ValueScale::from_values([100.0, 200.0], true).expect("scale");
        let (min, max) = scale.domain();
        assert_eq!(min, 0.0);
        assert!((max - 210.0).abs() <= 1e-9);
    }

    #[test]
    fn autoscale_pads_both_sides_for_lines() {
        let scale = ValueScale::from_values([100.0, 200.0], false).expect("scale");
        let (min, max) = scale.domain();
        assert!((min - 95.0).abs() <= 1e-9);
        assert!((max - 205.0).abs() <= 1e-9);
    }

    #[test]
    fn autoscale_widens_single_value() {
        let scale = ValueScale::from_values([50.0], false).expect("scale");
        let (min, max) = scale.domain();
        assert!(min < 50.0 && max > 50.0);
    }

    #[test]
    fn autoscale_ignores_nan_and_falls_back_when_empty() {
        let scale = ValueScale::from_values([f64::NAN], false).expect("scale");
        assert_eq!(scale.domain(), (0.0, 1.0));
    }

    #[test]
    fn pixels_grow_upward() {
        let scale = ValueScale::new(0.0, 210.0).expect("scale");
        let plot = PlotArea::new(0.0, 0.0, 100.0, 210.0).expect("plot");
        let px = scale.value_to_pixel(50.0, plot).expect("px");
        assert!((px - 160.0).abs() <= 1e-9);
    }

    #[test]
    fn autoscale_stays_finite_at_the_float_limits() {
        let scale = ValueScale::from_values([-1e308, 1e308], false).expect("scale");
        let (min, max) = scale.domain();
        assert!(min.is_finite() && max.is_finite());
        assert!(min <= -1e308 && max >= 1e308);

        let clamped = ValueScale::from_values([f64::MAX, -f64::MAX], true).expect("scale");
        assert_eq!(clamped.domain(), (-f64::MAX, f64::MAX));

        let step = clamped.tick_step(8);
        assert!(step.is_finite() && step > 0.0);
        let ticks = clamped.ticks(8);
        assert!(!ticks.is_empty());
        assert!(ticks.iter().all(|tick| tick.is_finite()));
    }

    #[test]
    fn extreme_magnitudes_use_scientific_labels() {
        assert_eq!(format_tick_value(2.5e60, 5e59), "2.5e60");
        assert_eq!(format_tick_value(-1e61, 5e59), "-1e61");
        assert_eq!(format_tick_value(0.0, 5e59), "0");
        assert_eq!(format_tick_value(3e-9, 1e-9), "3e-9");
        assert_eq!(format_tick_value(2e15, 5e3), "2e15");
        assert_eq!(format_tick_value(150_000.0, 50_000.0), "150000");
    }

    #[test]
    fn ticks_are_round_and_inside_domain() {
        let scale = ValueScale::new(0.0, 210.0).expect("scale");
        let ticks = scale.ticks(8);
        assert_eq!(ticks.first().copied(), Some(0.0));
        assert!(ticks.iter().all(|tick| *tick <= 210.0));
        assert!(ticks.len() <= 8);
        assert_eq!(format_tick_value(ticks[1], scale.tick_step(8)), "50");
    }

    #[test]
    fn fractional_steps_keep_decimals() {
        assert_eq!(format_tick_value(0.25, 0.05), "0.25");
        assert_eq!(format_tick_value(0.5, 0.5), "0.5");
        assert_eq!(format_tick_value(-0.0, 1.0), "0");
    }
}
