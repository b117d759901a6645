use tracing::{debug, trace};

use crate::core::{ValueScale, YearScale, YearScaleTuning, format_tick_value};
use crate::dataset::CompanySlice;
use crate::error::ChartResult;
use crate::figure::{
    Axis, AxisTick, ChartFigure, FigureLayout, FigureStyle, Series, X_AXIS_LABEL,
};
use crate::metric_spec::{AxisSide, MetricSpecs, PlotType};

/// Builds dual-axis figures from a company slice and an ordered list of
/// metric slots.
///
/// Composition is a pure function of its inputs: composing the same slice
/// with the same specs twice yields equal figures.
#[derive(Debug, Clone, Default)]
pub struct ChartComposer {
    style: FigureStyle,
}

/// Axis under construction: series and label only, scales come later.
#[derive(Debug)]
struct AxisDraft {
    side: AxisSide,
    y_label: Option<String>,
    series: Vec<Series>,
}

impl AxisDraft {
    fn new(side: AxisSide) -> Self {
        Self {
            side,
            y_label: None,
            series: Vec::new(),
        }
    }

    fn has_bars(&self) -> bool {
        self.series
            .iter()
            .any(|series| series.plot_type() == PlotType::Bar)
    }

    fn finish(self, max_ticks: usize) -> ChartResult<Axis> {
        let include_zero = self.has_bars();
        let scale = ValueScale::from_values(
            self.series.iter().flat_map(Series::values),
            include_zero,
        )?;
        let step = scale.tick_step(max_ticks);
        let ticks = scale
            .ticks(max_ticks)
            .into_iter()
            .map(|value| AxisTick {
                value,
                label: format_tick_value(value, step),
            })
            .collect();

        Ok(Axis {
            side: self.side,
            y_label: self.y_label,
            series: self.series,
            scale,
            ticks,
        })
    }
}

impl ChartComposer {
    pub fn new(style: FigureStyle) -> ChartResult<Self> {
        style.validate()?;
        Ok(Self { style })
    }

    #[must_use]
    pub fn style(&self) -> &FigureStyle {
        &self.style
    }

    pub fn compose(&self, slice: &CompanySlice, specs: &MetricSpecs) -> ChartResult<ChartFigure> {
        let x_domain = slice.years();
        let mut left = AxisDraft::new(AxisSide::Left);
        let mut right: Option<AxisDraft> = None;
        let mut x_label: Option<String> = None;

        for (draw_index, spec) in specs.iter().enumerate() {
            let axis = match spec.axis {
                AxisSide::Left => &mut left,
                AxisSide::Right => right.get_or_insert_with(|| {
                    debug!(company = slice.company(), "creating right axis");
                    AxisDraft::new(AxisSide::Right)
                }),
            };

            let label = spec.metric.column_name().to_owned();
            axis.series.push(Series {
                draw_index,
                spec: *spec,
                label: label.clone(),
                color: self.style.series_color(draw_index),
                points: slice.points(spec.metric),
            });
            axis.y_label = Some(label);
            x_label.get_or_insert_with(|| X_AXIS_LABEL.to_owned());

            trace!(
                draw_index,
                metric = %spec.metric,
                plot_type = ?spec.plot_type,
                axis = ?spec.axis,
                "series added"
            );
        }

        let any_bars = left.has_bars() || right.as_ref().is_some_and(AxisDraft::has_bars);
        let year_tuning = YearScaleTuning {
            half_extent: if any_bars {
                self.style.bar_width_years * 0.5
            } else {
                0.0
            },
            ..YearScaleTuning::default()
        };
        let year_scale = YearScale::from_years(&x_domain, year_tuning)?;
        let x_ticks = year_scale.ticks(self.style.max_year_ticks);

        let left = left.finish(self.style.max_value_ticks)?;
        let right = right
            .map(|draft| draft.finish(self.style.max_value_ticks))
            .transpose()?;
        let layout = FigureLayout::tight(&self.style, &left, right.as_ref(), x_label.is_some())?;

        debug!(
            company = slice.company(),
            rows = slice.len(),
            series = specs.len(),
            right_axis = right.is_some(),
            "chart composed"
        );

        Ok(ChartFigure {
            style: self.style.clone(),
            company: slice.company().to_owned(),
            x_domain,
            x_label,
            x_ticks,
            year_scale,
            left,
            right,
            layout,
        })
    }
}
