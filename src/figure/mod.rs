//! Dual-axis figure model.
//!
//! A [`ChartFigure`] is the composed, resolution-independent description of a
//! chart: the shared year domain, a left axis that always exists, a right axis
//! that exists only when some series asked for it, and a tight layout in
//! points. Scenes for any pixel size are derived from it on demand.

mod composer;
mod layout;
mod scene;
mod style;

pub use composer::ChartComposer;
pub use layout::{FigureLayout, estimate_text_width_pt};
pub use scene::build_scene;
pub use style::{FigureStyle, POINTS_PER_INCH};

use serde::Serialize;

use crate::core::{DataPoint, ValueScale, Viewport, YearScale};
use crate::error::ChartResult;
use crate::metric_spec::{AxisSide, Metric, MetricSpec, PlotType};
use crate::render::{Color, RenderFrame};

/// Label of the shared X axis.
pub const X_AXIS_LABEL: &str = "Year";

/// One plotted metric slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    draw_index: usize,
    spec: MetricSpec,
    label: String,
    #[serde(skip)]
    color: Color,
    points: Vec<DataPoint>,
}

impl Series {
    /// Position in the input spec list; lower indices paint first.
    #[must_use]
    pub fn draw_index(&self) -> usize {
        self.draw_index
    }

    #[must_use]
    pub fn spec(&self) -> MetricSpec {
        self.spec
    }

    #[must_use]
    pub fn metric(&self) -> Metric {
        self.spec.metric
    }

    #[must_use]
    pub fn plot_type(&self) -> PlotType {
        self.spec.plot_type
    }

    #[must_use]
    pub fn axis(&self) -> AxisSide {
        self.spec.axis
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn color(&self) -> Color {
        self.color
    }

    /// All samples in slice order, including those without a value.
    #[must_use]
    pub fn points(&self) -> &[DataPoint] {
        &self.points
    }

    /// Samples that carry a finite value.
    #[must_use]
    pub fn value_count(&self) -> usize {
        self.points
            .iter()
            .filter(|point| point.value.is_some_and(f64::is_finite))
            .count()
    }

    fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().filter_map(|point| point.value)
    }
}

/// One labelled Y tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisTick {
    pub value: f64,
    pub label: String,
}

/// One Y axis with its own value scale.
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    side: AxisSide,
    y_label: Option<String>,
    series: Vec<Series>,
    scale: ValueScale,
    ticks: Vec<AxisTick>,
}

impl Axis {
    #[must_use]
    pub fn side(&self) -> AxisSide {
        self.side
    }

    /// Metric name of the last series drawn on this axis.
    #[must_use]
    pub fn y_label(&self) -> Option<&str> {
        self.y_label.as_deref()
    }

    /// Series on this axis in draw order.
    #[must_use]
    pub fn series(&self) -> &[Series] {
        &self.series
    }

    #[must_use]
    pub fn scale(&self) -> ValueScale {
        self.scale
    }

    #[must_use]
    pub fn ticks(&self) -> &[AxisTick] {
        &self.ticks
    }

    #[must_use]
    pub fn has_bars(&self) -> bool {
        self.series
            .iter()
            .any(|series| series.plot_type() == PlotType::Bar)
    }
}

/// Legend row, in draw order.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub label: String,
    pub color: Color,
    pub plot_type: PlotType,
    pub axis: AxisSide,
}

/// Composed dual-axis chart for one company.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartFigure {
    style: FigureStyle,
    company: String,
    x_domain: Vec<i32>,
    x_label: Option<String>,
    x_ticks: Vec<i32>,
    year_scale: YearScale,
    left: Axis,
    right: Option<Axis>,
    layout: FigureLayout,
}

impl ChartFigure {
    #[must_use]
    pub fn style(&self) -> &FigureStyle {
        &self.style
    }

    #[must_use]
    pub fn company(&self) -> &str {
        &self.company
    }

    /// Years of the slice, in slice order. Shared by both axes.
    #[must_use]
    pub fn x_domain(&self) -> &[i32] {
        &self.x_domain
    }

    #[must_use]
    pub fn x_label(&self) -> Option<&str> {
        self.x_label.as_deref()
    }

    #[must_use]
    pub fn x_ticks(&self) -> &[i32] {
        &self.x_ticks
    }

    #[must_use]
    pub fn year_scale(&self) -> YearScale {
        self.year_scale
    }

    #[must_use]
    pub fn left_axis(&self) -> &Axis {
        &self.left
    }

    #[must_use]
    pub fn right_axis(&self) -> Option<&Axis> {
        self.right.as_ref()
    }

    #[must_use]
    pub fn axis(&self, side: AxisSide) -> Option<&Axis> {
        match side {
            AxisSide::Left => Some(&self.left),
            AxisSide::Right => self.right.as_ref(),
        }
    }

    #[must_use]
    pub fn has_right_axis(&self) -> bool {
        self.right.is_some()
    }

    #[must_use]
    pub fn layout(&self) -> &FigureLayout {
        &self.layout
    }

    /// Every series across both axes, in draw order.
    #[must_use]
    pub fn series(&self) -> Vec<&Series> {
        let mut series: Vec<&Series> = self
            .left
            .series
            .iter()
            .chain(self.right.iter().flat_map(|axis| axis.series.iter()))
            .collect();
        series.sort_by_key(|series| series.draw_index);
        series
    }

    #[must_use]
    pub fn series_count(&self) -> usize {
        self.left.series.len() + self.right.as_ref().map_or(0, |axis| axis.series.len())
    }

    #[must_use]
    pub fn legend_entries(&self) -> Vec<LegendEntry> {
        self.series()
            .into_iter()
            .map(|series| LegendEntry {
                label: series.label.clone(),
                color: series.color,
                plot_type: series.plot_type(),
                axis: series.axis(),
            })
            .collect()
    }

    /// True when no series carries a single plotted value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.series().iter().all(|series| series.value_count() == 0)
    }

    /// Pixel size of this figure at `dpi`.
    #[must_use]
    pub fn viewport_at_dpi(&self, dpi: f64) -> Viewport {
        let to_px = |inches: f64| (inches * dpi).round().max(0.0) as u32;
        Viewport::new(to_px(self.style.width_in), to_px(self.style.height_in))
    }

    /// Pixels per inch a viewport gives this figure; the tighter axis wins,
    /// the same way the scene scales fonts and strokes.
    #[must_use]
    pub fn dpi_for_viewport(&self, viewport: Viewport) -> f64 {
        let dpi_x = f64::from(viewport.width) / self.style.width_in;
        let dpi_y = f64::from(viewport.height) / self.style.height_in;
        dpi_x.min(dpi_y)
    }

    /// Builds the draw scene for inline display or rasterization.
    pub fn to_render_frame(&self, viewport: Viewport) -> ChartResult<RenderFrame> {
        build_scene(self, viewport)
    }
}
