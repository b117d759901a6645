//! Metric slot selections and their ordered collection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{ChartError, ChartResult};

pub const MIN_METRIC_COUNT: usize = 1;
pub const MAX_METRIC_COUNT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    Sales,
    Profit,
    RoCE,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Sales, Metric::Profit, Metric::RoCE];

    /// Column header carrying this metric in uploads.
    #[must_use]
    pub const fn column_name(self) -> &'static str {
        match self {
            Metric::Sales => "Sales",
            Metric::Profit => "Profit",
            Metric::RoCE => "RoCE",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

impl FromStr for Metric {
    type Err = ChartError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .into_iter()
            .find(|metric| metric.column_name().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| ChartError::InvalidData(format!("unknown metric `{value}`")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PlotType {
    #[default]
    Line,
    Bar,
}

impl FromStr for PlotType {
    type Err = ChartError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "line" => Ok(PlotType::Line),
            "bar" => Ok(PlotType::Bar),
            _ => Err(ChartError::InvalidData(format!(
                "unknown plot type `{value}`"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AxisSide {
    #[default]
    Left,
    Right,
}

impl FromStr for AxisSide {
    type Err = ChartError;

    /// Accepts `left`/`right` as well as the selector labels
    /// `Left Y Axis`/`Right Y Axis`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "left" | "left y axis" => Ok(AxisSide::Left),
            "right" | "right y axis" => Ok(AxisSide::Right),
            _ => Err(ChartError::InvalidData(format!("unknown axis `{value}`"))),
        }
    }
}

/// One metric slot: what to plot, how, and against which Y axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MetricSpec {
    pub metric: Metric,
    #[serde(default)]
    pub plot_type: PlotType,
    #[serde(default)]
    pub axis: AxisSide,
}

impl MetricSpec {
    #[must_use]
    pub const fn new(metric: Metric, plot_type: PlotType, axis: AxisSide) -> Self {
        Self {
            metric,
            plot_type,
            axis,
        }
    }
}

impl FromStr for MetricSpec {
    type Err = ChartError;

    /// Parses `metric[:plot_type[:axis]]`, e.g. `Sales:bar:right`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let mut parts = value.split(':');
        let metric = parts
            .next()
            .filter(|part| !part.trim().is_empty())
            .ok_or_else(|| ChartError::InvalidData(format!("empty metric spec `{value}`")))?
            .parse::<Metric>()?;
        let plot_type = parts
            .next()
            .map(str::parse::<PlotType>)
            .transpose()?
            .unwrap_or_default();
        let axis = parts
            .next()
            .map(str::parse::<AxisSide>)
            .transpose()?
            .unwrap_or_default();
        if parts.next().is_some() {
            return Err(ChartError::InvalidData(format!(
                "metric spec `{value}` has too many fields"
            )));
        }
        Ok(Self::new(metric, plot_type, axis))
    }
}

/// Ordered metric slots. Order is draw order and legend order.
///
/// Always holds between [`MIN_METRIC_COUNT`] and [`MAX_METRIC_COUNT`] entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricSpecs(Vec<MetricSpec>);

impl MetricSpecs {
    pub fn new(specs: Vec<MetricSpec>) -> ChartResult<Self> {
        validate_count(specs.len())?;
        Ok(Self(specs))
    }

    #[must_use]
    pub fn as_slice(&self) -> &[MetricSpec] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MetricSpec> {
        self.0.iter()
    }

    #[must_use]
    pub fn has_right_axis(&self) -> bool {
        self.0.iter().any(|spec| spec.axis == AxisSide::Right)
    }
}

impl<'de> Deserialize<'de> for MetricSpecs {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let specs = Vec::<MetricSpec>::deserialize(deserializer)?;
        MetricSpecs::new(specs).map_err(serde::de::Error::custom)
    }
}

impl<'a> IntoIterator for &'a MetricSpecs {
    type Item = &'a MetricSpec;
    type IntoIter = std::slice::Iter<'a, MetricSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Collects `count` metric slots, calling `selection(i)` for `i = 1..=count`.
///
/// Slots are kept as given: the same metric may appear several times.
pub fn build_metric_specs<F>(count: usize, mut selection: F) -> ChartResult<MetricSpecs>
where
    F: FnMut(usize) -> MetricSpec,
{
    validate_count(count)?;
    let specs = (1..=count)
        .map(|slot| {
            let spec = selection(slot);
            trace!(slot, metric = %spec.metric, plot_type = ?spec.plot_type, axis = ?spec.axis, "metric slot");
            spec
        })
        .collect();
    Ok(MetricSpecs(specs))
}

fn validate_count(count: usize) -> ChartResult<()> {
    if !(MIN_METRIC_COUNT..=MAX_METRIC_COUNT).contains(&count) {
        return Err(ChartError::InvalidMetricCount {
            count,
            min: MIN_METRIC_COUNT,
            max: MAX_METRIC_COUNT,
        });
    }
    Ok(())
}
