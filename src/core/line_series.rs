use crate::core::{DataPoint, PixelPoint, PlotArea, ValueScale, YearScale};
use crate::error::ChartResult;
use serde::{Deserialize, Serialize};

/// Projected line segment in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

/// Pixel geometry of one line series: connecting segments plus one marker per
/// present sample.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineProjection {
    pub segments: Vec<LineSegment>,
    pub markers: Vec<PixelPoint>,
}

/// Projects yearly samples into connecting segments and marker centers.
///
/// Samples without a value break the line: no segment is drawn across them.
/// Input order is kept, so callers pass samples already sorted by year.
pub fn project_line(
    points: &[DataPoint],
    year_scale: YearScale,
    value_scale: ValueScale,
    plot: PlotArea,
) -> ChartResult<LineProjection> {
    let mut projection = LineProjection::default();
    let mut previous: Option<PixelPoint> = None;

    for point in points {
        let Some(value) = point.value.filter(|value| value.is_finite()) else {
            previous = None;
            continue;
        };

        let mapped = PixelPoint::new(
            year_scale.year_to_pixel(f64::from(point.year), plot)?,
            value_scale.value_to_pixel(value, plot)?,
        );
        if let Some(prev) = previous {
            projection.segments.push(LineSegment {
                x1: prev.x,
                y1: prev.y,
                x2: mapped.x,
                y2: mapped.y,
            });
        }
        projection.markers.push(mapped);
        previous = Some(mapped);
    }

    Ok(projection)
}
