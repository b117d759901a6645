pub mod bar_series;
pub mod line_series;
pub mod scale;
pub mod types;
pub mod value_scale;
pub mod year_scale;

pub use bar_series::{BarGeometry, project_bars};
pub use line_series::{LineProjection, LineSegment, project_line};
pub use scale::LinearScale;
pub use types::{DataPoint, PixelPoint, PlotArea, Viewport};
pub use value_scale::{ValueScale, ValueScaleTuning, format_tick_value, nice_step};
pub use year_scale::{YearScale, YearScaleTuning};
