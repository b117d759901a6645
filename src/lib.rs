//! metrics-chart: dual-axis company metrics charts with spreadsheet export.
//!
//! The crate is split the same way the export cycle runs: `dataset` loads and
//! validates uploads, `metric_spec` describes what to plot, `figure` composes
//! a resolution-independent dual-axis chart, `render` turns scenes into
//! pixels, and `export` produces the PNG and the xlsx workbook.

pub mod core;
pub mod dataset;
pub mod error;
pub mod export;
pub mod figure;
pub mod metric_spec;
pub mod pipeline;
pub mod render;
pub mod telemetry;

pub use dataset::{CellValue, CompanySlice, Dataset, Row};
pub use error::{ChartError, ChartResult};
pub use export::{
    CellAnchor, ImageAsset, ImageExporter, RenderSettings, WorkbookAssembler, WorkbookExport,
    WorkbookOptions,
};
pub use figure::{ChartComposer, ChartFigure, FigureStyle};
pub use metric_spec::{AxisSide, Metric, MetricSpec, MetricSpecs, PlotType, build_metric_specs};
pub use pipeline::{ExportOutcome, MetricsPipeline, PipelineConfig};
