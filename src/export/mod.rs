//! Raster and workbook export.
//!
//! The chart image travels in memory: [`ImageExporter`] produces an
//! [`ImageAsset`] that the workbook assembler consumes by value.

mod raster;
mod workbook;

pub use raster::{ImageAsset, ImageExporter, RasterBackend, RenderSettings};
pub use workbook::{CellAnchor, WorkbookAssembler, WorkbookExport, WorkbookOptions};
