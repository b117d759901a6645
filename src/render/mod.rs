mod frame;
mod null_renderer;
mod pixmap_backend;
mod primitives;

pub use frame::{Primitive, RenderFrame, RenderStats};
pub use null_renderer::NullRenderer;
pub use pixmap_backend::{MAX_PIXMAP_PIXELS, PixmapRenderer};
pub use primitives::{
    CirclePrimitive, Color, LinePrimitive, RectPrimitive, TextHAlign, TextPrimitive,
};

use image::RgbaImage;

use crate::error::ChartResult;

/// Contract implemented by any rendering backend.
///
/// Backends receive a fully materialized, deterministic `RenderFrame` so
/// drawing code remains isolated from figure composition.
pub trait Renderer {
    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()>;
}

/// Renderers that can hand back the pixels of their last frame.
pub trait RasterSnapshot: Renderer {
    fn snapshot(&mut self) -> ChartResult<RgbaImage>;
}

#[cfg(feature = "cairo-backend")]
mod cairo_backend;
#[cfg(feature = "cairo-backend")]
pub use cairo_backend::{CairoContextRenderer, CairoRenderer};
