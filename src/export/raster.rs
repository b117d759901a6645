use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage, imageops};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::Viewport;
use crate::error::{ChartError, ChartResult};
use crate::figure::{ChartFigure, build_scene};
use crate::render::{
    Color, MAX_PIXMAP_PIXELS, PixmapRenderer, RasterSnapshot, RenderFrame, Renderer,
};

/// Rasterizer used by [`ImageExporter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RasterBackend {
    /// `tiny-skia` pixmap renderer, labels through `resvg`.
    #[default]
    Pixmap,
    /// Cairo/Pango renderer with system fonts.
    #[cfg(feature = "cairo-backend")]
    Cairo,
}

/// Raster output settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderSettings {
    #[serde(default = "default_dpi")]
    pub dpi: f64,
    /// Explicit pixel size; when absent the figure size times `dpi` is used.
    /// An explicit size also sets the effective dpi for crop padding.
    #[serde(default)]
    pub viewport: Option<Viewport>,
    #[serde(default = "default_tight_crop")]
    pub tight_crop: bool,
    #[serde(default = "default_crop_padding_in")]
    pub crop_padding_in: f64,
    #[serde(default)]
    pub backend: RasterBackend,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            dpi: default_dpi(),
            viewport: None,
            tight_crop: default_tight_crop(),
            crop_padding_in: default_crop_padding_in(),
            backend: RasterBackend::default(),
        }
    }
}

impl RenderSettings {
    #[must_use]
    pub fn with_dpi(mut self, dpi: f64) -> Self {
        self.dpi = dpi;
        self
    }

    #[must_use]
    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = Some(viewport);
        self
    }

    #[must_use]
    pub fn with_tight_crop(mut self, tight_crop: bool) -> Self {
        self.tight_crop = tight_crop;
        self
    }

    pub fn validate(&self) -> ChartResult<()> {
        if !self.dpi.is_finite() || self.dpi <= 0.0 {
            return Err(ChartError::Render(format!(
                "dpi must be finite and > 0, got {}",
                self.dpi
            )));
        }
        if !self.crop_padding_in.is_finite() || self.crop_padding_in < 0.0 {
            return Err(ChartError::Render(
                "crop padding must be finite and >= 0".to_owned(),
            ));
        }
        Ok(())
    }
}

fn default_dpi() -> f64 {
    100.0
}

fn default_tight_crop() -> bool {
    true
}

fn default_crop_padding_in() -> f64 {
    0.1
}

/// Encoded chart raster, ready for embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageAsset {
    png: Vec<u8>,
    width: u32,
    height: u32,
    dpi: f64,
}

impl ImageAsset {
    #[must_use]
    pub fn png_bytes(&self) -> &[u8] {
        &self.png
    }

    #[must_use]
    pub fn into_png_bytes(self) -> Vec<u8> {
        self.png
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn dpi(&self) -> f64 {
        self.dpi
    }
}

/// Renders composed figures to PNG.
///
/// Output is a pure function of the figure and the settings, so two renders
/// of the same figure produce identical bytes.
#[derive(Debug, Clone, Default)]
pub struct ImageExporter {
    settings: RenderSettings,
}

impl ImageExporter {
    pub fn new(settings: RenderSettings) -> ChartResult<Self> {
        settings.validate()?;
        Ok(Self { settings })
    }

    #[must_use]
    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn render(&self, figure: &ChartFigure) -> ChartResult<ImageAsset> {
        let settings = &self.settings;
        let (viewport, dpi) = match settings.viewport {
            Some(viewport) => (viewport, figure.dpi_for_viewport(viewport)),
            None => (figure.viewport_at_dpi(settings.dpi), settings.dpi),
        };
        if !viewport.is_valid() {
            return Err(ChartError::Render(format!(
                "cannot allocate a {}x{} drawing surface",
                viewport.width, viewport.height
            )));
        }
        if viewport.pixel_count() > MAX_PIXMAP_PIXELS {
            return Err(ChartError::Render(format!(
                "drawing surface {}x{} exceeds {MAX_PIXMAP_PIXELS} pixels",
                viewport.width, viewport.height
            )));
        }

        let frame = build_scene(figure, viewport)?;
        let background = figure.style().background;
        let raster = rasterize(&frame, settings.backend, background)?;

        let raster = if settings.tight_crop {
            let padding_px = (settings.crop_padding_in * dpi).round().max(0.0) as u32;
            tight_crop(raster, background, padding_px)
        } else {
            raster
        };

        let (width, height) = raster.dimensions();
        let png = encode_png(raster)?;
        debug!(
            company = figure.company(),
            width,
            height,
            bytes = png.len(),
            "chart image rendered"
        );

        Ok(ImageAsset {
            png,
            width,
            height,
            dpi,
        })
    }
}

fn rasterize(
    frame: &RenderFrame,
    backend: RasterBackend,
    background: Color,
) -> ChartResult<RgbaImage> {
    let viewport = frame.viewport;
    match backend {
        RasterBackend::Pixmap => {
            let mut renderer = PixmapRenderer::new(viewport.width, viewport.height)?;
            renderer.set_clear_color(background)?;
            snapshot_after_render(&mut renderer, frame)
        }
        #[cfg(feature = "cairo-backend")]
        RasterBackend::Cairo => {
            let to_i32 = |value: u32| {
                i32::try_from(value)
                    .map_err(|_| ChartError::Render(format!("surface size {value} is too large")))
            };
            let mut renderer =
                crate::render::CairoRenderer::new(to_i32(viewport.width)?, to_i32(viewport.height)?)?;
            renderer.set_clear_color(background)?;
            snapshot_after_render(&mut renderer, frame)
        }
    }
}

fn snapshot_after_render<R: RasterSnapshot>(
    renderer: &mut R,
    frame: &RenderFrame,
) -> ChartResult<RgbaImage> {
    renderer.render(frame)?;
    renderer.snapshot()
}

/// Crops borders that hold only `background`, keeping `padding_px` around the
/// drawn content. Images without content are returned unchanged.
fn tight_crop(raster: RgbaImage, background: Color, padding_px: u32) -> RgbaImage {
    let background = Rgba(background.to_rgba8());
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for (x, y, pixel) in raster.enumerate_pixels() {
        if *pixel == background {
            continue;
        }
        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
        });
    }
    let Some((x0, y0, x1, y1)) = bounds else {
        return raster;
    };

    let (width, height) = raster.dimensions();
    let left = x0.saturating_sub(padding_px);
    let top = y0.saturating_sub(padding_px);
    let right = x1.saturating_add(padding_px).min(width - 1);
    let bottom = y1.saturating_add(padding_px).min(height - 1);
    if left == 0 && top == 0 && right == width - 1 && bottom == height - 1 {
        return raster;
    }
    imageops::crop_imm(&raster, left, top, right - left + 1, bottom - top + 1).to_image()
}

fn encode_png(raster: RgbaImage) -> ChartResult<Vec<u8>> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(raster)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|err| ChartError::Render(format!("failed to encode png: {err}")))?;
    Ok(bytes)
}
