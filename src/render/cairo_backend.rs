use cairo::{Context, Format, ImageSurface};
use image::{Rgba, RgbaImage};
use pango::FontDescription;
use std::f64::consts::TAU;
use tracing::trace;

use crate::error::{ChartError, ChartResult};
use crate::render::{
    CirclePrimitive, Color, LinePrimitive, Primitive, RasterSnapshot, RectPrimitive, RenderFrame,
    RenderStats, Renderer, TextHAlign, TextPrimitive,
};

const LABEL_FONT_FAMILY: &str = "Sans";

/// Renderers that can paint a chart frame onto a Cairo context owned by the
/// host, such as a widget draw callback.
pub trait CairoContextRenderer {
    fn render_on_cairo_context(
        &mut self,
        context: &Context,
        frame: &RenderFrame,
    ) -> ChartResult<()>;
}

/// Chart rasterizer backed by Cairo, with Pango laying out axis and legend
/// labels in a system sans font.
///
/// Text shaping goes through Pango rather than usvg, so glyph metrics can differ
/// slightly from the pixmap backend on the same host.
#[derive(Debug)]
pub struct CairoRenderer {
    surface: ImageSurface,
    clear_color: Color,
    last_stats: RenderStats,
}

impl CairoRenderer {
    pub fn new(width: i32, height: i32) -> ChartResult<Self> {
        if width <= 0 || height <= 0 {
            return Err(ChartError::Render(format!(
                "cairo surface {width}x{height} must have a positive size"
            )));
        }
        let surface = ImageSurface::create(Format::ARgb32, width, height)
            .map_err(|err| cairo_error("create surface", err))?;
        Ok(Self {
            surface,
            clear_color: Color::WHITE,
            last_stats: RenderStats::default(),
        })
    }

    #[must_use]
    pub fn surface(&self) -> &ImageSurface {
        &self.surface
    }

    pub fn set_clear_color(&mut self, color: Color) -> ChartResult<()> {
        color.validate()?;
        self.clear_color = color;
        Ok(())
    }

    #[must_use]
    pub fn last_stats(&self) -> RenderStats {
        self.last_stats
    }

    fn paint_frame(&mut self, context: &Context, frame: &RenderFrame) -> ChartResult<()> {
        frame.validate()?;

        set_source(context, self.clear_color);
        context
            .paint()
            .map_err(|err| cairo_error("clear surface", err))?;

        let mut stats = RenderStats::default();
        for primitive in &frame.primitives {
            match primitive {
                Primitive::Line(line) => stroke_line(context, line)?,
                Primitive::Rect(rect) => fill_rect(context, rect)?,
                Primitive::Circle(circle) => fill_marker(context, circle)?,
                Primitive::Text(text) => show_label(context, text)?,
            }
            stats.record(primitive);
        }

        trace!(?stats, "cairo frame rendered");
        self.last_stats = stats;
        Ok(())
    }
}

impl Renderer for CairoRenderer {
    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()> {
        let context =
            Context::new(&self.surface).map_err(|err| cairo_error("create context", err))?;
        self.paint_frame(&context, frame)
    }
}

impl CairoContextRenderer for CairoRenderer {
    fn render_on_cairo_context(
        &mut self,
        context: &Context,
        frame: &RenderFrame,
    ) -> ChartResult<()> {
        self.paint_frame(context, frame)
    }
}

impl RasterSnapshot for CairoRenderer {
    /// Converts the premultiplied native-endian ARGB surface into straight RGBA.
    fn snapshot(&mut self) -> ChartResult<RgbaImage> {
        self.surface.flush();
        let width = u32::try_from(self.surface.width())
            .map_err(|_| ChartError::Render("cairo surface width is negative".to_owned()))?;
        let height = u32::try_from(self.surface.height())
            .map_err(|_| ChartError::Render("cairo surface height is negative".to_owned()))?;
        let stride = usize::try_from(self.surface.stride())
            .map_err(|_| ChartError::Render("cairo surface stride is negative".to_owned()))?;
        let data = self
            .surface
            .data()
            .map_err(|err| ChartError::Render(format!("failed to borrow cairo surface: {err}")))?;

        Ok(RgbaImage::from_fn(width, height, |x, y| {
            let offset = y as usize * stride + x as usize * 4;
            let argb = u32::from_ne_bytes([
                data[offset],
                data[offset + 1],
                data[offset + 2],
                data[offset + 3],
            ]);
            unpremultiply(argb)
        }))
    }
}

fn unpremultiply(argb: u32) -> Rgba<u8> {
    let alpha = (argb >> 24) & 0xff;
    let channel = |shift: u32| {
        let value = (argb >> shift) & 0xff;
        if alpha == 0 {
            0
        } else {
            ((value * 255 + alpha / 2) / alpha).min(255) as u8
        }
    };
    Rgba([channel(16), channel(8), channel(0), alpha as u8])
}

fn stroke_line(context: &Context, line: &LinePrimitive) -> ChartResult<()> {
    set_source(context, line.color);
    context.set_line_width(line.stroke_width);
    context.set_line_cap(cairo::LineCap::Round);
    context.move_to(line.x1, line.y1);
    context.line_to(line.x2, line.y2);
    context
        .stroke()
        .map_err(|err| cairo_error("stroke line", err))
}

fn fill_rect(context: &Context, rect: &RectPrimitive) -> ChartResult<()> {
    context.rectangle(rect.x, rect.y, rect.width, rect.height);
    set_source(context, rect.fill_color);
    if rect.border_width <= 0.0 {
        return context
            .fill()
            .map_err(|err| cairo_error("fill rectangle", err));
    }
    context
        .fill_preserve()
        .map_err(|err| cairo_error("fill rectangle", err))?;
    set_source(context, rect.border_color);
    context.set_line_width(rect.border_width);
    context
        .stroke()
        .map_err(|err| cairo_error("outline rectangle", err))
}

fn fill_marker(context: &Context, circle: &CirclePrimitive) -> ChartResult<()> {
    set_source(context, circle.color);
    context.new_sub_path();
    context.arc(circle.center_x, circle.center_y, circle.radius, 0.0, TAU);
    context
        .fill()
        .map_err(|err| cairo_error("fill marker", err))
}

/// `(x, y)` is the top edge of the label box, matching the pixmap backend.
fn show_label(context: &Context, text: &TextPrimitive) -> ChartResult<()> {
    let layout = pangocairo::functions::create_layout(context);
    let font = FontDescription::from_string(&format!(
        "{LABEL_FONT_FAMILY} {}px",
        text.font_size_px
    ));
    layout.set_font_description(Some(&font));
    layout.set_text(&text.text);

    let width = f64::from(layout.pixel_size().0);
    let shift = match text.h_align {
        TextHAlign::Left => 0.0,
        TextHAlign::Center => -width / 2.0,
        TextHAlign::Right => -width,
    };

    context
        .save()
        .map_err(|err| cairo_error("save context", err))?;
    context.translate(text.x, text.y);
    context.rotate(text.rotation_deg.to_radians());
    set_source(context, text.color);
    context.move_to(shift, 0.0);
    pangocairo::functions::show_layout(context, &layout);
    context
        .restore()
        .map_err(|err| cairo_error("restore context", err))
}

fn set_source(context: &Context, color: Color) {
    context.set_source_rgba(color.red, color.green, color.blue, color.alpha);
}

fn cairo_error(action: &str, err: cairo::Error) -> ChartError {
    ChartError::Render(format!("cairo failed to {action}: {err}"))
}
