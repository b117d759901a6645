use std::fmt;
use std::fmt::Write as _;
use std::sync::{Arc, OnceLock};

use image::{Rgba, RgbaImage};
use tiny_skia::{FillRule, LineCap, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};
use tracing::{debug, trace};
use usvg::fontdb;

use crate::error::{ChartError, ChartResult};
use crate::render::{
    CirclePrimitive, Color, LinePrimitive, Primitive, RasterSnapshot, RectPrimitive, RenderFrame,
    RenderStats, Renderer, TextHAlign, TextPrimitive,
};

/// Largest surface the pixmap backend agrees to allocate.
pub const MAX_PIXMAP_PIXELS: u64 = 64 * 1024 * 1024;

const LABEL_FONT_FAMILIES: &str = "DejaVu Sans, Liberation Sans, Arial, Helvetica, sans-serif";

/// Distance from the top of a label box to its baseline, in font sizes.
const LABEL_ASCENT: f64 = 0.8;

/// Pure-Rust rasterizer on a `tiny-skia` pixmap.
///
/// Shapes are filled and stroked by `tiny-skia`; labels are laid out by `usvg`
/// against the host's system fonts and painted by `resvg`. Hosts without any
/// font still get every shape, only the labels are missing.
pub struct PixmapRenderer {
    pixmap: Pixmap,
    clear_color: Color,
    text_options: usvg::Options<'static>,
    last_stats: RenderStats,
}

impl fmt::Debug for PixmapRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixmapRenderer")
            .field("width", &self.pixmap.width())
            .field("height", &self.pixmap.height())
            .field("clear_color", &self.clear_color)
            .field("last_stats", &self.last_stats)
            .finish_non_exhaustive()
    }
}

impl PixmapRenderer {
    pub fn new(width: u32, height: u32) -> ChartResult<Self> {
        if width == 0 || height == 0 {
            return Err(ChartError::Render(
                "pixmap surface size must be > 0".to_owned(),
            ));
        }
        let pixels = u64::from(width) * u64::from(height);
        if pixels > MAX_PIXMAP_PIXELS {
            return Err(ChartError::Render(format!(
                "pixmap surface {width}x{height} exceeds {MAX_PIXMAP_PIXELS} pixels"
            )));
        }
        let pixmap = Pixmap::new(width, height).ok_or_else(|| {
            ChartError::Render(format!("failed to allocate {width}x{height} pixmap"))
        })?;

        let mut text_options = usvg::Options::default();
        text_options.fontdb = system_fonts();

        Ok(Self {
            pixmap,
            clear_color: Color::WHITE,
            text_options,
            last_stats: RenderStats::default(),
        })
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

    /// `true` when at least one system font was found for labels.
    #[must_use]
    pub fn has_label_fonts(&self) -> bool {
        !self.text_options.fontdb.is_empty()
    }

    fn draw_line(&mut self, line: &LinePrimitive) {
        let mut builder = PathBuilder::new();
        builder.move_to(line.x1 as f32, line.y1 as f32);
        builder.line_to(line.x2 as f32, line.y2 as f32);
        let Some(path) = builder.finish() else {
            return;
        };
        let stroke = Stroke {
            width: line.stroke_width as f32,
            line_cap: LineCap::Round,
            ..Stroke::default()
        };
        self.pixmap
            .stroke_path(&path, &paint(line.color), &stroke, Transform::identity(), None);
    }

    fn draw_rect(&mut self, rect: &RectPrimitive) {
        if rect.width <= 0.0 || rect.height <= 0.0 {
            return;
        }
        let Some(area) = Rect::from_xywh(
            rect.x as f32,
            rect.y as f32,
            rect.width as f32,
            rect.height as f32,
        ) else {
            return;
        };
        self.pixmap
            .fill_rect(area, &paint(rect.fill_color), Transform::identity(), None);

        if rect.border_width > 0.0 {
            let outline = PathBuilder::from_rect(area);
            let stroke = Stroke {
                width: rect.border_width as f32,
                ..Stroke::default()
            };
            self.pixmap.stroke_path(
                &outline,
                &paint(rect.border_color),
                &stroke,
                Transform::identity(),
                None,
            );
        }
    }

    fn draw_circle(&mut self, circle: &CirclePrimitive) {
        let Some(path) = PathBuilder::from_circle(
            circle.center_x as f32,
            circle.center_y as f32,
            circle.radius as f32,
        ) else {
            return;
        };
        self.pixmap.fill_path(
            &path,
            &paint(circle.color),
            FillRule::Winding,
            Transform::identity(),
            None,
        );
    }

    fn draw_text(&mut self, text: &TextPrimitive) -> ChartResult<()> {
        let svg = label_svg(text, self.pixmap.width(), self.pixmap.height());
        let tree = usvg::Tree::from_str(&svg, &self.text_options)
            .map_err(|err| ChartError::Render(format!("failed to lay out `{}`: {err}", text.text)))?;
        resvg::render(&tree, Transform::identity(), &mut self.pixmap.as_mut());
        Ok(())
    }
}

impl Renderer for PixmapRenderer {
    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()> {
        frame.validate()?;
        if frame.viewport.width != self.pixmap.width()
            || frame.viewport.height != self.pixmap.height()
        {
            return Err(ChartError::Render(format!(
                "frame viewport {}x{} does not match pixmap surface {}x{}",
                frame.viewport.width,
                frame.viewport.height,
                self.pixmap.width(),
                self.pixmap.height()
            )));
        }
        let [red, green, blue, alpha] = self.clear_color.to_rgba8();
        self.pixmap
            .fill(tiny_skia::Color::from_rgba8(red, green, blue, alpha));

        let mut stats = RenderStats::default();
        for primitive in &frame.primitives {
            match primitive {
                Primitive::Line(line) => self.draw_line(line),
                Primitive::Rect(rect) => self.draw_rect(rect),
                Primitive::Circle(circle) => self.draw_circle(circle),
                Primitive::Text(text) => self.draw_text(text)?,
            }
            stats.record(primitive);
        }

        trace!(?stats, "pixmap frame rendered");
        self.last_stats = stats;
        Ok(())
    }
}

impl RasterSnapshot for PixmapRenderer {
    /// Converts the premultiplied pixmap into straight RGBA.
    fn snapshot(&mut self) -> ChartResult<RgbaImage> {
        let width = self.pixmap.width();
        let pixels = self.pixmap.pixels();
        Ok(RgbaImage::from_fn(width, self.pixmap.height(), |x, y| {
            let color = pixels[(y * width + x) as usize].demultiply();
            Rgba([color.red(), color.green(), color.blue(), color.alpha()])
        }))
    }
}

/// Font database shared by every renderer in the process.
fn system_fonts() -> Arc<fontdb::Database> {
    static FONTS: OnceLock<Arc<fontdb::Database>> = OnceLock::new();
    Arc::clone(FONTS.get_or_init(|| {
        let mut database = fontdb::Database::new();
        database.load_system_fonts();
        debug!(faces = database.len(), "system fonts loaded for labels");
        Arc::new(database)
    }))
}

fn paint(color: Color) -> Paint<'static> {
    let [red, green, blue, alpha] = color.to_rgba8();
    let mut paint = Paint::default();
    paint.set_color_rgba8(red, green, blue, alpha);
    paint.anti_alias = true;
    paint
}

/// One-label SVG document covering the whole surface.
///
/// The label box is anchored at its top edge and rotated around the anchor,
/// the same convention the Cairo backend follows.
fn label_svg(text: &TextPrimitive, width: u32, height: u32) -> String {
    let anchor = match text.h_align {
        TextHAlign::Left => "start",
        TextHAlign::Center => "middle",
        TextHAlign::Right => "end",
    };
    let [red, green, blue, _] = text.color.to_rgba8();

    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
    );
    let _ = write!(
        svg,
        r#"<text transform="translate({x:.3} {y:.3}) rotate({rotation:.3})" x="0" y="{baseline:.3}" font-family="{LABEL_FONT_FAMILIES}" font-size="{size:.3}" text-anchor="{anchor}" fill="rgb({red},{green},{blue})" fill-opacity="{alpha:.4}">{label}</text>"#,
        x = text.x,
        y = text.y,
        rotation = text.rotation_deg,
        baseline = text.font_size_px * LABEL_ASCENT,
        size = text.font_size_px,
        alpha = text.color.alpha,
        label = escape_xml(&text.text),
    );
    svg.push_str("</svg>");
    svg
}

fn escape_xml(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Viewport;

    #[test]
    fn rejects_empty_and_oversized_surfaces() {
        assert!(matches!(
            PixmapRenderer::new(0, 10),
            Err(ChartError::Render(_))
        ));
        assert!(matches!(
            PixmapRenderer::new(100_000, 100_000),
            Err(ChartError::Render(_))
        ));
    }

    #[test]
    fn opaque_rect_fills_its_pixels() {
        let mut renderer = PixmapRenderer::new(20, 20).expect("renderer");
        let frame = RenderFrame::new(Viewport::new(20, 20))
            .with_rect(RectPrimitive::new(5.0, 5.0, 10.0, 10.0, Color::BLACK));
        renderer.render(&frame).expect("render");
        let image = renderer.snapshot().expect("snapshot");

        assert_eq!(image.get_pixel(10, 10).0, [0, 0, 0, 255]);
        assert_eq!(image.get_pixel(1, 1).0, [255, 255, 255, 255]);
        assert_eq!(renderer.last_stats().rects_drawn, 1);
    }

    #[test]
    fn translucent_rect_blends_with_background() {
        let mut renderer = PixmapRenderer::new(4, 4).expect("renderer");
        let frame = RenderFrame::new(Viewport::new(4, 4)).with_rect(RectPrimitive::new(
            0.0,
            0.0,
            4.0,
            4.0,
            Color::BLACK.with_alpha(0.5),
        ));
        renderer.render(&frame).expect("render");

        let [red, green, blue, alpha] = renderer.snapshot().expect("snapshot").get_pixel(2, 2).0;
        assert_eq!(alpha, 255);
        assert!((126..=128).contains(&red));
        assert_eq!(red, green);
        assert_eq!(green, blue);
    }

    #[test]
    fn empty_bar_paints_nothing() {
        let mut renderer = PixmapRenderer::new(10, 10).expect("renderer");
        let frame = RenderFrame::new(Viewport::new(10, 10))
            .with_rect(RectPrimitive::new(2.0, 5.0, 4.0, 0.0, Color::BLACK));
        renderer.render(&frame).expect("render");

        let image = renderer.snapshot().expect("snapshot");
        assert!(image.pixels().all(|pixel| pixel.0 == [255, 255, 255, 255]));
        assert_eq!(renderer.last_stats().rects_drawn, 1);
    }

    #[test]
    fn frame_must_match_surface() {
        let mut renderer = PixmapRenderer::new(10, 10).expect("renderer");
        let frame = RenderFrame::new(Viewport::new(20, 10));
        assert!(matches!(renderer.render(&frame), Err(ChartError::Render(_))));
    }

    #[test]
    fn labels_are_escaped_and_anchored() {
        let label = TextPrimitive::new(
            "R&D <Ltd>",
            10.0,
            20.0,
            12.0,
            Color::BLACK,
            TextHAlign::Right,
        )
        .with_rotation(-90.0);
        let svg = label_svg(&label, 100, 50);

        assert!(svg.contains("R&amp;D &lt;Ltd&gt;"));
        assert!(svg.contains(r#"text-anchor="end""#));
        assert!(svg.contains("translate(10.000 20.000) rotate(-90.000)"));
        assert!(svg.contains(r#"y="9.600""#));
    }

    #[test]
    fn text_marks_pixels_when_fonts_exist() {
        let mut renderer = PixmapRenderer::new(60, 20).expect("renderer");
        let frame = RenderFrame::new(Viewport::new(60, 20)).with_text(TextPrimitive::new(
            "2020",
            2.0,
            2.0,
            14.0,
            Color::BLACK,
            TextHAlign::Left,
        ));
        renderer.render(&frame).expect("render");
        assert_eq!(renderer.last_stats().texts_drawn, 1);

        if renderer.has_label_fonts() {
            let image = renderer.snapshot().expect("snapshot");
            assert!(image.pixels().any(|pixel| pixel.0[0] < 128));
        }
    }
}
