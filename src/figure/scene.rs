use crate::core::{PlotArea, Viewport, project_bars, project_line};
use crate::error::{ChartError, ChartResult};
use crate::figure::{Axis, ChartFigure, LegendEntry, estimate_text_width_pt};
use crate::metric_spec::{AxisSide, PlotType};
use crate::render::{
    CirclePrimitive, Color, LinePrimitive, Primitive, RectPrimitive, RenderFrame, TextHAlign,
    TextPrimitive,
};

/// Bars thinner than this many pixels are not emitted.
const MIN_BAR_HEIGHT_PX: f64 = 1e-6;
const LEGEND_FRAME_COLOR: Color = Color::rgb(0.8, 0.8, 0.8);

/// Point-to-pixel mapping for one viewport.
#[derive(Debug, Clone, Copy)]
struct PointScale {
    x: f64,
    y: f64,
    size: f64,
}

impl PointScale {
    fn new(figure: &ChartFigure, viewport: Viewport) -> Self {
        let layout = figure.layout();
        let x = f64::from(viewport.width) / layout.figure_width_pt;
        let y = f64::from(viewport.height) / layout.figure_height_pt;
        Self {
            x,
            y,
            size: x.min(y),
        }
    }

    fn plot(self, plot: PlotArea) -> ChartResult<PlotArea> {
        PlotArea::new(
            plot.left * self.x,
            plot.top * self.y,
            plot.width * self.x,
            plot.height * self.y,
        )
    }
}

/// Materializes `figure` as draw commands for a `viewport`-sized surface.
///
/// Paint order: background, series in draw order, plot frame, ticks and tick
/// labels, axis labels, legend.
pub fn build_scene(figure: &ChartFigure, viewport: Viewport) -> ChartResult<RenderFrame> {
    if !viewport.is_valid() {
        return Err(ChartError::InvalidViewport {
            width: viewport.width,
            height: viewport.height,
        });
    }

    let style = figure.style();
    let scale = PointScale::new(figure, viewport);
    let plot = scale.plot(figure.layout().plot)?;
    let mut frame = RenderFrame::new(viewport);

    frame.push(Primitive::Rect(RectPrimitive::new(
        0.0,
        0.0,
        f64::from(viewport.width),
        f64::from(viewport.height),
        style.background,
    )));

    push_series(&mut frame, figure, plot, scale)?;
    push_plot_frame(&mut frame, figure, plot, scale);
    push_value_ticks(&mut frame, figure, figure.left_axis(), plot, scale)?;
    if let Some(right) = figure.right_axis() {
        push_value_ticks(&mut frame, figure, right, plot, scale)?;
    }
    push_year_ticks(&mut frame, figure, plot, scale)?;
    push_axis_labels(&mut frame, figure, plot, scale);
    if style.show_legend {
        push_legend(&mut frame, figure, plot, scale);
    }

    Ok(frame)
}

fn push_series(
    frame: &mut RenderFrame,
    figure: &ChartFigure,
    plot: PlotArea,
    scale: PointScale,
) -> ChartResult<()> {
    let style = figure.style();
    let year_scale = figure.year_scale();

    for series in figure.series() {
        let Some(axis) = figure.axis(series.axis()) else {
            continue;
        };
        match series.plot_type() {
            PlotType::Bar => {
                let fill = series.color().with_alpha(style.bar_alpha);
                let bars = project_bars(
                    series.points(),
                    year_scale,
                    axis.scale(),
                    plot,
                    style.bar_width_years,
                )?;
                for bar in bars.into_iter().filter(|bar| bar.height() > MIN_BAR_HEIGHT_PX) {
                    frame.push(Primitive::Rect(RectPrimitive::new(
                        bar.x_left,
                        bar.y_top,
                        bar.x_right - bar.x_left,
                        bar.height(),
                        fill,
                    )));
                }
            }
            PlotType::Line => {
                let projection = project_line(series.points(), year_scale, axis.scale(), plot)?;
                let stroke_width = style.line_width_pt * scale.size;
                for segment in projection.segments {
                    frame.push(Primitive::Line(LinePrimitive::new(
                        segment.x1,
                        segment.y1,
                        segment.x2,
                        segment.y2,
                        stroke_width,
                        series.color(),
                    )));
                }
                let radius = style.marker_radius_pt * scale.size;
                for marker in projection.markers {
                    frame.push(Primitive::Circle(CirclePrimitive::new(
                        marker.x,
                        marker.y,
                        radius,
                        series.color(),
                    )));
                }
            }
        }
    }
    Ok(())
}

fn push_plot_frame(frame: &mut RenderFrame, figure: &ChartFigure, plot: PlotArea, scale: PointScale) {
    let style = figure.style();
    let width = style.axis_line_width_pt * scale.size;
    let (left, top, right, bottom) = (plot.left, plot.top, plot.right(), plot.bottom());
    for (x1, y1, x2, y2) in [
        (left, top, left, bottom),
        (left, bottom, right, bottom),
        (right, bottom, right, top),
        (right, top, left, top),
    ] {
        frame.push(Primitive::Line(LinePrimitive::new(
            x1,
            y1,
            x2,
            y2,
            width,
            style.foreground,
        )));
    }
}

fn push_value_ticks(
    frame: &mut RenderFrame,
    figure: &ChartFigure,
    axis: &Axis,
    plot: PlotArea,
    scale: PointScale,
) -> ChartResult<()> {
    let style = figure.style();
    let tick_length = style.tick_length_pt * scale.x;
    let tick_pad = style.tick_pad_pt * scale.x;
    let font_px = style.tick_font_pt * scale.size;
    let stroke_width = style.axis_line_width_pt * scale.size;

    let (edge, direction, h_align) = match axis.side() {
        AxisSide::Left => (plot.left, -1.0, TextHAlign::Right),
        AxisSide::Right => (plot.right(), 1.0, TextHAlign::Left),
    };

    for tick in axis.ticks() {
        let y = axis.scale().value_to_pixel(tick.value, plot)?;
        frame.push(Primitive::Line(LinePrimitive::new(
            edge,
            y,
            edge + direction * tick_length,
            y,
            stroke_width,
            style.foreground,
        )));
        frame.push(Primitive::Text(TextPrimitive::new(
            tick.label.clone(),
            edge + direction * (tick_length + tick_pad),
            y - font_px * 0.5,
            font_px,
            style.foreground,
            h_align,
        )));
    }
    Ok(())
}

fn push_year_ticks(
    frame: &mut RenderFrame,
    figure: &ChartFigure,
    plot: PlotArea,
    scale: PointScale,
) -> ChartResult<()> {
    let style = figure.style();
    let tick_length = style.tick_length_pt * scale.y;
    let tick_pad = style.tick_pad_pt * scale.y;
    let font_px = style.tick_font_pt * scale.size;
    let stroke_width = style.axis_line_width_pt * scale.size;
    let bottom = plot.bottom();

    for year in figure.x_ticks() {
        let x = figure.year_scale().year_to_pixel(f64::from(*year), plot)?;
        frame.push(Primitive::Line(LinePrimitive::new(
            x,
            bottom,
            x,
            bottom + tick_length,
            stroke_width,
            style.foreground,
        )));
        frame.push(Primitive::Text(TextPrimitive::new(
            year.to_string(),
            x,
            bottom + tick_length + tick_pad,
            font_px,
            style.foreground,
            TextHAlign::Center,
        )));
    }
    Ok(())
}

fn push_axis_labels(frame: &mut RenderFrame, figure: &ChartFigure, plot: PlotArea, scale: PointScale) {
    let style = figure.style();
    let layout = figure.layout();
    let font_px = style.label_font_pt * scale.size;
    let center_y = plot.top + plot.height * 0.5;

    if let Some(label) = figure.x_label() {
        let y = plot.bottom()
            + (style.tick_length_pt + style.tick_pad_pt + style.tick_font_pt + style.label_pad_pt)
                * scale.y;
        frame.push(Primitive::Text(TextPrimitive::new(
            label,
            plot.left + plot.width * 0.5,
            y,
            font_px,
            style.foreground,
            TextHAlign::Center,
        )));
    }

    // Rotated labels read bottom to top; the text box grows to the right of x.
    if let Some(label) = figure.left_axis().y_label() {
        let x = plot.left
            - (style.tick_length_pt
                + style.tick_pad_pt
                + layout.left_tick_label_width_pt
                + style.label_pad_pt
                + style.label_font_pt)
                * scale.x;
        frame.push(Primitive::Text(
            TextPrimitive::new(label, x, center_y, font_px, style.foreground, TextHAlign::Center)
                .with_rotation(-90.0),
        ));
    }

    if let Some(label) = figure.right_axis().and_then(Axis::y_label) {
        let x = plot.right()
            + (style.tick_length_pt
                + style.tick_pad_pt
                + layout.right_tick_label_width_pt
                + style.label_pad_pt)
                * scale.x;
        frame.push(Primitive::Text(
            TextPrimitive::new(label, x, center_y, font_px, style.foreground, TextHAlign::Center)
                .with_rotation(-90.0),
        ));
    }
}

fn push_legend(frame: &mut RenderFrame, figure: &ChartFigure, plot: PlotArea, scale: PointScale) {
    let entries = figure.legend_entries();
    if entries.is_empty() {
        return;
    }

    let style = figure.style();
    let font_pt = style.legend_font_pt;
    let font_px = font_pt * scale.size;
    let padding = font_px * 0.5;
    let row_height = font_px * 1.4;
    let swatch_width = font_px * 2.0;
    let gap = font_px * 0.6;
    let text_width = entries
        .iter()
        .map(|entry| estimate_text_width_pt(&entry.label, font_pt) * scale.size)
        .fold(0.0, f64::max);

    let box_left = plot.left + padding;
    let box_top = plot.top + padding;
    let box_width = padding * 2.0 + swatch_width + gap + text_width;
    let box_height = padding * 2.0 + row_height * entries.len() as f64;
    frame.push(Primitive::Rect(
        RectPrimitive::new(
            box_left,
            box_top,
            box_width,
            box_height,
            style.background.with_alpha(0.8),
        )
        .with_border(style.axis_line_width_pt * scale.size, LEGEND_FRAME_COLOR),
    ));

    for (row, entry) in entries.iter().enumerate() {
        let row_top = box_top + padding + row_height * row as f64;
        let center_y = row_top + row_height * 0.5;
        let swatch_left = box_left + padding;
        push_legend_swatch(frame, figure, entry, swatch_left, swatch_width, center_y, scale);
        frame.push(Primitive::Text(TextPrimitive::new(
            entry.label.clone(),
            swatch_left + swatch_width + gap,
            center_y - font_px * 0.5,
            font_px,
            style.foreground,
            TextHAlign::Left,
        )));
    }
}

fn push_legend_swatch(
    frame: &mut RenderFrame,
    figure: &ChartFigure,
    entry: &LegendEntry,
    left: f64,
    width: f64,
    center_y: f64,
    scale: PointScale,
) {
    let style = figure.style();
    match entry.plot_type {
        PlotType::Bar => {
            let height = width * 0.35;
            frame.push(Primitive::Rect(RectPrimitive::new(
                left,
                center_y - height * 0.5,
                width,
                height,
                entry.color.with_alpha(style.bar_alpha),
            )));
        }
        PlotType::Line => {
            frame.push(Primitive::Line(LinePrimitive::new(
                left,
                center_y,
                left + width,
                center_y,
                style.line_width_pt * scale.size,
                entry.color,
            )));
            frame.push(Primitive::Circle(CirclePrimitive::new(
                left + width * 0.5,
                center_y,
                style.marker_radius_pt * scale.size,
                entry.color,
            )));
        }
    }
}
