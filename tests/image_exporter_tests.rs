use metrics_chart::core::Viewport;
use metrics_chart::dataset::{CompanySlice, Row};
use metrics_chart::{
    AxisSide, ChartComposer, ChartError, ChartFigure, ImageExporter, Metric, MetricSpec,
    MetricSpecs, PlotType, RenderSettings,
};

fn figure() -> ChartFigure {
    let slice = CompanySlice::new(
        "Acme",
        vec![
            Row::new("Acme", 2020, Some(100.0), Some(10.0), Some(0.12)),
            Row::new("Acme", 2021, Some(150.0), Some(20.0), Some(0.15)),
            Row::new("Acme", 2022, Some(200.0), Some(30.0), Some(0.18)),
        ],
    );
    let specs = MetricSpecs::new(vec![
        MetricSpec::new(Metric::Sales, PlotType::Bar, AxisSide::Left),
        MetricSpec::new(Metric::RoCE, PlotType::Line, AxisSide::Right),
    ])
    .expect("specs");
    ChartComposer::default().compose(&slice, &specs).expect("figure")
}

fn small_settings() -> RenderSettings {
    RenderSettings::default().with_dpi(40.0)
}

#[test]
fn rendering_is_deterministic() {
    let exporter = ImageExporter::new(small_settings()).expect("exporter");
    let figure = figure();
    let first = exporter.render(&figure).expect("first");
    let second = exporter.render(&figure).expect("second");
    assert_eq!(first.png_bytes(), second.png_bytes());
    assert_eq!(first, second);
}

#[test]
fn output_is_a_decodable_png_of_the_reported_size() {
    let asset = ImageExporter::new(small_settings())
        .expect("exporter")
        .render(&figure())
        .expect("asset");

    assert!(asset.png_bytes().starts_with(b"\x89PNG\r\n\x1a\n"));
    let decoded = image::load_from_memory(asset.png_bytes()).expect("decode");
    assert_eq!(decoded.width(), asset.width());
    assert_eq!(decoded.height(), asset.height());
    assert_eq!(asset.dpi(), 40.0);

    let (width, height) = (asset.width(), asset.height());
    let owned = image::load_from_memory(&asset.into_png_bytes()).expect("decode owned");
    assert_eq!((owned.width(), owned.height()), (width, height));
}

#[test]
fn tight_crop_never_grows_the_image() {
    let figure = figure();
    let uncropped = ImageExporter::new(small_settings().with_tight_crop(false))
        .expect("exporter")
        .render(&figure)
        .expect("uncropped");
    let cropped = ImageExporter::new(small_settings())
        .expect("exporter")
        .render(&figure)
        .expect("cropped");

    assert_eq!((uncropped.width(), uncropped.height()), (400, 240));
    assert!(cropped.width() <= uncropped.width());
    assert!(cropped.height() <= uncropped.height());
}

#[test]
fn viewport_override_sets_the_surface_size() {
    let settings = RenderSettings::default()
        .with_viewport(Viewport::new(320, 200))
        .with_tight_crop(false);
    let asset = ImageExporter::new(settings)
        .expect("exporter")
        .render(&figure())
        .expect("asset");
    assert_eq!((asset.width(), asset.height()), (320, 200));
}

#[test]
fn empty_surface_is_a_render_error() {
    let settings = RenderSettings::default().with_viewport(Viewport::new(0, 200));
    let err = ImageExporter::new(settings)
        .expect("exporter")
        .render(&figure())
        .expect_err("no surface");
    assert!(matches!(err, ChartError::Render(_)));
}

#[test]
fn oversized_surface_is_a_render_error() {
    let settings = RenderSettings::default().with_viewport(Viewport::new(20_000, 20_000));
    let err = ImageExporter::new(settings)
        .expect("exporter")
        .render(&figure())
        .expect_err("too large");
    assert!(matches!(err, ChartError::Render(_)));
}

#[test]
fn empty_figure_still_renders() {
    let specs = MetricSpecs::new(vec![MetricSpec::new(
        Metric::Sales,
        PlotType::Line,
        AxisSide::Left,
    )])
    .expect("specs");
    let figure = ChartComposer::default()
        .compose(&CompanySlice::new("Ghost", Vec::new()), &specs)
        .expect("figure");
    let asset = ImageExporter::new(small_settings())
        .expect("exporter")
        .render(&figure)
        .expect("asset");
    assert!(asset.width() > 0 && asset.height() > 0);
}

#[test]
fn extreme_values_still_render() {
    let slice = CompanySlice::new(
        "Giant",
        vec![
            Row::new("Giant", 2020, Some(1e308), None, Some(-1e60)),
            Row::new("Giant", 2021, Some(-1e308), None, Some(1e60)),
        ],
    );
    let specs = MetricSpecs::new(vec![
        MetricSpec::new(Metric::Sales, PlotType::Bar, AxisSide::Left),
        MetricSpec::new(Metric::RoCE, PlotType::Line, AxisSide::Right),
    ])
    .expect("specs");
    let figure = ChartComposer::default().compose(&slice, &specs).expect("figure");
    let asset = ImageExporter::new(small_settings())
        .expect("exporter")
        .render(&figure)
        .expect("asset");
    assert!(asset.width() > 0 && asset.height() > 0);
}

#[test]
fn viewport_override_crops_like_the_matching_dpi() {
    let figure = figure();
    let by_viewport = ImageExporter::new(
        RenderSettings::default().with_viewport(Viewport::new(400, 240)),
    )
    .expect("exporter")
    .render(&figure)
    .expect("viewport render");
    let by_dpi = ImageExporter::new(small_settings())
        .expect("exporter")
        .render(&figure)
        .expect("dpi render");

    assert_eq!(by_viewport.dpi(), 40.0);
    assert_eq!(
        (by_viewport.width(), by_viewport.height()),
        (by_dpi.width(), by_dpi.height())
    );
    assert_eq!(by_viewport.png_bytes(), by_dpi.png_bytes());
}
