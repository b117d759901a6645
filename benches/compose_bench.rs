use criterion::{Criterion, criterion_group, criterion_main};
use metrics_chart::core::Viewport;
use metrics_chart::dataset::{CellValue, Dataset};
use metrics_chart::figure::build_scene;
use metrics_chart::{
    AxisSide, ChartComposer, ImageExporter, Metric, MetricSpec, PlotType, RenderSettings,
    build_metric_specs,
};
use std::hint::black_box;

fn large_dataset() -> Dataset {
    let header = ["Company", "Year", "Sales", "Profit", "RoCE"]
        .iter()
        .map(|name| (*name).to_owned())
        .collect();
    let cells = (0..3_000)
        .map(|i| {
            let year = 1990 + (i % 30);
            let base = 100.0 + f64::from(i) * 0.5;
            vec![
                CellValue::text(format!("Company {}", i / 30)),
                CellValue::Number(f64::from(year)),
                CellValue::Number(base),
                CellValue::Number(base * 0.12),
                CellValue::Number(0.05 + f64::from(i % 7) * 0.01),
            ]
        })
        .collect();
    Dataset::from_records(header, cells).expect("valid generated dataset")
}

fn mixed_selection(slot: usize) -> MetricSpec {
    let metric = Metric::ALL[slot % Metric::ALL.len()];
    let plot_type = if slot % 2 == 0 { PlotType::Bar } else { PlotType::Line };
    let axis = if slot % 3 == 0 { AxisSide::Right } else { AxisSide::Left };
    MetricSpec::new(metric, plot_type, axis)
}

fn bench_compose_ten_series(c: &mut Criterion) {
    let dataset = large_dataset();
    let specs = build_metric_specs(10, mixed_selection).expect("valid specs");
    let composer = ChartComposer::default();

    c.bench_function("compose_ten_series", |b| {
        b.iter(|| {
            let slice = dataset.slice_for("Company 42").expect("slice");
            let _ = composer.compose(black_box(&slice), black_box(&specs));
        })
    });
}

fn bench_scene_and_raster(c: &mut Criterion) {
    let dataset = large_dataset();
    let specs = build_metric_specs(4, mixed_selection).expect("valid specs");
    let slice = dataset.slice_for("Company 7").expect("slice");
    let figure = ChartComposer::default()
        .compose(&slice, &specs)
        .expect("figure");
    let exporter = ImageExporter::new(RenderSettings::default()).expect("exporter");

    c.bench_function("build_scene_1000x600", |b| {
        b.iter(|| {
            let _ = build_scene(black_box(&figure), Viewport::new(1000, 600));
        })
    });

    c.bench_function("render_png_100dpi", |b| {
        b.iter(|| {
            let _ = exporter.render(black_box(&figure));
        })
    });
}

criterion_group!(benches, bench_compose_ten_series, bench_scene_and_raster);
criterion_main!(benches);
