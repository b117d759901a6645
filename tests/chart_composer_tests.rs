use approx::assert_relative_eq;
use metrics_chart::core::DataPoint;
use metrics_chart::dataset::{CompanySlice, Row};
use metrics_chart::figure::X_AXIS_LABEL;
use metrics_chart::{
    AxisSide, ChartComposer, ChartError, FigureStyle, Metric, MetricSpec, MetricSpecs, PlotType,
};

fn acme_slice() -> CompanySlice {
    CompanySlice::new(
        "Acme",
        vec![
            Row::new("Acme", 2020, Some(100.0), Some(10.0), Some(0.12)),
            Row::new("Acme", 2021, Some(150.0), Some(20.0), Some(0.15)),
            Row::new("Acme", 2022, Some(200.0), Some(30.0), Some(0.18)),
        ],
    )
}

fn specs(list: &[(Metric, PlotType, AxisSide)]) -> MetricSpecs {
    MetricSpecs::new(
        list.iter()
            .map(|(metric, plot_type, axis)| MetricSpec::new(*metric, *plot_type, *axis))
            .collect(),
    )
    .expect("specs")
}

#[test]
fn single_left_line_has_three_points_and_no_right_axis() {
    let figure = ChartComposer::default()
        .compose(
            &acme_slice(),
            &specs(&[(Metric::Sales, PlotType::Line, AxisSide::Left)]),
        )
        .expect("figure");

    assert!(figure.right_axis().is_none());
    let left = figure.left_axis();
    assert_eq!(left.series().len(), 1);
    let series = &left.series()[0];
    assert_eq!(series.plot_type(), PlotType::Line);
    assert_eq!(
        series.points(),
        &[
            DataPoint::new(2020, Some(100.0)),
            DataPoint::new(2021, Some(150.0)),
            DataPoint::new(2022, Some(200.0)),
        ]
    );
    assert_eq!(left.y_label(), Some("Sales"));
    assert_eq!(figure.x_label(), Some(X_AXIS_LABEL));
}

#[test]
fn bar_left_and_line_right_share_the_year_domain() {
    let figure = ChartComposer::default()
        .compose(
            &acme_slice(),
            &specs(&[
                (Metric::Sales, PlotType::Bar, AxisSide::Left),
                (Metric::RoCE, PlotType::Line, AxisSide::Right),
            ]),
        )
        .expect("figure");

    let left = figure.left_axis();
    let right = figure.right_axis().expect("right axis");
    assert_eq!(left.series().len(), 1);
    assert_eq!(right.series().len(), 1);
    assert_eq!(left.series()[0].plot_type(), PlotType::Bar);
    assert_eq!(right.series()[0].plot_type(), PlotType::Line);
    assert_eq!(figure.x_domain(), &[2020, 2021, 2022]);

    let left_years: Vec<i32> = left.series()[0].points().iter().map(|p| p.year).collect();
    let right_years: Vec<i32> = right.series()[0].points().iter().map(|p| p.year).collect();
    assert_eq!(left_years, right_years);
    assert_eq!(left.y_label(), Some("Sales"));
    assert_eq!(right.y_label(), Some("RoCE"));
}

#[test]
fn axes_scale_independently() {
    let figure = ChartComposer::default()
        .compose(
            &acme_slice(),
            &specs(&[
                (Metric::Sales, PlotType::Line, AxisSide::Left),
                (Metric::RoCE, PlotType::Line, AxisSide::Right),
            ]),
        )
        .expect("figure");

    let (left_min, left_max) = figure.left_axis().scale().domain();
    let (right_min, right_max) = figure.right_axis().expect("right").scale().domain();
    assert_relative_eq!(left_min, 95.0, epsilon = 1e-9);
    assert_relative_eq!(left_max, 205.0, epsilon = 1e-9);
    assert!(right_max < 1.0);
    assert!(right_min > 0.0);
}

#[test]
fn y_label_is_last_writer_wins_per_axis() {
    let figure = ChartComposer::default()
        .compose(
            &acme_slice(),
            &specs(&[
                (Metric::Sales, PlotType::Line, AxisSide::Right),
                (Metric::Profit, PlotType::Line, AxisSide::Left),
                (Metric::RoCE, PlotType::Bar, AxisSide::Right),
            ]),
        )
        .expect("figure");

    assert_eq!(figure.left_axis().y_label(), Some("Profit"));
    assert_eq!(figure.right_axis().and_then(|axis| axis.y_label()), Some("RoCE"));
}

#[test]
fn series_keep_input_order_across_axes() {
    let input = [
        (Metric::RoCE, PlotType::Line, AxisSide::Right),
        (Metric::Sales, PlotType::Bar, AxisSide::Left),
        (Metric::Profit, PlotType::Line, AxisSide::Right),
        (Metric::Sales, PlotType::Line, AxisSide::Left),
    ];
    let figure = ChartComposer::default()
        .compose(&acme_slice(), &specs(&input))
        .expect("figure");

    let drawn: Vec<(Metric, PlotType, AxisSide)> = figure
        .series()
        .iter()
        .map(|series| (series.metric(), series.plot_type(), series.axis()))
        .collect();
    assert_eq!(drawn, input.to_vec());

    let right_metrics: Vec<Metric> = figure
        .right_axis()
        .expect("right")
        .series()
        .iter()
        .map(|series| series.metric())
        .collect();
    assert_eq!(right_metrics, vec![Metric::RoCE, Metric::Profit]);

    let legend: Vec<String> = figure
        .legend_entries()
        .into_iter()
        .map(|entry| entry.label)
        .collect();
    assert_eq!(legend, vec!["RoCE", "Sales", "Profit", "Sales"]);
}

#[test]
fn series_colors_follow_draw_index() {
    let style = FigureStyle::default();
    let figure = ChartComposer::new(style.clone())
        .expect("composer")
        .compose(
            &acme_slice(),
            &specs(&[
                (Metric::Sales, PlotType::Line, AxisSide::Left),
                (Metric::Sales, PlotType::Line, AxisSide::Left),
            ]),
        )
        .expect("figure");

    let series = figure.series();
    assert_eq!(series[0].color(), style.series_color(0));
    assert_eq!(series[1].color(), style.series_color(1));
    assert_ne!(series[0].color(), series[1].color());
}

#[test]
fn missing_values_are_passed_through_unchanged() {
    let slice = CompanySlice::new(
        "Acme",
        vec![
            Row::new("Acme", 2020, Some(100.0), None, None),
            Row::new("Acme", 2021, None, None, None),
            Row::new("Acme", 2022, Some(200.0), None, None),
        ],
    );
    let figure = ChartComposer::default()
        .compose(
            &slice,
            &specs(&[(Metric::Sales, PlotType::Bar, AxisSide::Left)]),
        )
        .expect("figure");

    let series = &figure.left_axis().series()[0];
    assert_eq!(series.points().len(), 3);
    assert_eq!(series.points()[1].value, None);
    assert_eq!(series.value_count(), 2);
}

#[test]
fn empty_slice_yields_empty_figure_with_requested_axes() {
    let slice = CompanySlice::new("Ghost", Vec::new());
    let figure = ChartComposer::default()
        .compose(
            &slice,
            &specs(&[
                (Metric::Sales, PlotType::Bar, AxisSide::Left),
                (Metric::RoCE, PlotType::Line, AxisSide::Right),
            ]),
        )
        .expect("empty figure");

    assert!(figure.is_empty());
    assert!(figure.x_domain().is_empty());
    assert!(figure.right_axis().is_some());
    assert_eq!(figure.series_count(), 2);
    assert!(figure.series().iter().all(|series| series.points().is_empty()));
}

#[test]
fn layout_keeps_plot_inside_figure() {
    let figure = ChartComposer::default()
        .compose(
            &acme_slice(),
            &specs(&[
                (Metric::Sales, PlotType::Bar, AxisSide::Left),
                (Metric::RoCE, PlotType::Line, AxisSide::Right),
            ]),
        )
        .expect("figure");

    let layout = figure.layout();
    assert_relative_eq!(layout.figure_width_pt, 720.0);
    assert_relative_eq!(layout.figure_height_pt, 432.0);
    assert!(layout.plot.left > 0.0);
    assert!(layout.plot.top > 0.0);
    assert!(layout.plot.right() < layout.figure_width_pt);
    assert!(layout.plot.bottom() < layout.figure_height_pt);
    assert!(layout.right_tick_label_width_pt > 0.0);
}

#[test]
fn wider_tick_labels_push_the_plot_right() {
    let small = CompanySlice::new(
        "Small",
        vec![Row::new("Small", 2020, Some(1.0), None, None)],
    );
    let large = CompanySlice::new(
        "Large",
        vec![Row::new("Large", 2020, Some(123_456_789.0), None, None)],
    );
    let spec = specs(&[(Metric::Sales, PlotType::Bar, AxisSide::Left)]);
    let composer = ChartComposer::default();

    let small_plot = composer.compose(&small, &spec).expect("small").layout().plot;
    let large_plot = composer.compose(&large, &spec).expect("large").layout().plot;
    assert!(large_plot.left > small_plot.left);
}

#[test]
fn tiny_figures_are_rejected() {
    let style = FigureStyle::default().with_size_in(0.5, 0.5);
    let err = ChartComposer::new(style)
        .expect("valid style")
        .compose(
            &acme_slice(),
            &specs(&[(Metric::Sales, PlotType::Line, AxisSide::Left)]),
        )
        .expect_err("no room for labels");
    assert!(matches!(err, ChartError::InvalidData(_)));
}

#[test]
fn invalid_style_is_rejected_up_front() {
    let style = FigureStyle {
        palette: Vec::new(),
        ..FigureStyle::default()
    };
    assert!(ChartComposer::new(style).is_err());
}

fn extreme_slice(magnitude: f64) -> CompanySlice {
    CompanySlice::new(
        "Giant",
        vec![
            Row::new("Giant", 2020, Some(magnitude), None, Some(-magnitude)),
            Row::new("Giant", 2021, Some(-magnitude), None, Some(magnitude)),
        ],
    )
}

#[test]
fn extreme_magnitudes_compose_with_short_tick_labels() {
    let spec = specs(&[
        (Metric::Sales, PlotType::Bar, AxisSide::Left),
        (Metric::RoCE, PlotType::Line, AxisSide::Right),
    ]);
    for magnitude in [1e45, 1e60, 1e308, f64::MAX] {
        let figure = ChartComposer::default()
            .compose(&extreme_slice(magnitude), &spec)
            .unwrap_or_else(|err| panic!("{magnitude:e}: {err}"));

        for axis in [figure.left_axis(), figure.right_axis().expect("right")] {
            let (min, max) = axis.scale().domain();
            assert!(min.is_finite() && max.is_finite());
            assert!(!axis.ticks().is_empty());
            assert!(
                axis.ticks().iter().all(|tick| tick.label.len() <= 12),
                "{magnitude:e}: {:?}",
                axis.ticks()
            );
        }
        assert!(figure.layout().plot.width > 0.0);
    }
}
