use std::io::{Cursor, Read};

use calamine::{Data, Reader, Xlsx, open_workbook_from_rs};
use metrics_chart::dataset::{CellValue, CompanySlice, Dataset, Row};
use metrics_chart::{
    AxisSide, CellAnchor, ChartComposer, ChartError, ImageAsset, ImageExporter, Metric,
    MetricSpec, MetricSpecs, PlotType, RenderSettings, WorkbookAssembler, WorkbookOptions,
};

fn header() -> Vec<String> {
    ["Company", "Year", "Sales", "Profit", "RoCE", "Listed", "Note"]
        .iter()
        .map(|name| (*name).to_owned())
        .collect()
}

fn dataset() -> Dataset {
    let row = |company: &str, year: f64, sales: f64, listed: bool, note: &str| {
        vec![
            CellValue::text(company),
            CellValue::Number(year),
            CellValue::Number(sales),
            CellValue::Number(sales / 10.0),
            CellValue::Number(0.1),
            CellValue::Bool(listed),
            if note.is_empty() {
                CellValue::Empty
            } else {
                CellValue::text(note)
            },
        ]
    };
    Dataset::from_records(
        header(),
        vec![
            row("Beta", 2021.0, 50.0, false, ""),
            row("Acme", 2022.0, 200.0, true, "record year"),
            row("Acme", 2020.0, 100.0, true, ""),
        ],
    )
    .expect("dataset")
}

fn chart_image() -> ImageAsset {
    let slice = CompanySlice::new(
        "Acme",
        vec![
            Row::new("Acme", 2020, Some(100.0), Some(10.0), Some(0.1)),
            Row::new("Acme", 2022, Some(200.0), Some(20.0), Some(0.1)),
        ],
    );
    let specs = MetricSpecs::new(vec![MetricSpec::new(
        Metric::Sales,
        PlotType::Bar,
        AxisSide::Left,
    )])
    .expect("specs");
    let figure = ChartComposer::default().compose(&slice, &specs).expect("figure");
    ImageExporter::new(RenderSettings::default().with_dpi(30.0))
        .expect("exporter")
        .render(&figure)
        .expect("image")
}

fn zip_entry_names(bytes: &[u8]) -> Vec<String> {
    let archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("zip");
    archive.file_names().map(str::to_owned).collect()
}

#[test]
fn writes_every_row_in_original_order_with_types() {
    let dataset = dataset();
    let export = WorkbookAssembler::default()
        .assemble_dataset(&dataset, chart_image())
        .expect("export");

    assert_eq!(export.rows_written(), dataset.len() + 1);
    assert_eq!(export.file_name(), "company_metrics.xlsx");
    assert_eq!(export.sheet_name(), "Company Data");

    let mut workbook: Xlsx<_> =
        open_workbook_from_rs(Cursor::new(export.bytes().to_vec())).expect("read back");
    assert_eq!(workbook.sheet_names(), vec!["Company Data".to_owned()]);
    let range = workbook.worksheet_range("Company Data").expect("sheet");
    let rows: Vec<&[Data]> = range.rows().collect();

    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0][0], Data::String("Company".to_owned()));
    assert_eq!(rows[0][6], Data::String("Note".to_owned()));
    assert_eq!(rows[1][0], Data::String("Beta".to_owned()));
    assert_eq!(rows[2][0], Data::String("Acme".to_owned()));
    assert_eq!(rows[2][1], Data::Float(2022.0));
    assert_eq!(rows[2][2], Data::Float(200.0));
    assert_eq!(rows[2][5], Data::Bool(true));
    assert_eq!(rows[2][6], Data::String("record year".to_owned()));
    assert_eq!(rows[3][6], Data::Empty);
}

#[test]
fn embeds_exactly_one_image_in_one_worksheet() {
    let export = WorkbookAssembler::default()
        .assemble_dataset(&dataset(), chart_image())
        .expect("export");
    let names = zip_entry_names(export.bytes());

    let media: Vec<&String> = names
        .iter()
        .filter(|name| name.starts_with("xl/media/"))
        .collect();
    assert_eq!(media.len(), 1, "entries: {names:?}");
    assert!(media[0].ends_with(".png"));

    let sheets = names
        .iter()
        .filter(|name| name.starts_with("xl/worksheets/sheet") && name.ends_with(".xml"))
        .count();
    assert_eq!(sheets, 1);
}

#[test]
fn image_is_anchored_at_the_configured_cell() {
    let options = WorkbookOptions::default().with_anchor(CellAnchor::parse("C4").expect("anchor"));
    let export = WorkbookAssembler::new(options)
        .expect("assembler")
        .assemble_dataset(&dataset(), chart_image())
        .expect("export");

    let mut archive = zip::ZipArchive::new(Cursor::new(export.bytes())).expect("zip");
    let mut drawing = String::new();
    archive
        .by_name("xl/drawings/drawing1.xml")
        .expect("drawing part")
        .read_to_string(&mut drawing)
        .expect("utf8");
    assert!(drawing.contains("<xdr:col>2</xdr:col>"));
    assert!(drawing.contains("<xdr:row>3</xdr:row>"));
}

#[test]
fn embedded_png_is_the_rendered_asset() {
    let image = chart_image();
    let expected = image.png_bytes().to_vec();
    let export = WorkbookAssembler::default()
        .assemble_dataset(&dataset(), image)
        .expect("export");

    let mut archive = zip::ZipArchive::new(Cursor::new(export.bytes())).expect("zip");
    let name = archive
        .file_names()
        .find(|name| name.starts_with("xl/media/"))
        .map(str::to_owned)
        .expect("media entry");
    let mut embedded = Vec::new();
    archive
        .by_name(&name)
        .expect("media")
        .read_to_end(&mut embedded)
        .expect("bytes");
    assert_eq!(embedded, expected);
}

#[test]
fn empty_dataset_is_an_export_error() {
    let empty = Dataset::from_records(header(), Vec::new()).expect("header only");
    let err = WorkbookAssembler::default()
        .assemble_dataset(&empty, chart_image())
        .expect_err("nothing to export");
    assert!(matches!(err, ChartError::Export(_)));
}

#[test]
fn invalid_scale_is_rejected() {
    let options = WorkbookOptions::default().with_scale(0.0, 0.5);
    assert!(matches!(
        WorkbookAssembler::new(options),
        Err(ChartError::Export(_))
    ));
}

#[test]
fn invalid_sheet_name_is_an_export_error() {
    let options = WorkbookOptions {
        sheet_name: "Bad[Name]".to_owned(),
        ..WorkbookOptions::default()
    };
    let err = WorkbookAssembler::new(options)
        .expect("assembler")
        .assemble_dataset(&dataset(), chart_image())
        .expect_err("invalid characters");
    assert!(matches!(err, ChartError::Export(_)));
}
