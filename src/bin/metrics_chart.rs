use std::fs;
use std::path::PathBuf;

use clap::Parser;
use metrics_chart::telemetry::{DEFAULT_FILTER, VERBOSE_FILTER, init_tracing};
use metrics_chart::{
    AxisSide, ChartError, ChartResult, Dataset, Metric, MetricSpec, MetricsPipeline,
    PipelineConfig, PlotType, build_metric_specs,
};

#[derive(Debug, Parser)]
#[command(name = "metrics-chart")]
#[command(about = "Chart company metrics on dual Y axes and export them to xlsx")]
#[command(version)]
struct Cli {
    /// Uploaded spreadsheet (xlsx, xls, xlsb or ods)
    #[arg(long, short = 'i')]
    input: PathBuf,

    /// Company to chart; defaults to the first company in the upload
    #[arg(long, short = 'c')]
    company: Option<String>,

    /// Metric slot as `metric[:line|bar[:left|right]]`, repeatable, in draw order
    #[arg(long = "metric", short = 'm')]
    metrics: Vec<MetricSpec>,

    /// Workbook output path; defaults to the configured file name
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Also write the chart image to this PNG path
    #[arg(long)]
    png: Option<PathBuf>,

    /// JSON pipeline configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the companies found in the upload and exit
    #[arg(long)]
    list_companies: bool,

    /// Log loader, composer and export stages to stderr
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> ChartResult<()> {
    let cli = Cli::parse();
    let _ = init_tracing(if cli.verbose {
        VERBOSE_FILTER
    } else {
        DEFAULT_FILTER
    });

    let dataset = Dataset::from_path(&cli.input)?;
    let companies = dataset.list_companies();
    if cli.list_companies {
        for company in &companies {
            println!("{company}");
        }
        return Ok(());
    }

    let company = match cli.company {
        Some(company) => company,
        None => companies
            .first()
            .map(|company| (*company).to_owned())
            .ok_or_else(|| ChartError::InvalidData("upload contains no companies".to_owned()))?,
    };

    let config = match &cli.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };
    let output = cli
        .output
        .unwrap_or_else(|| PathBuf::from(&config.workbook.file_name));

    let selections = if cli.metrics.is_empty() {
        vec![MetricSpec::new(Metric::Sales, PlotType::Line, AxisSide::Left)]
    } else {
        cli.metrics
    };
    let specs = build_metric_specs(selections.len(), |slot| selections[slot - 1])?;

    let pipeline = MetricsPipeline::new(config)?;
    let outcome = pipeline.export_workbook(&dataset, &company, &specs)?;

    if let Some(png_path) = &cli.png {
        fs::write(png_path, outcome.image.png_bytes()).map_err(|err| {
            ChartError::Export(format!("failed to write `{}`: {err}", png_path.display()))
        })?;
    }
    fs::write(&output, outcome.workbook.bytes()).map_err(|err| {
        ChartError::Export(format!("failed to write `{}`: {err}", output.display()))
    })?;

    println!(
        "wrote {} ({} rows, {}x{} chart for {company})",
        output.display(),
        outcome.workbook.rows_written(),
        outcome.image.width(),
        outcome.image.height()
    );
    Ok(())
}
