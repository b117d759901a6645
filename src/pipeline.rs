use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dataset::Dataset;
use crate::error::{ChartError, ChartResult};
use crate::export::{
    ImageAsset, ImageExporter, RenderSettings, WorkbookAssembler, WorkbookExport, WorkbookOptions,
};
use crate::figure::{ChartComposer, ChartFigure, FigureStyle};
use crate::metric_spec::MetricSpecs;

/// Host configuration for the whole chart/export cycle.
///
/// Every section falls back to its defaults when omitted from JSON.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub style: FigureStyle,
    #[serde(default)]
    pub render: RenderSettings,
    #[serde(default)]
    pub workbook: WorkbookOptions,
}

impl PipelineConfig {
    pub fn from_json_str(json: &str) -> ChartResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|err| ChartError::InvalidData(format!("invalid pipeline config: {err}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> ChartResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|err| {
            ChartError::InvalidData(format!("failed to read config `{}`: {err}", path.display()))
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> ChartResult<()> {
        self.style.validate()?;
        self.render.validate()?;
        self.workbook.validate()
    }
}

/// Result of one export cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOutcome {
    pub figure: ChartFigure,
    pub image: ImageAsset,
    pub workbook: WorkbookExport,
}

/// Select company, compose, render, assemble.
///
/// Nothing is cached between calls: every call re-derives the company slice
/// and the figure from its inputs.
#[derive(Debug, Clone)]
pub struct MetricsPipeline {
    composer: ChartComposer,
    exporter: ImageExporter,
    assembler: WorkbookAssembler,
}

impl MetricsPipeline {
    pub fn new(config: PipelineConfig) -> ChartResult<Self> {
        Ok(Self {
            composer: ChartComposer::new(config.style)?,
            exporter: ImageExporter::new(config.render)?,
            assembler: WorkbookAssembler::new(config.workbook)?,
        })
    }

    /// Figure for inline display.
    pub fn compose_chart(
        &self,
        dataset: &Dataset,
        company: &str,
        specs: &MetricSpecs,
    ) -> ChartResult<ChartFigure> {
        let slice = dataset.slice_for(company)?;
        self.composer.compose(&slice, specs)
    }

    pub fn render_chart(
        &self,
        dataset: &Dataset,
        company: &str,
        specs: &MetricSpecs,
    ) -> ChartResult<ImageAsset> {
        let figure = self.compose_chart(dataset, company, specs)?;
        self.exporter.render(&figure)
    }

    /// Runs the full cycle. The workbook holds every dataset row, not only
    /// those of `company`.
    pub fn export_workbook(
        &self,
        dataset: &Dataset,
        company: &str,
        specs: &MetricSpecs,
    ) -> ChartResult<ExportOutcome> {
        let figure = self.compose_chart(dataset, company, specs)?;
        let image = self.exporter.render(&figure)?;
        let workbook = self.assembler.assemble_dataset(dataset, image.clone())?;
        debug!(
            company,
            series = figure.series_count(),
            file_name = workbook.file_name(),
            "export cycle finished"
        );
        Ok(ExportOutcome {
            figure,
            image,
            workbook,
        })
    }
}
