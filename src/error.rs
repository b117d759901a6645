use thiserror::Error;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("invalid viewport size: width={width}, height={height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("schema error: {0}")]
    Schema(String),

    #[error("company `{0}` not found in dataset")]
    CompanyNotFound(String),

    #[error("invalid metric count {count}: expected a value in [{min}, {max}]")]
    InvalidMetricCount { count: usize, min: usize, max: usize },

    #[error("render error: {0}")]
    Render(String),

    #[error("export error: {0}")]
    Export(String),

    #[error("import error: {0}")]
    Import(String),
}
