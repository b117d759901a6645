//! Uploaded company metrics: schema validation, typed rows and per-company
//! slices.
//!
//! The dataset keeps two views of the same rows. Typed [`Row`] values drive
//! charting, while the raw cells preserve every original column and value
//! type so exports reproduce the upload exactly.

mod loader;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::DataPoint;
use crate::error::{ChartError, ChartResult};
use crate::metric_spec::Metric;

pub const COMPANY_COLUMN: &str = "Company";
pub const YEAR_COLUMN: &str = "Year";

/// Columns every upload must carry, in the order they are reported when
/// missing.
pub const REQUIRED_COLUMNS: [&str; 5] = [
    COMPANY_COLUMN,
    YEAR_COLUMN,
    Metric::Sales.column_name(),
    Metric::Profit.column_name(),
    Metric::RoCE.column_name(),
];

/// One original spreadsheet cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    /// Every numeric cell, integers included.
    Number(f64),
    Bool(bool),
    /// Excel serial date/time.
    DateTime(f64),
}

impl CellValue {
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Numeric reading used for metric columns. Text is parsed, non-finite
    /// values read as missing.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        let value = match self {
            Self::Number(value) => *value,
            Self::Text(text) => text.trim().parse::<f64>().ok()?,
            Self::Empty | Self::Bool(_) | Self::DateTime(_) => return None,
        };
        value.is_finite().then_some(value)
    }

    /// Whole-number reading used for the year column.
    #[must_use]
    pub fn as_year(&self) -> Option<i32> {
        match self {
            Self::Number(value)
                if value.is_finite()
                    && value.fract() == 0.0
                    && *value >= f64::from(i32::MIN)
                    && *value <= f64::from(i32::MAX) =>
            {
                Some(*value as i32)
            }
            Self::Text(text) => text.trim().parse::<i32>().ok(),
            _ => None,
        }
    }

    /// Display text used for identifiers such as company names and headers.
    #[must_use]
    pub fn display_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(text) => text.clone(),
            Self::Number(value) | Self::DateTime(value) => {
                if value.fract() == 0.0 && value.abs() < 1e15 {
                    format!("{}", *value as i64)
                } else {
                    value.to_string()
                }
            }
            Self::Bool(value) => value.to_string(),
        }
    }
}

/// Typed company record. Metric fields are `None` when the cell was empty or
/// not numeric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub company: String,
    pub year: i32,
    pub sales: Option<f64>,
    pub profit: Option<f64>,
    pub roce: Option<f64>,
}

impl Row {
    #[must_use]
    pub fn new(
        company: impl Into<String>,
        year: i32,
        sales: Option<f64>,
        profit: Option<f64>,
        roce: Option<f64>,
    ) -> Self {
        Self {
            company: company.into(),
            year,
            sales,
            profit,
            roce,
        }
    }

    #[must_use]
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Sales => self.sales,
            Metric::Profit => self.profit,
            Metric::RoCE => self.roce,
        }
    }
}

/// Rows of one company, sorted by year ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct CompanySlice {
    company: String,
    rows: Vec<Row>,
}

impl CompanySlice {
    /// Builds a slice, stably sorting `rows` by year.
    #[must_use]
    pub fn new(company: impl Into<String>, mut rows: Vec<Row>) -> Self {
        rows.sort_by_key(|row| row.year);
        Self {
            company: company.into(),
            rows,
        }
    }

    #[must_use]
    pub fn company(&self) -> &str {
        &self.company
    }

    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn years(&self) -> Vec<i32> {
        self.rows.iter().map(|row| row.year).collect()
    }

    #[must_use]
    pub fn points(&self, metric: Metric) -> Vec<DataPoint> {
        self.rows
            .iter()
            .map(|row| DataPoint::new(row.year, row.metric(metric)))
            .collect()
    }
}

#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    company: usize,
    year: usize,
    sales: usize,
    profit: usize,
    roce: usize,
}

impl ColumnIndex {
    fn resolve(header: &[String]) -> ChartResult<Self> {
        let position = |name: &str| header.iter().position(|column| column == name);
        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|name| position(name).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(ChartError::Schema(format!(
                "missing required column(s): {}",
                missing.join(", ")
            )));
        }

        let index = |name: &str| position(name).unwrap_or_default();
        Ok(Self {
            company: index(COMPANY_COLUMN),
            year: index(YEAR_COLUMN),
            sales: index(Metric::Sales.column_name()),
            profit: index(Metric::Profit.column_name()),
            roce: index(Metric::RoCE.column_name()),
        })
    }

    fn metric(self, metric: Metric) -> usize {
        match metric {
            Metric::Sales => self.sales,
            Metric::Profit => self.profit,
            Metric::RoCE => self.roce,
        }
    }
}

/// Uploaded dataset, read-only for the session's lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    header: Vec<String>,
    rows: Vec<Row>,
    cells: Vec<Vec<CellValue>>,
}

impl Dataset {
    /// Builds a dataset from a header and raw cell rows.
    ///
    /// Rows shorter than the header are padded with empty cells. Blank header
    /// cells and cells past the last header get `Unnamed: <index>` names.
    pub fn from_records(mut header: Vec<String>, mut cells: Vec<Vec<CellValue>>) -> ChartResult<Self> {
        for (index, name) in header.iter_mut().enumerate() {
            let trimmed = name.trim();
            *name = if trimmed.is_empty() {
                format!("Unnamed: {index}")
            } else {
                trimmed.to_owned()
            };
        }
        let width = cells
            .iter()
            .map(Vec::len)
            .max()
            .unwrap_or_default()
            .max(header.len());
        for index in header.len()..width {
            header.push(format!("Unnamed: {index}"));
        }
        for row in &mut cells {
            row.resize(width, CellValue::Empty);
        }

        let columns = ColumnIndex::resolve(&header)?;
        let mut rows = Vec::with_capacity(cells.len());
        for (index, raw) in cells.iter().enumerate() {
            // +2: one for the header row, one for 1-based sheet numbering.
            let sheet_row = index + 2;
            let year = raw[columns.year].as_year().ok_or_else(|| {
                ChartError::Schema(format!(
                    "column `{YEAR_COLUMN}` row {sheet_row}: expected an integer year, found {:?}",
                    raw[columns.year]
                ))
            })?;
            rows.push(Row {
                company: raw[columns.company].display_text(),
                year,
                sales: raw[columns.metric(Metric::Sales)].as_number(),
                profit: raw[columns.metric(Metric::Profit)].as_number(),
                roce: raw[columns.metric(Metric::RoCE)].as_number(),
            });
        }

        debug!(
            columns = header.len(),
            rows = rows.len(),
            "dataset loaded"
        );
        Ok(Self {
            header,
            rows,
            cells,
        })
    }

    /// Distinct companies in first-seen order.
    #[must_use]
    pub fn list_companies(&self) -> IndexSet<&str> {
        self.rows.iter().map(|row| row.company.as_str()).collect()
    }

    /// Returns every row of `company`, sorted by year ascending.
    pub fn slice_for(&self, company: &str) -> ChartResult<CompanySlice> {
        let rows: Vec<Row> = self
            .rows
            .iter()
            .filter(|row| row.company == company)
            .cloned()
            .collect();
        if rows.is_empty() {
            return Err(ChartError::CompanyNotFound(company.to_owned()));
        }
        Ok(CompanySlice::new(company, rows))
    }

    /// Typed rows in original order, all companies.
    #[must_use]
    pub fn all_rows(&self) -> &[Row] {
        &self.rows
    }

    /// Column names in original order.
    #[must_use]
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Original cells in original row and column order.
    #[must_use]
    pub fn raw_rows(&self) -> &[Vec<CellValue>] {
        &self.cells
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
