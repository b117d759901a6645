use std::fmt;
use std::str::FromStr;

use rust_xlsxwriter::{Format, Image, Workbook, Worksheet, XlsxError};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dataset::{CellValue, Dataset};
use crate::error::{ChartError, ChartResult};
use crate::export::ImageAsset;

const MAX_SHEET_ROWS: u32 = 1_048_576;
const MAX_SHEET_COLUMNS: u16 = 16_384;
const DATE_TIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// Zero-based worksheet cell written and parsed in A1 notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CellAnchor {
    pub row: u32,
    pub col: u16,
}

impl CellAnchor {
    #[must_use]
    pub const fn new(row: u32, col: u16) -> Self {
        Self { row, col }
    }

    /// Parses `A1`-style references such as `B3` or `AA10`.
    pub fn parse(reference: &str) -> ChartResult<Self> {
        let reference = reference.trim();
        let split = reference
            .find(|ch: char| !ch.is_ascii_alphabetic())
            .unwrap_or(reference.len());
        let (letters, digits) = reference.split_at(split);
        let invalid = || ChartError::InvalidData(format!("invalid cell reference `{reference}`"));

        if letters.is_empty() || letters.len() > 3 || digits.is_empty() {
            return Err(invalid());
        }
        if !digits.chars().all(|ch| ch.is_ascii_digit()) {
            return Err(invalid());
        }

        let column = letters.chars().fold(0_u32, |acc, ch| {
            acc * 26 + (u32::from(ch.to_ascii_uppercase()) - u32::from('A') + 1)
        });
        let row: u32 = digits.parse().map_err(|_| invalid())?;
        if row == 0 || row > MAX_SHEET_ROWS || column > u32::from(MAX_SHEET_COLUMNS) {
            return Err(invalid());
        }

        Ok(Self {
            row: row - 1,
            col: (column - 1) as u16,
        })
    }
}

impl fmt::Display for CellAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut letters = Vec::new();
        let mut column = u32::from(self.col) + 1;
        while column > 0 {
            let rem = (column - 1) % 26;
            letters.push(char::from(b'A' + rem as u8));
            column = (column - 1) / 26;
        }
        let letters: String = letters.into_iter().rev().collect();
        write!(f, "{letters}{}", self.row + 1)
    }
}

impl FromStr for CellAnchor {
    type Err = ChartError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl TryFrom<String> for CellAnchor {
    type Error = ChartError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CellAnchor> for String {
    fn from(anchor: CellAnchor) -> Self {
        anchor.to_string()
    }
}

/// Layout of the exported workbook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkbookOptions {
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,
    #[serde(default)]
    pub anchor: CellAnchor,
    #[serde(default)]
    pub x_offset: u32,
    #[serde(default)]
    pub y_offset: u32,
    #[serde(default = "default_image_scale")]
    pub x_scale: f64,
    #[serde(default = "default_image_scale")]
    pub y_scale: f64,
    #[serde(default = "default_file_name")]
    pub file_name: String,
}

impl Default for WorkbookOptions {
    fn default() -> Self {
        Self {
            sheet_name: default_sheet_name(),
            anchor: CellAnchor::default(),
            x_offset: 0,
            y_offset: 0,
            x_scale: default_image_scale(),
            y_scale: default_image_scale(),
            file_name: default_file_name(),
        }
    }
}

impl WorkbookOptions {
    #[must_use]
    pub fn with_anchor(mut self, anchor: CellAnchor) -> Self {
        self.anchor = anchor;
        self
    }

    #[must_use]
    pub fn with_scale(mut self, x_scale: f64, y_scale: f64) -> Self {
        self.x_scale = x_scale;
        self.y_scale = y_scale;
        self
    }

    pub fn validate(&self) -> ChartResult<()> {
        for (name, scale) in [("x_scale", self.x_scale), ("y_scale", self.y_scale)] {
            if !scale.is_finite() || scale <= 0.0 {
                return Err(ChartError::Export(format!(
                    "image {name} must be finite and > 0"
                )));
            }
        }
        if self.sheet_name.trim().is_empty() {
            return Err(ChartError::Export("sheet name must not be empty".to_owned()));
        }
        Ok(())
    }
}

fn default_sheet_name() -> String {
    "Company Data".to_owned()
}

fn default_image_scale() -> f64 {
    0.5
}

fn default_file_name() -> String {
    "company_metrics.xlsx".to_owned()
}

/// Serialized single-sheet workbook.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkbookExport {
    bytes: Vec<u8>,
    file_name: String,
    sheet_name: String,
    rows_written: usize,
}

impl WorkbookExport {
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    #[must_use]
    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    /// Sheet rows written, header included.
    #[must_use]
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }
}

/// Writes the original data plus the chart image into one worksheet.
#[derive(Debug, Clone, Default)]
pub struct WorkbookAssembler {
    options: WorkbookOptions,
}

impl WorkbookAssembler {
    pub fn new(options: WorkbookOptions) -> ChartResult<Self> {
        options.validate()?;
        Ok(Self { options })
    }

    #[must_use]
    pub fn options(&self) -> &WorkbookOptions {
        &self.options
    }

    /// Exports every row of `dataset`, not only the charted company.
    pub fn assemble_dataset(&self, dataset: &Dataset, image: ImageAsset) -> ChartResult<WorkbookExport> {
        self.assemble(dataset.header(), dataset.raw_rows(), image)
    }

    /// Header goes to row 0 and `rows` follow in order, keeping cell types.
    /// Nothing is returned unless the whole workbook serialized.
    pub fn assemble(
        &self,
        header: &[String],
        rows: &[Vec<CellValue>],
        image: ImageAsset,
    ) -> ChartResult<WorkbookExport> {
        if rows.is_empty() {
            return Err(ChartError::Export(
                "dataset has no rows to export".to_owned(),
            ));
        }
        if rows.len() >= MAX_SHEET_ROWS as usize {
            return Err(ChartError::Export(format!(
                "{} rows do not fit in one worksheet",
                rows.len()
            )));
        }
        let options = &self.options;

        let mut workbook = Workbook::new();
        let worksheet = workbook
            .add_worksheet()
            .set_name(&options.sheet_name)
            .map_err(|err| export_error(&format!("failed to name sheet `{}`", options.sheet_name), err))?;

        for (col, name) in header.iter().enumerate() {
            let col = column_index(col)?;
            worksheet
                .write_string(0, col, name)
                .map_err(|err| export_error("failed to write header", err))?;
        }

        let date_format = Format::new().set_num_format(DATE_TIME_FORMAT);
        for (index, cells) in rows.iter().enumerate() {
            let row = index as u32 + 1;
            for (col, cell) in cells.iter().enumerate() {
                write_cell(worksheet, row, column_index(col)?, cell, &date_format)?;
            }
        }

        let chart = Image::new_from_buffer(image.png_bytes())
            .map_err(|err| export_error("failed to load chart image", err))?
            .set_scale_width(options.x_scale)
            .set_scale_height(options.y_scale);
        worksheet
            .insert_image_with_offset(
                options.anchor.row,
                options.anchor.col,
                &chart,
                options.x_offset,
                options.y_offset,
            )
            .map_err(|err| export_error(&format!("failed to embed image at {}", options.anchor), err))?;

        let bytes = workbook
            .save_to_buffer()
            .map_err(|err| export_error("failed to serialize workbook", err))?;

        debug!(
            rows = rows.len(),
            columns = header.len(),
            image_width = image.width(),
            image_height = image.height(),
            bytes = bytes.len(),
            "workbook assembled"
        );

        Ok(WorkbookExport {
            bytes,
            file_name: options.file_name.clone(),
            sheet_name: options.sheet_name.clone(),
            rows_written: rows.len() + 1,
        })
    }
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &CellValue,
    date_format: &Format,
) -> ChartResult<()> {
    let result = match cell {
        CellValue::Empty => return Ok(()),
        CellValue::Text(text) => worksheet.write_string(row, col, text),
        CellValue::Number(value) if value.is_finite() => worksheet.write_number(row, col, *value),
        CellValue::Number(value) => worksheet.write_string(row, col, value.to_string()),
        CellValue::Bool(value) => worksheet.write_boolean(row, col, *value),
        CellValue::DateTime(value) => {
            worksheet.write_number_with_format(row, col, *value, date_format)
        }
    };
    result
        .map(|_| ())
        .map_err(|err| export_error(&format!("failed to write cell ({row}, {col})"), err))
}

fn column_index(col: usize) -> ChartResult<u16> {
    u16::try_from(col)
        .ok()
        .filter(|col| *col < MAX_SHEET_COLUMNS)
        .ok_or_else(|| ChartError::Export(format!("column {col} does not fit in one worksheet")))
}

fn export_error(context: &str, err: XlsxError) -> ChartError {
    ChartError::Export(format!("{context}: {err}"))
}
