use std::io::{Cursor, Read, Seek};
use std::path::Path;

use calamine::{Data, Range, Reader, Sheets, open_workbook_auto, open_workbook_auto_from_rs};
use tracing::debug;

use super::{CellValue, Dataset};
use crate::error::{ChartError, ChartResult};

impl Dataset {
    /// Reads the first worksheet of an xlsx/xls/xlsb/ods file.
    pub fn from_path(path: impl AsRef<Path>) -> ChartResult<Self> {
        let path = path.as_ref();
        let mut workbook = open_workbook_auto(path).map_err(|err| {
            ChartError::Import(format!("failed to open `{}`: {err}", path.display()))
        })?;
        debug!(path = %path.display(), "reading uploaded workbook");
        let range = first_sheet_range(&mut workbook)?;
        Self::from_range(&range)
    }

    /// Reads the first worksheet of an uploaded spreadsheet held in memory.
    pub fn from_bytes(bytes: &[u8]) -> ChartResult<Self> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
            .map_err(|err| ChartError::Import(format!("failed to open upload: {err}")))?;
        let range = first_sheet_range(&mut workbook)?;
        Self::from_range(&range)
    }

    /// First used row is the header. Fully empty rows are skipped.
    ///
    /// calamine ranges start at the first used cell; blank leading columns
    /// are restored so column positions match the sheet from column A.
    fn from_range(range: &Range<Data>) -> ChartResult<Self> {
        let leading_columns = range.start().map_or(0, |(_, column)| column as usize);
        let from_column_a = |cells: &[Data]| {
            std::iter::repeat_n(CellValue::Empty, leading_columns)
                .chain(cells.iter().map(convert_cell))
                .collect::<Vec<_>>()
        };

        let mut rows = range.rows();
        let header: Vec<String> = rows
            .next()
            .map(|cells| {
                from_column_a(cells)
                    .iter()
                    .map(CellValue::display_text)
                    .collect()
            })
            .unwrap_or_default();

        let cells: Vec<Vec<CellValue>> = rows
            .map(from_column_a)
            .filter(|cells| !cells.iter().all(CellValue::is_empty))
            .collect();

        if leading_columns > 0 {
            debug!(leading_columns, "restored blank leading columns");
        }
        Self::from_records(header, cells)
    }
}

fn first_sheet_range<RS>(workbook: &mut Sheets<RS>) -> ChartResult<Range<Data>>
where
    RS: Read + Seek,
{
    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let Some(name) = sheet_names.first() else {
        return Err(ChartError::Import(
            "workbook contains no worksheets".to_owned(),
        ));
    };
    workbook
        .worksheet_range(name)
        .map_err(|err| ChartError::Import(format!("failed to read sheet `{name}`: {err}")))
}

fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(text) => CellValue::Text(text.clone()),
        Data::Float(value) => CellValue::Number(*value),
        Data::Int(value) => CellValue::Number(*value as f64),
        Data::Bool(value) => CellValue::Bool(*value),
        Data::DateTime(value) => CellValue::DateTime(value.as_f64()),
        Data::DateTimeIso(text) | Data::DurationIso(text) => CellValue::Text(text.clone()),
        Data::Error(err) => CellValue::Text(err.to_string()),
    }
}
