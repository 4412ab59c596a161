use std::path::{Path, PathBuf};

use calamine::{Data, DataType, Reader, open_workbook_auto};
use log::debug;

use crate::{
    error::IngestError,
    frame::{Cell, Table, unique_headers},
};

/// 1-based spreadsheet rows to read: the header row plus an inclusive data range.
///
/// `start_row` defaults to the row after the header and `end_row` to the last
/// used row of the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowWindow {
    pub header_row: usize,
    pub start_row: Option<usize>,
    pub end_row: Option<usize>,
}

impl Default for RowWindow {
    fn default() -> Self {
        Self {
            header_row: 1,
            start_row: None,
            end_row: None,
        }
    }
}

impl RowWindow {
    /// Resolves the window against the used rows `first..=last` of a sheet.
    ///
    /// Returns `(header, start, end)`; `end < start` means no data rows.
    pub fn resolve(&self, first: usize, last: usize) -> Result<(usize, usize, usize), IngestError> {
        let header = self.header_row;
        if header == 0 {
            return Err(IngestError::InvalidRowRange(
                "row numbers start at 1".to_string(),
            ));
        }
        if header < first || header > last {
            return Err(IngestError::InvalidRowRange(format!(
                "header row {header} is outside the used rows {first}..={last}"
            )));
        }
        let start = self.start_row.unwrap_or(header + 1);
        if start <= header {
            return Err(IngestError::InvalidRowRange(format!(
                "start row {start} must come after header row {header}"
            )));
        }
        if let Some(end) = self.end_row
            && end < start
        {
            return Err(IngestError::InvalidRowRange(format!(
                "end row {end} is before start row {start}"
            )));
        }
        let end = self.end_row.unwrap_or(last).min(last);
        Ok((header, start, end))
    }
}

/// Spreadsheet adapter for any workbook format calamine can auto-detect.
#[derive(Debug, Clone)]
pub struct ExcelSource {
    path: PathBuf,
    sheet: Option<String>,
    rows: RowWindow,
}

impl ExcelSource {
    pub fn new(path: &Path, sheet: Option<String>, rows: RowWindow) -> Self {
        Self {
            path: path.to_path_buf(),
            sheet,
            rows,
        }
    }

    fn workbook_error(&self, err: impl std::fmt::Display) -> IngestError {
        IngestError::Workbook {
            path: self.path.clone(),
            message: err.to_string(),
        }
    }
}

impl super::TableSource for ExcelSource {
    fn describe(&self) -> String {
        format!(
            "{:?} (workbook, sheet {})",
            self.path,
            self.sheet.as_deref().unwrap_or("<first>")
        )
    }

    fn load(&self) -> Result<Table, IngestError> {
        let mut workbook = open_workbook_auto(&self.path).map_err(|e| self.workbook_error(e))?;
        let sheet_names = workbook.sheet_names();
        let sheet = match &self.sheet {
            Some(name) if sheet_names.iter().any(|s| s == name) => name.clone(),
            Some(name) => {
                return Err(IngestError::SheetNotFound {
                    sheet: name.clone(),
                    available: sheet_names.join(", "),
                });
            }
            None => sheet_names
                .first()
                .cloned()
                .ok_or_else(|| IngestError::NoSheets(self.path.clone()))?,
        };
        let range = workbook
            .worksheet_range(&sheet)
            .map_err(|e| self.workbook_error(e))?;
        let Some((first_row, _)) = range.start() else {
            return Err(IngestError::MissingHeader(self.path.clone()));
        };

        // Spreadsheet rows are 1-based; the used range may not begin at row 1.
        let first = first_row as usize + 1;
        let rows: Vec<&[Data]> = range.rows().collect();
        let last = first + rows.len() - 1;
        let (header, start, end) = self.rows.resolve(first, last)?;
        debug!("Reading sheet '{sheet}' header row {header}, data rows {start}..={end}");

        let headers = unique_headers(rows[header - first].iter().map(header_text).collect());
        let data = (start..=end)
            .map(|row| rows[row - first].iter().map(to_cell).collect())
            .collect();
        Ok(Table::new(headers, data))
    }
}

fn header_text(cell: &Data) -> String {
    to_cell(cell).label().map(|l| l.into_owned()).unwrap_or_default()
}

fn to_cell(cell: &Data) -> Cell {
    match cell {
        Data::Empty | Data::Error(_) => Cell::Missing,
        Data::Int(value) => Cell::Number(*value as f64),
        Data::Float(value) => Cell::Number(*value),
        Data::String(text) => Cell::from_text(text.as_str()),
        Data::Bool(value) => Cell::Text(value.to_string()),
        Data::DateTime(_) | Data::DateTimeIso(_) => match cell.as_datetime() {
            Some(moment) if moment.time() == chrono::NaiveTime::MIN => {
                Cell::Text(moment.format("%Y-%m-%d").to_string())
            }
            Some(moment) => Cell::Text(moment.format("%Y-%m-%d %H:%M:%S").to_string()),
            None => Cell::from_text(cell.to_string()),
        },
        Data::DurationIso(text) => Cell::from_text(text.as_str()),
    }
}
