//! File → [`Table`] adapters.
//!
//! Both adapters implement [`TableSource`] so front ends can load a table
//! without caring which format the user supplied. [`open_source`] picks the
//! adapter from the file extension.

mod delimited;
mod workbook;

use std::path::Path;

use encoding_rs::Encoding;

use crate::{error::IngestError, frame::Table, io_utils};

pub use self::delimited::CsvSource;
pub use self::workbook::{ExcelSource, RowWindow};

const EXCEL_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "xla", "xlam", "ods"];

pub trait TableSource {
    /// Short human-readable description used in log messages.
    fn describe(&self) -> String;

    fn load(&self) -> Result<Table, IngestError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Csv,
    Excel,
}

impl SourceKind {
    pub fn detect(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if EXCEL_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)) => {
                SourceKind::Excel
            }
            _ => SourceKind::Csv,
        }
    }
}

#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub delimiter: Option<u8>,
    pub encoding: &'static Encoding,
    pub sheet: Option<String>,
    pub rows: RowWindow,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            delimiter: None,
            encoding: io_utils::default_encoding(),
            sheet: None,
            rows: RowWindow::default(),
        }
    }
}

pub fn open_source(path: &Path, options: &IngestOptions) -> Box<dyn TableSource> {
    match SourceKind::detect(path) {
        SourceKind::Csv => Box::new(CsvSource::new(
            path,
            io_utils::resolve_input_delimiter(path, options.delimiter),
            options.encoding,
        )),
        SourceKind::Excel => Box::new(ExcelSource::new(
            path,
            options.sheet.clone(),
            options.rows,
        )),
    }
}
