use std::path::{Path, PathBuf};

use encoding_rs::Encoding;
use log::debug;

use crate::{
    error::IngestError,
    frame::{Cell, Table, unique_headers},
    io_utils,
};

/// Delimited-text adapter. Every field loads as text; typing happens in cleaning.
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
    delimiter: u8,
    encoding: &'static Encoding,
}

impl CsvSource {
    pub fn new(path: &Path, delimiter: u8, encoding: &'static Encoding) -> Self {
        Self {
            path: path.to_path_buf(),
            delimiter,
            encoding,
        }
    }
}

impl super::TableSource for CsvSource {
    fn describe(&self) -> String {
        format!(
            "{:?} (csv, delimiter '{}', {})",
            self.path,
            crate::printable_delimiter(self.delimiter),
            self.encoding.name()
        )
    }

    fn load(&self) -> Result<Table, IngestError> {
        let mut reader = io_utils::open_csv_reader_from_path(&self.path, self.delimiter)?;
        let headers = io_utils::reader_headers(&mut reader, self.encoding)?;
        if headers.is_empty() {
            return Err(IngestError::MissingHeader(self.path.clone()));
        }
        let headers = unique_headers(headers);

        let mut rows = Vec::new();
        let mut ragged = 0usize;
        for record in reader.byte_records() {
            let record = record?;
            if record.len() != headers.len() {
                ragged += 1;
            }
            let decoded = io_utils::decode_record(&record, self.encoding)?;
            rows.push(decoded.into_iter().map(Cell::from_text).collect());
        }
        if ragged > 0 {
            debug!(
                "{ragged} row(s) in {:?} did not have {} field(s); padded or truncated",
                self.path,
                headers.len()
            );
        }
        Ok(Table::new(headers, rows))
    }
}
