//! Low-level CSV reading helpers: delimiter and encoding resolution, reader
//! construction, and byte-record decoding.
//!
//! - **Delimiter**: semicolon unless overridden; `.tsv` inputs default to tab.
//! - **Encoding**: ISO-8859-1 unless overridden. `encoding_rs` maps that label
//!   to windows-1252, a superset that never fails to decode.
//! - **stdin**: the `-` path reads from standard input.
//! - **Record length**: readers are flexible; short rows are padded later by
//!   [`Table::new`](crate::frame::Table::new).

use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use csv::ByteRecord;
use encoding_rs::{Encoding, WINDOWS_1252};

use crate::error::IngestError;

pub const DEFAULT_DELIMITER: u8 = b';';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';
pub const DEFAULT_ENCODING_LABEL: &str = "iso-8859-1";

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn default_encoding() -> &'static Encoding {
    WINDOWS_1252
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding, IngestError> {
    match label {
        Some(value) => Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| IngestError::UnknownEncoding(value.to_string())),
        None => Ok(default_encoding()),
    }
}

pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
        _ => DEFAULT_DELIMITER,
    })
}

pub fn open_csv_reader<R>(reader: R, delimiter: u8) -> csv::Reader<R>
where
    R: Read,
{
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(true)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true);
    builder.from_reader(reader)
}

pub fn open_csv_reader_from_path(
    path: &Path,
    delimiter: u8,
) -> Result<csv::Reader<Box<dyn Read>>, IngestError> {
    let reader: Box<dyn Read> = if is_dash(path) {
        Box::new(std::io::stdin().lock())
    } else {
        Box::new(BufReader::new(File::open(path).map_err(|source| {
            IngestError::Open {
                path: path.to_path_buf(),
                source,
            }
        })?))
    };
    Ok(open_csv_reader(reader, delimiter))
}

pub fn decode_record(
    record: &ByteRecord,
    encoding: &'static Encoding,
) -> Result<Vec<String>, IngestError> {
    let line = record.position().map_or(0, |pos| pos.line());
    record
        .iter()
        .map(|field| {
            let (text, _, had_errors) = encoding.decode(field);
            if had_errors {
                Err(IngestError::Decode {
                    line,
                    encoding: encoding.name(),
                })
            } else {
                Ok(text.into_owned())
            }
        })
        .collect()
}

pub fn reader_headers<R>(
    reader: &mut csv::Reader<R>,
    encoding: &'static Encoding,
) -> Result<Vec<String>, IngestError>
where
    R: Read,
{
    let headers = reader.byte_headers()?.clone();
    decode_record(&headers, encoding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::UTF_8;

    #[test]
    fn latin1_is_the_default_encoding() {
        assert_eq!(resolve_encoding(None).expect("default"), WINDOWS_1252);
        assert_eq!(
            resolve_encoding(Some(DEFAULT_ENCODING_LABEL)).expect("label"),
            WINDOWS_1252
        );
        assert_eq!(resolve_encoding(Some(" utf-8 ")).expect("utf8"), UTF_8);
        assert!(matches!(
            resolve_encoding(Some("klingon")),
            Err(IngestError::UnknownEncoding(_))
        ));
    }

    #[test]
    fn delimiter_defaults_to_semicolon() {
        assert_eq!(resolve_input_delimiter(Path::new("data.csv"), None), b';');
        assert_eq!(resolve_input_delimiter(Path::new("data.TSV"), None), b'\t');
        assert_eq!(resolve_input_delimiter(Path::new("data.csv"), Some(b',')), b',');
    }

    #[test]
    fn latin1_bytes_decode_to_accented_text() {
        let data: &[u8] = b"Etapa;Valor\nCons\xfamivel;3,5\n";
        let mut reader = open_csv_reader(data, b';');
        let headers = reader_headers(&mut reader, WINDOWS_1252).expect("headers");
        assert_eq!(headers, vec!["Etapa", "Valor"]);
        let record = reader.byte_records().next().expect("row").expect("record");
        let decoded = decode_record(&record, WINDOWS_1252).expect("decode");
        assert_eq!(decoded, vec!["Consúmivel", "3,5"]);
    }

    #[test]
    fn invalid_utf8_reports_the_line() {
        let data: &[u8] = b"a;b\n\xff;1\n";
        let mut reader = open_csv_reader(data, b';');
        reader_headers(&mut reader, UTF_8).expect("headers");
        let record = reader.byte_records().next().expect("row").expect("record");
        assert!(matches!(
            decode_record(&record, UTF_8),
            Err(IngestError::Decode { line: 2, .. })
        ));
    }
}
