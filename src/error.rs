//! Error kinds surfaced by ingestion, role assignment, and the flow transform.
//!
//! Cell-level problems never appear here: a malformed cell is coerced to
//! [`Cell::Missing`](crate::frame::Cell::Missing) during cleaning. Every variant
//! below describes a structural problem the user can act on.

use std::path::PathBuf;

use thiserror::Error;

use crate::roles::ColumnRole;

#[derive(Debug, Error, PartialEq)]
pub enum FlowError {
    #[error("A flow needs at least two stage columns (got {found})")]
    TooFewStages { found: usize },

    #[error("Stage column '{0}' is listed more than once")]
    DuplicateStage(String),

    #[error("Column '{0}' not found in table")]
    UnknownColumn(String),

    #[error("Column '{column}' is classified as {actual} but must be {expected}")]
    RoleMismatch {
        column: String,
        expected: ColumnRole,
        actual: ColumnRole,
    },

    #[error("Value column '{0}' contains text; classify it as numeric so it is coerced first")]
    NonNumericValue(String),

    #[error("Table has no data rows")]
    EmptyTable,
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Opening input file {path:?}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("Unknown encoding '{0}'")]
    UnknownEncoding(String),

    #[error("Failed to decode line {line} with encoding {encoding}")]
    Decode { line: u64, encoding: &'static str },

    #[error("Reading workbook {path:?}: {message}")]
    Workbook { path: PathBuf, message: String },

    #[error("Workbook {0:?} does not contain any sheets")]
    NoSheets(PathBuf),

    #[error("Sheet '{sheet}' not found (available: {available})")]
    SheetNotFound { sheet: String, available: String },

    #[error("Invalid row selection: {0}")]
    InvalidRowRange(String),

    #[error("Input {0:?} has no header row")]
    MissingHeader(PathBuf),
}

#[derive(Debug, Error, PartialEq)]
pub enum RoleError {
    #[error("Role assigned to unknown column '{0}'")]
    UnknownColumn(String),

    #[error("Unknown column role '{0}' (expected categorical, numeric or ignored)")]
    UnknownRole(String),

    #[error("Role override '{0}' must look like NAME=ROLE")]
    MalformedOverride(String),
}
