//! In-memory rectangular table shared by ingestion, cleaning, and aggregation.
//!
//! A [`Table`] stores rows of [`Cell`]s under an ordered list of column names.
//! Construction pads short rows with [`Cell::Missing`] and truncates long ones so
//! every column always has the same number of rows.

use std::{borrow::Cow, collections::HashMap, fmt};

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Number(f64),
    Missing,
}

impl Cell {
    /// Wraps raw text, mapping empty or whitespace-only input to `Missing`.
    pub fn from_text(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        if raw.trim().is_empty() {
            Cell::Missing
        } else {
            Cell::Text(raw)
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(value) => Some(*value),
            _ => None,
        }
    }

    /// Label used when the cell acts as a category or node identity.
    pub fn label(&self) -> Option<Cow<'_, str>> {
        match self {
            Cell::Text(text) => Some(Cow::Borrowed(text.as_str())),
            Cell::Number(value) => Some(Cow::Owned(format_label(*value))),
            Cell::Missing => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(text) => f.write_str(text),
            Cell::Number(value) => f.write_str(&format_label(*value)),
            Cell::Missing => Ok(()),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::from_text(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Cell::Missing);
                row
            })
            .collect();
        Self { headers, rows }
    }

    /// Builds a table from raw text rows, as CSV ingestion yields them.
    pub fn from_text_rows<S: AsRef<str>>(headers: &[S], rows: &[Vec<S>]) -> Self {
        let headers = headers.iter().map(|h| h.as_ref().to_string()).collect();
        let rows = rows
            .iter()
            .map(|row| row.iter().map(|cell| Cell::from_text(cell.as_ref())).collect())
            .collect();
        Self::new(headers, rows)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.rows.iter().map(Vec::as_slice)
    }

    pub fn column(&self, index: usize) -> impl Iterator<Item = &Cell> {
        self.rows.iter().filter_map(move |row| row.get(index))
    }

    /// Returns a copy limited to the first `limit` rows.
    pub fn head(&self, limit: usize) -> Table {
        Table {
            headers: self.headers.clone(),
            rows: self.rows.iter().take(limit).cloned().collect(),
        }
    }

    pub(crate) fn map_columns<F>(&self, mut convert: F) -> Table
    where
        F: FnMut(usize, &Cell) -> Cell,
    {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .map(|(idx, cell)| convert(idx, cell))
                    .collect()
            })
            .collect();
        Table {
            headers: self.headers.clone(),
            rows,
        }
    }
}

/// Renames blank and repeated headers the way spreadsheet tools do:
/// blanks become `column_N`, repeats gain a `.1`, `.2`, ... suffix.
pub fn unique_headers(raw: Vec<String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    raw.into_iter()
        .enumerate()
        .map(|(idx, name)| {
            let trimmed = name.trim();
            let base = if trimmed.is_empty() {
                format!("column_{}", idx + 1)
            } else {
                trimmed.to_string()
            };
            let count = seen.entry(base.clone()).or_insert(0);
            let unique = if *count == 0 {
                base
            } else {
                format!("{base}.{count}")
            };
            *count += 1;
            unique
        })
        .collect()
}

pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.4}")
    }
}

fn format_label(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}
