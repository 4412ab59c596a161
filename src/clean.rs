//! Locale normalization and numeric coercion of freshly ingested tables.

use std::{borrow::Cow, collections::BTreeMap};

use log::debug;

use crate::{
    frame::{Cell, Table},
    roles::{ColumnRole, ColumnRoles},
};

/// Per-column count of non-empty cells that failed numeric coercion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanReport {
    coerced: BTreeMap<String, usize>,
}

impl CleanReport {
    pub fn is_empty(&self) -> bool {
        self.coerced.is_empty()
    }

    pub fn coerced(&self, column: &str) -> usize {
        self.coerced.get(column).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.coerced.values().sum()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, usize)> {
        self.coerced.iter().map(|(name, count)| (name.as_str(), *count))
    }

    fn record(&mut self, column: &str) {
        *self.coerced.entry(column.to_string()).or_insert(0) += 1;
    }
}

/// Returns a cleaned copy of `table`; the input is left untouched.
pub fn clean(table: &Table, roles: &ColumnRoles) -> Table {
    clean_with_report(table, roles).0
}

pub fn clean_with_report(table: &Table, roles: &ColumnRoles) -> (Table, CleanReport) {
    let column_roles: Vec<ColumnRole> = table
        .headers()
        .iter()
        .map(|name| roles.role(name))
        .collect();
    let mut report = CleanReport::default();
    let cleaned = table.map_columns(|idx, cell| match column_roles[idx] {
        ColumnRole::Numeric => {
            let coerced = coerce_numeric(cell);
            if coerced.is_missing() && !cell.is_missing() {
                report.record(&table.headers()[idx]);
            }
            coerced
        }
        ColumnRole::Categorical | ColumnRole::Ignored => coerce_text(cell),
    });
    for (column, count) in report.entries() {
        debug!("Column '{column}': {count} cell(s) could not be read as numbers");
    }
    (cleaned, report)
}

/// Parses a number written with either a decimal point or a decimal comma.
pub fn parse_decimal(raw: &str) -> Option<f64> {
    let normalized = normalize_decimal_comma(raw.trim());
    if normalized.is_empty() {
        return None;
    }
    normalized
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

fn normalize_decimal_comma(raw: &str) -> Cow<'_, str> {
    if raw.contains(',') {
        Cow::Owned(raw.replace(',', "."))
    } else {
        Cow::Borrowed(raw)
    }
}

fn coerce_numeric(cell: &Cell) -> Cell {
    match cell {
        Cell::Number(value) if value.is_finite() => Cell::Number(*value),
        Cell::Text(text) => parse_decimal(text).map_or(Cell::Missing, Cell::Number),
        _ => Cell::Missing,
    }
}

fn coerce_text(cell: &Cell) -> Cell {
    match cell {
        Cell::Text(text) => Cell::from_text(text.as_str()),
        Cell::Number(_) => cell
            .label()
            .map_or(Cell::Missing, |label| Cell::Text(label.into_owned())),
        Cell::Missing => Cell::Missing,
    }
}
