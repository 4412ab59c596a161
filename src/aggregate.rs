//! Grouped sum/mean of a numeric column per category, feeding bar charts.

use std::{collections::BTreeMap, fmt};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    error::FlowError,
    frame::{Cell, Table},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateMode {
    #[default]
    Sum,
    Mean,
}

impl AggregateMode {
    pub fn label(&self) -> &'static str {
        match self {
            AggregateMode::Sum => "Sum",
            AggregateMode::Mean => "Mean",
        }
    }
}

impl fmt::Display for AggregateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow {
    pub category: String,
    pub value: f64,
}

#[derive(Default)]
struct GroupTotals {
    sum: f64,
    count: usize,
}

/// Groups rows by `category` and folds `value` with `mode`, sorted by category label.
///
/// Rows missing either cell are skipped. A group only exists once a row has
/// contributed to it, so `Mean` never divides by zero.
pub fn aggregate_by_category(
    table: &Table,
    category: &str,
    value: &str,
    mode: AggregateMode,
) -> Result<Vec<AggregateRow>, FlowError> {
    if table.is_empty() {
        return Err(FlowError::EmptyTable);
    }
    let category_idx = table
        .column_index(category)
        .ok_or_else(|| FlowError::UnknownColumn(category.to_string()))?;
    let value_idx = table
        .column_index(value)
        .ok_or_else(|| FlowError::UnknownColumn(value.to_string()))?;
    if table
        .column(value_idx)
        .any(|cell| matches!(cell, Cell::Text(_)))
    {
        return Err(FlowError::NonNumericValue(value.to_string()));
    }

    let mut groups: BTreeMap<String, GroupTotals> = BTreeMap::new();
    let mut skipped = 0usize;
    for row in table.rows() {
        let (Some(label), Some(number)) = (row[category_idx].label(), row[value_idx].as_number())
        else {
            skipped += 1;
            continue;
        };
        let totals = groups.entry(label.into_owned()).or_default();
        totals.sum += number;
        totals.count += 1;
    }
    debug!(
        "{mode} of '{value}' by '{category}': {} group(s), {skipped} row(s) skipped",
        groups.len()
    );

    Ok(groups
        .into_iter()
        .map(|(category, totals)| AggregateRow {
            category,
            value: match mode {
                AggregateMode::Sum => totals.sum,
                AggregateMode::Mean => totals.sum / totals.count as f64,
            },
        })
        .collect())
}
