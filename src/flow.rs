//! Sankey flow aggregation over ordered categorical stage columns.
//!
//! [`build_flow`] turns a cleaned [`Table`] into a [`FlowGraph`]: a node list of
//! the distinct stage values and one weighted edge per (source, target) pair
//! observed between adjacent stages. Rows missing any stage or value cell, and
//! rows whose value is zero or negative, never contribute.
//!
//! Node order follows the first time a value is seen while scanning surviving
//! rows top to bottom, stages left to right. Within each stage pair, edges are
//! emitted in lexicographic (source, target) order so repeated calls with the
//! same input always produce identical output.

use std::collections::{BTreeMap, HashMap};

use itertools::Itertools;
use log::debug;
use serde::Serialize;

use crate::{
    error::FlowError,
    frame::{Cell, Table},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowSpec {
    stages: Vec<String>,
    value: String,
}

impl FlowSpec {
    pub fn new<S: Into<String>>(stages: Vec<S>, value: impl Into<String>) -> Result<Self, FlowError> {
        let stages: Vec<String> = stages.into_iter().map(Into::into).collect();
        if stages.len() < 2 {
            return Err(FlowError::TooFewStages {
                found: stages.len(),
            });
        }
        if let Some(duplicate) = stages.iter().duplicates().next() {
            return Err(FlowError::DuplicateStage(duplicate.clone()));
        }
        Ok(Self {
            stages,
            value: value.into(),
        })
    }

    pub fn stages(&self) -> &[String] {
        &self.stages
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Edge {
    pub source: usize,
    pub target: usize,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlowGraph {
    pub nodes: Vec<String>,
    pub edges: Vec<Edge>,
}

impl FlowGraph {
    /// True when no positive connection survived filtering; nothing to display.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Edges rendered with node labels instead of indices.
    pub fn labeled_edges(&self) -> impl Iterator<Item = (&str, &str, f64)> {
        self.edges.iter().map(|edge| {
            (
                self.nodes[edge.source].as_str(),
                self.nodes[edge.target].as_str(),
                edge.value,
            )
        })
    }
}

struct FlowRow {
    labels: Vec<String>,
    value: f64,
}

pub fn build_flow(table: &Table, spec: &FlowSpec) -> Result<FlowGraph, FlowError> {
    if table.is_empty() {
        return Err(FlowError::EmptyTable);
    }
    let stage_columns = spec
        .stages()
        .iter()
        .map(|name| resolve_column(table, name))
        .collect::<Result<Vec<_>, _>>()?;
    let value_column = resolve_column(table, spec.value())?;
    if table
        .column(value_column)
        .any(|cell| matches!(cell, Cell::Text(_)))
    {
        return Err(FlowError::NonNumericValue(spec.value().to_string()));
    }

    let complete = table
        .rows()
        .filter_map(|row| project_row(row, &stage_columns, value_column))
        .collect::<Vec<_>>();
    let incomplete = table.row_count() - complete.len();
    let rows = complete
        .into_iter()
        .filter(|row| row.value > 0.0)
        .collect::<Vec<_>>();
    debug!(
        "Flow over {} stage(s): {} row(s) kept, {} missing a cell, {} non-positive",
        stage_columns.len(),
        rows.len(),
        incomplete,
        table.row_count() - incomplete - rows.len()
    );

    let (nodes, index) = index_nodes(&rows);

    let mut edges = Vec::new();
    for (from, to) in (0..stage_columns.len()).tuple_windows() {
        let mut groups: BTreeMap<(&str, &str), f64> = BTreeMap::new();
        for row in &rows {
            *groups
                .entry((row.labels[from].as_str(), row.labels[to].as_str()))
                .or_insert(0.0) += row.value;
        }
        edges.extend(
            groups
                .into_iter()
                .filter(|(_, total)| *total > 0.0)
                .map(|((source, target), total)| Edge {
                    source: index[source],
                    target: index[target],
                    value: total,
                }),
        );
    }
    debug!("Flow graph has {} node(s) and {} edge(s)", nodes.len(), edges.len());

    Ok(FlowGraph { nodes, edges })
}

fn resolve_column(table: &Table, name: &str) -> Result<usize, FlowError> {
    table
        .column_index(name)
        .ok_or_else(|| FlowError::UnknownColumn(name.to_string()))
}

fn project_row(row: &[Cell], stages: &[usize], value: usize) -> Option<FlowRow> {
    let value = row[value].as_number()?;
    let labels = stages
        .iter()
        .map(|&idx| row[idx].label().map(|label| label.into_owned()))
        .collect::<Option<Vec<_>>>()?;
    Some(FlowRow { labels, value })
}

fn index_nodes(rows: &[FlowRow]) -> (Vec<String>, HashMap<&str, usize>) {
    let mut nodes = Vec::new();
    let mut index = HashMap::new();
    for label in rows.iter().flat_map(|row| row.labels.iter()) {
        index.entry(label.as_str()).or_insert_with(|| {
            nodes.push(label.clone());
            nodes.len() - 1
        });
    }
    (nodes, index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::new(
            vec!["Stage1".into(), "Stage2".into(), "Value".into()],
            vec![
                vec!["A".into(), "X".into(), 10.0.into()],
                vec!["A".into(), "Y".into(), 5.0.into()],
                vec!["B".into(), "X".into(), (-3.0).into()],
                vec!["A".into(), "X".into(), 0.0.into()],
            ],
        )
    }

    #[test]
    fn non_positive_rows_are_excluded() {
        let spec = FlowSpec::new(vec!["Stage1", "Stage2"], "Value").expect("spec");
        let graph = build_flow(&sample(), &spec).expect("flow");
        assert_eq!(graph.nodes, vec!["A", "X", "Y"]);
        assert_eq!(
            graph.edges,
            vec![
                Edge {
                    source: 0,
                    target: 1,
                    value: 10.0
                },
                Edge {
                    source: 0,
                    target: 2,
                    value: 5.0
                },
            ]
        );
    }

    #[test]
    fn spec_requires_two_distinct_stages() {
        assert_eq!(
            FlowSpec::new(vec!["Stage1"], "Value"),
            Err(FlowError::TooFewStages { found: 1 })
        );
        assert_eq!(
            FlowSpec::new(vec!["Stage1", "Stage2", "Stage1"], "Value"),
            Err(FlowError::DuplicateStage("Stage1".to_string()))
        );
    }

    #[test]
    fn unknown_columns_are_named() {
        let spec = FlowSpec::new(vec!["Stage1", "Nope"], "Value").expect("spec");
        assert_eq!(
            build_flow(&sample(), &spec),
            Err(FlowError::UnknownColumn("Nope".to_string()))
        );
    }

    #[test]
    fn text_in_value_column_is_rejected() {
        let table = Table::from_text_rows(&["a", "b", "v"], &[vec!["x", "y", "1"]]);
        let spec = FlowSpec::new(vec!["a", "b"], "v").expect("spec");
        assert_eq!(
            build_flow(&table, &spec),
            Err(FlowError::NonNumericValue("v".to_string()))
        );
    }

    #[test]
    fn empty_table_is_an_error_but_empty_flow_is_not() {
        let spec = FlowSpec::new(vec!["Stage1", "Stage2"], "Value").expect("spec");
        let empty = Table::new(vec!["Stage1".into(), "Stage2".into(), "Value".into()], vec![]);
        assert_eq!(build_flow(&empty, &spec), Err(FlowError::EmptyTable));

        let negative = Table::new(
            vec!["Stage1".into(), "Stage2".into(), "Value".into()],
            vec![vec!["A".into(), "X".into(), (-1.0).into()]],
        );
        let graph = build_flow(&negative, &spec).expect("flow");
        assert!(graph.is_empty());
        assert!(graph.nodes.is_empty());
    }
}
