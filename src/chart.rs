//! Chart payloads handed to an external renderer.
//!
//! The structures mirror the fields a Plotly-style Sankey or bar trace expects
//! and serialize to JSON; drawing them is left to the consumer.

use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::{
    aggregate::{AggregateMode, AggregateRow},
    flow::FlowGraph,
};

/// Plotly's qualitative palette; nodes cycle through it by index.
pub const NODE_PALETTE: &[&str] = &[
    "#636EFA", "#EF553B", "#00CC96", "#AB63FA", "#FFA15A", "#19D3F3", "#FF6692", "#B6E880",
    "#FF97FF", "#FECB52",
];

pub const DEFAULT_SANKEY_TITLE: &str = "Sankey Diagram";

pub fn node_color(index: usize) -> &'static str {
    NODE_PALETTE[index % NODE_PALETTE.len()]
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SankeyNodes {
    pub label: Vec<String>,
    pub color: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SankeyLinks {
    pub source: Vec<usize>,
    pub target: Vec<usize>,
    pub value: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SankeyChart {
    pub title: String,
    pub node: SankeyNodes,
    pub link: SankeyLinks,
}

impl SankeyChart {
    pub fn from_flow(graph: &FlowGraph, title: &str) -> Self {
        let color = (0..graph.node_count()).map(node_color).collect();
        Self {
            title: title.to_string(),
            node: SankeyNodes {
                label: graph.nodes.clone(),
                color,
            },
            link: SankeyLinks {
                source: graph.edges.iter().map(|e| e.source).collect(),
                target: graph.edges.iter().map(|e| e.target).collect(),
                value: graph.edges.iter().map(|e| e.value).collect(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChart {
    pub title: String,
    pub x_title: String,
    pub y_title: String,
    pub x: Vec<String>,
    pub y: Vec<f64>,
}

impl BarChart {
    pub fn from_rows(rows: &[AggregateRow], category: &str, value: &str, mode: AggregateMode) -> Self {
        Self {
            title: bar_title(mode, category, value),
            x_title: category.to_string(),
            y_title: value.to_string(),
            x: rows.iter().map(|r| r.category.clone()).collect(),
            y: rows.iter().map(|r| r.value).collect(),
        }
    }
}

pub fn bar_title(mode: AggregateMode, category: &str, value: &str) -> String {
    format!("{} of {value} by {category}", mode.label())
}

/// Writes `payload` as pretty JSON to `path`, or stdout when `path` is `None` or `-`.
pub fn write_json<T: Serialize>(path: Option<&Path>, payload: &T) -> Result<()> {
    let mut writer: Box<dyn Write> = match path {
        Some(p) if p != Path::new("-") => Box::new(BufWriter::new(
            File::create(p).with_context(|| format!("Creating output file {p:?}"))?,
        )),
        _ => Box::new(io::stdout()),
    };
    serde_json::to_writer_pretty(&mut writer, payload).context("Serializing chart JSON")?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
