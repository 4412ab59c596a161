use anyhow::{Context, Result};
use log::{info, warn};

use crate::{
    chart::{self, SankeyChart},
    cli::SankeyArgs,
    frame::format_number,
    table::{self, Align},
};

pub const EMPTY_FLOW_MESSAGE: &str = "No connections with positive values.";

pub fn execute(args: &SankeyArgs) -> Result<()> {
    let session = crate::open_session(&args.input, &args.roles)?;
    let graph = session
        .sankey(args.stages.as_slice(), &args.value)
        .with_context(|| format!("Building Sankey flow from {:?}", args.input.input))?;

    if graph.is_empty() {
        warn!(
            "Flow over {:?} weighted by '{}' produced no links",
            args.stages, args.value
        );
    }

    if args.json || args.output.is_some() {
        let payload = SankeyChart::from_flow(&graph, &args.title);
        chart::write_json(args.output.as_deref(), &payload)?;
    } else if graph.is_empty() {
        println!("{EMPTY_FLOW_MESSAGE}");
        return Ok(());
    } else {
        let node_rows = graph
            .nodes
            .iter()
            .enumerate()
            .map(|(idx, label)| {
                vec![
                    idx.to_string(),
                    label.clone(),
                    chart::node_color(idx).to_string(),
                ]
            })
            .collect::<Vec<_>>();
        table::print_table(
            &["node".to_string(), "label".to_string(), "color".to_string()],
            &node_rows,
            &[Align::Right],
        );
        println!();
        let link_rows = graph
            .labeled_edges()
            .map(|(source, target, value)| {
                vec![source.to_string(), target.to_string(), format_number(value)]
            })
            .collect::<Vec<_>>();
        table::print_table(
            &[
                "source".to_string(),
                "target".to_string(),
                args.value.clone(),
            ],
            &link_rows,
            &[Align::Left, Align::Left, Align::Right],
        );
    }
    info!(
        "Sankey flow with {} node(s) and {} link(s)",
        graph.node_count(),
        graph.edges.len()
    );
    Ok(())
}
