use anyhow::{Context, Result};
use log::{info, warn};

use crate::{
    aggregate::AggregateMode,
    chart::{self, BarChart},
    cli::BarArgs,
    frame::format_number,
    table::{self, Align},
};

pub const EMPTY_AGGREGATE_MESSAGE: &str = "No data to aggregate.";

pub fn execute(args: &BarArgs) -> Result<()> {
    let session = crate::open_session(&args.input, &args.roles)?;
    let mode = AggregateMode::from(args.aggregation);
    let rows = session
        .bar(&args.category, &args.value, mode)
        .with_context(|| format!("Aggregating {:?}", args.input.input))?;

    if rows.is_empty() {
        warn!(
            "No rows with both '{}' and '{}' present",
            args.category, args.value
        );
    }

    let payload = BarChart::from_rows(&rows, &args.category, &args.value, mode);
    if args.json || args.output.is_some() {
        chart::write_json(args.output.as_deref(), &payload)?;
    } else if rows.is_empty() {
        println!("{EMPTY_AGGREGATE_MESSAGE}");
        return Ok(());
    } else {
        println!("{}", payload.title);
        let rendered = rows
            .iter()
            .map(|row| vec![row.category.clone(), format_number(row.value)])
            .collect::<Vec<_>>();
        table::print_table(
            &[args.category.clone(), args.value.clone()],
            &rendered,
            &[Align::Left, Align::Right],
        );
    }
    info!("{} of '{}' over {} category row(s)", mode, args.value, rows.len());
    Ok(())
}
