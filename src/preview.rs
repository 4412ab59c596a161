use anyhow::Result;
use log::info;

use crate::{cli::PreviewArgs, table};

pub fn execute(args: &PreviewArgs) -> Result<()> {
    let loaded = crate::load_table(&args.input)?;
    let head = loaded.head(args.rows);
    let rows = head
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect::<Vec<Vec<String>>>();

    table::print_table(head.headers(), &rows, &[]);
    info!(
        "Displayed {} of {} row(s) from {:?}",
        rows.len(),
        loaded.row_count(),
        args.input.input
    );
    Ok(())
}
