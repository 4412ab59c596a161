//! Column listing with resolved roles.
//!
//! Prints every column of the input with the role it would carry in `sankey`
//! and `bar`, or saves the mapping as an editable YAML roles file.

use anyhow::{Context, Result};
use log::info;

use crate::{
    cli::RolesArgs,
    roles::{ColumnRole, ColumnRoles},
    table,
};

pub fn execute(args: &RolesArgs) -> Result<()> {
    let loaded = crate::load_table(&args.input)?;
    let roles = args.roles.resolve(loaded.headers())?;
    roles
        .validate(loaded.headers())
        .with_context(|| format!("Validating roles for {:?}", args.input.input))?;

    if let Some(path) = &args.output {
        roles.save(path)?;
        info!(
            "Roles for {} column(s) written to {:?}",
            loaded.column_count(),
            path
        );
        return Ok(());
    }

    let rows = loaded
        .headers()
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            vec![
                (idx + 1).to_string(),
                name.clone(),
                roles.role(name).to_string(),
            ]
        })
        .collect::<Vec<_>>();
    table::print_table(
        &["#".to_string(), "column".to_string(), "role".to_string()],
        &rows,
        &[table::Align::Right],
    );
    info!(
        "{} categorical, {} numeric column(s)",
        count(&roles, ColumnRole::Categorical),
        count(&roles, ColumnRole::Numeric)
    );
    Ok(())
}

fn count(roles: &ColumnRoles, role: ColumnRole) -> usize {
    roles.iter().filter(|assignment| assignment.role == role).count()
}
